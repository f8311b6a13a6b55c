//! Simplified weight and balance.
//!
//! Loads are split over fixed cabin zones and cargo holds. There is no
//! moment-arm model; the reported CG is a fixed reference value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aircraft::AircraftSpec;

/// %MAC reported for every loading.
pub const PLACEHOLDER_CG_PCT_MAC: f64 = 25.0;

/// Share of minimum fuel assumed still aboard at landing.
const LANDING_FUEL_FRACTION: f64 = 0.1;

const FORWARD_HOLD_SHARE: f64 = 0.4;
const AFT_HOLD_SHARE: f64 = 0.6;

/// Cabin zone shares; should sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CabinSplit {
    pub forward: f64,
    pub mid: f64,
    pub aft: f64,
}

impl Default for CabinSplit {
    fn default() -> Self {
        Self {
            forward: 0.3,
            mid: 0.5,
            aft: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadDistribution {
    pub pax_forward: f64,
    pub pax_mid: f64,
    pub pax_aft: f64,
    pub cargo_forward: f64,
    pub cargo_aft: f64,
    pub total_pax_weight: f64,
    pub total_cargo_weight: f64,
    pub total_payload: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBreakdown {
    pub dom: f64,
    pub payload: f64,
    pub zfm: f64,
    pub fuel: f64,
    pub tom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightAndBalance {
    pub distribution: PayloadDistribution,
    pub breakdown: WeightBreakdown,
    pub cg_pct_mac: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadLimit {
    #[serde(rename = "MZFW")]
    Mzfw,
    #[serde(rename = "MTOW")]
    Mtow,
    #[serde(rename = "MLW")]
    Mlw,
}

impl fmt::Display for PayloadLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayloadLimit::Mzfw => "MZFW",
            PayloadLimit::Mtow => "MTOW",
            PayloadLimit::Mlw => "MLW",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightLimitedPayload {
    pub max_payload: f64,
    pub mzfw_limit: f64,
    pub mtow_limit: f64,
    pub mlw_limit: f64,
    pub limiting_factor: PayloadLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentLimits {
    pub forward_lower_deck: f64,
    pub aft_lower_deck: f64,
    pub bulk: f64,
    pub total_available: f64,
}

pub fn payload_distribution(
    aircraft: &AircraftSpec,
    pax_count: u32,
    cargo: f64,
    cabin: CabinSplit,
) -> PayloadDistribution {
    let pax = aircraft.pax_weight(pax_count);
    PayloadDistribution {
        pax_forward: pax * cabin.forward,
        pax_mid: pax * cabin.mid,
        pax_aft: pax * cabin.aft,
        cargo_forward: cargo * FORWARD_HOLD_SHARE,
        cargo_aft: cargo * AFT_HOLD_SHARE,
        total_pax_weight: pax,
        total_cargo_weight: cargo,
        total_payload: pax + cargo,
    }
}

pub fn weight_and_balance(
    aircraft: &AircraftSpec,
    pax_count: u32,
    cargo: f64,
    fuel: f64,
    cabin: CabinSplit,
) -> WeightAndBalance {
    let distribution = payload_distribution(aircraft, pax_count, cargo, cabin);
    let zfm = aircraft.zero_fuel_mass(pax_count, cargo);
    WeightAndBalance {
        distribution,
        breakdown: WeightBreakdown {
            dom: aircraft.dom(),
            payload: distribution.total_payload,
            zfm,
            fuel,
            tom: zfm + fuel,
        },
        cg_pct_mac: PLACEHOLDER_CG_PCT_MAC,
    }
}

/// Payload ceilings beyond passengers. Ties resolve MZFW, MTOW, MLW.
pub fn weight_limited_payload(
    aircraft: &AircraftSpec,
    pax_count: u32,
    min_required_fuel: f64,
) -> WeightLimitedPayload {
    let base = aircraft.dom() + aircraft.pax_weight(pax_count);
    let mzfw_limit = aircraft.mzfw - base;
    let mtow_limit = aircraft.mtow - base - min_required_fuel;
    let mlw_limit = aircraft.mlw - base - min_required_fuel * LANDING_FUEL_FRACTION;

    let mut limit = (mzfw_limit, PayloadLimit::Mzfw);
    for candidate in [(mtow_limit, PayloadLimit::Mtow), (mlw_limit, PayloadLimit::Mlw)] {
        if candidate.0 < limit.0 {
            limit = candidate;
        }
    }

    WeightLimitedPayload {
        max_payload: limit.0,
        mzfw_limit,
        mtow_limit,
        mlw_limit,
        limiting_factor: limit.1,
    }
}

/// Cargo room per hold under `available_payload`. Hold capacities are
/// nominal A330 figures.
pub fn max_cargo_by_compartment(
    aircraft: &AircraftSpec,
    pax_count: u32,
    available_payload: f64,
) -> CompartmentLimits {
    let available = available_payload - aircraft.pax_weight(pax_count);
    CompartmentLimits {
        forward_lower_deck: available.min(10_000.0),
        aft_lower_deck: available.min(15_000.0),
        bulk: available.min(2_000.0),
        total_available: available,
    }
}
