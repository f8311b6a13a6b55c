//! Aircraft performance and structural weight limits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AircraftConfig;
use crate::error::{Error, Result};

/// Per-type aircraft data. Built once (factory or config) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftSpec {
    /// Type designation, e.g. "A330-203"
    pub aircraft_type: String,
    /// Basic empty mass (kg)
    pub owe: f64,
    /// Variable operational load: crew, catering (kg)
    pub variable_load: f64,
    /// Maximum take-off weight (kg)
    pub mtow: f64,
    /// Maximum landing weight (kg)
    pub mlw: f64,
    /// Maximum zero-fuel weight (kg)
    pub mzfw: f64,
    /// Usable fuel capacity (kg)
    pub fuel_capacity: f64,
    /// kg per liter
    pub fuel_density: f64,
    pub passenger_capacity: u32,
    /// Standard passenger weight including baggage (kg)
    pub std_pax_weight: f64,
    /// Extra trip fuel per kg of extra weight per nautical mile
    pub additional_burn_factor: f64,
}

/// Which take-off mass ceiling binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitingFactor {
    #[serde(rename = "MTOW")]
    Mtow,
    #[serde(rename = "MZFW+Fuel")]
    MzfwPlusFuel,
    #[serde(rename = "MLW+TripFuel")]
    MlwPlusTripFuel,
}

impl LimitingFactor {
    pub fn name(&self) -> &'static str {
        match self {
            LimitingFactor::Mtow => "MTOW",
            LimitingFactor::MzfwPlusFuel => "MZFW+Fuel",
            LimitingFactor::MlwPlusTripFuel => "MLW+TripFuel",
        }
    }
}

impl fmt::Display for LimitingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AircraftSpec {
    /// Airbus A330-203 with the operator's standard weights.
    pub fn a330_203() -> Self {
        Self {
            aircraft_type: "A330-203".to_string(),
            owe: 120_310.0,
            variable_load: 0.0,
            mtow: 233_000.0,
            mlw: 182_000.0,
            mzfw: 170_000.0,
            fuel_capacity: 109_186.0,
            fuel_density: 0.785,
            passenger_capacity: 264,
            std_pax_weight: 102.0,
            additional_burn_factor: 0.0001,
        }
    }

    pub fn from_config(cfg: &AircraftConfig) -> Result<Self> {
        let mut missing = Vec::new();
        if cfg.aircraft_type.is_none() {
            missing.push("aircraft_type");
        }
        if cfg.owe.is_none() {
            missing.push("owe");
        }
        if cfg.mtow.is_none() {
            missing.push("mtow");
        }
        if cfg.mlw.is_none() {
            missing.push("mlw");
        }
        if cfg.mzfw.is_none() {
            missing.push("mzfw");
        }
        if cfg.fuel_capacity.is_none() {
            missing.push("fuel_capacity");
        }
        if cfg.fuel_density.is_none() {
            missing.push("fuel_density");
        }
        if cfg.passenger_capacity.is_none() {
            missing.push("passenger_capacity");
        }
        if cfg.std_pax_weight.is_none() {
            missing.push("std_pax_weight");
        }
        if !missing.is_empty() {
            return Err(Error::MissingKeys {
                section: "aircraft",
                keys: missing,
            });
        }

        let spec = Self {
            aircraft_type: cfg.aircraft_type.clone().unwrap_or_default(),
            owe: cfg.owe.unwrap_or_default(),
            variable_load: cfg.variable_load.unwrap_or(0.0),
            mtow: cfg.mtow.unwrap_or_default(),
            mlw: cfg.mlw.unwrap_or_default(),
            mzfw: cfg.mzfw.unwrap_or_default(),
            fuel_capacity: cfg.fuel_capacity.unwrap_or_default(),
            fuel_density: cfg.fuel_density.unwrap_or_default(),
            passenger_capacity: cfg.passenger_capacity.unwrap_or_default(),
            std_pax_weight: cfg.std_pax_weight.unwrap_or_default(),
            additional_burn_factor: cfg.additional_burn_factor.unwrap_or(0.0001),
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mlw > self.mtow {
            return Err(Error::InvalidSpec(format!(
                "{}: MLW {} exceeds MTOW {}",
                self.aircraft_type, self.mlw, self.mtow
            )));
        }
        if self.mzfw > self.mtow {
            return Err(Error::InvalidSpec(format!(
                "{}: MZFW {} exceeds MTOW {}",
                self.aircraft_type, self.mzfw, self.mtow
            )));
        }
        if self.fuel_density <= 0.0 {
            return Err(Error::InvalidSpec(format!(
                "{}: fuel_density must be positive",
                self.aircraft_type
            )));
        }
        if self.fuel_capacity < 0.0 || self.owe < 0.0 || self.variable_load < 0.0 {
            return Err(Error::InvalidSpec(format!(
                "{}: masses and capacities must be non-negative",
                self.aircraft_type
            )));
        }
        if self.additional_burn_factor < 0.0 {
            return Err(Error::InvalidSpec(format!(
                "{}: additional_burn_factor must be non-negative",
                self.aircraft_type
            )));
        }
        Ok(())
    }

    /// Dry operating mass: OWE plus variable load.
    pub fn dom(&self) -> f64 {
        self.owe + self.variable_load
    }

    pub fn pax_weight(&self, pax_count: u32) -> f64 {
        pax_count as f64 * self.std_pax_weight
    }

    pub fn zero_fuel_mass(&self, pax_count: u32, cargo: f64) -> f64 {
        self.dom() + self.pax_weight(pax_count) + cargo
    }

    pub fn take_off_mass(&self, pax_count: u32, cargo: f64, total_fuel: f64) -> f64 {
        self.zero_fuel_mass(pax_count, cargo) + total_fuel
    }

    pub fn landing_mass(tom: f64, trip_fuel: f64) -> f64 {
        tom - trip_fuel
    }

    /// Extra trip fuel caused by `extra_weight` kg over `distance` nm.
    pub fn additional_burn(&self, extra_weight: f64, distance: f64) -> f64 {
        self.additional_burn_factor * extra_weight * distance
    }

    /// Smallest of the three take-off mass ceilings for this airframe.
    pub fn limiting_tom(&self, required_fuel: f64, trip_fuel: f64) -> (f64, LimitingFactor) {
        most_restrictive_tom(self.mtow, self.mzfw, self.mlw, required_fuel, trip_fuel)
    }
}

/// Ties go to the first of MTOW, MZFW+Fuel, MLW+TripFuel.
pub fn most_restrictive_tom(
    mtow: f64,
    mzfw: f64,
    mlw: f64,
    required_fuel: f64,
    trip_fuel: f64,
) -> (f64, LimitingFactor) {
    let limits = [
        (mtow, LimitingFactor::Mtow),
        (mzfw + required_fuel, LimitingFactor::MzfwPlusFuel),
        (mlw + trip_fuel, LimitingFactor::MlwPlusTripFuel),
    ];
    let mut best = limits[0];
    for limit in &limits[1..] {
        if limit.0 < best.0 {
            best = *limit;
        }
    }
    best
}
