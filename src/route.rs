//! Origin-destination route data and the named route factories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::RouteConfig;
use crate::economics;
use crate::error::{Error, Result};

pub const DEFAULT_CONTINGENCY_PCT: f64 = 0.05;
pub const DEFAULT_RESERVE_FUEL: f64 = 2500.0;

/// Route data. Treated as a value: analyses that need a different price or
/// rate take a modified copy via [`RouteSpec::with_param`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub origin: String,
    pub destination: String,
    /// Great-circle distance (nm)
    pub distance: f64,
    /// Typical block time (h)
    pub flight_time: f64,
    pub flight_level: u32,
    /// Average wind component (kt), negative for headwind
    pub wind_component: f64,
    /// Trip fuel with no extra weight (kg)
    pub min_trip_fuel: f64,
    /// Fraction of trip fuel, in [0, 1]
    pub contingency_fuel_pct: f64,
    /// Final reserve (kg)
    pub reserve_fuel: f64,
    /// Alternate fuel (kg)
    pub alternate_fuel: Option<f64>,
    /// USD per liter
    pub fuel_price_origin: Option<f64>,
    /// USD per liter
    pub fuel_price_dest: Option<f64>,
    /// USD per kg
    pub cargo_revenue_rate: Option<f64>,
}

/// Route parameters that a sensitivity sweep may vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteParam {
    FuelPriceOrigin,
    FuelPriceDest,
    CargoRevenueRate,
}

impl RouteParam {
    pub fn name(&self) -> &'static str {
        match self {
            RouteParam::FuelPriceOrigin => "fuel_price_origin",
            RouteParam::FuelPriceDest => "fuel_price_dest",
            RouteParam::CargoRevenueRate => "cargo_revenue_rate",
        }
    }
}

impl fmt::Display for RouteParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RouteParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fuel_price_origin" => Ok(RouteParam::FuelPriceOrigin),
            "fuel_price_dest" => Ok(RouteParam::FuelPriceDest),
            "cargo_revenue_rate" => Ok(RouteParam::CargoRevenueRate),
            other => Err(Error::UnknownParameter(other.to_string())),
        }
    }
}

impl RouteSpec {
    /// Route codes accepted by [`RouteSpec::by_code`].
    pub const CODES: [&'static str; 3] = ["MLE-TFU", "MLE-PEK", "MLE-PVG"];

    pub fn mle_tfu() -> Self {
        Self {
            origin: "TFU".to_string(),
            destination: "MLE".to_string(),
            distance: 2662.0,
            flight_time: 6.08,
            flight_level: 380,
            wind_component: -22.0,
            min_trip_fuel: 32_841.0,
            contingency_fuel_pct: DEFAULT_CONTINGENCY_PCT,
            reserve_fuel: DEFAULT_RESERVE_FUEL,
            alternate_fuel: None,
            fuel_price_origin: Some(0.6875),
            fuel_price_dest: Some(0.9974),
            cargo_revenue_rate: Some(2.6),
        }
    }

    // PEK and PVG performance figures are provisional.
    pub fn mle_pek() -> Self {
        Self {
            origin: "PEK".to_string(),
            destination: "MLE".to_string(),
            distance: 3800.0,
            flight_time: 8.5,
            flight_level: 380,
            wind_component: -25.0,
            min_trip_fuel: 45_000.0,
            contingency_fuel_pct: DEFAULT_CONTINGENCY_PCT,
            reserve_fuel: DEFAULT_RESERVE_FUEL,
            alternate_fuel: None,
            fuel_price_origin: Some(0.6853),
            fuel_price_dest: Some(0.9974),
            cargo_revenue_rate: Some(2.6),
        }
    }

    pub fn mle_pvg() -> Self {
        Self {
            origin: "PVG".to_string(),
            destination: "MLE".to_string(),
            distance: 4000.0,
            flight_time: 9.0,
            flight_level: 380,
            wind_component: -25.0,
            min_trip_fuel: 47_000.0,
            contingency_fuel_pct: DEFAULT_CONTINGENCY_PCT,
            reserve_fuel: DEFAULT_RESERVE_FUEL,
            alternate_fuel: None,
            fuel_price_origin: Some(0.5914),
            fuel_price_dest: Some(0.9974),
            cargo_revenue_rate: Some(2.6),
        }
    }

    pub fn by_code(code: &str) -> Result<Self> {
        match code {
            "MLE-TFU" => Ok(Self::mle_tfu()),
            "MLE-PEK" => Ok(Self::mle_pek()),
            "MLE-PVG" => Ok(Self::mle_pvg()),
            other => Err(Error::UnknownRoute(other.to_string())),
        }
    }

    /// Build a route from a config map. All seven required keys are checked
    /// and every missing one is reported.
    pub fn from_config(cfg: &RouteConfig) -> Result<Self> {
        let mut missing = Vec::new();
        if cfg.origin.is_none() {
            missing.push("origin");
        }
        if cfg.destination.is_none() {
            missing.push("destination");
        }
        if cfg.distance.is_none() {
            missing.push("distance");
        }
        if cfg.flight_time.is_none() {
            missing.push("flight_time");
        }
        if cfg.flight_level.is_none() {
            missing.push("flight_level");
        }
        if cfg.wind_component.is_none() {
            missing.push("wind_component");
        }
        if cfg.min_trip_fuel.is_none() {
            missing.push("min_trip_fuel");
        }
        if !missing.is_empty() {
            return Err(Error::MissingKeys {
                section: "route",
                keys: missing,
            });
        }

        let route = Self {
            origin: cfg.origin.clone().unwrap_or_default(),
            destination: cfg.destination.clone().unwrap_or_default(),
            distance: cfg.distance.unwrap_or_default(),
            flight_time: cfg.flight_time.unwrap_or_default(),
            flight_level: cfg.flight_level.unwrap_or_default(),
            wind_component: cfg.wind_component.unwrap_or_default(),
            min_trip_fuel: cfg.min_trip_fuel.unwrap_or_default(),
            contingency_fuel_pct: cfg.contingency_fuel_pct.unwrap_or(DEFAULT_CONTINGENCY_PCT),
            reserve_fuel: cfg.reserve_fuel.unwrap_or(DEFAULT_RESERVE_FUEL),
            alternate_fuel: cfg.alternate_fuel,
            fuel_price_origin: cfg.fuel_price_origin,
            fuel_price_dest: cfg.fuel_price_dest,
            cargo_revenue_rate: cfg.cargo_revenue_rate,
        };
        route.validate()?;
        Ok(route)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.distance > 0.0) {
            return Err(Error::InvalidSpec(format!(
                "{}: distance must be positive",
                self.code()
            )));
        }
        if !(0.0..=1.0).contains(&self.contingency_fuel_pct) {
            return Err(Error::InvalidSpec(format!(
                "{}: contingency_fuel_pct must be in [0, 1]",
                self.code()
            )));
        }
        if self.min_trip_fuel < 0.0 || self.reserve_fuel < 0.0 {
            return Err(Error::InvalidSpec(format!(
                "{}: fuel quantities must be non-negative",
                self.code()
            )));
        }
        Ok(())
    }

    /// "ORIGIN-DESTINATION"
    pub fn code(&self) -> String {
        format!("{}-{}", self.origin, self.destination)
    }

    /// Contingency on the zero-extra-weight trip fuel.
    pub fn contingency_fuel(&self) -> f64 {
        self.min_trip_fuel * self.contingency_fuel_pct
    }

    /// Minimum fuel at zero extra weight: trip, contingency, alternate and reserve.
    pub fn total_min_fuel(&self) -> f64 {
        self.min_trip_fuel
            + self.contingency_fuel()
            + self.alternate_fuel.unwrap_or(0.0)
            + self.reserve_fuel
    }

    /// Destination over origin price; `None` when either price is missing
    /// or the origin price is zero.
    pub fn tankering_factor(&self) -> Option<f64> {
        let (origin, dest) = (self.fuel_price_origin?, self.fuel_price_dest?);
        economics::tankering_factor(origin, dest).ok()
    }

    pub fn param(&self, param: RouteParam) -> Option<f64> {
        match param {
            RouteParam::FuelPriceOrigin => self.fuel_price_origin,
            RouteParam::FuelPriceDest => self.fuel_price_dest,
            RouteParam::CargoRevenueRate => self.cargo_revenue_rate,
        }
    }

    /// Copy of this route with one parameter replaced.
    pub fn with_param(&self, param: RouteParam, value: f64) -> Self {
        let mut route = self.clone();
        match param {
            RouteParam::FuelPriceOrigin => route.fuel_price_origin = Some(value),
            RouteParam::FuelPriceDest => route.fuel_price_dest = Some(value),
            RouteParam::CargoRevenueRate => route.cargo_revenue_rate = Some(value),
        }
        route
    }
}
