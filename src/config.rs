use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::aircraft::AircraftSpec;
use crate::constraints::Overrides;
use crate::optimizer::{Strategy, DEFAULT_CARGO_STEPS, DEFAULT_FUEL_STEPS, DEFAULT_TRADEOFF_STEPS};
use crate::route::RouteSpec;

pub const DEFAULT_PAX_COUNT: u32 = 237;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Root {
    pub program: Program,
    pub aircraft: AircraftConfig,
    #[serde(default)]
    pub routes: BTreeMap<String, RouteConfig>,
    #[serde(default)]
    pub optimization: Optimization,
    /// Sparse override map; keys are checked in `validate`
    #[serde(default)]
    pub overrides: BTreeMap<String, f64>,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Program {
    pub name: String,
    pub version: String,
}

/// Aircraft keys as read from file. Required keys are enforced by
/// [`AircraftSpec::from_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AircraftConfig {
    pub aircraft_type: Option<String>,
    pub owe: Option<f64>,
    pub variable_load: Option<f64>,
    pub mtow: Option<f64>,
    pub mlw: Option<f64>,
    pub mzfw: Option<f64>,
    pub fuel_capacity: Option<f64>,
    pub fuel_density: Option<f64>,
    pub passenger_capacity: Option<u32>,
    pub std_pax_weight: Option<f64>,
    pub additional_burn_factor: Option<f64>,
}

/// Route keys as read from file. Required keys are enforced by
/// [`RouteSpec::from_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance: Option<f64>,
    pub flight_time: Option<f64>,
    pub flight_level: Option<u32>,
    pub wind_component: Option<f64>,
    pub min_trip_fuel: Option<f64>,
    pub contingency_fuel_pct: Option<f64>,
    pub reserve_fuel: Option<f64>,
    pub alternate_fuel: Option<f64>,
    pub fuel_price_origin: Option<f64>,
    pub fuel_price_dest: Option<f64>,
    pub cargo_revenue_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Optimization {
    /// "linear" or "grid_search"
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_pax_count")]
    pub pax_count: u32,
    #[serde(default = "default_cargo_steps")]
    pub cargo_steps: usize,
    #[serde(default = "default_fuel_steps")]
    pub fuel_steps: usize,
    #[serde(default = "default_tradeoff_steps")]
    pub tradeoff_steps: usize,
}

fn default_method() -> String {
    Strategy::Linear.name().to_string()
}
fn default_pax_count() -> u32 { DEFAULT_PAX_COUNT }
fn default_cargo_steps() -> usize { DEFAULT_CARGO_STEPS }
fn default_fuel_steps() -> usize { DEFAULT_FUEL_STEPS }
fn default_tradeoff_steps() -> usize { DEFAULT_TRADEOFF_STEPS }

impl Default for Optimization {
    fn default() -> Self {
        Self {
            method: default_method(),
            pax_count: DEFAULT_PAX_COUNT,
            cargo_steps: DEFAULT_CARGO_STEPS,
            fuel_steps: DEFAULT_FUEL_STEPS,
            tradeoff_steps: DEFAULT_TRADEOFF_STEPS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logging {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for Logging {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl From<&AircraftSpec> for AircraftConfig {
    fn from(spec: &AircraftSpec) -> Self {
        Self {
            aircraft_type: Some(spec.aircraft_type.clone()),
            owe: Some(spec.owe),
            variable_load: Some(spec.variable_load),
            mtow: Some(spec.mtow),
            mlw: Some(spec.mlw),
            mzfw: Some(spec.mzfw),
            fuel_capacity: Some(spec.fuel_capacity),
            fuel_density: Some(spec.fuel_density),
            passenger_capacity: Some(spec.passenger_capacity),
            std_pax_weight: Some(spec.std_pax_weight),
            additional_burn_factor: Some(spec.additional_burn_factor),
        }
    }
}

impl From<&RouteSpec> for RouteConfig {
    fn from(spec: &RouteSpec) -> Self {
        Self {
            origin: Some(spec.origin.clone()),
            destination: Some(spec.destination.clone()),
            distance: Some(spec.distance),
            flight_time: Some(spec.flight_time),
            flight_level: Some(spec.flight_level),
            wind_component: Some(spec.wind_component),
            min_trip_fuel: Some(spec.min_trip_fuel),
            contingency_fuel_pct: Some(spec.contingency_fuel_pct),
            reserve_fuel: Some(spec.reserve_fuel),
            alternate_fuel: spec.alternate_fuel,
            fuel_price_origin: spec.fuel_price_origin,
            fuel_price_dest: spec.fuel_price_dest,
            cargo_revenue_rate: spec.cargo_revenue_rate,
        }
    }
}

/// Built-in A330-203 with the three Maldives routes.
impl Default for Root {
    fn default() -> Self {
        let routes = [RouteSpec::mle_tfu(), RouteSpec::mle_pek(), RouteSpec::mle_pvg()]
            .iter()
            .map(|route| (format!("{}-{}", route.destination, route.origin), RouteConfig::from(route)))
            .collect();
        Self {
            program: Program {
                name: "tankopt".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            aircraft: AircraftConfig::from(&AircraftSpec::a330_203()),
            routes,
            optimization: Optimization::default(),
            overrides: BTreeMap::new(),
            logging: Logging::default(),
        }
    }
}

impl Root {
    /// Read a TOML file, or JSON when the extension is `.json`. Returns the
    /// parsed config and the raw text.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, String)> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = if path.extension().map_or(false, |ext| ext == "json") {
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        } else {
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        };
        cfg.validate()?;
        Ok((cfg, text))
    }

    pub fn validate(&self) -> Result<()> {
        if self.program.name.trim().is_empty() {
            bail!("program.name must not be empty");
        }
        self.strategy()?;
        if !(1..=10_000).contains(&self.optimization.cargo_steps) {
            bail!("optimization.cargo_steps must be in [1, 10000]");
        }
        if !(1..=10_000).contains(&self.optimization.fuel_steps) {
            bail!("optimization.fuel_steps must be in [1, 10000]");
        }
        if !(1..=10_000).contains(&self.optimization.tradeoff_steps) {
            bail!("optimization.tradeoff_steps must be in [1, 10000]");
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            bail!("logging.level must be one of {:?}", LOG_LEVELS);
        }

        self.check_pax_count(self.optimization.pax_count)
            .context("optimization.pax_count")?;

        if self.routes.is_empty() {
            bail!("at least one [routes.<CODE>] section is required");
        }
        for code in self.routes.keys() {
            let route = self.route_spec(code)?;
            for (name, price) in [
                ("fuel_price_origin", route.fuel_price_origin),
                ("fuel_price_dest", route.fuel_price_dest),
                ("cargo_revenue_rate", route.cargo_revenue_rate),
            ] {
                if price.map_or(false, |p| p < 0.0) {
                    bail!("routes.{}.{} must be non-negative", code, name);
                }
            }
        }

        for (key, value) in self.overrides()?.iter() {
            if value < 0.0 {
                bail!("overrides.{} must be non-negative", key);
            }
        }

        Ok(())
    }

    pub fn check_pax_count(&self, pax_count: u32) -> Result<()> {
        let aircraft = self.aircraft_spec()?;
        if pax_count > aircraft.passenger_capacity {
            bail!(
                "{} passengers exceed passenger capacity {}",
                pax_count,
                aircraft.passenger_capacity
            );
        }
        Ok(())
    }

    pub fn strategy(&self) -> Result<Strategy> {
        self.optimization
            .method
            .parse()
            .context("optimization.method")
    }

    pub fn aircraft_spec(&self) -> Result<AircraftSpec> {
        AircraftSpec::from_config(&self.aircraft).context("[aircraft]")
    }

    /// Configured route by code, falling back to the built-in routes.
    pub fn route_spec(&self, code: &str) -> Result<RouteSpec> {
        match self.routes.get(code) {
            Some(route) => RouteSpec::from_config(route).with_context(|| format!("[routes.{}]", code)),
            None => RouteSpec::by_code(code).map_err(Into::into),
        }
    }

    pub fn route_codes(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    pub fn overrides(&self) -> Result<Overrides> {
        Overrides::from_pairs(self.overrides.iter().map(|(k, v)| (k.as_str(), *v)))
            .context("[overrides]")
    }
}
