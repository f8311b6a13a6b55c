//! Weight and fuel constraints for one (aircraft, route, passengers,
//! overrides) setup.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::aircraft::{most_restrictive_tom, AircraftSpec, LimitingFactor};
use crate::error::{Error, Result};
use crate::fuel::FuelRequirementModel;
use crate::lp::HalfPlane;
use crate::route::RouteSpec;

/// Slack (kg) below which a constraint still counts as satisfied.
pub const MASS_TOLERANCE_KG: f64 = 1e-6;

/// User-overridable quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKey {
    RegulatedMtow,
    RegulatedMlw,
    ActualZfw,
    BlockFuel,
    TaxiFuel,
    CargoRevenueRate,
}

impl OverrideKey {
    pub const ALL: [OverrideKey; 6] = [
        OverrideKey::RegulatedMtow,
        OverrideKey::RegulatedMlw,
        OverrideKey::ActualZfw,
        OverrideKey::BlockFuel,
        OverrideKey::TaxiFuel,
        OverrideKey::CargoRevenueRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OverrideKey::RegulatedMtow => "regulated_mtow",
            OverrideKey::RegulatedMlw => "regulated_mlw",
            OverrideKey::ActualZfw => "actual_zfw",
            OverrideKey::BlockFuel => "block_fuel",
            OverrideKey::TaxiFuel => "taxi_fuel",
            OverrideKey::CargoRevenueRate => "cargo_revenue_rate",
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OverrideKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OverrideKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| Error::UnknownOverride(s.to_string()))
    }
}

/// Sparse override map. An absent key leaves the aircraft or route value in force.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<OverrideKey, f64>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `(name, value)` pairs; any unknown name is an error.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut overrides = Self::new();
        for (name, value) in pairs {
            overrides.set(name.as_ref().parse()?, value);
        }
        Ok(overrides)
    }

    pub fn with(mut self, key: OverrideKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: OverrideKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: OverrideKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverrideKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Excess over each limit in kg; 0 when satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Violations {
    pub mtow: f64,
    pub mlw: f64,
    pub mzfw: f64,
    pub fuel_capacity: f64,
}

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("mtow", self.mtow),
            ("mlw", self.mlw),
            ("mzfw", self.mzfw),
            ("fuel_capacity", self.fuel_capacity),
        ]
        .into_iter()
    }

    pub fn any(&self) -> bool {
        self.iter().any(|(_, v)| v > 0.0)
    }
}

/// Outcome of checking one (cargo, extra fuel) candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub violations: Violations,
    pub trip_fuel: f64,
    pub min_required_fuel: f64,
    pub total_fuel: f64,
    pub additional_burn: f64,
    pub tom: f64,
    pub zfm: f64,
    pub lm: f64,
}

/// Excess of `value` over `limit`, zero inside the tolerance.
fn excess(value: f64, limit: f64) -> f64 {
    let over = value - limit;
    if over > MASS_TOLERANCE_KG {
        over
    } else {
        0.0
    }
}

/// Owns its inputs so an optimizer can hold it for the whole run.
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    aircraft: AircraftSpec,
    route: RouteSpec,
    pax_count: u32,
    overrides: Overrides,
    last_violations: Cell<Violations>,
}

impl ConstraintEvaluator {
    pub fn new(aircraft: AircraftSpec, route: RouteSpec, pax_count: u32, overrides: Overrides) -> Self {
        Self {
            aircraft,
            route,
            pax_count,
            overrides,
            last_violations: Cell::new(Violations::default()),
        }
    }

    pub fn aircraft(&self) -> &AircraftSpec {
        &self.aircraft
    }

    pub fn route(&self) -> &RouteSpec {
        &self.route
    }

    pub fn pax_count(&self) -> u32 {
        self.pax_count
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn fuel_model(&self) -> FuelRequirementModel<'_> {
        FuelRequirementModel::new(&self.aircraft, &self.route)
    }

    pub fn mtow(&self) -> f64 {
        self.overrides
            .get(OverrideKey::RegulatedMtow)
            .unwrap_or(self.aircraft.mtow)
    }

    pub fn mlw(&self) -> f64 {
        self.overrides
            .get(OverrideKey::RegulatedMlw)
            .unwrap_or(self.aircraft.mlw)
    }

    pub fn actual_zfw(&self) -> Option<f64> {
        self.overrides.get(OverrideKey::ActualZfw)
    }

    pub fn block_fuel(&self) -> Option<f64> {
        self.overrides.get(OverrideKey::BlockFuel)
    }

    /// Stored and reported only.
    pub fn taxi_fuel(&self) -> Option<f64> {
        self.overrides.get(OverrideKey::TaxiFuel)
    }

    pub fn pax_weight(&self) -> f64 {
        self.aircraft.pax_weight(self.pax_count)
    }

    /// Payload room under `zfw_basis` after dry mass and passengers.
    fn payload_under(&self, zfw_basis: f64) -> f64 {
        (zfw_basis - self.aircraft.dom() - self.pax_weight()).max(0.0)
    }

    /// Cargo ceiling from the ZFW override, else from MZFW. Never negative.
    pub fn max_cargo_weight(&self) -> f64 {
        self.payload_under(self.actual_zfw().unwrap_or(self.aircraft.mzfw))
    }

    /// Payload envelope under the structural MZFW, ignoring the ZFW override.
    pub fn max_payload(&self) -> f64 {
        self.payload_under(self.aircraft.mzfw)
    }

    pub fn max_fuel_capacity(&self) -> f64 {
        self.block_fuel().unwrap_or(self.aircraft.fuel_capacity)
    }

    /// Minimum fuel with no extra weight aboard.
    pub fn base_min_fuel(&self) -> f64 {
        let fuel = self.fuel_model();
        fuel.min_required_fuel(fuel.trip_fuel(0.0))
    }

    /// Upper bound for tankered fuel: whatever fits in the tanks and under
    /// MTOW with no cargo aboard.
    pub fn max_extra_fuel(&self) -> f64 {
        let base = self.base_min_fuel();
        let by_capacity = self.max_fuel_capacity() - base;
        let by_mtow = self.mtow() - self.aircraft.dom() - self.pax_weight() - base;
        by_capacity.min(by_mtow).max(0.0)
    }

    pub fn validate(&self, cargo: f64, extra_fuel: f64) -> Validation {
        let fuel = self.fuel_model().breakdown(cargo, extra_fuel);
        let zfm = self.aircraft.zero_fuel_mass(self.pax_count, cargo);
        let tom = zfm + fuel.total_fuel;
        let lm = AircraftSpec::landing_mass(tom, fuel.trip_fuel);

        let violations = Violations {
            mtow: excess(tom, self.mtow()),
            mlw: excess(lm, self.mlw()),
            mzfw: excess(zfm, self.aircraft.mzfw),
            fuel_capacity: excess(fuel.total_fuel, self.max_fuel_capacity()),
        };
        self.last_violations.set(violations);

        Validation {
            valid: !violations.any(),
            violations,
            trip_fuel: fuel.trip_fuel,
            min_required_fuel: fuel.min_required_fuel,
            total_fuel: fuel.total_fuel,
            additional_burn: fuel.additional_burn,
            tom,
            zfm,
            lm,
        }
    }

    /// Violations recorded by the most recent [`validate`](Self::validate).
    pub fn last_violations(&self) -> Violations {
        self.last_violations.get()
    }

    /// Most restrictive take-off mass ceiling under the effective limits.
    pub fn limiting_factor(&self, required_fuel: f64, trip_fuel: f64) -> (f64, LimitingFactor) {
        most_restrictive_tom(
            self.mtow(),
            self.aircraft.mzfw,
            self.mlw(),
            required_fuel,
            trip_fuel,
        )
    }

    /// The four constraints as half-planes in (cargo, extra fuel).
    ///
    /// With `k` the burn per kg and `p` the contingency fraction, trip fuel
    /// is `T0 + k(c + f)`, so take-off and landing masses are affine:
    ///
    /// ```text
    /// TOM = D + c + (1+p)(T0 + k(c+f)) + alt + res + f
    /// LM  = TOM - (T0 + k(c+f))
    /// ```
    pub fn linear_constraints(&self) -> [HalfPlane; 4] {
        let fuel = self.fuel_model();
        let k = fuel.burn_per_kg();
        let p = self.route.contingency_fuel_pct;
        let t0 = self.route.min_trip_fuel;
        let fixed = fuel.alternate_fuel() + fuel.reserve_fuel();
        let dry = self.aircraft.dom() + self.pax_weight();

        let tom_coeff = 1.0 + (1.0 + p) * k;
        let lm_coeff = 1.0 + p * k;

        [
            HalfPlane::new(
                "mtow",
                tom_coeff,
                tom_coeff,
                self.mtow() - dry - (1.0 + p) * t0 - fixed,
            ),
            HalfPlane::new("mlw", lm_coeff, lm_coeff, self.mlw() - dry - p * t0 - fixed),
            HalfPlane::new("mzfw", 1.0, 0.0, self.aircraft.mzfw - dry),
            HalfPlane::new(
                "fuel_capacity",
                (1.0 + p) * k,
                tom_coeff,
                self.max_fuel_capacity() - (1.0 + p) * t0 - fixed,
            ),
        ]
    }
}

/// One-shot validation without keeping an evaluator around.
pub fn validate_weight_distribution(
    aircraft: &AircraftSpec,
    route: &RouteSpec,
    pax_count: u32,
    cargo: f64,
    extra_fuel: f64,
    overrides: &Overrides,
) -> Validation {
    ConstraintEvaluator::new(aircraft.clone(), route.clone(), pax_count, overrides.clone())
        .validate(cargo, extra_fuel)
}
