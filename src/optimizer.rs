//! Cargo / tankering optimizer.
//!
//! Two strategies search the (cargo, extra fuel) plane: an exact linear
//! program solved by vertex enumeration, and an exhaustive grid used as a
//! cross-check. Trip burn is linear in total extra weight, so the profit and
//! every constraint are affine and both strategies land on the same optimum
//! up to grid resolution.
//!
//! An [`Optimizer`] is fixed to one input set. Results are cached per
//! [`Strategy`]; analyses that vary a route parameter build a fresh
//! optimizer over a modified copy of the route.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::aircraft::{AircraftSpec, LimitingFactor};
use crate::constraints::{ConstraintEvaluator, OverrideKey, Overrides, Violations};
use crate::economics::{profit_gradient, total_profit, PriceSet, ProfitBreakdown};
use crate::error::{Error, Result};
use crate::lp::{LinearProgram, LpOutcome};
use crate::route::{RouteParam, RouteSpec};

pub const DEFAULT_CARGO_STEPS: usize = 20;
pub const DEFAULT_FUEL_STEPS: usize = 20;
pub const DEFAULT_TRADEOFF_STEPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Linear,
    GridSearch,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Linear, Strategy::GridSearch];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Linear => "linear",
            Strategy::GridSearch => "grid_search",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Strategy::Linear),
            "grid_search" => Ok(Strategy::GridSearch),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

/// Terminal state of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Optimal,
    MissingFuelPrice,
    MissingCargoRate,
    NoOptimalSolution,
    NoFeasibleSolution,
}

impl Status {
    pub fn message(&self) -> &'static str {
        match self {
            Status::Optimal => "Optimal solution found",
            Status::MissingFuelPrice => "ERROR: Missing fuel price data",
            Status::MissingCargoRate => "ERROR: Missing cargo revenue data",
            Status::NoOptimalSolution => "ERROR: No optimal solution found",
            Status::NoFeasibleSolution => "ERROR: No feasible solution found",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Status::Optimal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Snapshot of one optimization. Error statuses carry all-zero numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimal_cargo: f64,
    pub optimal_tankering: f64,
    pub total_fuel: f64,
    pub trip_fuel: f64,
    pub total_profit: f64,
    pub cargo_revenue: f64,
    pub fuel_savings: f64,
    pub additional_burn_cost: f64,
    pub additional_burn: f64,
    pub tom: f64,
    pub zfm: f64,
    pub lm: f64,
    pub constraints_violated: bool,
    pub violations: Violations,
    pub limiting_factor: Option<LimitingFactor>,
    pub status: Status,
}

impl OptimizationResult {
    pub fn failed(status: Status) -> Self {
        Self {
            optimal_cargo: 0.0,
            optimal_tankering: 0.0,
            total_fuel: 0.0,
            trip_fuel: 0.0,
            total_profit: 0.0,
            cargo_revenue: 0.0,
            fuel_savings: 0.0,
            additional_burn_cost: 0.0,
            additional_burn: 0.0,
            tom: 0.0,
            zfm: 0.0,
            lm: 0.0,
            constraints_violated: false,
            violations: Violations::default(),
            limiting_factor: None,
            status,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    /// Numeric fields as name/value pairs, for logging and export.
    pub fn fields(&self) -> [(&'static str, f64); 12] {
        [
            ("optimal_cargo", self.optimal_cargo),
            ("optimal_tankering", self.optimal_tankering),
            ("total_fuel", self.total_fuel),
            ("trip_fuel", self.trip_fuel),
            ("total_profit", self.total_profit),
            ("cargo_revenue", self.cargo_revenue),
            ("fuel_savings", self.fuel_savings),
            ("additional_burn_cost", self.additional_burn_cost),
            ("additional_burn", self.additional_burn),
            ("tom", self.tom),
            ("zfm", self.zfm),
            ("lm", self.lm),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TradeoffOutcome {
    Feasible {
        profit: ProfitBreakdown,
        additional_burn: f64,
    },
    Rejected {
        violations: Violations,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeoffPoint {
    /// Share of the payload envelope given to cargo
    pub ratio: f64,
    pub cargo: f64,
    pub extra_fuel: f64,
    pub outcome: TradeoffOutcome,
}

impl TradeoffPoint {
    pub fn profit(&self) -> Option<f64> {
        match self.outcome {
            TradeoffOutcome::Feasible { profit, .. } => Some(profit.total_profit),
            TradeoffOutcome::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeoffCurve {
    pub payload: f64,
    pub points: Vec<TradeoffPoint>,
}

impl TradeoffCurve {
    /// Most profitable feasible sample; earliest wins ties.
    pub fn best(&self) -> Option<&TradeoffPoint> {
        let mut best: Option<(&TradeoffPoint, f64)> = None;
        for point in &self.points {
            if let Some(profit) = point.profit() {
                if best.map_or(true, |(_, b)| profit > b) {
                    best = Some((point, profit));
                }
            }
        }
        best.map(|(point, _)| point)
    }

    /// Sample whose cargo share is closest to the result's own mix.
    pub fn nearest_ratio(&self, result: &OptimizationResult) -> Option<&TradeoffPoint> {
        if result.is_error() {
            return None;
        }
        let payload = result.optimal_cargo + result.optimal_tankering;
        let ratio = if payload > 0.0 {
            result.optimal_cargo / payload
        } else {
            0.0
        };

        let mut nearest: Option<&TradeoffPoint> = None;
        for point in &self.points {
            let closer = nearest.map_or(true, |n| (point.ratio - ratio).abs() < (n.ratio - ratio).abs());
            if closer {
                nearest = Some(point);
            }
        }
        nearest
    }

    pub fn feasible_count(&self) -> usize {
        self.points.iter().filter(|p| p.profit().is_some()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: f64,
    pub result: OptimizationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub linear: OptimizationResult,
    pub grid_search: OptimizationResult,
    pub cargo_delta: f64,
    pub tankering_delta: f64,
    pub profit_delta: f64,
}

/// `steps` evenly spaced values over `[0, max]`, both ends included.
fn linspace(max: f64, steps: usize) -> impl Iterator<Item = f64> {
    let steps = steps.max(1);
    (0..steps).map(move |i| {
        if steps == 1 {
            0.0
        } else {
            max * i as f64 / (steps - 1) as f64
        }
    })
}

#[derive(Debug, Clone)]
pub struct Optimizer {
    evaluator: ConstraintEvaluator,
    cargo_steps: usize,
    fuel_steps: usize,
    cache: HashMap<Strategy, OptimizationResult>,
}

impl Optimizer {
    /// A `cargo_revenue_rate` override replaces the route's rate on a copy.
    pub fn new(aircraft: AircraftSpec, route: RouteSpec, pax_count: u32, overrides: Overrides) -> Self {
        let route = match overrides.get(OverrideKey::CargoRevenueRate) {
            Some(rate) => route.with_param(RouteParam::CargoRevenueRate, rate),
            None => route,
        };
        Self::from_evaluator(ConstraintEvaluator::new(aircraft, route, pax_count, overrides))
    }

    fn from_evaluator(evaluator: ConstraintEvaluator) -> Self {
        Self {
            evaluator,
            cargo_steps: DEFAULT_CARGO_STEPS,
            fuel_steps: DEFAULT_FUEL_STEPS,
            cache: HashMap::new(),
        }
    }

    /// Grid resolution for [`Strategy::GridSearch`]; at least one point per axis.
    pub fn with_grid(mut self, cargo_steps: usize, fuel_steps: usize) -> Self {
        self.cargo_steps = cargo_steps.max(1);
        self.fuel_steps = fuel_steps.max(1);
        self.cache.clear();
        self
    }

    /// Same aircraft, passengers, overrides and grid over another route.
    fn for_route(&self, route: RouteSpec) -> Self {
        let ev = &self.evaluator;
        let evaluator = ConstraintEvaluator::new(
            ev.aircraft().clone(),
            route,
            ev.pax_count(),
            ev.overrides().clone(),
        );
        Self {
            cargo_steps: self.cargo_steps,
            fuel_steps: self.fuel_steps,
            ..Self::from_evaluator(evaluator)
        }
    }

    pub fn evaluator(&self) -> &ConstraintEvaluator {
        &self.evaluator
    }

    pub fn aircraft(&self) -> &AircraftSpec {
        self.evaluator.aircraft()
    }

    pub fn route(&self) -> &RouteSpec {
        self.evaluator.route()
    }

    pub fn grid(&self) -> (usize, usize) {
        (self.cargo_steps, self.fuel_steps)
    }

    pub fn max_extra_fuel(&self) -> f64 {
        self.evaluator.max_extra_fuel()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached(&self, strategy: Strategy) -> Option<&OptimizationResult> {
        self.cache.get(&strategy)
    }

    fn prices(&self) -> std::result::Result<PriceSet, Status> {
        let route = self.route();
        let (price_origin, price_dest) = match (route.fuel_price_origin, route.fuel_price_dest) {
            (Some(origin), Some(dest)) => (origin, dest),
            _ => return Err(Status::MissingFuelPrice),
        };
        let cargo_rate = route.cargo_revenue_rate.ok_or(Status::MissingCargoRate)?;
        Ok(PriceSet {
            price_origin,
            price_dest,
            cargo_rate,
            fuel_density: self.aircraft().fuel_density,
        })
    }

    /// Cached per strategy for the lifetime of this optimizer.
    pub fn optimize(&mut self, strategy: Strategy) -> OptimizationResult {
        if let Some(result) = self.cache.get(&strategy) {
            debug!(%strategy, "cache hit");
            return *result;
        }
        let result = match strategy {
            Strategy::Linear => self.optimize_linear(),
            Strategy::GridSearch => self.optimize_grid_search(),
        };
        info!(
            %strategy,
            route = %self.route().code(),
            status = %result.status,
            cargo = result.optimal_cargo,
            tankering = result.optimal_tankering,
            profit = result.total_profit,
            "optimization finished"
        );
        self.cache.insert(strategy, result);
        result
    }

    pub fn optimize_linear(&self) -> OptimizationResult {
        let prices = match self.prices() {
            Ok(prices) => prices,
            Err(status) => return OptimizationResult::failed(status),
        };
        let ev = &self.evaluator;
        let (gain_cargo, gain_fuel) = profit_gradient(&prices, ev.fuel_model().burn_per_kg());
        debug!(gain_cargo, gain_fuel, "profit gradient per kg");

        let lp = ev.linear_constraints().into_iter().fold(
            LinearProgram::maximize(gain_cargo, gain_fuel, ev.max_cargo_weight(), ev.max_extra_fuel()),
            LinearProgram::subject_to,
        );

        match lp.solve() {
            LpOutcome::Optimal(vertex) => self.evaluate(vertex.x, vertex.y, &prices),
            LpOutcome::Infeasible => {
                debug!("linear program infeasible");
                OptimizationResult::failed(Status::NoOptimalSolution)
            }
        }
    }

    /// Row-major over cargo then fuel; the first point of maximum profit wins.
    pub fn optimize_grid_search(&self) -> OptimizationResult {
        let prices = match self.prices() {
            Ok(prices) => prices,
            Err(status) => return OptimizationResult::failed(status),
        };
        let ev = &self.evaluator;
        let (max_cargo, max_fuel) = (ev.max_cargo_weight(), ev.max_extra_fuel());

        let mut best: Option<(f64, f64, f64)> = None;
        let mut feasible = 0usize;
        for cargo in linspace(max_cargo, self.cargo_steps) {
            for fuel in linspace(max_fuel, self.fuel_steps) {
                let check = ev.validate(cargo, fuel);
                if !check.valid {
                    continue;
                }
                feasible += 1;
                let profit = total_profit(cargo, fuel, check.additional_burn, &prices).total_profit;
                if best.map_or(true, |(_, _, p)| profit > p) {
                    best = Some((cargo, fuel, profit));
                }
            }
        }
        debug!(
            feasible,
            total = self.cargo_steps * self.fuel_steps,
            "grid search evaluated"
        );

        match best {
            Some((cargo, fuel, _)) => self.evaluate(cargo, fuel, &prices),
            None => OptimizationResult::failed(Status::NoFeasibleSolution),
        }
    }

    /// Exact masses, fuel and economics at a chosen point.
    fn evaluate(&self, cargo: f64, extra_fuel: f64, prices: &PriceSet) -> OptimizationResult {
        let ev = &self.evaluator;
        let check = ev.validate(cargo, extra_fuel);
        let profit = total_profit(cargo, extra_fuel, check.additional_burn, prices);
        let (_, limiting) = ev.limiting_factor(check.total_fuel, check.trip_fuel);

        OptimizationResult {
            optimal_cargo: cargo,
            optimal_tankering: extra_fuel,
            total_fuel: check.total_fuel,
            trip_fuel: check.trip_fuel,
            total_profit: profit.total_profit,
            cargo_revenue: profit.cargo_revenue,
            fuel_savings: profit.tankering_savings,
            additional_burn_cost: profit.additional_burn_cost,
            additional_burn: check.additional_burn,
            tom: check.tom,
            zfm: check.zfm,
            lm: check.lm,
            constraints_violated: !check.valid,
            violations: check.violations,
            limiting_factor: Some(limiting),
            status: Status::Optimal,
        }
    }

    /// Split the structural payload envelope between cargo (`ratio`) and
    /// extra fuel (`1 - ratio`) over `steps + 1` even ratios.
    pub fn analyze_tradeoff(&self, steps: usize) -> TradeoffCurve {
        let steps = steps.max(1);
        let ev = &self.evaluator;
        let payload = ev.max_payload();
        let prices = self.prices().ok();

        let points = (0..=steps)
            .map(|i| {
                let ratio = i as f64 / steps as f64;
                let cargo = ratio * payload;
                let extra_fuel = (1.0 - ratio) * payload;
                let check = ev.validate(cargo, extra_fuel);
                let outcome = if check.valid {
                    TradeoffOutcome::Feasible {
                        profit: prices
                            .map(|p| total_profit(cargo, extra_fuel, check.additional_burn, &p))
                            .unwrap_or_default(),
                        additional_burn: check.additional_burn,
                    }
                } else {
                    TradeoffOutcome::Rejected {
                        violations: check.violations,
                    }
                };
                TradeoffPoint {
                    ratio,
                    cargo,
                    extra_fuel,
                    outcome,
                }
            })
            .collect();

        TradeoffCurve { payload, points }
    }

    /// Re-optimize over a copy of the route for each value of `param`.
    pub fn sensitivity_analysis(
        &self,
        param: RouteParam,
        values: &[f64],
        strategy: Strategy,
    ) -> Vec<SensitivityPoint> {
        values
            .iter()
            .map(|&value| {
                let mut sample = self.for_route(self.route().with_param(param, value));
                let result = sample.optimize(strategy);
                debug!(%param, value, profit = result.total_profit, "sensitivity sample");
                SensitivityPoint { value, result }
            })
            .collect()
    }

    pub fn compare_strategies(&mut self) -> StrategyComparison {
        let linear = self.optimize(Strategy::Linear);
        let grid_search = self.optimize(Strategy::GridSearch);
        StrategyComparison {
            linear,
            grid_search,
            cargo_delta: grid_search.optimal_cargo - linear.optimal_cargo,
            tankering_delta: grid_search.optimal_tankering - linear.optimal_tankering,
            profit_delta: grid_search.total_profit - linear.total_profit,
        }
    }
}

/// Single blocking entry point. An unknown strategy name is an error; data
/// problems come back as an error [`Status`].
pub fn optimize_for_route(
    aircraft: &AircraftSpec,
    route: &RouteSpec,
    pax_count: u32,
    overrides: &Overrides,
    strategy: &str,
) -> Result<OptimizationResult> {
    let strategy: Strategy = strategy.parse()?;
    let mut optimizer = Optimizer::new(aircraft.clone(), route.clone(), pax_count, overrides.clone());
    Ok(optimizer.optimize(strategy))
}

/// Same as [`Optimizer::sensitivity_analysis`] with the parameter given by name.
pub fn sensitivity_by_name(
    optimizer: &Optimizer,
    param: &str,
    values: &[f64],
    strategy: &str,
) -> Result<Vec<SensitivityPoint>> {
    let param: RouteParam = param.parse()?;
    let strategy: Strategy = strategy.parse()?;
    Ok(optimizer.sensitivity_analysis(param, values, strategy))
}
