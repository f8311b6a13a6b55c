//! Structured log events for inputs, results and analyses.
//!
//! Every event carries plain name/value fields; the sink is whatever
//! subscriber the caller installed.

use tracing::{info, warn};

use crate::aircraft::AircraftSpec;
use crate::constraints::{Overrides, Violations};
use crate::optimizer::{OptimizationResult, SensitivityPoint, StrategyComparison, TradeoffCurve};
use crate::route::{RouteParam, RouteSpec};

pub fn log_inputs(aircraft: &AircraftSpec, route: &RouteSpec, pax_count: u32, overrides: &Overrides) {
    info!(
        aircraft = %aircraft.aircraft_type,
        route = %route.code(),
        pax_count,
        distance_nm = route.distance,
        min_trip_fuel = route.min_trip_fuel,
        fuel_price_origin = ?route.fuel_price_origin,
        fuel_price_dest = ?route.fuel_price_dest,
        cargo_revenue_rate = ?route.cargo_revenue_rate,
        "optimization inputs"
    );
    for (key, value) in overrides.iter() {
        info!(key = %key, value, "override");
    }
}

pub fn log_result(result: &OptimizationResult) {
    if result.is_error() {
        warn!(status = %result.status, "optimization failed");
        return;
    }
    info!(
        status = %result.status,
        limiting_factor = result.limiting_factor.map(|f| f.name()).unwrap_or("none"),
        constraints_violated = result.constraints_violated,
        "optimization result"
    );
    for (name, value) in result.fields() {
        info!(field = name, value, "result");
    }
    if result.constraints_violated {
        log_violations(&result.violations);
    }
}

pub fn log_violations(violations: &Violations) {
    for (name, excess_kg) in violations.iter().filter(|(_, v)| *v > 0.0) {
        warn!(constraint = name, excess_kg, "constraint violated");
    }
}

pub fn log_comparison(cmp: &StrategyComparison) {
    info!(
        linear_status = %cmp.linear.status,
        grid_status = %cmp.grid_search.status,
        cargo_delta = cmp.cargo_delta,
        tankering_delta = cmp.tankering_delta,
        profit_delta = cmp.profit_delta,
        "strategy comparison"
    );
}

pub fn log_tradeoff(curve: &TradeoffCurve, optimum: Option<&OptimizationResult>) {
    info!(
        payload = curve.payload,
        samples = curve.points.len(),
        feasible = curve.feasible_count(),
        "tradeoff curve"
    );
    if let Some(best) = curve.best() {
        info!(
            ratio = best.ratio,
            cargo = best.cargo,
            extra_fuel = best.extra_fuel,
            profit = best.profit().unwrap_or_default(),
            "best tradeoff sample"
        );
    }
    if let Some(nearest) = optimum.and_then(|r| curve.nearest_ratio(r)) {
        info!(ratio = nearest.ratio, "optimum lies nearest this ratio");
    }
}

pub fn log_sensitivity(param: RouteParam, points: &[SensitivityPoint]) {
    for p in points {
        info!(
            parameter = %param,
            value = p.value,
            status = %p.result.status,
            cargo = p.result.optimal_cargo,
            tankering = p.result.optimal_tankering,
            profit = p.result.total_profit,
            "sensitivity"
        );
    }
}
