//! Test suite for tankopt
//!
//! Includes:
//! - Unit tests for the weight, fuel and economics models
//! - Property tests over the (cargo, extra fuel) plane
//! - Regression tests for the A330-203 MLE-TFU reference flight
//! - Configuration and output tests

use crate::aircraft::{most_restrictive_tom, AircraftSpec, LimitingFactor};
use crate::config::{self, RouteConfig};
use crate::constraints::{validate_weight_distribution, ConstraintEvaluator, OverrideKey, Overrides};
use crate::economics::{self, PriceSet};
use crate::error::Error;
use crate::fuel::FuelRequirementModel;
use crate::io::{self, CsvWriter};
use crate::optimizer::{
    optimize_for_route, sensitivity_by_name, OptimizationResult, Optimizer, Status, Strategy,
    TradeoffOutcome,
};
use crate::route::{RouteParam, RouteSpec};
use crate::weights::{self, CabinSplit, PayloadLimit};

const PAX: u32 = 237;

fn reference_optimizer() -> Optimizer {
    Optimizer::new(AircraftSpec::a330_203(), RouteSpec::mle_tfu(), PAX, Overrides::new())
}

fn reference_evaluator() -> ConstraintEvaluator {
    ConstraintEvaluator::new(AircraftSpec::a330_203(), RouteSpec::mle_tfu(), PAX, Overrides::new())
}

/// Same airframe with no weight-induced burn.
fn burnless_aircraft() -> AircraftSpec {
    AircraftSpec {
        additional_burn_factor: 0.0,
        ..AircraftSpec::a330_203()
    }
}

fn assert_all_zero(result: &OptimizationResult) {
    for (name, value) in result.fields() {
        assert_eq!(value, 0.0, "{} should be zeroed on error", name);
    }
    assert!(result.limiting_factor.is_none());
    assert!(!result.constraints_violated);
}

// =============================================================================
// Basic Functionality Tests
// =============================================================================

#[test]
fn test_reference_aircraft_masses() {
    let a = AircraftSpec::a330_203();
    assert!(a.validate().is_ok());
    assert_eq!(a.dom(), 120_310.0);
    assert_eq!(a.pax_weight(PAX), 24_174.0);
    assert_eq!(a.zero_fuel_mass(PAX, 1_000.0), 145_484.0);
    assert_eq!(a.take_off_mass(PAX, 1_000.0, 40_000.0), 185_484.0);
    assert_eq!(AircraftSpec::landing_mass(185_484.0, 30_000.0), 155_484.0);
}

#[test]
fn test_aircraft_invariants_rejected() {
    let heavy_landing = AircraftSpec {
        mlw: 240_000.0,
        ..AircraftSpec::a330_203()
    };
    assert!(matches!(heavy_landing.validate(), Err(Error::InvalidSpec(_))));

    let heavy_zfw = AircraftSpec {
        mzfw: 240_000.0,
        ..AircraftSpec::a330_203()
    };
    assert!(matches!(heavy_zfw.validate(), Err(Error::InvalidSpec(_))));
}

#[test]
fn test_route_factories_and_codes() {
    for code in RouteSpec::CODES {
        let route = RouteSpec::by_code(code).unwrap();
        assert!(route.validate().is_ok());
        assert_eq!(route.destination, "MLE");
        assert!(route.tankering_factor().unwrap() > 1.0);
    }
    assert!(matches!(RouteSpec::by_code("MLE-LHR"), Err(Error::UnknownRoute(_))));

    let free_origin = RouteSpec::mle_tfu().with_param(RouteParam::FuelPriceOrigin, 0.0);
    assert_eq!(free_origin.tankering_factor(), None);
    let unpriced = RouteSpec {
        fuel_price_dest: None,
        ..RouteSpec::mle_tfu()
    };
    assert_eq!(unpriced.tankering_factor(), None);
}

#[test]
fn test_route_min_fuel_totals() {
    let route = RouteSpec::mle_tfu();
    assert!((route.contingency_fuel() - 1_642.05).abs() < 1e-9);
    assert!((route.total_min_fuel() - 36_983.05).abs() < 1e-9);

    let with_alternate = RouteSpec {
        alternate_fuel: Some(3_000.0),
        ..RouteSpec::mle_tfu()
    };
    assert!((with_alternate.total_min_fuel() - 39_983.05).abs() < 1e-9);
}

#[test]
fn test_route_invariants_rejected() {
    let no_distance = RouteSpec {
        distance: 0.0,
        ..RouteSpec::mle_tfu()
    };
    assert!(no_distance.validate().is_err());

    let bad_contingency = RouteSpec {
        contingency_fuel_pct: 1.5,
        ..RouteSpec::mle_tfu()
    };
    assert!(bad_contingency.validate().is_err());
}

#[test]
fn test_economics_components() {
    assert_eq!(economics::cargo_revenue(1_000.0, 2.6), 2_600.0);
    assert!((economics::tankering_factor(0.6875, 0.9974).unwrap() - 1.4507).abs() < 1e-3);
    assert!(matches!(
        economics::tankering_factor(0.0, 0.9974),
        Err(Error::ZeroOriginPrice)
    ));

    let prices = PriceSet {
        price_origin: 0.5,
        price_dest: 1.0,
        cargo_rate: 2.0,
        fuel_density: 0.8,
    };
    let p = economics::total_profit(1_000.0, 800.0, 80.0, &prices);
    assert_eq!(p.cargo_revenue, 2_000.0);
    // (800 - 80) L at 1.0 minus 800/0.8 L at 0.5
    assert!((p.tankering_savings - (900.0 - 500.0)).abs() < 1e-9);
    assert!((p.additional_burn_cost - 50.0).abs() < 1e-9);
    assert!((p.total_profit - (2_000.0 + 400.0 - 50.0)).abs() < 1e-9);
}

#[test]
fn test_fuel_breakdown() {
    let aircraft = AircraftSpec::a330_203();
    let route = RouteSpec::mle_tfu();
    let model = FuelRequirementModel::new(&aircraft, &route);

    assert!((model.burn_per_kg() - 0.2662).abs() < 1e-12);

    let f = model.breakdown(10_000.0, 5_000.0);
    assert!((f.additional_burn - 3_993.0).abs() < 1e-9);
    assert!((f.trip_fuel - 36_834.0).abs() < 1e-9);
    assert!((f.contingency_fuel - 1_841.7).abs() < 1e-9);
    assert!((f.min_required_fuel - (36_834.0 + 1_841.7 + 2_500.0)).abs() < 1e-9);
    assert!((f.total_fuel - (f.min_required_fuel + 5_000.0)).abs() < 1e-9);
    assert!((f.additional_burn_tankering - 1_331.0).abs() < 1e-9);
    assert!((f.effective_tankered_fuel - 3_669.0).abs() < 1e-9);
}

#[test]
fn test_tankering_efficiency_options() {
    let aircraft = AircraftSpec::a330_203();
    let route = RouteSpec::mle_tfu();
    let model = FuelRequirementModel::new(&aircraft, &route);

    let none = model.tankering_efficiency(0.0);
    assert_eq!(none.net_savings, 0.0);

    let e = model.tankering_efficiency(10_000.0);
    assert!((e.effective_tankered_fuel - 7_338.0).abs() < 1e-9);
    assert!((e.efficiency_pct - 73.38).abs() < 1e-9);
    assert!(e.net_savings > 0.0);

    let analysis = model.analyze_tankering_options(&[0.0, 5_000.0, 10_000.0]);
    assert_eq!(analysis.options.len(), 3);
    assert_eq!(analysis.best.tankering_fuel, 10_000.0);

    let unpriced = RouteSpec {
        fuel_price_dest: None,
        ..RouteSpec::mle_tfu()
    };
    let model = FuelRequirementModel::new(&aircraft, &unpriced);
    let e = model.tankering_efficiency(10_000.0);
    assert_eq!(e.net_savings, 0.0);
    assert!(e.efficiency_pct > 0.0);
}

#[test]
fn test_limiting_factor_order() {
    // all three ceilings equal: MTOW is reported
    let (tom, factor) = most_restrictive_tom(100.0, 50.0, 60.0, 50.0, 40.0);
    assert_eq!(tom, 100.0);
    assert_eq!(factor, LimitingFactor::Mtow);

    // MZFW and MLW tie below MTOW: MZFW+Fuel wins
    let (_, factor) = most_restrictive_tom(100.0, 50.0, 60.0, 40.0, 30.0);
    assert_eq!(factor, LimitingFactor::MzfwPlusFuel);

    let (_, factor) = most_restrictive_tom(100.0, 80.0, 60.0, 40.0, 10.0);
    assert_eq!(factor, LimitingFactor::MlwPlusTripFuel);
}

#[test]
fn test_weights_and_balance() {
    let aircraft = AircraftSpec::a330_203();
    let d = weights::payload_distribution(&aircraft, PAX, 10_000.0, CabinSplit::default());
    assert!((d.pax_forward + d.pax_mid + d.pax_aft - d.total_pax_weight).abs() < 1e-9);
    assert!((d.cargo_forward - 4_000.0).abs() < 1e-9);
    assert!((d.cargo_aft - 6_000.0).abs() < 1e-9);
    assert_eq!(d.total_payload, 34_174.0);

    let wb = weights::weight_and_balance(&aircraft, PAX, 10_000.0, 40_000.0, CabinSplit::default());
    assert_eq!(wb.breakdown.tom, wb.breakdown.zfm + 40_000.0);
    assert_eq!(wb.cg_pct_mac, weights::PLACEHOLDER_CG_PCT_MAC);

    let limits = weights::weight_limited_payload(&aircraft, PAX, 44_115.0);
    assert_eq!(limits.limiting_factor, PayloadLimit::Mzfw);
    assert!((limits.max_payload - 25_516.0).abs() < 1e-9);
    assert!(limits.mtow_limit > limits.mzfw_limit);

    let holds = weights::max_cargo_by_compartment(&aircraft, PAX, 40_000.0);
    assert!((holds.total_available - 15_826.0).abs() < 1e-9);
    assert_eq!(holds.forward_lower_deck, 10_000.0);
    assert_eq!(holds.bulk, 2_000.0);
}

// =============================================================================
// Property-Based Tests
// =============================================================================

#[test]
fn test_mass_balance_on_grid() {
    let ev = reference_evaluator();
    for i in 0..=10 {
        for j in 0..=10 {
            let cargo = 30_000.0 * i as f64 / 10.0;
            let fuel = 60_000.0 * j as f64 / 10.0;
            let v = ev.validate(cargo, fuel);
            assert!(
                (v.tom - v.lm - v.trip_fuel).abs() < 1e-6,
                "mass balance broken at ({}, {})",
                cargo,
                fuel
            );
            assert!((v.tom - v.zfm - v.total_fuel).abs() < 1e-6);
        }
    }
}

#[test]
fn test_max_cargo_monotonic_in_pax() {
    let mut previous = f64::INFINITY;
    for pax in (0..=264).step_by(12) {
        let ev = ConstraintEvaluator::new(
            AircraftSpec::a330_203(),
            RouteSpec::mle_tfu(),
            pax,
            Overrides::new(),
        );
        let max_cargo = ev.max_cargo_weight();
        assert!(max_cargo >= 0.0);
        assert!(max_cargo <= previous, "max cargo grew at {} pax", pax);
        previous = max_cargo;
    }
}

#[test]
fn test_max_cargo_monotonic_in_mzfw() {
    let mut previous = -1.0;
    for mzfw in (140_000..=200_000).step_by(5_000) {
        let aircraft = AircraftSpec {
            mzfw: mzfw as f64,
            ..AircraftSpec::a330_203()
        };
        let ev = ConstraintEvaluator::new(aircraft, RouteSpec::mle_tfu(), PAX, Overrides::new());
        let max_cargo = ev.max_cargo_weight();
        assert!(max_cargo >= previous, "max cargo shrank at MZFW {}", mzfw);
        previous = max_cargo;
    }
}

#[test]
fn test_baseline_always_feasible() {
    for code in RouteSpec::CODES {
        let route = RouteSpec::by_code(code).unwrap();
        let v = validate_weight_distribution(
            &AircraftSpec::a330_203(),
            &route,
            PAX,
            0.0,
            0.0,
            &Overrides::new(),
        );
        assert!(v.valid, "{} baseline should be feasible", code);
        assert!(!v.violations.any());
    }
}

#[test]
fn test_linear_matches_grid_without_tankering() {
    let mut opt = reference_optimizer();
    let cmp = opt.compare_strategies();
    assert_eq!(cmp.linear.status, Status::Optimal);
    assert_eq!(cmp.grid_search.status, Status::Optimal);
    assert_eq!(cmp.cargo_delta, 0.0);
    assert_eq!(cmp.tankering_delta, 0.0);
    assert!(cmp.profit_delta.abs() < 1e-6);
}

#[test]
fn test_linear_matches_grid_with_tankering() {
    let mut opt = Optimizer::new(burnless_aircraft(), RouteSpec::mle_tfu(), PAX, Overrides::new());
    let (cargo_steps, fuel_steps) = opt.grid();
    let linear = opt.optimize(Strategy::Linear);
    let grid = opt.optimize(Strategy::GridSearch);

    assert_eq!(linear.status, Status::Optimal);
    assert_eq!(grid.status, Status::Optimal);
    assert!(linear.optimal_tankering > 0.0, "price spread should favour tankering");
    assert!(!linear.constraints_violated);
    assert!(!grid.constraints_violated);

    let ev = opt.evaluator();
    let cargo_step = ev.max_cargo_weight() / (cargo_steps - 1) as f64;
    let fuel_step = ev.max_extra_fuel() / (fuel_steps - 1) as f64;
    assert!((linear.optimal_cargo - grid.optimal_cargo).abs() <= cargo_step + 1e-6);
    assert!((linear.optimal_tankering - grid.optimal_tankering).abs() <= fuel_step + 1e-6);

    // linear is the true optimum, grid trails by at most one step of value
    assert!(linear.total_profit >= grid.total_profit - 1e-6);
    let route = RouteSpec::mle_tfu();
    let per_kg_fuel = (route.fuel_price_dest.unwrap() - route.fuel_price_origin.unwrap()) / 0.785;
    let bound = 2.6 * cargo_step + per_kg_fuel * fuel_step;
    assert!(linear.total_profit - grid.total_profit <= bound);
}

#[test]
fn test_grid_tie_first_row_major_wins() {
    // equal prices, no cargo rate, no burn: every grid point earns exactly zero
    let flat = RouteSpec {
        fuel_price_dest: RouteSpec::mle_tfu().fuel_price_origin,
        cargo_revenue_rate: Some(0.0),
        ..RouteSpec::mle_tfu()
    };
    let mut opt = Optimizer::new(burnless_aircraft(), flat, PAX, Overrides::new()).with_grid(5, 5);
    let result = opt.optimize(Strategy::GridSearch);
    assert_eq!(result.status, Status::Optimal);
    assert_eq!(result.optimal_cargo, 0.0);
    assert_eq!(result.optimal_tankering, 0.0);
    assert_eq!(result.total_profit, 0.0);

    // profit depends on fuel only, so the cargo-zero row is never displaced
    let fuel_only = RouteSpec {
        cargo_revenue_rate: Some(0.0),
        ..RouteSpec::mle_tfu()
    };
    let mut opt = Optimizer::new(burnless_aircraft(), fuel_only, PAX, Overrides::new()).with_grid(5, 5);
    let result = opt.optimize(Strategy::GridSearch);
    assert_eq!(result.status, Status::Optimal);
    assert_eq!(result.optimal_cargo, 0.0);

    let ev = opt.evaluator();
    let fuel_step = ev.max_extra_fuel() / 4.0;
    let expected = (0..5)
        .map(|i| fuel_step * i as f64)
        .filter(|&fuel| ev.validate(0.0, fuel).valid)
        .fold(0.0, f64::max);
    assert!(expected > 0.0);
    assert_eq!(result.optimal_tankering, expected);
}

#[test]
fn test_optimize_is_cached() {
    let mut opt = reference_optimizer();
    assert!(opt.cached(Strategy::Linear).is_none());
    let first = opt.optimize(Strategy::Linear);
    assert!(opt.cached(Strategy::Linear).is_some());
    let second = opt.optimize(Strategy::Linear);
    assert_eq!(first, second);
    assert_eq!(first.total_profit.to_bits(), second.total_profit.to_bits());

    opt.clear_cache();
    assert!(opt.cached(Strategy::Linear).is_none());
    assert_eq!(opt.optimize(Strategy::Linear), first);
}

#[test]
fn test_zero_burn_spread_gives_positive_savings() {
    for uplift in [1.0, 500.0, 25_000.0] {
        let savings = economics::tankering_savings(uplift, 0.6875, 0.9974, 0.785, 0.0);
        assert!(savings > 0.0, "uplift {} should save money", uplift);
    }
}

#[test]
fn test_optimum_never_violates() {
    for code in RouteSpec::CODES {
        let route = RouteSpec::by_code(code).unwrap();
        for strategy in Strategy::ALL {
            let r = optimize_for_route(
                &AircraftSpec::a330_203(),
                &route,
                PAX,
                &Overrides::new(),
                strategy.name(),
            )
            .unwrap();
            assert_eq!(r.status, Status::Optimal, "{} {}", code, strategy);
            assert!(!r.constraints_violated, "{} {}", code, strategy);
            assert!(r.limiting_factor.is_some());
        }
    }
}

// =============================================================================
// Regression Tests
// =============================================================================

#[test]
fn test_reference_flight_envelope() {
    let ev = reference_evaluator();
    assert_eq!(ev.max_cargo_weight(), 25_516.0);
    assert_eq!(ev.max_fuel_capacity(), 109_186.0);
    assert!((ev.base_min_fuel() - 36_983.05).abs() < 1e-6);
    assert!((ev.max_extra_fuel() - 51_532.95).abs() < 1e-6);
    assert!((RouteSpec::mle_tfu().tankering_factor().unwrap() - 1.4507).abs() < 1e-3);
}

#[test]
fn test_reference_flight_linear() {
    let r = optimize_for_route(
        &AircraftSpec::a330_203(),
        &RouteSpec::mle_tfu(),
        PAX,
        &Overrides::new(),
        "linear",
    )
    .unwrap();

    assert_eq!(r.status, Status::Optimal);
    assert!(!r.constraints_violated);
    assert_eq!(r.optimal_cargo, 25_516.0);
    // burn penalty outweighs the price spread
    assert_eq!(r.optimal_tankering, 0.0);
    assert!((r.trip_fuel - 39_633.3592).abs() < 1e-6);
    assert!((r.tom - 214_115.02716).abs() < 1e-3);
    assert!((r.zfm - 170_000.0).abs() < 1e-9);
    assert!((r.tom - r.lm - r.trip_fuel).abs() < 1e-6);
    assert!(matches!(
        r.limiting_factor,
        Some(LimitingFactor::Mtow | LimitingFactor::MzfwPlusFuel | LimitingFactor::MlwPlusTripFuel)
    ));
    assert_eq!(r.limiting_factor, Some(LimitingFactor::MzfwPlusFuel));
    assert!(
        (r.total_profit - (r.cargo_revenue + r.fuel_savings - r.additional_burn_cost)).abs() < 1e-9
    );
    assert!((r.cargo_revenue - 66_341.6).abs() < 1e-6);
}

#[test]
fn test_expensive_destination_triggers_tankering() {
    let opt = reference_optimizer();
    let points = opt.sensitivity_analysis(
        RouteParam::FuelPriceDest,
        &[0.9974, 2.0],
        Strategy::Linear,
    );
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].result.optimal_tankering, 0.0);

    let tankered = points[1].result;
    assert_eq!(tankered.status, Status::Optimal);
    assert!(tankered.optimal_tankering > 7_000.0);
    assert!(!tankered.constraints_violated);
    assert_eq!(tankered.optimal_cargo, 25_516.0);
    // landing weight caps the uplift
    assert!(tankered.violations.mlw == 0.0 && (tankered.lm - 182_000.0).abs() < 1e-3);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_missing_fuel_price() {
    for route in [
        RouteSpec {
            fuel_price_origin: None,
            ..RouteSpec::mle_tfu()
        },
        RouteSpec {
            fuel_price_dest: None,
            ..RouteSpec::mle_tfu()
        },
    ] {
        for strategy in Strategy::ALL {
            let mut opt = Optimizer::new(AircraftSpec::a330_203(), route.clone(), PAX, Overrides::new());
            let r = opt.optimize(strategy);
            assert_eq!(r.status, Status::MissingFuelPrice);
            assert!(r.status.to_string().starts_with("ERROR"));
            assert_all_zero(&r);
        }
    }
}

#[test]
fn test_missing_cargo_rate() {
    let route = RouteSpec {
        cargo_revenue_rate: None,
        ..RouteSpec::mle_tfu()
    };
    let mut opt = Optimizer::new(AircraftSpec::a330_203(), route.clone(), PAX, Overrides::new());
    let r = opt.optimize(Strategy::Linear);
    assert_eq!(r.status, Status::MissingCargoRate);
    assert_all_zero(&r);

    // an override supplies the missing rate
    let overrides = Overrides::new().with(OverrideKey::CargoRevenueRate, 3.0);
    let mut opt = Optimizer::new(AircraftSpec::a330_203(), route, PAX, overrides);
    assert_eq!(opt.optimize(Strategy::Linear).status, Status::Optimal);
}

#[test]
fn test_infeasible_regulated_mtow() {
    let overrides = Overrides::new().with(OverrideKey::RegulatedMtow, 150_000.0);
    let mut opt = Optimizer::new(AircraftSpec::a330_203(), RouteSpec::mle_tfu(), PAX, overrides);

    let linear = opt.optimize(Strategy::Linear);
    assert_eq!(linear.status, Status::NoOptimalSolution);
    assert_eq!(linear.status.message(), "ERROR: No optimal solution found");
    assert_all_zero(&linear);

    let grid = opt.optimize(Strategy::GridSearch);
    assert_eq!(grid.status, Status::NoFeasibleSolution);
    assert_eq!(grid.status.message(), "ERROR: No feasible solution found");
    assert_all_zero(&grid);
}

#[test]
fn test_unknown_names_fail_loudly() {
    let err = optimize_for_route(
        &AircraftSpec::a330_203(),
        &RouteSpec::mle_tfu(),
        PAX,
        &Overrides::new(),
        "simplex",
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownStrategy(ref name) if name == "simplex"));

    let opt = reference_optimizer();
    let err = sensitivity_by_name(&opt, "fuel_price", &[1.0], "linear").unwrap_err();
    assert!(matches!(err, Error::UnknownParameter(_)));

    let err = Overrides::from_pairs([("max_cargo", 1.0)]).unwrap_err();
    assert!(matches!(err, Error::UnknownOverride(_)));
}

#[test]
fn test_direct_validation_reports_violations() {
    let ev = reference_evaluator();
    let v = ev.validate(30_000.0, 80_000.0);
    assert!(!v.valid);
    assert!((v.violations.mzfw - 4_484.0).abs() < 1e-6);
    assert!(v.violations.mtow > 0.0);
    assert!(v.violations.fuel_capacity > 0.0);
    assert_eq!(ev.last_violations(), v.violations);
}

// =============================================================================
// Override and Analysis Tests
// =============================================================================

#[test]
fn test_cargo_rate_override_copies_route() {
    let route = RouteSpec::mle_tfu();
    let overrides = Overrides::new().with(OverrideKey::CargoRevenueRate, 5.0);
    let opt = Optimizer::new(AircraftSpec::a330_203(), route.clone(), PAX, overrides);
    assert_eq!(opt.route().cargo_revenue_rate, Some(5.0));
    assert_eq!(route.cargo_revenue_rate, Some(2.6));
}

#[test]
fn test_zfw_and_block_fuel_overrides() {
    let overrides = Overrides::new()
        .with(OverrideKey::ActualZfw, 160_000.0)
        .with(OverrideKey::TaxiFuel, 300.0);
    let mut opt = Optimizer::new(AircraftSpec::a330_203(), RouteSpec::mle_tfu(), PAX, overrides);
    assert_eq!(opt.evaluator().taxi_fuel(), Some(300.0));
    let r = opt.optimize(Strategy::Linear);
    assert!((r.optimal_cargo - 15_516.0).abs() < 1e-6);

    let overrides = Overrides::new().with(OverrideKey::BlockFuel, 40_000.0);
    let ev = ConstraintEvaluator::new(AircraftSpec::a330_203(), RouteSpec::mle_tfu(), PAX, overrides);
    assert!((ev.max_extra_fuel() - (40_000.0 - 36_983.05)).abs() < 1e-6);
}

#[test]
fn test_sensitivity_leaves_route_untouched() {
    let opt = reference_optimizer();
    let before = opt.route().clone();
    let rates = [1.0, 2.0, 3.0, 4.0];
    let points = opt.sensitivity_analysis(RouteParam::CargoRevenueRate, &rates, Strategy::Linear);

    assert_eq!(opt.route(), &before);
    assert_eq!(points.len(), rates.len());
    for pair in points.windows(2) {
        assert!(pair[1].result.total_profit >= pair[0].result.total_profit);
    }
    for (p, rate) in points.iter().zip(rates) {
        assert_eq!(p.value, rate);
        assert!((p.result.cargo_revenue - p.result.optimal_cargo * rate).abs() < 1e-6);
    }
}

#[test]
fn test_tradeoff_curve() {
    let mut opt = reference_optimizer();
    let curve = opt.analyze_tradeoff(10);
    assert_eq!(curve.points.len(), 11);
    assert_eq!(curve.payload, 25_516.0);
    assert_eq!(curve.points[0].cargo, 0.0);
    assert_eq!(curve.points[0].extra_fuel, 25_516.0);
    assert_eq!(curve.points[10].cargo, 25_516.0);
    assert_eq!(curve.feasible_count(), 11);

    let best = curve.best().unwrap();
    assert_eq!(best.ratio, 1.0);

    let optimum = opt.optimize(Strategy::Linear);
    assert_eq!(curve.nearest_ratio(&optimum).unwrap().ratio, 1.0);
}

#[test]
fn test_tradeoff_rejects_fuel_heavy_mixes() {
    let overrides = Overrides::new().with(OverrideKey::BlockFuel, 50_000.0);
    let opt = Optimizer::new(AircraftSpec::a330_203(), RouteSpec::mle_tfu(), PAX, overrides);
    let curve = opt.analyze_tradeoff(4);

    match curve.points[0].outcome {
        TradeoffOutcome::Rejected { violations } => assert!(violations.fuel_capacity > 0.0),
        TradeoffOutcome::Feasible { .. } => panic!("all-fuel mix should exceed block fuel"),
    }
    assert!(curve.points[4].profit().is_some());
    assert!(curve.feasible_count() < curve.points.len());
}

// =============================================================================
// Configuration Tests
// =============================================================================

const SAMPLE_CONFIG: &str = r#"
[program]
name = "tankopt"
version = "0.3.0"

[aircraft]
aircraft_type = "A330-203"
owe = 120310.0
mtow = 233000.0
mlw = 182000.0
mzfw = 170000.0
fuel_capacity = 109186.0
fuel_density = 0.785
passenger_capacity = 264
std_pax_weight = 102.0

[routes.MLE-TFU]
origin = "TFU"
destination = "MLE"
distance = 2662.0
flight_time = 6.08
flight_level = 380
wind_component = -22.0
min_trip_fuel = 32841.0
fuel_price_origin = 0.6875
fuel_price_dest = 0.9974
cargo_revenue_rate = 2.6

[optimization]
method = "grid_search"
cargo_steps = 30

[overrides]
taxi_fuel = 400.0
"#;

#[test]
fn test_default_config_is_valid() {
    let cfg = config::Root::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.route_codes(), vec!["MLE-PEK", "MLE-PVG", "MLE-TFU"]);
    assert_eq!(cfg.aircraft_spec().unwrap(), AircraftSpec::a330_203());
    assert_eq!(cfg.route_spec("MLE-TFU").unwrap(), RouteSpec::mle_tfu());
}

#[test]
fn test_config_parses_and_defaults() {
    let cfg: config::Root = toml::from_str(SAMPLE_CONFIG).unwrap();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.strategy().unwrap(), Strategy::GridSearch);
    assert_eq!(cfg.optimization.cargo_steps, 30);
    assert_eq!(cfg.optimization.fuel_steps, 20);
    assert_eq!(cfg.optimization.pax_count, 237);
    assert_eq!(cfg.logging.level, "info");

    let aircraft = cfg.aircraft_spec().unwrap();
    assert_eq!(aircraft.variable_load, 0.0);
    assert_eq!(aircraft.additional_burn_factor, 0.0001);

    let route = cfg.route_spec("MLE-TFU").unwrap();
    assert_eq!(route.contingency_fuel_pct, 0.05);
    assert_eq!(route.reserve_fuel, 2_500.0);
    assert_eq!(route, RouteSpec::mle_tfu());

    assert_eq!(cfg.overrides().unwrap().get(OverrideKey::TaxiFuel), Some(400.0));
}

#[test]
fn test_route_config_reports_every_missing_key() {
    match RouteSpec::from_config(&RouteConfig::default()) {
        Err(Error::MissingKeys { section, keys }) => {
            assert_eq!(section, "route");
            assert_eq!(
                keys,
                vec![
                    "origin",
                    "destination",
                    "distance",
                    "flight_time",
                    "flight_level",
                    "wind_component",
                    "min_trip_fuel"
                ]
            );
        }
        other => panic!("expected MissingKeys, got {:?}", other),
    }

    let partial = RouteConfig {
        distance: None,
        ..RouteConfig::from(&RouteSpec::mle_tfu())
    };
    assert!(matches!(
        RouteSpec::from_config(&partial),
        Err(Error::MissingKeys { keys, .. }) if keys == vec!["distance"]
    ));
}

#[test]
fn test_config_rejects_bad_values() {
    let mut cfg = config::Root::default();
    cfg.optimization.method = "simplex".to_string();
    assert!(cfg.validate().is_err());

    let mut cfg = config::Root::default();
    cfg.overrides.insert("max_cargo".to_string(), 1.0);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{:#}", err).contains("max_cargo"));

    let mut cfg = config::Root::default();
    cfg.optimization.pax_count = 300;
    assert!(cfg.validate().is_err());

    let mut cfg = config::Root::default();
    cfg.aircraft.mlw = None;
    let err = cfg.validate().unwrap_err();
    assert!(format!("{:#}", err).contains("mlw"));
}

#[test]
fn test_pax_count_checked_against_capacity() {
    let cfg = config::Root::default();
    let capacity = cfg.aircraft_spec().unwrap().passenger_capacity;
    assert!(cfg.check_pax_count(0).is_ok());
    assert!(cfg.check_pax_count(capacity).is_ok());
    let err = cfg.check_pax_count(300).unwrap_err();
    assert!(format!("{:#}", err).contains("300 passengers"));
}

#[test]
fn test_config_load_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("flight.toml");
    std::fs::write(&toml_path, SAMPLE_CONFIG).unwrap();
    let (cfg, text) = config::Root::load(&toml_path).unwrap();
    assert_eq!(text, SAMPLE_CONFIG);
    assert_eq!(cfg.route_codes(), vec!["MLE-TFU"]);

    let json_path = dir.path().join("flight.json");
    std::fs::write(&json_path, serde_json::to_string(&cfg).unwrap()).unwrap();
    let (from_json, _) = config::Root::load(&json_path).unwrap();
    assert_eq!(from_json.route_spec("MLE-TFU").unwrap(), RouteSpec::mle_tfu());
    assert_eq!(from_json.strategy().unwrap(), Strategy::GridSearch);
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_result_csv_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("run.csv");

    let result = reference_optimizer().optimize(Strategy::Linear);
    let mut w = CsvWriter::create(&path).unwrap();
    w.write_result_header().unwrap();
    w.write_result_row("optimum", "TFU-MLE", "linear", &result).unwrap();
    w.flush().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("case,route,strategy,status"));
    assert!(lines[1].contains("\"Optimal solution found\""));
    assert!(lines[1].contains("MZFW+Fuel"));
    assert_eq!(
        lines[0].split(',').count(),
        lines[1].split(',').count(),
        "header and row widths differ"
    );
}

#[test]
fn test_tradeoff_and_sensitivity_csv() {
    let dir = tempfile::tempdir().unwrap();
    let opt = reference_optimizer();

    let path = dir.path().join("tradeoff.csv");
    let curve = opt.analyze_tradeoff(5);
    let mut w = CsvWriter::create(&path).unwrap();
    w.write_tradeoff_header().unwrap();
    w.write_tradeoff_curve(&curve).unwrap();
    w.flush().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 7);

    let path = dir.path().join("sensitivity.csv");
    let points = opt.sensitivity_analysis(RouteParam::FuelPriceOrigin, &[0.5, 0.7], Strategy::Linear);
    let mut w = CsvWriter::create(&path).unwrap();
    w.write_sensitivity_header().unwrap();
    w.write_sensitivity(RouteParam::FuelPriceOrigin, &points).unwrap();
    w.flush().unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().nth(1).unwrap().starts_with("fuel_price_origin,0.500000"));
}

#[test]
fn test_json_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config::Root::default();
    let result = reference_optimizer().optimize(Strategy::Linear);

    let bundle = io::ResultBundle {
        manifest: io::create_manifest(&cfg, "text"),
        inputs: io::RunInputs {
            aircraft_type: "A330-203".to_string(),
            route: "TFU-MLE".to_string(),
            pax_count: PAX,
            strategy: "linear".to_string(),
            overrides: Overrides::new().with(OverrideKey::TaxiFuel, 300.0),
        },
        result: &result,
        tankering_factor: RouteSpec::mle_tfu().tankering_factor(),
    };
    let path = io::json_path_for(dir.path().join("run.csv").to_str().unwrap());
    assert!(path.ends_with("run.json"));
    io::write_json(&path, &bundle).unwrap();

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["manifest"]["schema_version"], io::SCHEMA_VERSION);
    assert_eq!(value["manifest"]["config_hash"], io::compute_hash("text"));
    assert_eq!(value["result"]["status"], "optimal");
    assert_eq!(value["result"]["limiting_factor"], "MZFW+Fuel");
    assert_eq!(value["inputs"]["overrides"]["taxi_fuel"], 300.0);
}

#[test]
fn test_hash_is_stable() {
    assert_eq!(io::compute_hash("abc"), io::compute_hash("abc"));
    assert_ne!(io::compute_hash("abc"), io::compute_hash("abd"));
    assert_eq!(io::compute_hash("abc").len(), 16);
}
