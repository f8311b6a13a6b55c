//! Fuel requirements and the extra burn caused by extra weight.
//!
//! Trip fuel grows linearly with the weight carried on top of the baseline:
//!
//! ```text
//! trip  = min_trip_fuel + burn_factor * (cargo + extra_fuel) * distance
//! min   = trip * (1 + contingency_pct) + alternate + reserve
//! total = min + extra_fuel
//! ```

use serde::{Deserialize, Serialize};

use crate::aircraft::AircraftSpec;
use crate::route::RouteSpec;

/// Complete fuel picture for one (cargo, extra fuel) pair. All kg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelBreakdown {
    pub trip_fuel: f64,
    pub contingency_fuel: f64,
    pub alternate_fuel: f64,
    pub reserve_fuel: f64,
    pub min_required_fuel: f64,
    pub total_fuel: f64,
    /// Extra trip burn from all extra weight, cargo included
    pub additional_burn: f64,
    /// Extra trip burn from the tankered fuel alone
    pub additional_burn_tankering: f64,
    /// Tankered fuel left at destination; reporting only
    pub effective_tankered_fuel: f64,
}

/// How much of a tankered uplift survives the trip, and what it is worth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankeringEfficiency {
    pub tankering_fuel: f64,
    pub additional_burn: f64,
    pub effective_tankered_fuel: f64,
    pub efficiency_pct: f64,
    pub cost_at_origin: f64,
    pub value_at_dest: f64,
    pub net_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankeringAnalysis {
    pub options: Vec<TankeringEfficiency>,
    pub best: TankeringEfficiency,
}

#[derive(Debug, Clone, Copy)]
pub struct FuelRequirementModel<'a> {
    aircraft: &'a AircraftSpec,
    route: &'a RouteSpec,
}

impl<'a> FuelRequirementModel<'a> {
    pub fn new(aircraft: &'a AircraftSpec, route: &'a RouteSpec) -> Self {
        Self { aircraft, route }
    }

    /// Extra trip fuel per kg of extra weight on this route.
    pub fn burn_per_kg(&self) -> f64 {
        self.aircraft.additional_burn_factor * self.route.distance
    }

    pub fn additional_burn(&self, extra_weight: f64) -> f64 {
        self.aircraft.additional_burn(extra_weight, self.route.distance)
    }

    pub fn trip_fuel(&self, extra_weight: f64) -> f64 {
        self.route.min_trip_fuel + self.additional_burn(extra_weight)
    }

    pub fn contingency_fuel(&self, trip_fuel: f64) -> f64 {
        trip_fuel * self.route.contingency_fuel_pct
    }

    pub fn alternate_fuel(&self) -> f64 {
        self.route.alternate_fuel.unwrap_or(0.0)
    }

    pub fn reserve_fuel(&self) -> f64 {
        self.route.reserve_fuel
    }

    pub fn min_required_fuel(&self, trip_fuel: f64) -> f64 {
        trip_fuel + self.contingency_fuel(trip_fuel) + self.alternate_fuel() + self.reserve_fuel()
    }

    pub fn breakdown(&self, cargo: f64, extra_fuel: f64) -> FuelBreakdown {
        let additional_burn = self.additional_burn(cargo + extra_fuel);
        let trip_fuel = self.route.min_trip_fuel + additional_burn;
        let contingency_fuel = self.contingency_fuel(trip_fuel);
        let alternate_fuel = self.alternate_fuel();
        let reserve_fuel = self.reserve_fuel();
        let min_required_fuel = trip_fuel + contingency_fuel + alternate_fuel + reserve_fuel;
        let additional_burn_tankering = self.additional_burn(extra_fuel);

        FuelBreakdown {
            trip_fuel,
            contingency_fuel,
            alternate_fuel,
            reserve_fuel,
            min_required_fuel,
            total_fuel: min_required_fuel + extra_fuel,
            additional_burn,
            additional_burn_tankering,
            effective_tankered_fuel: extra_fuel - additional_burn_tankering,
        }
    }

    /// Money terms are zero when the route lacks either fuel price.
    pub fn tankering_efficiency(&self, tankering_fuel: f64) -> TankeringEfficiency {
        if tankering_fuel <= 0.0 {
            return TankeringEfficiency::default();
        }

        let additional_burn = self.additional_burn(tankering_fuel);
        let effective = (tankering_fuel - additional_burn).max(0.0);
        let efficiency_pct = effective / tankering_fuel * 100.0;

        let (cost_at_origin, value_at_dest) =
            match (self.route.fuel_price_origin, self.route.fuel_price_dest) {
                (Some(origin), Some(dest)) => {
                    let density = self.aircraft.fuel_density;
                    (
                        tankering_fuel / density * origin,
                        effective / density * dest,
                    )
                }
                _ => (0.0, 0.0),
            };

        TankeringEfficiency {
            tankering_fuel,
            additional_burn,
            effective_tankered_fuel: effective,
            efficiency_pct,
            cost_at_origin,
            value_at_dest,
            net_savings: value_at_dest - cost_at_origin,
        }
    }

    /// Evaluate each candidate uplift; the best is the largest positive net
    /// saving (first wins on ties), or no tankering at all.
    pub fn analyze_tankering_options(&self, options: &[f64]) -> TankeringAnalysis {
        let options: Vec<TankeringEfficiency> = options
            .iter()
            .map(|&fuel| self.tankering_efficiency(fuel))
            .collect();

        let mut best = TankeringEfficiency::default();
        for option in &options {
            if option.net_savings > best.net_savings {
                best = *option;
            }
        }

        TankeringAnalysis { options, best }
    }
}
