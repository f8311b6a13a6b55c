//! Money side of the cargo/tankering tradeoff.
//!
//! Fuel quantities are in kg and prices in USD per liter; conversion goes
//! through the aircraft fuel density (kg/L).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Labeled profit components for one (cargo, extra fuel) pair. USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub cargo_revenue: f64,
    pub tankering_savings: f64,
    pub additional_burn_cost: f64,
    pub total_profit: f64,
}

/// Prices and rate needed to value a solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSet {
    pub price_origin: f64,
    pub price_dest: f64,
    pub cargo_rate: f64,
    pub fuel_density: f64,
}

pub fn cargo_revenue(cargo_weight: f64, rate_per_kg: f64) -> f64 {
    cargo_weight * rate_per_kg
}

/// Value at destination of the uplifted fuel still onboard after
/// `additional_burn`, minus what the uplift cost at origin. Negative means
/// tankering lost money.
pub fn tankering_savings(
    uplifted_fuel: f64,
    price_origin: f64,
    price_dest: f64,
    fuel_density: f64,
    additional_burn: f64,
) -> f64 {
    let cost_at_origin = uplifted_fuel / fuel_density * price_origin;
    let value_at_dest = (uplifted_fuel - additional_burn) / fuel_density * price_dest;
    value_at_dest - cost_at_origin
}

/// `price_dest / price_origin`. Above 1 the fuel is cheaper at origin.
pub fn tankering_factor(price_origin: f64, price_dest: f64) -> Result<f64> {
    if price_origin == 0.0 {
        return Err(Error::ZeroOriginPrice);
    }
    Ok(price_dest / price_origin)
}

pub fn total_profit(
    cargo_weight: f64,
    uplifted_fuel: f64,
    additional_burn: f64,
    prices: &PriceSet,
) -> ProfitBreakdown {
    let cargo_revenue = cargo_revenue(cargo_weight, prices.cargo_rate);
    let tankering_savings = tankering_savings(
        uplifted_fuel,
        prices.price_origin,
        prices.price_dest,
        prices.fuel_density,
        additional_burn,
    );
    let additional_burn_cost = additional_burn / prices.fuel_density * prices.price_origin;

    ProfitBreakdown {
        cargo_revenue,
        tankering_savings,
        additional_burn_cost,
        total_profit: cargo_revenue + tankering_savings - additional_burn_cost,
    }
}

/// Objective gradient `(d profit / d cargo, d profit / d extra fuel)` when
/// additional burn is `burn_per_kg` times the total extra weight. The
/// profit of [`total_profit`] is exactly linear under that burn model.
pub fn profit_gradient(prices: &PriceSet, burn_per_kg: f64) -> (f64, f64) {
    let burn_value = burn_per_kg * (prices.price_dest + prices.price_origin) / prices.fuel_density;
    let spread = (prices.price_dest - prices.price_origin) / prices.fuel_density;
    (prices.cargo_rate - burn_value, spread - burn_value)
}
