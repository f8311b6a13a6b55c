//! Cargo versus fuel-tankering payload optimization for long-haul flights.
//!
//! Given an aircraft, a route, a passenger count and optional operational
//! overrides, [`optimizer::Optimizer`] splits the remaining payload between
//! revenue cargo and fuel tankered from a cheaper origin so that total flight
//! profit is maximal under MTOW, MLW, MZFW and tank-capacity limits.
//!
//! ```no_run
//! use tankopt::{optimize_for_route, AircraftSpec, Overrides, RouteSpec};
//!
//! let result = optimize_for_route(
//!     &AircraftSpec::a330_203(),
//!     &RouteSpec::mle_tfu(),
//!     237,
//!     &Overrides::new(),
//!     "linear",
//! )?;
//! println!("{} kg cargo, {} kg tankered", result.optimal_cargo, result.optimal_tankering);
//! # Ok::<(), tankopt::Error>(())
//! ```

pub mod aircraft;
pub mod config;
pub mod constraints;
pub mod economics;
pub mod error;
pub mod fuel;
pub mod io;
pub mod lp;
pub mod optimizer;
pub mod report;
pub mod route;
pub mod weights;

pub use aircraft::{AircraftSpec, LimitingFactor};
pub use constraints::{ConstraintEvaluator, OverrideKey, Overrides, Validation, Violations};
pub use error::{Error, Result};
pub use fuel::FuelRequirementModel;
pub use optimizer::{optimize_for_route, OptimizationResult, Optimizer, Status, Strategy};
pub use route::{RouteParam, RouteSpec};

#[cfg(test)]
mod tests;
