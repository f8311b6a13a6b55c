use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config;
use crate::constraints::Overrides;
use crate::optimizer::{OptimizationResult, SensitivityPoint, StrategyComparison, TradeoffCurve, TradeoffOutcome};
use crate::route::RouteParam;

pub const SCHEMA_VERSION: &str = "1.0.0";

pub struct CsvWriter {
    w: BufWriter<File>,
}

impl CsvWriter {
    /// Creates missing parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self { w: BufWriter::new(f) })
    }

    pub fn write_result_header(&mut self) -> Result<()> {
        writeln!(
            self.w,
            "case,route,strategy,status,optimal_cargo,optimal_tankering,trip_fuel,total_fuel,total_profit,cargo_revenue,fuel_savings,additional_burn_cost,additional_burn,tom,zfm,lm,constraints_violated,limiting_factor,mtow_violation,mlw_violation,mzfw_violation,fuel_capacity_violation"
        )?;
        Ok(())
    }

    pub fn write_result_row(
        &mut self,
        case: &str,
        route: &str,
        strategy: &str,
        r: &OptimizationResult,
    ) -> Result<()> {
        let limiting = r.limiting_factor.map(|f| f.name()).unwrap_or("");
        writeln!(
            self.w,
            "{},{},{},\"{}\",{:.3},{:.3},{:.3},{:.3},{:.2},{:.2},{:.2},{:.2},{:.3},{:.3},{:.3},{:.3},{},{},{:.3},{:.3},{:.3},{:.3}",
            case,
            route,
            strategy,
            r.status,
            r.optimal_cargo,
            r.optimal_tankering,
            r.trip_fuel,
            r.total_fuel,
            r.total_profit,
            r.cargo_revenue,
            r.fuel_savings,
            r.additional_burn_cost,
            r.additional_burn,
            r.tom,
            r.zfm,
            r.lm,
            r.constraints_violated,
            limiting,
            r.violations.mtow,
            r.violations.mlw,
            r.violations.mzfw,
            r.violations.fuel_capacity
        )?;
        Ok(())
    }

    pub fn write_tradeoff_header(&mut self) -> Result<()> {
        writeln!(
            self.w,
            "ratio,cargo,extra_fuel,valid,total_profit,cargo_revenue,fuel_savings,additional_burn,mtow_violation,mlw_violation,mzfw_violation,fuel_capacity_violation"
        )?;
        Ok(())
    }

    pub fn write_tradeoff_curve(&mut self, curve: &TradeoffCurve) -> Result<()> {
        for p in &curve.points {
            match p.outcome {
                TradeoffOutcome::Feasible { profit, additional_burn } => writeln!(
                    self.w,
                    "{:.4},{:.3},{:.3},true,{:.2},{:.2},{:.2},{:.3},0,0,0,0",
                    p.ratio,
                    p.cargo,
                    p.extra_fuel,
                    profit.total_profit,
                    profit.cargo_revenue,
                    profit.tankering_savings,
                    additional_burn
                )?,
                TradeoffOutcome::Rejected { violations: v } => writeln!(
                    self.w,
                    "{:.4},{:.3},{:.3},false,,,,,{:.3},{:.3},{:.3},{:.3}",
                    p.ratio, p.cargo, p.extra_fuel, v.mtow, v.mlw, v.mzfw, v.fuel_capacity
                )?,
            }
        }
        Ok(())
    }

    pub fn write_sensitivity_header(&mut self) -> Result<()> {
        writeln!(
            self.w,
            "parameter,value,status,optimal_cargo,optimal_tankering,total_profit,cargo_revenue,fuel_savings,limiting_factor"
        )?;
        Ok(())
    }

    pub fn write_sensitivity(&mut self, param: RouteParam, points: &[SensitivityPoint]) -> Result<()> {
        for p in points {
            let r = &p.result;
            writeln!(
                self.w,
                "{},{:.6},\"{}\",{:.3},{:.3},{:.2},{:.2},{:.2},{}",
                param,
                p.value,
                r.status,
                r.optimal_cargo,
                r.optimal_tankering,
                r.total_profit,
                r.cargo_revenue,
                r.fuel_savings,
                r.limiting_factor.map(|f| f.name()).unwrap_or("")
            )?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }
}

// ============================================================================
// JSON result bundles
// ============================================================================

#[derive(Serialize)]
pub struct Manifest {
    pub schema_version: String,
    pub tool_version: String,
    pub timestamp_utc: String,
    pub platform: String,
    pub config_hash: String,
    pub config_snapshot: config::Root,
}

/// Inputs echoed next to every result.
#[derive(Serialize)]
pub struct RunInputs {
    pub aircraft_type: String,
    pub route: String,
    pub pax_count: u32,
    pub strategy: String,
    pub overrides: Overrides,
}

#[derive(Serialize)]
pub struct ResultBundle<'a> {
    pub manifest: Manifest,
    pub inputs: RunInputs,
    pub result: &'a OptimizationResult,
    pub tankering_factor: Option<f64>,
}

#[derive(Serialize)]
pub struct ComparisonBundle<'a> {
    pub manifest: Manifest,
    pub inputs: RunInputs,
    pub comparison: &'a StrategyComparison,
}

#[derive(Serialize)]
pub struct TradeoffBundle<'a> {
    pub manifest: Manifest,
    pub inputs: RunInputs,
    pub curve: &'a TradeoffCurve,
    pub optimum: &'a OptimizationResult,
}

#[derive(Serialize)]
pub struct SensitivityBundle<'a> {
    pub manifest: Manifest,
    pub inputs: RunInputs,
    pub parameter: RouteParam,
    pub points: &'a [SensitivityPoint],
}

pub fn compute_hash(data: &str) -> String {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn create_manifest(cfg: &config::Root, cfg_text: &str) -> Manifest {
    Manifest {
        schema_version: SCHEMA_VERSION.to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp_utc: timestamp(),
        platform: std::env::consts::OS.to_string(),
        config_hash: compute_hash(cfg_text),
        config_snapshot: cfg.clone(),
    }
}

/// `results/run.csv` -> `results/run.json`
pub fn json_path_for(csv_path: &str) -> String {
    match csv_path.strip_suffix(".csv") {
        Some(stem) => format!("{}.json", stem),
        None => format!("{}.json", csv_path),
    }
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
