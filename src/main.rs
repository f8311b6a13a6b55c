use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use tankopt::aircraft::AircraftSpec;
use tankopt::config;
use tankopt::constraints::{OverrideKey, Overrides};
use tankopt::io::{self, ComparisonBundle, CsvWriter, ResultBundle, RunInputs, SensitivityBundle, TradeoffBundle};
use tankopt::optimizer::{OptimizationResult, Optimizer, Strategy};
use tankopt::report;
use tankopt::route::{RouteParam, RouteSpec};

#[derive(Parser, Debug)]
#[command(name = "tankopt")]
#[command(version)]
#[command(about = "Cargo versus fuel-tankering payload optimizer")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to TOML (or .json) configuration file; built-in data when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output path for CSV results
    #[arg(short, long, global = true)]
    out: Option<String>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Flight selection and user overrides shared by the solving commands.
#[derive(clap::Args, Debug)]
struct FlightArgs {
    /// Route code, e.g. MLE-TFU
    #[arg(long, default_value = "MLE-TFU")]
    route: String,
    /// Passenger count (config default when omitted)
    #[arg(long)]
    pax: Option<u32>,
    /// Regulated take-off weight limit (kg)
    #[arg(long)]
    regulated_mtow: Option<f64>,
    /// Regulated landing weight limit (kg)
    #[arg(long)]
    regulated_mlw: Option<f64>,
    /// Actual zero-fuel weight basis for the cargo ceiling (kg)
    #[arg(long)]
    actual_zfw: Option<f64>,
    /// Block fuel, replaces tank capacity (kg)
    #[arg(long)]
    block_fuel: Option<f64>,
    /// Taxi fuel (kg), reported only
    #[arg(long)]
    taxi_fuel: Option<f64>,
    /// Cargo revenue rate (USD/kg)
    #[arg(long)]
    cargo_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize one flight
    Run {
        #[command(flatten)]
        flight: FlightArgs,
        /// Strategy: linear or grid_search (config default when omitted)
        #[arg(long)]
        method: Option<String>,
        /// Generate JSON result bundle
        #[arg(long)]
        json: bool,
    },
    /// Run both strategies and report the differences
    Compare {
        #[command(flatten)]
        flight: FlightArgs,
        #[arg(long)]
        json: bool,
    },
    /// Sample cargo/fuel splits of the payload envelope
    Tradeoff {
        #[command(flatten)]
        flight: FlightArgs,
        /// Number of ratio steps (config default when omitted)
        #[arg(long)]
        steps: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Re-optimize across values of one route parameter
    Sensitivity {
        #[command(flatten)]
        flight: FlightArgs,
        /// fuel_price_origin, fuel_price_dest or cargo_revenue_rate
        #[arg(long)]
        parameter: String,
        /// Comma-separated values
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate,
    /// List configured routes
    Routes,
    /// Print version information
    Version,
}

struct Flight {
    aircraft: AircraftSpec,
    route: RouteSpec,
    pax: u32,
    overrides: Overrides,
}

impl Flight {
    fn resolve(args: &FlightArgs, cfg: &config::Root) -> Result<Self> {
        let mut overrides = cfg.overrides()?;
        for (key, value) in [
            (OverrideKey::RegulatedMtow, args.regulated_mtow),
            (OverrideKey::RegulatedMlw, args.regulated_mlw),
            (OverrideKey::ActualZfw, args.actual_zfw),
            (OverrideKey::BlockFuel, args.block_fuel),
            (OverrideKey::TaxiFuel, args.taxi_fuel),
            (OverrideKey::CargoRevenueRate, args.cargo_rate),
        ] {
            if let Some(value) = value {
                overrides.set(key, value);
            }
        }
        let pax = args.pax.unwrap_or(cfg.optimization.pax_count);
        cfg.check_pax_count(pax).context("--pax")?;
        Ok(Self {
            aircraft: cfg.aircraft_spec()?,
            route: cfg.route_spec(&args.route)?,
            pax,
            overrides,
        })
    }

    fn optimizer(&self, cfg: &config::Root) -> Optimizer {
        Optimizer::new(
            self.aircraft.clone(),
            self.route.clone(),
            self.pax,
            self.overrides.clone(),
        )
        .with_grid(cfg.optimization.cargo_steps, cfg.optimization.fuel_steps)
    }

    fn inputs(&self, strategy: &str) -> RunInputs {
        RunInputs {
            aircraft_type: self.aircraft.aircraft_type.clone(),
            route: self.route.code(),
            pax_count: self.pax,
            strategy: strategy.to_string(),
            overrides: self.overrides.clone(),
        }
    }
}

fn strategy_for(method: Option<&str>, cfg: &config::Root) -> Result<Strategy> {
    match method {
        Some(name) => Ok(name.parse()?),
        None => cfg.strategy(),
    }
}

fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&str>) -> Result<(config::Root, String)> {
    match path {
        Some(path) => config::Root::load(path),
        None => {
            let cfg = config::Root::default();
            let text = serde_json::to_string(&cfg)?;
            Ok((cfg, text))
        }
    }
}

// ============================================================================
// Console output
// ============================================================================

fn print_result(flight: &Flight, strategy: Strategy, r: &OptimizationResult) {
    eprintln!(
        "[tankopt] {} {} pax={} strategy={}",
        flight.aircraft.aircraft_type,
        flight.route.code(),
        flight.pax,
        strategy
    );
    eprintln!("[tankopt] status: {}", r.status);
    if r.is_error() {
        return;
    }
    eprintln!("  Optimal solution:");
    eprintln!("    cargo            {:>12.1} kg", r.optimal_cargo);
    eprintln!("    tankered fuel    {:>12.1} kg", r.optimal_tankering);
    eprintln!("    trip fuel        {:>12.1} kg", r.trip_fuel);
    eprintln!("    total fuel       {:>12.1} kg", r.total_fuel);
    eprintln!("    additional burn  {:>12.1} kg", r.additional_burn);
    eprintln!("  Economics:");
    eprintln!("    cargo revenue    {:>12.2} USD", r.cargo_revenue);
    eprintln!("    fuel savings     {:>12.2} USD", r.fuel_savings);
    eprintln!("    burn cost        {:>12.2} USD", r.additional_burn_cost);
    eprintln!("    total profit     {:>12.2} USD", r.total_profit);
    eprintln!("  Weights:");
    eprintln!("    TOM              {:>12.1} kg", r.tom);
    eprintln!("    ZFM              {:>12.1} kg", r.zfm);
    eprintln!("    LM               {:>12.1} kg", r.lm);
    eprintln!("  Constraints:");
    eprintln!("    violated         {:>12}", r.constraints_violated);
    eprintln!(
        "    limiting factor  {:>12}",
        r.limiting_factor.map(|f| f.name()).unwrap_or("-")
    );
    match flight.route.tankering_factor() {
        Some(factor) => eprintln!("  Tankering factor: {:.4}", factor),
        None => eprintln!("  Tankering factor: n/a"),
    }
}

// ============================================================================
// Run Modes
// ============================================================================

fn run_single(
    cfg: &config::Root,
    cfg_text: &str,
    flight: &Flight,
    strategy: Strategy,
    out_path: &str,
    json_output: bool,
) -> Result<()> {
    report::log_inputs(&flight.aircraft, &flight.route, flight.pax, &flight.overrides);

    let start = Instant::now();
    let mut optimizer = flight.optimizer(cfg);
    let result = optimizer.optimize(strategy);
    let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    report::log_result(&result);
    print_result(flight, strategy, &result);
    eprintln!("[tankopt] solved in {:.2} ms", wall_time_ms);

    let mut w = CsvWriter::create(out_path)?;
    w.write_result_header()?;
    w.write_result_row("optimum", &flight.route.code(), strategy.name(), &result)?;
    w.flush()?;
    eprintln!("[tankopt] CSV: {}", out_path);

    if json_output {
        let json_path = io::json_path_for(out_path);
        let bundle = ResultBundle {
            manifest: io::create_manifest(cfg, cfg_text),
            inputs: flight.inputs(strategy.name()),
            result: &result,
            tankering_factor: flight.route.tankering_factor(),
        };
        io::write_json(&json_path, &bundle)?;
        eprintln!("[tankopt] JSON bundle: {}", json_path);
    }

    if result.is_error() {
        eprintln!("[tankopt] WARNING: {}", result.status);
    }
    Ok(())
}

fn run_compare(cfg: &config::Root, cfg_text: &str, flight: &Flight, out_path: &str, json_output: bool) -> Result<()> {
    report::log_inputs(&flight.aircraft, &flight.route, flight.pax, &flight.overrides);

    let mut optimizer = flight.optimizer(cfg);
    let cmp = optimizer.compare_strategies();
    report::log_comparison(&cmp);

    let mut w = CsvWriter::create(out_path)?;
    w.write_result_header()?;
    let code = flight.route.code();
    w.write_result_row("linear", &code, Strategy::Linear.name(), &cmp.linear)?;
    w.write_result_row("grid_search", &code, Strategy::GridSearch.name(), &cmp.grid_search)?;
    w.flush()?;

    let (cargo_steps, fuel_steps) = optimizer.grid();
    eprintln!("[tankopt] comparison complete ({}x{} grid)", cargo_steps, fuel_steps);
    eprintln!(
        "  Linear: status=\"{}\" cargo={:.1} fuel={:.1} profit={:.2}",
        cmp.linear.status, cmp.linear.optimal_cargo, cmp.linear.optimal_tankering, cmp.linear.total_profit
    );
    eprintln!(
        "  Grid:   status=\"{}\" cargo={:.1} fuel={:.1} profit={:.2}",
        cmp.grid_search.status,
        cmp.grid_search.optimal_cargo,
        cmp.grid_search.optimal_tankering,
        cmp.grid_search.total_profit
    );
    eprintln!(
        "  Delta:  cargo={:+.1} fuel={:+.1} profit={:+.2}",
        cmp.cargo_delta, cmp.tankering_delta, cmp.profit_delta
    );
    eprintln!("[tankopt] CSV: {}", out_path);

    if json_output {
        let json_path = io::json_path_for(out_path);
        let bundle = ComparisonBundle {
            manifest: io::create_manifest(cfg, cfg_text),
            inputs: flight.inputs("compare"),
            comparison: &cmp,
        };
        io::write_json(&json_path, &bundle)?;
        eprintln!("[tankopt] JSON comparison: {}", json_path);
    }
    Ok(())
}

fn run_tradeoff(
    cfg: &config::Root,
    cfg_text: &str,
    flight: &Flight,
    steps: usize,
    out_path: &str,
    json_output: bool,
) -> Result<()> {
    let mut optimizer = flight.optimizer(cfg);
    let curve = optimizer.analyze_tradeoff(steps);
    let optimum = optimizer.optimize(Strategy::Linear);
    report::log_tradeoff(&curve, Some(&optimum));

    let mut w = CsvWriter::create(out_path)?;
    w.write_tradeoff_header()?;
    w.write_tradeoff_curve(&curve)?;
    w.flush()?;

    eprintln!(
        "[tankopt] tradeoff: {} samples over {:.1} kg payload, {} feasible",
        curve.points.len(),
        curve.payload,
        curve.feasible_count()
    );
    if let Some(best) = curve.best() {
        eprintln!(
            "  best sample: ratio={:.2} cargo={:.1} fuel={:.1} profit={:.2}",
            best.ratio,
            best.cargo,
            best.extra_fuel,
            best.profit().unwrap_or_default()
        );
    }
    if let Some(nearest) = curve.nearest_ratio(&optimum) {
        eprintln!("  linear optimum lies nearest ratio {:.2}", nearest.ratio);
    }
    eprintln!("[tankopt] CSV: {}", out_path);

    if json_output {
        let json_path = io::json_path_for(out_path);
        let bundle = TradeoffBundle {
            manifest: io::create_manifest(cfg, cfg_text),
            inputs: flight.inputs(Strategy::Linear.name()),
            curve: &curve,
            optimum: &optimum,
        };
        io::write_json(&json_path, &bundle)?;
        eprintln!("[tankopt] JSON tradeoff: {}", json_path);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_sensitivity(
    cfg: &config::Root,
    cfg_text: &str,
    flight: &Flight,
    param: RouteParam,
    values: &[f64],
    strategy: Strategy,
    out_path: &str,
    json_output: bool,
) -> Result<()> {
    let optimizer = flight.optimizer(cfg);
    let points = optimizer.sensitivity_analysis(param, values, strategy);
    report::log_sensitivity(param, &points);

    let mut w = CsvWriter::create(out_path)?;
    w.write_sensitivity_header()?;
    w.write_sensitivity(param, &points)?;
    w.flush()?;

    eprintln!("[tankopt] sensitivity of {} ({} values, {})", param, points.len(), strategy);
    eprintln!("  {:>10} {:>12} {:>12} {:>14}", "value", "cargo", "fuel", "profit");
    eprintln!("  {}", "-".repeat(52));
    for p in &points {
        eprintln!(
            "  {:>10.4} {:>12.1} {:>12.1} {:>14.2}",
            p.value, p.result.optimal_cargo, p.result.optimal_tankering, p.result.total_profit
        );
    }
    eprintln!("[tankopt] CSV: {}", out_path);

    if json_output {
        let json_path = io::json_path_for(out_path);
        let bundle = SensitivityBundle {
            manifest: io::create_manifest(cfg, cfg_text),
            inputs: flight.inputs(strategy.name()),
            parameter: param,
            points: &points,
        };
        io::write_json(&json_path, &bundle)?;
        eprintln!("[tankopt] JSON sensitivity: {}", json_path);
    }
    Ok(())
}

fn validate_config(cfg_path: &str) -> Result<()> {
    let (cfg, _) = config::Root::load(cfg_path)?;
    let aircraft = cfg.aircraft_spec()?;

    eprintln!("[tankopt] config valid: {}", cfg_path);
    eprintln!("  program: {} v{}", cfg.program.name, cfg.program.version);
    eprintln!(
        "  aircraft: {} MTOW={} MLW={} MZFW={} capacity={}",
        aircraft.aircraft_type, aircraft.mtow, aircraft.mlw, aircraft.mzfw, aircraft.fuel_capacity
    );
    eprintln!("  routes: {}", cfg.route_codes().join(", "));
    eprintln!(
        "  optimization: method={} pax={} grid={}x{} tradeoff_steps={}",
        cfg.optimization.method,
        cfg.optimization.pax_count,
        cfg.optimization.cargo_steps,
        cfg.optimization.fuel_steps,
        cfg.optimization.tradeoff_steps
    );
    let overrides = cfg.overrides()?;
    if !overrides.is_empty() {
        for (key, value) in overrides.iter() {
            eprintln!("  override: {} = {}", key, value);
        }
    }
    Ok(())
}

fn list_routes(cfg: &config::Root) -> Result<()> {
    eprintln!("  {:10} {:>8} {:>10} {:>10} {:>10} {:>8}", "Route", "nm", "trip kg", "origin $", "dest $", "factor");
    eprintln!("  {}", "-".repeat(62));
    for code in cfg.route_codes() {
        let route = cfg.route_spec(code)?;
        let price = |p: Option<f64>| p.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
        eprintln!(
            "  {:10} {:>8.0} {:>10.0} {:>10} {:>10} {:>8}",
            code,
            route.distance,
            route.min_trip_fuel,
            price(route.fuel_price_origin),
            price(route.fuel_price_dest),
            price(route.tankering_factor())
        );
    }
    Ok(())
}

fn print_version() {
    eprintln!("tankopt {}", env!("CARGO_PKG_VERSION"));
    eprintln!("  result schema: {}", io::SCHEMA_VERSION);
    eprintln!("  strategies: {}", Strategy::ALL.map(|s| s.name()).join(", "));
    eprintln!("  built-in routes: {}", RouteSpec::CODES.join(", "));
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    if let Commands::Version = args.command {
        print_version();
        return Ok(());
    }
    if let Commands::Validate = args.command {
        let cfg_path = args.config.context("--config required for validate")?;
        return validate_config(&cfg_path);
    }

    let (cfg, cfg_text) = load_config(args.config.as_deref())?;
    init_logging(&cfg.logging.level, args.verbose);
    tracing::debug!(program = %cfg.program.name, version = %cfg.program.version, "config loaded");

    match args.command {
        Commands::Run { flight, method, json } => {
            let out_path = args.out.unwrap_or_else(|| "results/run.csv".to_string());
            let strategy = strategy_for(method.as_deref(), &cfg)?;
            let flight = Flight::resolve(&flight, &cfg)?;
            run_single(&cfg, &cfg_text, &flight, strategy, &out_path, json)
        }
        Commands::Compare { flight, json } => {
            let out_path = args.out.unwrap_or_else(|| "results/compare.csv".to_string());
            let flight = Flight::resolve(&flight, &cfg)?;
            run_compare(&cfg, &cfg_text, &flight, &out_path, json)
        }
        Commands::Tradeoff { flight, steps, json } => {
            let out_path = args.out.unwrap_or_else(|| "results/tradeoff.csv".to_string());
            let steps = steps.unwrap_or(cfg.optimization.tradeoff_steps);
            let flight = Flight::resolve(&flight, &cfg)?;
            run_tradeoff(&cfg, &cfg_text, &flight, steps, &out_path, json)
        }
        Commands::Sensitivity { flight, parameter, values, method, json } => {
            let out_path = args.out.unwrap_or_else(|| "results/sensitivity.csv".to_string());
            let param: RouteParam = parameter.parse()?;
            let strategy = strategy_for(method.as_deref(), &cfg)?;
            let flight = Flight::resolve(&flight, &cfg)?;
            run_sensitivity(&cfg, &cfg_text, &flight, param, &values, strategy, &out_path, json)
        }
        Commands::Routes => list_routes(&cfg),
        Commands::Validate | Commands::Version => Ok(()),
    }
}
