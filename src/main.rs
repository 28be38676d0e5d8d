use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fractalnet::address::parse_label;
use fractalnet::config::Config;
use fractalnet::config_loader::{self, CliOverrides};
use fractalnet::report::{self, level_listing, ReportMetadata, RouteReport, RunReport};
use fractalnet::routing::Router;
use fractalnet::simulation::{Simulator, SuccessCriterion};
use fractalnet::topology::{CancelToken, Topology};

/// Self-similar simplex network builder and routing simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Simplex dimension (the simplex has dimension + 1 vertices)
    #[arg(short, long, global = true)]
    dimension: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Number of parallel workers for routing trials (0 = auto-detect)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Seed for reproducible trials
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Abort builds that would exceed this many nodes
    #[arg(long, global = true)]
    max_nodes: Option<usize>,

    /// Output directory for JSON and text reports
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a network and route between two nodes
    Route {
        /// Total number of levels, base layer included
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Source node address, e.g. "4 0 3 2 4 0"
        #[arg(long)]
        source: String,

        /// Destination node address, e.g. "2 0 2 0"
        #[arg(long)]
        dest: String,

        /// Also list nodes of the first N levels
        #[arg(long, default_value = "3")]
        show_levels: usize,
    },

    /// Build a network and list its first levels with binary addresses
    Levels {
        /// Total number of levels, base layer included
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Deepest level to list
        #[arg(long, default_value = "3")]
        max_level: usize,
    },

    /// Measure routing time and hops across several iteration counts
    Simulate {
        /// Iteration counts to build, comma separated (e.g. 2,3,4,5)
        #[arg(short, long, value_delimiter = ',')]
        iterations: Option<Vec<u32>>,

        /// Number of routing trials per iteration count
        #[arg(short, long)]
        trials: Option<usize>,

        /// Simulated ping per routed request (e.g. 30ms)
        #[arg(long, value_parser = parse_delay)]
        ping_delay: Option<Duration>,
    },

    /// Remove a share of nodes and measure routing success on the rest
    Fault {
        /// Total number of levels, base layer included
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Fraction of nodes that fail (0.1 = 10%)
        #[arg(short, long)]
        fault_rate: Option<f64>,

        /// Number of routing trials
        #[arg(short, long)]
        trials: Option<usize>,

        /// Simulated ping per routed request (e.g. 30ms)
        #[arg(long, value_parser = parse_delay)]
        ping_delay: Option<Duration>,

        /// How a trial is judged successful
        #[arg(long, value_enum)]
        criterion: Option<CriterionArg>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CriterionArg {
    /// Route ends at the destination
    Endpoint,
    /// Route ends at the destination through surviving nodes only
    Reachable,
}

impl From<CriterionArg> for SuccessCriterion {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::Endpoint => SuccessCriterion::Endpoint,
            CriterionArg::Reachable => SuccessCriterion::Reachable,
        }
    }
}

fn parse_delay(value: &str) -> std::result::Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            log_level: self.log_level.clone(),
            seed: self.seed,
            threads: self.threads,
            dimension: self.dimension,
            max_nodes: self.max_nodes,
            ..Default::default()
        };

        match &self.command {
            Commands::Route { iterations, .. } | Commands::Levels { iterations, .. } => {
                overrides.iterations = *iterations;
            }
            Commands::Simulate { iterations, trials, ping_delay } => {
                overrides.sweep_iterations = iterations.clone();
                overrides.trials = *trials;
                overrides.ping_delay = *ping_delay;
            }
            Commands::Fault { iterations, fault_rate, trials, ping_delay, criterion } => {
                overrides.iterations = *iterations;
                overrides.fault_rate = *fault_rate;
                overrides.trials = *trials;
                overrides.ping_delay = *ping_delay;
                overrides.success_criterion = criterion.map(SuccessCriterion::from);
            }
        }

        overrides
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let cli = Cli::parse();

    // The file's log level is only known after loading it, so the logger
    // accepts everything and the active level is set through the log facade.
    // An explicit RUST_LOG wins over both.
    let env_filter_set = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::from_env(Env::default().default_filter_or("trace")).init();
    if !env_filter_set {
        log::set_max_level(parse_level(cli.log_level.as_deref().unwrap_or("info")));
    }

    let mut config = config_loader::load_or_default(cli.config.as_deref())?;
    config_loader::apply_overrides(&mut config, &cli.overrides())?;

    if !env_filter_set {
        log::set_max_level(parse_level(&config.general.log_level));
    }

    if config.general.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.general.threads)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
    }

    info!(
        "Simplex dimension {} ({} vertices)",
        config.topology.dimension,
        config.vertex_count()
    );

    let (report, stem) = match &cli.command {
        Commands::Route { source, dest, show_levels, .. } => (run_route(&config, source, dest, *show_levels)?, "route"),
        Commands::Levels { max_level, .. } => (run_levels(&config, *max_level)?, "levels"),
        Commands::Simulate { .. } => (run_simulate(&config)?, "simulation"),
        Commands::Fault { .. } => (run_fault(&config)?, "fault"),
    };

    println!("{}", report::render_text(&report));

    if let Some(output_dir) = &cli.output {
        write_reports(&report, output_dir, stem)?;
    }

    Ok(())
}

fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

fn build_topology(config: &Config) -> Result<Topology> {
    let cancel = CancelToken::new();
    let topology = config
        .topology_builder(&cancel)?
        .build()
        .wrap_err("Failed to build network")?;
    Ok(topology)
}

fn run_route(config: &Config, source: &str, dest: &str, show_levels: usize) -> Result<RunReport> {
    let source = parse_label(source).wrap_err("Invalid source address")?;
    let dest = parse_label(dest).wrap_err("Invalid destination address")?;

    let topology = build_topology(config)?;
    let router = Router::new(topology.network()).with_ping_delay(config.simulation.ping_delay);
    let route = router
        .route_path(&source, &dest)
        .wrap_err("The source or destination node was not found")?;

    let mut report = RunReport::new(ReportMetadata::for_topology(&topology));
    if show_levels > 0 {
        report.levels = Some(level_listing(&topology, show_levels, config.topology.address_width)?);
    }
    report.route = Some(RouteReport::new(&source, &dest, &route));
    Ok(report)
}

fn run_levels(config: &Config, max_level: usize) -> Result<RunReport> {
    let topology = build_topology(config)?;
    let mut report = RunReport::new(ReportMetadata::for_topology(&topology));
    report.levels = Some(level_listing(&topology, max_level, config.topology.address_width)?);
    Ok(report)
}

fn run_simulate(config: &Config) -> Result<RunReport> {
    let cancel = CancelToken::new();
    let base = config.topology_builder(&cancel)?;
    let mut simulator = Simulator::new(config.simulation_settings());
    let points = simulator
        .sweep(&base, &config.simulation.sweep_iterations)
        .wrap_err("Routing simulation failed")?;

    let (iterations, total_nodes) = points
        .last()
        .map(|point| (point.iterations, point.total_nodes))
        .unwrap_or_default();
    let mut report = RunReport::new(ReportMetadata::new(config.vertex_count(), iterations, total_nodes));
    report.sweep = Some(points);
    Ok(report)
}

fn run_fault(config: &Config) -> Result<RunReport> {
    let mut topology = build_topology(config)?;
    let metadata = ReportMetadata::for_topology(&topology);
    info!("Original total node count: {}", metadata.total_nodes);

    let mut simulator = Simulator::new(config.simulation_settings());
    let stats = simulator
        .fault_routing(topology.network_mut(), config.simulation.fault_rate)
        .wrap_err("Fault simulation failed")?;

    let mut report = RunReport::new(metadata);
    report.fault = Some(stats);
    Ok(report)
}

fn write_reports(report: &RunReport, output_dir: &Path, stem: &str) -> Result<()> {
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;
    report::generate_json_report(report, &output_dir.join(format!("{}.json", stem)))?;
    report::generate_text_report(report, &output_dir.join(format!("{}.txt", stem)))?;
    Ok(())
}
