use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roadrouter_cli::commands::preprocess::{handle_preprocess_command, PreprocessCommandArgs};
use roadrouter_cli::commands::route::{handle_route_command, Endpoints, RouteCommandArgs};
use roadrouter_cli::output::OutputFormat;
use roadrouter_lib::RouteAlgorithm;

#[derive(Parser, Debug)]
#[command(author, version, about = "Least-cost routing over road networks")]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log format written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a least-cost path between two nodes or two links.
    Route(RouteArgs),
    /// Run heuristic preprocessing and report admissibility and landmarks.
    Preprocess(PreprocessArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Network document (JSON).
    #[arg(long)]
    network: PathBuf,
    /// Source node id.
    #[arg(long, required_unless_present = "from_link", conflicts_with = "from_link")]
    from: Option<String>,
    /// Target node id.
    #[arg(long, required_unless_present = "to_link", conflicts_with = "to_link")]
    to: Option<String>,
    /// Entry link id; the route starts where it ends.
    #[arg(long, requires = "to_link")]
    from_link: Option<String>,
    /// Exit link id; the route ends where it starts.
    #[arg(long, requires = "from_link")]
    to_link: Option<String>,
    /// Router configuration file (JSON). Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Algorithm: dijkstra, a-star-euclidean or a-star-landmarks.
    #[arg(long)]
    algorithm: Option<RouteAlgorithm>,
    /// Heuristic scaling factor (>= 1).
    #[arg(long = "overdo")]
    overdo_factor: Option<f64>,
    /// Number of landmarks for a-star-landmarks.
    #[arg(long)]
    landmarks: Option<usize>,
    /// Departure time in seconds.
    #[arg(long, default_value_t = 0.0)]
    start_time: f64,
    /// Only use links allowing this mode. Repeatable.
    #[arg(long = "mode")]
    modes: Vec<String>,
    /// Vehicle speed cap in m/s.
    #[arg(long)]
    max_speed: Option<f64>,
    /// Additional cost per metre travelled.
    #[arg(long, default_value_t = 0.0)]
    distance_cost: f64,
}

impl RouteArgs {
    fn into_command_args(self) -> RouteCommandArgs {
        let endpoints = match (self.from, self.to, self.from_link, self.to_link) {
            (_, _, Some(from), Some(to)) => Endpoints::Links { from, to },
            (from, to, _, _) => Endpoints::Nodes {
                from: from.unwrap_or_default(),
                to: to.unwrap_or_default(),
            },
        };
        RouteCommandArgs {
            network: self.network,
            endpoints,
            config: self.config,
            algorithm: self.algorithm,
            overdo_factor: self.overdo_factor,
            landmarks: self.landmarks,
            start_time: self.start_time,
            modes: self.modes,
            max_speed: self.max_speed,
            distance_cost: self.distance_cost,
        }
    }
}

#[derive(Args, Debug)]
struct PreprocessArgs {
    /// Network document (JSON).
    #[arg(long)]
    network: PathBuf,
    /// Number of landmarks to select.
    #[arg(long, default_value_t = roadrouter_lib::preprocess::DEFAULT_LANDMARK_COUNT)]
    landmarks: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Route(args) => handle_route_command(&args.into_command_args(), cli.format),
        Command::Preprocess(args) => handle_preprocess_command(
            &PreprocessCommandArgs {
                network: args.network,
                landmarks: args.landmarks,
            },
            cli.format,
        ),
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}
