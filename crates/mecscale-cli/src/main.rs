use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::PolicyArgs;

#[derive(Parser)]
#[command(
    name = "mecscale",
    about = "mecscale — scaling decisions for a simulated edge server pool",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one workload and print the decision (1, -1 or 0).
    #[command(allow_negative_numbers = true)]
    Decide {
        /// Current number of tasks
        tasks: i64,
        /// Number of active servers
        servers: i64,
        /// Tasks one server can hold
        capacity: i64,
        /// Simulation time of the request; logged, not used by the policy
        timestamp: Option<f64>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Evaluate a sequence of task counts against a server pool.
    ///
    /// Without --apply every snapshot is evaluated against the same
    /// server count. With --apply each decision adds or removes one
    /// server before the next snapshot is evaluated.
    Replay {
        /// Number of active servers at the start of the replay
        #[arg(short, long)]
        servers: i64,
        /// Tasks one server can hold
        #[arg(long)]
        capacity: i64,
        /// Comma-separated task counts, e.g. 3,3,6,7
        #[arg(short, long, conflicts_with = "trace", required_unless_present = "trace")]
        tasks: Option<String>,
        /// Trace file with one `<tasks>` or `<time> <tasks>` per line
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Apply decisions to the simulated pool
        #[arg(long)]
        apply: bool,
        /// Lower bound on active servers when applying
        #[arg(long)]
        min_servers: Option<u32>,
        /// Upper bound on active servers when applying
        #[arg(long)]
        max_servers: Option<u32>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Write a mecscale.toml with the default policy settings
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
    },
}

/// Filter used when `RUST_LOG` is unset, empty, or unparsable.
const DEFAULT_LOG_FILTER: &str = "mecscale=warn";

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Decide {
            tasks,
            servers,
            capacity,
            timestamp,
            policy,
            format,
        } => commands::decide::decide(tasks, servers, capacity, timestamp, &policy, &format)?,
        Commands::Replay {
            servers,
            capacity,
            tasks,
            trace,
            apply,
            min_servers,
            max_servers,
            policy,
            format,
        } => commands::replay::replay(
            &commands::replay::ReplayArgs {
                servers,
                capacity,
                tasks,
                trace,
                apply,
                min_servers,
                max_servers,
            },
            &policy,
            &format,
        )?,
        Commands::Init { path } => commands::init::init(&path)?,
    };

    println!("{output}");
    Ok(())
}
