use clap::{Parser, Subcommand};
use colored::Colorize;
use git_pivotal::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "git-pivotal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pivotal Tracker / GitHub branch workflow helper", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a pull request for the current branch's story
    #[command(name = "pull-request")]
    PullRequest {
        /// Reference the story without completing it when merged
        #[arg(long)]
        no_complete: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // One command, one sequence of calls
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: Failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

/// A non-empty, valid `RUST_LOG` wins outright; otherwise `-v` picks debug
/// over the warn default
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    EnvFilter::default().add_directive(level.into())
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::PullRequest { no_complete } => {
            git_pivotal::cli::pull_request::run(no_complete).await?;
        }
    }

    Ok(())
}
