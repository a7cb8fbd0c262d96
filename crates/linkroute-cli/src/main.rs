use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use linkroute_cli::output::OutputFormat;

mod commands;

use commands::route::{handle_route, RouteCommandArgs};
use commands::routers::handle_routers;

#[derive(Parser, Debug)]
#[command(author, version, about = "Route diagram links around obstacle shapes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute routes for the links of a scene file.
    Route {
        /// Path to the JSON scene file.
        #[arg(long)]
        scene: PathBuf,
        /// Only route the link with this id.
        #[arg(long)]
        link: Option<String>,
        /// Override the router named by each link.
        #[arg(long)]
        router: Option<String>,
        /// Override the grid step.
        #[arg(long)]
        step: Option<f64>,
        /// Override the search budget per segment.
        #[arg(long = "max-loops")]
        max_loops: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the available routers.
    Routers {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            scene,
            link,
            router,
            step,
            max_loops,
            format,
        } => handle_route(&RouteCommandArgs {
            scene,
            link,
            router,
            step,
            max_loops,
            format,
        }),
        Command::Routers { format } => handle_routers(format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
