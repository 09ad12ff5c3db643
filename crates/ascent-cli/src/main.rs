use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ascent", version, about = "Ascent progress and context CLI")]
struct Cli {
    /// Act as this signed-in user instead of the anonymous local profile
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Progress, level and strategic decisions
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Assistant context assembly
    Context {
        #[command(subcommand)]
        action: commands::context::ContextAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ASCENT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Progress { action } => commands::progress::run(action, cli.user.as_deref()),
        Commands::Context { action } => commands::context::run(action, cli.user.as_deref()),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
