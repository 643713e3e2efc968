use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wayguide-cli", version, about = "Wayguide CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run and inspect guided tours
    Tour {
        #[command(subcommand)]
        action: commands::tour::TourAction,
    },
    /// Waypoint and tour administration
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Tour { action } => commands::tour::run(action),
        Commands::Admin { action } => commands::admin::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
