use clap::{Parser, Subcommand};

mod commands;
mod presenter;

#[derive(Parser)]
#[command(name = "hangtube-cli", version, about = "Hang Tube CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the question server and present quizzes
    Run {
        /// Content identifier to fetch questions for
        #[arg(long)]
        video_id: Option<String>,
        /// Stop after the first batch is drained instead of polling forever
        #[arg(long)]
        once: bool,
    },
    /// Fetch one question batch and print it as JSON
    Fetch {
        /// Content identifier to fetch questions for
        #[arg(long)]
        video_id: Option<String>,
    },
    /// Print the persisted scheduler state as JSON
    Status,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Engagement statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Logs go to stderr; stdout is reserved for command output (JSON/TOML).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { video_id, once } => commands::run::run(video_id, once),
        Commands::Fetch { video_id } => commands::fetch::run(video_id),
        Commands::Status => commands::status::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { json } => commands::stats::run(json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
