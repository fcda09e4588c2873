//! Loan Application CLI
//!
//! Command-line front end for the loan application form.
//!
//! # Usage
//!
//! ```bash
//! loanapp submit --full-name "Jane Doe" --email jane@example.com \
//!     --phone +1234567890 --amount 5000 --purpose "Car"
//! loanapp validate --email jane@example --amount -5
//! loanapp platform --user-agent "FBAN/MessengerForiOS" --url "https://loans.example/?psid=1"
//! loanapp config set endpoint_url https://proxy.example/submit
//! ```

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "loanapp")]
#[command(version)]
#[command(about = "Loan application form client", long_about = None)]
struct Cli {
    /// Submission endpoint URL
    #[arg(long, env = "LOANAPP_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Bearer token for the endpoint
    #[arg(long, env = "LOANAPP_API_KEY")]
    api_key: Option<String>,

    /// Treat the loan purpose as optional
    #[arg(long)]
    purpose_optional: bool,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and submit an application
    Submit(ApplicationArgs),
    /// Validate an application without submitting
    Validate(ApplicationArgs),
    /// Detect the host platform from launch data
    Platform {
        /// User agent of the webview
        #[arg(long, default_value = "")]
        user_agent: String,
        /// Launch URL including query and fragment
        #[arg(long, default_value = "")]
        url: String,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Form fields; omitted flags stay empty
#[derive(Args, Debug, Default)]
struct ApplicationArgs {
    #[arg(long, default_value = "")]
    full_name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    amount: String,
    #[arg(long, default_value = "")]
    purpose: String,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (profile, profile_error) = match config::Config::load(cli.profile.as_deref()) {
        Ok(profile) => (profile, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    let settings = match profile.resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| settings.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(e) = profile_error {
        tracing::warn!("Ignoring unreadable config profile: {}", e);
    }

    let result = match cli.command {
        Commands::Submit(args) => commands::submit::handle(args, &settings, cli.format).await,
        Commands::Validate(args) => commands::submit::validate(args, &settings, cli.format),
        Commands::Platform { user_agent, url } => {
            commands::platform::handle(&user_agent, &url, &settings, cli.format).await
        }
        Commands::Config { action } => commands::config::handle(action, cli.profile.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
