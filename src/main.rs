use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finrisk::api::{ProfileArgs, run_assess_command, run_http_server};
use finrisk::config::ServeArgs;

#[derive(Parser, Debug)]
#[command(
    name = "finrisk",
    version,
    about = "Financial risk questionnaire scorer and assessment API"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API and questionnaire UI
    Serve(ServeArgs),
    /// Score one profile and print the result as JSON
    Assess(ProfileArgs),
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            init_tracing(args.log_json);
            let config = match args.server_config() {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(2);
                }
            };
            if let Err(e) = run_http_server(config).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        Command::Assess(args) => match run_assess_command(args) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
