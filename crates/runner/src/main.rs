use log::{error, info};
use tempo_runner::{load_config, load_default_config, run};
use tempo_scheduler::Outcome;

fn print_help() {
    eprintln!(
        r#"Tempo - paced historical price requests against a simulated gateway

USAGE:
    tempo [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run the built-in batch
    tempo

    # Run a custom batch with scheduler tracing
    RUST_LOG=tempo_scheduler=debug tempo --config batch.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            other => {
                eprintln!("Error: unknown argument '{}'", other);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            load_config(path)?
        }
        None => load_default_config()?,
    };

    let summary = match run(config).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "{} succeeded, {} bad symbol, {} failed",
        summary.count(Outcome::Success),
        summary.count(Outcome::BadSymbol),
        summary.count(Outcome::RequestError)
    );
    Ok(())
}
