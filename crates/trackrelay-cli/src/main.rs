//! trackrelay - analytics event relay
//!
//! Single entrypoint that configures logging and runs the relay server.

mod commands;

use clap::{Parser, Subcommand};
use commands::ServeCommand;
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TRACKRELAY_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "TRACKRELAY_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay HTTP server
    Serve(ServeCommand),
}

fn build_filter(log_level: &str) -> anyhow::Result<tracing_subscriber::EnvFilter> {
    // RUST_LOG takes full control when set
    if std::env::var("RUST_LOG").is_ok() {
        return tracing_subscriber::EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e));
    }

    Ok(tracing_subscriber::EnvFilter::new(format!(
        "trackrelay={level},\
         trackrelay_config={level},\
         trackrelay_events={level},\
         tower_http={level},\
         h2=warn,\
         tower=warn,\
         hyper=warn,\
         reqwest=warn,\
         rustls=warn",
        level = log_level
    )))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = build_filter(&cli.log_level)?;

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_subcommand_parses_flags() {
        let cli = Cli::try_parse_from([
            "trackrelay",
            "--log-level",
            "debug",
            "serve",
            "--token",
            "T1",
            "--port",
            "8080",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Serve(cmd) => {
                assert_eq!(cmd.token.as_deref(), Some("T1"));
                assert_eq!(cmd.port, 8080);
            }
        }
    }
}
