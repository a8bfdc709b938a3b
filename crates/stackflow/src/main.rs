mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use stackflow_core::Environment;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "stack")]
#[command(about = "Provision and tear down the stackflow infrastructure topology", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every stack in dependency order
    Up {
        /// Environment (dev, staging, prod)
        env: Option<String>,
        /// Environment (-e/--env flag, STACK_ENV environment variable)
        #[arg(
            short = 'e',
            long = "env",
            env = "STACK_ENV",
            conflicts_with = "env",
            hide = true
        )]
        env_flag: Option<String>,
    },
    /// Destroy every stack in reverse dependency order (confirmation required)
    Down {
        /// Environment (dev, staging, prod)
        env: Option<String>,
        /// Environment (-e/--env flag, STACK_ENV environment variable)
        #[arg(
            short = 'e',
            long = "env",
            env = "STACK_ENV",
            conflicts_with = "env",
            hide = true
        )]
        env_flag: Option<String>,
    },
    /// Show the backend status of every stack
    Status {
        /// Environment (dev, staging, prod)
        env: Option<String>,
        /// Environment (-e/--env flag, STACK_ENV environment variable)
        #[arg(
            short = 'e',
            long = "env",
            env = "STACK_ENV",
            conflicts_with = "env",
            hide = true
        )]
        env_flag: Option<String>,
    },
    /// Validate the topology offline and print the apply order
    Validate {
        /// Environment (dev, staging, prod)
        env: Option<String>,
        /// Environment (-e/--env flag, STACK_ENV environment variable)
        #[arg(
            short = 'e',
            long = "env",
            env = "STACK_ENV",
            conflicts_with = "env",
            hide = true
        )]
        env_flag: Option<String>,
    },
}

/// Exit codes: 0 success, 1 node failure or aborted confirmation,
/// 2 configuration error caught before any backend call.
const EXIT_CONFIG: u8 = 2;

fn resolve_env(positional: Option<String>, flag: Option<String>) -> Option<Environment> {
    let name = positional.or(flag).unwrap_or_else(|| "dev".to_string());
    match name.parse::<Environment>() {
        Ok(env) => Some(env),
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Up { env, env_flag } => match resolve_env(env, env_flag) {
            Some(env) => commands::up::handle(env).await,
            None => Ok(EXIT_CONFIG),
        },
        Commands::Down { env, env_flag } => match resolve_env(env, env_flag) {
            Some(env) => commands::down::handle(env).await,
            None => Ok(EXIT_CONFIG),
        },
        Commands::Status { env, env_flag } => match resolve_env(env, env_flag) {
            Some(env) => commands::status::handle(env).await,
            None => Ok(EXIT_CONFIG),
        },
        Commands::Validate { env, env_flag } => match resolve_env(env, env_flag) {
            Some(env) => commands::validate::handle(env),
            None => Ok(EXIT_CONFIG),
        },
    };

    match code {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{}", format!("error: {err:#}").red());
            ExitCode::from(1)
        }
    }
}
