use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod fetch;
pub mod schema;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Print the parameter schema of registered integrations
    Schema {
        /// Only print this integration
        #[arg(long)]
        integration: Option<String>,
    },
    /// Fetch one feed and print the document
    Fetch {
        #[arg(long)]
        integration: String,
        /// Feed parameter as `name=value`, repeatable
        #[arg(long = "param", value_parser = fetch::parse_param)]
        params: Vec<(String, String)>,
        /// Print JSON events instead of an iCalendar document
        #[arg(long, action, default_value = "false")]
        json: bool,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::from_env();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Schema { integration }) => {
            schema::run(integration.as_deref(), &config)?;
        }
        Some(Command::Fetch {
            integration,
            params,
            json,
        }) => {
            fetch::run(&integration, params, json, &config).await?;
        }
        None => {}
    }

    Ok(())
}
