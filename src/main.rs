use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sdbclient::cli::commands;
use sdbclient::config;

#[derive(Parser)]
#[command(name = "sdbclient")]
#[command(version, about = "Signed query client for SimpleDB-style attribute stores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<String>,

    /// Profile to use from config
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print the box usage consumed by the command
    #[arg(long, global = true)]
    usage: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List domains
    Domains,

    /// Create a domain
    CreateDomain {
        /// Domain name
        name: String,
    },

    /// Delete a domain
    DeleteDomain {
        /// Domain name
        name: String,
    },

    /// Show the attributes of an item
    Get {
        /// Domain name
        domain: String,

        /// Item key
        key: String,

        /// Only these attribute names
        #[arg(long = "attr")]
        names: Vec<String>,
    },

    /// Store attributes on an item
    Put {
        /// Domain name
        domain: String,

        /// Item key
        key: String,

        /// Attributes as name=value
        #[arg(required = true)]
        attributes: Vec<String>,

        /// Replace stored values instead of adding to them
        #[arg(long)]
        replace: bool,
    },

    /// Delete an item or some of its attributes
    Delete {
        /// Domain name
        domain: String,

        /// Item key
        key: String,

        /// Only these attribute names
        #[arg(long = "attr")]
        names: Vec<String>,
    },

    /// Query item keys
    Query {
        /// Domain name
        domain: String,

        /// Query expression
        expression: Option<String>,

        /// Page size
        #[arg(long)]
        max_results: Option<u32>,

        /// Follow continuation tokens to the last page
        #[arg(long)]
        all: bool,

        /// Load each item's attributes
        #[arg(long)]
        load: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Every command is a short sequence of requests
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref(), cli.profile.as_deref())?;
    let client = config.build_client(cli.profile.as_deref())?;

    match cli.command {
        Commands::Domains => {
            commands::cmd_domains(&client).await?;
        }
        Commands::CreateDomain { name } => {
            commands::cmd_create_domain(&client, &name).await?;
        }
        Commands::DeleteDomain { name } => {
            commands::cmd_delete_domain(&client, &name).await?;
        }
        Commands::Get { domain, key, names } => {
            commands::cmd_get(&client, &domain, &key, &names).await?;
        }
        Commands::Put {
            domain,
            key,
            attributes,
            replace,
        } => {
            commands::cmd_put(&client, &domain, &key, &attributes, replace).await?;
        }
        Commands::Delete { domain, key, names } => {
            commands::cmd_delete(&client, &domain, &key, &names).await?;
        }
        Commands::Query {
            domain,
            expression,
            max_results,
            all,
            load,
        } => {
            commands::cmd_query(&client, &domain, expression.as_deref(), max_results, all, load)
                .await?;
        }
    }

    if cli.usage {
        eprintln!("Box usage: {:.10}", client.box_usage());
    }

    Ok(())
}
