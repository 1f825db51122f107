mod browse;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use perkdir_client::{DirectoryView, PageState, PerksClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "perkdir")]
#[command(about = "Browse the public perk directory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the directory once and print the (optionally filtered) listing
    List {
        /// Case-insensitive fragment of the perk title
        #[arg(long)]
        name: Option<String>,
        /// Merchant id as printed by `perkdir merchants`
        #[arg(long)]
        merchant: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the merchants present in the directory
    Merchants {
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: filter the fetched directory from stdin
    Browse,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = perkdir_core::load_app_config().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.env.colored_logs())
        .init();

    tracing::debug!(env = %config.env, ?config, "configuration loaded");

    let client = PerksClient::from_config(&config).context("failed to build perk client")?;
    let mut view = DirectoryView::mount(client);
    view.settle().await;

    match cli.command {
        Commands::List {
            name,
            merchant,
            json,
        } => {
            if view.page_state() == PageState::Ready {
                if let Some(name) = name {
                    view.set_name_query(name)?;
                }
                if merchant.is_some() {
                    view.set_merchant(merchant)?;
                }
            }
            output::print_render(view.render(), json)?;
        }
        Commands::Merchants { json } => {
            output::print_options(view.render(), view.options(), json)?;
        }
        Commands::Browse => browse::run(&mut view).await?,
    }

    Ok(())
}
