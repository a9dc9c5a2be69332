use clap::{Parser, Subcommand};
use statemap::dataset::{Dataset, STATE_NAMES};
use statemap::{config, index, render, server, topology};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-render the choropleth overlay tiles
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the interactive map
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { config } => {
            info!("rendering tiles with config {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;
            let dataset = Dataset::builtin();

            let regions = topology::load_regions(&app_config.input, &STATE_NAMES)?;
            let tree = index::build_index(&regions);

            render::generate_tiles(&app_config, &regions, &tree, &dataset.densities)?;
        }
        Commands::Serve { config } => {
            info!("serving map with config {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;
            let dataset = Dataset::builtin();

            let regions = topology::load_regions(&app_config.input, &STATE_NAMES)?;

            server::start_server(app_config, dataset, regions).await?;
        }
    }

    Ok(())
}
