use std::path::PathBuf;

use clap::Parser;
use database::PlayerStore;
use tracker::maintenance::export_usernames;
use tracker::{CommonArgs, DataFiles, TrackerConfig};

/// Writes every stored username to a flat text file.
#[derive(Parser, Debug)]
struct Params {
    #[command(flatten)]
    common: CommonArgs,

    /// Output file; defaults to all_player_names.txt in the data directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = TrackerConfig::resolve(args.common)?;
    let store = PlayerStore::open(&config.database).await?;
    let files = DataFiles::new(&config.data_dir);
    let output = args.output.unwrap_or_else(|| files.exported_names());

    let exported = export_usernames(&store, &output).await?;
    log::info!("Exported {exported} username(s) to {}", output.display());
    Ok(())
}
