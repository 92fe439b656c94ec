use clap::Parser;
use database::PlayerStore;
use tracker::maintenance::recompute_levels;
use tracker::{CommonArgs, TrackerConfig};

/// Recomputes stored Bedwars levels from each player's newest experience.
#[derive(Parser, Debug)]
struct Params {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = TrackerConfig::resolve(args.common)?;
    let store = PlayerStore::open(&config.database).await?;
    recompute_levels(&store).await?;
    Ok(())
}
