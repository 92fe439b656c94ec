use clap::Parser;
use database::PlayerStore;
use tracker::{CommonArgs, DataFiles, LeaderboardGenerator, TrackerConfig};

/// Regenerates every leaderboard artifact from the store.
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
    let files = DataFiles::new(&config.data_dir);

    LeaderboardGenerator::new(store, files).generate_all().await?;
    Ok(())
}
