use api::{HypixelClient, MojangClient};
use clap::Parser;
use database::PlayerStore;
use tracker::{CommonArgs, DataFiles, SessionTracker, TrackerConfig};

/// Polls tracked players for session deltas, winstreaks, renames and
/// recent games.
#[derive(Parser, Debug)]
struct Params {
    #[command(flatten)]
    common: CommonArgs,

    /// Track only these players instead of everyone in the store.
    #[arg(short, long)]
    player: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = TrackerConfig::resolve(args.common)?;
    let store = PlayerStore::open(&config.database).await?;
    let files = DataFiles::new(&config.data_dir);
    let hypixel = HypixelClient::new(config.hypixel_session()?);
    let mojang = MojangClient::new(config.mojang());

    let roster = SessionTracker::build_roster(&store, &mojang, &args.player).await?;
    let mut tracker = SessionTracker::new(hypixel, files)?;

    tokio::select! {
        result = tracker.run(&roster) => result?,
        _ = tokio::signal::ctrl_c() => log::info!("Tracking stopped by user"),
    }
    tracker.flush()?;
    log::info!("Persistent data saved");
    Ok(())
}
