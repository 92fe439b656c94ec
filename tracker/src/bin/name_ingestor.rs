use api::MojangClient;
use clap::Parser;
use database::PlayerStore;
use tracker::{CommonArgs, DataFiles, NameIngestor, TrackerConfig};

/// One pass turning scraped usernames into queued UUIDs, resuming from the
/// saved cursor.
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
    let mojang = MojangClient::new(config.mojang());

    let mut ingestor = NameIngestor::new(mojang, store, files).await?;
    let added = ingestor.process_scraped_names().await?;
    log::info!("Done, {added} player(s) queued for discovery");
    Ok(())
}
