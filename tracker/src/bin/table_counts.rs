use clap::Parser;
use database::PlayerStore;
use tracker::{CommonArgs, TrackerConfig};

/// Prints the row count of every table, over a read-only handle.
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
    let pool = config.database.open_read_only().await?;
    let store = PlayerStore::new(pool);

    println!("Row counts in '{}':", config.database.path);
    for (table, count) in store.table_row_counts().await? {
        println!("- {table}: {count}");
    }
    Ok(())
}
