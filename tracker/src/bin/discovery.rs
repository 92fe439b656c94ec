use std::io::Write;

use api::HypixelClient;
use clap::Parser;
use database::PlayerStore;
use tracker::ingest::append_manual_names;
use tracker::{CommonArgs, DataFiles, DiscoveryEngine, TrackerConfig};

/// Grows the player store from leaderboards, the discovery queue and guild
/// rosters. Interactive by default; --auto runs the endless crawl.
#[derive(Parser, Debug)]
struct Params {
    #[command(flatten)]
    common: CommonArgs,

    /// Crawl continuously instead of showing the menu.
    #[arg(short, long)]
    auto: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = TrackerConfig::resolve(args.common)?;
    let store = PlayerStore::open(&config.database).await?;
    let files = DataFiles::new(&config.data_dir);
    let client = HypixelClient::new(config.hypixel_discovery()?);
    let mut engine = DiscoveryEngine::new(client, store, files.clone())?;

    if args.auto {
        tokio::select! {
            result = engine.run_automatic() => result?,
            _ = tokio::signal::ctrl_c() => log::info!("Discovery stopped by user"),
        }
        engine.generate_leaderboards().await?;
        log::info!("Final leaderboards written");
        return Ok(());
    }

    loop {
        println!();
        println!("=== Bedwars player discovery ===");
        println!("1. Find new players");
        println!("2. Add player names by hand");
        println!("3. View store stats");
        println!("4. Exit");
        print!("> ");
        std::io::stdout().flush()?;

        match read_line()?.as_str() {
            "1" => {
                let processed = engine.find_new_players().await?;
                println!("Processed {processed} player(s)");
            }
            "2" => {
                println!("Names, separated by commas:");
                let names: Vec<String> = read_line()?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                let accepted = append_manual_names(&files, &names)?;
                println!("Added {accepted} name(s) for the next ingest pass");
            }
            "3" => print_stats(&engine).await?,
            "4" => break,
            other => println!("No such option: {other}"),
        }
    }
    Ok(())
}

async fn print_stats(engine: &DiscoveryEngine) -> Result<(), Box<dyn std::error::Error>> {
    let store = engine.store();
    let totals = store.totals().await?;
    println!();
    println!("Players:          {}", totals.total_players);
    println!("Stat records:     {}", totals.total_stat_records);
    println!("Discovery queue:  {}", totals.discovery_queue);
    println!("Updated today:    {}", totals.updated_today);

    let top = store.top_by_wins(10).await?;
    if !top.is_empty() {
        println!();
        println!("Top {} by wins:", top.len());
        for (i, player) in top.iter().enumerate() {
            println!(
                "{:>3}. {:<18} {:>7} wins  (W/L {:.3}, FKDR {:.3})",
                i + 1,
                player.username,
                player.wins,
                player.wlr,
                player.fkdr
            );
        }
    }

    let methods = store.discovery_method_counts().await?;
    if !methods.is_empty() {
        println!();
        println!("By discovery method:");
        for (method, count) in methods {
            println!("  {}: {count}", method.as_deref().unwrap_or("unknown"));
        }
    }
    Ok(())
}

fn read_line() -> std::io::Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}
