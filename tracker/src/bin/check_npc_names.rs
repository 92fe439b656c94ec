use clap::Parser;
use tracker::maintenance::scan_npc_names;
use tracker::{CommonArgs, DataFiles, TrackerConfig};

/// Reports how much of the scraped-names file looks like lobby NPC tags.
#[derive(Parser, Debug)]
struct Params {
    #[command(flatten)]
    common: CommonArgs,

    /// Also list every flagged name.
    #[arg(short, long)]
    show: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let config = TrackerConfig::resolve(args.common)?;
    let files = DataFiles::new(&config.data_dir);
    let path = files.scraped_names();
    if !path.exists() {
        println!("Scraped names file not found at {}", path.display());
        return Ok(());
    }

    let scan = scan_npc_names(&path)?;
    if scan.total == 0 {
        println!("No names found in {}", path.display());
        return Ok(());
    }
    println!("Analysis of {}:", path.display());
    println!("Total names: {}", scan.total);
    println!(
        "NPC-like names (10 lowercase alphanumeric chars): {}",
        scan.suspicious.len()
    );
    println!("Percentage NPC-like: {:.2}%", scan.percentage());
    if args.show && !scan.suspicious.is_empty() {
        println!();
        for name in &scan.suspicious {
            println!("{name}");
        }
    }
    Ok(())
}
