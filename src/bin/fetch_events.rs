use bookclub_feeds::core::ConfigProvider;
use bookclub_feeds::utils::{logger, validation::Validate};
use bookclub_feeds::{
    CliConfig, EtlEngine, EventFeedPipeline, HttpFetcher, LocalStorage, RegionTable,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "fetch-events")]
#[command(about = "Read verified book club feeds into a single events.json")]
struct Args {
    #[command(flatten)]
    common: CliConfig,

    /// TOML file with a [regions] table replacing the built-in one
    #[arg(long)]
    regions: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = args.common;

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting RSS feed fetch");

    if let Err(e) = config.validate() {
        std::process::exit(e.report("Configuration validation"));
    }

    let regions = match &args.regions {
        Some(path) => RegionTable::from_file(path),
        None => RegionTable::builtin(),
    };
    let regions = match regions {
        Ok(regions) => regions,
        Err(e) => std::process::exit(e.report("Loading region table")),
    };
    tracing::debug!("{} region names loaded", regions.len());

    let fetcher = match HttpFetcher::new(config.user_agent(), config.timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => std::process::exit(e.report("HTTP client setup")),
    };

    let monitor_enabled = config.monitor;
    let pipeline = EventFeedPipeline::new(LocalStorage::default(), config, fetcher, regions);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => println!("📝 Output: {}", output_path),
        Err(e) => {
            let exit_code = e.report("Event fetch");
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
