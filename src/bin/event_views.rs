use bookclub_feeds::utils::error::CrawlError;
use bookclub_feeds::utils::logger;
use bookclub_feeds::utils::validation::validate_path;
use bookclub_feeds::{EtlEngine, EventViewsPipeline, LocalStorage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "event-views")]
#[command(about = "Split events.json into today/tomorrow/this-month/next-month/online views")]
struct Args {
    /// events.json written by fetch-events
    events: String,

    /// Directory receiving one JSON file per view
    out_dir: String,

    #[arg(short, long)]
    verbose: bool,
}

fn validate(args: &Args) -> Result<(), CrawlError> {
    validate_path("events", &args.events)?;
    validate_path("out_dir", &args.out_dir)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = validate(&args) {
        std::process::exit(e.report("Configuration validation"));
    }

    let pipeline = EventViewsPipeline::new(LocalStorage::default(), args.events, args.out_dir);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(out_dir) => println!("✅ Views written to {}", out_dir),
        Err(e) => {
            let exit_code = e.report("View generation");
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
