use clap::Parser;
use std::panic::{self, PanicHookInfo};
use tokio::sync::mpsc;
use wifi_sentinel::app::{self, Options};
use wifi_sentinel::source::replay::ReplaySource;
use wifi_sentinel::source::sim::SimSource;
use wifi_sentinel::source::{Backend, LineSource};
use wifi_sentinel::worker;

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Build the feed source the flags selected. The source is not connected
/// yet; the ingestion worker connects it.
fn open_source(options: &Options) -> Box<dyn LineSource> {
    match options.backend {
        #[cfg(feature = "serial")]
        Backend::Serial => Box::new(wifi_sentinel::source::serial::SerialSource::new(
            &options.port,
            options.baud,
        )),
        Backend::Replay => Box::new(ReplaySource::new(&options.input)),
        Backend::Sim => match options.seed {
            Some(seed) => Box::new(SimSource::with_seed(seed)),
            None => Box::new(SimSource::new()),
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if options.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let source = open_source(&options);
    let (tail_tx, tail_rx) = mpsc::channel(worker::TAIL_CHANNEL_CAPACITY);
    let events = worker::spawn(
        source,
        options.strategy,
        options.noise_filter(),
        Some(tail_tx),
    );

    let mut out = std::io::stdout();
    let mut err = std::io::stderr();
    match app::run_with_io(options, events, Some(tail_rx), None, &mut out, &mut err).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
