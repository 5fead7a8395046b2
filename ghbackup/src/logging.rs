//! Set up logging.

use slog::Drain;

/// Build the root logger.
///
/// Logs go to stderr so that JSON output on stdout stays clean. `verbose`
/// raises the level: 0 is info, 1 is debug, anything more is trace.
pub fn init(verbose: u8) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level(verbose)).fuse();

    slog::Logger::root(drain, slog::o!())
}

/// The most verbose level to log for a `-v` count.
const fn level(verbose: u8) -> slog::Level {
    match verbose {
        0 => slog::Level::Info,
        1 => slog::Level::Debug,
        _ => slog::Level::Trace,
    }
}
