//! Tracing subscriber setup for applications that want the framework to
//! install a formatted logger. Configures file names, line numbers, levels
//! and span close events.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing_subscriber::{
  Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

pub use tracing::level_filters::LevelFilter;

static TRACING_LEVEL: Lazy<Mutex<LevelFilter>> = Lazy::new(|| Mutex::new(LevelFilter::DEBUG));

pub fn set_tracing_level(level_filter: LevelFilter) {
  *TRACING_LEVEL.lock() = level_filter;
}

/// Initializes the global tracing subscriber with formatted output.
pub fn init_tracing() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_filter(*TRACING_LEVEL.lock()),
    )
    .init();
}
