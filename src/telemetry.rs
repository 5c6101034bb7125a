use prometheus::{register_counter_vec, register_histogram_vec};
use prometheus::{CounterVec, HistogramVec};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_REQUESTS: CounterVec = register_counter_vec!(
        "quiz_requests_total",
        "Number of quiz generation requests",
        &["profile", "outcome"]
    )
    .unwrap();
    pub static ref BACKEND_DURATION: HistogramVec = register_histogram_vec!(
        "backend_request_duration_seconds",
        "Time spent waiting for the inference backend",
        &["profile"]
    )
    .unwrap();
}

pub fn init_tracing() {
    // stderr keeps stdout free for CLI output
    let mut fmt_layer = fmt::layer().with_writer(std::io::stderr);
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
