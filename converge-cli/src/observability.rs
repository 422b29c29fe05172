//! Logging setup for the command line front end.
//!
//! Logs always go to stderr so stdout carries only the JSON reply.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, MakeWriter,
        format::{Format, FmtSpan, Pretty},
    },
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    Pretty,
    /// One JSON object per line for log aggregation.
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`; anything other than `json` means pretty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_name(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }

    fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `default_level`. Audit
/// events are emitted on the `audit` target and can be isolated with
/// `RUST_LOG=audit=info`.
pub fn init_observability(format: LogFormat, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber.with(pretty_layer(io::stderr)).init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_thread_names(false)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Multi-line human-readable layer with source locations.
fn pretty_layer<S, W>(writer: W) -> fmt::Layer<S, Pretty, Format<Pretty>, W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .pretty()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
}
