use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Builds the `tracing` subscriber the relay logs through: bunyan-formatted JSON lines,
/// one per event, carrying the fields of every enclosing span.
///
/// `name` shows up as the `name` of every record.
///
/// `default_level` is used when `RUST_LOG` isn't set, e.g. `"info"` or `"debug"`.
///
/// `sink` receives the formatted records. Pass `std::io::sink` to drop them.
pub fn get_subscriber<Sink>(
    name: String,
    default_level: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name, sink))
}

/// Installs `subscriber` as the process-wide default.
///
/// Panics if a default has already been installed, so call it once at startup.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    set_global_default(subscriber).expect("Failed to set the tracing subscriber");
}
