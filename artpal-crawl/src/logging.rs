//! Tracing setup
//!
//! The subscriber is installed before configuration is resolved, so events
//! raised while reading the config file reach the log. Its filter starts
//! from `RUST_LOG` or the startup level and is swapped for the resolved
//! level once configuration is known.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, EnvFilter, Registry};

/// Handle for replacing the filter of an installed subscriber
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Formatted subscriber writing to `writer`, filtered by `RUST_LOG` or `level`
pub fn subscriber<W>(level: &str, writer: W) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (filter, handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));

    (subscriber, handle)
}

/// Switch to the resolved log level; `RUST_LOG` keeps precedence
pub fn apply_level(handle: &FilterHandle, level: &str) -> Result<(), reload::Error> {
    if std::env::var_os("RUST_LOG").is_some() {
        return Ok(());
    }
    handle.reload(EnvFilter::new(level))
}
