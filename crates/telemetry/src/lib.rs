//! Logging bootstrap for the gateway binaries.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tumae_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter when set. Output goes to stderr
/// so command output on stdout stays clean. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {}", settings.filter, e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match settings.log_format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            target: "tumae-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let settings = TelemetrySettings::default();
        init(&settings).unwrap();
        init(&settings).unwrap();
    }

    #[test]
    fn bad_filter_is_reported() {
        std::env::remove_var("RUST_LOG");
        let settings = TelemetrySettings {
            filter: "tumae=verbose".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(init(&settings).is_err());
    }
}
