use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::LoggingConfig;

/// Install the global subscriber and return the session id it logged
///
/// `RUST_LOG` wins over the configured filter. Output goes to stderr so the
/// shell's stdout stays plain.
pub fn init_tracing(logging_config: &LoggingConfig) -> Result<String> {
    let env_filter = build_env_filter(&logging_config.filter)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(env_filter)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let session_id = Uuid::new_v4().to_string();
    tracing::info!(
        target: "logging",
        session_id = %session_id,
        filter = %logging_config.filter,
        version = crate::VERSION,
        "logging initialized"
    );
    Ok(session_id)
}

fn build_env_filter(configured: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    if configured.trim().is_empty() {
        return Err(anyhow!("logging.filter cannot be empty"));
    }
    EnvFilter::try_new(configured)
        .with_context(|| format!("invalid logging.filter {:?}", configured))
}
