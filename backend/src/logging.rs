/// Tracing subscriber setup for the binary
use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `filter` (env-filter syntax)
pub fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|e| anyhow::anyhow!("Invalid log filter `{}`: {}", filter, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
