use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "DAYLIST_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

static INIT: OnceLock<()> = OnceLock::new();

/// Installs a stderr subscriber filtered by `DAYLIST_LOG`. Safe to call twice.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // another subscriber may already be installed (tests, embedding)
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
