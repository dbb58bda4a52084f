use tracing_subscriber::EnvFilter;

/// Env var holding `EnvFilter` directives; takes precedence over `-v`
pub const LOG_ENV: &str = "QRFORGE_LOG";

/// Default directive for the number of `-v` flags
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install a stderr fmt subscriber. A second call keeps the first subscriber.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "info");
        assert_eq!(default_directive(2), "debug");
        assert_eq!(default_directive(9), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(0);
        init_tracing(2);
        tracing::info!("still logging");
    }
}
