//! Tracing initialisation

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this again
/// after a subscriber is installed leaves the existing one in place.
pub fn init_tracing(default_filter: &str) {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(e) = result {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_tracing("clinalert_sdk=debug");
        init_tracing("clinalert_sdk=debug");
        tracing::info!("tracing initialised");
    }
}
