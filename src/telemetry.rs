//! Tracing setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a global `fmt` subscriber.
///
/// Priority: `RUST_LOG` > `level` argument. Calling this again once a
/// subscriber is installed is a no-op.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing("debug").expect("first init should succeed");
        init_tracing("info").expect("second init should succeed");
    }
}
