//! Logging initialization

use serde::Deserialize;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output, debug level
    #[default]
    Development,
    /// JSON output, info level
    Production,
    /// No output; tests install their own capture layer
    Test,
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown log profile '{}'", other)),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call installs a subscriber; later calls are no-ops.
/// `RUST_LOG` overrides the profile's default filter. Output goes to
/// stderr so stdout stays free for command results.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("sheetkeep=debug,tower_http=info")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("sheetkeep=info")),
                )
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Production);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("dev".parse::<Profile>().unwrap(), Profile::Development);
        assert_eq!("Production".parse::<Profile>().unwrap(), Profile::Production);
        assert!("verbose".parse::<Profile>().is_err());
    }

    #[test]
    fn test_profile_deserializes_lowercase() {
        let p: Profile = serde_json::from_str("\"production\"").unwrap();
        assert_eq!(p, Profile::Production);
    }
}
