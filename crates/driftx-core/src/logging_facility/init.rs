//! Logging initialization

use std::fmt;
use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Human-readable output, `driftx=debug`
    #[default]
    Development,
    /// JSON lines, `driftx=info`
    Production,
    /// No output; tests install a capture layer instead
    Test,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Production => "production",
            Profile::Test => "test",
        }
    }

    fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "driftx=debug",
            Profile::Production => "driftx=info",
            Profile::Test => "driftx=trace",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!(
                "unknown log profile `{}` (expected development, production or test)",
                other
            )),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter.
///
/// # Example
///
/// ```
/// use driftx_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .try_init()
                    .ok();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .try_init()
                    .ok();
            }
            // init_test_capture() installs the subscriber for tests
            Profile::Test => {}
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
    }

    #[test]
    fn test_profile_parses_names_and_aliases() {
        assert_eq!("production".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!("Dev".parse::<Profile>().unwrap(), Profile::Development);
        assert!("verbose".parse::<Profile>().is_err());
    }

    #[test]
    fn test_profile_display_round_trips() {
        for profile in [Profile::Development, Profile::Production, Profile::Test] {
            assert_eq!(profile.to_string().parse::<Profile>().unwrap(), profile);
        }
    }
}
