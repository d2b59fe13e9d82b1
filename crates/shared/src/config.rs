//! Application configuration management.
//!
//! Posting tolerances live here rather than in the engine so that the
//! rounding policy can be tuned per deployment without a rebuild.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Posting engine configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rounding and tolerance policy for the posting engine.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Number of decimal places amounts are rounded to.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Allowance for adjustment-style vouchers, in minimal units at `precision`.
    #[serde(default = "default_adjustment_allowance_units")]
    pub adjustment_allowance_units: i64,
    /// Allowance for every other voucher type.
    #[serde(default = "default_allowance")]
    pub default_allowance: Decimal,
    /// Voucher type names that use the adjustment allowance.
    #[serde(default = "default_adjustment_voucher_types")]
    pub adjustment_voucher_types: Vec<String>,
    /// Prefix written into the remarks of reversal entries.
    #[serde(default = "default_cancellation_remark_prefix")]
    pub cancellation_remark_prefix: String,
}

fn default_precision() -> u32 {
    2
}

fn default_adjustment_allowance_units() -> i64 {
    5
}

fn default_allowance() -> Decimal {
    Decimal::new(5, 1)
}

fn default_adjustment_voucher_types() -> Vec<String> {
    vec!["Journal Entry".to_string(), "Payment Entry".to_string()]
}

fn default_cancellation_remark_prefix() -> String {
    "On cancellation of".to_string()
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            adjustment_allowance_units: default_adjustment_allowance_units(),
            default_allowance: default_allowance(),
            adjustment_voucher_types: default_adjustment_voucher_types(),
            cancellation_remark_prefix: default_cancellation_remark_prefix(),
        }
    }
}

impl PostingConfig {
    /// Smallest representable amount at the configured precision (0.01 for 2 places).
    #[must_use]
    pub fn min_unit(&self) -> Decimal {
        Decimal::new(1, self.precision)
    }

    /// Allowed debit/credit difference for a voucher type name.
    #[must_use]
    pub fn allowance_for(&self, voucher_type: &str) -> Decimal {
        if self
            .adjustment_voucher_types
            .iter()
            .any(|t| t == voucher_type)
        {
            Decimal::new(self.adjustment_allowance_units, self.precision)
        } else {
            self.default_allowance
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "ledgerpost=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERPOST").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_posting_defaults() {
        let config = PostingConfig::default();
        assert_eq!(config.precision, 2);
        assert_eq!(config.min_unit(), dec!(0.01));
        assert_eq!(config.default_allowance, dec!(0.5));
        assert_eq!(config.cancellation_remark_prefix, "On cancellation of");
    }

    #[rstest]
    #[case("Journal Entry", dec!(0.05))]
    #[case("Payment Entry", dec!(0.05))]
    #[case("Sales Invoice", dec!(0.5))]
    #[case("Purchase Invoice", dec!(0.5))]
    fn test_allowance_per_voucher_type(#[case] voucher_type: &str, #[case] expected: Decimal) {
        assert_eq!(PostingConfig::default().allowance_for(voucher_type), expected);
    }

    #[test]
    fn test_allowance_follows_precision() {
        let config = PostingConfig {
            precision: 3,
            ..PostingConfig::default()
        };
        assert_eq!(config.allowance_for("Journal Entry"), dec!(0.005));
        assert_eq!(config.min_unit(), dec!(0.001));
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEDGERPOST__POSTING__PRECISION", Some("3")),
                ("LEDGERPOST__POSTING__DEFAULT_ALLOWANCE", Some("0.25")),
                ("LEDGERPOST__LOGGING__JSON", Some("true")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.posting.precision, 3);
                assert_eq!(config.posting.default_allowance, dec!(0.25));
                assert_eq!(config.posting.adjustment_allowance_units, 5);
                assert!(config.logging.json);
            },
        );
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            [
                "LEDGERPOST__POSTING__PRECISION",
                "LEDGERPOST__POSTING__DEFAULT_ALLOWANCE",
                "LEDGERPOST__LOGGING__JSON",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.posting.precision, 2);
                assert_eq!(config.logging.filter, "ledgerpost=info");
            },
        );
    }
}
