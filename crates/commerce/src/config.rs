//! Commerce configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAYMENT_GATEWAY_SECRET` - Shared secret for payment signature verification
//!
//! ## Optional
//! - `COMMERCE_TAX_RATE` - Tax rate on the items total (default: 0.10)
//! - `COMMERCE_FREE_SHIPPING_OVER` - Items total above which shipping is free (default: 100)
//! - `COMMERCE_SHIPPING_FEE` - Flat shipping fee below the threshold (default: 10)
//! - `COMMERCE_LOW_STOCK_THRESHOLD` - Low-stock report threshold (default: 10)

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use crate::models::inventory::DEFAULT_LOW_STOCK_THRESHOLD;
use crate::pricing::PricingPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Commerce application configuration.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Shared secret for payment gateway signature verification.
    pub gateway_secret: SecretString,
    /// Pricing policy constants.
    pub pricing: PricingPolicy,
    /// Quantity at or below which a product counts as low stock. Applied
    /// to newly opened inventory records via
    /// [`crate::orders::OrderService::with_low_stock_threshold`] (or
    /// [`crate::inventory::InventoryLedger::with_low_stock_threshold`]).
    pub low_stock_threshold: i64,
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("gateway_secret", &"[REDACTED]")
            .field("pricing", &self.pricing)
            .field("low_stock_threshold", &self.low_stock_threshold)
            .finish()
    }
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let gateway_secret = SecretString::from(get_required_env("PAYMENT_GATEWAY_SECRET")?);

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            tax_rate: parse_decimal("COMMERCE_TAX_RATE", defaults.tax_rate)?,
            free_shipping_over: parse_decimal(
                "COMMERCE_FREE_SHIPPING_OVER",
                defaults.free_shipping_over,
            )?,
            flat_shipping_fee: parse_decimal("COMMERCE_SHIPPING_FEE", defaults.flat_shipping_fee)?,
        };

        let low_stock_threshold =
            parse_integer("COMMERCE_LOW_STOCK_THRESHOLD", DEFAULT_LOW_STOCK_THRESHOLD)?;

        Ok(Self {
            gateway_secret,
            pricing,
            low_stock_threshold,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse an optional decimal variable, falling back to a default.
fn parse_decimal(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<Decimal>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse an optional integer variable, falling back to a default.
fn parse_integer(key: &str, default: i64) -> Result<i64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = CommerceConfig {
            gateway_secret: SecretString::from("vN7$wQ3!tZr5@yM1"),
            pricing: PricingPolicy::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("vN7$wQ3!tZr5@yM1"));
    }

    #[test]
    fn test_default_policy_matches_store_policy() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.tax_rate, Decimal::new(10, 2));
        assert_eq!(policy.free_shipping_over, Decimal::ONE_HUNDRED);
        assert_eq!(policy.flat_shipping_fee, Decimal::TEN);
    }

    #[test]
    fn test_parse_decimal_falls_back_to_default() {
        // Variable guaranteed absent.
        let value = parse_decimal("COMMERCE_TEST_ABSENT_DECIMAL", Decimal::ONE).unwrap();
        assert_eq!(value, Decimal::ONE);
    }

    #[test]
    fn test_parse_integer_falls_back_to_default() {
        let value = parse_integer("COMMERCE_TEST_ABSENT_INTEGER", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_missing_required_var_is_reported() {
        let err = get_required_env("COMMERCE_TEST_ABSENT_REQUIRED").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
        assert!(err.to_string().contains("COMMERCE_TEST_ABSENT_REQUIRED"));
    }
}
