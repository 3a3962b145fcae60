//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Catalog backend
//! - `CATALOG_BACKEND` - `shopify` (default) or `petpooja`
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g. mithadi.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token
//! - `SHOPIFY_API_VERSION` - API version (default: 2023-01)
//! - `PETPOOJA_ACCESS_TOKEN`, `PETPOOJA_APP_SECRET`, `PETPOOJA_APP_KEY` - `PetPooja` credentials
//! - `PETPOOJA_API_BASE_URL` - API base (default: <https://pos.petpooja.com/api/v2>)
//!
//! ## Payment (optional)
//! - `RAZORPAY_KEY_ID` - Razorpay key id (public, sent to the hosted widget)
//! - `RAZORPAY_KEY_SECRET` - Razorpay key secret (server-side only)
//! - `STORE_NAME` - Merchant name shown in the widget (default: Mithadi Palace)
//! - `PAYMENT_THEME_COLOR` - Widget accent color (default: #D4A574)
//!
//! ## Cart
//! - `CART_STORAGE_DIR` - Directory for the persisted cart (default: .mithadi)
//! - `CART_SYNC_DEBOUNCE_MS` - Quiet period before checkout sync (default: 1000)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SHOPIFY_API_VERSION: &str = "2023-01";
const DEFAULT_PETPOOJA_BASE_URL: &str = "https://pos.petpooja.com/api/v2";
const DEFAULT_STORE_NAME: &str = "Mithadi Palace";
const DEFAULT_THEME_COLOR: &str = "#D4A574";
const DEFAULT_STORAGE_DIR: &str = ".mithadi";
const DEFAULT_SYNC_DEBOUNCE_MS: u64 = 1000;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Which catalog backend to talk to
    pub backend: BackendConfig,
    /// Razorpay credentials, if payments are enabled
    pub payment: Option<RazorpayConfig>,
    /// Merchant branding passed to the payment widget
    pub brand: BrandConfig,
    /// Cart persistence and sync settings
    pub cart: CartConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog backend selection.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Shopify Storefront GraphQL API.
    Shopify(ShopifyConfig),
    /// `PetPooja` point-of-sale REST API.
    Petpooja(PetpoojaConfig),
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Store domain without scheme (e.g. mithadi.myshopify.com)
    pub store_domain: String,
    /// Storefront API version (e.g. 2023-01)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .finish()
    }
}

impl ShopifyConfig {
    /// GraphQL endpoint for this store.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

/// `PetPooja` API configuration.
#[derive(Clone)]
pub struct PetpoojaConfig {
    /// API base URL (no trailing slash)
    pub base_url: String,
    /// Access token
    pub access_token: SecretString,
    /// App secret
    pub app_secret: SecretString,
    /// App key
    pub app_key: String,
}

impl std::fmt::Debug for PetpoojaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetpoojaConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("app_secret", &"[REDACTED]")
            .field("app_key", &self.app_key)
            .finish()
    }
}

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Key id (public, embedded in widget options)
    pub key_id: String,
    /// Key secret (orders API auth and signature verification)
    pub key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

/// Merchant branding for the hosted payment widget.
#[derive(Debug, Clone)]
pub struct BrandConfig {
    /// Merchant name
    pub store_name: String,
    /// Widget accent color
    pub theme_color: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            theme_color: DEFAULT_THEME_COLOR.to_string(),
        }
    }
}

/// Cart persistence and sync configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory holding the persisted cart keys
    pub storage_dir: PathBuf,
    /// Quiet period before the checkout mirror is reconciled
    pub sync_debounce: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            sync_debounce: Duration::from_millis(DEFAULT_SYNC_DEBOUNCE_MS),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_source(&Env(&lookup))
    }

    fn from_source(env: &Env<'_>) -> Result<Self, ConfigError> {
        let backend = match env.or_default("CATALOG_BACKEND", "shopify").as_str() {
            "shopify" => BackendConfig::Shopify(ShopifyConfig::from_source(env)?),
            "petpooja" => BackendConfig::Petpooja(PetpoojaConfig::from_source(env)?),
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CATALOG_BACKEND".to_string(),
                    format!("expected 'shopify' or 'petpooja', got '{other}'"),
                ));
            }
        };

        let payment = match env.optional("RAZORPAY_KEY_ID") {
            Some(key_id) => Some(RazorpayConfig {
                key_id,
                key_secret: env.validated_secret("RAZORPAY_KEY_SECRET")?,
            }),
            None => None,
        };

        let brand = BrandConfig {
            store_name: env.or_default("STORE_NAME", DEFAULT_STORE_NAME),
            theme_color: env.or_default("PAYMENT_THEME_COLOR", DEFAULT_THEME_COLOR),
        };

        let debounce_ms = env
            .or_default("CART_SYNC_DEBOUNCE_MS", &DEFAULT_SYNC_DEBOUNCE_MS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CART_SYNC_DEBOUNCE_MS".to_string(), e.to_string())
            })?;

        let cart = CartConfig {
            storage_dir: PathBuf::from(env.or_default("CART_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            sync_debounce: Duration::from_millis(debounce_ms),
        };

        Ok(Self {
            backend,
            payment,
            brand,
            cart,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ShopifyConfig {
    fn from_source(env: &Env<'_>) -> Result<Self, ConfigError> {
        let store_domain = normalize_store_domain(&env.required("SHOPIFY_STORE_DOMAIN")?);
        if store_domain.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_STORE_DOMAIN".to_string(),
                "domain is empty".to_string(),
            ));
        }
        if !store_domain.contains("myshopify.com") {
            tracing::warn!(
                domain = %store_domain,
                "Shopify domain may be incorrect, expected a myshopify.com domain"
            );
        }

        Ok(Self {
            store_domain,
            api_version: env.or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            storefront_token: env.validated_secret("SHOPIFY_STOREFRONT_TOKEN")?,
        })
    }
}

impl PetpoojaConfig {
    fn from_source(env: &Env<'_>) -> Result<Self, ConfigError> {
        let base_url = env.or_default("PETPOOJA_API_BASE_URL", DEFAULT_PETPOOJA_BASE_URL);
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PETPOOJA_API_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: env.validated_secret("PETPOOJA_ACCESS_TOKEN")?,
            app_secret: env.validated_secret("PETPOOJA_APP_SECRET")?,
            app_key: env.required("PETPOOJA_APP_KEY")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup, backed by the process environment in production.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Strip scheme and trailing slashes from a store domain.
fn normalize_store_domain(raw: &str) -> String {
    let domain = raw.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/').to_string()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOKEN: &str = "9f8e7d6c5b4a39281706f5e4d3c2b1a0";

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let lookup = move |key: &str| map.get(key).cloned();
        StorefrontConfig::from_source(&Env(&lookup))
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your_storefront_api_token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_hex_token() {
        assert!(validate_secret_strength(TOKEN, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_normalize_store_domain() {
        assert_eq!(
            normalize_store_domain(" https://mithadi.myshopify.com/ "),
            "mithadi.myshopify.com"
        );
        assert_eq!(
            normalize_store_domain("http://mithadi.myshopify.com"),
            "mithadi.myshopify.com"
        );
    }

    #[test]
    fn test_shopify_defaults() {
        let config = load(&[
            ("SHOPIFY_STORE_DOMAIN", "https://mithadi.myshopify.com"),
            ("SHOPIFY_STOREFRONT_TOKEN", TOKEN),
        ])
        .unwrap();

        let BackendConfig::Shopify(shopify) = &config.backend else {
            panic!("expected shopify backend");
        };
        assert_eq!(
            shopify.endpoint(),
            "https://mithadi.myshopify.com/api/2023-01/graphql.json"
        );
        assert!(config.payment.is_none());
        assert_eq!(config.cart.sync_debounce, Duration::from_secs(1));
        assert_eq!(config.brand.store_name, "Mithadi Palace");
    }

    #[test]
    fn test_petpooja_backend() {
        let config = load(&[
            ("CATALOG_BACKEND", "petpooja"),
            ("PETPOOJA_ACCESS_TOKEN", TOKEN),
            ("PETPOOJA_APP_SECRET", "3b1f9c0e7a5d42e8b6c1f0a9d8e7c6b5"),
            ("PETPOOJA_APP_KEY", "k2j4h6g8"),
            ("CART_SYNC_DEBOUNCE_MS", "250"),
        ])
        .unwrap();

        assert!(matches!(config.backend, BackendConfig::Petpooja(_)));
        assert_eq!(config.cart.sync_debounce, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = load(&[("CATALOG_BACKEND", "woocommerce")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_missing_token() {
        let result = load(&[("SHOPIFY_STORE_DOMAIN", "mithadi.myshopify.com")]);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "SHOPIFY_STOREFRONT_TOKEN"));
    }

    #[test]
    fn test_payment_requires_secret() {
        let result = load(&[
            ("SHOPIFY_STORE_DOMAIN", "mithadi.myshopify.com"),
            ("SHOPIFY_STOREFRONT_TOKEN", TOKEN),
            ("RAZORPAY_KEY_ID", "rzp_test_1DP5mmOlF5G5ag"),
        ]);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "RAZORPAY_KEY_SECRET"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ShopifyConfig {
            store_domain: "mithadi.myshopify.com".to_string(),
            api_version: "2023-01".to_string(),
            storefront_token: SecretString::from("super_secret_token_value"),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("mithadi.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }
}
