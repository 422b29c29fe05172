//! Gateway configuration.
//!
//! [`GatewayConfig`] carries the Converge credentials, the test-mode switch,
//! the endpoint and the reply format. It is passed explicitly into every
//! request; nothing here is global.
//!
//! Configuration can be built in code, deserialized from TOML or read from the
//! environment.
//!
//! ```toml
//! merchant_id = "000000"
//! username = "USERNAME"
//! password = "PASSWORD"
//! test_mode = true
//!
//! [response]
//! delimiter = "newline"
//!
//! [http]
//! timeout_secs = 45
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::{GatewayError, Result},
    response::ResponseFormat,
    transport::HttpConfig,
};

/// Converge demo (test) endpoint.
pub const TEST_ENDPOINT: &str = "https://api.demo.convergepay.com/VirtualMerchantDemo";

/// Converge production endpoint.
pub const LIVE_ENDPOINT: &str = "https://api.convergepay.com/VirtualMerchant";

/// Environment variable holding the merchant id.
pub const ENV_MERCHANT_ID: &str = "CONVERGE_MERCHANT_ID";
/// Environment variable holding the user id.
pub const ENV_USER_ID: &str = "CONVERGE_USER_ID";
/// Environment variable holding the PIN.
pub const ENV_PIN: &str = "CONVERGE_PIN";
/// Environment variable holding the test-mode flag.
pub const ENV_TEST_MODE: &str = "CONVERGE_TEST_MODE";
/// Environment variable holding an endpoint override.
pub const ENV_ENDPOINT: &str = "CONVERGE_ENDPOINT";

/// Converge PIN.
///
/// Wiped from memory on drop and never shown by `Debug`.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
    /// Wraps a PIN value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the PIN for serialization into the form body.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no PIN is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(***)")
    }
}

/// Converge gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Converge account id (`ssl_merchant_id`).
    pub merchant_id: String,

    /// Converge user id (`ssl_user_id`).
    pub username: String,

    /// Converge PIN (`ssl_pin`).
    pub password: Pin,

    /// Sends `ssl_test_mode=true` and selects the demo endpoint.
    #[serde(default)]
    pub test_mode: bool,

    /// Explicit endpoint, overriding the test/live selection.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Reply decoding settings.
    #[serde(default)]
    pub response: ResponseFormat,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl GatewayConfig {
    /// Creates a production configuration with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use converge_gateway::config::{GatewayConfig, TEST_ENDPOINT};
    ///
    /// let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true);
    /// assert_eq!(config.endpoint(), TEST_ENDPOINT);
    /// ```
    #[must_use]
    pub fn new(
        merchant_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            username: username.into(),
            password: Pin::new(password),
            test_mode: false,
            endpoint: None,
            response: ResponseFormat::default(),
            http: HttpConfig::default(),
        }
    }

    /// Sets the test-mode flag.
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Replaces the reply decoding settings.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response = format;
        self
    }

    /// Replaces the HTTP client settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Returns the endpoint requests are posted to.
    ///
    /// An explicit override wins; otherwise `test_mode` selects between
    /// [`TEST_ENDPOINT`] and [`LIVE_ENDPOINT`].
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match &self.endpoint {
            Some(endpoint) => endpoint.as_str(),
            None if self.test_mode => TEST_ENDPOINT,
            None => LIVE_ENDPOINT,
        }
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the TOML is malformed or the
    /// configuration fails [`validate`](Self::validate).
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GatewayError::ConfigError(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the file cannot be read or the
    /// contents are invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GatewayError::ConfigError(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads [`ENV_MERCHANT_ID`], [`ENV_USER_ID`], [`ENV_PIN`] and optionally
    /// [`ENV_TEST_MODE`] and [`ENV_ENDPOINT`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if a required variable is missing
    /// or the result fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| GatewayError::ConfigError(format!("{name} is not set")))
        };

        let mut config =
            Self::new(required(ENV_MERCHANT_ID)?, required(ENV_USER_ID)?, required(ENV_PIN)?);

        if let Some(flag) = lookup(ENV_TEST_MODE) {
            config.test_mode = parse_flag(&flag).ok_or_else(|| {
                GatewayError::ConfigError(format!("{ENV_TEST_MODE} must be true or false: {flag}"))
            })?;
        }

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|value| !value.is_empty()) {
            config.endpoint = Some(endpoint);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates credentials, endpoint and HTTP settings.
    ///
    /// Checks that:
    /// - merchant id, user id and PIN are not empty
    /// - the endpoint parses, uses HTTPS and is not a loopback address
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.trim().is_empty() {
            return Err(GatewayError::ConfigError("merchant_id cannot be empty".to_owned()));
        }
        if self.username.trim().is_empty() {
            return Err(GatewayError::ConfigError("username cannot be empty".to_owned()));
        }
        if self.password.is_empty() {
            return Err(GatewayError::ConfigError("password cannot be empty".to_owned()));
        }

        validate_endpoint(self.endpoint())?;
        self.response.validate()?;
        self.http.validate()?;

        Ok(())
    }
}

/// Validates an endpoint URL.
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| GatewayError::ConfigError(format!("invalid endpoint '{endpoint}': {e}")))?;

    if url.scheme() != "https" {
        return Err(GatewayError::ConfigError(format!(
            "endpoint must use HTTPS, got: {}",
            url.scheme()
        )));
    }

    if let Some(host) = url.host_str() {
        let host_lower = host.to_lowercase();
        if host_lower == "localhost"
            || host_lower == "::1"
            || host_lower == "[::1]"
            || host_lower.starts_with("127.")
        {
            return Err(GatewayError::ConfigError(format!(
                "endpoint must not be localhost or loopback: {host}"
            )));
        }
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::response::RecordDelimiter;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_endpoint_selection() {
        let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD");
        assert_eq!(config.endpoint(), LIVE_ENDPOINT);

        let config = config.with_test_mode(true);
        assert_eq!(config.endpoint(), TEST_ENDPOINT);

        let config = config.with_endpoint("https://converge.internal.example.com/vm");
        assert_eq!(config.endpoint(), "https://converge.internal.example.com/vm");
    }

    #[test]
    fn test_from_toml_minimal() {
        let toml = r#"
            merchant_id = "000000"
            username = "USERNAME"
            password = "PASSWORD"
            test_mode = true
        "#;

        let config = GatewayConfig::from_toml(toml).unwrap();
        assert_eq!(config.merchant_id, "000000");
        assert_eq!(config.username, "USERNAME");
        assert_eq!(config.password.expose(), "PASSWORD");
        assert!(config.test_mode);
        assert_eq!(config.endpoint(), TEST_ENDPOINT);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_from_toml_with_sections() {
        let toml = r#"
            merchant_id = "000000"
            username = "USERNAME"
            password = "PASSWORD"
            endpoint = "https://api.convergepay.com/VirtualMerchant"

            [response]
            delimiter = "|"
            approved_value = "0"

            [http]
            timeout_secs = 45
            http_version = "http1"
        "#;

        let config = GatewayConfig::from_toml(toml).unwrap();
        assert_eq!(config.response.delimiter, RecordDelimiter::Char('|'));
        assert_eq!(config.http.timeout_secs, 45);
    }

    #[test]
    fn test_from_toml_missing_credentials() {
        let toml = r#"
            merchant_id = "000000"
            username = "USERNAME"
        "#;

        let err = GatewayConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigError(_)));
    }

    #[test]
    fn test_validate_rejects_empty_credentials() {
        let config = GatewayConfig::new("", "USERNAME", "PASSWORD");
        assert!(config.validate().is_err());

        let config = GatewayConfig::new("000000", " ", "PASSWORD");
        assert!(config.validate().is_err());

        let config = GatewayConfig::new("000000", "USERNAME", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_insecure_endpoint() {
        let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD")
            .with_endpoint("http://api.convergepay.com/VirtualMerchant");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HTTPS"));

        let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD")
            .with_endpoint("https://127.0.0.1/VirtualMerchant");
        assert!(config.validate().is_err());

        let config =
            GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_endpoint("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_MERCHANT_ID, "000000"),
            (ENV_USER_ID, "USERNAME"),
            (ENV_PIN, "PASSWORD"),
            (ENV_TEST_MODE, "true"),
        ]))
        .unwrap();

        assert_eq!(config.merchant_id, "000000");
        assert!(config.test_mode);
        assert_eq!(config.endpoint(), TEST_ENDPOINT);
    }

    #[test]
    fn test_from_lookup_missing_pin() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_MERCHANT_ID, "000000"),
            (ENV_USER_ID, "USERNAME"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_PIN));
    }

    #[test]
    fn test_from_lookup_bad_flag() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_MERCHANT_ID, "000000"),
            (ENV_USER_ID, "USERNAME"),
            (ENV_PIN, "PASSWORD"),
            (ENV_TEST_MODE, "maybe"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_TEST_MODE));
    }

    #[test]
    fn test_pin_debug_is_redacted() {
        let config = GatewayConfig::new("000000", "USERNAME", "SUPERSECRET");
        let debug = format!("{config:?}");
        assert!(!debug.contains("SUPERSECRET"));
        assert!(debug.contains("Pin(***)"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
