//! Connection settings, normally read from the environment.

use reqwest::header::AUTHORIZATION;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://app.codacy.com/api/v3";
/// GitHub. Other hosts use `gl`, `bb`, or a self-hosted provider key.
pub const DEFAULT_PROVIDER: &str = "gh";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_RETRY_BASE_MS: u64 = 500;
const DEFAULT_RETRY_MAX_MS: u64 = 30_000;

pub const TOKEN_VAR: &str = "CODACY_API_TOKEN";
pub const BASE_URL_VAR: &str = "CODACY_API_BASE_URL";
pub const PROVIDER_VAR: &str = "CODACY_PROVIDER";
pub const AUTH_HEADER_VAR: &str = "CODACY_AUTH_HEADER";
pub const TIMEOUT_VAR: &str = "CODACY_TIMEOUT_MS";
pub const MAX_RETRIES_VAR: &str = "CODACY_MAX_RETRIES";
pub const PAGE_SIZE_VAR: &str = "CODACY_PAGE_SIZE";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be set to an API token")]
    MissingToken(&'static str),

    #[error("invalid {var} url `{value}`: {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid {var} `{value}`: expected `bearer` or `api-token`")]
    InvalidCredentialHeader { var: &'static str, value: String },
}

/// How the token is presented to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialHeader {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `api-token: <token>`
    ApiToken,
}

impl CredentialHeader {
    pub(crate) fn apply(
        self,
        builder: reqwest::RequestBuilder,
        token: &str,
    ) -> reqwest::RequestBuilder {
        match self {
            Self::Bearer => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            Self::ApiToken => builder.header("api-token", token),
        }
    }
}

impl FromStr for CredentialHeader {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" | "authorization" => Ok(Self::Bearer),
            "api-token" | "api_token" => Ok(Self::ApiToken),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub provider: String,
    pub organization: String,
    pub token: String,
    pub credential: CredentialHeader,
    /// Per HTTP call, not per operation.
    pub timeout: Duration,
    /// Retries after the first attempt for 429, 5xx and connection failures.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub page_size: usize,
}

impl ApiSettings {
    pub fn new(base_url: Url, organization: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url,
            provider: DEFAULT_PROVIDER.to_string(),
            organization: organization.into(),
            token: token.into(),
            credential: CredentialHeader::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
            retry_max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_MS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Reads the token and optional overrides from `CODACY_*` variables.
    ///
    /// Unparseable numeric overrides fall back to their defaults.
    pub fn from_env(organization: &str) -> Result<Self, SettingsError> {
        let token = std::env::var(TOKEN_VAR)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(SettingsError::MissingToken(TOKEN_VAR))?;

        let base = std::env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base).map_err(|source| SettingsError::InvalidUrl {
            var: BASE_URL_VAR,
            value: base.clone(),
            source,
        })?;

        let mut settings = Self::new(base_url, organization, token);

        if let Ok(provider) = std::env::var(PROVIDER_VAR) {
            let provider = provider.trim();
            if !provider.is_empty() {
                settings.provider = provider.to_string();
            }
        }
        if let Ok(value) = std::env::var(AUTH_HEADER_VAR) {
            settings.credential = value.parse().map_err(|_| {
                SettingsError::InvalidCredentialHeader {
                    var: AUTH_HEADER_VAR,
                    value: value.clone(),
                }
            })?;
        }
        if let Some(ms) = env_number::<u64>(TIMEOUT_VAR) {
            settings.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = env_number::<u32>(MAX_RETRIES_VAR) {
            settings.max_retries = retries;
        }
        if let Some(size) = env_number::<usize>(PAGE_SIZE_VAR).filter(|s| *s > 0) {
            settings.page_size = size;
        }

        Ok(settings)
    }
}

fn env_number<T: FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            if let Some(v) = &self.previous {
                env::set_var(self.key, v);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
        let previous = env::var(key).ok();
        if let Some(v) = value {
            env::set_var(key, v);
        } else {
            env::remove_var(key);
        }
        EnvVarGuard { key, previous }
    }

    fn clear_overrides() -> Vec<EnvVarGuard> {
        [
            BASE_URL_VAR,
            PROVIDER_VAR,
            AUTH_HEADER_VAR,
            TIMEOUT_VAR,
            MAX_RETRIES_VAR,
            PAGE_SIZE_VAR,
        ]
        .into_iter()
        .map(|var| set_env_var(var, None))
        .collect()
    }

    #[test]
    #[serial]
    fn from_env_requires_token() {
        let _overrides = clear_overrides();
        let _token = set_env_var(TOKEN_VAR, None);
        let err = ApiSettings::from_env("acme").unwrap_err();
        assert!(err.to_string().contains(TOKEN_VAR));

        let _token = set_env_var(TOKEN_VAR, Some("   "));
        assert!(matches!(
            ApiSettings::from_env("acme"),
            Err(SettingsError::MissingToken(_))
        ));
    }

    #[test]
    #[serial]
    fn from_env_uses_defaults() {
        let _overrides = clear_overrides();
        let _token = set_env_var(TOKEN_VAR, Some(" secret "));

        let settings = ApiSettings::from_env("acme").unwrap();
        assert_eq!(settings.token, "secret");
        assert_eq!(settings.organization, "acme");
        assert_eq!(settings.provider, DEFAULT_PROVIDER);
        assert_eq!(settings.base_url.as_str(), "https://app.codacy.com/api/v3");
        assert_eq!(settings.credential, CredentialHeader::Bearer);
        assert_eq!(settings.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    #[serial]
    fn from_env_applies_overrides() {
        let _overrides = clear_overrides();
        let _token = set_env_var(TOKEN_VAR, Some("secret"));
        let _base = set_env_var(BASE_URL_VAR, Some("https://codacy.internal/api/v3"));
        let _provider = set_env_var(PROVIDER_VAR, Some("ghe"));
        let _header = set_env_var(AUTH_HEADER_VAR, Some("api-token"));
        let _timeout = set_env_var(TIMEOUT_VAR, Some("1500"));
        let _retries = set_env_var(MAX_RETRIES_VAR, Some("0"));
        let _page = set_env_var(PAGE_SIZE_VAR, Some("not-a-number"));

        let settings = ApiSettings::from_env("acme").unwrap();
        assert_eq!(settings.base_url.host_str(), Some("codacy.internal"));
        assert_eq!(settings.provider, "ghe");
        assert_eq!(settings.credential, CredentialHeader::ApiToken);
        assert_eq!(settings.timeout, Duration::from_millis(1500));
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    #[serial]
    fn from_env_rejects_bad_url_and_header() {
        let _overrides = clear_overrides();
        let _token = set_env_var(TOKEN_VAR, Some("secret"));
        let _base = set_env_var(BASE_URL_VAR, Some("not a url"));
        assert!(matches!(
            ApiSettings::from_env("acme"),
            Err(SettingsError::InvalidUrl { .. })
        ));

        let _base = set_env_var(BASE_URL_VAR, None);
        let _header = set_env_var(AUTH_HEADER_VAR, Some("cookie"));
        assert!(matches!(
            ApiSettings::from_env("acme"),
            Err(SettingsError::InvalidCredentialHeader { .. })
        ));
    }

    #[test]
    fn credential_header_parses_known_names() {
        assert_eq!(
            "Bearer".parse::<CredentialHeader>(),
            Ok(CredentialHeader::Bearer)
        );
        assert_eq!(
            "api_token".parse::<CredentialHeader>(),
            Ok(CredentialHeader::ApiToken)
        );
        assert!("basic".parse::<CredentialHeader>().is_err());
    }
}
