/*!
Environment-driven configuration. §6 "Configuration": `OLDAP_TS_SERVER`, `OLDAP_TS_REPO`,
`OLDAP_TS_USER`, `OLDAP_TS_PASSWORD`, `OLDAP_REDIS_URL`, `OLDAP_JWT_SECRET`, each with the
documented default, validated at load time.
*/
use oldap_errors::{value_error, Result};
use std::sync::OnceLock;
use tracing::debug;

const DEFAULT_TS_SERVER: &str = "http://localhost:7200";
const DEFAULT_TS_REPO: &str = "oldap";
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Configuration sourced from environment variables, per §6.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OldapConfig {
    pub ts_server: String,
    pub ts_repo: String,
    pub ts_user: Option<String>,
    pub ts_password: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
}

impl OldapConfig {
    /// Read configuration from the process environment, applying documented defaults and
    /// validating `OLDAP_TS_SERVER` as a URL.
    pub fn from_env() -> Result<Self> {
        let ts_server =
            std::env::var("OLDAP_TS_SERVER").unwrap_or_else(|_| DEFAULT_TS_SERVER.to_string());
        url::Url::parse(&ts_server)
            .map_err(|e| value_error(format!("OLDAP_TS_SERVER '{ts_server}' is not a valid URL: {e}")))?;

        let ts_repo = std::env::var("OLDAP_TS_REPO").unwrap_or_else(|_| DEFAULT_TS_REPO.to_string());
        let ts_user = std::env::var("OLDAP_TS_USER").ok();
        let ts_password = std::env::var("OLDAP_TS_PASSWORD").ok();
        let redis_url = std::env::var("OLDAP_REDIS_URL")
            .ok()
            .filter(|v| !v.is_empty());
        let jwt_secret = std::env::var("OLDAP_JWT_SECRET").unwrap_or_default();

        debug!(ts_server, ts_repo, "loaded OldapConfig from environment");

        Ok(Self {
            ts_server,
            ts_repo,
            ts_user,
            ts_password,
            redis_url,
            jwt_secret,
        })
    }

    /// `true` when `OLDAP_REDIS_URL` was unset, meaning callers should fall back to
    /// [`crate::cache::InProcessCache`] (§6: "if unset, in-process cache is used").
    pub fn uses_in_process_cache(&self) -> bool {
        self.redis_url.is_none()
    }

    #[cfg(test)]
    fn default_for_test() -> Self {
        Self {
            ts_server: DEFAULT_TS_SERVER.to_string(),
            ts_repo: DEFAULT_TS_REPO.to_string(),
            ts_user: None,
            ts_password: None,
            redis_url: Some(DEFAULT_REDIS_URL.to_string()),
            jwt_secret: "test-secret".to_string(),
        }
    }
}

static GLOBAL_CONFIG: OnceLock<OldapConfig> = OnceLock::new();

/// The process-wide configuration singleton, per §9 ("Global state … lazy `OnceLock` globals in
/// production code"). Initializes from the environment on first access.
pub fn global_config() -> &'static OldapConfig {
    GLOBAL_CONFIG.get_or_init(|| {
        OldapConfig::from_env().unwrap_or_else(|e| {
            tracing::error!(error = %e, "invalid OLDAP_TS_SERVER, falling back to default");
            OldapConfig {
                ts_server: DEFAULT_TS_SERVER.to_string(),
                ts_repo: DEFAULT_TS_REPO.to_string(),
                ts_user: None,
                ts_password: None,
                redis_url: None,
                jwt_secret: String::new(),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_test_config_is_well_formed() {
        let cfg = OldapConfig::default_for_test();
        assert_eq!(cfg.ts_server, DEFAULT_TS_SERVER);
        assert!(!cfg.uses_in_process_cache());
    }

    #[test]
    fn missing_redis_url_selects_in_process_cache() {
        let mut cfg = OldapConfig::default_for_test();
        cfg.redis_url = None;
        assert!(cfg.uses_in_process_cache());
    }
}
