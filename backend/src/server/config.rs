//! Start-up settings loaded via OrthoConfig and the resolved server
//! configuration built from them.

use std::net::SocketAddr;
use std::time::Duration;

use backend::outbound::media::CloudinaryCredentials;
use backend::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const EPHEMERAL_SECRET_LEN: usize = 64;
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Raw settings layered from CLI flags, `RENTFIT_*` variables and the
/// config file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RENTFIT")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the in-memory stores are used.
    pub database_url: Option<String>,
    pub pool_max_size: Option<u32>,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: Option<i64>,
    pub bcrypt_cost: Option<u32>,
    /// Firebase project whose ID tokens are accepted.
    pub firebase_project_id: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    /// Timeout for calls to Google and Cloudinary.
    pub outbound_timeout_secs: Option<u64>,
}

/// Settings that cannot be turned into a runnable server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("RENTFIT_JWT_SECRET is required in release builds")]
    MissingJwtSecret,
    #[error("token_ttl_hours must be positive, got {0}")]
    TokenTtl(i64),
    #[error("bcrypt_cost must be between 4 and 31, got {0}")]
    BcryptCost(u32),
    #[error("Cloudinary needs cloud name, API key and API secret together")]
    IncompleteCloudinary,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// The configured secret, or a random one in debug builds.
    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        if let Some(secret) = non_blank(self.jwt_secret.as_ref()) {
            return Ok(Zeroizing::new(secret.to_owned()));
        }
        if cfg!(debug_assertions) {
            warn!("no JWT secret configured; using an ephemeral secret (dev only)");
            let secret = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(EPHEMERAL_SECRET_LEN)
                .map(char::from)
                .collect::<String>();
            Ok(Zeroizing::new(secret))
        } else {
            Err(SettingsError::MissingJwtSecret)
        }
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        let hours = self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        if hours <= 0 {
            return Err(SettingsError::TokenTtl(hours));
        }
        Ok(chrono::Duration::hours(hours))
    }

    pub fn bcrypt_cost(&self) -> Result<u32, SettingsError> {
        let cost = self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST);
        if BCRYPT_COST_RANGE.contains(&cost) {
            Ok(cost)
        } else {
            Err(SettingsError::BcryptCost(cost))
        }
    }

    pub fn firebase_project_id(&self) -> Option<&str> {
        non_blank(self.firebase_project_id.as_ref())
    }

    /// All three Cloudinary values, none of them, or an error.
    pub fn cloudinary(&self) -> Result<Option<CloudinaryCredentials>, SettingsError> {
        match (
            non_blank(self.cloudinary_cloud_name.as_ref()),
            non_blank(self.cloudinary_api_key.as_ref()),
            non_blank(self.cloudinary_api_secret.as_ref()),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                Ok(Some(CloudinaryCredentials {
                    cloud_name: cloud_name.to_owned(),
                    api_key: api_key.to_owned(),
                    api_secret: Zeroizing::new(api_secret.to_owned()),
                }))
            }
            (None, None, None) => Ok(None),
            _ => Err(SettingsError::IncompleteCloudinary),
        }
    }

    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(
            self.outbound_timeout_secs
                .unwrap_or(DEFAULT_OUTBOUND_TIMEOUT_SECS),
        )
    }

    /// Resolve everything except the database pool, which needs I/O.
    pub fn server_config(&self) -> Result<ServerConfig, SettingsError> {
        let mut config = ServerConfig::new(self.bind_addr()?, self.jwt_secret()?)
            .with_token_ttl(self.token_ttl()?)
            .with_bcrypt_cost(self.bcrypt_cost()?)
            .with_outbound_timeout(self.outbound_timeout());
        if let Some(project) = self.firebase_project_id() {
            config = config.with_firebase_project(project);
        }
        if let Some(credentials) = self.cloudinary()? {
            config = config.with_cloudinary(credentials);
        }
        Ok(config)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) jwt_secret: Zeroizing<String>,
    pub(crate) token_ttl: chrono::Duration,
    pub(crate) bcrypt_cost: u32,
    pub(crate) firebase_project: Option<String>,
    pub(crate) cloudinary: Option<CloudinaryCredentials>,
    pub(crate) outbound_timeout: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: Zeroizing<String>) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            jwt_secret,
            token_ttl: chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            firebase_project: None,
            cloudinary: None,
            outbound_timeout: Duration::from_secs(DEFAULT_OUTBOUND_TIMEOUT_SECS),
        }
    }

    /// Use Diesel repositories over `pool` instead of the in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn with_firebase_project(mut self, project: impl Into<String>) -> Self {
        self.firebase_project = Some(project.into());
        self
    }

    #[must_use]
    pub fn with_cloudinary(mut self, credentials: CloudinaryCredentials) -> Self {
        self.cloudinary = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_outbound_timeout(mut self, timeout: Duration) -> Self {
        self.outbound_timeout = timeout;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Settings loading and resolution.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 11] = [
        "RENTFIT_BIND_ADDR",
        "RENTFIT_DATABASE_URL",
        "RENTFIT_POOL_MAX_SIZE",
        "RENTFIT_JWT_SECRET",
        "RENTFIT_TOKEN_TTL_HOURS",
        "RENTFIT_BCRYPT_COST",
        "RENTFIT_FIREBASE_PROJECT_ID",
        "RENTFIT_CLOUDINARY_CLOUD_NAME",
        "RENTFIT_CLOUDINARY_API_KEY",
        "RENTFIT_CLOUDINARY_API_SECRET",
        "RENTFIT_OUTBOUND_TIMEOUT_SECS",
    ];

    fn cleared_env_with(
        overrides: &[(&'static str, &str)],
    ) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("rentfit-backend")])
            .expect("settings should load")
    }

    fn empty() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            pool_max_size: None,
            jwt_secret: None,
            token_ttl_hours: None,
            bcrypt_cost: None,
            firebase_project_id: None,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            outbound_timeout_secs: None,
        }
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared_env_with(&[]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("default parses"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(settings.token_ttl(), Ok(chrono::Duration::days(7)));
        assert_eq!(settings.cloudinary(), Ok(None));
        assert_eq!(settings.firebase_project_id(), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_env_with(&[
            ("RENTFIT_BIND_ADDR", "127.0.0.1:5000"),
            ("RENTFIT_DATABASE_URL", "postgres://localhost/rentfit"),
            ("RENTFIT_JWT_SECRET", "from-env"),
            ("RENTFIT_TOKEN_TTL_HOURS", "12"),
            ("RENTFIT_BCRYPT_COST", "6"),
            ("RENTFIT_FIREBASE_PROJECT_ID", "rentfit-prod"),
        ]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("parses").to_string(),
            "127.0.0.1:5000"
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/rentfit"));
        assert_eq!(settings.jwt_secret().expect("set").as_str(), "from-env");
        assert_eq!(settings.token_ttl(), Ok(chrono::Duration::hours(12)));
        assert_eq!(settings.bcrypt_cost(), Ok(6));
        assert_eq!(settings.firebase_project_id(), Some("rentfit-prod"));
    }

    #[rstest]
    #[case(Some("cloud"), Some("key"), Some("secret"), true)]
    #[case(None, None, None, false)]
    fn complete_or_absent_cloudinary_is_accepted(
        #[case] cloud: Option<&str>,
        #[case] key: Option<&str>,
        #[case] secret: Option<&str>,
        #[case] configured: bool,
    ) {
        let settings = AppSettings {
            cloudinary_cloud_name: cloud.map(str::to_owned),
            cloudinary_api_key: key.map(str::to_owned),
            cloudinary_api_secret: secret.map(str::to_owned),
            ..empty()
        };

        let credentials = settings.cloudinary().expect("valid combination");

        assert_eq!(credentials.is_some(), configured);
    }

    #[test]
    fn partial_cloudinary_is_rejected() {
        let settings = AppSettings {
            cloudinary_cloud_name: Some("cloud".to_owned()),
            cloudinary_api_key: Some("  ".to_owned()),
            ..empty()
        };

        assert_eq!(settings.cloudinary(), Err(SettingsError::IncompleteCloudinary));
    }

    #[rstest]
    #[case(Some(0), Err(SettingsError::TokenTtl(0)))]
    #[case(Some(-3), Err(SettingsError::TokenTtl(-3)))]
    #[case(Some(1), Ok(chrono::Duration::hours(1)))]
    fn token_ttl_must_be_positive(
        #[case] hours: Option<i64>,
        #[case] expected: Result<chrono::Duration, SettingsError>,
    ) {
        let settings = AppSettings {
            token_ttl_hours: hours,
            ..empty()
        };

        assert_eq!(settings.token_ttl(), expected);
    }

    #[rstest]
    #[case(3)]
    #[case(32)]
    fn bcrypt_cost_outside_range_is_rejected(#[case] cost: u32) {
        let settings = AppSettings {
            bcrypt_cost: Some(cost),
            ..empty()
        };

        assert_eq!(settings.bcrypt_cost(), Err(SettingsError::BcryptCost(cost)));
    }

    #[test]
    fn malformed_bind_address_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("localhost".to_owned()),
            ..empty()
        };

        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { value, .. }) if value == "localhost"
        ));
    }

    #[test]
    fn debug_builds_fall_back_to_an_ephemeral_secret() {
        let secret = empty().jwt_secret();

        if cfg!(debug_assertions) {
            assert_eq!(secret.expect("ephemeral").len(), EPHEMERAL_SECRET_LEN);
        } else {
            assert_eq!(secret, Err(SettingsError::MissingJwtSecret));
        }
    }
}
