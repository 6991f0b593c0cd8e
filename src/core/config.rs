use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
    pub links: LinkConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// S3-compatible object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket whose objects are shared
    pub bucket: String,
    /// Region name (for S3 compatibility)
    pub region: String,
    /// Use path-style URLs (http://endpoint/bucket) instead of virtual-host style
    pub path_style: bool,
    /// Restrict the catalog to keys under this prefix
    pub list_prefix: Option<String>,
}

/// Signed link issuance and registry configuration
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Validity used when a generate request omits `expiration`
    pub default_expiration_minutes: i64,
    /// Upper bound on requested validity
    pub max_expiration_minutes: i64,
    /// When set, link digests are HMAC-SHA256 keyed with this secret
    pub digest_key: Option<String>,
    /// Maximum grant records retained by the in-memory registry
    pub registry_capacity: usize,
    /// Interval of the background purge worker; `None` disables it
    pub purge_interval: Option<Duration>,
    /// How far the backend clock may lag ours; added to recorded expiries
    pub clock_skew_tolerance: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            links: LinkConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 64 * 1024; // 64KB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    /// Returns `None` when `DATABASE_URL` is unset; the registry then stays in memory.
    pub fn from_env() -> Result<Option<Self>, String> {
        let url = match env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => return Ok(None),
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Some(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        }))
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Signed Link Manager API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Issue and audit time-limited signed URLs for bucket objects".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key =
            env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key =
            env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("STORAGE_BUCKET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "STORAGE_BUCKET environment variable is required".to_string())?;

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let path_style = env::var("STORAGE_PATH_STYLE")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "STORAGE_PATH_STYLE must be true or false".to_string())?;

        let list_prefix = env::var("STORAGE_LIST_PREFIX")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            path_style,
            list_prefix,
        })
    }
}

impl LinkConfig {
    const DEFAULT_EXPIRATION_MINUTES: i64 = 15;
    /// SigV4 presigned URLs cannot outlive 7 days
    pub const PRESIGN_CEILING_MINUTES: i64 = 7 * 24 * 60;
    const DEFAULT_REGISTRY_CAPACITY: usize = 100_000;
    const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60;
    const DEFAULT_CLOCK_SKEW_TOLERANCE_SECS: u64 = 30;
    const MAX_CLOCK_SKEW_TOLERANCE_SECS: u64 = 900;

    pub fn from_env() -> Result<Self, String> {
        let default_expiration_minutes = env::var("LINK_DEFAULT_EXPIRATION_MINUTES")
            .unwrap_or_else(|_| Self::DEFAULT_EXPIRATION_MINUTES.to_string())
            .parse::<i64>()
            .map_err(|_| "LINK_DEFAULT_EXPIRATION_MINUTES must be a valid number".to_string())?;

        let max_expiration_minutes = env::var("LINK_MAX_EXPIRATION_MINUTES")
            .unwrap_or_else(|_| Self::PRESIGN_CEILING_MINUTES.to_string())
            .parse::<i64>()
            .map_err(|_| "LINK_MAX_EXPIRATION_MINUTES must be a valid number".to_string())?;

        let digest_key = env::var("LINK_DIGEST_KEY").ok().filter(|s| !s.is_empty());

        let registry_capacity = env::var("LINK_REGISTRY_CAPACITY")
            .unwrap_or_else(|_| Self::DEFAULT_REGISTRY_CAPACITY.to_string())
            .parse::<usize>()
            .map_err(|_| "LINK_REGISTRY_CAPACITY must be a valid number".to_string())?;

        let purge_interval_secs = env::var("LINK_PURGE_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PURGE_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "LINK_PURGE_INTERVAL_SECS must be a valid number".to_string())?;

        let clock_skew_tolerance_secs = env::var("LINK_CLOCK_SKEW_TOLERANCE_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_CLOCK_SKEW_TOLERANCE_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "LINK_CLOCK_SKEW_TOLERANCE_SECS must be a valid number".to_string())?;

        let config = Self {
            default_expiration_minutes,
            max_expiration_minutes,
            digest_key,
            registry_capacity,
            purge_interval: (purge_interval_secs > 0)
                .then(|| Duration::from_secs(purge_interval_secs)),
            clock_skew_tolerance: Duration::from_secs(clock_skew_tolerance_secs),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_expiration_minutes < 1
            || self.max_expiration_minutes > Self::PRESIGN_CEILING_MINUTES
        {
            return Err(format!(
                "LINK_MAX_EXPIRATION_MINUTES must be between 1 and {}",
                Self::PRESIGN_CEILING_MINUTES
            ));
        }

        if self.default_expiration_minutes < 1
            || self.default_expiration_minutes > self.max_expiration_minutes
        {
            return Err(format!(
                "LINK_DEFAULT_EXPIRATION_MINUTES must be between 1 and {}",
                self.max_expiration_minutes
            ));
        }

        if self.registry_capacity == 0 {
            return Err("LINK_REGISTRY_CAPACITY must be greater than zero".to_string());
        }

        if self.clock_skew_tolerance.as_secs() > Self::MAX_CLOCK_SKEW_TOLERANCE_SECS {
            return Err(format!(
                "LINK_CLOCK_SKEW_TOLERANCE_SECS must be at most {}",
                Self::MAX_CLOCK_SKEW_TOLERANCE_SECS
            ));
        }

        Ok(())
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_expiration_minutes: Self::DEFAULT_EXPIRATION_MINUTES,
            max_expiration_minutes: Self::PRESIGN_CEILING_MINUTES,
            digest_key: None,
            registry_capacity: Self::DEFAULT_REGISTRY_CAPACITY,
            purge_interval: Some(Duration::from_secs(Self::DEFAULT_PURGE_INTERVAL_SECS)),
            clock_skew_tolerance: Duration::from_secs(Self::DEFAULT_CLOCK_SKEW_TOLERANCE_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_link_config_is_valid() {
        assert!(LinkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_link_config_rejects_max_beyond_presign_ceiling() {
        let config = LinkConfig {
            max_expiration_minutes: LinkConfig::PRESIGN_CEILING_MINUTES + 1,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_link_config_rejects_default_above_max() {
        let config = LinkConfig {
            default_expiration_minutes: 120,
            max_expiration_minutes: 60,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_link_config_bounds_clock_skew_tolerance() {
        assert_eq!(
            LinkConfig::default().clock_skew_tolerance,
            Duration::from_secs(30)
        );

        let config = LinkConfig {
            clock_skew_tolerance: Duration::from_secs(901),
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LinkConfig {
            clock_skew_tolerance: Duration::ZERO,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_link_config_rejects_zero_capacity() {
        let config = LinkConfig {
            registry_capacity: 0,
            ..LinkConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
