#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};

/// Database used when none is configured
pub const DEFAULT_DATABASE: &str = "notifications";

/// MongoDB connection settings
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,
    pub database: String,
    /// Reported to the server for its logs
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Assemble a connection string from individual parts.
    ///
    /// Credentials are percent-encoded and authenticate against `admin`.
    pub fn from_parts(
        host: &str,
        port: u16,
        database: impl Into<String>,
        credentials: Option<(&str, &str)>,
    ) -> Self {
        let url = match credentials {
            Some((user, password)) => format!(
                "mongodb://{}:{}@{}:{}/?authSource=admin",
                urlencoding::encode(user),
                urlencoding::encode(password),
                host,
                port
            ),
            None => format!("mongodb://{}:{}", host, port),
        };
        Self::new(url, database)
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Connection string with any password masked, for logs
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let userinfo = &self.url[scheme_end + 3..at];
                let user = userinfo.split(':').next().unwrap_or_default();
                format!("{}{}:***{}", &self.url[..scheme_end + 3], user, &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            app_name: None,
            max_pool_size: 50,
            min_pool_size: 2,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Environment variables:
/// - `MONGODB_URI` (or `MONGODB_URL`): full connection string; takes precedence
/// - otherwise `MONGODB_HOST` (localhost), `MONGODB_PORT` (27017), and the optional pair
///   `MONGODB_USER` / `MONGODB_PASSWORD`
/// - `MONGODB_NAME`: database name, default [`DEFAULT_DATABASE`]
/// - `MONGODB_APP_NAME`, `MONGODB_MAX_POOL_SIZE`, `MONGODB_MIN_POOL_SIZE`,
///   `MONGODB_CONNECT_TIMEOUT_SECS`, `MONGODB_SERVER_SELECTION_TIMEOUT_SECS`
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let database = env_or_default("MONGODB_NAME", DEFAULT_DATABASE);

        let mut config = match env_optional("MONGODB_URI").or_else(|| env_optional("MONGODB_URL"))
        {
            Some(url) => Self::new(url, database),
            None => {
                let host = env_or_default("MONGODB_HOST", "localhost");
                let port = env_parse_or("MONGODB_PORT", 27017u16)?;
                let user = env_optional("MONGODB_USER");
                let password = env_optional("MONGODB_PASSWORD");
                let credentials = match (&user, &password) {
                    (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
                    (Some(_), None) => return Err(ConfigError::MissingEnvVar("MONGODB_PASSWORD".into())),
                    _ => None,
                };
                Self::from_parts(&host, port, database, credentials)
            }
        };

        config.app_name = env_optional("MONGODB_APP_NAME");
        config.max_pool_size = env_parse_or("MONGODB_MAX_POOL_SIZE", config.max_pool_size)?;
        config.min_pool_size = env_parse_or("MONGODB_MIN_POOL_SIZE", config.min_pool_size)?;
        config.connect_timeout_secs =
            env_parse_or("MONGODB_CONNECT_TIMEOUT_SECS", config.connect_timeout_secs)?;
        config.server_selection_timeout_secs = env_parse_or(
            "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
            config.server_selection_timeout_secs,
        )?;

        Ok(config)
    }
}
