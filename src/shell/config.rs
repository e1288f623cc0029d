use thiserror::Error;

pub const DEFAULT_PROJECT_NAME: &str = "Healthcare Enterprise Platform";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REALTIME_PATH: &str = "/socket.io";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),

    #[error("invalid boolean for {key}: {value}")]
    InvalidBool { key: &'static str, value: String },

    #[error("REALTIME_PATH must be an absolute path below '/': {0}")]
    InvalidRealtimePath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_name: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub realtime_path: String,
    pub cors_allow_credentials: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            realtime_path: DEFAULT_REALTIME_PATH.to_string(),
            cors_allow_credentials: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let realtime_path = get("REALTIME_PATH").unwrap_or(defaults.realtime_path);
        if !realtime_path.starts_with('/') || realtime_path.trim_end_matches('/').is_empty() {
            return Err(ConfigError::InvalidRealtimePath(realtime_path));
        }

        let cors_allow_credentials = match get("CORS_ALLOW_CREDENTIALS") {
            Some(raw) => parse_bool("CORS_ALLOW_CREDENTIALS", raw)?,
            None => defaults.cors_allow_credentials,
        };

        Ok(Self {
            project_name: get("PROJECT_NAME").unwrap_or(defaults.project_name),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL"),
            realtime_path,
            cors_allow_credentials,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value: raw }),
    }
}
