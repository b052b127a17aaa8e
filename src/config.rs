use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server address (e.g., "0.0.0.0:30500")
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Department tree settings
    #[serde(default)]
    pub organization: OrganizationConfig,
    /// Upstream user/admin services
    #[serde(default)]
    pub services: ServicesConfig,
    /// Admin API protection
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Full connection URL; overrides the individual fields when set
    #[serde(default)]
    pub url: Option<String>,
    /// Database type (postgres)
    #[serde(default = "default_db_type", rename = "type")]
    pub db_type: String,
    /// Database host
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Database port
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database name
    #[serde(default = "default_db_name", rename = "database")]
    pub name: String,
    /// Database user
    #[serde(default = "default_db_user", rename = "username")]
    pub user: String,
    /// Database password
    #[serde(default)]
    pub password: String,
    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganizationConfig {
    /// Display name of the reserved ungrouped department
    #[serde(default = "default_ungrouped_name")]
    pub ungrouped_name: String,
    /// Order given to departments created without one
    #[serde(default = "default_department_order")]
    pub default_department_order: i32,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            ungrouped_name: default_ungrouped_name(),
            default_department_order: default_department_order(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServicesConfig {
    /// Base URL of the user-profile service
    #[serde(default = "default_user_api_url")]
    pub user_api_url: String,
    /// Base URL of the user-admin service
    #[serde(default = "default_admin_api_url")]
    pub admin_api_url: String,
    /// Secret exchanged for an admin token
    #[serde(default)]
    pub admin_secret: String,
    /// Timeout for outbound calls, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            user_api_url: default_user_api_url(),
            admin_api_url: default_admin_api_url(),
            admin_secret: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Bearer token required on mutating routes (empty disables the check)
    #[serde(default)]
    pub admin_token: String,
}

// Default value functions
fn default_addr() -> String {
    "0.0.0.0:30500".to_string()
}

fn default_db_type() -> String {
    "postgres".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "orgdir".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    100
}

fn default_ungrouped_name() -> String {
    "Ungrouped".to_string()
}

fn default_department_order() -> i32 {
    100
}

fn default_user_api_url() -> String {
    "http://127.0.0.1:30200".to_string()
}

fn default_admin_api_url() -> String {
    "http://127.0.0.1:30300".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            log: LogConfig::default(),
            database: DatabaseConfig::default(),
            organization: OrganizationConfig::default(),
            services: ServicesConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            db_type: default_db_type(),
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            user: default_db_user(),
            password: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// Generate database connection URL
    pub fn connection_url(&self) -> String {
        if let Some(url) = self.url.as_ref().filter(|u| !u.is_empty()) {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.organization.ungrouped_name.is_empty() {
            anyhow::bail!("organization.ungrouped_name must not be empty");
        }
        Ok(config)
    }
}
