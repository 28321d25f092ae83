use std::env;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a valid boolean: {value:?}")]
    InvalidBool { name: &'static str, value: String },
    #[error("{name} is not a valid URL: {value:?}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub dmoj_api_base: String,
    pub codeforces_api_base: String,
    pub upstream_timeout_secs: u64,
    pub trust_proxy_headers: bool,
    pub client_rate_limit_requests: u32,
    pub client_rate_limit_window_secs: u64,
    pub dmoj_global_rate_limit_requests: u32,
    pub dmoj_global_rate_limit_window_secs: u64,
    pub codeforces_global_rate_limit_requests: u32,
    pub codeforces_global_rate_limit_window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 80,
            dmoj_api_base: "https://dmoj.ca".into(),
            codeforces_api_base: "https://codeforces.com".into(),
            upstream_timeout_secs: 10,
            trust_proxy_headers: false,
            client_rate_limit_requests: 10,
            client_rate_limit_window_secs: 60,
            dmoj_global_rate_limit_requests: 90,
            dmoj_global_rate_limit_window_secs: 60,
            codeforces_global_rate_limit_requests: 5,
            codeforces_global_rate_limit_window_secs: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: number("SERVER_PORT", defaults.server_port)?,
            dmoj_api_base: env::var("DMOJ_API_BASE").unwrap_or(defaults.dmoj_api_base),
            codeforces_api_base: env::var("CODEFORCES_API_BASE")
                .unwrap_or(defaults.codeforces_api_base),
            upstream_timeout_secs: number("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            trust_proxy_headers: boolean("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
            client_rate_limit_requests: number(
                "CLIENT_RATE_LIMIT_REQUESTS",
                defaults.client_rate_limit_requests,
            )?,
            client_rate_limit_window_secs: number(
                "CLIENT_RATE_LIMIT_WINDOW",
                defaults.client_rate_limit_window_secs,
            )?,
            dmoj_global_rate_limit_requests: number(
                "DMOJ_GLOBAL_RATE_LIMIT_REQUESTS",
                defaults.dmoj_global_rate_limit_requests,
            )?,
            dmoj_global_rate_limit_window_secs: number(
                "DMOJ_GLOBAL_RATE_LIMIT_WINDOW",
                defaults.dmoj_global_rate_limit_window_secs,
            )?,
            codeforces_global_rate_limit_requests: number(
                "CODEFORCES_GLOBAL_RATE_LIMIT_REQUESTS",
                defaults.codeforces_global_rate_limit_requests,
            )?,
            codeforces_global_rate_limit_window_secs: number(
                "CODEFORCES_GLOBAL_RATE_LIMIT_WINDOW",
                defaults.codeforces_global_rate_limit_window_secs,
            )?,
        };

        // 启动时校验上游地址
        config.dmoj_base_url()?;
        config.codeforces_base_url()?;
        Ok(config)
    }

    pub fn dmoj_base_url(&self) -> Result<Url, ConfigError> {
        parse_url("DMOJ_API_BASE", &self.dmoj_api_base)
    }

    pub fn codeforces_base_url(&self) -> Result<Url, ConfigError> {
        parse_url("CODEFORCES_API_BASE", &self.codeforces_api_base)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn client_rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.client_rate_limit_window_secs)
    }

    pub fn dmoj_global_rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.dmoj_global_rate_limit_window_secs)
    }

    pub fn codeforces_global_rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.codeforces_global_rate_limit_window_secs)
    }
}

fn number<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}

fn boolean(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool { name, value }),
        },
        Err(_) => Ok(default),
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}
