//! 上游 rating 查询

use reqwest::Url;

use crate::config::{Config, ConfigError};
use crate::platform::Platform;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream transport error: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatingClient {
    http: reqwest::Client,
    dmoj_base: Url,
    codeforces_base: Url,
}

impl RatingClient {
    pub fn new(http: reqwest::Client, dmoj_base: Url, codeforces_base: Url) -> Self {
        Self {
            http,
            dmoj_base,
            codeforces_base,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.upstream_timeout())
            .build()?;
        Ok(Self::new(
            http,
            config.dmoj_base_url()?,
            config.codeforces_base_url()?,
        ))
    }

    fn base_url(&self, platform: Platform) -> &Url {
        match platform {
            Platform::Dmoj => &self.dmoj_base,
            Platform::Codeforces => &self.codeforces_base,
        }
    }

    /// 查询用户 rating
    ///
    /// 只有网络层失败（连接、TLS、超时、读取响应体）才返回错误；
    /// 上游返回的内容无法解析时视为未评级，返回 `Ok(None)`。
    /// 上游的 HTTP 状态码不做判断，Codeforces 对不存在的用户返回 400 加 JSON。
    pub async fn fetch_rating(
        &self,
        platform: Platform,
        username: &str,
    ) -> Result<Option<u32>, FetchError> {
        let url = platform.rating_url(self.base_url(platform), username);
        tracing::debug!(%platform, %url, "fetching rating");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let rating = platform.extract_rating(&body);
        tracing::debug!(%platform, username, %status, ?rating, "upstream responded");
        Ok(rating)
    }
}
