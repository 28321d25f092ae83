use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use config::Config;
use middleware::{Clock, RateLimitPolicy, RateLimiter, SystemClock, log_errors, rate_limit};
use upstream::RatingClient;

pub mod badge;
pub mod config;
pub mod error;
pub mod middleware;
pub mod platform;
pub mod routes;
pub mod upstream;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ratings: RatingClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, config::ConfigError> {
        let ratings = RatingClient::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            ratings,
        })
    }
}

/// 每组路由各自的限流器
#[derive(Clone)]
pub struct RouteLimiters {
    pub dmoj: Arc<RateLimiter>,
    pub codeforces: Arc<RateLimiter>,
}

impl RouteLimiters {
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let per_client = RateLimitPolicy::per_client(
            config.client_rate_limit_requests,
            config.client_rate_limit_window(),
        );

        let dmoj = RateLimiter::with_clock(
            "dmoj",
            vec![
                per_client,
                RateLimitPolicy::global(
                    config.dmoj_global_rate_limit_requests,
                    config.dmoj_global_rate_limit_window(),
                ),
            ],
            clock.clone(),
        )
        .trust_proxy_headers(config.trust_proxy_headers);

        let codeforces = RateLimiter::with_clock(
            "codeforces",
            vec![
                per_client,
                RateLimitPolicy::global(
                    config.codeforces_global_rate_limit_requests,
                    config.codeforces_global_rate_limit_window(),
                ),
            ],
            clock,
        )
        .trust_proxy_headers(config.trust_proxy_headers);

        Self {
            dmoj: Arc::new(dmoj),
            codeforces: Arc::new(codeforces),
        }
    }

    pub fn purge_expired(&self) {
        self.dmoj.purge_expired();
        self.codeforces.purge_expired();
    }

    /// 后台定期清理过期计数器
    pub fn spawn_purge_task(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiters = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                limiters.purge_expired();
            }
        })
    }
}

pub fn build_router(state: AppState, limiters: &RouteLimiters) -> Router {
    // 限流挂在路由上，超限请求不会触发上游查询
    let dmoj_routes = Router::new()
        .route("/dmoj/{username}", get(routes::badge::dmoj_badge))
        .route_layer(axum::middleware::from_fn_with_state(
            limiters.dmoj.clone(),
            rate_limit,
        ));

    let codeforces_routes = Router::new()
        .route("/codeforces/{username}", get(routes::badge::codeforces_badge))
        .route_layer(axum::middleware::from_fn_with_state(
            limiters.codeforces.clone(),
            rate_limit,
        ));

    Router::new()
        .merge(dmoj_routes)
        .merge(codeforces_routes)
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
