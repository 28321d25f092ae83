use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

const GLOBAL_KEY: &str = "*";

pub const REJECTION_MESSAGE: &str = "Too many requests, please try again later.";

/// 时间来源，测试时可以手动推进
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动推进的时钟
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    /// 按客户端地址分别计数
    PerClient,
    /// 所有客户端共用一个计数器
    Global,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
    pub scope: LimitScope,
}

impl RateLimitPolicy {
    pub fn per_client(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            scope: LimitScope::PerClient,
        }
    }

    pub fn global(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            scope: LimitScope::Global,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// 一组路由共用的限流器，按顺序检查多条策略，全部通过才放行
pub struct RateLimiter {
    name: &'static str,
    policies: Vec<RateLimitPolicy>,
    counters: DashMap<(usize, String), Window>,
    clock: Arc<dyn Clock>,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    #[cfg(test)]
    pub(crate) fn new(name: &'static str, policies: Vec<RateLimitPolicy>) -> Self {
        Self::with_clock(name, policies, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: &'static str,
        policies: Vec<RateLimitPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name,
            policies,
            counters: DashMap::new(),
            clock,
            trust_proxy_headers: false,
        }
    }

    /// 按 `X-Real-IP` / `X-Forwarded-For` 识别客户端，只在反向代理后面开启
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 记录一次请求并判断是否放行
    ///
    /// 每条被检查到的策略都会计数；第一条超限的策略直接拒绝，后面的策略不再计数。
    pub fn check(&self, client_key: &str) -> Decision {
        let now = self.clock.now();

        for (index, policy) in self.policies.iter().enumerate() {
            let key = match policy.scope {
                LimitScope::PerClient => client_key,
                LimitScope::Global => GLOBAL_KEY,
            };

            let mut entry = self
                .counters
                .entry((index, key.to_string()))
                .or_insert(Window {
                    count: 0,
                    started_at: now,
                });
            let window = entry.value_mut();

            let elapsed = now.saturating_duration_since(window.started_at);
            if elapsed >= policy.window {
                // 窗口过期，重新计数
                window.count = 0;
                window.started_at = now;
            }

            window.count += 1;
            if window.count > policy.max_requests {
                let retry_after = policy
                    .window
                    .saturating_sub(now.saturating_duration_since(window.started_at));
                return Decision::Limited { retry_after };
            }
        }

        Decision::Allowed
    }

    /// 清理已过期的计数器
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.counters.retain(|(index, _), window| {
            self.policies
                .get(*index)
                .is_some_and(|policy| now.saturating_duration_since(window.started_at) < policy.window)
        });
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.counters.len()
    }

    fn client_key(&self, req: &Request<Body>) -> String {
        // 从连接信息获取原始IP
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());

        let forwarded = if self.trust_proxy_headers {
            req.headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .or_else(|| {
                    req.headers()
                        .get("x-forwarded-for")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
                })
        } else {
            None
        };

        forwarded
            .or(remote_ip.as_deref())
            .unwrap_or("unknown")
            .trim()
            .to_string()
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = limiter.client_key(&req);

    match limiter.check(&client) {
        Decision::Allowed => next.run(req).await,
        Decision::Limited { retry_after } => {
            tracing::warn!(
                limiter = limiter.name(),
                client = %client,
                path = %req.uri().path(),
                "rate limit exceeded"
            );
            too_many_requests(retry_after)
        }
    }
}

fn too_many_requests(retry_after: Duration) -> Response {
    // 向上取整到秒，至少 1 秒
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    let mut response = (StatusCode::TOO_MANY_REQUESTS, REJECTION_MESSAGE).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
    response
}
