use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::platform::{Platform, TierColor};
use crate::upstream::FetchError;
use crate::utils::{render_platform_badge, status_text, svg_response};

#[derive(Debug)]
pub enum AppError {
    UpstreamUnavailable(Platform),
    UpstreamTimeout(Platform),
}

impl AppError {
    pub fn from_fetch(platform: Platform, err: &FetchError) -> Self {
        match err {
            FetchError::Timeout => AppError::UpstreamTimeout(platform),
            FetchError::Transport(_) => AppError::UpstreamUnavailable(platform),
        }
    }
}

// 上游失败时仍然返回一个灰色徽章，避免页面上出现裂图
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, platform) = match self {
            AppError::UpstreamUnavailable(platform) => (StatusCode::BAD_GATEWAY, platform),
            AppError::UpstreamTimeout(platform) => (StatusCode::GATEWAY_TIMEOUT, platform),
        };

        let svg = render_platform_badge(platform, status_text::UNAVAILABLE, TierColor::Grey);
        svg_response(status, svg)
    }
}
