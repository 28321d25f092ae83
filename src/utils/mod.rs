use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::badge::{self, BadgeOptions};
use crate::platform::{Platform, TierColor};

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

pub mod status_text {
    pub const UNRATED: &str = "unrated";
    pub const UNAVAILABLE: &str = "unavailable";
}

/// 用平台的文案和图标渲染徽章
pub fn render_platform_badge(platform: Platform, status: &str, color: TierColor) -> String {
    badge::render(&BadgeOptions {
        label: platform.label(),
        status,
        color: color.token(),
        icon: Some(platform.icon_data_uri()),
        icon_width: platform.icon_width(),
    })
}

pub fn svg_response(status: StatusCode, svg: String) -> Response {
    (status, [(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], svg).into_response()
}
