use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    platform::Platform,
    utils::{render_platform_badge, status_text, svg_response},
};

// DMOJ 徽章
pub async fn dmoj_badge(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    platform_badge(&state, Platform::Dmoj, &username).await
}

// Codeforces 徽章
pub async fn codeforces_badge(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    platform_badge(&state, Platform::Codeforces, &username).await
}

async fn platform_badge(
    state: &AppState,
    platform: Platform,
    username: &str,
) -> Result<Response, AppError> {
    let rating = match state.ratings.fetch_rating(platform, username).await {
        Ok(rating) => rating,
        Err(err) => {
            tracing::error!("获取 {} rating 失败 ({}): {}", platform, username, err);
            return Err(AppError::from_fetch(platform, &err));
        }
    };

    let color = platform.tier_color(rating);
    // rating 为 0 的账号同样显示未评级
    let status = match rating {
        Some(rating) if rating > 0 => rating.to_string(),
        _ => status_text::UNRATED.to_string(),
    };
    tracing::debug!(%platform, username, %status, %color, "rendering badge");

    Ok(svg_response(
        StatusCode::OK,
        render_platform_badge(platform, &status, color),
    ))
}
