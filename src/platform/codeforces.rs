use serde::Deserialize;

use super::tier::{self, TierColor};

pub const LABEL: &str = "Codeforces";

pub const ICON_WIDTH: u32 = 15;

const LOGO: &[u8] = include_bytes!("../../assets/codeforces.svg");

const TIERS: &[(u32, TierColor)] = &[
    (1200, TierColor::Grey),
    (1400, TierColor::Green),
    (1600, TierColor::Cyan),
    (1900, TierColor::Blue),
    (2100, TierColor::Purple),
    (2300, TierColor::Yellow),
    (2400, TierColor::Orange),
    (2600, TierColor::Red),
    (3000, TierColor::Crimson),
];

// GET /api/user.info?handles={username} -> {"status": "OK", "result": [{"rating": 2450}]}
#[derive(Deserialize)]
struct UserInfoResponse {
    result: Vec<UserInfo>,
}

#[derive(Deserialize)]
struct UserInfo {
    rating: Option<u32>,
}

pub fn logo() -> &'static [u8] {
    LOGO
}

pub fn tier_color(rating: Option<u32>) -> TierColor {
    tier::classify(TIERS, TierColor::Black, rating)
}

pub fn extract_rating(body: &str) -> Option<u32> {
    serde_json::from_str::<UserInfoResponse>(body)
        .ok()
        .and_then(|resp| resp.result.into_iter().next())
        .and_then(|user| user.rating)
}
