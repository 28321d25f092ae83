use serde::Deserialize;

use super::tier::{self, TierColor};

pub const LABEL: &str = "DMOJ";

const LOGO: &[u8] = include_bytes!("../../assets/dmoj.svg");

const TIERS: &[(u32, TierColor)] = &[
    (1000, TierColor::Grey),
    (1200, TierColor::Green),
    (1500, TierColor::Blue),
    (1800, TierColor::Purple),
    (2200, TierColor::Yellow),
    (3000, TierColor::Red),
];

// GET /api/v2/user/{username} -> {"data": {"object": {"rating": 1550}}}
#[derive(Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Deserialize)]
struct UserData {
    object: UserObject,
}

#[derive(Deserialize)]
struct UserObject {
    rating: Option<u32>,
}

pub fn logo() -> &'static [u8] {
    LOGO
}

pub fn tier_color(rating: Option<u32>) -> TierColor {
    tier::classify(TIERS, TierColor::Black, rating)
}

pub fn extract_rating(body: &str) -> Option<u32> {
    serde_json::from_str::<UserResponse>(body)
        .ok()
        .and_then(|resp| resp.data.object.rating)
}
