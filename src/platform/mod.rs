//! 支持的评测平台：徽章文案、图标、段位表和上游接口格式

pub mod codeforces;
pub mod dmoj;
mod tier;

use std::fmt;
use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Url;

pub use tier::TierColor;

static DMOJ_ICON: LazyLock<String> = LazyLock::new(|| data_uri(dmoj::logo()));
static CODEFORCES_ICON: LazyLock<String> = LazyLock::new(|| data_uri(codeforces::logo()));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Dmoj,
    Codeforces,
}

impl Platform {
    pub fn label(self) -> &'static str {
        match self {
            Platform::Dmoj => dmoj::LABEL,
            Platform::Codeforces => codeforces::LABEL,
        }
    }

    /// `data:image/svg+xml;base64,...` 形式的图标
    pub fn icon_data_uri(self) -> &'static str {
        match self {
            Platform::Dmoj => DMOJ_ICON.as_str(),
            Platform::Codeforces => CODEFORCES_ICON.as_str(),
        }
    }

    /// `None` 表示使用渲染器默认宽度
    pub fn icon_width(self) -> Option<u32> {
        match self {
            Platform::Dmoj => None,
            Platform::Codeforces => Some(codeforces::ICON_WIDTH),
        }
    }

    pub fn tier_color(self, rating: Option<u32>) -> TierColor {
        match self {
            Platform::Dmoj => dmoj::tier_color(rating),
            Platform::Codeforces => codeforces::tier_color(rating),
        }
    }

    /// 从上游响应体中取出 rating，任何格式问题都视为未评级
    pub fn extract_rating(self, body: &str) -> Option<u32> {
        match self {
            Platform::Dmoj => dmoj::extract_rating(body),
            Platform::Codeforces => codeforces::extract_rating(body),
        }
    }

    /// 拼接上游查询地址，用户名按路径段或查询参数转义
    pub fn rating_url(self, base: &Url, username: &str) -> Url {
        let mut url = base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match self {
                Platform::Dmoj => {
                    segments.extend(["api", "v2", "user", username]);
                }
                Platform::Codeforces => {
                    segments.extend(["api", "user.info"]);
                }
            }
        }
        if self == Platform::Codeforces {
            url.query_pairs_mut().append_pair("handles", username);
        }
        url
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn data_uri(svg: &[u8]) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
