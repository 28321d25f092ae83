use std::fmt;

/// 段位颜色
///
/// `Crimson` 是 Codeforces 2600-3000 段的自定义红色，和 `Red` 区分开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierColor {
    Grey,
    Green,
    Cyan,
    Blue,
    Purple,
    Yellow,
    Orange,
    Red,
    Crimson,
    Black,
}

impl TierColor {
    /// 传给徽章渲染器的颜色标记
    pub fn token(self) -> &'static str {
        match self {
            TierColor::Grey => "grey",
            TierColor::Green => "green",
            TierColor::Cyan => "cyan",
            TierColor::Blue => "blue",
            TierColor::Purple => "purple",
            TierColor::Yellow => "yellow",
            TierColor::Orange => "orange",
            TierColor::Red => "red",
            TierColor::Crimson => "A31C0F",
            TierColor::Black => "black",
        }
    }
}

impl fmt::Display for TierColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// 按升序阈值表查找颜色，阈值为上界（不含）
pub(crate) fn classify(table: &[(u32, TierColor)], top: TierColor, rating: Option<u32>) -> TierColor {
    let Some(rating) = rating else {
        return table.first().map_or(top, |(_, color)| *color);
    };
    table
        .iter()
        .find(|(bound, _)| rating < *bound)
        .map_or(top, |(_, color)| *color)
}
