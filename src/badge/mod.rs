//! 扁平风格 SVG 徽章，版式和 badgen 一致

use std::fmt::Write;

const DEFAULT_ICON_WIDTH: u32 = 13;

#[derive(Debug, Clone)]
pub struct BadgeOptions<'a> {
    pub label: &'a str,
    pub status: &'a str,
    /// 预设颜色名或不带 `#` 的十六进制颜色
    pub color: &'a str,
    pub icon: Option<&'a str>,
    pub icon_width: Option<u32>,
}

pub fn render(opts: &BadgeOptions<'_>) -> String {
    let label = escape_xml(opts.label);
    let status = escape_xml(opts.status);
    let color = resolve_color(opts.color);

    // 以下长度单位均为 0.1px，viewBox 放大十倍
    let icon_width = opts.icon_width.unwrap_or(DEFAULT_ICON_WIDTH) * 10;
    let icon_span_width = match opts.icon {
        Some(_) if opts.label.is_empty() => icon_width.saturating_sub(18),
        Some(_) => icon_width + 30,
        None => 0,
    };
    let label_text_start = icon_span_width + 50;
    let label_text_width = text_width(opts.label);
    let status_text_width = text_width(opts.status);
    let label_rect_width = label_text_width + 100 + icon_span_width;
    let status_rect_width = status_text_width + 100;
    let width = label_rect_width + status_rect_width;

    let accessible = if opts.label.is_empty() {
        status.clone()
    } else {
        format!("{}: {}", label, status)
    };

    let mut svg = String::with_capacity(1024 + opts.icon.map_or(0, str::len));
    let _ = write!(
        svg,
        r#"<svg width="{w}" height="20" viewBox="0 0 {width} 200" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" role="img" aria-label="{accessible}">"#,
        w = tenths(width),
    );
    let _ = write!(svg, "<title>{}</title>", accessible);
    svg.push_str(
        r##"<linearGradient id="a" x2="0" y2="100%"><stop offset="0" stop-opacity=".1" stop-color="#EEE"/><stop offset="1" stop-opacity=".1"/></linearGradient>"##,
    );
    let _ = write!(
        svg,
        r##"<mask id="m"><rect width="{width}" height="200" rx="30" fill="#FFF"/></mask>"##
    );
    let _ = write!(
        svg,
        r##"<g mask="url(#m)"><rect width="{label_rect_width}" height="200" fill="#555"/><rect width="{status_rect_width}" height="200" fill="#{color}" x="{label_rect_width}"/><rect width="{width}" height="200" fill="url(#a)"/></g>"##
    );
    svg.push_str(
        r##"<g aria-hidden="true" fill="#fff" text-anchor="start" font-family="Verdana,DejaVu Sans,sans-serif" font-size="110">"##,
    );
    if !opts.label.is_empty() {
        let _ = write!(
            svg,
            r##"<text x="{}" y="148" textLength="{label_text_width}" fill="#000" opacity="0.25">{label}</text><text x="{label_text_start}" y="138" textLength="{label_text_width}">{label}</text>"##,
            label_text_start + 10,
        );
    }
    let _ = write!(
        svg,
        r##"<text x="{}" y="148" textLength="{status_text_width}" fill="#000" opacity="0.25">{status}</text><text x="{}" y="138" textLength="{status_text_width}">{status}</text></g>"##,
        label_rect_width + 55,
        label_rect_width + 45,
    );
    if let Some(icon) = opts.icon {
        let _ = write!(
            svg,
            r#"<image x="40" y="35" width="{icon_width}" height="132" xlink:href="{}"/>"#,
            escape_xml(icon)
        );
    }
    svg.push_str("</svg>");
    svg
}

/// badgen 的预设调色板，未命中时按十六进制原样使用
fn resolve_color(color: &str) -> &str {
    match color {
        "green" => "3C1",
        "blue" => "08C",
        "red" => "E43",
        "yellow" => "DB1",
        "orange" => "F73",
        "purple" => "94E",
        "pink" => "E5B",
        "grey" | "gray" => "999",
        "cyan" => "1BC",
        "black" => "2A2A2A",
        other => other.trim_start_matches('#'),
    }
}

fn tenths(value: u32) -> String {
    if value % 10 == 0 {
        (value / 10).to_string()
    } else {
        format!("{}.{}", value / 10, value % 10)
    }
}

/// Verdana 11px 下的文字宽度估算
fn text_width(text: &str) -> u32 {
    text.chars().map(char_width).sum()
}

fn char_width(c: char) -> u32 {
    match c {
        ' ' => 39,
        '0'..='9' => 70,
        'f' | 'I' | 'i' | 'j' | 'l' | 't' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 36,
        'r' => 47,
        'c' | 's' | 'z' => 57,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'k' | 'n' | 'o' | 'p' | 'q' | 'u' | 'v' | 'x'
        | 'y' => 67,
        'm' => 107,
        'w' => 90,
        'J' => 50,
        'F' | 'L' => 63,
        'P' | 'T' | 'Y' => 67,
        'M' => 93,
        'W' => 109,
        'D' | 'G' | 'H' | 'N' | 'O' | 'Q' | 'U' => 84,
        'A'..='Z' => 76,
        '-' | '(' | ')' | '[' | ']' => 45,
        _ => 70,
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
