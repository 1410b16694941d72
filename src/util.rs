use std::time::SystemTime;

use reqwest::header::{DATE, HeaderMap};
use scraper::ElementRef;

/// Concatenates the trimmed text nodes under `element`.
#[inline]
#[must_use]
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// First non-blank text node under `element`, for cells that stack extra
/// detail (penalty time, country) after the value.
#[must_use]
pub fn first_text<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element.text().map(str::trim).find(|s| !s.is_empty())
}

/// Leading rank number of a cell such as `"12"`, `"#12"` or `"12."`.
#[must_use]
pub fn parse_rank(s: &str) -> Option<u32> {
    let s = s.trim().trim_start_matches('#');
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

/// First number in a score cell: `"57"`, `"1,234.5 pts"`, `"-3"`.
#[must_use]
pub fn parse_score(s: &str) -> Option<f64> {
    let s = s.replace(',', "");
    let start = s.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let rest = &s[start..];
    let end = rest
        .char_indices()
        .skip(1)
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.'))
        .map_or(rest.len(), |(i, _)| i);
    rest[..end].parse().ok()
}

pub fn server_date(headers: &HeaderMap) -> Option<SystemTime> {
    headers
        .get(DATE)
        .and_then(|s| s.to_str().ok())
        .and_then(|s| httpdate::parse_http_date(s).ok())
}
