//! Markup helpers shared by the HTML scraping providers.

use crate::{Result, SubsError};
use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Selector};
use url::Url;

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SubsError::Parse(e.to_string()))
}

/// Trimmed text content with whitespace collapsed
pub fn text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First run of digits, ignoring thousands separators
pub fn parse_count(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ' ' || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();

    digits.parse().ok()
}

/// Decimal number written with either `.` or `,`
pub fn parse_decimal(text: &str) -> Option<f32> {
    text.trim().replace(',', ".").parse().ok()
}

/// Dates written as `dd.mm.yyyy`
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Resolve `href` against the page it appeared on
pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href.trim()).ok().map(String::from)
}

/// Value of a query parameter in `url`
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1 234"), Some(1234));
        assert_eq!(parse_count(" 57 "), Some(57));
        assert_eq!(parse_count("Изтегляния: 89"), Some(89));
        assert_eq!(parse_count("няма"), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("23,976"), Some(23.976));
        assert_eq!(parse_decimal("25"), Some(25.0));
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("05.11.2010").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2010, 11, 5));
        assert!(parse_date("2010-11-05").is_none());
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://yavka.net/", "/subs/1/BG/").as_deref(),
            Some("https://yavka.net/subs/1/BG/")
        );
        assert_eq!(
            absolute_url("https://yavka.net/", "https://other.net/x").as_deref(),
            Some("https://other.net/x")
        );
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            query_param("http://subs.sab.bz/index.php?act=download&attach_id=42", "attach_id")
                .as_deref(),
            Some("42")
        );
        assert_eq!(query_param("http://subs.sab.bz/", "attach_id"), None);
    }
}
