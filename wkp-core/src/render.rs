// Rendering rules shared by the terminal console and the one-shot commands

use chrono::{DateTime, NaiveDateTime};
use wkp_client::CompanyResult;

pub const EMPTY_STATE_TITLE: &str = "No results found";
pub const EMPTY_STATE_HINT: &str = "Try different keywords or check back later";

/// One line of a rendered result card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardLine {
    Title(String),
    Domain(String),
    Badges { confidence: String, pages: String },
    ContactHeading,
    EmailHeading,
    Email { address: String, href: String },
    PhoneHeading,
    Phone(String),
}

/// Confidence fraction as a whole percentage, rounded half away from zero.
pub fn confidence_percent(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

pub fn company_count(count: usize) -> String {
    if count == 1 {
        "1 company".to_string()
    } else {
        format!("{} companies", count)
    }
}

pub fn results_heading(count: usize) -> String {
    format!("Found {}", company_count(count))
}

pub fn pages_badge(url_count: u64) -> String {
    format!("{} pages", url_count)
}

pub fn mailto(address: &str) -> String {
    format!("mailto:{}", address)
}

/// Lays out a result card. The contact block only appears when the result
/// carries contacts, and each sub-block only when its list is non-empty.
pub fn card_lines(result: &CompanyResult) -> Vec<CardLine> {
    let mut lines = vec![
        CardLine::Title(result.company_name.clone()),
        CardLine::Domain(result.domain.clone()),
        CardLine::Badges {
            confidence: confidence_percent(result.confidence),
            pages: pages_badge(result.url_count),
        },
    ];

    let Some(ref contacts) = result.contacts else {
        return lines;
    };

    lines.push(CardLine::ContactHeading);

    if !contacts.emails().is_empty() {
        lines.push(CardLine::EmailHeading);
        for email in contacts.emails() {
            lines.push(CardLine::Email {
                address: email.clone(),
                href: mailto(email),
            });
        }
    }

    if !contacts.phones().is_empty() {
        lines.push(CardLine::PhoneHeading);
        for phone in contacts.phones() {
            lines.push(CardLine::Phone(phone.clone()));
        }
    }

    lines
}

/// Formats the backend's `last_updated` stamp for display.
///
/// The backend sends naive ISO-8601 (optionally with fractional seconds);
/// RFC 3339 with an offset is accepted too. Anything else is shown as-is.
pub fn format_backend_timestamp(raw: &str) -> String {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return with_offset.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_rounds_half_away_from_zero() {
        assert_eq!(confidence_percent(0.125), "13%");
        assert_eq!(confidence_percent(0.0), "0%");
        assert_eq!(confidence_percent(1.0), "100%");
    }

    #[test]
    fn test_format_backend_timestamp() {
        assert_eq!(
            format_backend_timestamp("2024-05-01T10:00:00.123456"),
            "2024-05-01 10:00:00"
        );
        assert_eq!(
            format_backend_timestamp("2024-05-01T10:00:00+05:30"),
            "2024-05-01 10:00:00"
        );
        assert_eq!(format_backend_timestamp("yesterday"), "yesterday");
    }
}
