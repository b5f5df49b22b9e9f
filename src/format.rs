// Display formatting for feed fields
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};
use std::collections::HashSet;

/// Localized weekday names, Monday first.
const WEEKDAYS: [&str; 7] = ["週一", "週二", "週三", "週四", "週五", "週六", "週日"];

/// Display timezone. Taipei has no daylight saving, so a fixed offset is
/// exact.
pub fn taipei_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// Format an RFC 2822 publish date as a localized date string, e.g.
/// `2025年1月1日 週三`. Unparseable input is returned unchanged; empty
/// input stays empty.
pub fn format_date(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let trimmed = value.trim();
    let parsed = DateTime::parse_from_rfc2822(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Offset-less dates are taken as UTC.
            NaiveDateTime::parse_from_str(trimmed, "%a, %d %b %Y %H:%M:%S").map(|dt| dt.and_utc())
        });
    let Ok(utc) = parsed else {
        return value.to_string();
    };

    let local = utc.with_timezone(&taipei_offset());
    let weekday = WEEKDAYS[local.weekday().num_days_from_monday() as usize];
    format!(
        "{}年{}月{}日 {}",
        local.year(),
        local.month(),
        local.day(),
        weekday
    )
}

/// Format a duration given either as a bare second count or as a
/// colon-separated `H:M:S` / `M:S` / `S` string. Non-numeric components
/// count as zero. The seconds segment appears only for sub-minute
/// durations.
pub fn format_duration(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return String::new();
    }

    let total_seconds = if raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse::<u64>().unwrap_or(0)
    } else {
        let parts: Vec<u64> = raw
            .split(':')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect();
        match parts.as_slice() {
            [h, m, s] => h * 3600 + m * 60 + s,
            [m, s] => m * 60 + s,
            [s] => *s,
            _ => 0,
        }
    };

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut segments: Vec<String> = Vec::new();
    if hours > 0 {
        segments.push(format!("{hours} 小時"));
    }
    if minutes > 0 {
        segments.push(format!("{minutes} 分"));
    }
    if hours == 0 && minutes == 0 && seconds > 0 {
        segments.push(format!("{seconds} 秒"));
    }
    segments.join(" ")
}

/// Split a comma-separated keyword field (ASCII or full-width commas) into
/// trimmed, deduplicated keywords in first-seen order.
pub fn parse_keywords(value: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keywords: Vec<String> = Vec::new();
    for raw in value.split(|c| c == ',' || c == '，') {
        let keyword = raw.trim();
        if keyword.is_empty() || seen.contains(keyword) {
            continue;
        }
        seen.insert(keyword.to_string());
        keywords.push(keyword.to_string());
    }
    keywords
}

/// Normalize an episode identifier for joining against the store metadata.
pub fn normalize_guid(value: &str) -> String {
    value.trim().to_lowercase()
}
