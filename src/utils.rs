// src/utils.rs
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use std::path::Path;

/// Normalize a free-text name for case-insensitive comparison
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split a delimited certification list ("AWS SA; CKA, PMP") into entries
pub fn parse_certification_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|text| {
        text.split([',', ';', '|', '\n'])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Clamp to [0, 100] and round to two decimals
pub fn round_percentage(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// Count Monday-to-Friday days between two dates, both inclusive
pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

pub async fn read_file_safe(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Rust   Programming "), "rust programming");
        assert_eq!(normalize_name("PMP"), "pmp");
    }

    #[test]
    fn test_parse_certification_list() {
        assert_eq!(
            parse_certification_list(Some("AWS SA; CKA, PMP|  \n ITIL ")),
            vec!["AWS SA", "CKA", "PMP", "ITIL"]
        );
        assert!(parse_certification_list(Some(" ; , ")).is_empty());
        assert!(parse_certification_list(None).is_empty());
    }

    #[test]
    fn test_round_percentage() {
        assert_eq!(round_percentage(66.666_666), 66.67);
        assert_eq!(round_percentage(140.0), 100.0);
        assert_eq!(round_percentage(-3.0), 0.0);
        assert_eq!(round_percentage(f64::NAN), 0.0);
    }

    #[test]
    fn test_weekdays_between() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let friday = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        let next_monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(weekdays_between(monday, friday), 5);
        assert_eq!(weekdays_between(monday, next_monday), 6);
        assert_eq!(weekdays_between(friday, monday), 0);
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("persons.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("persons.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("persons.xlsx", &["csv"]).is_err());
        assert!(validate_file_extension("noext", &["csv"]).is_err());
    }
}
