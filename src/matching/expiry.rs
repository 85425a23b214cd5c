use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::error::DateComputationError;

/// Issue date is the expiry date minus four 365-day years. Leap days are not
/// accounted for.
pub const ISSUE_OFFSET_DAYS: u64 = 4 * 365;

pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d-%b-%y %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

/// Parse an expiry cell as exported by HCS. Month names are case-insensitive.
pub fn parse_expiry(raw: &str) -> Result<NaiveDate, DateComputationError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DateComputationError::Missing);
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Ok(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Ok(dt.date());
    }
    // Offset-aware timestamps keep their local calendar date.
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local().date())
        .map_err(|_| DateComputationError::Unparseable(s.to_string()))
}

pub fn issue_date_for(expiry: NaiveDate) -> Result<NaiveDate, DateComputationError> {
    expiry
        .checked_sub_days(Days::new(ISSUE_OFFSET_DAYS))
        .ok_or_else(|| {
            DateComputationError::OutOfRange(expiry.format(OUTPUT_DATE_FORMAT).to_string())
        })
}

/// `(issue, expiry)` both formatted `YYYY-MM-DD`.
pub fn issuance_dates(raw_expiry: Option<&str>) -> Result<(String, String), DateComputationError> {
    let expiry = parse_expiry(raw_expiry.ok_or(DateComputationError::Missing)?)?;
    let issue = issue_date_for(expiry)?;
    Ok((
        issue.format(OUTPUT_DATE_FORMAT).to_string(),
        expiry.format(OUTPUT_DATE_FORMAT).to_string(),
    ))
}
