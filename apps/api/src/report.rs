//! Report Exporter: renders a ranking as CSV.
//!
//! Header `Rank,Name,Email,Similarity`, one row per candidate, 1-based rank,
//! `N/A` for a missing name or email, `\n` line endings. Fields holding a comma,
//! quote or line break are quoted with doubled inner quotes. Scores are written at
//! full precision and always carry a decimal point (`0.0`, `65.5`).

use std::borrow::Cow;

use thiserror::Error;

use crate::models::candidate::RankedCandidate;

pub const CSV_HEADER: &str = "Rank,Name,Email,Similarity";
pub const EXPORT_FILENAME: &str = "ranked_resumes.csv";
const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("No data available for download")]
    NoData,
}

pub fn export_csv(ranked: &[RankedCandidate]) -> Result<String, ReportError> {
    if ranked.is_empty() {
        return Err(ReportError::NoData);
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + ranked.len() * 64);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for (index, candidate) in ranked.iter().enumerate() {
        let name = candidate.name.as_deref().unwrap_or(PLACEHOLDER);
        let email = candidate.email.as_deref().unwrap_or(PLACEHOLDER);
        out.push_str(&format!(
            "{},{},{},{:?}\n",
            index + 1,
            escape_field(name),
            escape_field(email),
            candidate.score
        ));
    }

    Ok(out)
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
