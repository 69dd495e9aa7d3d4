// ── Whitelist plate types ──
//
// Plates follow the regional format `NN L{1,3} N{1,4}`: a two-digit
// region code, one to three letters, then one to four digits. Input is
// normalized (whitespace removed, uppercased) before matching.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A normalized, format-checked plate number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlateNumber(String);

impl PlateNumber {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(CoreError::InvalidPlate {
                input: raw.to_owned(),
                reason: "plate number is empty".into(),
            });
        }
        if !PLATE_RE.is_match(&normalized) {
            return Err(CoreError::InvalidPlate {
                input: raw.to_owned(),
                reason: "expected two digits, 1-3 letters, 1-4 digits (e.g. 34ABC1234)".into(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlateNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlateNumber> for String {
    fn from(value: PlateNumber) -> Self {
        value.0
    }
}

static PLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{1,3}[0-9]{1,4}$").expect("plate pattern compiles")
});

/// Strip all whitespace and uppercase.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Backend-assigned record key. Integer and UUID keys both render to
/// the path segment the backend expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlateId(String);

impl PlateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A whitelisted plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateRecord {
    pub id: PlateId,
    /// Stored as the backend returned it; legacy rows may predate validation.
    pub plate_number: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Answer to "would this plate open the gate?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateCheck {
    pub plate_number: String,
    pub authorized: bool,
    pub message: Option<String>,
}
