//! Control API request and response bodies.
//!
//! | Endpoint | Request | Response |
//! |---|---|---|
//! | `POST /api/start` | [`StartGiveaway`] | [`SuccessResponse`] |
//! | `POST /api/stop` | – | [`SuccessResponse`] |
//! | `POST /api/reroll` | – | [`RerollResponse`] |
//! | `POST /api/clear` | – | [`SuccessResponse`] |
//! | `GET /api/status` | – | [`StatusResponse`] |

use serde::{Deserialize, Serialize};

/// Body of `POST /api/start`. Every field is optional; missing or unusable
/// values fall back to server defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartGiveaway {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(
        default,
        rename = "maxSpam",
        alias = "max_spam",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_spam: Option<MaxSpam>,
}

impl StartGiveaway {
    /// The spam threshold as an integer, if one can be read from the input.
    ///
    /// The value is not range-checked here.
    pub fn max_spam_value(&self) -> Option<i64> {
        self.max_spam.as_ref().and_then(MaxSpam::as_integer)
    }
}

/// Spam threshold as sent by clients: panels post either a JSON number or
/// the raw text of an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxSpam {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl MaxSpam {
    /// Integer value following leading-integer parsing rules: surrounding
    /// whitespace and an optional sign are accepted, parsing stops at the
    /// first non-digit (`"5abc"` is 5) and fractions are truncated.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MaxSpam::Number(n) if n.is_finite() => Some(n.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64),
            MaxSpam::Number(_) => None,
            MaxSpam::Text(s) => parse_leading_integer(s),
            MaxSpam::Other(_) => None,
        }
    }
}

fn parse_leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// `{"success": true}` acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: SuccessResponse = SuccessResponse { success: true };
}

/// Result of `POST /api/reroll`; `winner` is `null` when nobody entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerollResponse {
    pub winner: Option<String>,
}

/// Snapshot returned by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub giveaway_active: bool,
    pub participants_count: usize,
    pub keyword: String,
    pub max_spam: u32,
}
