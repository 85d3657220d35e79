use std::collections::HashSet;
use std::fmt::Debug;

use anyhow::Context;
use chrono::DateTime;
use chrono::FixedOffset;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Map;
use serde_json::Value;

use crate::domain::SignupRecord;
use crate::utils::error_chain_fmt;

pub const JSON: &str = "application/json";
pub const FORM: &str = "application/x-www-form-urlencoded";

const START_DATE_TIME: &str = "startDateTime";

/// A single field that was present but could not be parsed. Only
/// `startDateTime` can currently produce one.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid value for field: '{field}'")]
pub struct ValidationError {
    pub field: &'static str,
}

#[derive(thiserror::Error)]
pub enum DecodeError {
    /// Carries the offending header value (if any) for logging only
    #[error("Unacceptable Content-Type")]
    UnsupportedMediaType(Option<String>),
    #[error(transparent)]
    InvalidField(#[from] ValidationError),
    // serde_json errors are descriptive enough to be shown as-is
    #[error("{0}")]
    MalformedJson(#[source] serde_json::Error),
    #[error("Error reading Form Body")]
    MalformedForm(#[source] anyhow::Error),
}

impl Debug for DecodeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)?;
        Ok(())
    }
}

/// Wire shape shared by both encodings. Incoming keys are first folded onto
/// the names in `WIRE_NAMES`, so the renames here only ever see exact matches.
///
/// `startDateTime` is kept as a raw string so that each encoding can decide how
/// a bad timestamp is reported.
#[derive(Deserialize, Default)]
#[serde(default)]
struct SignupPayload {
    #[serde(rename = "programId", deserialize_with = "null_as_empty")]
    program_id: String,
    #[serde(rename = "nameFirst", deserialize_with = "null_as_empty")]
    name_first: String,
    #[serde(rename = "nameLast", deserialize_with = "null_as_empty")]
    name_last: String,
    #[serde(rename = "email", deserialize_with = "null_as_empty")]
    email: String,
    #[serde(rename = "cell", deserialize_with = "null_as_empty")]
    cell: String,
    #[serde(rename = "referrer", deserialize_with = "null_as_empty")]
    referrer: String,
    #[serde(rename = "referrerResponse", deserialize_with = "null_as_empty")]
    referrer_response: String,
    #[serde(rename = "startDateTime")]
    start_date_time: Option<String>,
    #[serde(rename = "cohort", deserialize_with = "null_as_empty")]
    cohort: String,
    #[serde(rename = "sessionId", deserialize_with = "null_as_empty")]
    session_id: String,
    #[serde(rename = "token", deserialize_with = "null_as_empty")]
    token: String,
}

/// Every key `SignupPayload` reads; must list each `rename` above
const WIRE_NAMES: [&str; 11] = [
    "programId",
    "nameFirst",
    "nameLast",
    "email",
    "cell",
    "referrer",
    "referrerResponse",
    START_DATE_TIME,
    "cohort",
    "sessionId",
    "token",
];

fn wire_name(key: &str) -> Option<&'static str> {
    WIRE_NAMES
        .iter()
        .find(|name| name.eq_ignore_ascii_case(key))
        .copied()
}

/// Map incoming keys onto their wire names, ignoring ASCII case, and drop keys
/// no field reads.
///
/// When a key repeats, the later value wins, except that an exact spelling is
/// never replaced by a differently-cased one.
fn fold_keys<I>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut folded = Map::new();
    let mut exact = HashSet::new();
    for (key, value) in pairs {
        let Some(name) = wire_name(&key) else {
            continue;
        };
        if key == name {
            exact.insert(name);
        } else if exact.contains(name) {
            continue;
        }
        folded.insert(name.to_owned(), value);
    }
    folded
}

/// `%` must start a two-digit hex escape. The form decoder would otherwise pass
/// a broken escape through as literal text.
fn check_percent_escapes(body: &[u8]) -> Result<(), anyhow::Error> {
    for (i, _) in body.iter().enumerate().filter(|(_, b)| **b == b'%') {
        match body.get(i + 1..i + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {}
            _ => anyhow::bail!("invalid URL escape at byte {i}"),
        }
    }
    Ok(())
}

/// A JSON `null` leaves a string field empty instead of failing the whole
/// request
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SignupPayload {
    fn into_record(
        self,
        start_date_time: Option<DateTime<FixedOffset>>,
    ) -> SignupRecord {
        SignupRecord {
            program_id: self.program_id,
            name_first: self.name_first,
            name_last: self.name_last,
            email: self.email,
            cell: self.cell,
            referrer: self.referrer,
            referrer_response: self.referrer_response,
            start_date_time,
            cohort: self.cohort,
            session_id: self.session_id,
            token: self.token,
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
}

/// Parse a request body into a `SignupRecord`, choosing the decoder by
/// `content_type`.
///
/// The content type must match exactly; parameters such as `; charset=utf-8`
/// are not accepted. Nothing is decoded for an unsupported (or missing)
/// content type.
///
/// The two encodings report a bad `startDateTime` differently: JSON produces a
/// `ValidationError` naming the field, form data produces a generic
/// `MalformedForm`.
pub fn decode(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<SignupRecord, DecodeError> {
    match content_type {
        Some(JSON) => decode_json(body),
        Some(FORM) => decode_form(body),
        other => Err(DecodeError::UnsupportedMediaType(other.map(str::to_owned))),
    }
}

/// Absent and `null` timestamps are fine; any string that is not RFC 3339
/// (including `""`) is a `ValidationError`.
fn decode_json(body: &[u8]) -> Result<SignupRecord, DecodeError> {
    let object: Map<String, Value> = serde_json::from_slice(body).map_err(DecodeError::MalformedJson)?;
    let payload: SignupPayload =
        serde_json::from_value(Value::Object(fold_keys(object))).map_err(DecodeError::MalformedJson)?;

    let start_date_time = payload
        .start_date_time
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .map_err(|_| ValidationError {
            field: START_DATE_TIME,
        })?;

    Ok(payload.into_record(start_date_time))
}

/// Every form value is a string, so after folding the pairs go through the
/// same `SignupPayload` as JSON does.
///
/// Empty form inputs are submitted as `key=`, so an empty `startDateTime` is
/// treated as absent here.
fn decode_form(body: &[u8]) -> Result<SignupRecord, DecodeError> {
    check_percent_escapes(body).map_err(DecodeError::MalformedForm)?;

    // pairs rather than a struct, so that a repeated key is not an error
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(|e| DecodeError::MalformedForm(e.into()))?;
    let folded = fold_keys(pairs.into_iter().map(|(k, v)| (k, Value::String(v))));
    let payload: SignupPayload = serde_json::from_value(Value::Object(folded))
        .context("form fields do not fit a sign-up")
        .map_err(DecodeError::MalformedForm)?;

    let start_date_time = payload
        .start_date_time
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            parse_timestamp(raw).with_context(|| format!("could not parse {START_DATE_TIME}: {raw:?}"))
        })
        .transpose()
        .map_err(DecodeError::MalformedForm)?;

    Ok(payload.into_record(start_date_time))
}
