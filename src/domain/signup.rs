use chrono::DateTime;
use chrono::FixedOffset;
use serde::Serialize;

/// One info session sign-up, as submitted from operationspark.org.
///
/// Built by `decoder::decode` and never mutated afterwards; every downstream
/// step (Greenlight, Slack, welcome email) only borrows it. Missing strings are
/// empty, a missing session time is `None`.
///
/// Serializes with the same camelCase names it is decoded from, which is also
/// the shape Greenlight expects.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRecord {
    pub program_id: String,
    pub name_first: String,
    pub name_last: String,
    pub email: String,
    pub cell: String,
    pub referrer: String,
    pub referrer_response: String,
    /// Offset is kept as submitted, so the welcome email shows the session in
    /// the timezone the website offered it in
    pub start_date_time: Option<DateTime<FixedOffset>>,
    pub cohort: String,
    pub session_id: String,
    pub token: String,
}

/// Values interpolated into the welcome email
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct WelcomeValues {
    pub display_name: String,
    /// e.g. "Monday, March 14"
    pub session_date: Option<String>,
    /// e.g. "6:00 PM"
    pub session_time: Option<String>,
}

impl SignupRecord {
    /// Plain-text summary for the #signups Slack channel:
    ///
    /// ```text
    /// Henri Testaroni has signed up for Info Session
    /// Ph: 555-123-4567
    /// email: henri@email.com
    /// ```
    pub fn summary(&self) -> String {
        [
            format!(
                "{} {} has signed up for {}",
                self.name_first, self.name_last, self.cohort
            ),
            format!("Ph: {}", self.cell),
            format!("email: {}", self.email),
        ]
        .join("\n")
    }

    pub fn welcome_values(&self) -> WelcomeValues {
        WelcomeValues {
            display_name: self.name_first.clone(),
            session_date: self
                .start_date_time
                .map(|t| t.format("%A, %B %-d").to_string()),
            session_time: self
                .start_date_time
                .map(|t| t.format("%-I:%M %p").to_string()),
        }
    }
}
