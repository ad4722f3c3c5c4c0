//! Validation of review API payloads and rendering of status messages.
use serde_json::Value;

use crate::error::{Error, Result};

/// Review verdicts the API is known to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "approved" => Some(Verdict::Approved),
            "reviewing" => Some(Verdict::Reviewing),
            "rejected" => Some(Verdict::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Reviewing => "reviewing",
            Verdict::Rejected => "rejected",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Verdict::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            Verdict::Reviewing => "The work has been taken for review by the reviewer.",
            Verdict::Rejected => "The work has been reviewed: the reviewer has some remarks.",
        }
    }
}

/// Check the shape of an API payload and return its homeworks together with
/// the server's `current_date`, which becomes the next cursor.
///
/// Checks run in a fixed order and stop at the first violation. The cursor is
/// a signed unix timestamp, so an integer above `i64::MAX` is a wrong type.
pub fn check_response(payload: &Value) -> Result<(Vec<Value>, i64)> {
    let object = payload
        .as_object()
        .ok_or(Error::NotAnObject("API response"))?;

    let homeworks = object.get("homeworks").ok_or(Error::MissingKey {
        key: "homeworks",
        container: "API response",
    })?;
    let homeworks = homeworks.as_array().ok_or(Error::WrongType {
        key: "homeworks",
        expected: "a list",
    })?;

    let current_date = object.get("current_date").ok_or(Error::MissingKey {
        key: "current_date",
        container: "API response",
    })?;
    let current_date = current_date.as_i64().ok_or(Error::WrongType {
        key: "current_date",
        expected: "an integer",
    })?;

    Ok((homeworks.clone(), current_date))
}

/// Render the notification text for one homework record.
pub fn parse_status(homework: &Value) -> Result<String> {
    let record = homework.as_object().ok_or(Error::NotAnObject("homework"))?;

    let name = record.get("homework_name").ok_or(Error::MissingKey {
        key: "homework_name",
        container: "homework",
    })?;
    let status = record.get("status").ok_or(Error::MissingKey {
        key: "status",
        container: "homework",
    })?;

    let name = display(name);
    let verdict = status
        .as_str()
        .and_then(Verdict::from_status)
        .ok_or_else(|| Error::UnknownStatus {
            homework: name.clone(),
            status: display(status),
        })?;

    Ok(format!(
        "Review status changed for \"{}\". {}",
        name,
        verdict.text()
    ))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
