//! Failure taxonomy shared by every stage of the poll loop.
use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Protocol,
    Schema,
    Domain,
    Delivery,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),
    #[error("failed to prepare the review API request: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to the review API failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("review API responded with status {0}")]
    UnexpectedStatus(u16),
    #[error("review API returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("{0} is not a JSON object")]
    NotAnObject(&'static str),
    #[error("key \"{key}\" is missing from {container}")]
    MissingKey {
        key: &'static str,
        container: &'static str,
    },
    #[error("value of \"{key}\" is not {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
    #[error("unknown review status \"{status}\" for homework {homework}")]
    UnknownStatus { homework: String, status: String },
    #[error("failed to send message: {0}")]
    Send(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingEnv(_) | Error::Client(_) => ErrorKind::Configuration,
            Error::Transport(_) => ErrorKind::Transport,
            Error::UnexpectedStatus(_) | Error::InvalidJson(_) => ErrorKind::Protocol,
            Error::NotAnObject(_) | Error::MissingKey { .. } | Error::WrongType { .. } => {
                ErrorKind::Schema
            }
            Error::UnknownStatus { .. } => ErrorKind::Domain,
            Error::Send(_) => ErrorKind::Delivery,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
