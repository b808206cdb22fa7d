//! Call outcomes and error aggregation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Classification of a server-reported application exception
///
/// The numeric codes are the protocol's fixed exception-kind enumeration;
/// anything outside it is passed through verbatim as [`ErrorKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unclassified failure (code 0)
    Unknown,
    /// The method is not known to the server (code 1)
    UnknownMethod,
    /// The message type was not a valid call (code 2)
    InvalidMessageType,
    /// The reply named a different method (code 3)
    WrongMethodName,
    /// The reply carried an unexpected sequence id (code 4)
    BadSequenceId,
    /// The reply carried no result (code 5)
    MissingResult,
    /// The server failed internally (code 6)
    InternalError,
    /// The server could not decode the message (code 7)
    ProtocolError,
    /// An unrecognized numeric code, passed through verbatim
    Other(i32),
}

impl ErrorKind {
    /// Classify a raw exception-kind code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ErrorKind::Unknown,
            1 => ErrorKind::UnknownMethod,
            2 => ErrorKind::InvalidMessageType,
            3 => ErrorKind::WrongMethodName,
            4 => ErrorKind::BadSequenceId,
            5 => ErrorKind::MissingResult,
            6 => ErrorKind::InternalError,
            7 => ErrorKind::ProtocolError,
            other => ErrorKind::Other(other),
        }
    }

    /// The numeric code this kind classifies.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::Unknown => 0,
            ErrorKind::UnknownMethod => 1,
            ErrorKind::InvalidMessageType => 2,
            ErrorKind::WrongMethodName => 3,
            ErrorKind::BadSequenceId => 4,
            ErrorKind::MissingResult => 5,
            ErrorKind::InternalError => 6,
            ErrorKind::ProtocolError => 7,
            ErrorKind::Other(code) => *code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unknown => f.write_str("ExceptionUnknown"),
            ErrorKind::UnknownMethod => f.write_str("ExceptionUnknownMethod"),
            ErrorKind::InvalidMessageType => f.write_str("ExceptionInvalidMessageType"),
            ErrorKind::WrongMethodName => f.write_str("ExceptionWrongMethodName"),
            ErrorKind::BadSequenceId => f.write_str("ExceptionBadSequenceID"),
            ErrorKind::MissingResult => f.write_str("ExceptionMissingResult"),
            ErrorKind::InternalError => f.write_str("ExceptionInternalError"),
            ErrorKind::ProtocolError => f.write_str("ExceptionProtocolError"),
            ErrorKind::Other(code) => write!(f, "{code}"),
        }
    }
}

/// Result of replaying one request
///
/// Exactly one outcome is published per consumed work unit that reaches a
/// replay call; transport failures are not outcomes, they end the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call completed normally
    Success {
        /// Elapsed write+read time in microseconds
        elapsed_micros: u64,
    },
    /// The server replied with an application exception
    Failure {
        /// Exception classification
        kind: ErrorKind,
    },
}

/// Occurrence counts per exception kind
///
/// Owned exclusively by the error collector while the run is live; sealed
/// (immutable) once the error channel closes.
#[derive(Debug, Clone, Default)]
pub struct ErrorHistogram {
    counts: HashMap<ErrorKind, usize>,
}

impl ErrorHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of a kind.
    pub fn record(&mut self, kind: ErrorKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    /// Occurrences of one kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total occurrences across all kinds.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Whether any error was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over observed kinds and their counts, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }

    /// Observed kinds and counts, ordered by exception code for stable output.
    pub fn sorted(&self) -> Vec<(ErrorKind, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(kind, _)| kind.code());
        entries
    }
}
