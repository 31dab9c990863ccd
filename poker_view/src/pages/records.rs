use chrono::{DateTime, Utc};
use std::{collections::VecDeque, fmt};

/// Records beyond this are dropped oldest first.
pub const MAX_LOG_RECORDS: usize = 1024;

/// How many records a page shows under its own content.
pub const VISIBLE_RECORDS: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    /// Informational text pushed by the server.
    Server,
    /// Local notices such as help text.
    Alert,
    Error,
    /// Table events like a new hand or a showdown.
    Game,
    /// Echo of what the user asked for.
    You,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Server => "SERVER",
            Self::Alert => "ALERT",
            Self::Error => "ERROR",
            Self::Game => "GAME",
            Self::You => "YOU",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug)]
pub struct Record {
    pub datetime: DateTime<Utc>,
    pub kind: RecordKind,
    pub content: String,
}

impl Record {
    pub fn new(kind: RecordKind, content: String) -> Self {
        Self {
            datetime: Utc::now(),
            kind,
            content,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {:6}]: {}",
            self.datetime.format("%H:%M:%S"),
            self.kind.to_string(),
            self.content
        )
    }
}

/// The bounded message area every page renders.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    records: VecDeque<Record>,
}

impl MessageLog {
    pub fn push(&mut self, kind: RecordKind, content: impl Into<String>) {
        if self.records.len() == MAX_LOG_RECORDS {
            self.records.pop_front();
        }
        self.records.push_back(Record::new(kind, content.into()));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.back()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// The most recent `count` records, oldest first.
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &Record> {
        self.records.iter().skip(self.records.len().saturating_sub(count))
    }

    pub fn contains(&self, kind: RecordKind, needle: &str) -> bool {
        self.records
            .iter()
            .any(|record| record.kind == kind && record.content.contains(needle))
    }
}
