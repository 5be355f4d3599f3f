//! Prediction records — the (text, label, owner, timestamp) tuples the
//! pipeline persists.
//!
//! A record is immutable once written: the store exposes no update or delete
//! path. Display ordering is newest-first by `created_at`, with records whose
//! timestamp has not resolved yet sorting as oldest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The verdict the heuristic labeler produces for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    FakeNews,
    NotFakeNews,
}

impl Label {
    /// Stable machine-readable form, used for storage columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::FakeNews => "fake_news",
            Label::NotFakeNews => "not_fake_news",
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Label::FakeNews)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::FakeNews => write!(f, "Fake News"),
            Label::NotFakeNews => write!(f, "Not Fake News"),
        }
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fake_news" => Ok(Label::FakeNews),
            "not_fake_news" => Ok(Label::NotFakeNews),
            other => Err(format!("unknown label: {other}")),
        }
    }
}

/// Identity of a submitting session. Records are namespaced per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque record identifier, assigned by the store on append.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted labeling outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Store-assigned identifier. Empty until the store acks the append.
    pub id: RecordId,

    /// The submitted content, non-empty after trimming.
    pub text: String,

    /// The labeler's verdict.
    pub label: Label,

    /// Identity of the submitting session.
    pub owner: OwnerId,

    /// Store-assigned timestamp. `None` between write and server ack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PredictionRecord {
    /// Build a record ready to append. The store fills `id` and `created_at`.
    pub fn new(owner: OwnerId, text: impl Into<String>, label: Label) -> Self {
        Self {
            id: RecordId(String::new()),
            text: text.into(),
            label,
            owner,
            created_at: None,
        }
    }
}

/// A full snapshot of one owner's records.
pub type RecordSet = Vec<PredictionRecord>;

/// Sort records newest-first. Records with an unresolved timestamp sort
/// last (as oldest); `Option`'s `None < Some(_)` ordering gives that for
/// free under a descending sort.
pub fn sort_newest_first(records: &mut RecordSet) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
