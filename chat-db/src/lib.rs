use chat_msg::Channel;
use chat_ref::{AuthorId, RefError};
use log::info;
use std::{io, path::PathBuf};
use thiserror::Error as ThisError;

pub mod logs;
pub mod stats;

pub use logs::{discover_log_paths, load_channels, read_channel, LoadedChannels};
pub use stats::*;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Failed to open file {}, cause: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to walk log directory, cause: {0}")]
    WalkDir(#[from] walkdir::Error),
    #[error("Json error, cause: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Mentions out of sync: {sender} sent {sent} to {recipient}, who received {received}")]
    MentionDuality {
        sender: AuthorId,
        recipient: AuthorId,
        sent: u64,
        received: u64,
    },
    #[error("Mention from {sender} points at {recipient}, who has no aggregate")]
    UnknownMentionTarget {
        sender: AuthorId,
        recipient: AuthorId,
    },
}

/// Why a single message was left out of the aggregates.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum IngestError {
    #[error("Message has no id")]
    MissingId,
    #[error("Message has no author")]
    MissingAuthor,
    #[error("Message has no timestamp")]
    MissingTimestamp,
    #[error("Failed to parse message timestamp, cause: {0}")]
    BadTimestamp(#[source] RefError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IngestIssue {
    pub channel: String,
    pub message_id: Option<String>,
    pub error: IngestError,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestReport {
    pub channels: usize,
    pub messages_recorded: u64,
    pub messages_skipped: u64,
    pub issues: Vec<IngestIssue>,
}

impl IngestReport {
    pub fn merge(mut self, other: IngestReport) -> IngestReport {
        self.channels += other.channels;
        self.messages_recorded += other.messages_recorded;
        self.messages_skipped += other.messages_skipped;
        self.issues.extend(other.issues);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Authors with fewer messages are pruned at finalize.
    pub min_messages: u64,
    /// Floor for the average word count ranking.
    pub min_messages_for_average: u64,
    pub decimal_precision: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            min_messages: 10,
            min_messages_for_average: 10,
            decimal_precision: 2,
        }
    }
}

pub struct Analysis {
    pub snapshot: Snapshot,
    pub report: IngestReport,
}

/// Ingests every channel in parallel, then finalizes into a snapshot.
pub fn analyze(channels: &[Channel], config: AnalysisConfig) -> Analysis {
    let store = AuthorStore::new(config);
    let report = store.process_channels(channels);

    info!(
        "ingested {} channels: {} messages recorded, {} skipped, {} authors seen",
        report.channels,
        report.messages_recorded,
        report.messages_skipped,
        store.len()
    );

    let snapshot = store.into_snapshot();
    Analysis { snapshot, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyze_applies_config_floor() {
        let messages: Vec<_> = (0..3)
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "timestamp": "2021-06-01T12:00:00+00:00",
                    "content": "hi",
                    "author": { "id": "A", "name": "a" },
                })
            })
            .collect();
        let channel: Channel = serde_json::from_value(json!({ "messages": messages })).unwrap();
        let channels = vec![channel];

        let strict = analyze(&channels, AnalysisConfig::default());
        assert!(strict.snapshot.is_empty());
        assert_eq!(strict.report.messages_recorded, 3);

        let lenient = analyze(
            &channels,
            AnalysisConfig {
                min_messages: 3,
                ..AnalysisConfig::default()
            },
        );
        assert_eq!(lenient.snapshot.len(), 1);
    }

    #[test]
    fn test_report_merge() {
        let a = IngestReport {
            channels: 1,
            messages_recorded: 4,
            messages_skipped: 1,
            issues: vec![IngestIssue {
                channel: "x".into(),
                message_id: Some("1".into()),
                error: IngestError::MissingAuthor,
            }],
        };
        let merged = a.clone().merge(IngestReport::default()).merge(a);
        assert_eq!(merged.channels, 2);
        assert_eq!(merged.messages_recorded, 8);
        assert_eq!(merged.issues.len(), 2);
    }
}
