use chat_msg::{Channel, Message};
use chat_ref::AuthorId;
use dashmap::DashMap;
use log::{debug, info, trace, warn};
use rayon::prelude::*;

use crate::stats::{
    aggregate::AuthorAggregate,
    identity::{resolve_author, resolve_mention, ObservedAt},
    snapshot::Snapshot,
};
use crate::{AnalysisConfig, Error, IngestError, IngestIssue, IngestReport};

/// Sharded id -> aggregate map shared by every ingestion worker.
///
/// Each update holds only the shard lock of the entry it touches, so workers on
/// different authors never wait on each other.
pub struct AuthorStore {
    authors: DashMap<AuthorId, AuthorAggregate>,
    config: AnalysisConfig,
}

impl AuthorStore {
    pub fn new(config: AnalysisConfig) -> Self {
        AuthorStore {
            authors: DashMap::new(),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn record_message(&self, message: &Message) -> Result<(), IngestError> {
        let message_id = message.id.as_deref().ok_or(IngestError::MissingId)?;
        let author = message.author.as_ref().ok_or(IngestError::MissingAuthor)?;
        let date = message
            .date()
            .ok_or(IngestError::MissingTimestamp)?
            .map_err(IngestError::BadTimestamp)?;
        let timestamp = message.timestamp.as_deref().unwrap_or_default();

        let sender_id = resolve_author(author);
        let mentioned: Vec<AuthorId> = message.mentions.iter().map(resolve_mention).collect();

        trace!("record message {} from {}", message_id, sender_id);

        // the sender guard is dropped before any mentioned entry is touched, a
        // self-mention would otherwise lock the same shard twice
        {
            let mut sender = self
                .authors
                .entry(sender_id.clone())
                .or_insert_with(|| AuthorAggregate::new(sender_id.clone()));
            if sender.observe(author, ObservedAt::new(timestamp, message_id)) {
                trace!("identity of {} set from message {}", sender_id, message_id);
            }
            sender.record_post(message, date, &mentioned);
        }

        for mentioned_id in mentioned {
            self.authors
                .entry(mentioned_id.clone())
                .or_insert_with(|| AuthorAggregate::new(mentioned_id))
                .record_mention_received(&sender_id);
        }

        Ok(())
    }

    pub fn process_channel(&self, channel: &Channel) -> IngestReport {
        let mut report = IngestReport {
            channels: 1,
            ..IngestReport::default()
        };

        for message in channel.messages.iter() {
            match self.record_message(message) {
                Ok(()) => report.messages_recorded += 1,
                Err(error) => {
                    warn!(
                        "skipping message {} in channel {}: {}",
                        message.id.as_deref().unwrap_or("<no id>"),
                        channel.name(),
                        error
                    );
                    report.messages_skipped += 1;
                    report.issues.push(IngestIssue {
                        channel: channel.name().to_string(),
                        message_id: message.id.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            "channel {}: {} recorded, {} skipped",
            channel.name(),
            report.messages_recorded,
            report.messages_skipped
        );
        report
    }

    /// Ingests channels on the current rayon pool, one task per channel.
    pub fn process_channels(&self, channels: &[Channel]) -> IngestReport {
        channels
            .par_iter()
            .map(|channel| self.process_channel(channel))
            .reduce(IngestReport::default, IngestReport::merge)
    }

    /// Pre-finalize view of every aggregate, ordered by id.
    pub fn aggregates(&self) -> Vec<AuthorAggregate> {
        let mut aggregates: Vec<AuthorAggregate> = self
            .authors
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        aggregates.sort_by(|a, b| a.author_id.cmp(&b.author_id));
        aggregates
    }

    pub fn get(&self, id: &AuthorId) -> Option<AuthorAggregate> {
        self.authors.get(id).map(|entry| entry.value().clone())
    }

    /// Every mention recorded so far points at an existing aggregate and the
    /// sent/received maps mirror each other. Not meant to run alongside
    /// ingestion.
    pub fn verify(&self) -> Result<(), Error> {
        for entry in self.authors.iter() {
            let sender = entry.value();
            for (recipient_id, &sent) in sender.mentions_sent.iter() {
                let recipient =
                    self.authors
                        .get(recipient_id)
                        .ok_or_else(|| Error::UnknownMentionTarget {
                            sender: sender.author_id.clone(),
                            recipient: recipient_id.clone(),
                        })?;
                let received = recipient
                    .mentions_received
                    .get(&sender.author_id)
                    .copied()
                    .unwrap_or_default();
                if sent != received {
                    return Err(Error::MentionDuality {
                        sender: sender.author_id.clone(),
                        recipient: recipient_id.clone(),
                        sent,
                        received,
                    });
                }
            }
        }
        Ok(())
    }

    /// Rolls up derived totals and prunes authors below the message floor.
    ///
    /// Taking `&mut self` means no ingestion can still be running. Running it
    /// again changes nothing.
    pub fn finalize(&mut self) {
        debug_assert!(self.verify().is_ok(), "{:?}", self.verify());

        self.authors
            .iter_mut()
            .for_each(|mut entry| entry.value_mut().rollup());

        let before = self.authors.len();
        let min_messages = self.config.min_messages;
        self.authors
            .retain(|_, aggregate| aggregate.messages_sent >= min_messages);

        info!(
            "finalized {} authors, pruned {} below {} messages",
            self.authors.len(),
            before - self.authors.len(),
            min_messages
        );
    }

    pub fn into_snapshot(mut self) -> Snapshot {
        self.finalize();
        let snapshot = Snapshot::new(self.authors.into_iter().map(|(_, aggregate)| aggregate));
        debug_assert!(snapshot.verify().is_ok(), "{:?}", snapshot.verify());
        snapshot
    }
}
