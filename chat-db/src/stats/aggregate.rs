use chat_msg::{Author, Message};
use chat_ref::{format_day_month_year, AuthorId, EmojiKey};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::stats::identity::{Identity, ObservedAt};

/// Running statistics for one author.
///
/// Every mutation is a commutative merge (counter increment, map sum, date
/// minimum) so the final values do not depend on the order messages arrive in.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAggregate {
    pub author_id: AuthorId,
    #[serde(rename = "author")]
    pub(crate) identity: Identity,
    pub messages_sent: u64,
    pub embeds_sent: u64,
    pub attachments_sent: u64,
    pub times_mentioned: u64,
    pub sum_emojis_received: u64,
    pub word_count_total: u64,
    pub earliest_local_date: Option<NaiveDate>,
    pub first_message_sent: Option<String>,
    pub emojis_received: BTreeMap<EmojiKey, u64>,
    pub mentions_sent: BTreeMap<AuthorId, u64>,
    pub mentions_received: BTreeMap<AuthorId, u64>,
}

impl AuthorAggregate {
    /// Empty aggregate with a placeholder identity.
    pub fn new(author_id: AuthorId) -> Self {
        AuthorAggregate {
            identity: Identity::placeholder(&author_id),
            author_id,
            messages_sent: 0,
            embeds_sent: 0,
            attachments_sent: 0,
            times_mentioned: 0,
            sum_emojis_received: 0,
            word_count_total: 0,
            earliest_local_date: None,
            first_message_sent: None,
            emojis_received: BTreeMap::new(),
            mentions_sent: BTreeMap::new(),
            mentions_received: BTreeMap::new(),
        }
    }

    pub fn author(&self) -> &Author {
        self.identity.author()
    }

    pub fn is_placeholder(&self) -> bool {
        self.identity.is_placeholder()
    }

    pub(crate) fn observe(&mut self, author: &Author, observed_at: ObservedAt) -> bool {
        self.identity.upgrade(author, observed_at)
    }

    /// Folds one message posted by this author into the counters.
    pub(crate) fn record_post(&mut self, message: &Message, date: NaiveDate, mentioned: &[AuthorId]) {
        self.messages_sent += 1;
        self.word_count_total += message.word_count();

        if !message.embeds.is_empty() {
            self.embeds_sent += 1;
        }
        if !message.attachments.is_empty() {
            self.attachments_sent += 1;
        }

        for reaction in message.reactions.iter() {
            *self.emojis_received.entry(reaction.emoji.key()).or_default() += reaction.count;
        }

        if !mentioned.is_empty() {
            self.times_mentioned += 1;
            for mentioned_id in mentioned {
                *self.mentions_sent.entry(mentioned_id.clone()).or_default() += 1;
            }
        }

        self.earliest_local_date = Some(match self.earliest_local_date {
            Some(current) => current.min(date),
            None => date,
        });
    }

    pub(crate) fn record_mention_received(&mut self, mentioner_id: &AuthorId) {
        *self
            .mentions_received
            .entry(mentioner_id.clone())
            .or_default() += 1;
    }

    /// Derived totals computed once ingestion is over.
    pub(crate) fn rollup(&mut self) {
        self.sum_emojis_received = self.emojis_received.values().sum();
        self.first_message_sent = self.earliest_local_date.as_ref().map(format_day_month_year);
    }

    pub fn total_mentions_sent(&self) -> u64 {
        self.mentions_sent.values().sum()
    }

    pub fn average_words_per_message(&self, decimal_precision: u32) -> Option<f64> {
        if self.messages_sent == 0 {
            return None;
        }
        let average = self.word_count_total as f64 / self.messages_sent as f64;
        Some(round_half_up(average, decimal_precision))
    }
}

/// Most decimal places an `f64` can carry.
pub const MAX_DECIMAL_PRECISION: u32 = 15;

/// Rounds to `decimal_precision` places, halves away from zero. Precision is
/// capped at [`MAX_DECIMAL_PRECISION`].
pub fn round_half_up(value: f64, decimal_precision: u32) -> f64 {
    let scale = 10f64.powi(decimal_precision.min(MAX_DECIMAL_PRECISION) as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: serde_json::Value) -> Message {
        serde_json::from_value(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_post_counts() {
        let mut aggregate = AuthorAggregate::new(AuthorId::from("1"));
        let msg = message(json!({
            "id": "10",
            "content": "one two three",
            "embeds": [{ "title": "x" }],
            "attachments": [],
            "reactions": [
                { "emoji": { "name": "👍" }, "count": 2 },
                { "emoji": { "name": "👍" }, "count": 1 },
                { "emoji": { "id": "7", "name": "" }, "count": 4 }
            ]
        }));
        let mentioned = vec![AuthorId::from("2"), AuthorId::from("2"), AuthorId::from("3")];
        aggregate.record_post(&msg, date(2020, 5, 1), &mentioned);
        aggregate.record_post(&msg, date(2019, 5, 1), &[]);

        assert_eq!(aggregate.messages_sent, 2);
        assert_eq!(aggregate.word_count_total, 6);
        assert_eq!(aggregate.embeds_sent, 2);
        assert_eq!(aggregate.attachments_sent, 0);
        assert_eq!(aggregate.times_mentioned, 1);
        assert_eq!(aggregate.mentions_sent[&AuthorId::from("2")], 2);
        assert_eq!(aggregate.mentions_sent[&AuthorId::from("3")], 1);
        assert_eq!(aggregate.emojis_received[&EmojiKey::Name("👍".into())], 6);
        assert_eq!(aggregate.emojis_received[&EmojiKey::Id("7".into())], 8);
        assert_eq!(aggregate.earliest_local_date, Some(date(2019, 5, 1)));
        assert_eq!(aggregate.sum_emojis_received, 0);
    }

    #[test]
    fn test_rollup_is_idempotent() {
        let mut aggregate = AuthorAggregate::new(AuthorId::from("1"));
        aggregate.emojis_received.insert(EmojiKey::Name("a".into()), 3);
        aggregate.emojis_received.insert(EmojiKey::Name("b".into()), 4);
        aggregate.earliest_local_date = Some(date(2018, 10, 18));
        aggregate.rollup();
        aggregate.rollup();
        assert_eq!(aggregate.sum_emojis_received, 7);
        assert_eq!(aggregate.first_message_sent.as_deref(), Some("18.10.2018"));
    }

    #[test]
    fn test_average_words_rounding() {
        let mut aggregate = AuthorAggregate::new(AuthorId::from("1"));
        assert_eq!(aggregate.average_words_per_message(2), None);
        aggregate.messages_sent = 10;
        aggregate.word_count_total = 101;
        assert_eq!(aggregate.average_words_per_message(2), Some(10.1));
        aggregate.messages_sent = 3;
        aggregate.word_count_total = 2;
        assert_eq!(aggregate.average_words_per_message(2), Some(0.67));
    }

    #[test]
    fn test_round_half_up_not_truncation() {
        assert_eq!(round_half_up(2.675_1, 2), 2.68);
        assert_eq!(round_half_up(0.125, 2), 0.13);
        assert_eq!(round_half_up(1.994, 2), 1.99);
        assert_eq!(round_half_up(7.5, 0), 8.0);
    }

    #[test]
    fn test_round_half_up_huge_precision_stays_finite() {
        for precision in [MAX_DECIMAL_PRECISION, 400, u32::MAX] {
            let rounded = round_half_up(10.1, precision);
            assert!(rounded.is_finite(), "precision {}", precision);
            assert!((rounded - 10.1).abs() < 1e-12, "precision {}", precision);
        }
    }

    #[test]
    fn test_serializes_author_from_identity() {
        let aggregate = AuthorAggregate::new(AuthorId::from("5"));
        let value = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(value["authorId"], "5");
        assert_eq!(value["author"]["name"], "Unknown User 5");
        assert_eq!(value["messagesSent"], 0);
    }
}
