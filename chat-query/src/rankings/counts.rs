use chat_db::{AuthorAggregate, Snapshot};
use chat_ref::AuthorId;
use serde::Serialize;
use std::cmp::Ordering;

/// One author's line in an author-keyed ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAuthor<V> {
    pub author_id: AuthorId,
    pub name: String,
    pub nickname: String,
    pub value: V,
}

impl<V> RankedAuthor<V> {
    pub fn new(aggregate: &AuthorAggregate, value: V) -> Self {
        let author = aggregate.author();
        RankedAuthor {
            author_id: aggregate.author_id.clone(),
            name: author.name.clone(),
            nickname: author.nickname.clone(),
            value,
        }
    }
}

/// Counter ranking, highest first, with the sum of every entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountRanking {
    pub total: u64,
    pub entries: Vec<RankedAuthor<u64>>,
}

impl CountRanking {
    pub fn by_metric(snapshot: &Snapshot, metric: fn(&AuthorAggregate) -> u64) -> Self {
        let mut entries: Vec<RankedAuthor<u64>> = snapshot
            .iter()
            .map(|aggregate| RankedAuthor::new(aggregate, metric(aggregate)))
            .collect();
        entries.sort_by(|a, b| descending_then_id(a.value.cmp(&b.value), a, b));

        let total = entries.iter().map(|entry| entry.value).sum();
        CountRanking { total, entries }
    }
}

/// Reverses `primary` and breaks ties by ascending author id.
pub(crate) fn descending_then_id<V>(
    primary: Ordering,
    a: &RankedAuthor<V>,
    b: &RankedAuthor<V>,
) -> Ordering {
    primary
        .reverse()
        .then_with(|| a.author_id.cmp(&b.author_id))
}

pub fn messages_sent(aggregate: &AuthorAggregate) -> u64 {
    aggregate.messages_sent
}

pub fn embeds_sent(aggregate: &AuthorAggregate) -> u64 {
    aggregate.embeds_sent
}

pub fn attachments_sent(aggregate: &AuthorAggregate) -> u64 {
    aggregate.attachments_sent
}

pub fn times_mentioned(aggregate: &AuthorAggregate) -> u64 {
    aggregate.times_mentioned
}

pub fn mentions_sent(aggregate: &AuthorAggregate) -> u64 {
    aggregate.total_mentions_sent()
}
