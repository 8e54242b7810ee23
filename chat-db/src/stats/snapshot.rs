use chat_ref::AuthorId;
use serde::Serialize;
use std::collections::HashMap;

use crate::stats::aggregate::AuthorAggregate;
use crate::Error;

/// Frozen, pruned set of aggregates in display order.
///
/// Read-only after construction, so rankings and graph analytics can share it
/// across threads without any locking.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    aggregates: Vec<AuthorAggregate>,
    #[serde(skip)]
    index: HashMap<AuthorId, usize>,
}

impl Snapshot {
    pub fn new(aggregates: impl IntoIterator<Item = AuthorAggregate>) -> Self {
        let mut aggregates: Vec<AuthorAggregate> = aggregates.into_iter().collect();
        aggregates.sort_by(|a, b| a.author().display_cmp(b.author()));

        let index = aggregates
            .iter()
            .enumerate()
            .map(|(position, aggregate)| (aggregate.author_id.clone(), position))
            .collect();

        Snapshot { aggregates, index }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuthorAggregate> {
        self.aggregates.iter()
    }

    pub fn aggregates(&self) -> &[AuthorAggregate] {
        &self.aggregates
    }

    pub fn get(&self, id: &AuthorId) -> Option<&AuthorAggregate> {
        self.index.get(id).map(|&position| &self.aggregates[position])
    }

    pub fn contains(&self, id: &AuthorId) -> bool {
        self.index.contains_key(id)
    }

    /// Display name of a retained author.
    pub fn name_of(&self, id: &AuthorId) -> Option<&str> {
        self.get(id).map(|aggregate| aggregate.author().name.as_str())
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Checks that for every retained pair the sent and received counters agree,
    /// in both directions.
    pub fn verify(&self) -> Result<(), Error> {
        for sender in self.aggregates.iter() {
            for recipient in self.aggregates.iter() {
                let sent = sender
                    .mentions_sent
                    .get(&recipient.author_id)
                    .copied()
                    .unwrap_or_default();
                let received = recipient
                    .mentions_received
                    .get(&sender.author_id)
                    .copied()
                    .unwrap_or_default();
                if sent != received {
                    return Err(Error::MentionDuality {
                        sender: sender.author_id.clone(),
                        recipient: recipient.author_id.clone(),
                        sent,
                        received,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a AuthorAggregate;
    type IntoIter = std::slice::Iter<'a, AuthorAggregate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
