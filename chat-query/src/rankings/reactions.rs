use chat_db::Snapshot;
use chat_ref::EmojiKey;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCount {
    pub emoji: EmojiKey,
    pub count: u64,
}

/// Reactions received across every retained author, most used first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRanking {
    pub reactions_given: u64,
    pub entries: Vec<ReactionCount>,
}

impl ReactionRanking {
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut totals: BTreeMap<&EmojiKey, u64> = BTreeMap::new();
        for aggregate in snapshot {
            for (emoji, count) in aggregate.emojis_received.iter() {
                *totals.entry(emoji).or_default() += count;
            }
        }

        let mut entries: Vec<ReactionCount> = totals
            .into_iter()
            .map(|(emoji, count)| ReactionCount {
                emoji: emoji.clone(),
                count,
            })
            .collect();
        // stable over the key order of the map
        entries.sort_by(|a, b| b.count.cmp(&a.count));

        let reactions_given = entries.iter().map(|entry| entry.count).sum();
        ReactionRanking {
            reactions_given,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{post, snapshot_from};
    use serde_json::json;

    #[test]
    fn test_sums_across_authors() {
        let mut first = post("1", "a", "2020-01-01T00:00:00+00:00", "x", &[]);
        first["reactions"] = json!([
            { "emoji": { "id": "1", "name": ":fire:" }, "count": 2 },
            { "emoji": { "id": "1", "name": "" }, "count": 5 }
        ]);
        let mut second = post("2", "b", "2020-01-01T00:00:00+00:00", "x", &[]);
        second["reactions"] = json!([
            { "emoji": { "id": "9", "name": ":fire:" }, "count": 4 },
            { "emoji": { "name": "ok" }, "count": 6 }
        ]);

        let ranking = ReactionRanking::build(&snapshot_from(vec![first, second], 1));
        assert_eq!(
            ranking.entries,
            vec![
                ReactionCount {
                    emoji: EmojiKey::Name(":fire:".into()),
                    count: 6
                },
                ReactionCount {
                    emoji: EmojiKey::Name("ok".into()),
                    count: 6
                },
                ReactionCount {
                    emoji: EmojiKey::Id("1".into()),
                    count: 5
                },
            ]
        );
        assert_eq!(ranking.reactions_given, 17);
    }
}
