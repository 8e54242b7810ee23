use chat_db::{AnalysisConfig, Snapshot};
use chat_ref::{format_day_month_year, AuthorId};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAgeEntry {
    pub author_id: AuthorId,
    pub name: String,
    pub nickname: String,
    pub first_message_date: NaiveDate,
    /// `d.m.yyyy`
    pub first_message_sent: String,
}

/// Oldest first. Authors sharing a first date are all listed, ordered by id.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAgeRanking {
    pub entries: Vec<AccountAgeEntry>,
}

impl AccountAgeRanking {
    pub fn build(snapshot: &Snapshot, config: &AnalysisConfig) -> Self {
        let mut entries: Vec<AccountAgeEntry> = snapshot
            .iter()
            .filter(|aggregate| aggregate.messages_sent >= config.min_messages)
            .filter_map(|aggregate| {
                let date = aggregate.earliest_local_date?;
                let author = aggregate.author();
                Some(AccountAgeEntry {
                    author_id: aggregate.author_id.clone(),
                    name: author.name.clone(),
                    nickname: author.nickname.clone(),
                    first_message_date: date,
                    first_message_sent: format_day_month_year(&date),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            a.first_message_date
                .cmp(&b.first_message_date)
                .then_with(|| a.author_id.cmp(&b.author_id))
        });

        AccountAgeRanking { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{post, snapshot_from};

    #[test]
    fn test_duplicate_dates_keep_every_author() {
        let mut messages = Vec::new();
        for (author, day) in [("b", 3), ("a", 3), ("c", 1), ("d", 3)] {
            for i in 0..10 {
                messages.push(post(
                    &format!("{}{}", author, i),
                    author,
                    &format!("2019-07-{:02}T23:59:00+00:00", day + i % 2),
                    "x",
                    &[],
                ));
            }
        }
        let snapshot = snapshot_from(messages, 10);
        let ranking = AccountAgeRanking::build(&snapshot, &AnalysisConfig::default());

        let ids: Vec<&str> = ranking.entries.iter().map(|e| e.author_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
        assert_eq!(ranking.entries[0].first_message_sent, "1.7.2019");
        assert_eq!(ranking.entries[1].first_message_sent, "3.7.2019");
    }

    #[test]
    fn test_respects_floor() {
        let messages = (0..3)
            .map(|i| post(&i.to_string(), "a", "2019-07-01T00:00:00+00:00", "x", &[]))
            .collect();
        let snapshot = snapshot_from(messages, 1);
        let ranking = AccountAgeRanking::build(&snapshot, &AnalysisConfig::default());
        assert!(ranking.entries.is_empty());
    }
}
