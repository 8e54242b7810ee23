use chat_db::{AnalysisConfig, Snapshot};
use serde::Serialize;

use crate::rankings::counts::{descending_then_id, RankedAuthor};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageWordsRanking {
    pub entries: Vec<RankedAuthor<f64>>,
}

impl AverageWordsRanking {
    pub fn build(snapshot: &Snapshot, config: &AnalysisConfig) -> Self {
        let mut entries: Vec<RankedAuthor<f64>> = snapshot
            .iter()
            .filter(|aggregate| aggregate.messages_sent >= config.min_messages_for_average)
            .filter(|aggregate| aggregate.word_count_total > 0)
            .filter_map(|aggregate| {
                let average = aggregate.average_words_per_message(config.decimal_precision)?;
                Some(RankedAuthor::new(aggregate, average))
            })
            .collect();
        entries.sort_by(|a, b| descending_then_id(a.value.total_cmp(&b.value), a, b));

        AverageWordsRanking { entries }
    }
}
