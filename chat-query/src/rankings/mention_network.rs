use chat_db::Snapshot;
use chat_graph::{MentionEdge, MentionGraph, MentionMatrix};
use serde::Serialize;

use crate::rankings::counts::{mentions_sent, CountRanking};

pub const TOP_RELATIONSHIPS: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionNetworkRanking {
    pub most_mentions_sent: CountRanking,
    /// Only authors who mentioned someone get a row.
    pub mention_matrix: MentionMatrix,
    pub edges: Vec<MentionEdge>,
    pub top_mention_relationships: Vec<MentionEdge>,
    pub total_mention_connections: u64,
}

impl MentionNetworkRanking {
    pub fn build(snapshot: &Snapshot) -> Self {
        let graph = MentionGraph::build(snapshot);

        let mut mention_matrix = graph.matrix();
        mention_matrix.retain(|_, recipients| !recipients.is_empty());

        MentionNetworkRanking {
            most_mentions_sent: CountRanking::by_metric(snapshot, mentions_sent),
            mention_matrix,
            edges: graph.edges().to_vec(),
            top_mention_relationships: graph
                .top_relationships(TOP_RELATIONSHIPS)
                .into_iter()
                .cloned()
                .collect(),
            total_mention_connections: graph.total_mention_connections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::scenario;

    #[test]
    fn test_scenario_network() {
        let ranking = MentionNetworkRanking::build(&scenario());
        assert_eq!(ranking.total_mention_connections, 32);
        assert_eq!(ranking.most_mentions_sent.total, 32);
        assert_eq!(ranking.most_mentions_sent.entries[0].name, "bob");
        assert_eq!(ranking.most_mentions_sent.entries[0].value, 20);
        assert_eq!(ranking.top_mention_relationships[0].weight, 20);
        assert_eq!(ranking.mention_matrix["alice"]["bob"], 12);
        assert_eq!(ranking.edges.len(), 2);
    }
}
