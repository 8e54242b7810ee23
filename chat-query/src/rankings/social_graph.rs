use chat_db::Snapshot;
use chat_graph::{Degree, MentionGraph, MentionMatrix};
use chat_ref::AuthorId;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGraphStats {
    pub author_id: AuthorId,
    pub name: String,
    pub incoming_connections: usize,
    pub outgoing_connections: usize,
    pub total_mentions_sent: u64,
    pub total_mentions_received: u64,
    pub centrality_score: usize,
}

/// Full matrix with a row for every retained author, plus degree stats in
/// display order. Degree stats count retained counterparts only.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialGraphMatrixRanking {
    pub social_graph_matrix: MentionMatrix,
    pub all_user_ids: Vec<AuthorId>,
    pub user_graph_stats: Vec<UserGraphStats>,
}

impl SocialGraphMatrixRanking {
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut all_user_ids: Vec<AuthorId> = snapshot
            .iter()
            .map(|aggregate| aggregate.author_id.clone())
            .collect();
        all_user_ids.sort();

        let user_graph_stats = snapshot
            .iter()
            .map(|aggregate| {
                let degree = Degree::of(snapshot, aggregate);
                UserGraphStats {
                    author_id: aggregate.author_id.clone(),
                    name: aggregate.author().name.clone(),
                    incoming_connections: degree.incoming,
                    outgoing_connections: degree.outgoing,
                    total_mentions_sent: degree.sent,
                    total_mentions_received: degree.received,
                    centrality_score: degree.centrality(),
                }
            })
            .collect();

        SocialGraphMatrixRanking {
            social_graph_matrix: MentionGraph::build(snapshot).matrix(),
            all_user_ids,
            user_graph_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::scenario;

    #[test]
    fn test_scenario_matrix() {
        let ranking = SocialGraphMatrixRanking::build(&scenario());
        assert_eq!(
            ranking.all_user_ids,
            vec![AuthorId::from("A"), AuthorId::from("B")]
        );
        assert_eq!(ranking.social_graph_matrix["bob"]["alice"], 20);

        let alice = &ranking.user_graph_stats[0];
        assert_eq!(alice.name, "alice");
        // carol mentioned alice but was pruned
        assert_eq!(alice.incoming_connections, 1);
        assert_eq!(alice.outgoing_connections, 1);
        assert_eq!(alice.centrality_score, 2);
        assert_eq!(alice.total_mentions_received, 20);
    }
}
