use chat_db::{AuthorAggregate, Snapshot};

use crate::Degree;
use chat_ref::AuthorId;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Reverse;

/// Connection counts for one author among the retained authors. Connections
/// are distinct ids, mentions are totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConnection {
    pub author_id: AuthorId,
    pub name: String,
    pub nickname: String,
    pub outgoing_connections: usize,
    pub incoming_connections: usize,
    pub total_mentions_sent: u64,
    pub total_mentions_received: u64,
}

impl UserConnection {
    fn from_aggregate(snapshot: &Snapshot, aggregate: &AuthorAggregate) -> Self {
        let author = aggregate.author();
        let degree = Degree::of(snapshot, aggregate);
        UserConnection {
            author_id: aggregate.author_id.clone(),
            name: author.name.clone(),
            nickname: author.nickname.clone(),
            outgoing_connections: degree.outgoing,
            incoming_connections: degree.incoming,
            total_mentions_sent: degree.sent,
            total_mentions_received: degree.received,
        }
    }

    pub fn total_connections(&self) -> usize {
        self.outgoing_connections + self.incoming_connections
    }

    /// In plus out degree.
    pub fn centrality(&self) -> usize {
        self.total_connections()
    }
}

/// Authors ordered by in plus out degree, ties in display order.
pub fn most_connected_users(snapshot: &Snapshot) -> Vec<UserConnection> {
    snapshot
        .iter()
        .map(|aggregate| UserConnection::from_aggregate(snapshot, aggregate))
        .sorted_by_key(|connection| Reverse(connection.total_connections()))
        .collect_vec()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualMentionRelationship {
    pub user1_id: AuthorId,
    pub user2_id: AuthorId,
    pub user1_to_user2_mentions: u64,
    pub user2_to_user1_mentions: u64,
}

impl MutualMentionRelationship {
    pub fn total_mentions(&self) -> u64 {
        self.user1_to_user2_mentions + self.user2_to_user1_mentions
    }
}

/// Pairs of retained authors who mention each other, each pair once with the
/// smaller id first, heaviest first.
pub fn mutual_mention_relationships(snapshot: &Snapshot) -> Vec<MutualMentionRelationship> {
    snapshot
        .iter()
        .flat_map(move |aggregate| {
            aggregate
                .mentions_sent
                .iter()
                .filter(move |&(other_id, &sent)| sent > 0 && aggregate.author_id < *other_id)
                .filter_map(move |(other_id, &sent)| {
                    let back = snapshot
                        .get(other_id)?
                        .mentions_sent
                        .get(&aggregate.author_id)
                        .copied()
                        .unwrap_or_default();
                    (back > 0).then(|| MutualMentionRelationship {
                        user1_id: aggregate.author_id.clone(),
                        user2_id: other_id.clone(),
                        user1_to_user2_mentions: sent,
                        user2_to_user1_mentions: back,
                    })
                })
        })
        .sorted_by_key(|relationship| Reverse(relationship.total_mentions()))
        .collect_vec()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatistics {
    pub total_users: usize,
    pub total_mentions: u64,
    pub total_connections: usize,
    pub average_connections_per_user: f64,
    pub average_mentions_per_user: f64,
}

/// Totals over mentions between retained authors.
pub fn network_statistics(snapshot: &Snapshot) -> NetworkStatistics {
    let total_users = snapshot.len();
    let degrees = snapshot.iter().map(|a| Degree::of(snapshot, a)).collect_vec();
    let total_mentions: u64 = degrees.iter().map(|degree| degree.sent).sum();
    let total_connections: usize = degrees.iter().map(|degree| degree.outgoing).sum();

    let per_user = |total: f64| {
        if total_users == 0 {
            0.0
        } else {
            total / total_users as f64
        }
    };

    NetworkStatistics {
        total_users,
        total_mentions,
        total_connections,
        average_connections_per_user: per_user(total_connections as f64),
        average_mentions_per_user: per_user(total_mentions as f64),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: AuthorId,
    pub label: String,
    pub mentions_sent: u64,
    pub mentions_received: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: AuthorId,
    pub target: AuthorId,
    pub weight: u64,
}

/// Plain node and edge lists for graph file writers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Nodes are the retained authors, edges only join two of them. A node's
/// mention totals equal the weights of its edges.
pub fn export_graph(snapshot: &Snapshot) -> GraphExport {
    let nodes = snapshot
        .iter()
        .map(|aggregate| {
            let degree = Degree::of(snapshot, aggregate);
            GraphNode {
                id: aggregate.author_id.clone(),
                label: aggregate.author().name.clone(),
                mentions_sent: degree.sent,
                mentions_received: degree.received,
            }
        })
        .collect();

    let edges = snapshot
        .iter()
        .flat_map(|aggregate| {
            aggregate
                .mentions_sent
                .iter()
                .filter(|&(target, &weight)| weight > 0 && snapshot.contains(target))
                .map(move |(target, &weight)| GraphEdge {
                    source: aggregate.author_id.clone(),
                    target: target.clone(),
                    weight,
                })
        })
        .collect();

    GraphExport { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{scenario, snapshot};

    #[test]
    fn test_scenario_mutual_relationship() {
        let mutual = mutual_mention_relationships(&scenario());
        assert_eq!(
            mutual,
            vec![MutualMentionRelationship {
                user1_id: AuthorId::from("A"),
                user2_id: AuthorId::from("B"),
                user1_to_user2_mentions: 12,
                user2_to_user1_mentions: 20,
            }]
        );
        assert_eq!(mutual[0].total_mentions(), 32);
    }

    #[test]
    fn test_self_mention_is_not_mutual() {
        let snapshot = snapshot(&[("A", "alice", 2, &["A"])], 1);
        assert!(mutual_mention_relationships(&snapshot).is_empty());
        assert_eq!(network_statistics(&snapshot).total_mentions, 2);
    }

    #[test]
    fn test_mutual_sorted_by_total() {
        let snapshot = snapshot(
            &[
                ("1", "one", 1, &["2", "3"]),
                ("2", "two", 1, &["1"]),
                ("3", "three", 4, &["1"]),
            ],
            1,
        );
        let mutual = mutual_mention_relationships(&snapshot);
        assert_eq!(mutual.len(), 2);
        assert_eq!(mutual[0].user2_id, AuthorId::from("3"));
        assert_eq!(mutual[0].total_mentions(), 5);
        assert_eq!(mutual[1].total_mentions(), 2);
    }

    #[test]
    fn test_most_connected_users() {
        let snapshot = snapshot(
            &[
                ("A", "alice", 1, &["B", "C"]),
                ("B", "bob", 1, &["A"]),
                ("C", "carol", 1, &[]),
            ],
            1,
        );
        let connected = most_connected_users(&snapshot);
        let order: Vec<&str> = connected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["alice", "bob", "carol"]);
        assert_eq!(connected[0].outgoing_connections, 2);
        assert_eq!(connected[0].incoming_connections, 1);
        assert_eq!(connected[0].centrality(), 3);
        assert_eq!(connected[2].centrality(), 1);
    }

    #[test]
    fn test_network_statistics() {
        let stats = network_statistics(&scenario());
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_mentions, 32);
        assert_eq!(stats.total_connections, 2);
        assert_eq!(stats.average_connections_per_user, 1.0);
        assert_eq!(stats.average_mentions_per_user, 16.0);
    }

    #[test]
    fn test_network_statistics_empty() {
        let stats = network_statistics(&Snapshot::default());
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.average_connections_per_user, 0.0);
        assert_eq!(stats.average_mentions_per_user, 0.0);
    }

    #[test]
    fn test_export_graph() {
        let export = export_graph(&scenario());
        assert_eq!(export.nodes.len(), 2);
        assert_eq!(export.nodes[0].label, "alice");
        // carol's 5 mentions are gone with carol
        assert_eq!(export.nodes[0].mentions_received, 20);
        assert_eq!(
            export.edges[1],
            GraphEdge {
                source: AuthorId::from("B"),
                target: AuthorId::from("A"),
                weight: 20,
            }
        );
    }

    #[test]
    fn test_export_graph_with_pruned_author() {
        // A keeps posting about X, who posted once and is pruned
        let snapshot = snapshot(&[("A", "alice", 2, &["X"]), ("X", "xavier", 1, &["A"])], 2);
        let export = export_graph(&snapshot);

        let node_ids: Vec<&AuthorId> = export.nodes.iter().map(|node| &node.id).collect();
        assert_eq!(node_ids, vec![&AuthorId::from("A")]);
        assert!(export.edges.is_empty());
        assert_eq!(export.nodes[0].mentions_sent, 0);
        assert_eq!(export.nodes[0].mentions_received, 0);

        let alice = &most_connected_users(&snapshot)[0];
        assert_eq!(alice.incoming_connections, 0);
        assert_eq!(alice.total_mentions_received, 0);
        assert_eq!(network_statistics(&snapshot).total_mentions, 0);
    }

    #[test]
    fn test_export_graph_edges_join_nodes() {
        let snapshot = snapshot(
            &[
                ("A", "alice", 3, &["B", "X"]),
                ("B", "bob", 3, &["A", "C", "Y"]),
                ("C", "carol", 3, &["C"]),
                ("X", "xavier", 1, &["A", "B"]),
            ],
            2,
        );
        let export = export_graph(&snapshot);
        for edge in export.edges.iter() {
            assert!(export.nodes.iter().any(|node| node.id == edge.source));
            assert!(export.nodes.iter().any(|node| node.id == edge.target));
        }
        for node in export.nodes.iter() {
            let sent: u64 = export
                .edges
                .iter()
                .filter(|edge| edge.source == node.id)
                .map(|edge| edge.weight)
                .sum();
            let received: u64 = export
                .edges
                .iter()
                .filter(|edge| edge.target == node.id)
                .map(|edge| edge.weight)
                .sum();
            assert_eq!((node.mentions_sent, node.mentions_received), (sent, received));
        }
    }
}
