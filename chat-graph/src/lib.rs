use chat_db::{AuthorAggregate, Snapshot};
use chat_ref::AuthorId;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use std::{cmp::Reverse, collections::BTreeMap};

pub mod analytics;

pub use analytics::{
    export_graph, most_connected_users, mutual_mention_relationships, network_statistics,
    GraphEdge, GraphExport, GraphNode, MutualMentionRelationship, NetworkStatistics,
    UserConnection,
};

/// Shown in name-keyed outputs for a recipient that is not in the snapshot.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Sender name -> recipient name -> mention count.
pub type MentionMatrix = BTreeMap<String, BTreeMap<String, u64>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionEdge {
    pub sender_id: AuthorId,
    pub sender: String,
    /// `None` when the recipient was pruned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<AuthorId>,
    pub recipient: String,
    pub weight: u64,
}

/// Directed mention graph over the retained authors.
///
/// Senders are always retained authors. A recipient that was pruned loses its
/// id and is labelled [`UNKNOWN_USER`].
#[derive(Clone, Debug, Default)]
pub struct MentionGraph {
    edges: Vec<MentionEdge>,
    senders: Vec<String>,
}

impl MentionGraph {
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut edges = Vec::new();
        let mut senders = Vec::with_capacity(snapshot.len());

        for aggregate in snapshot {
            let sender = aggregate.author().name.clone();
            for (recipient_id, &weight) in aggregate.mentions_sent.iter() {
                if weight == 0 {
                    continue;
                }
                let recipient = snapshot.name_of(recipient_id);
                edges.push(MentionEdge {
                    sender_id: aggregate.author_id.clone(),
                    sender: sender.clone(),
                    recipient_id: recipient.map(|_| recipient_id.clone()),
                    recipient: recipient.unwrap_or(UNKNOWN_USER).to_string(),
                    weight,
                });
            }
            senders.push(sender);
        }

        debug!(
            "mention graph: {} senders, {} edges",
            senders.len(),
            edges.len()
        );
        MentionGraph { edges, senders }
    }

    /// Edges in snapshot display order, recipients by id within a sender.
    pub fn edges(&self) -> &[MentionEdge] {
        &self.edges
    }

    /// Name-keyed matrix with a row for every retained author. Edges whose
    /// labels collide are summed.
    pub fn matrix(&self) -> MentionMatrix {
        let mut matrix: MentionMatrix = self
            .senders
            .iter()
            .map(|sender| (sender.clone(), BTreeMap::new()))
            .collect();

        for edge in self.edges.iter() {
            *matrix
                .entry(edge.sender.clone())
                .or_default()
                .entry(edge.recipient.clone())
                .or_default() += edge.weight;
        }
        matrix
    }

    /// The `k` heaviest edges. Equal weights keep edge order.
    pub fn top_relationships(&self, k: usize) -> Vec<&MentionEdge> {
        self.edges
            .iter()
            .sorted_by_key(|edge| Reverse(edge.weight))
            .take(k)
            .collect_vec()
    }

    pub fn total_mention_connections(&self) -> u64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }
}

/// Mention counts of one author, counting only retained counterparts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Degree {
    /// Distinct retained authors mentioned.
    pub outgoing: usize,
    /// Distinct retained authors who mentioned this one.
    pub incoming: usize,
    pub sent: u64,
    pub received: u64,
}

impl Degree {
    pub fn of(snapshot: &Snapshot, aggregate: &AuthorAggregate) -> Self {
        let (outgoing, sent) = retained(snapshot, &aggregate.mentions_sent);
        let (incoming, received) = retained(snapshot, &aggregate.mentions_received);
        Degree {
            outgoing,
            incoming,
            sent,
            received,
        }
    }

    pub fn centrality(&self) -> usize {
        self.outgoing + self.incoming
    }
}

fn retained(snapshot: &Snapshot, counts: &BTreeMap<AuthorId, u64>) -> (usize, u64) {
    counts
        .iter()
        .filter(|&(id, &count)| count > 0 && snapshot.contains(id))
        .fold((0, 0), |(distinct, total), (_, &count)| {
            (distinct + 1, total + count)
        })
}
