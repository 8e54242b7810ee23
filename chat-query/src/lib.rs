use chat_db::{AnalysisConfig, Snapshot};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

pub mod rankings;
pub use rankings::{
    AccountAgeEntry, AccountAgeRanking, AverageWordsRanking, CountRanking, MentionNetworkRanking,
    RankedAuthor, ReactionCount, ReactionRanking, SocialGraphMatrixRanking, UserGraphStats,
};
use rankings::{attachments_sent, embeds_sent, messages_sent, mentions_sent, times_mentioned};

#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("Unknown ranking kind: {0}")]
    UnknownRankingKind(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RankingKind {
    MostMessages,
    AccountAge,
    MostCommonReaction,
    AvgWordCount,
    MostEmbeds,
    MostAttachments,
    TimesMentioned,
    MostMentionsSent,
    MentionNetwork,
    SocialGraphMatrix,
}

impl RankingKind {
    pub const ALL: [RankingKind; 10] = [
        RankingKind::MostMessages,
        RankingKind::AccountAge,
        RankingKind::MostCommonReaction,
        RankingKind::AvgWordCount,
        RankingKind::MostEmbeds,
        RankingKind::MostAttachments,
        RankingKind::TimesMentioned,
        RankingKind::MostMentionsSent,
        RankingKind::MentionNetwork,
        RankingKind::SocialGraphMatrix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RankingKind::MostMessages => "most-messages",
            RankingKind::AccountAge => "account-age",
            RankingKind::MostCommonReaction => "most-common-reaction",
            RankingKind::AvgWordCount => "avg-word-count",
            RankingKind::MostEmbeds => "most-embeds",
            RankingKind::MostAttachments => "most-attachments",
            RankingKind::TimesMentioned => "times-mentioned",
            RankingKind::MostMentionsSent => "most-mentions-sent",
            RankingKind::MentionNetwork => "mention-network",
            RankingKind::SocialGraphMatrix => "social-graph-matrix",
        }
    }

    /// Default output file, e.g. `ranking-most-messages.json`.
    pub fn file_name(&self) -> String {
        format!("ranking-{}.json", self.name())
    }
}

impl fmt::Display for RankingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RankingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownRankingKind(s.to_string()))
    }
}

/// A finished ranking. Serializes as the inner ranking alone.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ranking {
    MostMessages(CountRanking),
    AccountAge(AccountAgeRanking),
    MostCommonReaction(ReactionRanking),
    AvgWordCount(AverageWordsRanking),
    MostEmbeds(CountRanking),
    MostAttachments(CountRanking),
    TimesMentioned(CountRanking),
    MostMentionsSent(CountRanking),
    MentionNetwork(MentionNetworkRanking),
    SocialGraphMatrix(SocialGraphMatrixRanking),
}

impl Ranking {
    pub fn kind(&self) -> RankingKind {
        match self {
            Ranking::MostMessages(_) => RankingKind::MostMessages,
            Ranking::AccountAge(_) => RankingKind::AccountAge,
            Ranking::MostCommonReaction(_) => RankingKind::MostCommonReaction,
            Ranking::AvgWordCount(_) => RankingKind::AvgWordCount,
            Ranking::MostEmbeds(_) => RankingKind::MostEmbeds,
            Ranking::MostAttachments(_) => RankingKind::MostAttachments,
            Ranking::TimesMentioned(_) => RankingKind::TimesMentioned,
            Ranking::MostMentionsSent(_) => RankingKind::MostMentionsSent,
            Ranking::MentionNetwork(_) => RankingKind::MentionNetwork,
            Ranking::SocialGraphMatrix(_) => RankingKind::SocialGraphMatrix,
        }
    }

    pub fn file_name(&self) -> String {
        self.kind().file_name()
    }
}

/// Pure projection of the snapshot, never mutates it.
pub fn build_ranking(kind: RankingKind, snapshot: &Snapshot, config: &AnalysisConfig) -> Ranking {
    debug!("building ranking {}", kind);

    match kind {
        RankingKind::MostMessages => {
            Ranking::MostMessages(CountRanking::by_metric(snapshot, messages_sent))
        }
        RankingKind::AccountAge => Ranking::AccountAge(AccountAgeRanking::build(snapshot, config)),
        RankingKind::MostCommonReaction => {
            Ranking::MostCommonReaction(ReactionRanking::build(snapshot))
        }
        RankingKind::AvgWordCount => {
            Ranking::AvgWordCount(AverageWordsRanking::build(snapshot, config))
        }
        RankingKind::MostEmbeds => {
            Ranking::MostEmbeds(CountRanking::by_metric(snapshot, embeds_sent))
        }
        RankingKind::MostAttachments => {
            Ranking::MostAttachments(CountRanking::by_metric(snapshot, attachments_sent))
        }
        RankingKind::TimesMentioned => {
            Ranking::TimesMentioned(CountRanking::by_metric(snapshot, times_mentioned))
        }
        RankingKind::MostMentionsSent => {
            Ranking::MostMentionsSent(CountRanking::by_metric(snapshot, mentions_sent))
        }
        RankingKind::MentionNetwork => {
            Ranking::MentionNetwork(MentionNetworkRanking::build(snapshot))
        }
        RankingKind::SocialGraphMatrix => {
            Ranking::SocialGraphMatrix(SocialGraphMatrixRanking::build(snapshot))
        }
    }
}

/// Looks a kind up by its kebab-case name, then builds it.
pub fn build_ranking_by_name(
    name: &str,
    snapshot: &Snapshot,
    config: &AnalysisConfig,
) -> Result<Ranking, Error> {
    let kind: RankingKind = name.parse()?;
    Ok(build_ranking(kind, snapshot, config))
}

/// Builds every requested kind in parallel, results in request order.
pub fn build_rankings(
    kinds: &[RankingKind],
    snapshot: &Snapshot,
    config: &AnalysisConfig,
) -> Vec<Ranking> {
    info!("building {} rankings over {} authors", kinds.len(), snapshot.len());

    kinds
        .par_iter()
        .map(|&kind| build_ranking(kind, snapshot, config))
        .collect()
}
