use chat_db::Snapshot;
use chat_graph::{
    export_graph, most_connected_users, mutual_mention_relationships, network_statistics,
    GraphExport, MutualMentionRelationship, NetworkStatistics, UserConnection,
};
use chat_query::Ranking;
use chat_ref::AuthorId;
use log::{debug, info};
use serde::Serialize;
use serde_json::to_string_pretty;
use std::{
    fmt::Write as _,
    io,
    path::{Path, PathBuf},
};
use tokio::fs::{create_dir_all, write};

mod graph_files;

pub use graph_files::{
    render_gexf, render_graph_script, render_graphml, render_html_page, xml_escape,
};

pub const AUTHORS_FILE_NAME: &str = "output-all.json";
pub const SOCIAL_GRAPH_JSON_FILE_NAME: &str = "social-graph.json";
pub const SOCIAL_GRAPH_TEXT_FILE_NAME: &str = "social-graph.txt";
pub const SOCIAL_GRAPH_GEXF_FILE_NAME: &str = "social-graph.gexf";
pub const SOCIAL_GRAPH_GRAPHML_FILE_NAME: &str = "social-graph.graphml";
pub const SOCIAL_GRAPH_HTML_FILE_NAME: &str = "social-graph.html";
/// Loaded by the html page, the name is fixed in its markup.
pub const SOCIAL_GRAPH_SCRIPT_FILE_NAME: &str = "social-graph.js";

const REPORT_LIST_LENGTH: usize = 10;
const DIAGRAM_USERS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to create output directory: {0}")]
    CreateDir(#[source] io::Error),
    #[error("Failed to write to file: {0}")]
    WriteFile(#[source] io::Error),
    #[error("Failed to serialize JSON to string: {0}")]
    JsonToString(#[source] serde_json::Error),
}

pub struct Config {
    base_dir: PathBuf,
}

impl Config {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Config {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

pub async fn prepare_output_dir(config: &Config) -> Result<(), Error> {
    let Config { base_dir } = config;
    create_dir_all(base_dir).await.map_err(Error::CreateDir)?;
    Ok(())
}

async fn write_file(config: &Config, file_name: &str, contents: String) -> Result<(), Error> {
    let Config { base_dir } = config;
    let path = base_dir.join(file_name);

    write(&path, contents).await.map_err(Error::WriteFile)?;
    debug!("wrote {}", path.display());

    Ok(())
}

async fn write_json<T: Serialize>(config: &Config, file_name: &str, value: &T) -> Result<(), Error> {
    let json = to_string_pretty(value).map_err(Error::JsonToString)?;
    write_file(config, file_name, json).await
}

/// Every retained author with all counters, in display order.
pub async fn write_authors_json(config: &Config, snapshot: &Snapshot) -> Result<(), Error> {
    write_json(config, AUTHORS_FILE_NAME, snapshot).await
}

pub async fn write_ranking_json(config: &Config, ranking: &Ranking) -> Result<(), Error> {
    write_json(config, &ranking.file_name(), ranking).await
}

pub async fn write_rankings_json(config: &Config, rankings: &[Ranking]) -> Result<(), Error> {
    for ranking in rankings {
        write_ranking_json(config, ranking).await?;
    }
    info!(
        "wrote {} rankings to {}",
        rankings.len(),
        config.base_dir.display()
    );
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialGraphReport {
    pub statistics: NetworkStatistics,
    pub most_connected_users: Vec<UserConnection>,
    pub mutual_relationships: Vec<MutualMentionRelationship>,
    pub graph: GraphExport,
}

impl SocialGraphReport {
    pub fn build(snapshot: &Snapshot) -> Self {
        SocialGraphReport {
            statistics: network_statistics(snapshot),
            most_connected_users: most_connected_users(snapshot),
            mutual_relationships: mutual_mention_relationships(snapshot),
            graph: export_graph(snapshot),
        }
    }
}

pub async fn write_social_graph_json(
    config: &Config,
    report: &SocialGraphReport,
) -> Result<(), Error> {
    write_json(config, SOCIAL_GRAPH_JSON_FILE_NAME, report).await
}

pub async fn write_social_graph_text(config: &Config, snapshot: &Snapshot) -> Result<(), Error> {
    write_file(config, SOCIAL_GRAPH_TEXT_FILE_NAME, render_text_report(snapshot)).await
}

pub async fn write_social_graph_gexf(config: &Config, graph: &GraphExport) -> Result<(), Error> {
    write_file(config, SOCIAL_GRAPH_GEXF_FILE_NAME, render_gexf(graph)).await
}

pub async fn write_social_graph_graphml(config: &Config, graph: &GraphExport) -> Result<(), Error> {
    write_file(config, SOCIAL_GRAPH_GRAPHML_FILE_NAME, render_graphml(graph)).await
}

/// Writes the html page and the script it loads.
pub async fn write_social_graph_html(
    config: &Config,
    report: &SocialGraphReport,
) -> Result<(), Error> {
    let script = render_graph_script(&report.graph).map_err(Error::JsonToString)?;
    write_file(config, SOCIAL_GRAPH_SCRIPT_FILE_NAME, script).await?;

    let page = render_html_page(report).to_string();
    write_file(config, SOCIAL_GRAPH_HTML_FILE_NAME, page).await
}

fn nickname_of<'a>(snapshot: &'a Snapshot, id: &AuthorId) -> &'a str {
    snapshot
        .get(id)
        .map(|aggregate| aggregate.author().display_name())
        .unwrap_or("Unknown")
}

pub fn render_text_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_text_report(&mut out, snapshot);
    out
}

fn write_text_report(out: &mut String, snapshot: &Snapshot) -> std::fmt::Result {
    let stats = network_statistics(snapshot);
    writeln!(out, "=== SOCIAL GRAPH ANALYSIS ===")?;
    writeln!(out)?;
    writeln!(out, "Network Statistics:")?;
    writeln!(out, "- Total Users: {}", stats.total_users)?;
    writeln!(out, "- Total Mentions: {}", stats.total_mentions)?;
    writeln!(out, "- Total Connections: {}", stats.total_connections)?;
    writeln!(
        out,
        "- Avg Connections/User: {:.2}",
        stats.average_connections_per_user
    )?;
    writeln!(out, "- Avg Mentions/User: {:.2}", stats.average_mentions_per_user)?;
    writeln!(out)?;

    let most_connected = most_connected_users(snapshot);
    writeln!(out, "=== MOST CONNECTED USERS ===")?;
    for (rank, user) in most_connected.iter().take(REPORT_LIST_LENGTH).enumerate() {
        writeln!(
            out,
            "{:>2}. {:<20} (Connections: {}, Sent: {}, Received: {})",
            rank + 1,
            nickname_of(snapshot, &user.author_id),
            user.total_connections(),
            user.total_mentions_sent,
            user.total_mentions_received
        )?;
    }

    writeln!(out)?;
    writeln!(out, "=== TOP MUTUAL RELATIONSHIPS ===")?;
    let mutual = mutual_mention_relationships(snapshot);
    for (rank, relationship) in mutual.iter().take(REPORT_LIST_LENGTH).enumerate() {
        let first = nickname_of(snapshot, &relationship.user1_id);
        let second = nickname_of(snapshot, &relationship.user2_id);
        writeln!(
            out,
            "{:>2}. {}→{}: {}, {}→{}: {} (Total: {})",
            rank + 1,
            first,
            second,
            relationship.user1_to_user2_mentions,
            second,
            first,
            relationship.user2_to_user1_mentions,
            relationship.total_mentions()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "=== NETWORK DIAGRAM ===")?;
    for user in most_connected.iter().take(DIAGRAM_USERS) {
        write!(out, "{:<15}", nickname_of(snapshot, &user.author_id))?;

        // first of the heaviest retained targets in id order
        let top = snapshot.get(&user.author_id).and_then(|aggregate| {
            aggregate
                .mentions_sent
                .iter()
                .filter(|&(target, _)| snapshot.contains(target))
                .rev()
                .max_by_key(|&(_, count)| *count)
        });
        if let Some((target, count)) = top {
            write!(out, " ──→ {} ({})", nickname_of(snapshot, target), count)?;
        }
        writeln!(out)?;
    }

    Ok(())
}
