use chat_db::{analyze, load_channels, Analysis};
use chat_query::{build_rankings, Ranking, RankingKind};
use log::{info, warn};
use progress_bar::*;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

mod config;
use config::Config;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Failed to analyze logs, cause: {0}")]
    Db(#[from] chat_db::Error),
    #[error("Failed to write output, cause: {0}")]
    Pages(#[from] chat_pages::Error),
    #[error("Analysis task failed, cause: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Failed to build worker pool, cause: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::from_env();
    info!("{:?}", config);

    if let Some(threads) = config.worker_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    init_progress_bar(config.log_dirs.len());
    set_progress_bar_action("Archiving", Color::Blue, Style::Bold);

    for log_dir in config.log_dirs.iter() {
        archive_folder(&config, log_dir).await?;
        inc_progress_bar();
    }

    finalize_progress_bar();
    Ok(())
}

/// Load, analyze, rank and write one log folder.
async fn archive_folder(config: &Config, log_dir: &Path) -> Result<(), Error> {
    info!("archiving {}", log_dir.display());

    let dir = log_dir.to_path_buf();
    let output_subfolder = config.output_subfolder.clone();
    let analysis_config = config.analysis.clone();

    // loading and ranking run on the rayon pool, off the async runtime
    let (analysis, rankings, failed) = tokio::task::spawn_blocking(
        move || -> Result<(Analysis, Vec<Ranking>, Vec<PathBuf>), chat_db::Error> {
            let loaded = load_channels(&dir, &output_subfolder)?;
            let analysis = analyze(&loaded.channels, analysis_config.clone());
            analysis.snapshot.verify()?;
            let rankings = build_rankings(&RankingKind::ALL, &analysis.snapshot, &analysis_config);
            Ok((analysis, rankings, loaded.failed))
        },
    )
    .await??;

    for path in failed.iter() {
        warn!("could not read {}", path.display());
    }

    let Analysis { snapshot, report } = analysis;
    info!(
        "{}: {} channels, {} messages recorded, {} skipped, {} authors kept",
        log_dir.display(),
        report.channels,
        report.messages_recorded,
        report.messages_skipped,
        snapshot.len()
    );

    let pages = chat_pages::Config::new(log_dir.join(&config.output_subfolder));
    chat_pages::prepare_output_dir(&pages).await?;
    chat_pages::write_authors_json(&pages, &snapshot).await?;
    chat_pages::write_rankings_json(&pages, &rankings).await?;
    let social_graph = chat_pages::SocialGraphReport::build(&snapshot);
    chat_pages::write_social_graph_json(&pages, &social_graph).await?;
    chat_pages::write_social_graph_text(&pages, &snapshot).await?;
    chat_pages::write_social_graph_gexf(&pages, &social_graph.graph).await?;
    chat_pages::write_social_graph_graphml(&pages, &social_graph.graph).await?;
    chat_pages::write_social_graph_html(&pages, &social_graph).await?;

    info!("wrote output to {}", pages.base_dir().display());
    Ok(())
}
