use chat_msg::Channel;
use itertools::{Either, Itertools};
use log::{info, trace, warn};
use rayon::prelude::*;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::Error;

/// Every `.json` file under `dir`, skipping the output subfolder, sorted.
pub fn discover_log_paths(dir: &Path, output_subfolder: &str) -> Result<Vec<PathBuf>, Error> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != output_subfolder)
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().map_or(false, |ext| ext == "json") {
            trace!("found log {}", path.display());
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

pub fn read_channel(path: &Path) -> Result<Channel, Error> {
    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let channel = serde_json::from_reader(BufReader::new(file))?;
    Ok(channel)
}

#[derive(Debug, Default)]
pub struct LoadedChannels {
    pub channels: Vec<Channel>,
    pub failed: Vec<PathBuf>,
}

/// Decodes every discovered log in parallel. Files that fail to decode are
/// logged and reported back instead of aborting the load.
pub fn load_channels(dir: &Path, output_subfolder: &str) -> Result<LoadedChannels, Error> {
    let paths = discover_log_paths(dir, output_subfolder)?;
    info!("loading {} logs from {}", paths.len(), dir.display());

    let results: Vec<(PathBuf, Result<Channel, Error>)> = paths
        .into_par_iter()
        .map(|path| {
            let result = read_channel(&path);
            (path, result)
        })
        .collect();

    let (channels, failed): (Vec<Channel>, Vec<PathBuf>) =
        results
            .into_iter()
            .partition_map(|(path, result)| match result {
                Ok(channel) => Either::Left(channel),
                Err(error) => {
                    warn!("skipping log {}: {}", path.display(), error);
                    Either::Right(path)
                }
            });

    Ok(LoadedChannels { channels, failed })
}
