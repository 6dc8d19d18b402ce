//! Statistics generation from the article database
//!
//! This module provides functionality for extracting and displaying
//! indexing statistics from the storage layer.

use crate::storage::{RunRecord, Storage};
use crate::NewsError;
use chrono::DateTime;

/// Statistics for one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatistics {
    pub group: String,

    /// Number of articles stored for the group
    pub articles: u64,

    /// Posting time of the newest stored article, seconds since the epoch
    pub newest: Option<i64>,
}

/// Indexing statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,

    /// One entry per group, configured groups first
    pub groups: Vec<GroupStatistics>,
}

impl IndexStatistics {
    pub fn total_articles(&self) -> u64 {
        self.groups.iter().map(|g| g.articles).sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `configured` - Groups named in the configuration; reported even when
///   nothing has been stored for them yet
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(NewsError)` - Failed to query statistics
pub fn load_statistics(
    storage: &dyn Storage,
    configured: &[String],
) -> Result<IndexStatistics, NewsError> {
    let mut names: Vec<String> = configured.to_vec();
    for group in storage.list_groups()? {
        if !names.contains(&group) {
            names.push(group);
        }
    }

    let groups = names
        .into_iter()
        .map(|group| {
            Ok(GroupStatistics {
                articles: storage.count_articles(&group)?,
                newest: storage.newest_timestamp(&group)?,
                group,
            })
        })
        .collect::<Result<Vec<_>, NewsError>>()?;

    Ok(IndexStatistics {
        latest_run: storage.get_latest_run()?,
        groups,
    })
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Index Statistics ===\n");

    match &stats.latest_run {
        Some(run) => {
            println!("Latest run: #{} started {}", run.id, run.started_at);
            println!("  Config hash: {}", run.config_hash);
            println!("  Groups: {}", run.groups.join(", "));
        }
        None => println!("No runs recorded"),
    }
    println!();

    println!("Groups ({}):", stats.groups.len());
    for group in &stats.groups {
        let newest = group
            .newest
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}: {} articles, newest {}",
            group.group, group.articles, newest
        );
    }
    println!();

    println!("Total articles: {}", stats.total_articles());
}
