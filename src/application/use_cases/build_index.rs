use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::application::ParserService;
use crate::connector::{ApiIndex, RepositorySyncManager};
use crate::domain::{DomainError, JavaClass, RepositorySource, SyncOutcome};

/// Synchronize every source, parse the clones, and rebuild the index.
///
/// Per-file read and parse failures are logged and skipped; per-repository
/// sync failures are carried in the report's outcomes. The batch itself
/// never aborts.
pub struct BuildIndexUseCase {
    sync_manager: Arc<Mutex<RepositorySyncManager>>,
    parser: Arc<dyn ParserService>,
    index: Arc<RwLock<ApiIndex>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildIndexReport {
    pub outcomes: Vec<SyncOutcome>,
    pub parsed_files: usize,
    pub skipped_files: usize,
    pub total_classes: usize,
    pub total_methods: usize,
}

impl BuildIndexUseCase {
    pub fn new(
        sync_manager: Arc<Mutex<RepositorySyncManager>>,
        parser: Arc<dyn ParserService>,
        index: Arc<RwLock<ApiIndex>>,
    ) -> Self {
        Self {
            sync_manager,
            parser,
            index,
        }
    }

    pub async fn execute(
        &self,
        sources: &[RepositorySource],
    ) -> Result<BuildIndexReport, DomainError> {
        let start_time = Instant::now();

        let outcomes = {
            let mut manager = self.sync_manager.lock().await;
            manager.sync_all(sources)
        };

        let mut parsed_files = 0usize;
        let mut skipped_files = 0usize;

        for outcome in outcomes.iter().filter(|o| o.success) {
            let root = outcome.record.local_path.clone();
            let files = java_files(&root);
            info!(
                "Found {} Java files in {}",
                files.len(),
                outcome.url()
            );

            let progress_bar = ProgressBar::new(files.len() as u64);
            progress_bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .expect("Invalid progress bar template")
                    .progress_chars("#>-"),
            );

            let mut classes: Vec<JavaClass> = Vec::new();
            for file in files {
                let relative = file
                    .strip_prefix(&root)
                    .unwrap_or(&file)
                    .to_string_lossy()
                    .to_string();
                progress_bar.set_message(relative.clone());

                let content = match tokio::fs::read_to_string(&file).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Failed to read file {}: {}", relative, e);
                        skipped_files += 1;
                        progress_bar.inc(1);
                        continue;
                    }
                };

                match self.parser.parse_source(&content, &relative).await {
                    Ok(parsed) => {
                        debug!("Parsed {} classes from {}", parsed.len(), relative);
                        classes.extend(parsed);
                        parsed_files += 1;
                    }
                    Err(e) => {
                        warn!("Failed to parse file {}: {}", relative, e);
                        skipped_files += 1;
                    }
                }
                progress_bar.inc(1);
            }
            progress_bar.finish_with_message("done");

            // A repository that synced but yielded nothing is still
            // reindexed, emptying any previous entries.
            let mut index = self.index.write().await;
            index.reindex_repository(outcome.url(), classes);
        }

        let (total_classes, total_methods) = {
            let index = self.index.read().await;
            (index.total_classes(), index.total_methods())
        };

        info!(
            "Index build complete: {} classes, {} methods in {:.2}s",
            total_classes,
            total_methods,
            start_time.elapsed().as_secs_f64()
        );

        Ok(BuildIndexReport {
            outcomes,
            parsed_files,
            skipped_files,
            total_classes,
            total_methods,
        })
    }
}

/// All `.java` files under `root`, skipping the `.git` directory.
fn java_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("java"))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}
