//! Git-backed repository synchronization.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{BranchType, ErrorCode, FetchOptions, ObjectType, Repository, ResetType};
use tracing::{debug, info, warn};

use crate::domain::{DomainError, RepositoryRecord, RepositorySource, SyncOutcome, SyncStatus};

/// Keeps local clones of configured repositories current.
///
/// One [`RepositoryRecord`] is tracked per distinct URL; records are created
/// on the first attempt and mutated in place on every later one. Batch
/// processing never aborts on an individual failure.
pub struct RepositorySyncManager {
    base_dir: PathBuf,
    clone_depth: Option<i32>,
    records: HashMap<String, RepositoryRecord>,
}

impl RepositorySyncManager {
    /// Create a manager rooted at `base_dir`, creating the directory if
    /// missing. Clones are shallow (depth 1) by default.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        if !base_dir.is_dir() {
            return Err(DomainError::invalid_input(format!(
                "base path is not a directory: {}",
                base_dir.display()
            )));
        }

        Ok(Self {
            base_dir,
            clone_depth: Some(1),
            records: HashMap::new(),
        })
    }

    /// Override the clone depth; `None` clones full history. Useful for
    /// transports that do not support shallow fetches.
    pub fn with_clone_depth(mut self, depth: Option<i32>) -> Self {
        self.clone_depth = depth;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn record(&self, url: &str) -> Option<&RepositoryRecord> {
        self.records.get(url)
    }

    pub fn records(&self) -> impl Iterator<Item = &RepositoryRecord> {
        self.records.values()
    }

    /// Deterministic clone location for a URL: an `owner_repo` slug under
    /// the base directory, with any `.git` suffix stripped.
    ///
    /// Two hosts serving the same owner/repo pair collide on the same slug;
    /// accepted limitation.
    pub fn derive_local_path(&self, url: &str) -> PathBuf {
        self.base_dir.join(repository_slug(url))
    }

    /// True only if the record's local path is a directory containing a
    /// `.git` entry. I/O errors while checking are treated as absence.
    pub fn repository_exists(&self, record: &RepositoryRecord) -> bool {
        let meta = match fs::metadata(&record.local_path) {
            Ok(meta) => meta,
            Err(_) => return false,
        };
        if !meta.is_dir() {
            warn!(
                "Local path exists but is not a directory: {}",
                record.local_path.display()
            );
            return false;
        }
        match fs::metadata(record.local_path.join(".git")) {
            Ok(_) => true,
            Err(_) => {
                warn!(
                    "Directory exists but is not a git repository: {}",
                    record.local_path.display()
                );
                false
            }
        }
    }

    /// Clone the record's URL into its local path, destroying whatever
    /// occupies the path first.
    ///
    /// On success the record carries the new commit hash, both timestamps,
    /// and the branch that was actually checked out.
    pub fn clone_repository(&self, record: &mut RepositoryRecord) -> Result<(), DomainError> {
        info!(
            "Cloning {} into {}",
            record.url,
            record.local_path.display()
        );
        record.status = SyncStatus::Cloning;

        match self.clone_inner(record) {
            Ok(commit_hash) => {
                record.mark_cloned(commit_hash);
                info!("Successfully cloned {}", record.url);
                Ok(())
            }
            Err(err) => {
                record.mark_failed();
                Err(err)
            }
        }
    }

    fn clone_inner(&self, record: &mut RepositoryRecord) -> Result<Option<String>, DomainError> {
        if record.local_path.exists() {
            warn!(
                "Target directory already occupied, removing: {}",
                record.local_path.display()
            );
            fs::remove_dir_all(&record.local_path).map_err(|e| {
                DomainError::clone_failed(
                    format!(
                        "cannot remove existing directory {}",
                        record.local_path.display()
                    ),
                    Some(e.to_string()),
                )
            })?;
        }
        if let Some(parent) = record.local_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::clone_failed(
                    format!("cannot create parent directory for {}", record.local_path.display()),
                    Some(e.to_string()),
                )
            })?;
        }

        let branch = record.branch.as_deref();
        let repo = match clone_with_depth(&record.url, &record.local_path, branch, self.clone_depth)
        {
            Ok(repo) => repo,
            Err(shallow_err) if self.clone_depth.is_some() => {
                // Some transports reject shallow fetches; retry with full history.
                warn!(
                    "Shallow clone of {} failed ({}), retrying with full history",
                    record.url,
                    shallow_err.message()
                );
                let _ = fs::remove_dir_all(&record.local_path);
                clone_with_depth(&record.url, &record.local_path, branch, None)
                    .map_err(|e| classify_clone_error(&record.url, &e))?
            }
            Err(e) => return Err(classify_clone_error(&record.url, &e)),
        };

        if record.branch.is_none() {
            record.branch = repo.head().ok().and_then(|h| h.shorthand().map(String::from));
        }
        Ok(head_commit_hash(&repo))
    }

    /// Bring an existing clone up to date with its remote.
    ///
    /// Validates the configured `origin` URL, fetches, reconciles the
    /// checked-out branch, then hard-resets to `origin/<branch>`. Local
    /// modifications are intentionally discarded, never merged.
    pub fn sync_repository(&self, record: &mut RepositoryRecord) -> Result<(), DomainError> {
        info!(
            "Syncing {} at {}",
            record.url,
            record.local_path.display()
        );
        record.status = SyncStatus::Syncing;

        match self.sync_inner(record) {
            Ok(commit_hash) => {
                record.mark_synced(commit_hash);
                info!("Successfully synced {}", record.url);
                Ok(())
            }
            Err(err) => {
                record.mark_failed();
                Err(err)
            }
        }
    }

    fn sync_inner(&self, record: &mut RepositoryRecord) -> Result<Option<String>, DomainError> {
        let repo = Repository::open(&record.local_path).map_err(|e| {
            DomainError::sync_failed(
                format!("cannot open repository at {}", record.local_path.display()),
                Some(e.message().to_string()),
            )
        })?;

        {
            let remote = repo.find_remote("origin").map_err(|e| {
                DomainError::sync_failed(
                    "repository has no origin remote",
                    Some(e.message().to_string()),
                )
            })?;
            let remote_url = remote.url().unwrap_or_default();
            if !remote_urls_match(remote_url, &record.url) {
                return Err(DomainError::sync_failed(
                    format!(
                        "remote URL mismatch: expected {}, found {}",
                        record.url, remote_url
                    ),
                    None,
                ));
            }
        }

        let head_branch = repo.head().ok().and_then(|h| h.shorthand().map(String::from));
        let branch = record
            .branch
            .clone()
            .or_else(|| head_branch.clone())
            .unwrap_or_else(|| "main".to_string());

        {
            let mut remote = repo.find_remote("origin").map_err(|e| {
                DomainError::sync_failed(
                    "repository has no origin remote",
                    Some(e.message().to_string()),
                )
            })?;
            let mut fetch_options = FetchOptions::new();
            // Fetch straight into the origin/<branch> tracking ref the reset
            // below targets.
            let refspec = format!("+refs/heads/{0}:refs/remotes/origin/{0}", branch);
            remote
                .fetch(&[refspec.as_str()], Some(&mut fetch_options), None)
                .map_err(|e| {
                    DomainError::sync_failed(
                        format!("failed to fetch {} from origin", branch),
                        Some(e.message().to_string()),
                    )
                })?;
        }

        if head_branch.as_deref() != Some(branch.as_str()) {
            checkout_branch(&repo, &branch)?;
        }

        let tracking = format!("origin/{}", branch);
        let target = repo.find_branch(&tracking, BranchType::Remote).map_err(|e| {
            DomainError::sync_failed(
                format!("cannot resolve {}", tracking),
                Some(e.message().to_string()),
            )
        })?;
        let object = target.get().peel(ObjectType::Commit).map_err(|e| {
            DomainError::sync_failed(
                format!("cannot resolve {}", tracking),
                Some(e.message().to_string()),
            )
        })?;
        repo.reset(&object, ResetType::Hard, None).map_err(|e| {
            DomainError::sync_failed(
                format!("failed to reset to {}", tracking),
                Some(e.message().to_string()),
            )
        })?;

        if record.branch.is_none() {
            record.branch = Some(branch);
        }
        Ok(head_commit_hash(&repo))
    }

    /// Process every source in input order, cloning or syncing as needed.
    ///
    /// Every error, git-level or otherwise, is converted into a failure
    /// outcome; the batch always yields exactly one outcome per source.
    pub fn sync_all(&mut self, sources: &[RepositorySource]) -> Vec<SyncOutcome> {
        info!(
            "Processing {} repositories under {}",
            sources.len(),
            self.base_dir.display()
        );

        let mut outcomes = Vec::with_capacity(sources.len());
        for source in sources {
            let mut record = self.records.remove(&source.url).unwrap_or_else(|| {
                RepositoryRecord::new(
                    source.url.clone(),
                    self.derive_local_path(&source.url),
                    source.branch.clone(),
                )
            });
            if source.branch.is_some() {
                record.branch = source.branch.clone();
            }

            let existed = self.repository_exists(&record);
            let result = if existed {
                debug!("Repository exists locally, syncing: {}", source.url);
                self.sync_repository(&mut record)
            } else {
                debug!("Repository does not exist locally, cloning: {}", source.url);
                self.clone_repository(&mut record)
            };

            let outcome = match result {
                Ok(()) => {
                    let message = if existed {
                        format!("repository synchronized at {}", record.local_path.display())
                    } else {
                        format!("repository cloned to {}", record.local_path.display())
                    };
                    SyncOutcome::succeeded(record.clone(), message)
                }
                Err(err) => {
                    warn!("Repository operation failed for {}: {}", source.url, err);
                    let detail = err.detail().map(String::from);
                    SyncOutcome::failed(record.clone(), err.to_string(), detail)
                }
            };
            self.records.insert(source.url.clone(), record);
            outcomes.push(outcome);
        }

        let successful = outcomes.iter().filter(|o| o.success).count();
        info!(
            "Repository processing completed: {} successful, {} failed",
            successful,
            outcomes.len() - successful
        );
        outcomes
    }
}

fn clone_with_depth(
    url: &str,
    path: &Path,
    branch: Option<&str>,
    depth: Option<i32>,
) -> Result<Repository, git2::Error> {
    let mut fetch_options = FetchOptions::new();
    if let Some(depth) = depth {
        fetch_options.depth(depth);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = branch {
        builder.branch(branch);
        // Single-branch clone: fetch only the requested head.
        let refspec = format!("+refs/heads/{branch}:refs/remotes/origin/{branch}");
        builder.remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec));
    }
    builder.clone(url, path)
}

fn checkout_branch(repo: &Repository, branch: &str) -> Result<(), DomainError> {
    if repo.find_branch(branch, BranchType::Local).is_err() {
        // No local branch yet: create one tracking origin/<branch>.
        let tracking = format!("origin/{}", branch);
        let upstream = repo.find_branch(&tracking, BranchType::Remote).map_err(|e| {
            DomainError::sync_failed(
                format!("cannot checkout branch {}: no local branch or {}", branch, tracking),
                Some(e.message().to_string()),
            )
        })?;
        let commit = upstream.get().peel_to_commit().map_err(|e| {
            DomainError::sync_failed(
                format!("cannot resolve {} to a commit", tracking),
                Some(e.message().to_string()),
            )
        })?;
        let mut created = repo.branch(branch, &commit, false).map_err(|e| {
            DomainError::sync_failed(
                format!("cannot create local branch {}", branch),
                Some(e.message().to_string()),
            )
        })?;
        created.set_upstream(Some(&tracking)).map_err(|e| {
            DomainError::sync_failed(
                format!("cannot set upstream for {}", branch),
                Some(e.message().to_string()),
            )
        })?;
        debug!("Created local branch {} from {}", branch, tracking);
    }

    repo.set_head(&format!("refs/heads/{}", branch)).map_err(|e| {
        DomainError::sync_failed(
            format!("cannot checkout branch {}", branch),
            Some(e.message().to_string()),
        )
    })?;
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_head(Some(&mut checkout)).map_err(|e| {
        DomainError::sync_failed(
            format!("cannot checkout branch {}", branch),
            Some(e.message().to_string()),
        )
    })?;
    Ok(())
}

fn head_commit_hash(repo: &Repository) -> Option<String> {
    repo.head()
        .ok()?
        .peel_to_commit()
        .ok()
        .map(|c| c.id().to_string())
}

fn classify_clone_error(url: &str, err: &git2::Error) -> DomainError {
    let message = err.message().to_string();
    let lowered = message.to_lowercase();
    let not_found = err.code() == ErrorCode::NotFound
        || lowered.contains("not found")
        || lowered.contains("does not exist")
        || lowered.contains("404");

    if not_found {
        DomainError::repository_not_found(
            format!("repository not accessible: {}", url),
            Some(message),
        )
    } else {
        DomainError::clone_failed(format!("git clone of {} failed", url), Some(message))
    }
}

/// Compare remote URLs, treating a trailing `.git` as optional on either side.
fn remote_urls_match(configured: &str, expected: &str) -> bool {
    let strip = |url: &str| url.strip_suffix(".git").map(String::from).unwrap_or_else(|| url.to_string());
    strip(configured) == strip(expected)
}

/// `owner_repo` directory name for a repository URL, `.git` suffix stripped.
fn repository_slug(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let (host, path) = match trimmed.split_once("://") {
        Some((_, rest)) => match rest.split_once('/') {
            Some((host, path)) => (Some(host), path),
            None => (Some(rest), ""),
        },
        None => (None, trimmed),
    };

    let strip_git = |name: &str| name.strip_suffix(".git").unwrap_or(name).to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., owner, name] => format!("{}_{}", owner, strip_git(name)),
        [name] if host.is_none() => strip_git(name),
        _ => host.unwrap_or("repository").replace('.', "_"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_is_deterministic() {
        let url = "https://github.com/acme/widgets.git";
        assert_eq!(repository_slug(url), repository_slug(url));
    }

    #[test]
    fn test_slug_from_https_url() {
        assert_eq!(
            repository_slug("https://github.com/acme/widgets"),
            "acme_widgets"
        );
    }

    #[test]
    fn test_slug_strips_git_suffix_and_trailing_slash() {
        assert_eq!(
            repository_slug("https://github.com/acme/widgets.git/"),
            "acme_widgets"
        );
    }

    #[test]
    fn test_slug_host_fallback() {
        assert_eq!(
            repository_slug("https://git.example.org"),
            "git_example_org"
        );
    }

    #[test]
    fn test_slug_from_filesystem_path() {
        assert_eq!(repository_slug("/srv/mirrors/acme/widgets"), "acme_widgets");
    }

    #[test]
    fn test_remote_urls_match_optional_git_suffix() {
        assert!(remote_urls_match("https://h/a/b.git", "https://h/a/b"));
        assert!(remote_urls_match("https://h/a/b", "https://h/a/b.git"));
        assert!(remote_urls_match("https://h/a/b", "https://h/a/b"));
        assert!(!remote_urls_match("https://h/a/b", "https://h/a/c"));
    }

    #[test]
    fn test_classify_not_found_errors() {
        let err = git2::Error::new(
            git2::ErrorCode::GenericError,
            git2::ErrorClass::Http,
            "unexpected http status code: 404",
        );
        assert!(classify_clone_error("u", &err).is_not_found());

        let err = git2::Error::new(
            git2::ErrorCode::GenericError,
            git2::ErrorClass::Http,
            "remote repository does not exist",
        );
        assert!(classify_clone_error("u", &err).is_not_found());
    }

    #[test]
    fn test_classify_other_clone_errors() {
        let err = git2::Error::new(
            git2::ErrorCode::GenericError,
            git2::ErrorClass::Net,
            "connection refused",
        );
        assert!(classify_clone_error("u", &err).is_clone_failed());
    }

    #[test]
    fn test_exists_is_false_for_missing_and_plain_dirs() {
        let base = tempfile::tempdir().unwrap();
        let manager = RepositorySyncManager::new(base.path()).unwrap();

        let missing = RepositoryRecord::new("u", base.path().join("absent"), None);
        assert!(!manager.repository_exists(&missing));

        let plain = base.path().join("plain");
        fs::create_dir_all(&plain).unwrap();
        let record = RepositoryRecord::new("u", plain, None);
        assert!(!manager.repository_exists(&record));
    }

    #[test]
    fn test_exists_requires_git_marker() {
        let base = tempfile::tempdir().unwrap();
        let manager = RepositorySyncManager::new(base.path()).unwrap();

        let repo_dir = base.path().join("repo");
        fs::create_dir_all(repo_dir.join(".git")).unwrap();
        let record = RepositoryRecord::new("u", repo_dir, None);
        assert!(manager.repository_exists(&record));
    }

    #[test]
    fn test_new_creates_base_dir() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("a").join("b");
        let manager = RepositorySyncManager::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(manager.base_dir(), nested.as_path());
    }

    #[test]
    fn test_derive_local_path_under_base_dir() {
        let base = tempfile::tempdir().unwrap();
        let manager = RepositorySyncManager::new(base.path()).unwrap();

        let path = manager.derive_local_path("https://github.com/acme/widgets.git");
        assert_eq!(path, base.path().join("acme_widgets"));
    }
}
