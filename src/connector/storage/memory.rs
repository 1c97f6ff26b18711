//! In-memory multi-index storage for parsed Java API entities.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::{IndexStatistics, JavaClass, JavaMethod, MethodMatch};

/// Cross-referenced lookup structures over an evolving, repository-partitioned
/// set of classes and methods.
///
/// Every class inserted through [`add_class`](ApiIndex::add_class) appears in
/// the primary FQN map and in the simple-name, package, and repository lists;
/// every one of its methods appears in the method-name postings and in the
/// per-class method list. Removal updates all structures in one call.
#[derive(Debug, Default)]
pub struct ApiIndex {
    /// Fully-qualified name -> class (primary).
    classes: HashMap<String, JavaClass>,
    /// Simple class name -> classes sharing it.
    by_simple_name: HashMap<String, Vec<JavaClass>>,
    /// Package name -> classes in the package.
    by_package: HashMap<String, Vec<JavaClass>>,
    /// Repository URL -> classes attributed to it.
    by_repository: HashMap<String, Vec<JavaClass>>,
    /// Method name -> (class, method) pairs across all classes.
    method_postings: HashMap<String, Vec<MethodMatch>>,
    /// Class FQN -> its methods.
    class_methods: HashMap<String, Vec<JavaMethod>>,
    built: bool,
}

impl ApiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a class into every lookup structure.
    ///
    /// Re-adding a fully-qualified name overwrites the primary entry
    /// (last write wins) while the simple-name, package, and repository
    /// lists keep both entries; callers indexing the same FQN from two
    /// repositories should expect the primary lookup to reflect whichever
    /// repository was indexed last.
    pub fn add_class(&mut self, class: JavaClass, repository_url: &str) {
        let fqn = class.fully_qualified_name.clone();

        for method in &class.methods {
            self.method_postings
                .entry(method.name.clone())
                .or_default()
                .push(MethodMatch::new(class.clone(), method.clone()));
        }
        self.class_methods
            .insert(fqn.clone(), class.methods.clone());

        self.by_simple_name
            .entry(class.name.clone())
            .or_default()
            .push(class.clone());
        self.by_package
            .entry(class.package.clone())
            .or_default()
            .push(class.clone());
        self.by_repository
            .entry(repository_url.to_string())
            .or_default()
            .push(class.clone());

        self.classes.insert(fqn, class);
        self.built = true;
    }

    pub fn add_classes(&mut self, classes: Vec<JavaClass>, repository_url: &str) {
        info!(
            "Indexing {} classes from {}",
            classes.len(),
            repository_url
        );
        for class in classes {
            self.add_class(class, repository_url);
        }
        debug!(
            "Indexing complete: {} classes, {} methods total",
            self.total_classes(),
            self.total_methods()
        );
    }

    /// Bulk-replace every entry attributed to a repository with a freshly
    /// parsed set. Implemented as remove-then-add; the caller's write lock
    /// makes the pair appear atomic to readers.
    pub fn reindex_repository(&mut self, repository_url: &str, classes: Vec<JavaClass>) {
        info!(
            "Re-indexing repository {} with {} classes",
            repository_url,
            classes.len()
        );
        self.remove_repository(repository_url);
        self.add_classes(classes, repository_url);
    }

    /// Purge every class attributed to a repository from all structures.
    ///
    /// List entries are filtered by owning-class FQN, so method-name postings
    /// contributed by other classes survive. Emptied keys are pruned so the
    /// package and name counts only reflect live entries. Unknown URLs are a
    /// no-op. The readiness flag is not reset; only [`clear`](ApiIndex::clear)
    /// does that.
    pub fn remove_repository(&mut self, repository_url: &str) {
        let Some(removed) = self.by_repository.remove(repository_url) else {
            debug!(
                "Repository not in index, skipping removal: {}",
                repository_url
            );
            return;
        };

        debug!(
            "Removing {} classes from index for {}",
            removed.len(),
            repository_url
        );

        for class in &removed {
            let fqn = &class.fully_qualified_name;
            self.classes.remove(fqn);
            self.class_methods.remove(fqn);

            if let Some(entries) = self.by_simple_name.get_mut(&class.name) {
                entries.retain(|c| &c.fully_qualified_name != fqn);
                if entries.is_empty() {
                    self.by_simple_name.remove(&class.name);
                }
            }

            if let Some(entries) = self.by_package.get_mut(&class.package) {
                entries.retain(|c| &c.fully_qualified_name != fqn);
                if entries.is_empty() {
                    self.by_package.remove(&class.package);
                }
            }

            for method in &class.methods {
                if let Some(entries) = self.method_postings.get_mut(&method.name) {
                    entries.retain(|m| &m.class.fully_qualified_name != fqn);
                    if entries.is_empty() {
                        self.method_postings.remove(&method.name);
                    }
                }
            }
        }
    }

    pub fn class_by_fqn(&self, fully_qualified_name: &str) -> Option<&JavaClass> {
        self.classes.get(fully_qualified_name)
    }

    pub fn classes_by_name(&self, class_name: &str) -> &[JavaClass] {
        self.by_simple_name
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn classes_by_package(&self, package_name: &str) -> &[JavaClass] {
        self.by_package
            .get(package_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn classes_by_repository(&self, repository_url: &str) -> &[JavaClass] {
        self.by_repository
            .get(repository_url)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn methods_by_name(&self, method_name: &str) -> &[MethodMatch] {
        self.method_postings
            .get(method_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn methods_by_class(&self, fully_qualified_name: &str) -> &[JavaMethod] {
        self.class_methods
            .get(fully_qualified_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_classes(&self) -> impl Iterator<Item = &JavaClass> {
        self.classes.values()
    }

    /// (FQN, class) pairs, for scans that compare keys case-insensitively.
    pub fn fqn_entries(&self) -> impl Iterator<Item = (&String, &JavaClass)> {
        self.classes.iter()
    }

    /// (simple name, classes) pairs.
    pub fn simple_name_entries(&self) -> impl Iterator<Item = (&String, &Vec<JavaClass>)> {
        self.by_simple_name.iter()
    }

    /// (method name, postings) pairs.
    pub fn method_name_entries(&self) -> impl Iterator<Item = (&String, &Vec<MethodMatch>)> {
        self.method_postings.iter()
    }

    pub fn total_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn total_methods(&self) -> usize {
        self.class_methods.values().map(Vec::len).sum()
    }

    pub fn total_repositories(&self) -> usize {
        self.by_repository.len()
    }

    pub fn total_packages(&self) -> usize {
        self.by_package.len()
    }

    pub fn statistics(&self) -> IndexStatistics {
        IndexStatistics {
            total_classes: self.total_classes(),
            total_methods: self.total_methods(),
            total_repositories: self.total_repositories(),
            total_packages: self.total_packages(),
        }
    }

    /// True once any class has ever been added; a readiness gate, not a live
    /// count. Removal does not reset it.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Empty all structures and reset the readiness flag.
    pub fn clear(&mut self) {
        info!(
            "Clearing index: {} classes, {} methods",
            self.total_classes(),
            self.total_methods()
        );
        self.classes.clear();
        self.by_simple_name.clear();
        self.by_package.clear();
        self.by_repository.clear();
        self.method_postings.clear();
        self.class_methods.clear();
        self.built = false;
    }
}
