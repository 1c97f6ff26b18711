use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::connector::ApiIndex;
use crate::domain::{DomainError, IndexStatistics, JavaClass, MethodMatch};

/// Read-only search over a shared [`ApiIndex`].
///
/// Every operation except [`statistics`](SearchApiUseCase::statistics)
/// requires the index to have been built at least once and fails with
/// [`DomainError::IndexNotBuilt`] otherwise. Multi-result operations return
/// hits in index insertion order; callers needing a specific order sort on
/// their side.
pub struct SearchApiUseCase {
    index: Arc<RwLock<ApiIndex>>,
}

impl SearchApiUseCase {
    pub fn new(index: Arc<RwLock<ApiIndex>>) -> Self {
        Self { index }
    }

    /// Find methods by exact name, optionally restricted to classes whose
    /// simple name equals `class_name` under the same case rule.
    ///
    /// The case-sensitive path is a single map lookup; the case-insensitive
    /// path scans every distinct method name.
    pub async fn search_methods(
        &self,
        method_name: &str,
        class_name: Option<&str>,
        case_sensitive: bool,
    ) -> Result<Vec<MethodMatch>, DomainError> {
        debug!(
            "Searching methods: name={}, class={:?}, case_sensitive={}",
            method_name, class_name, case_sensitive
        );
        let index = self.index.read().await;
        ensure_built(&index)?;

        let mut matches: Vec<MethodMatch> = if case_sensitive {
            index.methods_by_name(method_name).to_vec()
        } else {
            let needle = method_name.to_lowercase();
            let mut collected = Vec::new();
            for (name, postings) in index.method_name_entries() {
                if name.to_lowercase() == needle {
                    collected.extend(postings.iter().cloned());
                }
            }
            collected
        };

        if let Some(class_name) = class_name {
            if case_sensitive {
                matches.retain(|m| m.class.name == class_name);
            } else {
                let needle = class_name.to_lowercase();
                matches.retain(|m| m.class.name.to_lowercase() == needle);
            }
        }

        debug!("Method search returned {} results", matches.len());
        Ok(matches)
    }

    /// Find methods whose name contains `pattern` under the chosen case rule.
    pub async fn search_methods_partial(
        &self,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<Vec<MethodMatch>, DomainError> {
        debug!(
            "Searching methods partial: pattern={}, case_sensitive={}",
            pattern, case_sensitive
        );
        let index = self.index.read().await;
        ensure_built(&index)?;

        let needle = if case_sensitive {
            pattern.to_string()
        } else {
            pattern.to_lowercase()
        };

        let mut matches = Vec::new();
        for (name, postings) in index.method_name_entries() {
            let haystack = if case_sensitive {
                name.clone()
            } else {
                name.to_lowercase()
            };
            if haystack.contains(&needle) {
                matches.extend(postings.iter().cloned());
            }
        }

        debug!("Partial method search returned {} results", matches.len());
        Ok(matches)
    }

    /// Look up a class by fully-qualified name.
    ///
    /// The case-insensitive path returns the first match in map-iteration
    /// order; ties among differently-cased duplicate FQNs have no defined
    /// winner.
    pub async fn search_class(
        &self,
        fully_qualified_name: &str,
        case_sensitive: bool,
    ) -> Result<Option<JavaClass>, DomainError> {
        let index = self.index.read().await;
        ensure_built(&index)?;

        if case_sensitive {
            return Ok(index.class_by_fqn(fully_qualified_name).cloned());
        }

        let needle = fully_qualified_name.to_lowercase();
        for (fqn, class) in index.fqn_entries() {
            if fqn.to_lowercase() == needle {
                return Ok(Some(class.clone()));
            }
        }
        Ok(None)
    }

    /// Find classes by simple name under the chosen case rule.
    pub async fn classes_by_name(
        &self,
        class_name: &str,
        case_sensitive: bool,
    ) -> Result<Vec<JavaClass>, DomainError> {
        let index = self.index.read().await;
        ensure_built(&index)?;

        if case_sensitive {
            return Ok(index.classes_by_name(class_name).to_vec());
        }

        let needle = class_name.to_lowercase();
        let mut matches = Vec::new();
        for (name, classes) in index.simple_name_entries() {
            if name.to_lowercase() == needle {
                matches.extend(classes.iter().cloned());
            }
        }
        Ok(matches)
    }

    /// All classes attributed to a repository.
    ///
    /// A repository with zero currently-indexed classes (never indexed, or
    /// indexed and later removed) fails with
    /// [`DomainError::RepositoryNotIndexed`].
    pub async fn filter_classes_by_repository(
        &self,
        repository_url: &str,
    ) -> Result<Vec<JavaClass>, DomainError> {
        let index = self.index.read().await;
        ensure_built(&index)?;

        let classes = index.classes_by_repository(repository_url);
        if classes.is_empty() {
            return Err(DomainError::RepositoryNotIndexed(
                repository_url.to_string(),
            ));
        }
        Ok(classes.to_vec())
    }

    /// Classes in a package, optionally intersected with one repository's
    /// class set (by FQN membership).
    pub async fn filter_classes_by_package(
        &self,
        package_name: &str,
        repository_url: Option<&str>,
    ) -> Result<Vec<JavaClass>, DomainError> {
        let index = self.index.read().await;
        ensure_built(&index)?;

        let mut classes = index.classes_by_package(package_name).to_vec();

        if let Some(repository_url) = repository_url {
            let repo_fqns: std::collections::HashSet<&str> = index
                .classes_by_repository(repository_url)
                .iter()
                .map(|c| c.fully_qualified_name.as_str())
                .collect();
            classes.retain(|c| repo_fqns.contains(c.fully_qualified_name.as_str()));
        }

        Ok(classes)
    }

    /// Aggregate counts; side-effect-free and available on an empty index.
    pub async fn statistics(&self) -> IndexStatistics {
        self.index.read().await.statistics()
    }
}

fn ensure_built(index: &ApiIndex) -> Result<(), DomainError> {
    if index.is_built() {
        Ok(())
    } else {
        Err(DomainError::IndexNotBuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JavaMethod, JavaParameter};

    fn widget() -> JavaClass {
        JavaClass::new("com.acme.Widget").unwrap().with_methods(vec![
            JavaMethod::new("render", "void"),
            JavaMethod::new("getId", "String"),
        ])
    }

    fn factory() -> JavaClass {
        JavaClass::new("com.acme.WidgetFactory")
            .unwrap()
            .with_methods(vec![JavaMethod::new("create", "Widget")
                .with_parameters(vec![JavaParameter::new("id", "String")])])
    }

    fn engine_with(classes: Vec<(JavaClass, &str)>) -> SearchApiUseCase {
        let mut index = ApiIndex::new();
        for (class, repo) in classes {
            index.add_class(class, repo);
        }
        SearchApiUseCase::new(Arc::new(RwLock::new(index)))
    }

    #[tokio::test]
    async fn test_queries_require_built_index() {
        let engine = SearchApiUseCase::new(Arc::new(RwLock::new(ApiIndex::new())));

        let err = engine.search_methods("render", None, true).await.unwrap_err();
        assert!(matches!(err, DomainError::IndexNotBuilt));

        let err = engine.search_class("com.acme.Widget", true).await.unwrap_err();
        assert!(matches!(err, DomainError::IndexNotBuilt));
    }

    #[tokio::test]
    async fn test_statistics_available_on_empty_index() {
        let engine = SearchApiUseCase::new(Arc::new(RwLock::new(ApiIndex::new())));
        assert!(engine.statistics().await.is_empty());
    }

    #[tokio::test]
    async fn test_exact_method_search() {
        let engine = engine_with(vec![(widget(), "r1"), (factory(), "r1")]);

        let matches = engine.search_methods("render", None, true).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].class.fully_qualified_name, "com.acme.Widget");
    }

    #[tokio::test]
    async fn test_case_insensitive_method_search() {
        let holder = JavaClass::new("com.acme.Holder")
            .unwrap()
            .with_methods(vec![JavaMethod::new("getValue", "Object")]);
        let engine = engine_with(vec![(widget(), "r1"), (holder, "r1")]);

        let matches = engine.search_methods("getvalue", None, false).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].method.name, "getValue");

        // The case-sensitive path misses the differently-cased name.
        let matches = engine.search_methods("getvalue", None, true).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_method_search_with_class_filter() {
        let engine = engine_with(vec![(widget(), "r1"), (factory(), "r1")]);

        let matches = engine
            .search_methods("create", Some("WidgetFactory"), true)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);

        let matches = engine
            .search_methods("create", Some("widgetfactory"), false)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);

        let matches = engine
            .search_methods("create", Some("Widget"), true)
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_partial_method_search() {
        let engine = engine_with(vec![(widget(), "r1"), (factory(), "r1")]);

        let matches = engine.search_methods_partial("re", true).await.unwrap();
        let names: Vec<&str> = matches.iter().map(|m| m.method.name.as_str()).collect();
        assert_eq!(matches.len(), 2);
        assert!(names.contains(&"render"));
        assert!(names.contains(&"create"));

        let matches = engine.search_methods_partial("GET", false).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].method.name, "getId");

        let matches = engine.search_methods_partial("GET", true).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_class_search() {
        let engine = engine_with(vec![(widget(), "r1")]);

        let class = engine.search_class("com.acme.Widget", true).await.unwrap();
        assert!(class.is_some());

        let class = engine.search_class("COM.ACME.WIDGET", false).await.unwrap();
        assert!(class.is_some());

        let class = engine.search_class("COM.ACME.WIDGET", true).await.unwrap();
        assert!(class.is_none());
    }

    #[tokio::test]
    async fn test_classes_by_simple_name() {
        let engine = engine_with(vec![(widget(), "r1"), (factory(), "r1")]);

        let classes = engine.classes_by_name("Widget", true).await.unwrap();
        assert_eq!(classes.len(), 1);

        let classes = engine.classes_by_name("widget", false).await.unwrap();
        assert_eq!(classes.len(), 1);

        let classes = engine.classes_by_name("widget", true).await.unwrap();
        assert!(classes.is_empty());
    }

    #[tokio::test]
    async fn test_repository_filter_errors_on_unknown_url() {
        let engine = engine_with(vec![(widget(), "r1")]);

        let classes = engine.filter_classes_by_repository("r1").await.unwrap();
        assert_eq!(classes.len(), 1);

        let err = engine
            .filter_classes_by_repository("r2")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RepositoryNotIndexed(url) if url == "r2"));
    }

    #[tokio::test]
    async fn test_package_filter_with_repository_intersection() {
        let other = JavaClass::new("com.acme.Panel")
            .unwrap()
            .with_methods(vec![JavaMethod::new("draw", "void")]);
        let engine = engine_with(vec![(widget(), "r1"), (other, "r2")]);

        let classes = engine
            .filter_classes_by_package("com.acme", None)
            .await
            .unwrap();
        assert_eq!(classes.len(), 2);

        let classes = engine
            .filter_classes_by_package("com.acme", Some("r2"))
            .await
            .unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].fully_qualified_name, "com.acme.Panel");

        let classes = engine
            .filter_classes_by_package("org.missing", None)
            .await
            .unwrap();
        assert!(classes.is_empty());
    }

    #[tokio::test]
    async fn test_statistics_counts() {
        let engine = engine_with(vec![(widget(), "r1"), (factory(), "r1")]);

        let stats = engine.statistics().await;
        assert_eq!(stats.total_classes, 2);
        assert_eq!(stats.total_methods, 3);
        assert_eq!(stats.total_repositories, 1);
        assert_eq!(stats.total_packages, 1);
    }
}
