//! Mock parser for testing and development.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::ParserService;
use crate::domain::{DomainError, JavaClass};

/// A [`ParserService`] backed by a registry of expected files.
///
/// `parse_source` returns the classes registered for the given path and an
/// empty list for everything else; registering a path with `fail_on` makes
/// parsing that file fail, for exercising warn-and-skip paths.
#[derive(Default)]
pub struct MockParserService {
    classes_by_file: HashMap<String, Vec<JavaClass>>,
    failing_files: Vec<String>,
}

impl MockParserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_path: impl Into<String>, classes: Vec<JavaClass>) -> Self {
        self.classes_by_file.insert(file_path.into(), classes);
        self
    }

    pub fn fail_on(mut self, file_path: impl Into<String>) -> Self {
        self.failing_files.push(file_path.into());
        self
    }
}

#[async_trait]
impl ParserService for MockParserService {
    async fn parse_source(
        &self,
        _content: &str,
        file_path: &str,
    ) -> Result<Vec<JavaClass>, DomainError> {
        if self.failing_files.iter().any(|f| f == file_path) {
            return Err(DomainError::parse(format!(
                "mock parser configured to fail on {}",
                file_path
            )));
        }
        Ok(self
            .classes_by_file
            .get(file_path)
            .cloned()
            .unwrap_or_default())
    }
}
