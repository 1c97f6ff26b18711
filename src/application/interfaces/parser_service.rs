use async_trait::async_trait;

use crate::domain::{DomainError, JavaClass};

/// Parses Java source text into API entities.
///
/// This is the seam to the external parser collaborator: text in, validated
/// entities out, no shared state. `file_path` is the repository-relative
/// path of the source file, useful for diagnostics and for parsers that key
/// expectations by path.
#[async_trait]
pub trait ParserService: Send + Sync {
    async fn parse_source(
        &self,
        content: &str,
        file_path: &str,
    ) -> Result<Vec<JavaClass>, DomainError>;
}
