pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    BuildIndexReport, BuildIndexUseCase, ParserService, SearchApiUseCase, SyncRepositoriesUseCase,
};

pub use connector::{ApiIndex, MockParserService, RepositorySyncManager};

pub use domain::{
    DomainError, IndexStatistics, JavaClass, JavaDoc, JavaField, JavaMethod, JavaParameter,
    MethodMatch, RepositoryRecord, RepositorySource, SyncOutcome, SyncStatus,
};
