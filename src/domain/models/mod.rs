mod java;
mod repository;
mod search;

pub use java::*;
pub use repository::*;
pub use search::*;
