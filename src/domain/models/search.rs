use serde::{Deserialize, Serialize};

use super::java::{JavaClass, JavaMethod};

/// A method hit together with the class that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodMatch {
    pub class: JavaClass,
    pub method: JavaMethod,
}

impl MethodMatch {
    pub fn new(class: JavaClass, method: JavaMethod) -> Self {
        Self { class, method }
    }

    pub fn location(&self) -> String {
        format!(
            "{}#{}",
            self.class.fully_qualified_name,
            self.method.signature()
        )
    }
}

/// Aggregate counts over the current index contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexStatistics {
    pub total_classes: usize,
    pub total_methods: usize,
    pub total_repositories: usize,
    pub total_packages: usize,
}

impl IndexStatistics {
    pub fn is_empty(&self) -> bool {
        self.total_classes == 0
    }
}
