use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Parsed doc-comment attached to a class, method, or field.
///
/// Produced by the external doc-comment extractor; the index carries it
/// opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JavaDoc {
    pub summary: String,
    pub description: String,
    /// Parameter name -> description.
    pub params: HashMap<String, String>,
    pub returns: String,
    /// Exception type -> description.
    pub throws: HashMap<String, String>,
    pub since: String,
    pub deprecated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaParameter {
    pub name: String,
    pub type_name: String,
}

impl JavaParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaField {
    pub name: String,
    pub type_name: String,
    pub modifiers: Vec<String>,
}

impl JavaField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Vec<String>) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A method extracted from a Java class or interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaMethod {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<JavaParameter>,
    pub modifiers: Vec<String>,
    pub throws: Vec<String>,
    pub is_constructor: bool,
    pub javadoc: Option<JavaDoc>,
}

impl JavaMethod {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            modifiers: Vec::new(),
            throws: Vec::new(),
            is_constructor: false,
            javadoc: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<JavaParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<String>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_throws(mut self, throws: Vec<String>) -> Self {
        self.throws = throws;
        self
    }

    pub fn constructor(mut self) -> Self {
        self.is_constructor = true;
        self
    }

    pub fn with_javadoc(mut self, javadoc: JavaDoc) -> Self {
        self.javadoc = Some(javadoc);
        self
    }

    /// Renders `"<return_type> <name>(<type> <param>, ...)"`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.type_name, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({})", self.return_type, self.name, params)
    }
}

/// A Java class, interface, or enum extracted by the parser collaborator.
///
/// The simple name and package are derived from the fully-qualified name at
/// construction; the fully-qualified name is the primary index key and must
/// be non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaClass {
    pub name: String,
    pub fully_qualified_name: String,
    pub package: String,
    pub modifiers: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<JavaMethod>,
    pub fields: Vec<JavaField>,
    pub javadoc: Option<JavaDoc>,
    pub is_interface: bool,
    pub is_enum: bool,
}

impl JavaClass {
    pub fn new(fully_qualified_name: impl Into<String>) -> Result<Self, DomainError> {
        let fully_qualified_name = fully_qualified_name.into();
        if fully_qualified_name.trim().is_empty() {
            return Err(DomainError::invalid_input(
                "fully-qualified class name cannot be empty",
            ));
        }

        let name = simple_name(&fully_qualified_name).to_string();
        let package = package_name(&fully_qualified_name).to_string();

        Ok(Self {
            name,
            fully_qualified_name,
            package,
            modifiers: Vec::new(),
            extends: None,
            implements: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            javadoc: None,
            is_interface: false,
            is_enum: false,
        })
    }

    pub fn with_methods(mut self, methods: Vec<JavaMethod>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_fields(mut self, fields: Vec<JavaField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<String>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_extends(mut self, superclass: impl Into<String>) -> Self {
        self.extends = Some(superclass.into());
        self
    }

    pub fn with_implements(mut self, interfaces: Vec<String>) -> Self {
        self.implements = interfaces;
        self
    }

    pub fn with_javadoc(mut self, javadoc: JavaDoc) -> Self {
        self.javadoc = Some(javadoc);
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn enumeration(mut self) -> Self {
        self.is_enum = true;
        self
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// Last dot-separated segment of a fully-qualified name.
pub fn simple_name(fully_qualified_name: &str) -> &str {
    fully_qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(fully_qualified_name)
}

/// Package prefix of a fully-qualified name, empty for the default package.
pub fn package_name(fully_qualified_name: &str) -> &str {
    match fully_qualified_name.rfind('.') {
        Some(idx) => &fully_qualified_name[..idx],
        None => "",
    }
}
