//! Class, operation and field entities of a snapshot.

use serde::{Deserialize, Serialize};

use super::statement::StatementNode;

/// Location of an element in the source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceRange {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub start_line: usize,
    #[serde(default)]
    pub end_line: usize,
    #[serde(default)]
    pub start_column: usize,
    #[serde(default)]
    pub end_column: usize,
}

impl SourceRange {
    pub fn new(file: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
            start_column: 0,
            end_column: 0,
        }
    }

    /// Directory part of the file path, used as the package folder
    pub fn folder(&self) -> Option<&str> {
        self.file.rsplit_once('/').map(|(dir, _)| dir)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// An annotation with its raw argument text, e.g. `@ValueSource(ints = {1, 2})`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl Annotation {
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Simple name without any package qualifier
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Whether the annotation text contains the literal value (quotes ignored)
    pub fn mentions_literal(&self, literal: &str) -> bool {
        let needle = literal.trim_matches(|c| c == '"' || c == '\'');
        self.value
            .as_deref()
            .map(|value| {
                value
                    .split(|c: char| matches!(c, ',' | '{' | '}' | '(' | ')' | '=' | '\n'))
                    .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\''))
                    .any(|part| part == needle || part.split_whitespace().any(|w| w == needle))
            })
            .unwrap_or(false)
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "@{}({})", self.name, value),
            None => write!(f, "@{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// A method or constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationEntity {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Absent for constructors
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub range: SourceRange,
    #[serde(default)]
    pub constructor: bool,
    /// Method body; absent for abstract and native declarations
    #[serde(default)]
    pub body: Option<StatementNode>,
}

impl OperationEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: Some("void".to_string()),
            visibility: Visibility::Public,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            range: SourceRange::default(),
            constructor: false,
            body: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    pub fn with_return_type(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_body(mut self, body: StatementNode) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    pub fn has_annotation(&self, simple_name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| a.simple_name() == simple_name)
    }

    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.simple_name() == simple_name)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract || self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub range: SourceRange,
    #[serde(default)]
    pub initializer: Option<String>,
}

impl FieldEntity {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            visibility: Visibility::Private,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            range: SourceRange::default(),
            initializer: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }
}

/// A class, interface or enum keyed by its fully-qualified name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub range: SourceRange,
    #[serde(default)]
    pub operations: Vec<OperationEntity>,
    #[serde(default)]
    pub fields: Vec<FieldEntity>,
}

impl ClassEntity {
    /// Create a class from its fully-qualified name; the package is the
    /// prefix up to the last dot.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let name = qualified_name.into();
        let package = name
            .rsplit_once('.')
            .map(|(pkg, _)| pkg.to_string())
            .unwrap_or_default();
        Self {
            name,
            package,
            kind: ClassKind::Class,
            superclass: None,
            interfaces: Vec::new(),
            visibility: Visibility::Public,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            range: SourceRange::default(),
            operations: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.range.file = file.into();
        self
    }

    pub fn with_operation(mut self, operation: OperationEntity) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_field(mut self, field: FieldEntity) -> Self {
        self.fields.push(field);
        self
    }

    /// Name without the package prefix; nested classes keep their outer class
    pub fn simple_name(&self) -> &str {
        if !self.package.is_empty() {
            if let Some(rest) = self.name.strip_prefix(&self.package) {
                if let Some(rest) = rest.strip_prefix('.') {
                    return rest;
                }
            }
        }
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Qualifier in front of the simple name (package, or outer class for nested types)
    pub fn container(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(container, _)| container)
            .unwrap_or("")
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }

    pub fn operation(&self, name: &str) -> Option<&OperationEntity> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldEntity> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn member_count(&self) -> usize {
        self.operations.len() + self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_package() {
        let class = ClassEntity::new("org.example.util.Strings");
        assert_eq!(class.package, "org.example.util");
        assert_eq!(class.simple_name(), "Strings");
    }

    #[test]
    fn nested_class_keeps_outer_name() {
        let class = ClassEntity::new("org.example.Outer.Inner").with_package("org.example");
        assert_eq!(class.simple_name(), "Outer.Inner");
        assert_eq!(class.container(), "org.example.Outer");
    }

    #[test]
    fn annotation_finds_csv_literals() {
        let csv = Annotation::with_value("CsvSource", r#"{"1, one", "2, two"}"#);
        assert!(csv.mentions_literal("\"1\""));
        assert!(csv.mentions_literal("two"));
        assert!(!csv.mentions_literal("3"));
    }

    #[test]
    fn folder_is_directory_of_file() {
        let range = SourceRange::new("src/main/java/p1/X.java", 1, 10);
        assert_eq!(range.folder(), Some("src/main/java/p1"));
    }
}
