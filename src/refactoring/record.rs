use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::kind::RefactoringKind;
use crate::diff::{PackageState, SignatureDiff};
use crate::mapper::{BodyMapping, OperationKey};
use crate::model::signature::{display_field, display_operation};
use crate::model::{ClassEntity, FieldEntity, OperationEntity, SourceRange};
use crate::motivation::Motivation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Package,
    Class,
    Operation,
    Attribute,
}

/// One side of a refactoring: the code element and where it lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodeElement {
    pub kind: ElementKind,
    /// Owning class, or the package itself for package elements
    pub container: String,
    pub name: String,
    /// Display signature used in descriptions
    pub signature: String,
    pub range: SourceRange,
}

impl CodeElement {
    pub fn class(class: &ClassEntity) -> Self {
        Self {
            kind: ElementKind::Class,
            container: class.package.clone(),
            name: class.name.clone(),
            signature: class.name.clone(),
            range: class.range.clone(),
        }
    }

    pub fn operation(class: &ClassEntity, op: &OperationEntity) -> Self {
        Self {
            kind: ElementKind::Operation,
            container: class.name.clone(),
            name: op.name.clone(),
            signature: display_operation(op),
            range: op.range.clone(),
        }
    }

    pub fn attribute(class: &ClassEntity, field: &FieldEntity) -> Self {
        Self {
            kind: ElementKind::Attribute,
            container: class.name.clone(),
            name: field.name.clone(),
            signature: display_field(field),
            range: field.range.clone(),
        }
    }

    pub fn package(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: ElementKind::Package,
            container: name.clone(),
            signature: name.clone(),
            name,
            range: SourceRange::default(),
        }
    }
}

/// Kind-specific payload of a record
#[derive(Debug, Clone, Default)]
pub enum RefactoringDetail {
    #[default]
    None,
    /// Signature changes of a modified or parameterized operation
    Signature(SignatureDiff),
    /// Package classification of a moved class
    ClassMove {
        source: PackageState,
        target: PackageState,
    },
    /// Statements taken out of (or folded into) `source`
    Extraction {
        source_before: OperationKey,
        source_after: OperationKey,
        extracted: OperationKey,
        /// Countable statements of the after source that match neither side
        new_statements: usize,
    },
    /// An operation relocated to another class
    Relocation {
        before: OperationKey,
        after: OperationKey,
    },
}

/// A detected refactoring
///
/// Records compare, hash and sort by kind and description only.
#[derive(Debug, Clone)]
pub struct Refactoring {
    pub kind: RefactoringKind,
    pub description: String,
    pub before: Vec<CodeElement>,
    pub after: Vec<CodeElement>,
    pub detail: RefactoringDetail,
    pub mapping: Option<Arc<BodyMapping>>,
    pub motivations: BTreeSet<Motivation>,
}

impl Refactoring {
    pub fn new(
        kind: RefactoringKind,
        description: impl Into<String>,
        before: Vec<CodeElement>,
        after: Vec<CodeElement>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            before,
            after,
            detail: RefactoringDetail::None,
            mapping: None,
            motivations: BTreeSet::new(),
        }
    }

    pub fn with_detail(mut self, detail: RefactoringDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_mapping(mut self, mapping: Option<Arc<BodyMapping>>) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn signature_diff(&self) -> Option<&SignatureDiff> {
        match &self.detail {
            RefactoringDetail::Signature(diff) => Some(diff),
            _ => None,
        }
    }

    pub fn package_states(&self) -> Option<(PackageState, PackageState)> {
        match self.detail {
            RefactoringDetail::ClassMove { source, target } => Some((source, target)),
            _ => None,
        }
    }
}

impl PartialEq for Refactoring {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl Eq for Refactoring {}

impl Hash for Refactoring {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.description.hash(state);
    }
}

impl PartialOrd for Refactoring {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Refactoring {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.description.cmp(&other.description))
    }
}

impl std::fmt::Display for Refactoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_payload() {
        let element = CodeElement::package("app.core");
        let a = Refactoring::new(RefactoringKind::RenamePackage, "Rename Package a to b", vec![element.clone()], vec![]);
        let b = Refactoring::new(RefactoringKind::RenamePackage, "Rename Package a to b", vec![], vec![element])
            .with_detail(RefactoringDetail::ClassMove {
                source: PackageState::New,
                target: PackageState::New,
            });
        assert_eq!(a, b);
    }

    #[test]
    fn orders_by_kind_then_description() {
        let mut records = vec![
            Refactoring::new(RefactoringKind::RenameMethod, "Rename Method b", vec![], vec![]),
            Refactoring::new(RefactoringKind::MoveClass, "Move Class z", vec![], vec![]),
            Refactoring::new(RefactoringKind::RenameMethod, "Rename Method a", vec![], vec![]),
        ];
        records.sort();
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Move Class z", "Rename Method a", "Rename Method b"]);
    }

    #[test]
    fn operation_element_uses_display_signature() {
        let class = ClassEntity::new("app.Calc");
        let op = OperationEntity::new("square").with_parameter("x", "int").with_return_type("int");
        let element = CodeElement::operation(&class, &op);
        assert_eq!(element.container, "app.Calc");
        assert_eq!(element.signature, "public square(x int) : int");
    }
}
