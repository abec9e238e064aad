use serde::{Deserialize, Serialize};

use crate::model::signature::erase_type;
use crate::model::{Annotation, OperationEntity, Parameter};

/// Differences between the declarations of two corresponding operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDiff {
    pub added_parameters: Vec<Parameter>,
    pub removed_parameters: Vec<Parameter>,
    /// Same type and position, new name
    pub renamed_parameters: Vec<(Parameter, Parameter)>,
    /// Same name, new type
    pub retyped_parameters: Vec<(Parameter, Parameter)>,
    pub return_type: Option<(String, String)>,
    pub added_annotations: Vec<Annotation>,
    pub removed_annotations: Vec<Annotation>,
    pub modified_annotations: Vec<(Annotation, Annotation)>,
}

impl SignatureDiff {
    pub fn between(before: &OperationEntity, after: &OperationEntity) -> Self {
        let mut diff = Self::default();
        diff_parameters(&before.parameters, &after.parameters, &mut diff);
        if let (Some(old), Some(new)) = (&before.return_type, &after.return_type) {
            if old != new {
                diff.return_type = Some((old.clone(), new.clone()));
            }
        }
        let (added, removed, modified) = diff_annotations(&before.annotations, &after.annotations);
        diff.added_annotations = added;
        diff.removed_annotations = removed;
        diff.modified_annotations = modified;
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added_parameters.is_empty()
            && self.removed_parameters.is_empty()
            && self.renamed_parameters.is_empty()
            && self.retyped_parameters.is_empty()
            && self.return_type.is_none()
            && !self.changes_annotations()
    }

    pub fn changes_annotations(&self) -> bool {
        !(self.added_annotations.is_empty()
            && self.removed_annotations.is_empty()
            && self.modified_annotations.is_empty())
    }
}

fn diff_parameters(before: &[Parameter], after: &[Parameter], diff: &mut SignatureDiff) {
    let mut before_free = vec![true; before.len()];
    let mut after_free = vec![true; after.len()];

    let same_type = |b: &Parameter, a: &Parameter| erase_type(&b.ty) == erase_type(&a.ty);

    // unchanged, then retyped
    for (bi, b) in before.iter().enumerate() {
        if let Some(ai) = (0..after.len()).find(|&ai| after_free[ai] && after[ai].name == b.name && same_type(b, &after[ai])) {
            before_free[bi] = false;
            after_free[ai] = false;
        }
    }
    for (bi, b) in before.iter().enumerate() {
        if !before_free[bi] {
            continue;
        }
        if let Some(ai) = (0..after.len()).find(|&ai| after_free[ai] && after[ai].name == b.name) {
            before_free[bi] = false;
            after_free[ai] = false;
            diff.retyped_parameters.push((b.clone(), after[ai].clone()));
        }
    }
    for (bi, b) in before.iter().enumerate() {
        let Some(a) = after.get(bi) else {
            continue;
        };
        if before_free[bi] && after_free[bi] && same_type(b, a) {
            before_free[bi] = false;
            after_free[bi] = false;
            diff.renamed_parameters.push((b.clone(), a.clone()));
        }
    }

    diff.removed_parameters = before
        .iter()
        .zip(&before_free)
        .filter(|(_, free)| **free)
        .map(|(p, _)| p.clone())
        .collect();
    diff.added_parameters = after
        .iter()
        .zip(&after_free)
        .filter(|(_, free)| **free)
        .map(|(p, _)| p.clone())
        .collect();
}

type AnnotationDelta = (Vec<Annotation>, Vec<Annotation>, Vec<(Annotation, Annotation)>);

/// Added, removed and modified annotations, matched by simple name
pub fn diff_annotations(before: &[Annotation], after: &[Annotation]) -> AnnotationDelta {
    let find = |list: &[Annotation], name: &str| list.iter().find(|a| a.simple_name() == name).cloned();

    let added = after
        .iter()
        .filter(|a| find(before, a.simple_name()).is_none())
        .cloned()
        .collect();
    let removed = before
        .iter()
        .filter(|b| find(after, b.simple_name()).is_none())
        .cloned()
        .collect();
    let modified = before
        .iter()
        .filter_map(|b| {
            find(after, b.simple_name())
                .filter(|a| a.value != b.value)
                .map(|a| (b.clone(), a))
        })
        .collect();
    (added, removed, modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameterized_test_signature() {
        let before = OperationEntity::new("parsesOne").with_annotation(Annotation::marker("Test"));
        let after = OperationEntity::new("parses")
            .with_parameter("input", "String")
            .with_parameter("description", "String")
            .with_annotation(Annotation::with_value("ParameterizedTest", "name = \"{1}\""))
            .with_annotation(Annotation::with_value("CsvSource", "{\"1, one\", \"2, two\"}"));
        let diff = SignatureDiff::between(&before, &after);
        assert_eq!(diff.added_parameters.len(), 2);
        assert!(diff.removed_parameters.is_empty());
        let added: Vec<&str> = diff.added_annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(added, vec!["ParameterizedTest", "CsvSource"]);
        assert_eq!(diff.removed_annotations, vec![Annotation::marker("Test")]);
        assert!(diff.return_type.is_none());
    }

    #[test]
    fn rename_retype_and_return() {
        let before = OperationEntity::new("load")
            .with_parameter("id", "int")
            .with_parameter("cache", "boolean")
            .with_return_type("User");
        let after = OperationEntity::new("load")
            .with_parameter("id", "long")
            .with_parameter("useCache", "boolean")
            .with_return_type("Optional<User>");
        let diff = SignatureDiff::between(&before, &after);
        assert_eq!(diff.retyped_parameters, vec![(Parameter::new("id", "int"), Parameter::new("id", "long"))]);
        assert_eq!(
            diff.renamed_parameters,
            vec![(Parameter::new("cache", "boolean"), Parameter::new("useCache", "boolean"))]
        );
        assert_eq!(diff.return_type, Some(("User".to_string(), "Optional<User>".to_string())));
        assert!(diff.added_parameters.is_empty() && diff.removed_parameters.is_empty());
    }

    #[test]
    fn modified_annotation_value() {
        let (added, removed, modified) = diff_annotations(
            &[Annotation::with_value("Timeout", "5")],
            &[Annotation::with_value("Timeout", "10")],
        );
        assert!(added.is_empty() && removed.is_empty());
        assert_eq!(modified.len(), 1);
    }

    #[test]
    fn identical_declarations_have_empty_diff() {
        let op = OperationEntity::new("run").with_parameter("n", "int");
        assert!(SignatureDiff::between(&op, &op).is_empty());
    }
}
