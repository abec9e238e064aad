//! Changes to members that kept their class: Rename Method, signature and
//! annotation changes, Rename Attribute, Change Attribute Type and class
//! annotation changes.

use std::sync::Arc;

use super::{Consumed, Detection};
use crate::diff::{ClassPair, ModelDiff, OperationMatch};
use crate::model::ClassEntity;
use crate::refactoring::{describe, CodeElement, Refactoring, RefactoringDetail, RefactoringKind};

pub fn detect(diff: &ModelDiff<'_>, _consumed: &Consumed) -> Detection {
    let mut detection = Detection::default();
    for pair in &diff.pairs {
        for matched in &pair.diff.operations {
            operation_changes(pair, matched, &mut detection);
        }
        attribute_changes(pair, &mut detection);
        class_annotation_changes(pair, &mut detection);
    }
    detection
}

fn operation_changes(pair: &ClassPair<'_>, matched: &OperationMatch<'_>, detection: &mut Detection) {
    let (before_class, after_class) = (pair.before(), pair.after());
    let (before, after) = (matched.before.op(), matched.after.op());
    let class = after_class.name.as_str();
    let elements = || {
        (
            vec![CodeElement::operation(before_class, before)],
            vec![CodeElement::operation(after_class, after)],
        )
    };

    // constructors follow their class name
    if matched.is_renamed() && !before.constructor {
        let (left, right) = elements();
        detection.push(
            Refactoring::new(
                RefactoringKind::RenameMethod,
                describe::rename_method(before, after, class),
                left,
                right,
            )
            .with_detail(RefactoringDetail::Signature(matched.signature.clone()))
            .with_mapping(matched.mapping.as_ref().map(Arc::clone)),
        );
    }

    let signature = &matched.signature;
    let mut emit = |kind: RefactoringKind, description: String| {
        let (left, right) = elements();
        detection.push(Refactoring::new(kind, description, left, right));
    };
    if let Some((old, new)) = &signature.return_type {
        emit(
            RefactoringKind::ChangeReturnType,
            describe::change_return_type(old, new, after, class),
        );
    }
    for parameter in &signature.added_parameters {
        emit(
            RefactoringKind::AddParameter,
            describe::parameter(RefactoringKind::AddParameter, parameter, after, class),
        );
    }
    for parameter in &signature.removed_parameters {
        emit(
            RefactoringKind::RemoveParameter,
            describe::parameter(RefactoringKind::RemoveParameter, parameter, after, class),
        );
    }
    for (old, new) in &signature.renamed_parameters {
        emit(
            RefactoringKind::RenameParameter,
            describe::parameter_change(RefactoringKind::RenameParameter, old, new, after, class),
        );
    }
    for (old, new) in &signature.retyped_parameters {
        emit(
            RefactoringKind::ChangeParameterType,
            describe::parameter_change(RefactoringKind::ChangeParameterType, old, new, after, class),
        );
    }
    for annotation in &signature.added_annotations {
        emit(
            RefactoringKind::AddMethodAnnotation,
            describe::method_annotation(RefactoringKind::AddMethodAnnotation, annotation, after, class),
        );
    }
    for annotation in &signature.removed_annotations {
        emit(
            RefactoringKind::RemoveMethodAnnotation,
            describe::method_annotation(RefactoringKind::RemoveMethodAnnotation, annotation, after, class),
        );
    }
    for (old, new) in &signature.modified_annotations {
        emit(
            RefactoringKind::ModifyMethodAnnotation,
            describe::modify_method_annotation(old, new, after, class),
        );
    }
}

fn attribute_changes(pair: &ClassPair<'_>, detection: &mut Detection) {
    let (before_class, after_class) = (pair.before(), pair.after());
    let class = after_class.name.as_str();
    for matched in &pair.diff.renamed_fields {
        let (before, after) = (matched.before.field(), matched.after.field());
        detection.push(Refactoring::new(
            RefactoringKind::RenameAttribute,
            describe::rename_attribute(before, after, class),
            vec![CodeElement::attribute(before_class, before)],
            vec![CodeElement::attribute(after_class, after)],
        ));
    }
    for matched in &pair.diff.retyped_fields {
        let (before, after) = (matched.before.field(), matched.after.field());
        detection.push(Refactoring::new(
            RefactoringKind::ChangeAttributeType,
            describe::change_attribute_type(before, after, class),
            vec![CodeElement::attribute(before_class, before)],
            vec![CodeElement::attribute(after_class, after)],
        ));
    }
}

fn class_annotation_changes(pair: &ClassPair<'_>, detection: &mut Detection) {
    let (before, after): (&ClassEntity, &ClassEntity) = (pair.before(), pair.after());
    let elements = || (vec![CodeElement::class(before)], vec![CodeElement::class(after)]);
    let class = after.name.as_str();
    for annotation in &pair.diff.added_annotations {
        let (left, right) = elements();
        detection.push(Refactoring::new(
            RefactoringKind::AddClassAnnotation,
            describe::class_annotation(RefactoringKind::AddClassAnnotation, annotation, class),
            left,
            right,
        ));
    }
    for annotation in &pair.diff.removed_annotations {
        let (left, right) = elements();
        detection.push(Refactoring::new(
            RefactoringKind::RemoveClassAnnotation,
            describe::class_annotation(RefactoringKind::RemoveClassAnnotation, annotation, class),
            left,
            right,
        ));
    }
    for (old, new) in &pair.diff.modified_annotations {
        let (left, right) = elements();
        detection.push(Refactoring::new(
            RefactoringKind::ModifyClassAnnotation,
            describe::modify_class_annotation(old, new, class),
            left,
            right,
        ));
    }
}
