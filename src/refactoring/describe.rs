//! Description strings for refactoring records.
//!
//! Descriptions are the equality contract of a record, so every detector
//! formats them through these functions.

use super::kind::RefactoringKind;
use crate::model::signature::{display_field, display_operation};
use crate::model::{Annotation, ClassEntity, FieldEntity, OperationEntity, Parameter};

/// `<Kind> <before> from class <A> to <after> from class <B>`
pub fn relocated_operation(
    kind: RefactoringKind,
    before: &OperationEntity,
    before_class: &str,
    after: &OperationEntity,
    after_class: &str,
) -> String {
    format!(
        "{} {} from class {} to {} from class {}",
        kind,
        display_operation(before),
        before_class,
        display_operation(after),
        after_class
    )
}

pub fn relocated_attribute(
    kind: RefactoringKind,
    before: &FieldEntity,
    before_class: &str,
    after: &FieldEntity,
    after_class: &str,
) -> String {
    format!(
        "{} {} from class {} to {} from class {}",
        kind,
        display_field(before),
        before_class,
        display_field(after),
        after_class
    )
}

pub fn rename_method(before: &OperationEntity, after: &OperationEntity, class: &str) -> String {
    format!(
        "{} {} renamed to {} in class {}",
        RefactoringKind::RenameMethod,
        display_operation(before),
        display_operation(after),
        class
    )
}

pub fn extract_method(extracted: &OperationEntity, source: &OperationEntity, class: &str) -> String {
    format!(
        "{} {} extracted from {} in class {}",
        RefactoringKind::ExtractMethod,
        display_operation(extracted),
        display_operation(source),
        class
    )
}

pub fn inline_method(inlined: &OperationEntity, target: &OperationEntity, class: &str) -> String {
    format!(
        "{} {} inlined to {} in class {}",
        RefactoringKind::InlineMethod,
        display_operation(inlined),
        display_operation(target),
        class
    )
}

pub fn extract_and_move(
    extracted: &OperationEntity,
    extracted_class: &str,
    source: &OperationEntity,
    source_class: &str,
) -> String {
    format!(
        "{} {} extracted from {} in class {} & moved to class {}",
        RefactoringKind::ExtractAndMoveMethod,
        display_operation(extracted),
        display_operation(source),
        source_class,
        extracted_class
    )
}

pub fn move_and_inline(
    inlined: &OperationEntity,
    inlined_class: &str,
    target: &OperationEntity,
    target_class: &str,
) -> String {
    format!(
        "{} {} moved from class {} to class {} & inlined to {}",
        RefactoringKind::MoveAndInlineMethod,
        display_operation(inlined),
        inlined_class,
        target_class,
        display_operation(target)
    )
}

pub fn rename_attribute(before: &FieldEntity, after: &FieldEntity, class: &str) -> String {
    format!(
        "{} {} to {} in class {}",
        RefactoringKind::RenameAttribute,
        display_field(before),
        display_field(after),
        class
    )
}

pub fn change_attribute_type(before: &FieldEntity, after: &FieldEntity, class: &str) -> String {
    format!(
        "{} {} to {} in class {}",
        RefactoringKind::ChangeAttributeType,
        display_field(before),
        display_field(after),
        class
    )
}

pub fn move_class(kind: RefactoringKind, before: &str, after: &str) -> String {
    let verb = match kind {
        RefactoringKind::RenameClass => "renamed to",
        RefactoringKind::MoveAndRenameClass => "moved and renamed to",
        _ => "moved to",
    };
    format!("{kind} {before} {verb} {after}")
}

pub fn rename_package(before: &str, after: &str) -> String {
    format!("{} {} to {}", RefactoringKind::RenamePackage, before, after)
}

pub fn extract_supertype(kind: RefactoringKind, supertype: &ClassEntity, subclasses: &[String]) -> String {
    format!("{} {} from classes [{}]", kind, supertype.name, subclasses.join(", "))
}

fn in_method(op: &OperationEntity, class: &str) -> String {
    format!("in method {} from class {}", display_operation(op), class)
}

pub fn change_return_type(old: &str, new: &str, op: &OperationEntity, class: &str) -> String {
    format!(
        "{} {} to {} {}",
        RefactoringKind::ChangeReturnType,
        old,
        new,
        in_method(op, class)
    )
}

/// Add Parameter / Remove Parameter
pub fn parameter(kind: RefactoringKind, parameter: &Parameter, op: &OperationEntity, class: &str) -> String {
    format!("{} {} {}", kind, parameter, in_method(op, class))
}

/// Rename Parameter / Change Parameter Type
pub fn parameter_change(
    kind: RefactoringKind,
    old: &Parameter,
    new: &Parameter,
    op: &OperationEntity,
    class: &str,
) -> String {
    format!("{} {} to {} {}", kind, old, new, in_method(op, class))
}

/// Add / Remove Method Annotation
pub fn method_annotation(
    kind: RefactoringKind,
    annotation: &Annotation,
    op: &OperationEntity,
    class: &str,
) -> String {
    format!("{} {} {}", kind, annotation, in_method(op, class))
}

pub fn modify_method_annotation(
    old: &Annotation,
    new: &Annotation,
    op: &OperationEntity,
    class: &str,
) -> String {
    format!(
        "{} {} to {} {}",
        RefactoringKind::ModifyMethodAnnotation,
        old,
        new,
        in_method(op, class)
    )
}

/// Add / Remove Class Annotation
pub fn class_annotation(kind: RefactoringKind, annotation: &Annotation, class: &str) -> String {
    format!("{kind} {annotation} in class {class}")
}

pub fn modify_class_annotation(old: &Annotation, new: &Annotation, class: &str) -> String {
    format!(
        "{} {} to {} in class {}",
        RefactoringKind::ModifyClassAnnotation,
        old,
        new,
        class
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocated_operation_format() {
        let op = OperationEntity::new("testOne");
        let after = OperationEntity::new("test").with_parameter("input", "int");
        assert_eq!(
            relocated_operation(RefactoringKind::ParameterizeTest, &op, "app.CalcTest", &after, "app.CalcTest"),
            "Parameterize Test public testOne() : void from class app.CalcTest to public test(input int) : void from class app.CalcTest"
        );
    }

    #[test]
    fn class_level_formats() {
        assert_eq!(
            move_class(RefactoringKind::MoveClass, "p1.X", "p2.X"),
            "Move Class p1.X moved to p2.X"
        );
        assert_eq!(
            move_class(RefactoringKind::MoveAndRenameClass, "p1.X", "p2.Y"),
            "Move And Rename Class p1.X moved and renamed to p2.Y"
        );
        assert_eq!(rename_package("p1", "p2"), "Rename Package p1 to p2");
    }

    #[test]
    fn signature_level_formats() {
        let op = OperationEntity::new("send").with_parameter("retries", "int");
        assert_eq!(
            parameter(RefactoringKind::AddParameter, &Parameter::new("retries", "int"), &op, "app.Mailer"),
            "Add Parameter retries : int in method public send(retries int) : void from class app.Mailer"
        );
        assert_eq!(
            class_annotation(RefactoringKind::AddClassAnnotation, &Annotation::marker("Service"), "app.Mailer"),
            "Add Class Annotation @Service in class app.Mailer"
        );
    }
}
