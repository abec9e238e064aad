use serde::{Deserialize, Serialize};
use std::fmt;

/// Every refactoring the detectors can report
///
/// Variant order is the output order of a commit's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefactoringKind {
    MoveClass,
    RenameClass,
    MoveAndRenameClass,
    RenamePackage,
    ExtractSuperclass,
    ExtractInterface,
    ExtractMethod,
    InlineMethod,
    ExtractAndMoveMethod,
    MoveAndInlineMethod,
    RenameMethod,
    MoveMethod,
    MoveAndRenameMethod,
    PullUpMethod,
    PushDownMethod,
    PullUpAttribute,
    PushDownAttribute,
    MoveAttribute,
    RenameAttribute,
    ChangeAttributeType,
    ChangeReturnType,
    AddParameter,
    RemoveParameter,
    RenameParameter,
    ChangeParameterType,
    AddMethodAnnotation,
    RemoveMethodAnnotation,
    ModifyMethodAnnotation,
    AddClassAnnotation,
    RemoveClassAnnotation,
    ModifyClassAnnotation,
    ParameterizeTest,
}

/// Coarse grouping used by summaries and the terminal report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefactoringFamily {
    Class,
    Hierarchy,
    Method,
    Attribute,
    Signature,
    Annotation,
    Test,
}

/// How repeated detections of one transformation are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// One record per transformation
    Single,
    /// One record per before-element; several records may share an after-element
    PerSourceElement,
}

impl RefactoringKind {
    pub const ALL: [RefactoringKind; 32] = [
        Self::MoveClass,
        Self::RenameClass,
        Self::MoveAndRenameClass,
        Self::RenamePackage,
        Self::ExtractSuperclass,
        Self::ExtractInterface,
        Self::ExtractMethod,
        Self::InlineMethod,
        Self::ExtractAndMoveMethod,
        Self::MoveAndInlineMethod,
        Self::RenameMethod,
        Self::MoveMethod,
        Self::MoveAndRenameMethod,
        Self::PullUpMethod,
        Self::PushDownMethod,
        Self::PullUpAttribute,
        Self::PushDownAttribute,
        Self::MoveAttribute,
        Self::RenameAttribute,
        Self::ChangeAttributeType,
        Self::ChangeReturnType,
        Self::AddParameter,
        Self::RemoveParameter,
        Self::RenameParameter,
        Self::ChangeParameterType,
        Self::AddMethodAnnotation,
        Self::RemoveMethodAnnotation,
        Self::ModifyMethodAnnotation,
        Self::AddClassAnnotation,
        Self::RemoveClassAnnotation,
        Self::ModifyClassAnnotation,
        Self::ParameterizeTest,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MoveClass => "Move Class",
            Self::RenameClass => "Rename Class",
            Self::MoveAndRenameClass => "Move And Rename Class",
            Self::RenamePackage => "Rename Package",
            Self::ExtractSuperclass => "Extract Superclass",
            Self::ExtractInterface => "Extract Interface",
            Self::ExtractMethod => "Extract Method",
            Self::InlineMethod => "Inline Method",
            Self::ExtractAndMoveMethod => "Extract And Move Method",
            Self::MoveAndInlineMethod => "Move And Inline Method",
            Self::RenameMethod => "Rename Method",
            Self::MoveMethod => "Move Method",
            Self::MoveAndRenameMethod => "Move And Rename Method",
            Self::PullUpMethod => "Pull Up Method",
            Self::PushDownMethod => "Push Down Method",
            Self::PullUpAttribute => "Pull Up Attribute",
            Self::PushDownAttribute => "Push Down Attribute",
            Self::MoveAttribute => "Move Attribute",
            Self::RenameAttribute => "Rename Attribute",
            Self::ChangeAttributeType => "Change Attribute Type",
            Self::ChangeReturnType => "Change Return Type",
            Self::AddParameter => "Add Parameter",
            Self::RemoveParameter => "Remove Parameter",
            Self::RenameParameter => "Rename Parameter",
            Self::ChangeParameterType => "Change Parameter Type",
            Self::AddMethodAnnotation => "Add Method Annotation",
            Self::RemoveMethodAnnotation => "Remove Method Annotation",
            Self::ModifyMethodAnnotation => "Modify Method Annotation",
            Self::AddClassAnnotation => "Add Class Annotation",
            Self::RemoveClassAnnotation => "Remove Class Annotation",
            Self::ModifyClassAnnotation => "Modify Class Annotation",
            Self::ParameterizeTest => "Parameterize Test",
        }
    }

    pub fn family(&self) -> RefactoringFamily {
        use RefactoringKind::*;
        match self {
            MoveClass | RenameClass | MoveAndRenameClass | RenamePackage => RefactoringFamily::Class,
            ExtractSuperclass | ExtractInterface | PullUpMethod | PushDownMethod
            | PullUpAttribute | PushDownAttribute => RefactoringFamily::Hierarchy,
            ExtractMethod | InlineMethod | ExtractAndMoveMethod | MoveAndInlineMethod
            | RenameMethod | MoveMethod | MoveAndRenameMethod => RefactoringFamily::Method,
            MoveAttribute | RenameAttribute | ChangeAttributeType => RefactoringFamily::Attribute,
            ChangeReturnType | AddParameter | RemoveParameter | RenameParameter
            | ChangeParameterType => RefactoringFamily::Signature,
            AddMethodAnnotation | RemoveMethodAnnotation | ModifyMethodAnnotation
            | AddClassAnnotation | RemoveClassAnnotation | ModifyClassAnnotation => {
                RefactoringFamily::Annotation
            }
            ParameterizeTest => RefactoringFamily::Test,
        }
    }

    pub fn aggregation(&self) -> Aggregation {
        use RefactoringKind::*;
        match self {
            ParameterizeTest | MoveAttribute | PullUpMethod | PullUpAttribute | ExtractMethod
            | ExtractAndMoveMethod => Aggregation::PerSourceElement,
            _ => Aggregation::Single,
        }
    }

    /// Extract and move kinds are tagged by the motivation classifier
    pub fn has_motivations(&self) -> bool {
        matches!(
            self,
            Self::ExtractMethod
                | Self::ExtractAndMoveMethod
                | Self::MoveMethod
                | Self::MoveAndRenameMethod
        )
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.display_name() == name)
    }
}

impl fmt::Display for RefactoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_round_trip() {
        for kind in RefactoringKind::ALL {
            assert_eq!(RefactoringKind::from_display_name(kind.display_name()), Some(kind));
        }
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&RefactoringKind::ParameterizeTest).unwrap();
        assert_eq!(json, "\"PARAMETERIZE_TEST\"");
    }

    #[test]
    fn all_is_in_declaration_order() {
        let mut sorted = RefactoringKind::ALL;
        sorted.sort();
        assert_eq!(sorted, RefactoringKind::ALL);
    }

    #[test]
    fn families_and_aggregation() {
        assert_eq!(RefactoringKind::PullUpAttribute.family(), RefactoringFamily::Hierarchy);
        assert_eq!(RefactoringKind::ParameterizeTest.aggregation(), Aggregation::PerSourceElement);
        assert_eq!(RefactoringKind::RenameMethod.aggregation(), Aggregation::Single);
    }
}
