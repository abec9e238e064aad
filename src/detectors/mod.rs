//! Refactoring detectors.
//!
//! Detectors run in a fixed order over a finished [`ModelDiff`]. Each one
//! sees the members claimed by the detectors before it and returns its own
//! records together with the members it claims, so a member is attributed
//! to at most one primary refactoring. Results are folded into one
//! persistent [`Detection`].

pub mod classes;
pub mod extraction;
pub mod hierarchy;
pub mod members;
pub mod parameterize;
pub mod relocation;

use im::{OrdSet, Vector};
use tracing::debug;

use crate::diff::{FieldRef, MemberKey, ModelDiff, OperationRef};
use crate::refactoring::Refactoring;

/// Members and classes already attributed to a refactoring
#[derive(Debug, Clone, Default)]
pub struct Consumed {
    members: OrdSet<MemberKey>,
    classes: OrdSet<String>,
}

impl Consumed {
    pub fn operation(&self, op: &OperationRef<'_>) -> bool {
        self.members.contains(&MemberKey::from(op))
    }

    pub fn field(&self, field: &FieldRef<'_>) -> bool {
        self.members.contains(&field.key())
    }

    /// Added classes claimed as a whole (e.g. an extracted superclass)
    pub fn class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            members: self.members.union(other.members),
            classes: self.classes.union(other.classes),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub refactorings: Vector<Refactoring>,
    pub consumed: Consumed,
}

impl Detection {
    pub fn push(&mut self, refactoring: Refactoring) {
        self.refactorings.push_back(refactoring);
    }

    pub fn consume_operation(&mut self, op: &OperationRef<'_>) {
        self.consumed.members.insert(MemberKey::from(op));
    }

    pub fn consume_field(&mut self, field: &FieldRef<'_>) {
        self.consumed.members.insert(field.key());
    }

    pub fn consume_class(&mut self, name: &str) {
        self.consumed.classes.insert(name.to_string());
    }

    pub fn len(&self) -> usize {
        self.refactorings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refactorings.is_empty()
    }

    pub fn merge(self, other: Self) -> Self {
        let mut refactorings = self.refactorings;
        refactorings.append(other.refactorings);
        Self {
            refactorings,
            consumed: self.consumed.union(other.consumed),
        }
    }
}

pub type Detector = for<'m> fn(&ModelDiff<'m>, &Consumed) -> Detection;

/// Detectors in priority order
pub const PIPELINE: [(&str, Detector); 8] = [
    ("classes", classes::detect),
    ("parameterize_test", parameterize::detect),
    ("members", members::detect),
    ("extract_supertype", hierarchy::detect_extracted_supertypes),
    ("pull_up_push_down", hierarchy::detect_member_moves),
    ("extract_inline", extraction::detect),
    ("move_operation", relocation::detect_operations),
    ("move_attribute", relocation::detect_attributes),
];

/// Run the whole pipeline over one model diff
pub fn detect_all(diff: &ModelDiff<'_>) -> Vec<Refactoring> {
    PIPELINE
        .iter()
        .fold(Detection::default(), |acc, (name, detector)| {
            let found = detector(diff, &acc.consumed);
            debug!(detector = *name, found = found.len(), "detector finished");
            acc.merge(found)
        })
        .refactorings
        .into_iter()
        .collect()
}
