//! Move Class, Rename Class, Move And Rename Class and Rename Package.

use std::collections::BTreeMap;

use super::{Consumed, Detection};
use crate::diff::{package, ClassPairKind, ModelDiff, PackageState};
use crate::refactoring::{describe, CodeElement, Refactoring, RefactoringDetail, RefactoringKind};

pub fn detect(diff: &ModelDiff<'_>, _consumed: &Consumed) -> Detection {
    let mut detection = Detection::default();
    // (source package, target package) -> moved class count and package states
    let mut moved_packages: BTreeMap<(String, String), (usize, PackageState, PackageState)> = BTreeMap::new();

    for pair in &diff.pairs {
        let kind = match pair.kind {
            ClassPairKind::Same => continue,
            ClassPairKind::Moved => RefactoringKind::MoveClass,
            ClassPairKind::Renamed => RefactoringKind::RenameClass,
            ClassPairKind::MovedAndRenamed => RefactoringKind::MoveAndRenameClass,
        };
        let (before, after) = (pair.before(), pair.after());
        let mut record = Refactoring::new(
            kind,
            describe::move_class(kind, &before.name, &after.name),
            vec![CodeElement::class(before)],
            vec![CodeElement::class(after)],
        );
        if kind != RefactoringKind::RenameClass {
            let source = package::classify(before, diff.ctx.after);
            let target = package::classify(after, diff.ctx.before);
            record = record.with_detail(RefactoringDetail::ClassMove { source, target });
            if before.package != after.package {
                let entry = moved_packages
                    .entry((before.package.clone(), after.package.clone()))
                    .or_insert((0, source, target));
                entry.0 += 1;
            }
        }
        detection.push(record);
    }

    for ((source, target), (moved, source_state, target_state)) in moved_packages {
        let package_size = diff.ctx.before.classes().filter(|c| c.package == source).count();
        let renamed = moved == package_size
            && source_state == PackageState::New
            && target_state == PackageState::New;
        if renamed {
            detection.push(Refactoring::new(
                RefactoringKind::RenamePackage,
                describe::rename_package(&source, &target),
                vec![CodeElement::package(source.as_str())],
                vec![CodeElement::package(target.as_str())],
            ));
        }
    }
    detection
}
