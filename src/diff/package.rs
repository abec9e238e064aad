//! Package classification for moved classes.
//!
//! A class that changes package may be a plain move into a package that
//! already exists, or part of a package rename. The side of a move is
//! classified against the opposite snapshot: the source package against the
//! after snapshot, the target package against the before snapshot.

use serde::{Deserialize, Serialize};

use crate::model::{ClassEntity, SnapshotModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageState {
    /// The package folder also exists in the opposite snapshot
    Existing,
    /// The package folder exists on this side only
    New,
    /// The last package segment names a class (nested type)
    Class,
    /// The opposite snapshot holds a class whose name equals the package
    Ambiguous,
}

/// Classify the package of `class` against the `opposite` snapshot
pub fn classify(class: &ClassEntity, opposite: &SnapshotModel) -> PackageState {
    let package = class.package.as_str();
    let last_segment = package.rsplit('.').next().unwrap_or(package);
    if last_segment.chars().next().is_some_and(char::is_uppercase) {
        return PackageState::Class;
    }
    if opposite.contains_class(package) {
        return PackageState::Ambiguous;
    }
    let exists = match class.range.folder() {
        Some(folder) => opposite.contains_folder(folder),
        None => opposite.has_package(package),
    };
    if exists {
        PackageState::Existing
    } else {
        PackageState::New
    }
}
