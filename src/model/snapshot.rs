//! Immutable structural model of one codebase state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::entities::ClassEntity;
use super::Side;
use crate::core::errors::{Error, Result};

/// Serialized form handed over by the parsing front end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub classes: Vec<ClassEntity>,
    /// Source folders present in this state, relative to the repository root
    #[serde(default)]
    pub folders: Vec<String>,
}

/// One side of a comparison
///
/// Classes are keyed by fully-qualified name; construction rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotModel {
    classes: BTreeMap<String, ClassEntity>,
    folders: BTreeSet<String>,
}

impl SnapshotModel {
    /// Build a snapshot, failing with `DuplicateEntity` when two classes share a name
    pub fn new(
        side: Side,
        classes: impl IntoIterator<Item = ClassEntity>,
        folders: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut by_name = BTreeMap::new();
        for class in classes {
            if by_name.contains_key(&class.name) {
                return Err(Error::duplicate_entity(side, class.name));
            }
            by_name.insert(class.name.clone(), class);
        }

        let mut folders: BTreeSet<String> = folders
            .into_iter()
            .map(|f| f.trim_end_matches('/').to_string())
            .collect();
        folders.extend(
            by_name
                .values()
                .filter_map(|c| c.range.folder())
                .map(str::to_string),
        );

        Ok(Self {
            classes: by_name,
            folders,
        })
    }

    pub fn from_raw(side: Side, raw: RawSnapshot) -> Result<Self> {
        Self::new(side, raw.classes, raw.folders)
    }

    pub fn from_json(side: Side, json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Self::from_raw(side, raw)
    }

    /// Read a snapshot file; unreadable or malformed input is a parse failure
    pub fn load(side: Side, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::parse(path, format!("cannot read snapshot: {e}")))?;
        let raw: RawSnapshot =
            serde_json::from_str(&content).map_err(|e| Error::parse(path, e.to_string()))?;
        Self::from_raw(side, raw)
    }

    pub fn to_raw(&self) -> RawSnapshot {
        RawSnapshot {
            classes: self.classes.values().cloned().collect(),
            folders: self.folders.iter().cloned().collect(),
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntity> {
        self.classes.get(name)
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Classes in fully-qualified name order
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntity> {
        self.classes.values()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains_folder(&self, folder: &str) -> bool {
        self.folders.contains(folder.trim_end_matches('/'))
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.classes.values().any(|c| c.package == package)
    }

    /// Resolve a type reference as written in an `extends`/`implements` clause
    ///
    /// Tries the exact qualified name, then the referencing package, then a
    /// unique simple-name match anywhere in the snapshot.
    pub fn resolve_type(&self, reference: &str, from_package: &str) -> Option<&ClassEntity> {
        let reference = reference.split('<').next().unwrap_or(reference).trim();
        if let Some(class) = self.classes.get(reference) {
            return Some(class);
        }
        if !from_package.is_empty() {
            if let Some(class) = self.classes.get(&format!("{from_package}.{reference}")) {
                return Some(class);
            }
        }
        let mut candidates = self
            .classes
            .values()
            .filter(|c| c.simple_name() == reference || c.name.ends_with(&format!(".{reference}")));
        let first = candidates.next()?;
        match candidates.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_fatal() {
        let err = SnapshotModel::new(
            Side::After,
            vec![ClassEntity::new("p.A"), ClassEntity::new("p.A")],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateEntity { side: Side::After, ref name } if name == "p.A"));
    }

    #[test]
    fn folders_include_class_directories() {
        let model = SnapshotModel::new(
            Side::Before,
            vec![ClassEntity::new("p1.X").with_file("src/p1/X.java")],
            vec!["src/p2/".to_string()],
        )
        .unwrap();
        assert!(model.contains_folder("src/p1"));
        assert!(model.contains_folder("src/p2"));
        assert!(!model.contains_folder("src/p3"));
    }

    #[test]
    fn resolves_simple_and_qualified_references() {
        let model = SnapshotModel::new(
            Side::Before,
            vec![
                ClassEntity::new("p.Base"),
                ClassEntity::new("p.Child").with_superclass("Base"),
                ClassEntity::new("q.Other"),
            ],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(model.resolve_type("Base", "p").map(|c| c.name.as_str()), Some("p.Base"));
        assert_eq!(model.resolve_type("q.Other", "p").map(|c| c.name.as_str()), Some("q.Other"));
        assert_eq!(model.resolve_type("Other<T>", "p").map(|c| c.name.as_str()), Some("q.Other"));
        assert!(model.resolve_type("Missing", "p").is_none());
    }

    #[test]
    fn parses_json_input() {
        let json = r#"{"classes":[{"name":"p.A","package":"p","operations":[{"name":"run","return_type":"void","body":{"kind":"block","children":[{"kind":"expression","text":"go();"}]}}]}]}"#;
        let model = SnapshotModel::from_json(Side::Before, json).unwrap();
        let class = model.class("p.A").unwrap();
        assert_eq!(class.operations.len(), 1);
        assert_eq!(class.operations[0].body.as_ref().map(|b| b.children.len()), Some(1));
    }
}
