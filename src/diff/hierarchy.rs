//! Inheritance forest of one snapshot.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::model::SnapshotModel;

/// Resolved `extends`/`implements` edges between classes of one snapshot
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    parents: BTreeMap<String, Vec<String>>,
    children: BTreeMap<String, Vec<String>>,
}

impl Hierarchy {
    pub fn new(model: &SnapshotModel) -> Self {
        let mut hierarchy = Self::default();
        for class in model.classes() {
            let parents: Vec<String> = class
                .supertypes()
                .filter_map(|reference| model.resolve_type(reference, &class.package))
                .map(|parent| parent.name.clone())
                .filter(|parent| parent != &class.name)
                .collect();
            for parent in &parents {
                hierarchy
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(class.name.clone());
            }
            hierarchy.parents.insert(class.name.clone(), parents);
        }
        for children in hierarchy.children.values_mut() {
            children.sort();
        }
        hierarchy
    }

    pub fn supertypes(&self, class: &str) -> &[String] {
        self.parents.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subtypes(&self, class: &str) -> &[String] {
        self.children.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive supertypes with their distance, nearest first, ties alphabetical
    pub fn ancestors(&self, class: &str) -> Vec<(String, usize)> {
        walk(class, |name| self.supertypes(name))
    }

    /// Transitive subtypes with their distance, nearest first, ties alphabetical
    pub fn descendants(&self, class: &str) -> Vec<(String, usize)> {
        walk(class, |name| self.subtypes(name))
    }

    /// Distance from `class` up to `ancestor`, if it is one
    pub fn ancestor_distance(&self, class: &str, ancestor: &str) -> Option<usize> {
        self.ancestors(class)
            .into_iter()
            .find(|(name, _)| name == ancestor)
            .map(|(_, distance)| distance)
    }

    pub fn descendant_distance(&self, class: &str, descendant: &str) -> Option<usize> {
        self.ancestor_distance(descendant, class)
    }

    /// Pick the candidate that is an ancestor of every class, nearest first
    ///
    /// Distance is the largest distance to any of the classes; remaining ties
    /// are broken alphabetically.
    pub fn nearest_common_ancestor<'c>(&self, classes: &[&str], candidates: &[&'c str]) -> Option<&'c str> {
        candidates
            .iter()
            .filter_map(|&candidate| {
                classes
                    .iter()
                    .map(|class| self.ancestor_distance(class, candidate))
                    .try_fold(0usize, |worst, d| d.map(|d| worst.max(d)))
                    .map(|distance| (distance, candidate))
            })
            .min()
            .map(|(_, candidate)| candidate)
    }
}

fn walk<'h, F>(start: &str, next: F) -> Vec<(String, usize)>
where
    F: Fn(&str) -> &'h [String],
{
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut found = Vec::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    seen.insert(start.to_string());
    queue.push_back((start.to_string(), 0));
    while let Some((name, distance)) = queue.pop_front() {
        for neighbour in next(&name) {
            if seen.insert(neighbour.clone()) {
                found.push((neighbour.clone(), distance + 1));
                queue.push_back((neighbour.clone(), distance + 1));
            }
        }
    }
    found.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassEntity, ClassKind, Side};

    fn model() -> SnapshotModel {
        SnapshotModel::new(
            Side::After,
            vec![
                ClassEntity::new("zoo.Animal"),
                ClassEntity::new("zoo.Mammal").with_superclass("Animal"),
                ClassEntity::new("zoo.Dog").with_superclass("Mammal").with_interface("Pet"),
                ClassEntity::new("zoo.Cat").with_superclass("zoo.Mammal"),
                ClassEntity::new("zoo.Pet").with_kind(ClassKind::Interface),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn ancestors_are_ordered_by_distance_then_name() {
        let hierarchy = Hierarchy::new(&model());
        assert_eq!(
            hierarchy.ancestors("zoo.Dog"),
            vec![
                ("zoo.Mammal".to_string(), 1),
                ("zoo.Pet".to_string(), 1),
                ("zoo.Animal".to_string(), 2)
            ]
        );
        assert_eq!(hierarchy.subtypes("zoo.Mammal"), &["zoo.Cat".to_string(), "zoo.Dog".to_string()]);
        assert_eq!(hierarchy.descendant_distance("zoo.Animal", "zoo.Cat"), Some(2));
    }

    #[test]
    fn nearest_common_ancestor_prefers_closest() {
        let hierarchy = Hierarchy::new(&model());
        let target = hierarchy.nearest_common_ancestor(&["zoo.Dog", "zoo.Cat"], &["zoo.Animal", "zoo.Mammal", "zoo.Pet"]);
        assert_eq!(target, Some("zoo.Mammal"));
        assert_eq!(hierarchy.nearest_common_ancestor(&["zoo.Cat"], &["zoo.Pet"]), None);
    }
}
