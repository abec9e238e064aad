//! Motivation tags for extracted and moved operations.
//!
//! Each rule looks at the after snapshot around one record independently of
//! the others; a record keeps every tag whose rule holds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::diff::{ModelDiff, OperationRef};
use crate::mapper::OperationKey;
use crate::model::signature::{parameter_types, signature_key};
use crate::model::{Side, Visibility};
use crate::refactoring::{Refactoring, RefactoringDetail, RefactoringKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Motivation {
    Reuse,
    RemoveDuplication,
    ImproveTestability,
    EnableOverriding,
    EnableRecursion,
    FacilitateExtension,
    IntroduceAlternativeSignature,
    PreserveBackwardCompatibility,
}

impl Motivation {
    pub fn display_name(&self) -> &'static str {
        match self {
            Motivation::Reuse => "Reuse",
            Motivation::RemoveDuplication => "Remove Duplication",
            Motivation::ImproveTestability => "Improve Testability",
            Motivation::EnableOverriding => "Enable Overriding",
            Motivation::EnableRecursion => "Enable Recursion",
            Motivation::FacilitateExtension => "Facilitate Extension",
            Motivation::IntroduceAlternativeSignature => "Introduce Alternative Signature",
            Motivation::PreserveBackwardCompatibility => "Preserve Backward Compatibility",
        }
    }
}

impl fmt::Display for Motivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What the rules know about one record
struct Evidence<'m> {
    kind: RefactoringKind,
    /// The extracted or moved operation, after side
    operation: OperationRef<'m>,
    /// The operation the body was extracted from, after side
    source: Option<OperationRef<'m>>,
    /// Call sites of `operation` outside itself
    callers: Vec<OperationRef<'m>>,
    recursive: bool,
    new_statements: usize,
    /// Extract records sharing this extracted operation
    extractions: usize,
}

type Rule = fn(&ModelDiff<'_>, &Evidence<'_>) -> bool;

const RULES: [(Motivation, Rule); 8] = [
    (Motivation::Reuse, reused),
    (Motivation::RemoveDuplication, removes_duplication),
    (Motivation::ImproveTestability, improves_testability),
    (Motivation::EnableOverriding, enables_overriding),
    (Motivation::EnableRecursion, enables_recursion),
    (Motivation::FacilitateExtension, facilitates_extension),
    (Motivation::IntroduceAlternativeSignature, introduces_alternative_signature),
    (Motivation::PreserveBackwardCompatibility, preserves_backward_compatibility),
];

/// Attach motivations to every record whose kind carries them
pub fn classify(diff: &ModelDiff<'_>, records: &mut [Refactoring]) {
    if !records.iter().any(|r| r.kind.has_motivations()) {
        return;
    }
    let calls = CallIndex::build(diff);
    let mut extractions: HashMap<OperationKey, usize> = HashMap::new();
    for record in records.iter() {
        if let RefactoringDetail::Extraction { extracted, .. } = &record.detail {
            if is_extract(record.kind) {
                *extractions.entry(extracted.clone()).or_default() += 1;
            }
        }
    }

    for record in records.iter_mut().filter(|r| r.kind.has_motivations()) {
        let Some(evidence) = evidence(diff, record, &calls, &extractions) else {
            continue;
        };
        record.motivations = RULES
            .iter()
            .filter(|(_, rule)| rule(diff, &evidence))
            .map(|(motivation, _)| *motivation)
            .collect();
    }
}

fn is_extract(kind: RefactoringKind) -> bool {
    matches!(kind, RefactoringKind::ExtractMethod | RefactoringKind::ExtractAndMoveMethod)
}

fn evidence<'m>(
    diff: &ModelDiff<'m>,
    record: &Refactoring,
    calls: &CallIndex<'m>,
    extractions: &HashMap<OperationKey, usize>,
) -> Option<Evidence<'m>> {
    let (operation, source, new_statements) = match &record.detail {
        RefactoringDetail::Extraction {
            source_after,
            extracted,
            new_statements,
            ..
        } => (resolve(diff, extracted)?, resolve(diff, source_after), *new_statements),
        RefactoringDetail::Relocation { after, .. } => (resolve(diff, after)?, None, 0),
        _ => return None,
    };
    let sites = calls.sites(&operation);
    let recursive = sites.iter().any(|caller| *caller == operation);
    Some(Evidence {
        kind: record.kind,
        operation,
        source,
        callers: sites.into_iter().filter(|caller| *caller != operation).collect(),
        recursive,
        new_statements,
        extractions: extractions.get(&operation.key()).copied().unwrap_or(0),
    })
}

fn resolve<'m>(diff: &ModelDiff<'m>, key: &OperationKey) -> Option<OperationRef<'m>> {
    diff.ctx
        .model(key.side)
        .class(&key.class_name)
        .filter(|class| key.index < class.operations.len())
        .map(|class| OperationRef::new(key.side, class, key.index))
}

fn reused(_: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    evidence.callers.len() >= 2
}

fn removes_duplication(_: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    evidence.extractions >= 2
}

fn enables_recursion(_: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    evidence.recursive
}

fn facilitates_extension(_: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    evidence.new_statements > 0
}

fn improves_testability(diff: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    let tests = &diff.ctx.config.tests;
    evidence.callers.iter().any(|caller| {
        caller
            .op()
            .annotations
            .iter()
            .any(|a| tests.is_test(a.simple_name()) || tests.is_parameterized(a.simple_name()))
    })
}

fn enables_overriding(diff: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    let op = evidence.operation.op();
    if op.visibility == Visibility::Protected {
        return true;
    }
    let key = signature_key(op);
    diff.after_hierarchy
        .descendants(&evidence.operation.class.name)
        .iter()
        .filter_map(|(name, _)| diff.ctx.after.class(name))
        .any(|class| class.operations.iter().any(|o| signature_key(o) == key))
}

/// The source's whole after body is a call to the extracted operation
fn delegates_only(diff: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    let Some(source) = evidence.source else {
        return false;
    };
    let tree = diff.ctx.tree(&source);
    let target = evidence.operation.op();
    tree.countable(None) == 1 && tree.calls(&target.name, target.parameters.len())
}

fn is_deprecated(op: &OperationRef<'_>) -> bool {
    op.op().has_annotation("Deprecated")
}

fn introduces_alternative_signature(diff: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    let Some(source) = evidence.source else {
        return false;
    };
    evidence.kind == RefactoringKind::ExtractMethod
        && delegates_only(diff, evidence)
        && parameter_types(source.op()) != parameter_types(evidence.operation.op())
        && !is_deprecated(&source)
}

fn preserves_backward_compatibility(diff: &ModelDiff<'_>, evidence: &Evidence<'_>) -> bool {
    let Some(source) = evidence.source else {
        return false;
    };
    delegates_only(diff, evidence)
        && (is_deprecated(&source) || evidence.kind == RefactoringKind::ExtractAndMoveMethod)
}

/// After-side call sites keyed by callee name and arity
struct CallIndex<'m> {
    sites: HashMap<(String, usize), Vec<OperationRef<'m>>>,
}

impl<'m> CallIndex<'m> {
    fn build(diff: &ModelDiff<'m>) -> Self {
        let mut sites: HashMap<(String, usize), Vec<OperationRef<'m>>> = HashMap::new();
        for class in diff.ctx.after.classes() {
            for caller in OperationRef::all_of(Side::After, class) {
                for call in diff.ctx.tree(&caller).method_calls() {
                    sites.entry((call.name, call.arguments)).or_default().push(caller);
                }
            }
        }
        Self { sites }
    }

    fn sites(&self, op: &OperationRef<'m>) -> Vec<OperationRef<'m>> {
        let key = (op.op().name.clone(), op.op().parameters.len());
        self.sites.get(&key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefdetectConfig;
    use crate::diff::DiffContext;
    use crate::model::{Annotation, ClassEntity, OperationEntity, SnapshotModel, StatementNode};
    use std::collections::BTreeSet;

    fn body(statements: &[&str]) -> StatementNode {
        StatementNode::block(statements.iter().map(|s| StatementNode::expr(*s)).collect())
    }

    fn extract_record(class: &str, source: usize, extracted: usize, new_statements: usize) -> Refactoring {
        Refactoring::new(RefactoringKind::ExtractMethod, format!("extract {extracted} from {source}"), vec![], vec![])
            .with_detail(RefactoringDetail::Extraction {
                source_before: OperationKey::new(Side::Before, class, source),
                source_after: OperationKey::new(Side::After, class, source),
                extracted: OperationKey::new(Side::After, class, extracted),
                new_statements,
            })
    }

    fn classify_one(before: Vec<ClassEntity>, after: Vec<ClassEntity>, record: Refactoring) -> BTreeSet<Motivation> {
        let before = SnapshotModel::new(Side::Before, before, Vec::new()).unwrap();
        let after = SnapshotModel::new(Side::After, after, Vec::new()).unwrap();
        let config = RefdetectConfig::default();
        let diff = ModelDiff::build(DiffContext::new(&before, &after, &config));
        let mut records = vec![record];
        classify(&diff, &mut records);
        records.remove(0).motivations
    }

    #[test]
    fn reused_protected_helper_called_from_test() {
        let calc_before = ClassEntity::new("app.Calc").with_operation(
            OperationEntity::new("compute")
                .with_parameter("a", "int")
                .with_parameter("b", "int")
                .with_body(body(&["int sum = a * a + b * b;", "return sum;"])),
        );
        let calc_after = ClassEntity::new("app.Calc")
            .with_operation(
                OperationEntity::new("compute")
                    .with_parameter("a", "int")
                    .with_parameter("b", "int")
                    .with_body(body(&["int sum = square(a) + square(b);", "return sum;"])),
            )
            .with_operation(
                OperationEntity::new("square")
                    .with_parameter("x", "int")
                    .with_return_type("int")
                    .with_visibility(Visibility::Protected)
                    .with_body(body(&["return x * x;"])),
            );
        let test = ClassEntity::new("app.CalcTest").with_operation(
            OperationEntity::new("squares")
                .with_annotation(Annotation::marker("Test"))
                .with_body(body(&["assertEquals(4, calc.square(2));"])),
        );

        let motivations = classify_one(
            vec![calc_before],
            vec![calc_after, test],
            extract_record("app.Calc", 0, 1, 0),
        );
        assert_eq!(
            motivations,
            BTreeSet::from([
                Motivation::Reuse,
                Motivation::ImproveTestability,
                Motivation::EnableOverriding,
            ])
        );
    }

    #[test]
    fn deprecated_delegate_preserves_compatibility() {
        let parse = |radix: bool| {
            let op = OperationEntity::new("parse").with_parameter("s", "String").with_return_type("int");
            if radix {
                op.with_parameter("radix", "int")
                    .with_body(body(&["return Integer.parseInt(s, radix);"]))
            } else {
                op.with_annotation(Annotation::marker("Deprecated"))
                    .with_body(body(&["return parse(s, 10);"]))
            }
        };
        let before = ClassEntity::new("app.Parser").with_operation(
            OperationEntity::new("parse")
                .with_parameter("s", "String")
                .with_return_type("int")
                .with_body(body(&["return Integer.parseInt(s, 10);"])),
        );
        let after = ClassEntity::new("app.Parser")
            .with_operation(parse(false))
            .with_operation(parse(true));

        let motivations = classify_one(vec![before], vec![after], extract_record("app.Parser", 0, 1, 0));
        assert_eq!(motivations, BTreeSet::from([Motivation::PreserveBackwardCompatibility]));
    }

    #[test]
    fn recursion_and_new_statements() {
        let before = ClassEntity::new("app.Math")
            .with_operation(OperationEntity::new("run").with_body(body(&["log(1);"])));
        let after = ClassEntity::new("app.Math")
            .with_operation(OperationEntity::new("run").with_body(body(&["log(factorial(5));", "flush();"])))
            .with_operation(
                OperationEntity::new("factorial")
                    .with_parameter("n", "int")
                    .with_return_type("int")
                    .with_visibility(Visibility::Private)
                    .with_body(body(&["return n <= 1 ? 1 : n * factorial(n - 1);"])),
            );

        let motivations = classify_one(vec![before], vec![after], extract_record("app.Math", 0, 1, 1));
        assert_eq!(
            motivations,
            BTreeSet::from([Motivation::EnableRecursion, Motivation::FacilitateExtension])
        );
    }

    #[test]
    fn duplicated_extractions_are_tagged() {
        let helper = || {
            OperationEntity::new("reset")
                .with_visibility(Visibility::Private)
                .with_body(body(&["count = 0;"]))
        };
        let caller = |name: &str, calls: bool| {
            let statements: &[&str] = if calls { &["reset();", "done();"] } else { &["count = 0;", "done();"] };
            OperationEntity::new(name).with_body(body(statements))
        };
        let before = ClassEntity::new("app.Counter")
            .with_operation(caller("start", false))
            .with_operation(caller("stop", false));
        let after = ClassEntity::new("app.Counter")
            .with_operation(caller("start", true))
            .with_operation(caller("stop", true))
            .with_operation(helper());

        let before = SnapshotModel::new(Side::Before, vec![before], Vec::new()).unwrap();
        let after = SnapshotModel::new(Side::After, vec![after], Vec::new()).unwrap();
        let config = RefdetectConfig::default();
        let diff = ModelDiff::build(DiffContext::new(&before, &after, &config));
        let mut records = vec![
            extract_record("app.Counter", 0, 2, 0),
            extract_record("app.Counter", 1, 2, 0),
        ];
        classify(&diff, &mut records);
        for record in &records {
            assert_eq!(
                record.motivations,
                BTreeSet::from([Motivation::Reuse, Motivation::RemoveDuplication])
            );
        }
    }
}
