use super::{Consumed, Detection};
use crate::diff::{ModelDiff, SignatureDiff};
use crate::refactoring::{describe, CodeElement, Refactoring, RefactoringDetail, RefactoringKind};

/// One Parameterize Test record per folded test method
///
/// The signature changes between each source and the parameterized method
/// are carried by the record rather than reported separately.
pub fn detect(diff: &ModelDiff<'_>, _consumed: &Consumed) -> Detection {
    let mut detection = Detection::default();
    for pair in &diff.pairs {
        for test in &pair.diff.parameterized {
            let target = test.after.op();
            for (source, mapping) in &test.sources {
                let record = Refactoring::new(
                    RefactoringKind::ParameterizeTest,
                    describe::relocated_operation(
                        RefactoringKind::ParameterizeTest,
                        source.op(),
                        &pair.before().name,
                        target,
                        &pair.after().name,
                    ),
                    vec![CodeElement::operation(pair.before(), source.op())],
                    vec![CodeElement::operation(pair.after(), target)],
                )
                .with_detail(RefactoringDetail::Signature(SignatureDiff::between(source.op(), target)))
                .with_mapping(Some(mapping.clone()));
                detection.push(record);
                detection.consume_operation(source);
            }
            detection.consume_operation(&test.after);
        }
    }
    detection
}
