use pretty_assertions::assert_eq;
use refdetect::refactoring::RefactoringDetail;
use refdetect::{
    diff_models, ClassEntity, FieldEntity, Motivation, OperationEntity, Refactoring,
    RefactoringKind, RefdetectConfig, Side, SnapshotModel, StatementNode,
};
use std::collections::BTreeSet;

fn model(side: Side, classes: Vec<ClassEntity>) -> SnapshotModel {
    SnapshotModel::new(side, classes, Vec::new()).unwrap()
}

fn body(statements: &[&str]) -> StatementNode {
    StatementNode::block(statements.iter().map(|s| StatementNode::expr(*s)).collect())
}

fn op(name: &str, statements: &[&str]) -> OperationEntity {
    OperationEntity::new(name).with_body(body(statements))
}

fn detect(before: Vec<ClassEntity>, after: Vec<ClassEntity>) -> Vec<Refactoring> {
    diff_models(
        &model(Side::Before, before),
        &model(Side::After, after),
        &RefdetectConfig::default(),
    )
}

fn descriptions(records: &[Refactoring]) -> Vec<&str> {
    records.iter().map(|r| r.description.as_str()).collect()
}

fn of_kind(records: &[Refactoring], kind: RefactoringKind) -> Vec<&Refactoring> {
    records.iter().filter(|r| r.kind == kind).collect()
}

const INLINED: [&str; 4] = [
    "header();",
    "int total = sum(values);",
    "out.println(total);",
    "footer();",
];
const DELEGATING: [&str; 3] = ["header();", "printTotal();", "footer();"];
const HELPER: [&str; 2] = ["int total = sum(values);", "out.println(total);"];

#[test]
fn extract_and_inline_are_mirror_images() {
    let long = || ClassEntity::new("app.Report").with_operation(op("print", &INLINED));
    let split = || {
        ClassEntity::new("app.Report")
            .with_operation(op("print", &DELEGATING))
            .with_operation(op("printTotal", &HELPER))
    };

    let extracted = detect(vec![long()], vec![split()]);
    assert_eq!(
        descriptions(&extracted),
        vec!["Extract Method public printTotal() : void extracted from public print() : void in class app.Report"]
    );
    let record = &extracted[0];
    assert_eq!(record.before[0].name, "print");
    let after_names: Vec<&str> = record.after.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(after_names, vec!["printTotal", "print"]);
    assert!(matches!(
        record.detail,
        RefactoringDetail::Extraction { new_statements: 0, .. }
    ));
    assert_eq!(record.mapping.as_ref().map(|m| m.mapped_count()), Some(2));

    let inlined = detect(vec![split()], vec![long()]);
    assert_eq!(
        descriptions(&inlined),
        vec!["Inline Method public printTotal() : void inlined to public print() : void in class app.Report"]
    );
    assert_eq!(inlined[0].after[0].name, "print");
}

#[test]
fn extraction_into_another_class_is_extract_and_move() {
    let before = vec![
        ClassEntity::new("app.Report").with_operation(op("print", &INLINED)),
        ClassEntity::new("app.Totals"),
    ];
    let after = vec![
        ClassEntity::new("app.Report").with_operation(op(
            "print",
            &["header();", "totals.printTotal();", "footer();"],
        )),
        ClassEntity::new("app.Totals").with_operation(op("printTotal", &HELPER)),
    ];

    let records = detect(before, after);
    assert_eq!(
        descriptions(&records),
        vec!["Extract And Move Method public printTotal() : void extracted from public print() : void in class app.Report & moved to class app.Totals"]
    );
}

#[test]
fn helper_extracted_from_two_methods_removes_duplication() {
    let duplicated = ["open();", "int total = sum(values);", "out.println(total);"];
    let delegating = ["open();", "printTotal();"];
    let before = vec![ClassEntity::new("app.Report")
        .with_operation(op("printDaily", &duplicated))
        .with_operation(op("printWeekly", &duplicated))];
    let after = vec![ClassEntity::new("app.Report")
        .with_operation(op("printDaily", &delegating))
        .with_operation(op("printWeekly", &delegating))
        .with_operation(op("printTotal", &HELPER))];

    let records = detect(before, after);
    let extractions = of_kind(&records, RefactoringKind::ExtractMethod);
    assert_eq!(extractions.len(), 2);
    for record in extractions {
        let expected: BTreeSet<Motivation> = [Motivation::Reuse, Motivation::RemoveDuplication].into();
        assert_eq!(record.motivations, expected);
    }
}

#[test]
fn renamed_method_keeps_its_body() {
    let statements = ["open(path);", "int size = read(buffer);", "close();"];
    let records = detect(
        vec![ClassEntity::new("app.Io").with_operation(op("load", &statements))],
        vec![ClassEntity::new("app.Io").with_operation(op("readFile", &statements))],
    );
    assert_eq!(
        descriptions(&records),
        vec!["Rename Method public load() : void renamed to public readFile() : void in class app.Io"]
    );
}

#[test]
fn method_renamed_together_with_its_parameter() {
    let io = |name: &str, parameter: &str| {
        let statements: Vec<String> = ["open", "read", "close"]
            .iter()
            .map(|call| format!("{call}({parameter});"))
            .collect();
        let statements: Vec<&str> = statements.iter().map(String::as_str).collect();
        ClassEntity::new("app.Io").with_operation(op(name, &statements).with_parameter(parameter, "String"))
    };

    let records = detect(vec![io("load", "path")], vec![io("readFile", "file")]);
    let mut found = descriptions(&records);
    found.sort();
    assert_eq!(
        found,
        vec![
            "Rename Method public load(path String) : void renamed to public readFile(file String) : void in class app.Io",
            "Rename Parameter path : String to file : String in method public readFile(file String) : void from class app.Io",
        ]
    );
}

#[test]
fn signature_changes_are_reported_per_element() {
    let lookup = |params: &[(&str, &str)], ret: &str| {
        params
            .iter()
            .fold(OperationEntity::new("load"), |op, (name, ty)| op.with_parameter(*name, *ty))
            .with_return_type(ret)
            .with_body(StatementNode::block(vec![StatementNode::ret("return repository.find(id);")]))
    };
    let records = detect(
        vec![ClassEntity::new("app.Users").with_operation(lookup(&[("id", "int")], "User"))],
        vec![ClassEntity::new("app.Users")
            .with_operation(lookup(&[("id", "long"), ("useCache", "boolean")], "Optional<User>"))],
    );

    let mut found = descriptions(&records);
    found.sort();
    let method = "in method public load(id long, useCache boolean) : Optional<User> from class app.Users";
    assert_eq!(
        found,
        vec![
            format!("Add Parameter useCache : boolean {method}"),
            format!("Change Parameter Type id : int to id : long {method}"),
            format!("Change Return Type User to Optional<User> {method}"),
        ]
    );
}

#[test]
fn class_renames_and_moves() {
    let order = |name: &str| {
        ClassEntity::new(name)
            .with_field(FieldEntity::new("id", "long"))
            .with_field(FieldEntity::new("total", "double"))
    };
    let main = || ClassEntity::new("app.Main");

    let renamed = detect(vec![order("app.Order"), main()], vec![order("app.Purchase"), main()]);
    assert_eq!(descriptions(&renamed), vec!["Rename Class app.Order renamed to app.Purchase"]);

    let moved = detect(
        vec![order("app.Order"), main()],
        vec![order("app.model.PurchaseOrder"), main()],
    );
    assert_eq!(
        descriptions(&moved),
        vec!["Move And Rename Class app.Order moved and renamed to app.model.PurchaseOrder"]
    );
}

fn shape_hierarchy(describe_in_parent: bool) -> Vec<ClassEntity> {
    let describe = || {
        OperationEntity::new("describe")
            .with_return_type("String")
            .with_body(StatementNode::block(vec![StatementNode::ret("return name + \" shape\";")]))
    };
    let mut shape = ClassEntity::new("app.Shape");
    let mut circle = ClassEntity::new("app.Circle").with_superclass("Shape");
    let mut square = ClassEntity::new("app.Square").with_superclass("Shape");
    if describe_in_parent {
        shape = shape.with_operation(describe());
    } else {
        circle = circle.with_operation(describe());
        square = square.with_operation(describe());
    }
    vec![shape, circle, square]
}

#[test]
fn duplicated_method_is_pulled_up_and_pushed_back_down() {
    let pulled = detect(shape_hierarchy(false), shape_hierarchy(true));
    assert_eq!(
        descriptions(&pulled),
        vec![
            "Pull Up Method public describe() : String from class app.Circle to public describe() : String from class app.Shape",
            "Pull Up Method public describe() : String from class app.Square to public describe() : String from class app.Shape",
        ]
    );

    let pushed = detect(shape_hierarchy(true), shape_hierarchy(false));
    assert_eq!(
        descriptions(&pushed),
        vec![
            "Push Down Method public describe() : String from class app.Shape to public describe() : String from class app.Circle",
            "Push Down Method public describe() : String from class app.Shape to public describe() : String from class app.Square",
        ]
    );
}

#[test]
fn common_field_is_extracted_into_new_superclass() {
    let name = || FieldEntity::new("name", "String");
    let area = || op("area", &["return radius * radius * PI;"]);
    let before = vec![
        ClassEntity::new("app.Circle").with_field(name()).with_operation(area()),
        ClassEntity::new("app.Square").with_field(name()),
    ];
    let after = vec![
        ClassEntity::new("app.Shape").with_field(name()),
        ClassEntity::new("app.Circle").with_superclass("Shape").with_operation(area()),
        ClassEntity::new("app.Square").with_superclass("Shape"),
    ];

    let records = detect(before, after);
    let extracted = of_kind(&records, RefactoringKind::ExtractSuperclass);
    assert_eq!(extracted.len(), 1);
    assert_eq!(
        extracted[0].description,
        "Extract Superclass app.Shape from classes [app.Circle, app.Square]"
    );
    assert_eq!(of_kind(&records, RefactoringKind::PullUpAttribute).len(), 2);
    assert!(of_kind(&records, RefactoringKind::MoveAttribute).is_empty());
}

#[test]
fn method_moved_under_a_new_name() {
    let statements = ["buffer.write(out);", "buffer.clear();", "count = 0;"];
    let records = detect(
        vec![
            ClassEntity::new("app.Reader").with_operation(op("flushAll", &statements)),
            ClassEntity::new("app.Buffer"),
        ],
        vec![
            ClassEntity::new("app.Reader"),
            ClassEntity::new("app.Buffer").with_operation(op("drain", &statements)),
        ],
    );
    assert_eq!(
        descriptions(&records),
        vec!["Move And Rename Method public flushAll() : void from class app.Reader to public drain() : void from class app.Buffer"]
    );
}
