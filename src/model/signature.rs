//! Signature keys and display strings for operations and fields.

use super::entities::{FieldEntity, OperationEntity};

/// Strip generic type arguments and normalize array/varargs spelling
pub fn erase_type(ty: &str) -> String {
    let mut erased = String::with_capacity(ty.len());
    let mut depth = 0usize;
    for c in ty.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => erased.push(c),
            _ => {}
        }
    }
    match erased.strip_suffix("...") {
        Some(base) => format!("{base}[]"),
        None => erased,
    }
}

/// Key used for exact signature matching: name, erased parameter types and return type
pub fn signature_key(op: &OperationEntity) -> String {
    let params = op
        .parameters
        .iter()
        .map(|p| erase_type(&p.ty))
        .collect::<Vec<_>>()
        .join(",");
    match &op.return_type {
        Some(ret) => format!("{}({}):{}", op.name, params, erase_type(ret)),
        None => format!("{}({})", op.name, params),
    }
}

/// Erased parameter type list, ignoring names
pub fn parameter_types(op: &OperationEntity) -> Vec<String> {
    op.parameters.iter().map(|p| erase_type(&p.ty)).collect()
}

/// Human-readable operation signature, e.g. `public square(x int) : int`
pub fn display_operation(op: &OperationEntity) -> String {
    let params = op
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ");
    match (&op.return_type, op.constructor) {
        (Some(ret), false) => format!(
            "{} {}({}) : {}",
            op.visibility.keyword(),
            op.name,
            params,
            ret
        ),
        _ => format!("{} {}({})", op.visibility.keyword(), op.name, params),
    }
}

/// Human-readable field signature, e.g. `private UTF_8 : Charset`
pub fn display_field(field: &FieldEntity) -> String {
    format!(
        "{} {} : {}",
        field.visibility.keyword(),
        field.name,
        field.ty
    )
}

/// Key for field identity: name and erased type
pub fn field_key(field: &FieldEntity) -> String {
    format!("{}:{}", field.name, erase_type(&field.ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entities::Visibility;

    #[test]
    fn erasure_drops_generics_and_spaces() {
        assert_eq!(erase_type("Map<String, List<Integer>>"), "Map");
        assert_eq!(erase_type("String..."), "String[]");
        assert_eq!(erase_type("int [ ]"), "int[]");
    }

    #[test]
    fn signature_key_ignores_parameter_names_and_generics() {
        let a = OperationEntity::new("load")
            .with_parameter("ids", "List<Long>")
            .with_return_type("Set<User>");
        let b = OperationEntity::new("load")
            .with_parameter("keys", "List<String>")
            .with_return_type("Set<Account>");
        assert_eq!(signature_key(&a), signature_key(&b));
        assert_eq!(signature_key(&a), "load(List):Set");
    }

    #[test]
    fn display_formats() {
        let op = OperationEntity::new("square")
            .with_parameter("x", "int")
            .with_return_type("int");
        assert_eq!(display_operation(&op), "public square(x int) : int");

        let field = FieldEntity::new("UTF_8", "Charset").with_visibility(Visibility::Public);
        assert_eq!(display_field(&field), "public UTF_8 : Charset");
    }
}
