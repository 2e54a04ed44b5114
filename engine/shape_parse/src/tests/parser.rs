//! Core parser tests: grammar coverage, nesting, and failure modes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use shape_ir::{FieldKey, KeyKind, ScalarKind, StringInterner, TypeExpr};

use crate::{parse_type_expr, ParseError};

fn parse(src: &str) -> Result<TypeExpr, ParseError> {
    let interner = StringInterner::new();
    parse_type_expr(src, &interner)
}

#[test]
fn parses_scalars() {
    for (src, kind) in [
        ("int", ScalarKind::Int),
        ("float", ScalarKind::Float),
        ("string", ScalarKind::String),
        ("bool", ScalarKind::Bool),
        ("null", ScalarKind::Null),
        ("mixed", ScalarKind::Mixed),
    ] {
        assert_eq!(parse(src).unwrap(), TypeExpr::Scalar(kind), "source: {src}");
    }
}

#[test]
fn parses_nullable() {
    assert_eq!(
        parse("?int").unwrap(),
        TypeExpr::nullable(TypeExpr::Scalar(ScalarKind::Int))
    );
}

#[test]
fn parses_nested_lists() {
    assert_eq!(
        parse("List<List<int>>").unwrap(),
        TypeExpr::list_of(TypeExpr::list_of(TypeExpr::Scalar(ScalarKind::Int)))
    );
}

#[test]
fn parses_map_with_key_kinds() {
    assert_eq!(
        parse("Map<int, string>").unwrap(),
        TypeExpr::map_of(KeyKind::Int, TypeExpr::Scalar(ScalarKind::String))
    );
    assert_eq!(
        parse("Map<string, List<bool>>").unwrap(),
        TypeExpr::map_of(
            KeyKind::String,
            TypeExpr::list_of(TypeExpr::Scalar(ScalarKind::Bool))
        )
    );
}

#[test]
fn rejects_bad_map_key_kind() {
    let err = parse("Map<float, int>").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert_eq!(err.offset(), 4);
}

#[test]
fn commas_inside_nested_generics_are_not_field_separators() {
    // The inner `Map<string, int>` comma must not split the outer shape.
    let interner = StringInterner::new();
    let ty = parse_type_expr("{a: Map<string, int>, b: bool}", &interner).unwrap();
    let body = ty.shape_body().expect("inline shape");
    assert_eq!(body.len(), 2);
    let a = interner.intern("a");
    assert_eq!(
        body.field(FieldKey::Str(a)).unwrap().ty,
        TypeExpr::map_of(KeyKind::String, TypeExpr::Scalar(ScalarKind::Int))
    );
}

#[test]
fn commas_inside_nested_shapes_are_not_field_separators() {
    let interner = StringInterner::new();
    let ty = parse_type_expr("{outer: {x: int, y: int}, flag: bool}", &interner).unwrap();
    let body = ty.shape_body().expect("inline shape");
    assert_eq!(body.len(), 2);
    let outer = interner.intern("outer");
    let inner = body.field(FieldKey::Str(outer)).unwrap();
    assert_eq!(inner.ty.shape_body().expect("nested shape").len(), 2);
}

#[test]
fn numeric_keys_are_integer_keys() {
    let interner = StringInterner::new();
    let ty = parse_type_expr("{0: int, 1: string}", &interner).unwrap();
    let body = ty.shape_body().expect("inline shape");
    assert_eq!(
        body.keys().collect::<Vec<_>>(),
        vec![FieldKey::Int(0), FieldKey::Int(1)]
    );
}

#[test]
fn optional_fields_and_trailing_comma() {
    let interner = StringInterner::new();
    let ty = parse_type_expr("{id: int, email?: ?string,}", &interner).unwrap();
    let body = ty.shape_body().expect("inline shape");
    assert_eq!(body.len(), 2);
    let email = interner.intern("email");
    let field = body.field(FieldKey::Str(email)).unwrap();
    assert!(field.optional);
    assert_eq!(
        field.ty,
        TypeExpr::nullable(TypeExpr::Scalar(ScalarKind::String))
    );
}

#[test]
fn bang_marks_shape_closed() {
    let interner = StringInterner::new();
    let open = parse_type_expr("{id: int}", &interner).unwrap();
    let closed = parse_type_expr("{id: int}!", &interner).unwrap();
    assert!(!open.shape_body().unwrap().closed);
    assert!(closed.shape_body().unwrap().closed);
}

#[test]
fn parses_union() {
    let ty = parse("int|string|null").unwrap();
    assert_eq!(
        ty,
        TypeExpr::Union(vec![
            TypeExpr::Scalar(ScalarKind::Int),
            TypeExpr::Scalar(ScalarKind::String),
            TypeExpr::Scalar(ScalarKind::Null),
        ])
    );
}

#[test]
fn nullable_binds_to_one_union_alternative() {
    let ty = parse("?int|string").unwrap();
    assert_eq!(
        ty,
        TypeExpr::Union(vec![
            TypeExpr::nullable(TypeExpr::Scalar(ScalarKind::Int)),
            TypeExpr::Scalar(ScalarKind::String),
        ])
    );
}

#[test]
fn bare_name_parses_to_shape_ref() {
    let interner = StringInterner::new();
    let ty = parse_type_expr("UserShape", &interner).unwrap();
    assert_eq!(ty, TypeExpr::ShapeRef(interner.intern("UserShape")));
}

#[test]
fn union_inside_field_type_stops_at_comma() {
    let interner = StringInterner::new();
    let ty = parse_type_expr("{v: int|string, w: bool}", &interner).unwrap();
    let body = ty.shape_body().expect("inline shape");
    assert_eq!(body.len(), 2);
    let v = interner.intern("v");
    assert!(matches!(
        body.field(FieldKey::Str(v)).unwrap().ty,
        TypeExpr::Union(_)
    ));
}

#[test]
fn display_of_parsed_type_reparses_to_same_ast() {
    let interner = StringInterner::new();
    for src in [
        "List<Map<string, ?int>>",
        "{id: int, name?: string, 0: bool}!",
        "?int|string",
        "Map<int, {a: List<int>}>",
    ] {
        let ty = parse_type_expr(src, &interner).unwrap();
        let rendered = ty.display(&interner).to_string();
        let reparsed = parse_type_expr(&rendered, &interner).unwrap();
        assert_eq!(ty, reparsed, "render: {rendered}");
    }
}

#[test]
fn error_on_unclosed_generic() {
    for src in ["List<int", "Map<string, int", "List<int,"] {
        let err = parse(src).unwrap_err();
        assert!(
            matches!(err, ParseError::UnclosedDelimiter { delimiter: '<', .. }),
            "source: {src}, got: {err:?}"
        );
        assert_eq!(
            err.to_diagnostic().code,
            shape_diagnostic::ErrorCode::E0004,
            "source: {src}"
        );
    }
}

#[test]
fn error_on_unclosed_shape() {
    let err = parse("{id: int").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnclosedDelimiter { delimiter: '{', .. }
    ));
}

#[test]
fn error_on_empty_input() {
    let err = parse("").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    assert_eq!(err.offset(), 0);
}

#[test]
fn error_on_trailing_tokens() {
    let err = parse("int int").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert_eq!(err.offset(), 4);
}

#[test]
fn error_on_invalid_character() {
    let err = parse("List<#>").unwrap_err();
    assert!(matches!(err, ParseError::InvalidChar { ch: '#', .. }));
}

#[test]
fn error_on_missing_colon_in_field() {
    let err = parse("{id int}").unwrap_err();
    match err {
        ParseError::UnexpectedToken { expected, .. } => {
            assert_eq!(expected, "`:` after field key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn error_on_huge_integer_key() {
    let err = parse("{99999999999999999999: int}").unwrap_err();
    assert!(matches!(err, ParseError::IntKeyOutOfRange { .. }));
}

#[test]
fn parse_error_converts_to_diagnostic() {
    let err = parse("int int").unwrap_err();
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, shape_diagnostic::ErrorCode::E0001);
    assert!(!diag.labels.is_empty());
}
