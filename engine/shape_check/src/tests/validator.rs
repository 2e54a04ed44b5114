//! Structural walk tests: kinds, paths, shapes, unions, references.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use shape_ir::{FieldKey, MapKey, StringInterner, TypeExpr, Value, ValueKind};
use shape_parse::parse_type_expr;
use shape_registry::{ResolveError, ShapeRegistry};

use crate::{NominalInstanceOf, Outcome, Validator, Violation, ViolationKind};

fn registry() -> Arc<ShapeRegistry> {
    let mut reg = ShapeRegistry::new(Arc::new(StringInterner::new()));
    reg.declare_shape("User", None, "{id: int, name: string, email?: string}")
        .unwrap();
    reg.declare_shape("Admin", Some("User"), "{role: string}")
        .unwrap();
    reg.declare_shape("Point", None, "{x: int, y: int}!").unwrap();
    reg.declare_class("Exception", None).unwrap();
    reg.declare_class("RuntimeException", Some("Exception"))
        .unwrap();
    reg.seal().unwrap();
    Arc::new(reg)
}

fn check(reg: &Arc<ShapeRegistry>, ty: &str, value: &Value) -> Outcome {
    try_check(reg, ty, value).unwrap()
}

fn try_check(reg: &Arc<ShapeRegistry>, ty: &str, value: &Value) -> Result<Outcome, ResolveError> {
    let ty = parse_type_expr(ty, reg.interner()).unwrap();
    let classes = NominalInstanceOf::new(Arc::clone(reg));
    Validator::new(reg, &classes).validate(value, &ty)
}

fn violation(outcome: Outcome) -> Violation {
    match outcome {
        Outcome::Invalid(v) => v,
        Outcome::Valid => panic!("expected a violation"),
    }
}

fn path_of(reg: &ShapeRegistry, v: &Violation) -> String {
    v.path.display(reg.interner()).to_string()
}

fn entry(reg: &ShapeRegistry, key: &str, value: Value) -> (MapKey, Value) {
    (MapKey::str(reg.interner(), key), value)
}

#[test]
fn scalars_accept_matching_kinds() {
    let reg = registry();
    assert!(check(&reg, "int", &Value::Int(3)).is_valid());
    assert!(check(&reg, "string", &Value::string("a")).is_valid());
    assert!(check(&reg, "bool", &Value::Bool(true)).is_valid());
    assert!(check(&reg, "float", &Value::Float(1.5)).is_valid());
    assert!(check(&reg, "null", &Value::Null).is_valid());
}

#[test]
fn mixed_accepts_everything() {
    let reg = registry();
    for value in [
        Value::Null,
        Value::Int(0),
        Value::string("s"),
        Value::list(vec![]),
        Value::map([]),
    ] {
        assert!(check(&reg, "mixed", &value).is_valid());
    }
}

#[test]
fn no_numeric_coercion() {
    let reg = registry();
    // int and float are distinct kinds; strings never convert.
    let v = violation(check(&reg, "float", &Value::Int(1)));
    assert_eq!(v.kind, ViolationKind::WrongKind);
    assert_eq!(v.actual, Some(ValueKind::Int));

    let v = violation(check(&reg, "int", &Value::string("1")));
    assert_eq!(v.expected, "int");
    assert_eq!(v.actual, Some(ValueKind::Str));
}

#[test]
fn plain_scalar_rejects_null() {
    let reg = registry();
    let v = violation(check(&reg, "int", &Value::Null));
    assert_eq!(v.actual, Some(ValueKind::Null));
}

#[test]
fn nullable_accepts_null_and_inner() {
    let reg = registry();
    assert!(check(&reg, "?int", &Value::Null).is_valid());
    assert!(check(&reg, "?int", &Value::Int(7)).is_valid());
    assert!(!check(&reg, "?int", &Value::string("x")).is_valid());
}

#[test]
fn empty_collections_conform_to_any_element_type() {
    let reg = registry();
    assert!(check(&reg, "List<User>", &Value::list(vec![])).is_valid());
    assert!(check(&reg, "Map<string, Point>", &Value::map([])).is_valid());
}

#[test]
fn list_failure_reports_nested_index_path() {
    let reg = registry();
    let value = Value::list(vec![
        Value::list(vec![Value::Int(1)]),
        Value::list(vec![Value::Int(2), Value::string("x")]),
    ]);
    let v = violation(check(&reg, "List<List<int>>", &value));
    assert_eq!(v.kind, ViolationKind::WrongKind);
    assert_eq!(path_of(&reg, &v), "$value[1][1]");
    assert_eq!(v.expected, "int");
    assert_eq!(v.message(reg.interner()), "$value[1][1] must be of type int, string given");
}

#[test]
fn list_stops_at_first_failure() {
    let reg = registry();
    let value = Value::list(vec![Value::string("a"), Value::string("b"), Value::Int(1)]);
    let v = violation(check(&reg, "List<int>", &value));
    assert_eq!(path_of(&reg, &v), "$value[0]");
}

#[test]
fn non_list_against_list_fails_at_root() {
    let reg = registry();
    let v = violation(check(&reg, "List<int>", &Value::Int(1)));
    assert_eq!(path_of(&reg, &v), "$value");
    assert_eq!(v.expected, "List<int>");
}

#[test]
fn map_checks_key_kind() {
    let reg = registry();
    let value = Value::map([(MapKey::Int(5), Value::Int(1))]);
    let v = violation(check(&reg, "Map<string, int>", &value));
    assert_eq!(v.kind, ViolationKind::WrongKind);
    assert_eq!(path_of(&reg, &v), "$value[5]");
    assert_eq!(v.expected, "string key");
    assert_eq!(v.actual, Some(ValueKind::Int));
}

#[test]
fn map_value_failure_reports_key_path() {
    let reg = registry();
    let value = Value::map([
        entry(&reg, "a", Value::Int(1)),
        entry(&reg, "b", Value::string("x")),
    ]);
    let v = violation(check(&reg, "Map<string, int>", &value));
    assert_eq!(path_of(&reg, &v), "$value[\"b\"]");
}

#[test]
fn shape_missing_required_key() {
    let reg = registry();
    let value = Value::map([entry(&reg, "id", Value::Int(1))]);
    let v = violation(check(&reg, "User", &value));
    let name = reg.interner().get("name").unwrap();
    assert_eq!(v.kind, ViolationKind::MissingKey(FieldKey::Str(name)));
    assert_eq!(path_of(&reg, &v), "$value[\"name\"]");
    assert_eq!(v.actual, None);
    assert_eq!(
        v.message(reg.interner()),
        "$value is missing required key 'name' of type string"
    );
}

#[test]
fn optional_key_may_be_absent_but_not_wrong() {
    let reg = registry();
    let present_ok = Value::map([
        entry(&reg, "id", Value::Int(1)),
        entry(&reg, "name", Value::string("ada")),
        entry(&reg, "email", Value::string("ada@example.org")),
    ]);
    assert!(check(&reg, "User", &present_ok).is_valid());

    let absent = Value::map([
        entry(&reg, "id", Value::Int(1)),
        entry(&reg, "name", Value::string("ada")),
    ]);
    assert!(check(&reg, "User", &absent).is_valid());

    let present_wrong = Value::map([
        entry(&reg, "id", Value::Int(1)),
        entry(&reg, "name", Value::string("ada")),
        entry(&reg, "email", Value::Int(9)),
    ]);
    let v = violation(check(&reg, "User", &present_wrong));
    assert_eq!(path_of(&reg, &v), "$value[\"email\"]");
}

#[test]
fn optional_does_not_mean_nullable() {
    let reg = registry();
    // An optional key may be absent, but when present it must satisfy
    // the field's type; null only passes if the type itself is nullable.
    let value = Value::map([
        entry(&reg, "id", Value::Int(1)),
        entry(&reg, "name", Value::string("ada")),
        entry(&reg, "email", Value::Null),
    ]);
    let v = violation(check(&reg, "User", &value));
    assert_eq!(path_of(&reg, &v), "$value[\"email\"]");

    let note = Value::map([entry(&reg, "note", Value::Null)]);
    assert!(check(&reg, "{note?: ?string}", &note).is_valid());
}

#[test]
fn open_shape_tolerates_undeclared_keys() {
    let reg = registry();
    let value = Value::map([
        entry(&reg, "id", Value::Int(1)),
        entry(&reg, "name", Value::string("ada")),
        entry(&reg, "nickname", Value::string("al")),
    ]);
    assert!(check(&reg, "User", &value).is_valid());
}

#[test]
fn closed_shape_rejects_undeclared_keys() {
    let reg = registry();
    let value = Value::map([
        entry(&reg, "x", Value::Int(1)),
        entry(&reg, "y", Value::Int(2)),
        entry(&reg, "z", Value::Int(3)),
    ]);
    let v = violation(check(&reg, "Point", &value));
    let z = reg.interner().get("z").unwrap();
    assert_eq!(v.kind, ViolationKind::UnexpectedKey(FieldKey::Str(z)));
    assert_eq!(path_of(&reg, &v), "$value[\"z\"]");
    assert_eq!(v.expected, "Point");
}

#[test]
fn inherited_fields_are_required_on_the_child() {
    let reg = registry();
    // role alone is not enough; the flattened Admin still wants User's
    // required fields.
    let value = Value::map([entry(&reg, "role", Value::string("ops"))]);
    let v = violation(check(&reg, "Admin", &value));
    let id = reg.interner().get("id").unwrap();
    assert_eq!(v.kind, ViolationKind::MissingKey(FieldKey::Str(id)));

    let full = Value::map([
        entry(&reg, "id", Value::Int(1)),
        entry(&reg, "name", Value::string("ada")),
        entry(&reg, "role", Value::string("ops")),
    ]);
    assert!(check(&reg, "Admin", &full).is_valid());
}

#[test]
fn tuple_shape_validates_list_values() {
    let reg = registry();
    let ok = Value::list(vec![Value::Int(7), Value::string("up")]);
    assert!(check(&reg, "{0: int, 1: string}", &ok).is_valid());

    let bad = Value::list(vec![Value::Int(7), Value::Int(8)]);
    let v = violation(check(&reg, "{0: int, 1: string}", &bad));
    assert_eq!(path_of(&reg, &v), "$value[1]");

    let short = Value::list(vec![Value::Int(7)]);
    let v = violation(check(&reg, "{0: int, 1: string}", &short));
    assert_eq!(v.kind, ViolationKind::MissingKey(FieldKey::Int(1)));
}

#[test]
fn closed_tuple_rejects_extra_elements() {
    let reg = registry();
    let value = Value::list(vec![Value::Int(1), Value::string("a"), Value::Int(2)]);
    let v = violation(check(&reg, "{0: int, 1: string}!", &value));
    assert_eq!(v.kind, ViolationKind::UnexpectedKey(FieldKey::Int(2)));
}

#[test]
fn union_first_matching_alternative_wins() {
    let reg = registry();
    assert!(check(&reg, "int|string", &Value::Int(1)).is_valid());
    assert!(check(&reg, "int|string", &Value::string("s")).is_valid());
}

#[test]
fn union_exhaustion_collects_every_attempt() {
    let reg = registry();
    let v = violation(check(&reg, "int|string", &Value::Bool(true)));
    assert_eq!(path_of(&reg, &v), "$value");
    assert_eq!(v.expected, "int|string");
    assert_eq!(v.actual, Some(ValueKind::Bool));
    let ViolationKind::UnionExhausted(attempts) = &v.kind else {
        panic!("expected union exhaustion, got {:?}", v.kind);
    };
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].expected, "int");
    assert_eq!(attempts[1].expected, "string");

    let diag = v.to_diagnostic(reg.interner());
    assert_eq!(diag.notes.len(), 2);
}

#[test]
fn union_backtracks_the_path_between_alternatives() {
    let reg = registry();
    // The first alternative fails deep inside; the second must start
    // from the same root, and its failure path must not carry steps
    // left over from the first walk.
    let value = Value::map([entry(&reg, "b", Value::string("x"))]);
    let v = violation(check(&reg, "{a: int}|{b: int}", &value));
    let ViolationKind::UnionExhausted(attempts) = &v.kind else {
        panic!("expected union exhaustion");
    };
    assert_eq!(attempts[0].path.display(reg.interner()).to_string(), "$value[\"a\"]");
    assert_eq!(attempts[1].path.display(reg.interner()).to_string(), "$value[\"b\"]");
}

#[test]
fn nullable_union_accepts_null() {
    let reg = registry();
    assert!(check(&reg, "?int|string", &Value::Null).is_valid());
    assert!(check(&reg, "?int|string", &Value::string("s")).is_valid());
}

#[test]
fn class_reference_walks_parent_chain() {
    let reg = registry();
    let runtime = Value::object(reg.interner().intern("RuntimeException"));
    assert!(check(&reg, "Exception", &runtime).is_valid());
    assert!(check(&reg, "RuntimeException", &runtime).is_valid());

    let base = Value::object(reg.interner().intern("Exception"));
    let v = violation(check(&reg, "RuntimeException", &base));
    assert_eq!(v.expected, "RuntimeException");
    assert_eq!(v.actual, Some(ValueKind::Object));
}

#[test]
fn non_object_never_satisfies_a_class() {
    let reg = registry();
    let v = violation(check(&reg, "Exception", &Value::Int(1)));
    assert_eq!(v.kind, ViolationKind::WrongKind);
    assert_eq!(v.actual, Some(ValueKind::Int));
}

#[test]
fn unresolved_reference_is_a_defect_not_a_violation() {
    let reg = registry();
    let err = try_check(&reg, "Ghost", &Value::Int(1)).unwrap_err();
    assert!(matches!(err, ResolveError::Unknown { .. }));

    // Still fatal when buried inside a union alternative.
    let err = try_check(&reg, "int|Ghost", &Value::string("x")).unwrap_err();
    assert!(matches!(err, ResolveError::Unknown { .. }));
}

#[test]
fn shape_ref_against_scalar_names_the_shape() {
    let reg = registry();
    let v = violation(check(&reg, "User", &Value::string("nope")));
    assert_eq!(v.expected, "User");
    assert_eq!(
        v.message(reg.interner()),
        "$value must be of type User, string given"
    );
}

proptest! {
    /// Nesting d lists deep validates an int at the leaves; swapping the
    /// leaf for a string fails with a path of exactly d index steps.
    #[test]
    fn nested_list_depth_round_trips(depth in 1usize..6) {
        let reg = registry();
        let mut ty = String::from("int");
        for _ in 0..depth {
            ty = format!("List<{ty}>");
        }

        let mut good = Value::Int(42);
        for _ in 0..depth {
            good = Value::list(vec![good]);
        }
        prop_assert!(check(&reg, &ty, &good).is_valid());

        let mut bad = Value::string("leaf");
        for _ in 0..depth {
            bad = Value::list(vec![bad]);
        }
        let v = violation(check(&reg, &ty, &bad));
        prop_assert_eq!(v.path.len(), depth);
        prop_assert_eq!(v.expected.as_str(), "int");
    }
}

#[test]
fn programmatic_type_expressions_validate_too() {
    let reg = registry();
    let ty = TypeExpr::map_of(
        shape_ir::KeyKind::Int,
        TypeExpr::Scalar(shape_ir::ScalarKind::Bool),
    );
    let classes = NominalInstanceOf::new(Arc::clone(&reg));
    let validator = Validator::new(&reg, &classes);
    let value = Value::map([(MapKey::Int(0), Value::Bool(true))]);
    assert!(validator.validate(&value, &ty).unwrap().is_valid());
}
