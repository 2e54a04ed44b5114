//! Engine facade tests: declaration, caching, escape analysis, stats.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use shape_ir::{ListValue, MapKey, StringInterner, Value};
use shape_registry::ShapeRegistry;

use crate::engine::{CheckError, DeclareError, Engine, EngineError};
use crate::{cache, ConstExpr, ConstKey};

fn engine() -> Engine {
    let mut reg = ShapeRegistry::new(Arc::new(StringInterner::new()));
    reg.declare_shape("User", None, "{id: int, name: string}")
        .unwrap();
    reg.seal().unwrap();
    Engine::new(Arc::new(reg)).unwrap()
}

fn user(engine: &Engine, id: i64, name: &str) -> Value {
    let interner = engine.interner();
    Value::map([
        (MapKey::str(interner, "id"), Value::Int(id)),
        (MapKey::str(interner, "name"), Value::string(name)),
    ])
}

#[test]
fn unsealed_registry_is_rejected() {
    let reg = ShapeRegistry::new(Arc::new(StringInterner::new()));
    let err = Engine::new(Arc::new(reg)).unwrap_err();
    assert_eq!(err, EngineError::RegistryNotSealed);
}

#[test]
fn debug_formatting_summarizes_engine_state() {
    let engine = engine();
    let _site = engine.declare("int").unwrap();
    let rendered = format!("{engine:?}");
    assert!(rendered.contains("sites: 1"), "got: {rendered}");
    assert!(rendered.contains("validations: 0"), "got: {rendered}");
}

#[test]
fn declare_then_check() {
    let engine = engine();
    let site = engine.declare("List<int>").unwrap();

    let ok = Value::list(vec![Value::Int(1), Value::Int(2)]);
    assert!(engine.check(site, &ok).unwrap().is_valid());

    let bad = Value::list(vec![Value::Int(1), Value::string("x")]);
    let outcome = engine.check(site, &bad).unwrap();
    let violation = outcome.violation().unwrap();
    assert_eq!(
        violation.path.display(engine.interner()).to_string(),
        "$value[1]"
    );
}

#[test]
fn declaration_rejects_malformed_types() {
    let engine = engine();
    let err = engine.declare("List<int").unwrap_err();
    assert!(matches!(err, DeclareError::Parse(_)));
}

#[test]
fn handles_do_not_cross_engines() {
    let first = engine();
    let second = engine();
    let site = first.declare("int").unwrap();
    let err = second.check(site, &Value::Int(1)).unwrap_err();
    assert!(matches!(err, CheckError::UnknownCallSite(_)));
}

#[test]
fn unchanged_container_hits_the_cache() {
    cache::clear();
    let engine = engine();
    let site = engine.declare("List<int>").unwrap();
    let value = Value::list(vec![Value::Int(1), Value::Int(2)]);

    assert!(engine.check(site, &value).unwrap().is_valid());
    assert!(engine.check(site, &value).unwrap().is_valid());
    assert!(engine.check(site, &value).unwrap().is_valid());

    let stats = engine.stats();
    assert_eq!(stats.validations, 1);
    assert_eq!(stats.cache_hits, 2);
}

#[test]
fn mutation_invalidates_the_cache() {
    let engine = engine();
    let site = engine.declare("List<int>").unwrap();
    let list = Arc::new(ListValue::new(vec![Value::Int(1)]));
    let value = Value::List(Arc::clone(&list));

    assert!(engine.check(site, &value).unwrap().is_valid());
    assert!(engine.check(site, &value).unwrap().is_valid());
    assert_eq!(engine.stats().validations, 1);

    // Version bump forces a fresh walk, which now fails.
    list.push(Value::string("x"));
    let outcome = engine.check(site, &value).unwrap();
    assert!(!outcome.is_valid());
    assert_eq!(engine.stats().validations, 2);
}

#[test]
fn nested_mutation_invalidates_the_cache() {
    let engine = engine();
    let site = engine.declare("List<List<int>>").unwrap();
    let inner = Arc::new(ListValue::new(vec![Value::Int(1)]));
    let value = Value::list(vec![Value::List(Arc::clone(&inner))]);

    assert!(engine.check(site, &value).unwrap().is_valid());
    assert!(engine.check(site, &value).unwrap().is_valid());
    assert_eq!(engine.stats().cache_hits, 1);

    // Mutating the inner list must stale the outer fingerprint too.
    inner.push(Value::string("x"));
    let outcome = engine.check(site, &value).unwrap();
    assert!(!outcome.is_valid());
    assert_eq!(engine.stats().validations, 2);
}

#[test]
fn invalid_outcomes_are_never_cached() {
    let engine = engine();
    let site = engine.declare("List<int>").unwrap();
    let bad = Value::list(vec![Value::string("x")]);

    assert!(!engine.check(site, &bad).unwrap().is_valid());
    assert!(!engine.check(site, &bad).unwrap().is_valid());

    let stats = engine.stats();
    assert_eq!(stats.validations, 2);
    assert_eq!(stats.cache_hits, 0);
}

#[test]
fn scalars_are_walked_every_time() {
    let engine = engine();
    let site = engine.declare("int").unwrap();
    assert!(engine.check(site, &Value::Int(1)).unwrap().is_valid());
    assert!(engine.check(site, &Value::Int(1)).unwrap().is_valid());

    let stats = engine.stats();
    assert_eq!(stats.validations, 2);
    assert_eq!(stats.cache_hits, 0);
}

#[test]
fn same_container_at_two_sites_validates_per_site() {
    let engine = engine();
    let a = engine.declare("List<int>").unwrap();
    let b = engine.declare("List<mixed>").unwrap();
    let value = Value::list(vec![Value::Int(1)]);

    assert!(engine.check(a, &value).unwrap().is_valid());
    assert!(engine.check(b, &value).unwrap().is_valid());
    assert_eq!(engine.stats().validations, 2);

    assert!(engine.check(a, &value).unwrap().is_valid());
    assert!(engine.check(b, &value).unwrap().is_valid());
    assert_eq!(engine.stats().cache_hits, 2);
}

#[test]
fn constant_literal_exempts_the_site() {
    let engine = engine();
    let literal = ConstExpr::Map(vec![
        (ConstKey::Str("id".to_owned()), ConstExpr::Int(1)),
        (ConstKey::Str("name".to_owned()), ConstExpr::Str("ada".to_owned())),
    ]);
    let site = engine.declare_with_literal("User", &literal).unwrap();

    // The runtime value is never inspected at an exempt site.
    assert!(engine.check(site, &user(&engine, 1, "ada")).unwrap().is_valid());
    assert!(engine.check(site, &Value::Null).unwrap().is_valid());

    let stats = engine.stats();
    assert_eq!(stats.validations, 0);
    assert_eq!(stats.exemptions, 2);
}

#[test]
fn nonconforming_constant_fails_at_declaration() {
    let engine = engine();
    let literal = ConstExpr::Map(vec![(
        ConstKey::Str("id".to_owned()),
        ConstExpr::Str("not an int".to_owned()),
    )]);
    let err = engine.declare_with_literal("User", &literal).unwrap_err();
    let DeclareError::ConstantMismatch(violation) = err else {
        panic!("expected a constant mismatch");
    };
    assert_eq!(
        violation.path.display(engine.interner()).to_string(),
        "$value[\"id\"]"
    );
}

#[test]
fn opaque_literal_keeps_runtime_checks() {
    let engine = engine();
    let literal = ConstExpr::List(vec![ConstExpr::Int(1), ConstExpr::Opaque]);
    let site = engine.declare_with_literal("List<int>", &literal).unwrap();

    let bad = Value::list(vec![Value::Int(1), Value::string("x")]);
    assert!(!engine.check(site, &bad).unwrap().is_valid());
    assert_eq!(engine.stats().exemptions, 0);
}

#[test]
fn nested_constant_maps_materialize() {
    let engine = engine();
    let literal = ConstExpr::Map(vec![(
        ConstKey::Int(0),
        ConstExpr::List(vec![ConstExpr::Bool(true)]),
    )]);
    let value = literal.try_materialize(engine.interner()).unwrap();
    let expected = Value::map(BTreeMap::from([(
        MapKey::Int(0),
        Value::list(vec![Value::Bool(true)]),
    )]));
    // Container ids differ; compare the interesting part structurally.
    let (Value::Map(got), Value::Map(want)) = (&value, &expected) else {
        panic!("expected maps");
    };
    let got = got.read();
    let want = want.read();
    assert_eq!(got.keys().collect::<Vec<_>>(), want.keys().collect::<Vec<_>>());
    assert_eq!(got.len(), 1);
}

#[test]
fn defective_reference_surfaces_as_check_error() {
    let engine = engine();
    let site = engine.declare("Ghost").unwrap();
    let err = engine.check(site, &Value::Int(1)).unwrap_err();
    assert!(matches!(err, CheckError::Defect(_)));
}

#[test]
fn site_introspection_round_trips() {
    let engine = engine();
    let site = engine.declare("Map<string, ?int>").unwrap();
    assert_eq!(engine.site_source(site).unwrap(), "Map<string, ?int>");

    let ty = engine.site_type(site).unwrap();
    assert_eq!(
        ty.display(engine.interner()).to_string(),
        "Map<string, ?int>"
    );
}
