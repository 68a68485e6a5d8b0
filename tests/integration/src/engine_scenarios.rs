//! End-to-end engine scenarios across crates

use serde_json::json;

use conf_core::{ConfigEngine, Error, ListFilter, Provenance, Scope, SourceKind};
use conf_test_utils::TestRoot;

#[test]
fn scenario_generic_export_flag_set_and_reset() {
    // schema defines key "export" with default false for the
    // application-independent resource "dde-dconfig"
    let root = TestRoot::new();
    root.write_schema(
        "",
        "",
        "dde-dconfig",
        &TestRoot::schema(&[("export", json!(false))]),
    );
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "", "dde-dconfig", "");

    engine.set(&scope, "export", json!(true)).unwrap();
    assert_eq!(engine.get(&scope, "export").unwrap().value, json!(true));

    engine.reset(&scope, None).unwrap();
    let resolved = engine.get(&scope, "export").unwrap();
    assert_eq!(resolved.value, json!(false));
    assert!(resolved.is_default);
}

#[test]
fn scenario_list_five_keys_one_shadowed() {
    let root = TestRoot::new();
    root.write_schema(
        "app",
        "",
        "res",
        &TestRoot::schema(&[
            ("a", json!(1)),
            ("b", json!(2)),
            ("c", json!(3)),
            ("d", json!(4)),
            ("e", json!(5)),
        ]),
    );
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "app", "res", "");

    engine.set(&scope, "c", json!(30)).unwrap();

    let rows = engine.list(1000, &ListFilter::resource("app", "res")).unwrap();
    assert_eq!(rows.len(), 5);
    let shadowed: Vec<&str> = rows
        .iter()
        .filter(|r| !r.is_default)
        .map(|r| r.key.as_str())
        .collect();
    assert_eq!(shadowed, vec!["c"]);
}

#[test]
fn subpath_installs_are_independent() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!("base"))]));
    root.write_schema("app", "a", "res", &TestRoot::schema(&[("k", json!("sub"))]));
    let engine = ConfigEngine::new(root.paths());

    let base = Scope::new(1000, "app", "res", "");
    let sub = Scope::new(1000, "app", "res", "a");

    // overriding the base install leaves the subpath install untouched
    engine.set(&base, "k", json!("changed")).unwrap();
    assert_eq!(engine.get(&base, "k").unwrap().value, json!("changed"));
    assert_eq!(engine.get(&sub, "k").unwrap().value, json!("sub"));
}

#[test]
fn vendor_override_shadows_default_and_survives_reset() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!("default"))]));
    root.write_oem_override("app", "", "res", "10_vendor.json", 0, json!({"k": "vendor"}));
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "app", "res", "");

    let resolved = engine.get(&scope, "k").unwrap();
    assert_eq!(resolved.value, json!("vendor"));
    assert_eq!(
        resolved.provenance,
        Provenance::Layer {
            kind: SourceKind::Oem,
            priority: 0
        }
    );

    // a runtime set wins the kind tie-break, reset reverts to the vendor value
    engine.set(&scope, "k", json!("mine")).unwrap();
    assert_eq!(engine.get(&scope, "k").unwrap().value, json!("mine"));
    engine.reset(&scope, Some("k")).unwrap();
    assert_eq!(engine.get(&scope, "k").unwrap().value, json!("vendor"));
}

#[test]
fn pinned_vendor_priority_outranks_runtime_set() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!("default"))]));
    root.write_oem_override("app", "", "res", "pinned.json", 50, json!({"k": "pinned"}));
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "app", "res", "");

    // the set is recorded but the pinned vendor layer keeps winning
    let changed = engine.set(&scope, "k", json!("mine")).unwrap();
    assert!(!changed);
    assert_eq!(engine.get(&scope, "k").unwrap().value, json!("pinned"));
}

#[test]
fn conflicting_vendor_layers_are_reported() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!("default"))]));
    root.write_oem_override("app", "", "res", "one.json", 7, json!({"k": "one"}));
    root.write_oem_override("app", "", "res", "two.json", 7, json!({"k": "two"}));
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "app", "res", "");

    let result = engine.get(&scope, "k");
    assert!(matches!(result, Err(Error::ConflictingLayer { priority: 7, .. })));
}

#[test]
fn writes_survive_engine_restart() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!(0))]));
    let scope = Scope::new(1000, "app", "res", "");

    {
        let engine = ConfigEngine::new(root.paths());
        engine.set(&scope, "k", json!(7)).unwrap();
    }
    assert!(root.layer_file(1000, "app", "res", "runtime").is_file());

    let engine = ConfigEngine::new(root.paths());
    assert_eq!(engine.get(&scope, "k").unwrap().value, json!(7));

    // a full reset removes the persisted layer file again
    engine.reset(&scope, None).unwrap();
    assert!(!root.layer_file(1000, "app", "res", "runtime").exists());
}

#[test]
fn export_rows_are_byte_identical_across_calls() {
    let root = TestRoot::new();
    root.write_schema("beta", "", "res", &TestRoot::schema(&[("x", json!(1))]));
    root.write_schema(
        "alpha",
        "",
        "res",
        &TestRoot::schema(&[("b", json!(2)), ("a", json!(1))]),
    );
    root.write_schema("alpha", "", "other", &TestRoot::schema(&[("z", json!(3))]));
    let engine = ConfigEngine::new(root.paths());

    let first = engine.export_rows(1000, &ListFilter::default()).unwrap();
    let second = engine.export_rows(1000, &ListFilter::default()).unwrap();
    assert_eq!(first, second);

    let order: Vec<(String, String, String)> = first
        .iter()
        .map(|r| (r.appid.clone(), r.resource.clone(), r.key.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("alpha".into(), "other".into(), "z".into()),
            ("alpha".into(), "res".into(), "a".into()),
            ("alpha".into(), "res".into(), "b".into()),
            ("beta".into(), "res".into(), "x".into()),
        ]
    );
}

#[test]
fn flush_persists_loaded_layers() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!(0))]));
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "app", "res", "");

    engine.set(&scope, "k", json!(1)).unwrap();
    engine.flush().unwrap();
    assert!(root.layer_file(1000, "app", "res", "runtime").is_file());
}

#[test]
fn stale_cache_never_served_after_mutation() {
    let root = TestRoot::new();
    root.write_schema("app", "", "res", &TestRoot::schema(&[("k", json!(0))]));
    let engine = ConfigEngine::new(root.paths());
    let scope = Scope::new(1000, "app", "res", "");

    // warm the cache, mutate, read again
    for round in 1..=10i64 {
        assert_eq!(engine.get(&scope, "k").unwrap().value, json!(round - 1));
        engine.set(&scope, "k", json!(round)).unwrap();
        assert_eq!(engine.get(&scope, "k").unwrap().value, json!(round));
    }
}
