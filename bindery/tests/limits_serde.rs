#![allow(missing_docs)]
#![cfg(feature = "serde")]

use bindery::{Limits, Registry};

#[test]
fn it_reads_limits_from_json() {
    let limits: Limits = serde_json::from_str(r#"{
        "max_producers": 4,
        "max_parameters": 3,
        "max_resolve_steps": 100,
        "max_walk": 1000
    }"#).unwrap();

    assert_eq!(limits.max_producers(), 4);
    assert_eq!(limits.max_parameters(), 3);
    assert_eq!(limits.max_resolve_steps(), 100);
    assert_eq!(limits.max_walk(), 1000);
}

#[test]
fn it_fills_missing_limits_with_defaults() {
    let limits: Limits = serde_json::from_str(r#"{ "max_resolve_steps": 256 }"#).unwrap();

    assert_eq!(limits.max_resolve_steps(), 256);
    assert_eq!(limits.max_producers(), Limits::default().max_producers());
    assert_eq!(limits.max_walk(), Limits::default().max_walk());
}

#[test]
fn it_writes_limits_to_json() {
    let json = serde_json::to_value(Limits::new().with_max_parameters(2)).unwrap();

    assert_eq!(json["max_parameters"], 2);
    assert_eq!(json["max_producers"], 8);
}

#[test]
fn it_configures_registry_from_json() {
    let limits: Limits = serde_json::from_str(r#"{ "max_producers": 2 }"#).unwrap();

    let registry = Registry::new().with_limits(limits);

    assert_eq!(registry.limits().max_producers(), 2);
}
