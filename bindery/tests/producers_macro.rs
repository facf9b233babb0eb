#![allow(missing_docs)]
#![cfg(feature = "macros")]

use bindery::{
    Binding, BindingBuilder, FactoryBuilder, Implementation, Registry,
    error::Error, implements, producers
};
use std::sync::Arc;

trait Store: Send + Sync {
    fn url(&self) -> String;
}

trait Cache: Send + Sync {
    fn capacity(&self) -> usize;
}

trait Repository: Send + Sync {
    fn describe(&self) -> String;
}

#[derive(Default)]
struct Postgres;

impl Store for Postgres {
    fn url(&self) -> String { "postgres://localhost".into() }
}

#[derive(Default)]
struct Lru;

impl Cache for Lru {
    fn capacity(&self) -> usize { 64 }
}

struct Users {
    store: Arc<dyn Store>,
    cache: Option<Arc<dyn Cache>>,
}

#[producers]
impl Users {
    #[producer]
    fn new(store: Arc<dyn Store>) -> Self {
        Self { store, cache: None }
    }

    #[producer]
    fn cached(store: Arc<dyn Store>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache: Some(cache) }
    }
}

impl Repository for Users {
    fn describe(&self) -> String {
        match &self.cache {
            Some(cache) => format!("{} ({})", self.store.url(), cache.capacity()),
            None => self.store.url(),
        }
    }
}

struct Audit {
    store: Arc<dyn Store>,
}

#[producers]
impl Audit {
    #[producer]
    fn new() -> Self {
        panic!("the preferred producer must win")
    }

    #[producer(preferred)]
    fn with_store(store: Arc<dyn Store>) -> Result<Self, Error> {
        if store.url().is_empty() {
            return Err(Error::construction("store has no url"));
        }
        Ok(Self { store })
    }

    fn url(&self) -> String {
        self.store.url()
    }
}

implements! { Postgres => dyn Store }
implements! { Lru => dyn Cache }
implements! { Users => dyn Repository }

#[test]
fn it_registers_marked_functions_only() {
    let implementation = Implementation::of::<Audit>().build();

    let producers = implementation.producers();
    assert_eq!(producers.len(), 2);
    assert_eq!(producers[0].arity(), 0);
    assert!(producers[1].is_preferred());
    assert_eq!(producers[1].arity(), 1);
}

#[test]
fn it_selects_the_largest_generated_producer() {
    let registry = Registry::new().with_builder(FactoryBuilder);
    registry.register(&Binding::singleton::<dyn Store, Postgres>()).unwrap();
    registry.register(&Binding::singleton::<dyn Cache, Lru>()).unwrap();
    registry.register(&Binding::transient::<dyn Repository, Users>()).unwrap();

    let repository = registry.get::<dyn Repository>().unwrap();

    assert_eq!(repository.describe(), "postgres://localhost (64)");
}

#[test]
fn it_falls_back_to_smaller_generated_producer() {
    let registry = Registry::new().with_builder(FactoryBuilder);
    registry.register(&Binding::singleton::<dyn Store, Postgres>()).unwrap();
    registry.register(&Binding::transient::<dyn Repository, Users>()).unwrap();

    let repository = registry.get::<dyn Repository>().unwrap();

    assert_eq!(repository.describe(), "postgres://localhost");
}

#[test]
fn it_uses_the_preferred_generated_producer() {
    let registry = Registry::new().with_builder(FactoryBuilder);
    let scope = BindingBuilder::scoped()
        .bind::<dyn Store, Postgres>().unwrap()
        .bind::<Audit, Audit>().unwrap()
        .build();
    registry.register(&scope).unwrap();

    for binding in registry.bindings_containing::<Audit>().unwrap() {
        binding.unwrap();
    }

    assert_eq!(scope.get::<Audit>().unwrap().url(), "postgres://localhost");
}
