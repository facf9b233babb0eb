//! Per-binding instance cache

use super::Lifecycle;
use crate::{
    capability::Capability,
    implementation::Implementation,
    producer::Instance
};
use indexmap::IndexMap;
use std::{
    any::TypeId,
    collections::HashMap,
    sync::OnceLock
};

/// Cache cells are created together with the binding and written at most once
pub(super) enum Cache {
    Transient,
    Singleton(HashMap<TypeId, OnceLock<Instance>>),
    Scoped(HashMap<Capability, OnceLock<Instance>>),
}

impl Cache {
    pub(super) fn new(lifecycle: Lifecycle, entries: &IndexMap<Capability, Implementation>) -> Self {
        match lifecycle {
            Lifecycle::Transient => Self::Transient,
            Lifecycle::Singleton => Self::Singleton(entries
                .values()
                .map(|implementation| (implementation.type_id(), OnceLock::new()))
                .collect()),
            Lifecycle::Scoped => Self::Scoped(entries
                .keys()
                .map(|capability| (*capability, OnceLock::new()))
                .collect()),
        }
    }

    /// Returns the cell that holds the instance for this capability path
    #[inline]
    pub(super) fn cell(
        &self,
        capability: &Capability,
        implementation: &Implementation
    ) -> Option<&OnceLock<Instance>> {
        match self {
            Self::Transient => None,
            Self::Singleton(cells) => cells.get(&implementation.type_id()),
            Self::Scoped(cells) => cells.get(capability),
        }
    }

    /// Returns an already created instance, if any
    #[inline]
    pub(super) fn get(
        &self,
        capability: &Capability,
        implementation: &Implementation
    ) -> Option<Instance> {
        self.cell(capability, implementation)
            .and_then(OnceLock::get)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Disk;

    trait Storage: Send + Sync {}
    impl Storage for Disk {}
    crate::implements! { Disk => dyn Storage }

    fn entries() -> IndexMap<Capability, Implementation> {
        let mut entries = IndexMap::new();
        entries.insert(
            Capability::of::<dyn Storage>(),
            Implementation::of::<Disk>().implements::<dyn Storage>().build());
        entries.insert(
            Capability::of::<Disk>(),
            Implementation::of::<Disk>().build());
        entries
    }

    #[test]
    fn it_has_no_cells_for_transient() {
        let entries = entries();
        let cache = Cache::new(Lifecycle::Transient, &entries);

        let (capability, implementation) = entries.first().unwrap();
        assert!(cache.cell(capability, implementation).is_none());
    }

    #[test]
    fn it_shares_singleton_cell_per_implementation() {
        let entries = entries();
        let cache = Cache::new(Lifecycle::Singleton, &entries);

        let (capability, implementation) = entries.first().unwrap();
        let instance: Instance = Arc::new(Disk);
        cache.cell(capability, implementation).unwrap().set(instance).ok().unwrap();

        let (other, implementation) = entries.last().unwrap();
        assert!(cache.get(other, implementation).is_some());
    }

    #[test]
    fn it_keeps_scoped_cell_per_capability() {
        let entries = entries();
        let cache = Cache::new(Lifecycle::Scoped, &entries);

        let (capability, implementation) = entries.first().unwrap();
        let instance: Instance = Arc::new(Disk);
        cache.cell(capability, implementation).unwrap().set(instance).ok().unwrap();

        let (other, implementation) = entries.last().unwrap();
        assert!(cache.get(capability, implementation).is_some());
        assert!(cache.get(other, implementation).is_none());
    }
}
