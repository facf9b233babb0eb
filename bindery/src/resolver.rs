//! Builds the resolution tree of one request

use crate::{
    binding::Binding,
    capability::Capability,
    error::Error,
    graph::{NodeId, NodeLabel, ResolutionTree},
    implementation::Implementation,
    limits::Limits,
    producer::Producer,
    selection::{ResolutionScope, select_producer},
};
use std::collections::HashMap;

/// A resolved node: what is built, by which binding, and from which arguments
#[derive(Debug)]
pub(crate) struct Target {
    pub(crate) capability: Capability,
    pub(crate) binding: Binding,
    pub(crate) implementation: Implementation,
    pub(crate) producer: Producer,
    /// Argument nodes in parameter order, repeated params repeat the node
    pub(crate) args: Vec<NodeId>,
}

impl NodeLabel for Target {
    #[inline]
    fn label(&self) -> &'static str {
        self.capability.name()
    }
}

/// A validated, cycle-free tree ready to be materialized
#[derive(Debug)]
pub(crate) struct Resolution {
    pub(crate) tree: ResolutionTree<Target>,
    pub(crate) root: NodeId,
}

/// Walks bindings from a requested capability down to its leaves.
///
/// Nodes are shared per (capability, binding) so diamonds resolve to one sub-tree.
pub(crate) struct Resolver<'a> {
    singles: &'a HashMap<Capability, Binding>,
    limits: &'a Limits,
    tree: ResolutionTree<Target>,
    index: HashMap<(Capability, usize), NodeId>,
    steps: usize,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(singles: &'a HashMap<Capability, Binding>, limits: &'a Limits) -> Self {
        Self {
            singles,
            limits,
            tree: ResolutionTree::with_limits(limits),
            index: HashMap::new(),
            steps: 0,
        }
    }

    /// Resolves the capability through the binding.
    ///
    /// Dependencies are expanded depth first from an explicit work stack,
    /// so the depth of the graph is bounded by the step limit only.
    pub(crate) fn resolve(mut self, capability: Capability, binding: &Binding) -> Result<Resolution, Error> {
        let (root, _) = self.node(capability, binding)?;
        let mut pending = vec![(root, 0usize)];
        while let Some(&(id, index)) = pending.last() {
            let target = self.tree.data(id);
            let Some(param) = target.producer.params().get(index).copied() else {
                pending.pop();
                continue;
            };
            let dependency = self.locate(&target.binding, &param)?;
            if let Some(top) = pending.last_mut() {
                top.1 += 1;
            }

            let (child, fresh) = self.node(param, &dependency)?;
            self.tree.insert(id, child)?;
            self.tree.data_mut(id).args.push(child);
            if fresh {
                pending.push((child, 0));
            }
        }
        Ok(Resolution {
            tree: self.tree,
            root,
        })
    }

    /// Returns the node of the (capability, binding) pair, creating it if needed
    fn node(&mut self, capability: Capability, binding: &Binding) -> Result<(NodeId, bool), Error> {
        self.steps += 1;
        if self.steps > self.limits.max_resolve_steps() {
            #[cfg(feature = "tracing")]
            tracing::warn!("resolution of {capability} exceeded {} steps", self.limits.max_resolve_steps());

            return Err(Error::ResolutionOverflow("max_resolve_steps"));
        }

        let key = (capability, binding.id());
        if let Some(&id) = self.index.get(&key) {
            return Ok((id, false));
        }

        let implementation = binding
            .implementation(&capability)
            .ok_or(Error::UnknownService(capability.name()))?
            .clone();
        let scope = ResolutionScope::new(binding, self.singles);
        let producer = select_producer(&implementation, &scope, self.limits)?.clone();

        let id = self.tree.add(Target {
            capability,
            binding: binding.clone(),
            implementation,
            producer,
            args: Vec::new(),
        });
        self.index.insert(key, id);
        Ok((id, true))
    }

    /// Finds the binding that supplies a parameter: the private set first, then the non-set table
    fn locate(&self, binding: &Binding, capability: &Capability) -> Result<Binding, Error> {
        if binding.is_set() && binding.contains(capability) {
            return Ok(binding.clone());
        }
        self.singles
            .get(capability)
            .cloned()
            .ok_or(Error::UnknownService(capability.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::{BindingBuilder, Lifecycle},
        implementation::{ImplementationBuilder, Produce},
        implements,
    };
    use std::sync::Arc;

    trait Log: Send + Sync {}
    trait Store: Send + Sync {}
    trait Left: Send + Sync {}
    trait Right: Send + Sync {}
    trait Top: Send + Sync {}

    #[derive(Default)]
    struct Console;
    impl Log for Console {}

    struct Disk;
    impl Store for Disk {}
    impl Produce for Disk {
        fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
            implementation.producer(|_: Arc<dyn Log>| Ok(Disk))
        }
    }

    struct L;
    impl Left for L {}
    impl Produce for L {
        fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
            implementation.producer(|_: Arc<dyn Log>| Ok(L))
        }
    }

    struct R;
    impl Right for R {}
    impl Produce for R {
        fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
            implementation.producer(|_: Arc<dyn Log>| Ok(R))
        }
    }

    struct Apex;
    impl Top for Apex {}
    impl Produce for Apex {
        fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
            implementation.producer(|_: Arc<dyn Left>, _: Arc<dyn Right>| Ok(Apex))
        }
    }

    struct Ping;
    impl Log for Ping {}
    impl Produce for Ping {
        fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
            implementation.producer(|_: Arc<dyn Store>| Ok(Ping))
        }
    }

    implements! { Console => dyn Log }
    implements! { Ping => dyn Log }
    implements! { Disk => dyn Store }
    implements! { L => dyn Left }
    implements! { R => dyn Right }
    implements! { Apex => dyn Top }

    fn singles(bindings: &[Binding]) -> HashMap<Capability, Binding> {
        bindings
            .iter()
            .map(|b| (*b.first().unwrap(), b.clone()))
            .collect()
    }

    #[test]
    fn it_resolves_chain() {
        let singles = singles(&[
            Binding::singleton::<dyn Log, Console>(),
            Binding::singleton::<dyn Store, Disk>(),
        ]);
        let limits = Limits::default();
        let store = Capability::of::<dyn Store>();

        let resolution = Resolver::new(&singles, &limits)
            .resolve(store, &singles[&store])
            .unwrap();

        assert_eq!(resolution.tree.len(), 2);
        let root = resolution.tree.data(resolution.root);
        assert_eq!(root.capability, store);
        assert_eq!(root.args.len(), 1);
        assert_eq!(resolution.tree.data(root.args[0]).capability, Capability::of::<dyn Log>());
    }

    #[test]
    fn it_shares_diamond_node() {
        let singles = singles(&[
            Binding::singleton::<dyn Log, Console>(),
            Binding::singleton::<dyn Left, L>(),
            Binding::singleton::<dyn Right, R>(),
            Binding::singleton::<dyn Top, Apex>(),
        ]);
        let limits = Limits::default();
        let top = Capability::of::<dyn Top>();

        let resolution = Resolver::new(&singles, &limits)
            .resolve(top, &singles[&top])
            .unwrap();

        assert_eq!(resolution.tree.len(), 4);
        let log = resolution.tree
            .find(resolution.root, |t| t.capability == Capability::of::<dyn Log>())
            .unwrap()
            .unwrap();
        assert_eq!(resolution.tree.parents(log).len(), 2);
    }

    #[test]
    fn it_detects_cycle() {
        let singles = singles(&[
            Binding::singleton::<dyn Log, Ping>(),
            Binding::singleton::<dyn Store, Disk>(),
        ]);
        let limits = Limits::default();
        let store = Capability::of::<dyn Store>();

        let err = Resolver::new(&singles, &limits)
            .resolve(store, &singles[&store])
            .unwrap_err();

        assert!(matches!(err, Error::DependencyCycle(_)));
    }

    #[test]
    fn it_looks_into_private_set_first() {
        let singles = singles(&[Binding::singleton::<dyn Log, Console>()]);
        let scope = BindingBuilder::set(Lifecycle::Scoped)
            .bind::<dyn Log, Console>()
            .unwrap()
            .bind::<dyn Store, Disk>()
            .unwrap()
            .build();
        let limits = Limits::default();

        let resolution = Resolver::new(&singles, &limits)
            .resolve(Capability::of::<dyn Store>(), &scope)
            .unwrap();

        let root = resolution.tree.data(resolution.root);
        assert!(resolution.tree.data(root.args[0]).binding.ptr_eq(&scope));
    }

    #[test]
    fn it_stops_after_step_limit() {
        let singles = singles(&[
            Binding::singleton::<dyn Log, Console>(),
            Binding::singleton::<dyn Store, Disk>(),
        ]);
        let limits = Limits::new().with_max_resolve_steps(1);
        let store = Capability::of::<dyn Store>();

        let err = Resolver::new(&singles, &limits)
            .resolve(store, &singles[&store])
            .unwrap_err();

        assert!(matches!(err, Error::ResolutionOverflow("max_resolve_steps")));
    }
}
