//! Creates instances from a resolved tree, bottom-up

use crate::{
    builder::InstanceBuilder,
    error::Error,
    graph::NodeId,
    limits::Limits,
    producer::{Instance, Service},
    resolver::Resolution,
};
use std::collections::HashMap;

/// Materializes every node once per pass, children before parents.
///
/// Nodes whose binding already holds an instance are taken from the cache
/// and their children are not materialized again.
pub(crate) struct Materializer<'a> {
    builder: &'a dyn InstanceBuilder,
    limits: &'a Limits,
    instances: HashMap<NodeId, Instance>,
    steps: usize,
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(builder: &'a dyn InstanceBuilder, limits: &'a Limits) -> Self {
        Self {
            builder,
            limits,
            instances: HashMap::new(),
            steps: 0,
        }
    }

    /// Creates the root instance and returns it viewed as the requested capability.
    ///
    /// Nodes are visited from an explicit work stack: a node is pushed back
    /// beneath its arguments and built once all of them are done.
    pub(crate) fn materialize(mut self, resolution: &Resolution) -> Result<Service, Error> {
        let mut pending = vec![(resolution.root, false)];
        while let Some((id, ready)) = pending.pop() {
            if self.instances.contains_key(&id) {
                continue;
            }
            let target = resolution.tree.data(id);
            if ready {
                let args = target.args
                    .iter()
                    .map(|&child| self.service(resolution, child))
                    .collect::<Result<Vec<_>, _>>()?;
                let instance = target.binding.create(
                    self.builder,
                    &target.capability,
                    &target.implementation,
                    &target.producer,
                    &args)?;
                self.instances.insert(id, instance);
                continue;
            }

            self.steps += 1;
            if self.steps > self.limits.max_resolve_steps() {
                return Err(Error::ResolutionOverflow("max_resolve_steps"));
            }
            if let Some(instance) = target.binding.cached(&target.capability, &target.implementation) {
                self.instances.insert(id, instance);
                continue;
            }
            pending.push((id, true));
            pending.extend(target.args
                .iter()
                .rev()
                .filter(|&&child| !self.instances.contains_key(&child))
                .map(|&child| (child, false)));
        }
        self.service(resolution, resolution.root)
    }

    /// Views an already built node as its capability
    fn service(&self, resolution: &Resolution, id: NodeId) -> Result<Service, Error> {
        let target = resolution.tree.data(id);
        let instance = self.instances
            .get(&id)
            .ok_or(Error::ResolveFailed(target.capability.name()))?;
        target.implementation.view(&target.capability, instance)
    }
}
