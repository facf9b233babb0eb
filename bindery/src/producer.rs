//! Producer descriptors: one way to construct an implementation

use crate::{capability::Capability, error::Error};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
    sync::Arc
};

pub use self::{
    factory::GenericFactory,
    from_args::{Dependency, FromArgs},
};

pub mod factory;
pub mod from_args;

/// A type-erased implementation object, as returned by a producer
pub type Instance = Arc<
    dyn Any
    + Send
    + Sync
>;

/// A type-erased capability view of an instance.
///
/// For a capability `C` the boxed value is always an `Arc<C>`.
pub type Service = Arc<
    dyn Any
    + Send
    + Sync
>;

type ProducerFn = Arc<
    dyn Fn(&[Service]) -> Result<Instance, Error>
    + Send
    + Sync
>;

/// Describes one way to construct an implementation:
/// the ordered capabilities it depends on and the factory that builds it.
#[derive(Clone)]
pub struct Producer {
    params: Arc<[Capability]>,
    preferred: bool,
    factory: ProducerFn,
}

impl Debug for Producer {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("params", &self.params)
            .field("preferred", &self.preferred)
            .finish()
    }
}

impl Producer {
    /// Creates a producer from a typed factory function.
    ///
    /// Parameter capabilities are taken from the factory argument types.
    pub fn new<T, F, Args>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromArgs
    {
        let factory: ProducerFn = Arc::new(move |args: &[Service]| {
            let args = Args::from_args(args)?;
            factory.produce(args).map(|t| Arc::new(t) as Instance)
        });
        Self {
            params: Args::capabilities().into(),
            preferred: false,
            factory,
        }
    }

    /// Creates a producer from an explicit parameter list and an untyped factory.
    ///
    /// Used by type loaders that describe implementations at runtime,
    /// see [`ImplementationBuilder::with_producer`](crate::ImplementationBuilder::with_producer).
    pub fn from_fn<F>(params: Vec<Capability>, factory: F) -> Self
    where
        F: Fn(&[Service]) -> Result<Instance, Error> + Send + Sync + 'static
    {
        Self {
            params: params.into(),
            preferred: false,
            factory: Arc::new(factory),
        }
    }

    /// Marks this producer as the one to use regardless of scoring
    #[inline]
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    /// Returns `true` if this producer is marked as preferred
    #[inline]
    pub fn is_preferred(&self) -> bool {
        self.preferred
    }

    /// Returns parameter capabilities in call order
    #[inline]
    pub fn params(&self) -> &[Capability] {
        &self.params
    }

    /// Returns the number of parameters
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Invokes the factory with resolved arguments
    #[inline]
    pub fn invoke(&self, args: &[Service]) -> Result<Instance, Error> {
        (self.factory)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Clock: Send + Sync {}

    #[derive(Debug)]
    struct Scheduler {
        ticks: u32,
    }

    #[test]
    fn it_takes_params_from_factory_signature() {
        let producer = Producer::new(|_: Arc<dyn Clock>, _: Arc<String>| Ok(Scheduler { ticks: 1 }));

        assert_eq!(producer.arity(), 2);
        assert_eq!(producer.params()[0], Capability::of::<dyn Clock>());
        assert_eq!(producer.params()[1], Capability::of::<String>());
        assert!(!producer.is_preferred());
    }

    #[test]
    fn it_marks_preferred() {
        let producer = Producer::new(|| Scheduler { ticks: 0 }).preferred();

        assert!(producer.is_preferred());
        assert_eq!(producer.arity(), 0);
    }

    #[test]
    fn it_invokes_factory() {
        let producer = Producer::new(|| Scheduler { ticks: 7 });

        let instance = producer.invoke(&[]).unwrap();
        let scheduler = instance.downcast::<Scheduler>().unwrap();

        assert_eq!(scheduler.ticks, 7);
    }

    #[test]
    fn it_invokes_untyped_factory() {
        let producer = Producer::from_fn(
            vec![Capability::of::<String>()],
            |args| {
                let name = <Arc<String>>::from_service(&args[0])?;
                Ok(Arc::new(name.len()) as Instance)
            });

        let name: Service = Arc::new(Arc::new(String::from("cron")));
        let instance = producer.invoke(&[name]).unwrap();

        assert_eq!(*instance.downcast::<usize>().unwrap(), 4);
    }
}
