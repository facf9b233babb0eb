//! The raw constructor configuration point

use crate::{
    error::Error,
    implementation::Implementation,
    producer::{Instance, Producer, Service},
};

/// A raw constructor that turns an implementation, the selected producer
/// and the resolved arguments into a fresh instance.
///
/// A registry refuses registrations until one is installed.
/// Implementations must not call back into the registry that invoked them.
pub trait InstanceBuilder: Send + Sync + 'static {
    /// Creates a new instance
    fn create(
        &self,
        implementation: &Implementation,
        producer: &Producer,
        args: &[Service]
    ) -> Result<Instance, Error>;
}

/// The stock [`InstanceBuilder`] that invokes the producer's factory
#[derive(Debug, Default, Clone, Copy)]
pub struct FactoryBuilder;

impl InstanceBuilder for FactoryBuilder {
    #[inline]
    fn create(
        &self,
        _: &Implementation,
        producer: &Producer,
        args: &[Service]
    ) -> Result<Instance, Error> {
        producer.invoke(args)
    }
}

impl<F> InstanceBuilder for F
where
    F: Fn(&Implementation, &Producer, &[Service]) -> Result<Instance, Error>
    + Send
    + Sync
    + 'static
{
    #[inline]
    fn create(
        &self,
        implementation: &Implementation,
        producer: &Producer,
        args: &[Service]
    ) -> Result<Instance, Error> {
        self(implementation, producer, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};

    #[derive(Default)]
    struct Job;

    #[test]
    fn it_invokes_producer_factory() {
        let implementation = Implementation::of::<Job>().build();
        let producer = &implementation.producers()[0];

        let instance = FactoryBuilder.create(&implementation, producer, &[]).unwrap();

        assert!(instance.downcast::<Job>().is_ok());
    }

    #[test]
    fn it_accepts_closures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let builder = move |_: &Implementation, producer: &Producer, args: &[Service]| {
            counter.fetch_add(1, Ordering::SeqCst);
            producer.invoke(args)
        };

        let implementation = Implementation::of::<Job>().build();
        builder.create(&implementation, &implementation.producers()[0], &[]).unwrap();
        builder.create(&implementation, &implementation.producers()[0], &[]).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
