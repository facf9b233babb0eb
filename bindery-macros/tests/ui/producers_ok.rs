use std::sync::Arc;
use bindery::{Binding, FactoryBuilder, Registry, implements, producers};

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait Scheduler: Send + Sync {
    fn next_run(&self) -> u64;
}

#[derive(Default)]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 { 10 }
}

struct Cron {
    clock: Option<Arc<dyn Clock>>,
}

#[producers]
impl Cron {
    #[producer]
    fn detached() -> Self {
        Self { clock: None }
    }

    #[producer]
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock: Some(clock) }
    }

    fn offset(&self) -> u64 {
        self.clock.as_ref().map_or(0, |clock| clock.now())
    }
}

impl Scheduler for Cron {
    fn next_run(&self) -> u64 {
        self.offset() + 1
    }
}

implements! { FixedClock => dyn Clock }
implements! { Cron => dyn Scheduler }

fn main() {
    let registry = Registry::new().with_builder(FactoryBuilder);
    registry.register(&Binding::singleton::<dyn Clock, FixedClock>()).unwrap();
    registry.register(&Binding::transient::<dyn Scheduler, Cron>()).unwrap();

    assert_eq!(registry.get::<dyn Scheduler>().unwrap().next_run(), 11);
}
