use std::sync::Arc;
use bindery::{Binding, FactoryBuilder, Registry, error::Error, implements, producers};

trait Config: Send + Sync {
    fn port(&self) -> u16;
}

trait Server: Send + Sync {
    fn port(&self) -> u16;
}

#[derive(Default)]
struct Defaults;

impl Config for Defaults {
    fn port(&self) -> u16 { 8080 }
}

struct Http {
    port: u16,
}

#[producers]
impl Http {
    #[producer(preferred)]
    fn from_config(config: Arc<dyn Config>) -> Result<Self, Error> {
        match config.port() {
            0 => Err(Error::construction("port is not set")),
            port => Ok(Self { port }),
        }
    }

    #[producer]
    fn fixed() -> Self {
        Self { port: 80 }
    }
}

impl Server for Http {
    fn port(&self) -> u16 {
        self.port
    }
}

implements! { Defaults => dyn Config }
implements! { Http => dyn Server }

fn main() {
    let registry = Registry::new().with_builder(FactoryBuilder);
    registry.register(&Binding::singleton::<dyn Config, Defaults>()).unwrap();
    registry.register(&Binding::singleton::<dyn Server, Http>()).unwrap();

    assert_eq!(registry.get::<dyn Server>().unwrap().port(), 8080);
}
