//! §9 design note: "explicit `AdaptorRegistry` instead of a singleton
//! module service". The original wrapper's `adaptor_factory.cpp` keeps a
//! process-wide static table of constructed adaptors; here the equivalent
//! is an ordinary value built once in `main`, filled in the order
//! configuration resolves, and handed to the server — no global mutable
//! state anywhere in the crate.

use crate::adaptor::Adaptor;

#[derive(Default)]
pub struct AdaptorRegistry {
    chain: Vec<Box<dyn Adaptor>>,
}

impl AdaptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage to the chain, in the order it will run.
    pub fn push(&mut self, adaptor: Box<dyn Adaptor>) -> &mut Self {
        self.chain.push(adaptor);
        self
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Consumes the registry, handing its chain to the server in
    /// construction order.
    pub fn into_chain(self) -> Vec<Box<dyn Adaptor>> {
        self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptor::{MessageBundle, Scaling};
    use tuio2_types::ids::FrameId;
    use tuio2_types::Timetag;

    #[test]
    fn registry_preserves_push_order() {
        let mut registry = AdaptorRegistry::new();
        registry.push(Box::new(Scaling::uniform(2.0)));
        registry.push(Box::new(Scaling::uniform(3.0)));
        assert_eq!(registry.len(), 2);
        let mut chain = registry.into_chain();
        let bundle = crate::adaptor::run_chain(&mut chain, MessageBundle::new(FrameId(1), Timetag::IMMEDIATE));
        assert!(bundle.is_empty());
    }
}
