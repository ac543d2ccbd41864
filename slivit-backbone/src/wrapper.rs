use crate::{common::*, convnext::{ConvNext, ConvNextInit}};

/// A one-level wrapper that places the whole classifier under a `model`
/// namespace, matching the parameter names of checkpoints saved from a
/// wrapped classifier.
#[derive(Debug)]
pub struct BackboneWrapper {
    model: ConvNext,
}

impl BackboneWrapper {
    pub const NAMESPACE: &'static str = "model";

    pub fn new<'p, P>(path: P, init: ConvNextInit) -> Result<Self>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let model = init.build(path / Self::NAMESPACE)?;
        Ok(Self { model })
    }

    /// Hand out the wrapped classifier, dropping the namespace level.
    pub fn into_inner(self) -> ConvNext {
        self.model
    }
}

impl nn::ModuleT for BackboneWrapper {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        self.model.forward_t(input, train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_test() {
        let vs = nn::VarStore::new(Device::Cpu);
        let _wrapper = BackboneWrapper::new(&vs.root(), ConvNextInit::tiny(4)).unwrap();

        let variables = vs.variables();
        assert!(variables.contains_key("model.stem.conv.weight"));
        assert!(variables.contains_key("model.head.bias"));
        assert!(variables.keys().all(|name| name.starts_with("model.")));
    }
}
