//! The deterministic transform chain applied to every decoded image.

mod contrast_stretch;
mod gray_to_rgb;
mod resize;
mod to_unit_range;

pub use contrast_stretch::*;
pub use gray_to_rgb::*;
pub use resize::*;
pub use to_unit_range::*;

use crate::common::*;

/// One stateless, side-effect-free transform step.
pub trait Transform
where
    Self: Debug + Send + Sync,
{
    fn apply(&self, image: Tensor) -> Result<Tensor>;
}

/// An ordered chain of transform steps.
///
/// New steps are appended with [`then`](Self::then); existing steps are
/// never modified.
#[derive(Debug)]
pub struct TransformChain {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self { steps: vec![] }
    }

    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn apply(&self, image: Tensor) -> Result<Tensor> {
        self.steps
            .iter()
            .try_fold(image, |image, step| step.apply(image))
    }
}

/// The fixed preprocessing chain.
///
/// Resize to 224×224, stretch the contrast to the full dynamic range per
/// image, scale to a float tensor in `[0, 1]`, and promote grayscale to
/// RGB. The output is always `[3, 224, 224]`, `Kind::Float`, in `[0, 1]`.
pub fn default_transform() -> TransformChain {
    TransformChain::new()
        .then(Resize::new(224, 224))
        .then(ContrastStretch)
        .then(ToUnitRange)
        .then(GrayToRgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    fn random_bytes(channels: i64, height: i64, width: i64) -> Tensor {
        Tensor::randint(256, &[channels, height, width], (Kind::Int64, Device::Cpu))
            .to_kind(Kind::Uint8)
    }

    #[test]
    fn default_chain_shape_test() {
        let chain = default_transform();

        for (channels, height, width) in [(1, 50, 60), (3, 500, 300), (3, 224, 224), (1, 7, 7)] {
            let output = chain.apply(random_bytes(channels, height, width)).unwrap();
            assert_eq!(output.size(), &[3, 224, 224]);
            assert_eq!(output.kind(), Kind::Float);
            assert!(f64::from(output.min()) >= 0.0);
            assert!(f64::from(output.max()) <= 1.0);
        }
    }

    #[test]
    fn default_chain_deterministic_test() {
        let chain = default_transform();
        let input = random_bytes(3, 120, 90);

        let first = chain.apply(input.copy()).unwrap();
        let second = chain.apply(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn chain_extension_test() {
        // appending a step leaves the existing chain untouched
        #[derive(Debug)]
        struct Negate;

        impl Transform for Negate {
            fn apply(&self, image: Tensor) -> Result<Tensor> {
                Ok(image * -1.0)
            }
        }

        let chain = default_transform().then(Negate);
        let output = chain.apply(random_bytes(1, 30, 30)).unwrap();
        assert!(f64::from(output.max()) <= 0.0);
    }
}
