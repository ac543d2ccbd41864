use super::*;
use crate::common::*;

/// Replicate a single channel to three; 3-channel images pass through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrayToRgb;

impl Transform for GrayToRgb {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        let (channels, height, width) = image.size3()?;

        match channels {
            1 => Ok(image.expand(&[3, height, width], false).contiguous()),
            3 => Ok(image),
            channels => Err(Error::invariant(format!(
                "expect an image with 1 or 3 channels, but get {}",
                channels
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn promote_grayscale_test() {
        let input = Tensor::rand(&[1, 8, 8], (Kind::Float, Device::Cpu));
        let output = GrayToRgb.apply(input.copy()).unwrap();
        assert_eq!(output.size(), &[3, 8, 8]);

        // every channel is a copy of the input channel
        for channel in 0..3 {
            assert_eq!(output.select(0, channel), input.select(0, 0));
        }
    }

    #[test]
    fn rgb_passthrough_test() {
        let input = Tensor::rand(&[3, 8, 8], (Kind::Float, Device::Cpu));
        let output = GrayToRgb.apply(input.copy()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn unsupported_channels_test() {
        let input = Tensor::rand(&[2, 8, 8], (Kind::Float, Device::Cpu));
        let err = GrayToRgb.apply(input).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { .. }));
    }
}
