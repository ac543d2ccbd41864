use super::*;
use crate::common::*;

/// Stretch pixel intensities to the full dynamic range, independently per
/// image.
///
/// Byte images are stretched over `[0, 255]` and stay bytes; float images
/// are stretched over `[0, 1]` and stay floats. A constant image maps to
/// all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContrastStretch;

impl Transform for ContrastStretch {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        let kind = image.kind();
        let full = match kind {
            Kind::Uint8 => 255.0,
            Kind::Float => 1.0,
            kind => {
                return Err(Error::invariant(format!(
                    "cannot contrast-stretch an image of kind {:?}",
                    kind
                )))
            }
        };

        let float = image.to_kind(Kind::Float);
        let min = f64::from(float.min());
        let max = f64::from(float.max());

        let stretched = if max > min {
            float.g_add_scalar(-min) * (full / (max - min))
        } else {
            Tensor::zeros_like(&float)
        };

        Ok(stretched.to_kind(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn stretch_test() {
        let input = Tensor::of_slice(&[50u8, 100, 150]).view([1, 1, 3]);
        let output = ContrastStretch.apply(input).unwrap();
        assert_eq!(output.kind(), Kind::Uint8);
        assert_eq!(i64::from(output.min()), 0);
        assert_eq!(i64::from(output.max()), 255);
    }

    #[test]
    fn stretch_constant_test() {
        let input = Tensor::full(&[1, 4, 4], 77, (Kind::Uint8, Device::Cpu));
        let output = ContrastStretch.apply(input).unwrap();
        assert_eq!(i64::from(output.max()), 0);
    }

    #[test]
    fn stretch_is_per_image_test() {
        // two images with different ranges both end up spanning the full range
        let dark = Tensor::of_slice(&[10u8, 20, 30]).view([1, 1, 3]);
        let bright = Tensor::of_slice(&[200u8, 220, 240]).view([1, 1, 3]);

        for input in [dark, bright] {
            let output = ContrastStretch.apply(input).unwrap();
            assert_eq!(i64::from(output.min()), 0);
            assert_eq!(i64::from(output.max()), 255);
        }
    }
}
