use super::*;
use crate::common::*;

/// Convert to a channel-first float tensor with values in `[0, 1]`.
///
/// `[0, 1]` is the normalized numeric range every image carries from here
/// on. Float input is assumed to be in range already and passes through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToUnitRange;

impl Transform for ToUnitRange {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        let scaled = match image.kind() {
            Kind::Uint8 => image.to_kind(Kind::Float).g_div_scalar(255.0),
            Kind::Float => image,
            kind => {
                return Err(Error::invariant(format!(
                    "cannot normalize an image of kind {:?}",
                    kind
                )))
            }
        };

        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_unit_range_test() {
        let input = Tensor::of_slice(&[0u8, 51, 255]).view([1, 1, 3]);
        let output = ToUnitRange.apply(input).unwrap();
        assert_eq!(output.kind(), Kind::Float);
        assert_eq!(f64::from(output.min()), 0.0);
        assert_eq!(f64::from(output.max()), 1.0);
    }
}
