use super::*;
use crate::common::*;

/// Resize a `[channels, height, width]` image to a fixed resolution.
///
/// Byte images are resized directly; float images are resized on the byte
/// scale and mapped back, as the underlying codec works on bytes. The
/// interpolation policy is whatever `tch::vision::image::resize` applies
/// and is the same on every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resize {
    height: i64,
    width: i64,
}

impl Resize {
    pub fn new(height: i64, width: i64) -> Self {
        Self { height, width }
    }
}

impl Transform for Resize {
    fn apply(&self, image: Tensor) -> Result<Tensor> {
        let Self { height, width } = *self;
        let (_channels, in_height, in_width) = image.size3()?;

        if (in_height, in_width) == (height, width) {
            return Ok(image);
        }

        let resized = match image.kind() {
            Kind::Uint8 => vision::image::resize(&image, width, height)?,
            Kind::Float => {
                vision::image::resize(&(image * 255.0).to_kind(Kind::Uint8), width, height)?
                    .to_kind(Kind::Float)
                    .g_div_scalar(255.0)
            }
            kind => {
                return Err(Error::invariant(format!(
                    "cannot resize an image of kind {:?}",
                    kind
                )))
            }
        };

        Ok(resized)
    }
}
