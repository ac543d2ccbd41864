//! Image decoding, keyed by format tag.

mod raster;

pub use raster::*;

use crate::common::*;
use strum::{Display, EnumString};

/// The image file formats a dataset instance can be wired to.
///
/// Adding a format means adding a variant here and returning its decoder
/// from [`ImageFormat::decoder`]; calling code is untouched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
}

impl ImageFormat {
    /// The file extension used to derive image paths from sample keys.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }

    /// Build the decoder wired to this format.
    pub fn decoder(self) -> Box<dyn Decoder> {
        match self {
            Self::Jpeg => Box::new(RasterDecoder::new(self, image::ImageFormat::Jpeg)),
            Self::Png => Box::new(RasterDecoder::new(self, image::ImageFormat::Png)),
            Self::Bmp => Box::new(RasterDecoder::new(self, image::ImageFormat::Bmp)),
        }
    }
}

/// A single-format image decoder.
pub trait Decoder
where
    Self: Debug + Send + Sync,
{
    /// The format tag this decoder is wired to.
    fn format(&self) -> ImageFormat;

    /// Read and decode one image file into a `[channels, height, width]`
    /// byte tensor with the native channel count (1 or 3).
    ///
    /// Every call re-reads the file from disk; nothing is cached.
    fn decode(&self, path: &Path) -> Result<Tensor>;
}
