use super::*;
use crate::common::*;
use image::DynamicImage;

/// Decoder for baseline raster formats, backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct RasterDecoder {
    format: ImageFormat,
    native: image::ImageFormat,
}

impl RasterDecoder {
    pub fn new(format: ImageFormat, native: image::ImageFormat) -> Self {
        Self { format, native }
    }
}

impl Decoder for RasterDecoder {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn decode(&self, path: &Path) -> Result<Tensor> {
        if !path.is_file() {
            return Err(Error::ImageNotFound {
                path: path.to_owned(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let image = image::load(reader, self.native).map_err(|err| Error::Decode {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;

        Ok(to_chw_bytes(image))
    }
}

/// Convert a decoded image to a `[channels, height, width]` byte tensor.
///
/// Alpha channels are dropped; anything that is not 8-bit grayscale is
/// converted to 8-bit RGB.
fn to_chw_bytes(image: DynamicImage) -> Tensor {
    let (buffer, height, width, channels) = match image {
        DynamicImage::ImageLuma8(buffer) => {
            let (width, height) = buffer.dimensions();
            (buffer.into_raw(), height, width, 1)
        }
        DynamicImage::ImageLumaA8(buffer) => {
            let gray = DynamicImage::ImageLumaA8(buffer).to_luma();
            let (width, height) = gray.dimensions();
            (gray.into_raw(), height, width, 1)
        }
        other => {
            let rgb = other.to_rgb();
            let (width, height) = rgb.dimensions();
            (rgb.into_raw(), height, width, 3)
        }
    };

    Tensor::of_slice(&buffer)
        .view([height as i64, width as i64, channels])
        .permute(&[2, 0, 1])
        .contiguous()
}
