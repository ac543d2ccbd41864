//! Reconstruction of a pretrained 2D convolutional feature extractor from a
//! fine-tuning checkpoint.

mod common;
pub mod convnext;
pub mod loader;
pub mod wrapper;

pub use loader::{load_backbone, load_backbone_with};
