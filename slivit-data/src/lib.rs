//! The data pipeline for fine-tuning a slice-stack vision transformer on a
//! pretrained 2D convolutional backbone.

mod common;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod transform;
