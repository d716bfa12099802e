//! Image preprocessing for the MobileNetV2 feature extractor.
//!
//! MobileNetV2 expects:
//! - Input size: 224×224 pixels
//! - Normalization: pixels scaled to [-1, 1] via pixel / 127.5 - 1
//! - Channel order: RGB
//! - Tensor layout: NHWC for Keras exports, NCHW for PyTorch exports

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

use crate::config::TensorLayout;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Half of the 8-bit pixel range.
const HALF_RANGE: f32 = 127.5;

/// Preprocess an image for feature extraction.
///
/// Resizes to `image_size × image_size` (aspect ratio is not preserved),
/// converts to RGB, normalizes to [-1, 1], and lays the tensor out as
/// requested with a batch dimension of 1.
pub fn preprocess(
    image: &DynamicImage,
    image_size: u32,
    filter: FilterType,
    layout: TensorLayout,
) -> Array4<f32> {
    let resized = image.resize_exact(image_size, image_size, filter);
    let rgb = resized.to_rgb8();
    let raw = rgb.as_raw();
    let size = image_size as usize;

    // Raw bytes are row-major HWC: offset = (y * size + x) * 3 + c
    let pixel = |y: usize, x: usize, c: usize| raw[(y * size + x) * CHANNELS + c] as f32;
    let normalize = |v: f32| v / HALF_RANGE - 1.0;

    match layout {
        TensorLayout::Nhwc => Array4::from_shape_fn((1, size, size, CHANNELS), |(_, y, x, c)| {
            normalize(pixel(y, x, c))
        }),
        TensorLayout::Nchw => Array4::from_shape_fn((1, CHANNELS, size, size), |(_, c, y, x)| {
            normalize(pixel(y, x, c))
        }),
    }
}
