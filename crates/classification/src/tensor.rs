//! Image-to-tensor packing

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use crate::model::CHANNELS;

/// Pack an RGB image into the flat float layout classification models consume.
///
/// The image is resized to `width`x`height` with a triangle (bilinear)
/// filter, then each pixel's R, G and B bytes are written as raw 0-255 floats
/// into a `[1, height, width, 3]` row-major array, so the in-memory order is
/// height outer, width middle, channel inner in native byte order. The target
/// models are trained on unnormalized byte values; no scaling or mean/std
/// adjustment may be applied here.
#[must_use]
pub fn pack(image: &RgbImage, width: u32, height: u32) -> Array4<f32> {
    let resized = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    };

    let mut tensor = Array4::<f32>::zeros((1, height as usize, width as usize, CHANNELS));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        tensor[[0, y as usize, x as usize, 0]] = f32::from(r);
        tensor[[0, y as usize, x as usize, 1]] = f32::from(g);
        tensor[[0, y as usize, x as usize, 2]] = f32::from(b);
    }
    tensor
}
