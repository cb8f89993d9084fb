use image::{imageops, RgbImage};
use tract_onnx::prelude::*;

/// Stretches the frame to exactly `width` x `height` with bilinear filtering.
pub fn resize_frame(frame: &RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    imageops::resize(frame, width, height, imageops::FilterType::Triangle)
}

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// NCHW tensor, scaled to [0, 1] and then standardised with the ImageNet channel statistics.
fn frame_to_tensor(frame: &RgbImage) -> Tensor {
    let (width, height) = frame.dimensions();
    tract_ndarray::Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, c, y, x)| {
            let value = frame.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
        },
    )
    .into_tensor()
}

pub fn resize_frame_to_tensor(frame: &RgbImage, width: u32, height: u32) -> Tensor {
    let resized = resize_frame(frame, width, height);
    frame_to_tensor(&resized)
}
