use image::{ImageBuffer, Luma, Rgba};

use crate::config::Threshold;

/// Crops the problem area: the top quarter of the frame, full width.
pub fn crop_problem_area(img: &ImageBuffer<Rgba<u8>, Vec<u8>>) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let (width, height) = img.dimensions();
    image::imageops::crop_imm(img, 0, 0, width, height / 4).to_image()
}

/// Converts to grayscale and binarizes.
///
/// Pixels whose luma exceeds the threshold become white (255), all others
/// black (0). Luma uses the ITU-R 601 weights.
pub fn binarize(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    threshold: Threshold,
) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);
    let cutoff = threshold.value() as u32;

    for (x, y, pixel) in img.enumerate_pixels() {
        let r = pixel[0] as u32;
        let g = pixel[1] as u32;
        let b = pixel[2] as u32;
        let luma = (r * 299 + g * 587 + b * 114) / 1000;

        let value = if luma > cutoff { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}
