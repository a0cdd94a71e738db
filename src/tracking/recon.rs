//! Reconstruction walls
//!
//! A wall is a two-row grid of grayscale tiles: inputs on top, their
//! reconstructions below, for visual inspection of training progress.

use image::GrayImage;

/// Assemble a wall from flattened CHW images.
///
/// `inputs` and `recons` are per-sample flattened images; only the first
/// channel is rendered. Values are clamped to [0, 1] before quantization.
/// At most `n_cols` sample pairs are shown.
pub fn recon_wall(
    inputs: &[Vec<f32>],
    recons: &[Vec<f32>],
    height: usize,
    width: usize,
    n_cols: usize,
) -> GrayImage {
    let n = inputs.len().min(recons.len()).min(n_cols);
    let mut wall = GrayImage::new((n.max(1) * width) as u32, (2 * height) as u32);

    for col in 0..n {
        blit(&mut wall, &inputs[col], col * width, 0, height, width);
        blit(&mut wall, &recons[col], col * width, height, height, width);
    }

    wall
}

fn blit(wall: &mut GrayImage, pixels: &[f32], x0: usize, y0: usize, height: usize, width: usize) {
    for i in 0..height {
        for j in 0..width {
            // First channel only
            let value = pixels.get(i * width + j).copied().unwrap_or(0.0);
            let byte = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            wall.put_pixel((x0 + j) as u32, (y0 + i) as u32, image::Luma([byte]));
        }
    }
}
