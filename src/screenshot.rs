//! PNG capture of the frame buffer (feature `screenshot`).

use std::path::Path;

use image::{ImageFormat, ImageResult, Rgba, RgbaImage};

use crate::palette::rgb;
use crate::ppu::FrameBuffer;

/// Convert a frame to an RGBA image through the system palette.
pub fn to_image(frame: &FrameBuffer) -> RgbaImage {
    RgbaImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
        let [r, g, b] = rgb(frame.pixel(x as usize, y as usize));
        Rgba([r, g, b, 0xFF])
    })
}

/// Write `frame` to `path` as a 256x240 PNG.
pub fn save_png(frame: &FrameBuffer, path: impl AsRef<Path>) -> ImageResult<()> {
    let path = path.as_ref();
    to_image(frame).save_with_format(path, ImageFormat::Png)?;
    log::info!("screenshot written to {}", path.display());
    Ok(())
}
