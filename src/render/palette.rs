use crate::models::raster::Raster;
use colorgrad::Gradient;
use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Fixed NDWI display range.
pub const NDWI_MIN: f32 = -1.0;
pub const NDWI_MAX: f32 = 1.0;

/// Reversed red-yellow-blue: -1 is blue, +1 (water) is red.
pub fn ndwi_colour(value: f32) -> Rgba<u8> {
    let [r, g, b, a] = colorgrad::preset::rd_yl_bu()
        .at(ramp_position(value))
        .to_rgba8();
    Rgba([r, g, b, a])
}

/// Position on the RdYlBu ramp for an NDWI value, reversed and clamped.
fn ramp_position(value: f32) -> f32 {
    1.0 - ((value - NDWI_MIN) / (NDWI_MAX - NDWI_MIN)).clamp(0.0, 1.0)
}

/// Colourise an NDWI raster; nodata and non-finite samples are transparent.
pub fn colourise(raster: &Raster) -> RgbaImage {
    let grad = colorgrad::preset::rd_yl_bu();
    let is_nodata = |v: f32| !v.is_finite() || raster.is_nodata(v);

    let mut img = RgbaImage::new(raster.width as u32, raster.height as u32);
    for (i, &raw) in raster.data.iter().enumerate() {
        let px = if is_nodata(raw) {
            Rgba([0, 0, 0, 0])
        } else {
            let [r, g, b, a] = grad.at(ramp_position(raw)).to_rgba8();
            Rgba([r, g, b, a])
        };
        let x = (i % raster.width) as u32;
        let y = (i / raster.width) as u32;
        img.put_pixel(x, y, px);
    }
    img
}

/// Stack three bands into an 8-bit true-colour image, clamping to 0..=255.
///
/// Bands must share a shape; extra samples in a larger band are ignored.
pub fn true_colour(red: &Raster, green: &Raster, blue: &Raster) -> RgbImage {
    let to_u8 = |v: f32| {
        if v.is_finite() {
            v.round().clamp(0.0, 255.0) as u8
        } else {
            0
        }
    };
    let width = red.width as u32;
    let height = red.height as u32;
    RgbImage::from_fn(width, height, |x, y| {
        let i = y as usize * red.width + x as usize;
        let sample = |band: &Raster| band.data.get(i).copied().map(to_u8).unwrap_or(0);
        Rgb([sample(red), sample(green), sample(blue)])
    })
}
