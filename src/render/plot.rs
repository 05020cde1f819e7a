use super::palette::{colourise, ndwi_colour, true_colour};
use crate::analysis::statistics::Statistics;
use crate::error::{Error, Result};
use crate::reader::{band_count, read_band};
use crate::traits::{PlotRequest, Presenter};
use async_trait::async_trait;
use image::{RgbImage, RgbaImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

const PANEL_WIDTH: u32 = 750;
const PANEL_HEIGHT: u32 = 600;
const FOOTER_HEIGHT: u32 = 140;
const COLOURBAR_WIDTH: u32 = 90;
const WHEAT: RGBColor = RGBColor(245, 222, 179);

/// Renders the NDWI map, an optional true-colour map and a statistics box
/// into a PNG.
#[derive(Debug, Default, Clone)]
pub struct PlotPresenter;

impl PlotPresenter {
    pub fn new() -> Self {
        PlotPresenter
    }
}

#[async_trait]
impl Presenter for PlotPresenter {
    async fn render(&self, request: &PlotRequest) -> Result<PathBuf> {
        let request = request.clone();
        let saved = task::spawn_blocking(move || -> Result<PathBuf> {
            draw_figure(
                &request.ndwi,
                request.rgb.as_deref(),
                &request.statistics,
                &request.output,
            )?;
            Ok(request.output)
        })
        .await??;

        println!("📊 Plot saved to: {}", saved.display());
        Ok(saved)
    }
}

/// `(width, height)` of the figure in pixels.
pub fn figure_size(with_rgb: bool) -> (u32, u32) {
    let panels = if with_rgb { 2 } else { 1 };
    (PANEL_WIDTH * panels, PANEL_HEIGHT + FOOTER_HEIGHT)
}

pub fn stats_lines(stats: &Statistics) -> Vec<String> {
    vec![
        "NDWI Statistics:".to_string(),
        format!("Mean: {:.3}", stats.mean),
        format!("Std: {:.3}", stats.std),
        format!("Min: {:.3}", stats.min),
        format!("Max: {:.3}", stats.max),
        format!("Water %: {:.1}%", stats.water_percentage),
    ]
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn draw_figure(ndwi: &Path, rgb: Option<&Path>, stats: &Statistics, output: &Path) -> Result<()> {
    let ndwi_img = colourise(&read_band(ndwi, 1)?);
    let rgb_img = rgb.map(load_true_colour).transpose()?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(output, figure_size(rgb_img.is_some())).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (panels, footer) = root.split_vertically(PANEL_HEIGHT);
    match &rgb_img {
        Some(rgb_img) => {
            let (left, right) = panels.split_horizontally(PANEL_WIDTH);
            draw_ndwi_panel(&left, &ndwi_img)?;
            draw_rgb_panel(&right, rgb_img)?;
        }
        None => draw_ndwi_panel(&panels, &ndwi_img)?,
    }
    draw_stats_box(&footer, stats)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// First three bands as RGB; a single band is shown as grey.
fn load_true_colour(path: &Path) -> Result<RgbImage> {
    if band_count(path)? >= 3 {
        let (r, g, b) = (read_band(path, 1)?, read_band(path, 2)?, read_band(path, 3)?);
        Ok(true_colour(&r, &g, &b))
    } else {
        let grey = read_band(path, 1)?;
        Ok(true_colour(&grey, &grey, &grey))
    }
}

fn draw_ndwi_panel(area: &DrawingArea<BitMapBackend, Shift>, img: &RgbaImage) -> Result<()> {
    let (area_width, _) = area.dim_in_pixel();
    let (map_area, bar_area) = area.split_horizontally(area_width.saturating_sub(COLOURBAR_WIDTH));

    let (width, height) = (img.width() as i32, img.height() as i32);
    let flip = |y: &i32| (height - *y).to_string();

    let mut chart = ChartBuilder::on(&map_area)
        .caption("NDWI (Normalized Difference Water Index)", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..width, 0..height)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Pixel X")
        .y_desc("Pixel Y")
        .y_label_formatter(&flip)
        .draw()
        .map_err(render_err)?;
    chart
        .draw_series(img.enumerate_pixels().map(|(x, y, px)| {
            let (x, top) = (x as i32, height - y as i32);
            let colour = RGBAColor(px[0], px[1], px[2], px[3] as f64 / 255.0);
            Rectangle::new([(x, top), (x + 1, top - 1)], colour.filled())
        }))
        .map_err(render_err)?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(45)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(45)
        .build_cartesian_2d(0.0f64..1.0, -1.0f64..1.0)
        .map_err(render_err)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("NDWI Value")
        .y_labels(5)
        .draw()
        .map_err(render_err)?;

    let steps = 100;
    bar.draw_series((0..steps).map(|i| {
        let lo = -1.0 + 2.0 * i as f64 / steps as f64;
        let hi = lo + 2.0 / steps as f64;
        let [r, g, b, _] = ndwi_colour(((lo + hi) / 2.0) as f32).0;
        Rectangle::new([(0.0, lo), (1.0, hi)], RGBColor(r, g, b).filled())
    }))
    .map_err(render_err)?;

    Ok(())
}

fn draw_rgb_panel(area: &DrawingArea<BitMapBackend, Shift>, img: &RgbImage) -> Result<()> {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let flip = |y: &i32| (height - *y).to_string();

    let mut chart = ChartBuilder::on(area)
        .caption("RGB Visualization", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..width, 0..height)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Pixel X")
        .y_desc("Pixel Y")
        .y_label_formatter(&flip)
        .draw()
        .map_err(render_err)?;
    chart
        .draw_series(img.enumerate_pixels().map(|(x, y, px)| {
            let (x, top) = (x as i32, height - y as i32);
            Rectangle::new([(x, top), (x + 1, top - 1)], RGBColor(px[0], px[1], px[2]).filled())
        }))
        .map_err(render_err)?;

    Ok(())
}

fn draw_stats_box(area: &DrawingArea<BitMapBackend, Shift>, stats: &Statistics) -> Result<()> {
    let lines = stats_lines(stats);
    let line_height = 19;
    let bottom = 16 + line_height * lines.len() as i32;

    area.draw(&Rectangle::new([(10, 6), (260, bottom)], WHEAT.filled()))
        .map_err(render_err)?;
    area.draw(&Rectangle::new([(10, 6), (260, bottom)], BLACK.stroke_width(1)))
        .map_err(render_err)?;
    for (i, line) in lines.into_iter().enumerate() {
        area.draw(&Text::new(
            line,
            (20, 14 + i as i32 * line_height),
            ("sans-serif", 15).into_font().color(&BLACK),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}
