use crate::analysis::statistics::Statistics;
use crate::config::{Config, Location};
use crate::render::palette::ndwi_colour;
use crate::workflow::Artifacts;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|h| {
            Cell::new(h)
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center)
        })
        .collect()
}

fn new_table(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(header(columns))
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);
    table
}

pub fn locations_table(locations: &[Location]) -> Table {
    let mut table = new_table(&["Key", "Name", "Description", "Coordinates"]);
    for loc in locations {
        table.add_row(vec![
            Cell::new(&loc.key),
            Cell::new(&loc.name),
            Cell::new(&loc.description),
            Cell::new(loc.coordinate.to_string()),
        ]);
    }
    table
}

pub fn print_locations(locations: &[Location]) {
    println!("📍 Available locations:\n{}", locations_table(locations));
}

pub fn config_table(config: &Config) -> Table {
    let mut table = new_table(&["Setting", "Value"]);
    let a = &config.analysis;
    let rows: [(&str, String); 7] = [
        ("buffer_km", a.buffer_km.to_string()),
        ("cloud_cover_max", a.cloud_cover_max.to_string()),
        ("days_back", a.days_back.to_string()),
        ("limit", a.limit.to_string()),
        ("stac_url", config.stac_url.clone()),
        ("collection", config.collection.clone()),
        ("output_dir", config.output_dir.display().to_string()),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

pub fn print_config(config: &Config) {
    println!("⚙️  Current Configuration:\n{}", config_table(config));
}

pub fn statistics_table(stats: &Statistics) -> Table {
    let mut table = new_table(&["Metric", "Value"]);
    let rows: [(&str, String); 7] = [
        ("Mean NDWI", format!("{:.3}", stats.mean)),
        ("Std NDWI", format!("{:.3}", stats.std)),
        ("Min NDWI", format!("{:.3}", stats.min)),
        ("Max NDWI", format!("{:.3}", stats.max)),
        ("Water percentage", format!("{:.1}%", stats.water_percentage)),
        ("Water pixels", with_thousands(stats.water_pixels)),
        ("Total pixels", with_thousands(stats.total_pixels)),
    ];
    for (key, value) in rows {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn print_statistics(stats: &Statistics) {
    println!("\n📊 NDWI Analysis Results:\n{}", statistics_table(stats));
    println!("   -1 {} +1", colourbar(10));
}

pub fn print_artifacts(artifacts: &Artifacts) {
    let mut table = new_table(&["Artifact", "Path"]);
    let rows = [
        ("ndwi", Some(&artifacts.ndwi)),
        ("green", Some(&artifacts.green)),
        ("nir", Some(&artifacts.nir)),
        ("rgb", artifacts.rgb.as_ref()),
        ("plot", Some(&artifacts.plot)),
    ];
    for (key, path) in rows {
        if let Some(path) = path {
            table.add_row(vec![Cell::new(key), Cell::new(path.display())]);
        }
    }
    println!("📁 Files created:\n{}", table);
}

/// `1234567` → `"1,234,567"`
pub fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ANSI swatches of the NDWI palette from -1 to +1.
pub fn colourbar(n: usize) -> String {
    let mut s = String::new();
    for i in 0..n {
        let v = -1.0 + 2.0 * i as f32 / (n.max(2) - 1) as f32;
        let [r, g, b, _] = ndwi_colour(v).0;
        s.push_str(&format!("\x1b[38;2;{};{};{}m█\x1b[0m", r, g, b));
    }
    s
}

/// Spinner for steps that block on the network.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_table_formatting() {
        let stats = Statistics::from_samples(&[0.6, -0.2, 0.2, -1.0]).unwrap();
        let rendered = statistics_table(&stats).to_string();
        assert!(rendered.contains("Mean NDWI"));
        assert!(rendered.contains("-0.100"));
        assert!(rendered.contains("50.0%"));
        assert!(rendered.contains("Total pixels"));
    }

    #[test]
    fn test_pixel_counts_use_thousands_separators() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1_000), "1,000");
        assert_eq!(with_thousands(45_210), "45,210");
        assert_eq!(with_thousands(1_234_567), "1,234,567");

        let mut stats = Statistics::from_samples(&[0.5, -0.5]).unwrap();
        stats.water_pixels = 12_345;
        stats.total_pixels = 160_000;
        let rendered = statistics_table(&stats).to_string();
        assert!(rendered.contains("12,345"));
        assert!(rendered.contains("160,000"));
    }

    #[test]
    fn test_locations_table_lists_every_key() {
        let config = Config::default();
        let rendered = locations_table(&config.locations).to_string();
        for loc in &config.locations {
            assert!(rendered.contains(&loc.key), "missing {}", loc.key);
        }
        assert!(rendered.contains("40.7800°N, -73.9700°E"));
    }

    #[test]
    fn test_colourbar_has_requested_swatches() {
        assert_eq!(colourbar(10).matches('█').count(), 10);
    }
}
