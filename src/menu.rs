//! Numbered text menu. Bad input is reported and asked again; end of input
//! behaves like "Exit".

use crate::config::Location;
use crate::error::Result;
use crate::models::geometry::Coordinate;
use crate::utils::status::{print_artifacts, print_config, print_locations, print_statistics};
use crate::workflow::{AnalysisReport, Workflow};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

pub const GOODBYE: &str = "👋 Goodbye!";

const TROUBLESHOOTING: [&str; 4] = [
    "Check your internet connection",
    "Verify the coordinates are valid",
    "Try a different location or time range",
    "The area might not have recent cloud-free imagery",
];

pub struct Menu<R> {
    workflow: Workflow,
    input: Lines<R>,
}

impl Menu<BufReader<Stdin>> {
    pub fn stdin(workflow: Workflow) -> Self {
        Menu::new(workflow, BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Menu<R> {
    pub fn new(workflow: Workflow, input: R) -> Self {
        Menu {
            workflow,
            input: input.lines(),
        }
    }

    /// Show the menu until a location has been analysed or the user leaves.
    ///
    /// Analysis failures are printed, not returned; only reading the input
    /// can fail here.
    pub async fn run(&mut self) -> Result<Option<AnalysisReport>> {
        println!("🛰️  Simple Sentinel-2 NDWI Analysis");
        println!("{}", "=".repeat(50));
        println!("No authentication required - uses public STAC API!\n");
        print_locations(&self.workflow.config().locations);
        println!();

        match self.select_location().await? {
            Some(location) => Ok(self.analyse(&location).await),
            None => {
                println!("{}", GOODBYE);
                Ok(None)
            }
        }
    }

    /// `None` when the user picks "Exit" or input ends.
    pub async fn select_location(&mut self) -> Result<Option<Location>> {
        loop {
            println!("Choose an option:");
            println!("1. Use predefined location");
            println!("2. Enter custom coordinates");
            println!("3. Show configuration");
            println!("4. Exit\n");

            let Some(choice) = self.prompt("Enter your choice (1-4): ").await? else {
                return Ok(None);
            };
            match choice.as_str() {
                "1" => return self.predefined().await,
                "2" => return self.custom().await,
                "3" => {
                    print_config(self.workflow.config());
                    println!();
                }
                "4" => return Ok(None),
                _ => println!("❌ Invalid choice. Please enter 1-4.\n"),
            }
        }
    }

    async fn predefined(&mut self) -> Result<Option<Location>> {
        println!("\n📍 Predefined Locations:");
        print_locations(&self.workflow.config().locations);
        println!();

        loop {
            let Some(key) = self
                .prompt("Enter location key (or 'list' to see options): ")
                .await?
            else {
                return Ok(None);
            };
            let key = key.to_lowercase();
            if key == "list" {
                print_locations(&self.workflow.config().locations);
                println!();
                continue;
            }

            match self.workflow.config().location(&key) {
                Ok(location) => {
                    println!("\n✅ Selected: {}", location.name);
                    println!("   Coordinates: {}", location.coordinate);
                    println!("   Description: {}", location.description);
                    return Ok(Some(location.clone()));
                }
                Err(e) => println!("❌ {}\n", e),
            }
        }
    }

    async fn custom(&mut self) -> Result<Option<Location>> {
        println!("\n📍 Custom Coordinates:");
        println!("Enter latitude and longitude coordinates.");
        println!("Example: 40.78, -73.97 (New York City)\n");

        loop {
            let Some(line) = self.prompt("Enter coordinates (lat, lon): ").await? else {
                return Ok(None);
            };
            match Coordinate::parse_lat_lon(&line) {
                Ok(coordinate) => {
                    println!("\n✅ Coordinates: {}", coordinate);
                    return Ok(Some(Location::custom(coordinate)));
                }
                Err(e) => println!("❌ {}\nExample: 40.78, -73.97", e),
            }
        }
    }

    async fn analyse(&self, location: &Location) -> Option<AnalysisReport> {
        let config = self.workflow.config();
        let (start, end) = config.date_range();

        println!("\n🚀 Starting NDWI analysis for {}", location.name);
        println!("{}", "=".repeat(50));
        println!("📍 Location: {}", location.coordinate);
        println!("📅 Date Range: {} to {}", start, end);
        println!("🔍 Search radius: {} km", config.analysis.buffer_km);
        println!("☁️  Max cloud cover: {}%\n", config.analysis.cloud_cover_max);

        match self.workflow.run(location).await {
            Ok(report) => {
                print_report(&report, &config.output_dir.display().to_string());
                Some(report)
            }
            Err(e) => {
                log::debug!("analysis failed: {:?}", e);
                println!("❌ Error during analysis: {}", e);
                println!("\nTroubleshooting tips:");
                for tip in TROUBLESHOOTING {
                    println!("- {}", tip);
                }
                None
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        print!("{}", text);
        std::io::stdout().flush()?;
        Ok(self.input.next_line().await?.map(|l| l.trim().to_string()))
    }
}

fn print_report(report: &AnalysisReport, output_dir: &str) {
    println!("\n🎉 Analysis completed successfully!");
    print_artifacts(&report.artifacts);
    print_statistics(&report.statistics);

    println!("\n✅ Complete! Check the '{}' directory for results.", output_dir);
    println!("📊 Visualization: {}", report.artifacts.plot.display());

    let content = report.statistics.water_content();
    println!("\n💡 Interpretation:");
    println!("   {} {}", content.icon(), content);
}
