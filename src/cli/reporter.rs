// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::color::{ColorBand, ColorBandMapper, Rgb};
use crate::result::{DistanceSummary, ScalarField};
use colored::*;
use std::time::Duration;

const RULE_WIDTH: usize = 72;
const BAR_WIDTH: usize = 40;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a distance-map run
    pub fn report_summary(summary: &DistanceSummary, elapsed: Duration) {
        println!("\n{}", "━".repeat(RULE_WIDTH).bright_black());
        println!("{} {}", "Distance map:".bold(), summary.result_name.cyan());
        println!("{}", "━".repeat(RULE_WIDTH).bright_black());

        Self::print_field("Source", &summary.source_name);
        Self::print_field("Method", &summary.method);
        Self::print_field("Attribute", &summary.attribute);
        Self::print_field(
            "Source mesh",
            &format!("{} vertices, {} triangles", summary.vertices, summary.triangles),
        );
        Self::print_field("Target mesh", &format!("{} triangles", summary.target_triangles));
        Self::print_field(
            "Decimation",
            if summary.decimation_applied { "applied" } else { "off" },
        );

        println!("\n{}", "Distances (mm):".bold());
        match summary.min_distance {
            Some(min) => println!(
                "  {} {}",
                "Min:".bright_black(),
                Self::colorize_distance(min, &format!("{:.3}", min))
            ),
            None => println!("  {} {}", "Min:".bright_black(), "n/a".yellow()),
        }
        for (label, value) in [("Max:", summary.max_distance), ("Mean:", summary.mean_distance)] {
            let text = value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v));
            println!("  {} {}", label.bright_black(), text.cyan());
        }

        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(elapsed).yellow()
        );
    }

    /// Vertex count per colour band as horizontal bars
    pub fn report_histogram(mapper: &ColorBandMapper, field: &ScalarField) {
        let histogram = mapper.band_histogram(field);
        let total = field.len().max(1);

        println!("\n{}", "Color bands:".bold());
        for (band, count) in histogram {
            let filled = (count * BAR_WIDTH + total / 2) / total;
            let bar = Self::paint_band(band, &"█".repeat(filled));
            println!(
                "  {:<28} {}{} {:>6} ({:>5.1}%)",
                band.label(),
                bar,
                " ".repeat(BAR_WIDTH.saturating_sub(filled)),
                count,
                100.0 * count as f64 / total as f64
            );
        }
        println!("{}", "━".repeat(RULE_WIDTH).bright_black());
    }

    /// Control points and a sampled table of the transfer function
    pub fn report_colormap(mapper: &ColorBandMapper, steps: usize) {
        let transfer = mapper.transfer_function();
        let (lo, hi) = mapper.scalar_range();

        println!("\n{}", "━".repeat(RULE_WIDTH).bright_black());
        println!(
            "{} {} {}",
            "Color map:".bold(),
            transfer.name().cyan(),
            format!("(range {:.2} - {:.2} mm)", lo, hi).bright_black()
        );
        println!("{}", "━".repeat(RULE_WIDTH).bright_black());

        println!("{}", "Control points:".bold());
        for point in transfer.points() {
            println!(
                "  {:>6.2} mm  {}  {}",
                point.value,
                Self::swatch(&point.color),
                point.color.to_string().bright_black()
            );
        }

        let steps = steps.max(2);
        println!("\n{}", "Samples:".bold());
        for i in 0..steps {
            let value = lo + (hi - lo) * i as f64 / (steps - 1) as f64;
            let color = mapper.color_for(value);
            println!(
                "  {:>6.2} mm  {}  {}",
                value,
                Self::swatch(&color),
                color.to_string().bright_black()
            );
        }
        println!("{}", "━".repeat(RULE_WIDTH).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn print_field(name: &str, value: &str) {
        println!("  {} {}", format!("{}:", name).bright_black(), value.cyan());
    }

    /// Tint text with the band colour of `distance`
    fn colorize_distance(distance: f64, text: &str) -> ColoredString {
        Self::paint_band(ColorBand::classify(distance), text)
    }

    fn paint_band(band: ColorBand, text: &str) -> ColoredString {
        match band {
            ColorBand::Red => text.red(),
            ColorBand::RedYellow => text.bright_red(),
            ColorBand::YellowGreen => text.yellow(),
            ColorBand::GreenBlue => text.green(),
            ColorBand::Blue => text.blue(),
        }
    }

    fn swatch(color: &Rgb) -> ColoredString {
        let [r, g, b] = color.to_u8();
        "    ".on_truecolor(r, g, b)
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
