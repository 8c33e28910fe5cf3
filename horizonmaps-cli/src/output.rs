//! Terminal output.

use std::time::Duration;

use console::style;
use horizonmaps::announce::AnnouncementSink;
use horizonmaps::route::RouteModel;
use horizonmaps::session::SessionReport;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints announcements to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAnnouncer;

impl AnnouncementSink for ConsoleAnnouncer {
    fn announce(&self, text: &str, language: &str) {
        println!(
            "{} {} {}",
            style("▶").cyan().bold(),
            style(format!("[{}]", language)).dim(),
            text
        );
    }
}

/// Spinner shown while waiting on the directions service.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Human-readable distance.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters)
    }
}

/// Print a route's steps.
pub fn print_route(route: &RouteModel) {
    println!(
        "{} {} steps, {} ({} polyline vertices)",
        style("Route:").bold(),
        route.step_count(),
        format_distance(route.total_distance_m()),
        route.polyline().len()
    );
    for (i, step) in route.steps().iter().enumerate() {
        println!(
            "  {:>3}. {:<50} {:>9}  {}",
            i + 1,
            step.instruction,
            format_distance(step.distance_m),
            style(step.target).dim()
        );
    }
}

/// Print the end-of-session summary.
pub fn print_report(report: &SessionReport) {
    let headline = if report.outcome.is_arrived() {
        style(report.outcome.to_string()).green().bold()
    } else {
        style(report.outcome.to_string()).yellow().bold()
    };
    println!();
    println!("{} {}", style("Guidance:").bold(), headline);
    println!("  Fixes processed:   {}", report.fixes_processed);
    println!("  Steps advanced:    {}", report.steps_advanced);
    println!("  Off-route signals: {}", report.off_route_signals);
    println!(
        "  Reroutes:          {} applied, {} failed",
        report.reroutes_applied, report.reroute_failures
    );
    if let Some(speed) = report.last_speed_mps {
        println!("  Last speed:        {:.1} m/s", speed);
    }
    println!("  Elapsed:           {:.1}s", report.elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(42.4), "42 m");
        assert_eq!(format_distance(999.0), "999 m");
        assert_eq!(format_distance(1700.0), "1.7 km");
    }
}
