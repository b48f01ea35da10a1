//! Ranges command

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use warren_core::time_range::now_in_zone;
use warren_core::{resolve_at, TimeRange};

const BOUNDARY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f %:z";

pub fn cmd_ranges() -> Result<()> {
    let now = now_in_zone();
    println!("Now: {}", now.format(BOUNDARY_FORMAT));
    println!();
    for line in range_lines(now) {
        println!("{}", line);
    }
    Ok(())
}

/// One formatted line per range name, resolved against `now`
pub fn range_lines(now: DateTime<FixedOffset>) -> Vec<String> {
    TimeRange::ALL
        .iter()
        .map(|range| {
            let interval = resolve_at(*range, now);
            let marker = if range.is_open_ended() { " (now)" } else { "" };
            format!(
                "{:<10}  {}  ->  {}{}",
                range.as_str(),
                interval.start.format(BOUNDARY_FORMAT),
                interval.end.format(BOUNDARY_FORMAT),
                marker
            )
        })
        .collect()
}
