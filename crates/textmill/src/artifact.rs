//! Plain-text output artifact rendering.
//!
//! The artifact layout is fixed: a header (source name, extraction
//! timestamp, processing duration, character count, word count), an
//! 80-character separator line, and the normalized text body. Consumers
//! that store artifacts rely on this exact layout.

use crate::types::ExtractionSuccess;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SEPARATOR_WIDTH: usize = 80;

/// Render the output artifact for a successful extraction, stamped with
/// the current time.
pub fn render(source_name: &str, success: &ExtractionSuccess) -> String {
    render_at(source_name, success, SystemTime::now())
}

/// Render the output artifact with an explicit timestamp.
pub fn render_at(source_name: &str, success: &ExtractionSuccess, now: SystemTime) -> String {
    let mut out = String::with_capacity(success.text.len() + 256);
    out.push_str("PDF Text Extraction Results\n");
    out.push_str(&format!("Source: {source_name}\n"));
    out.push_str(&format!("Extraction Date: {}\n", format_timestamp(now)));
    out.push_str(&format!(
        "Processing Time: {:.2} seconds\n",
        success.processing_seconds()
    ));
    out.push_str(&format!("Characters: {}\n", success.char_count));
    out.push_str(&format!("Words: {}\n", success.word_count));
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push_str("\n\n");
    out.push_str(&success.text);
    out
}

/// Timestamped artifact filename for a source stem, second resolution.
/// Collisions within one second are accepted as-is.
pub fn timestamped_filename(stem: &str) -> String {
    timestamped_filename_at(stem, SystemTime::now())
}

/// Timestamped artifact filename with an explicit timestamp.
pub fn timestamped_filename_at(stem: &str, now: SystemTime) -> String {
    let (date, time) = civil_parts(now);
    format!(
        "{stem}_{:04}{:02}{:02}_{:02}{:02}{:02}.txt",
        date.0, date.1, date.2, time.0, time.1, time.2
    )
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
fn format_timestamp(now: SystemTime) -> String {
    let (date, time) = civil_parts(now);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        date.0, date.1, date.2, time.0, time.1, time.2
    )
}

fn civil_parts(now: SystemTime) -> ((i64, u32, u32), (u32, u32, u32)) {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs() as i64;
    let days = secs.div_euclid(86_400);
    let tod = secs.rem_euclid(86_400) as u32;
    (
        civil_from_days(days),
        (tod / 3600, (tod / 60) % 60, tod % 60),
    )
}

/// Gregorian date from days since 1970-01-01 (Howard Hinnant's
/// civil_from_days).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}
