use chrono::{DateTime, TimeZone};

/// Filename for one slot of an originals download.
///
/// A single image gets `gemini-original-YYYYMMDD-HHMMSS.png`; a batch of more
/// than one appends a 1-based index zero-padded to three digits, so two slots
/// of the same batch never collide even within one second.
pub fn original_filename<Tz: TimeZone>(index: usize, total: usize, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let ts = now.format("%Y%m%d-%H%M%S");
    if total <= 1 {
        format!("gemini-original-{ts}.png")
    } else {
        format!("gemini-original-{ts}-{:03}.png", index + 1)
    }
}
