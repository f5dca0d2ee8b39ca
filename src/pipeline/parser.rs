//! Tolerant lab-value grammar over raw OCR text.
//!
//! OCR text is noisy: misread characters, merged lines, missing colons.
//! The grammar favors precision of the numeric token over recall of
//! ambiguous labels — a malformed label with a valid trailing number is
//! still preferable to silently dropping a real measurement, so label
//! capture is greedy but trimmed aggressively. No semantic validation
//! (unit consistency, plausible ranges) happens here; OCR noise makes it
//! unreliable, and downstream consumers treat results as advisory.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::LabMeasurement;

/// `<label>: <number> <unit?>` — label is letters/whitespace, number is
/// digits with optional decimal point, unit is an optional trailing run
/// of letters, `/`, `%`, or the micro sign.
const LAB_VALUE_PATTERN: &str = r"([A-Za-z\s]+):\s*([\d.]+)\s*([a-zA-Z/%µ]+)?";

fn lab_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LAB_VALUE_PATTERN).expect("lab value pattern is valid"))
}

/// Extract structured measurements from OCR text.
///
/// Matches are non-overlapping, scanned left to right; result order equals
/// text order. Candidates with an empty trimmed label or an unparseable
/// number are discarded — a missed extraction, not an error. An empty
/// result is a valid, reportable outcome.
pub fn parse_lab_values(text: &str) -> Vec<LabMeasurement> {
    let mut results = Vec::new();

    for caps in lab_value_regex().captures_iter(text) {
        let test = caps[1].trim();
        if test.is_empty() {
            continue;
        }

        // `[\d.]+` admits tokens like "1.2.3" — float conversion is the
        // authority, failed candidates are dropped
        let value: f64 = match caps[2].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };

        let unit = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        results.push(LabMeasurement {
            test: test.to_string(),
            value,
            unit,
        });
    }

    tracing::debug!(
        text_length = text.len(),
        measurements = results.len(),
        "Parsed lab values"
    );
    results
}
