//! Textual number normalisation for scraped or hand-entered values.
//!
//! Handles thousands separators, percentages and the Indian magnitude
//! suffixes (`Cr`, `L`) alongside `B` / `M`.

/// Markers meaning "no value".
const MISSING_MARKERS: [&str; 4] = ["", "—", "-", "N/A"];

/// Suffixes checked longest first so `crore` is not read as `e`.
const MAGNITUDE_SUFFIXES: [(&str, f64); 8] = [
    ("crore", 1e7),
    ("lakh", 1e5),
    ("cr", 1e7),
    ("bn", 1e9),
    ("mn", 1e6),
    ("l", 1e5),
    ("b", 1e9),
    ("m", 1e6),
];

const CURRENCY_PREFIXES: [&str; 4] = ["₹", "rs.", "rs", "$"];

/// Parses a displayed number, returning `None` for missing markers,
/// unparseable text, zero and non-finite results.
///
/// `"12.5%"` is `0.125`; `"1,234 Cr"` is `1.234e10`.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return None;
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let compact = strip_currency(&compact);

    let value = if let Some(number) = compact.strip_suffix('%') {
        number.parse::<f64>().ok()? / 100.0
    } else {
        let (number, multiplier) = split_magnitude(compact);
        number.parse::<f64>().ok()? * multiplier
    };

    (value.is_finite() && value != 0.0).then_some(value)
}

fn strip_currency(text: &str) -> &str {
    CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
}

fn split_magnitude(text: &str) -> (&str, f64) {
    MAGNITUDE_SUFFIXES
        .iter()
        .find_map(|(suffix, multiplier)| {
            text.strip_suffix(suffix)
                .filter(|number| number.ends_with(|c: char| c.is_ascii_digit() || c == '.'))
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((text, 1.0))
}
