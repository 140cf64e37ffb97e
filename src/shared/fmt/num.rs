//! Digit grouping helpers shared by the decimal formatters.

/// Inserts `,` thousands separators into the integer part of a plain
/// numeric string (`"-1234567.5"` → `"-1,234,567.5"`).
pub fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };

    let mut parts = unsigned.splitn(2, '.');
    let integer = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let grouped = integer
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|c| std::str::from_utf8(c).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Trims trailing zeros, adds thousands separators.
pub fn display_formatted_string(formatted: String) -> String {
    let trimmed = if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    };
    group_thousands(&trimmed)
}
