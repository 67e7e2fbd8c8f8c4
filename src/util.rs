use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"$1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Sum amounts without panicking when the total leaves `Decimal`'s range.
pub(crate) fn checked_total(
    values: impl IntoIterator<Item = Decimal>,
    what: &str,
) -> Result<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| anyhow::anyhow!("{what} overflowed"))
    })
}

/// Parse a user-typed amount. Accepts a leading `$` and thousand separators.
pub(crate) fn parse_amount(input: &str) -> Result<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| anyhow::anyhow!("Invalid amount: {input}"))
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}
