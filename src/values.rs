//! Presence filter and locale formatting for measured and derived values.

/// Unit suffixes that may trail a placeholder value ("0 cm", "- ms").
pub const UNITS: [&str; 8] = ["cm", "cm/s", "ms", "mmHg", "mmHg/s", "bpm", "%", "kg"];

fn is_bare_unit(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.is_empty() || UNITS.contains(&rest)
}

/// Whether a value carries something worth printing.
///
/// Empty strings, `-`, `--`, `0`, a bare unit and a zero or dash followed only
/// by a unit are all placeholders.
pub fn is_present(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let trimmed = value.trim();
    if matches!(trimmed, "" | "-" | "--" | "0") {
        return false;
    }
    if let Some(rest) = trimmed.strip_prefix('-')
        && is_bare_unit(rest)
    {
        return false;
    }
    if let Some(rest) = trimmed.strip_prefix('0')
        && is_bare_unit(rest)
    {
        return false;
    }
    !UNITS.contains(&trimmed)
}

/// The trimmed value when it is present.
pub fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| is_present(Some(v)))
        .map(str::trim)
}

/// Swap the decimal point for the display separator. Magnitude and rounding
/// are left untouched.
pub fn format_decimal(value: &str, separator: char) -> String {
    if separator == '.' {
        return value.to_string();
    }
    value.replace('.', &separator.to_string())
}

/// Present value followed by its unit, e.g. `4,0 cm`. Percentages attach
/// without a space.
pub fn with_unit(value: &str, unit: &str, separator: char) -> String {
    let number = format_decimal(value, separator);
    if unit == "%" {
        format!("{number}%")
    } else {
        format!("{number} {unit}")
    }
}

/// Present value re-rendered at a fixed precision (TDI velocities use one
/// decimal). Unparseable input yields `None`.
pub fn fixed(value: &str, decimals: usize, separator: char) -> Option<String> {
    let number = crate::metrics::parse_decimal(Some(value))?;
    Some(format_decimal(&format!("{number:.decimals$}"), separator))
}

/// ISO `YYYY-MM-DD` dates print as `DD/MM/YYYY`; anything else is passed
/// through unchanged.
pub fn format_date(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.contains('/') {
        return trimmed.to_string();
    }
    match chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_units_are_placeholders() {
        for unit in UNITS {
            assert!(!is_present(Some(unit)), "{unit}");
            assert!(!is_present(Some(&format!("0 {unit}"))), "0 {unit}");
            assert!(!is_present(Some(&format!("- {unit}"))), "- {unit}");
        }
    }

    #[test]
    fn leading_zero_decimals_are_values() {
        assert!(is_present(Some("0.35")));
        assert!(is_present(Some("0,94 cm")));
    }

    #[test]
    fn date_formatting() {
        assert_eq!(format_date("2024-03-07"), "07/03/2024");
        assert_eq!(format_date("07/03/2024"), "07/03/2024");
        assert_eq!(format_date("março"), "março");
    }
}
