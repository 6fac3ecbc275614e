use regex::Regex;

/// Pull the first price out of a blob of card text.
///
/// Hotel sites mix locales freely: `€1.649,76`, `1649,76 EUR`, `€ 1649.76`
/// all mean the same amount. The separator roles are inferred from position
/// rather than assumed from locale.
pub fn extract_price(text: &str) -> Option<f64> {
    let re = Regex::new(r"(?:€|EUR)\s*([0-9][0-9.,]*)|([0-9][0-9.,]*)\s*(?:€|EUR)").ok()?;
    let caps = re.captures(text)?;
    let raw = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim_end_matches(['.', ',']))?;
    parse_locale_number(raw)
}

/// Parse a numeric string whose `.` and `,` may each be a thousands or a
/// decimal separator.
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let dots = raw.matches('.').count();
    let commas = raw.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => raw.to_string(),
        // Both present: whichever comes last is the decimal point.
        (_, _) if dots >= 1 && commas >= 1 => {
            let last_dot = raw.rfind('.').unwrap_or(0);
            let last_comma = raw.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                raw.replace('.', "").replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (0, 1) => single_separator(raw, ','),
        (1, 0) => single_separator(raw, '.'),
        // Repeated separator can only be grouping: 1.234.567
        (_, 0) => raw.replace('.', ""),
        (0, _) => raw.replace(',', ""),
        _ => return None,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One separator: 1-2 trailing digits means decimal, exactly 3 means
/// grouping (`1.649` is EUR 1649, not 1.649).
fn single_separator(raw: &str, sep: char) -> String {
    let tail_len = raw.rsplit(sep).next().map(str::len).unwrap_or(0);
    if tail_len == 3 {
        raw.replace(sep, "")
    } else {
        raw.replace(sep, ".")
    }
}

/// Render an amount the way the booking pages show it: `€1.649,76`.
pub fn format_eur(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("€{}{},{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn european_thousands_and_decimal() {
        assert_eq!(extract_price("Totale €1.649,76 a notte"), Some(1649.76));
    }

    #[test]
    fn comma_decimal_without_grouping() {
        assert_eq!(extract_price("da 1649,76 € incluse tasse"), Some(1649.76));
    }

    #[test]
    fn dot_decimal() {
        assert_eq!(extract_price("EUR 1649.76"), Some(1649.76));
    }

    #[test]
    fn repeated_dots_are_grouping() {
        assert_eq!(parse_locale_number("1.234.567"), Some(1_234_567.0));
    }

    #[test]
    fn three_digit_tail_is_grouping() {
        assert_eq!(parse_locale_number("1.649"), Some(1649.0));
        assert_eq!(parse_locale_number("1,649"), Some(1649.0));
    }

    #[test]
    fn short_tail_is_decimal() {
        assert_eq!(parse_locale_number("120,5"), Some(120.5));
        assert_eq!(parse_locale_number("120.50"), Some(120.5));
    }

    #[test]
    fn no_price_in_text() {
        assert_eq!(extract_price("Camera Deluxe con vista mare"), None);
    }

    #[test]
    fn requires_currency_marker() {
        // Bare numbers (room counts, dates) must not parse as prices.
        assert_eq!(extract_price("2 adulti, 1 bambino"), None);
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_eur(1649.76), "€1.649,76");
        assert_eq!(format_eur(120.0), "€120,00");
        assert_eq!(format_eur(95.5), "€95,50");
    }
}
