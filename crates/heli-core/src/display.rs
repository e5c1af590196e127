//! Presentation rounding. The engine itself never rounds.

/// Round a mass to whole units.
pub fn round_mass(value: f64) -> i64 {
    value.round() as i64
}

/// Whole-unit mass with thousands separators, e.g. `2,875`.
pub fn format_mass(value: f64) -> String {
    let rounded = round_mass(value);
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Hours as `H:MM`, rounded to the nearest minute.
pub fn format_hhmm(hours: f64) -> String {
    let total_minutes = (hours.max(0.0) * 60.0).round() as u64;
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_rounds_half_away_from_zero() {
        assert_eq!(round_mass(785.5), 786);
        assert_eq!(round_mass(785.49), 785);
        assert_eq!(round_mass(-0.4), 0);
    }

    #[test]
    fn mass_gets_thousands_separators() {
        assert_eq!(format_mass(786.0), "786");
        assert_eq!(format_mass(2875.4), "2,875");
        assert_eq!(format_mass(1_234_567.0), "1,234,567");
        assert_eq!(format_mass(-1500.0), "-1,500");
    }

    #[test]
    fn hours_format_as_clock() {
        assert_eq!(format_hhmm(0.714), "0:43");
        assert_eq!(format_hhmm(1.5), "1:30");
        assert_eq!(format_hhmm(2.999), "3:00");
        assert_eq!(format_hhmm(-1.0), "0:00");
    }
}
