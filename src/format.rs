use crate::explorer::FieldSpec;
use crate::record::{FieldKind, Record, number_of, text_of};

/// How a field is rendered into a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellFormat {
    #[default]
    Plain,
    TitleCase,
    Currency,
    Integer,
    PerCapita,
}

// Tokens that stay upper case when title-casing names.
const KEEP_UPPER: &[&str] = &[
    "LLC", "LLP", "LP", "INC", "II", "III", "IV", "USA", "US", "USDA", "JV", "PLC",
];

impl CellFormat {
    pub fn text(self, value: &str) -> String {
        match self {
            CellFormat::TitleCase => title_case(value),
            _ => value.to_string(),
        }
    }

    pub fn number(self, value: f64) -> String {
        match self {
            CellFormat::Currency => abbreviate_currency(value),
            CellFormat::Integer => thousands(value),
            CellFormat::PerCapita => per_capita(value),
            CellFormat::Plain | CellFormat::TitleCase => value.to_string(),
        }
    }
}

/// Formats one field of a record for display.
pub fn cell<R: Record>(record: &R, field: &FieldSpec) -> String {
    match field.kind {
        FieldKind::Text => field.format.text(&text_of(record, &field.name)),
        FieldKind::Number => field.format.number(number_of(record, &field.name)),
    }
}

/// `$1.2B`, `$45.6M`, `$12.3K`, `$950`.
pub fn abbreviate_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{sign}${:.1}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.1}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}${:.1}K", abs / 1e3)
    } else {
        format!("{sign}${:.0}", abs)
    }
}

/// Rounds to an integer and groups digits by three: `4812` → `4,812`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn per_capita(value: f64) -> String {
    format!("${:.2}", value)
}

/// `ACME FARMS LLC` → `Acme Farms LLC`, `o'brien-smith` → `O'Brien-Smith`.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            if KEEP_UPPER.contains(&word.to_uppercase().trim_end_matches([',', '.'])) {
                return word.to_uppercase();
            }
            let mut out = String::with_capacity(word.len());
            let mut start = true;
            for c in word.chars() {
                if start {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                start = matches!(c, '-' | '\'' | '(' | '/' | '.');
            }
            out
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Trailing message below a truncated table.
pub fn summary_line(displayed: usize, total: usize) -> Option<String> {
    if total > displayed {
        Some(format!(
            "Showing {} of {} results",
            thousands(displayed as f64),
            thousands(total as f64)
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn currency_is_abbreviated() {
        assert_eq!(abbreviate_currency(0.0), "$0");
        assert_eq!(abbreviate_currency(950.4), "$950");
        assert_eq!(abbreviate_currency(12_345.0), "$12.3K");
        assert_eq!(abbreviate_currency(45_600_000.0), "$45.6M");
        assert_eq!(abbreviate_currency(1_230_000_000.0), "$1.2B");
        assert_eq!(abbreviate_currency(-2_500_000.0), "-$2.5M");
    }

    #[test]
    fn integers_get_separators() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(4812.0), "4,812");
        assert_eq!(thousands(1_234_567.4), "1,234,567");
        assert_eq!(thousands(-12_000.0), "-12,000");
    }

    #[test]
    fn names_are_title_cased() {
        assert_eq!(title_case("ACME FARMS LLC"), "Acme Farms LLC");
        assert_eq!(title_case("o'brien-smith"), "O'Brien-Smith");
        assert_eq!(title_case("DES MOINES"), "Des Moines");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn summary_only_when_truncated() {
        assert_eq!(
            summary_line(200, 4812),
            Some("Showing 200 of 4,812 results".to_string())
        );
        assert_eq!(summary_line(3, 3), None);
        assert_eq!(summary_line(0, 0), None);
    }

    #[test]
    fn formats_dispatch_by_kind() {
        assert_eq!(CellFormat::Currency.number(1500.0), "$1.5K");
        assert_eq!(CellFormat::PerCapita.number(12.5), "$12.50");
        assert_eq!(CellFormat::Integer.number(12000.0), "12,000");
        assert_eq!(CellFormat::TitleCase.text("CEDAR CO"), "Cedar Co");
        assert_eq!(CellFormat::Plain.text("TX"), "TX");
    }
}
