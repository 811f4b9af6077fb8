//! Output formatting utilities
//!
//! All currency and number formatting lives here; the core only hands out
//! raw numbers.

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::currency::{ArsAmount, CurrencyType};
use crate::core::status::{CaseStatus, StatusTone};

/// Text shown where an ARS value cannot be computed
pub const MISSING_RATE_NOTICE: &str = "ingrese una cotización válida";

/// Determine the effective output format from the flag and the configured default
pub fn effective_format(format: OutputFormat, config_default: Option<&str>) -> OutputFormat {
    match format {
        OutputFormat::Auto => config_default
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(OutputFormat::Human),
        other => other,
    }
}

/// Print a value as YAML or JSON
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Group an integer string with `.` every three digits
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Format a number the es-AR way: `.` thousands, `,` decimals, 2 places
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{},{}", sign, group_thousands(int_part), frac_part)
}

/// Amount with the case currency symbol, e.g. `US$1.234,50`
pub fn format_money(value: f64, currency: CurrencyType) -> String {
    let number = format_number(value);
    match number.strip_prefix('-') {
        Some(rest) => format!("-{}{}", currency.symbol(), rest),
        None => format!("{}{}", currency.symbol(), number),
    }
}

/// ARS projection, or the missing-rate notice
pub fn format_ars(amount: ArsAmount) -> String {
    match amount.value() {
        Some(v) => format!("{} ARS", format_money(v, CurrencyType::Ars)),
        None => MISSING_RATE_NOTICE.to_string(),
    }
}

/// Percentage with one decimal, e.g. `26,7%`
pub fn format_percent(value: f64) -> String {
    let fixed = format!("{:.1}", value);
    format!("{}%", fixed.replace('.', ","))
}

/// Status label colored by its tone
pub fn styled_status(status: CaseStatus) -> String {
    let label = style(status.label());
    match status.tone() {
        StatusTone::Blue => label.blue(),
        StatusTone::Yellow => label.yellow(),
        StatusTone::Green => label.green(),
        StatusTone::Gray => label.dim(),
    }
    .to_string()
}

/// Signed amount: green when positive, red when negative
pub fn styled_money(value: f64, currency: CurrencyType) -> String {
    let text = style(format_money(value, currency));
    if value < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_format() {
        assert_eq!(effective_format(OutputFormat::Auto, None), OutputFormat::Human);
        assert_eq!(
            effective_format(OutputFormat::Auto, Some("json")),
            OutputFormat::Json
        );
        assert_eq!(
            effective_format(OutputFormat::Auto, Some("bogus")),
            OutputFormat::Human
        );
        assert_eq!(
            effective_format(OutputFormat::Yaml, Some("json")),
            OutputFormat::Yaml
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0,00");
        assert_eq!(format_number(1234.5), "1.234,50");
        assert_eq!(format_number(1_600_000.0), "1.600.000,00");
        assert_eq!(format_number(-3200.0), "-3.200,00");
        assert_eq!(format_number(999.999), "1.000,00");
        assert_eq!(format_number(-0.001), "0,00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1600.0, CurrencyType::Ars), "$1.600,00");
        assert_eq!(format_money(-50.0, CurrencyType::Usd), "-US$50,00");
    }

    #[test]
    fn test_format_ars() {
        assert_eq!(format_ars(ArsAmount::Converted(2500.0)), "$2.500,00 ARS");
        assert_eq!(format_ars(ArsAmount::Unavailable), MISSING_RATE_NOTICE);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(26.6667), "26,7%");
        assert_eq!(format_percent(-5.0), "-5,0%");
    }
}
