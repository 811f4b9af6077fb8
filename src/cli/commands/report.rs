//! Report command - portfolio summary over a directory of cases

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::truncate_str;
use crate::cli::output::{
    effective_format, format_ars, format_money, format_percent, print_structured,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::currency::ArsAmount;
use crate::core::report::{summarize, to_csv};
use crate::core::{store, CaseStatus, Config};
use crate::entities::CostSavingsCase;

/// Summarize all cases in a directory
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Directory holding case files
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Only include cases with this status
    #[arg(long)]
    pub status: Option<CaseStatus>,
}

#[derive(Tabled)]
struct CaseTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Título")]
    title: String,
    #[tabled(rename = "Estado")]
    status: String,
    #[tabled(rename = "Ahorro mensual")]
    monthly_savings: String,
    #[tabled(rename = "Ahorro proyectado")]
    projected_savings: String,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Nivel")]
    level: String,
}

impl ReportArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let config = Config::load();
        let cases: Vec<CostSavingsCase> = store::load_cases_in(&self.dir)
            .into_diagnostic()?
            .into_iter()
            .map(|(_, case)| case)
            .filter(|case| self.status.map_or(true, |wanted| wanted == case.status))
            .collect();
        tracing::debug!(dir = %self.dir.display(), cases = cases.len(), "loaded cases for report");

        match effective_format(global.output, config.default_format.as_deref()) {
            OutputFormat::Csv => {
                print!("{}", to_csv(&cases).into_diagnostic()?);
                Ok(())
            }
            OutputFormat::Yaml => print_structured(&summarize(&cases), OutputFormat::Yaml),
            OutputFormat::Json => print_structured(&summarize(&cases), OutputFormat::Json),
            OutputFormat::Human | OutputFormat::Auto => {
                print_human(&cases, &config);
                Ok(())
            }
        }
    }
}

/// Placeholder for savings cells of cases without results
const NO_RESULTS: &str = "(sin resultados)";

fn print_human(cases: &[CostSavingsCase], config: &Config) {
    if cases.is_empty() {
        println!("No cases found");
        return;
    }

    let rows: Vec<CaseTableRow> = cases
        .iter()
        .map(|case| {
            let savings = case.savings();
            let c = case.currency_type;
            let cell = |text: String| {
                if savings.has_results {
                    text
                } else {
                    NO_RESULTS.to_string()
                }
            };
            CaseTableRow {
                id: case.id.short(),
                title: truncate_str(&case.title, 30),
                status: case.status.label().to_string(),
                monthly_savings: cell(format_money(savings.monthly_savings, c)),
                projected_savings: cell(format_money(savings.projected_savings, c)),
                percentage: cell(format_percent(savings.savings_percentage)),
                level: if savings.has_results {
                    savings.level(&config.savings).label().to_string()
                } else {
                    "-".to_string()
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let summary = summarize(cases);
    println!();
    println!("{} {} case(s)", style("Total:").bold(), summary.total_cases);
    for (status, count) in &summary.by_status {
        if *count > 0 {
            println!("  {:<18} {}", status, count);
        }
    }
    for (currency, totals) in &summary.by_currency {
        println!(
            "  Ahorro proyectado {}: {} ({} de {} caso(s) con resultados; potencial {})",
            currency,
            format_money(totals.projected_savings, *currency),
            totals.cases_with_results,
            totals.cases,
            format_money(totals.upside, *currency)
        );
    }
    println!(
        "  Ahorro proyectado total en ARS: {}",
        format_ars(ArsAmount::Converted(summary.projected_savings_ars))
    );
    if summary.cases_without_results > 0 {
        println!(
            "  {} caso(s) sin resultados excluidos de los totales",
            summary.cases_without_results
        );
    }
    if summary.unconverted_cases > 0 {
        println!(
            "  {} {} caso(s) USD sin cotización válida excluidos del total",
            style("!").yellow(),
            summary.unconverted_cases
        );
    }
}
