//! Calc command - savings figures from raw inputs, without a case file

use clap::Args;
use miette::{bail, Result};
use serde::Serialize;

use crate::cli::output::{
    effective_format, format_ars, format_money, format_percent, print_structured, styled_money,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::currency::CurrencyType;
use crate::core::savings::{
    calculate, initial_projected_cost, ArsBreakdown, CostInputs, Efficiency, SavingsBreakdown,
    SavingsLevel,
};
use crate::core::Config;

/// Compute savings figures from raw cost inputs
#[derive(Debug, Args)]
pub struct CalcArgs {
    /// Baseline monthly cost
    #[arg(long)]
    pub initial_monthly: f64,

    /// Projection period in months
    #[arg(long)]
    pub months: u32,

    /// Baseline projected total (default: initial monthly × months)
    #[arg(long)]
    pub initial_cost: Option<f64>,

    /// Monthly cost after intervention
    #[arg(long)]
    pub current_monthly: Option<f64>,

    /// One-time intervention cost
    #[arg(long, default_value_t = 0.0)]
    pub intervention_cost: f64,

    /// Currency of the amounts (ARS or USD)
    #[arg(long, default_value_t = CurrencyType::Ars)]
    pub currency: CurrencyType,

    /// USD→ARS exchange rate
    #[arg(long, default_value_t = 1.0)]
    pub exchange_rate: f64,
}

#[derive(Debug, Serialize)]
struct CalcReport {
    currency: CurrencyType,
    #[serde(flatten)]
    savings: SavingsBreakdown,
    gauge_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<SavingsLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    efficiency: Option<Efficiency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ars: Option<ArsBreakdown>,
}

impl CalcArgs {
    fn inputs(&self) -> CostInputs {
        CostInputs {
            initial_monthly_cost: self.initial_monthly,
            projected_period_months: self.months,
            initial_cost: self
                .initial_cost
                .unwrap_or_else(|| initial_projected_cost(self.initial_monthly, self.months)),
            current_monthly_cost: self.current_monthly,
            intervention_cost: self.intervention_cost,
        }
    }

    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        for (name, value) in [
            ("--initial-monthly", Some(self.initial_monthly)),
            ("--initial-cost", self.initial_cost),
            ("--current-monthly", self.current_monthly),
            ("--intervention-cost", Some(self.intervention_cost)),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    bail!("{} must be a non-negative number, got {}", name, v);
                }
            }
        }

        let config = Config::load();
        let savings = calculate(&self.inputs());
        let report = CalcReport {
            currency: self.currency,
            savings,
            gauge_percentage: savings.gauge_percentage(),
            level: savings
                .has_results
                .then(|| savings.level(&config.savings)),
            efficiency: savings
                .has_results
                .then(|| savings.efficiency(&config.savings)),
            ars: (self.currency == CurrencyType::Usd)
                .then(|| savings.in_ars(self.currency, self.exchange_rate)),
        };

        match effective_format(global.output, config.default_format.as_deref()) {
            OutputFormat::Human | OutputFormat::Auto | OutputFormat::Csv => {
                print_human(&report);
                Ok(())
            }
            format => print_structured(&report, format),
        }
    }
}

fn print_human(report: &CalcReport) {
    let c = report.currency;
    let s = &report.savings;
    println!("Costo inicial proyectado:  {}", format_money(s.initial_cost, c));
    println!("Costo de intervención:     {}", format_money(s.intervention_cost, c));
    if !s.has_results {
        println!("Costo actual proyectado:   (sin resultados)");
        return;
    }

    println!(
        "Costo actual proyectado:   {}",
        format_money(s.current_projected_cost, c)
    );
    println!("Ahorro mensual:            {}", styled_money(s.monthly_savings, c));
    println!("Ahorro proyectado:         {}", styled_money(s.projected_savings, c));
    if let (Some(level), Some(efficiency)) = (report.level, report.efficiency) {
        println!(
            "Porcentaje de ahorro:      {} ({}, {})",
            format_percent(s.savings_percentage),
            level.label(),
            efficiency.label()
        );
    }
    if let Some(ars) = &report.ars {
        println!("Ahorro proyectado (ARS):   {}", format_ars(ars.projected_savings));
    }
}
