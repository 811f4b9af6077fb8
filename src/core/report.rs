//! Portfolio reports over a set of cases
//!
//! Reports only read the derived figures produced by the savings calculator;
//! they never recompute savings with their own formulas.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::currency::CurrencyType;
use crate::core::savings::SavingsBreakdown;
use crate::core::status::{CaseStatus, ALL_STATUSES};
use crate::entities::CostSavingsCase;

/// Per-currency savings totals
///
/// Savings sums only cover cases with recorded results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyTotals {
    pub cases: usize,
    pub cases_with_results: usize,
    pub initial_cost: f64,
    pub projected_savings: f64,
    pub monthly_savings: f64,
    /// Projected savings with losses counted as 0
    pub upside: f64,
}

/// Savings attributed to an evaluating doctor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DoctorTotals {
    pub cases: usize,
    pub cases_with_results: usize,
    pub projected_savings: f64,
    /// Mean over cases with results
    pub average_savings: f64,
}

/// Aggregate view of a portfolio of cases
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_cases: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_currency: BTreeMap<CurrencyType, CurrencyTotals>,
    /// Projected savings expressed in ARS, over convertible cases with results
    pub projected_savings_ars: f64,
    /// Cases without a recorded current cost, left out of every savings total
    pub cases_without_results: usize,
    /// USD cases with results left out of the ARS total for lack of an exchange rate
    pub unconverted_cases: usize,
    pub by_doctor: BTreeMap<String, DoctorTotals>,
}

const UNASSIGNED_DOCTOR: &str = "Sin asignar";

fn doctor_key(case: &CostSavingsCase) -> String {
    case.evaluating_doctor
        .clone()
        .unwrap_or_else(|| UNASSIGNED_DOCTOR.to_string())
}

/// Summarize a set of cases
pub fn summarize(cases: &[CostSavingsCase]) -> PortfolioSummary {
    let mut by_status: BTreeMap<String, usize> = ALL_STATUSES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut by_currency: BTreeMap<CurrencyType, CurrencyTotals> = BTreeMap::new();
    let mut by_doctor: BTreeMap<String, DoctorTotals> = BTreeMap::new();
    let mut projected_savings_ars = 0.0;
    let mut cases_without_results = 0;
    let mut unconverted_cases = 0;

    for case in cases {
        let savings = case.savings();
        *by_status.entry(case.status.to_string()).or_default() += 1;

        let totals = by_currency.entry(case.currency_type).or_default();
        let doctor = by_doctor.entry(doctor_key(case)).or_default();
        totals.cases += 1;
        doctor.cases += 1;

        if !savings.has_results {
            cases_without_results += 1;
            continue;
        }

        totals.cases_with_results += 1;
        totals.initial_cost += savings.initial_cost;
        totals.projected_savings += savings.projected_savings;
        totals.monthly_savings += savings.monthly_savings;
        totals.upside += savings.upside();

        doctor.cases_with_results += 1;
        doctor.projected_savings += savings.projected_savings;

        match savings
            .in_ars(case.currency_type, case.exchange_rate)
            .projected_savings
            .value()
        {
            Some(v) => projected_savings_ars += v,
            None => unconverted_cases += 1,
        }
    }

    for totals in by_doctor.values_mut() {
        totals.average_savings = if totals.cases_with_results > 0 {
            totals.projected_savings / totals.cases_with_results as f64
        } else {
            0.0
        };
    }

    PortfolioSummary {
        total_cases: cases.len(),
        by_status,
        by_currency,
        projected_savings_ars,
        cases_without_results,
        unconverted_cases,
        by_doctor,
    }
}

/// Flat export row for one case
///
/// Savings columns are empty when no current cost was recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRow {
    pub id: String,
    pub title: String,
    pub patient: String,
    pub diagnosis: String,
    pub status: CaseStatus,
    pub currency: CurrencyType,
    pub initial_monthly_cost: f64,
    pub current_monthly_cost: Option<f64>,
    pub monthly_savings: Option<f64>,
    pub projected_savings: Option<f64>,
    /// Also empty when the ARS value is unavailable
    pub projected_savings_ars: Option<f64>,
    pub savings_percentage: Option<String>,
    pub evaluating_doctor: String,
    pub created: String,
}

impl CaseRow {
    pub fn from_case(case: &CostSavingsCase) -> Self {
        let savings: SavingsBreakdown = case.savings();
        let recorded = savings.has_results.then_some(savings);
        Self {
            id: case.id.short(),
            title: case.title.clone(),
            patient: case.patient.clone(),
            diagnosis: case.diagnosis.clone(),
            status: case.status,
            currency: case.currency_type,
            initial_monthly_cost: case.initial_monthly_cost,
            current_monthly_cost: case.current_monthly_cost,
            monthly_savings: recorded.map(|s| s.monthly_savings),
            projected_savings: recorded.map(|s| s.projected_savings),
            projected_savings_ars: recorded.and_then(|s| {
                s.in_ars(case.currency_type, case.exchange_rate)
                    .projected_savings
                    .value()
            }),
            savings_percentage: recorded.map(|s| format!("{:.2}", s.savings_percentage)),
            evaluating_doctor: doctor_key(case),
            created: case.created.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Render cases as CSV with a header row
pub fn to_csv(cases: &[CostSavingsCase]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for case in cases {
        writer.serialize(CaseRow::from_case(case))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewCase;

    fn case(
        currency: CurrencyType,
        rate: f64,
        current: Option<f64>,
        doctor: Option<&str>,
    ) -> CostSavingsCase {
        let mut c = CostSavingsCase::new(
            NewCase {
                title: "Caso".to_string(),
                patient: "HC-1".to_string(),
                diagnosis: "Dx".to_string(),
                evaluating_doctor: doctor.map(str::to_string),
                currency_type: currency,
                exchange_rate: rate,
                initial_monthly_cost: 1000.0,
                projected_period_months: 6,
                intervention_cost: 200.0,
                ..Default::default()
            },
            "auditor",
        );
        c.current_monthly_cost = current;
        c
    }

    #[test]
    fn test_summary_counts_and_totals() {
        let mut completed = case(CurrencyType::Ars, 1.0, Some(700.0), Some("Dra. Ruiz"));
        completed.status = CaseStatus::Completado;
        let cases = vec![
            completed,
            case(CurrencyType::Ars, 1.0, None, Some("Dra. Ruiz")),
            case(CurrencyType::Usd, 1000.0, Some(700.0), None),
            case(CurrencyType::Usd, 0.0, Some(700.0), None),
        ];

        let summary = summarize(&cases);
        assert_eq!(summary.total_cases, 4);
        assert_eq!(summary.by_status["completado"], 1);
        assert_eq!(summary.by_status["en_evaluacion"], 3);
        assert_eq!(summary.by_status["sin_optimizacion"], 0);

        let ars = &summary.by_currency[&CurrencyType::Ars];
        assert_eq!(ars.cases, 2);
        assert_eq!(ars.cases_with_results, 1);
        assert_eq!(ars.projected_savings, 1600.0);
        assert_eq!(ars.upside, 1600.0);

        assert_eq!(summary.cases_without_results, 1);
        assert_eq!(summary.unconverted_cases, 1);
        assert_eq!(summary.projected_savings_ars, 1600.0 + 1_600_000.0);

        let ruiz = &summary.by_doctor["Dra. Ruiz"];
        assert_eq!(ruiz.cases, 2);
        assert_eq!(ruiz.cases_with_results, 1);
        assert_eq!(ruiz.average_savings, 1600.0);
        assert_eq!(summary.by_doctor[UNASSIGNED_DOCTOR].cases, 2);
    }

    #[test]
    fn test_case_without_results_adds_no_savings() {
        let summary = summarize(&[case(CurrencyType::Ars, 1.0, None, None)]);
        let ars = &summary.by_currency[&CurrencyType::Ars];
        assert_eq!(ars.cases, 1);
        assert_eq!(ars.projected_savings, 0.0);
        assert_eq!(ars.monthly_savings, 0.0);
        assert_eq!(summary.projected_savings_ars, 0.0);
        assert_eq!(summary.cases_without_results, 1);
        assert_eq!(summary.by_doctor[UNASSIGNED_DOCTOR].average_savings, 0.0);

        let row = CaseRow::from_case(&case(CurrencyType::Ars, 1.0, None, None));
        assert_eq!(row.monthly_savings, None);
        assert_eq!(row.projected_savings, None);
        assert_eq!(row.savings_percentage, None);
    }

    #[test]
    fn test_upside_ignores_losses() {
        let summary = summarize(&[
            case(CurrencyType::Ars, 1.0, Some(700.0), None),
            case(CurrencyType::Ars, 1.0, Some(1500.0), None),
        ]);
        let ars = &summary.by_currency[&CurrencyType::Ars];
        assert_eq!(ars.projected_savings, 1600.0 + (6000.0 - 9000.0 - 200.0));
        assert_eq!(ars.upside, 1600.0);
    }

    #[test]
    fn test_summary_serializes_currency_keys() {
        let summary = summarize(&[case(CurrencyType::Usd, 0.0, Some(700.0), None)]);
        let yaml = serde_yml::to_string(&summary).unwrap();
        assert!(yaml.contains("USD:"));
    }

    #[test]
    fn test_csv_export() {
        let cases = vec![
            case(CurrencyType::Ars, 1.0, Some(700.0), Some("Dr. Sosa, J.")),
            case(CurrencyType::Usd, 0.0, None, None),
        ];
        let csv = to_csv(&cases).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,title,patient"));
        assert!(header.contains("projected_savings_ars"));

        let first = lines.next().unwrap();
        assert!(first.contains("1600"));
        assert!(first.contains("26.67"));
        assert!(first.contains("\"Dr. Sosa, J.\""));

        let second = lines.next().unwrap();
        assert!(second.contains(",USD,1000.0,,,,,,Sin asignar,"));
    }
}
