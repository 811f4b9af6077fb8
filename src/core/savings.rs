//! Cost-savings calculator
//!
//! Derives savings figures from the raw cost inputs of a case. The
//! derivation is a pure function and must be invoked again on every change
//! to a raw input; derived values are never stored as independent truth.

use serde::Serialize;

use crate::core::currency::{to_ars, ArsAmount, CurrencyType};

/// Raw inputs to the savings derivation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostInputs {
    /// Baseline recurring cost before intervention
    pub initial_monthly_cost: f64,
    /// Horizon over which monthly costs are projected
    pub projected_period_months: u32,
    /// Baseline projected total, supplied by the caller
    pub initial_cost: f64,
    /// Recurring cost after intervention (`None` until results are recorded)
    pub current_monthly_cost: Option<f64>,
    /// One-time cost of the intervention
    pub intervention_cost: f64,
}

impl CostInputs {
    /// Inputs whose baseline total is `initial_monthly_cost * months`
    pub fn from_monthly(
        initial_monthly_cost: f64,
        projected_period_months: u32,
        current_monthly_cost: Option<f64>,
        intervention_cost: f64,
    ) -> Self {
        Self {
            initial_monthly_cost,
            projected_period_months,
            initial_cost: initial_projected_cost(initial_monthly_cost, projected_period_months),
            current_monthly_cost,
            intervention_cost,
        }
    }
}

/// Projected total of a monthly cost over a period
pub fn initial_projected_cost(monthly_cost: f64, months: u32) -> f64 {
    monthly_cost * f64::from(months)
}

/// Derived savings figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsBreakdown {
    pub initial_cost: f64,
    pub current_projected_cost: f64,
    pub monthly_savings: f64,
    pub projected_savings: f64,
    pub savings_percentage: f64,
    pub intervention_cost: f64,
    /// Whether a post-intervention monthly cost was recorded
    pub has_results: bool,
}

/// Derive the savings breakdown from raw inputs.
///
/// An absent current cost contributes 0 to the arithmetic; callers that
/// need to tell "not recorded" from "zero" use [`SavingsBreakdown::has_results`].
pub fn calculate(inputs: &CostInputs) -> SavingsBreakdown {
    let current_monthly = inputs.current_monthly_cost.unwrap_or(0.0);
    let current_projected_cost = current_monthly * f64::from(inputs.projected_period_months);
    let monthly_savings = inputs.initial_monthly_cost - current_monthly;
    let projected_savings = inputs.initial_cost - current_projected_cost - inputs.intervention_cost;
    let savings_percentage = if inputs.initial_cost > 0.0 {
        (projected_savings / inputs.initial_cost) * 100.0
    } else {
        0.0
    };

    SavingsBreakdown {
        initial_cost: inputs.initial_cost,
        current_projected_cost,
        monthly_savings,
        projected_savings,
        savings_percentage,
        intervention_cost: inputs.intervention_cost,
        has_results: inputs.current_monthly_cost.is_some(),
    }
}

/// Savings tier used to highlight cases in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsLevel {
    High,
    Medium,
    None,
}

impl SavingsLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SavingsLevel::High => "Alto",
            SavingsLevel::Medium => "Medio",
            SavingsLevel::None => "Sin ahorro",
        }
    }
}

/// Efficiency rating shown next to the percentage gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Efficiency {
    High,
    Medium,
    Low,
    None,
}

impl Efficiency {
    pub fn label(&self) -> &'static str {
        match self {
            Efficiency::High => "Alta Eficiencia",
            Efficiency::Medium => "Media Eficiencia",
            Efficiency::Low => "Baja Eficiencia",
            Efficiency::None => "Sin Ahorro",
        }
    }
}

/// Thresholds for presentation tiers, in percent
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, Serialize)]
#[serde(default)]
pub struct SavingsThresholds {
    /// Percentage above which a case counts as high savings
    pub high_level: f64,
    /// Gauge value above which efficiency is high
    pub high_efficiency: f64,
    /// Gauge value above which efficiency is medium
    pub medium_efficiency: f64,
}

impl Default for SavingsThresholds {
    fn default() -> Self {
        Self {
            high_level: 30.0,
            high_efficiency: 60.0,
            medium_efficiency: 30.0,
        }
    }
}

impl SavingsBreakdown {
    /// Percentage clamped to 0..=100 for gauge rendering
    pub fn gauge_percentage(&self) -> f64 {
        gauge_clamp(self.savings_percentage)
    }

    /// Projected savings with losses shown as 0, for "upside" badges
    pub fn upside(&self) -> f64 {
        self.projected_savings.max(0.0)
    }

    pub fn level(&self, thresholds: &SavingsThresholds) -> SavingsLevel {
        savings_level(Some(self.savings_percentage), thresholds)
    }

    pub fn efficiency(&self, thresholds: &SavingsThresholds) -> Efficiency {
        let pct = self.gauge_percentage();
        if pct > thresholds.high_efficiency {
            Efficiency::High
        } else if pct > thresholds.medium_efficiency {
            Efficiency::Medium
        } else if pct > 0.0 {
            Efficiency::Low
        } else {
            Efficiency::None
        }
    }

    /// ARS-denominated projection of every monetary output
    pub fn in_ars(&self, currency: CurrencyType, exchange_rate: f64) -> ArsBreakdown {
        let conv = |v: f64| to_ars(v, currency, exchange_rate);
        ArsBreakdown {
            initial_cost: conv(self.initial_cost),
            current_projected_cost: conv(self.current_projected_cost),
            monthly_savings: conv(self.monthly_savings),
            projected_savings: conv(self.projected_savings),
            intervention_cost: conv(self.intervention_cost),
        }
    }
}

/// Clamp a percentage to the 0..=100 gauge range; NaN maps to 0
pub fn gauge_clamp(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Tier for a stored percentage; absent or non-positive means no savings
pub fn savings_level(percentage: Option<f64>, thresholds: &SavingsThresholds) -> SavingsLevel {
    match percentage {
        Some(p) if p > thresholds.high_level => SavingsLevel::High,
        Some(p) if p > 0.0 => SavingsLevel::Medium,
        _ => SavingsLevel::None,
    }
}

/// Monetary outputs expressed in ARS
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArsBreakdown {
    pub initial_cost: ArsAmount,
    pub current_projected_cost: ArsAmount,
    pub monthly_savings: ArsAmount,
    pub projected_savings: ArsAmount,
    pub intervention_cost: ArsAmount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_inputs() -> CostInputs {
        CostInputs {
            initial_monthly_cost: 1000.0,
            projected_period_months: 6,
            initial_cost: 6000.0,
            current_monthly_cost: Some(700.0),
            intervention_cost: 200.0,
        }
    }

    #[test]
    fn test_reference_breakdown() {
        let b = calculate(&reference_inputs());
        assert_eq!(b.current_projected_cost, 4200.0);
        assert_eq!(b.monthly_savings, 300.0);
        assert_eq!(b.projected_savings, 1600.0);
        assert!((b.savings_percentage - 26.666_666).abs() < 1e-3);
        assert!(b.has_results);
    }

    #[test]
    fn test_zero_initial_cost_guards_percentage() {
        let inputs = CostInputs {
            initial_cost: 0.0,
            ..reference_inputs()
        };
        assert_eq!(calculate(&inputs).savings_percentage, 0.0);
    }

    #[test]
    fn test_negative_savings_are_preserved() {
        let inputs = CostInputs {
            current_monthly_cost: Some(1500.0),
            ..reference_inputs()
        };
        let b = calculate(&inputs);
        assert_eq!(b.monthly_savings, -500.0);
        assert_eq!(b.projected_savings, 6000.0 - 9000.0 - 200.0);
        assert!(b.savings_percentage < 0.0);
        assert_eq!(b.upside(), 0.0);
        assert_eq!(b.gauge_percentage(), 0.0);
        assert_eq!(b.level(&SavingsThresholds::default()), SavingsLevel::None);
    }

    #[test]
    fn test_absent_current_cost_is_distinct() {
        let inputs = CostInputs {
            current_monthly_cost: None,
            ..reference_inputs()
        };
        let b = calculate(&inputs);
        assert!(!b.has_results);
        assert_eq!(b.current_projected_cost, 0.0);
        assert_eq!(b.monthly_savings, 1000.0);
    }

    #[test]
    fn test_from_monthly_projects_baseline() {
        let inputs = CostInputs::from_monthly(1000.0, 6, Some(700.0), 200.0);
        assert_eq!(inputs, reference_inputs());
    }

    #[test]
    fn test_levels_and_efficiency() {
        let t = SavingsThresholds::default();
        assert_eq!(savings_level(None, &t), SavingsLevel::None);
        assert_eq!(savings_level(Some(0.0), &t), SavingsLevel::None);
        assert_eq!(savings_level(Some(30.0), &t), SavingsLevel::Medium);
        assert_eq!(savings_level(Some(30.5), &t), SavingsLevel::High);

        let b = calculate(&reference_inputs());
        assert_eq!(b.efficiency(&t), Efficiency::Low);

        let strong = calculate(&CostInputs {
            current_monthly_cost: Some(100.0),
            intervention_cost: 0.0,
            ..reference_inputs()
        });
        assert_eq!(strong.efficiency(&t), Efficiency::High);
    }

    #[test]
    fn test_gauge_clamp() {
        assert_eq!(gauge_clamp(-12.0), 0.0);
        assert_eq!(gauge_clamp(140.0), 100.0);
        assert_eq!(gauge_clamp(42.5), 42.5);
        assert_eq!(gauge_clamp(f64::NAN), 0.0);
    }

    #[test]
    fn test_in_ars_for_usd_case() {
        let b = calculate(&reference_inputs());
        let ars = b.in_ars(CurrencyType::Usd, 1000.0);
        assert_eq!(ars.projected_savings, ArsAmount::Converted(1_600_000.0));

        let missing = b.in_ars(CurrencyType::Usd, 0.0);
        assert_eq!(missing.projected_savings, ArsAmount::Unavailable);
        assert_eq!(missing.monthly_savings, ArsAmount::Unavailable);
    }
}
