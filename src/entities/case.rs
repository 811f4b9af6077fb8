//! Cost-savings case entity - one patient's intervention under audit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::currency::CurrencyType;
use crate::core::entity::Entity;
use crate::core::identity::CaseId;
use crate::core::savings::{calculate, CostInputs, SavingsBreakdown};
use crate::core::status::CaseStatus;
use crate::core::timeline::TimelineEvent;
use crate::core::transitions::CaseSnapshot;

fn default_exchange_rate() -> f64 {
    1.0
}

/// A cost-savings case
///
/// Only raw inputs are stored. Savings figures are derived on demand with
/// [`CostSavingsCase::savings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSavingsCase {
    /// Unique identifier
    pub id: CaseId,

    /// Short case title
    pub title: String,

    /// Patient reference (name or record number)
    pub patient: String,

    /// Diagnosis under treatment
    pub diagnosis: String,

    /// Physician evaluating the case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluating_doctor: Option<String>,

    /// Kind of intervention (e.g., generic substitution)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: CaseStatus,

    /// Currency of all monetary inputs
    #[serde(default)]
    pub currency_type: CurrencyType,

    /// USD→ARS rate, used when `currency_type` is USD
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,

    /// Baseline monthly cost (fixed at creation)
    pub initial_monthly_cost: f64,

    /// Monthly cost after intervention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_monthly_cost: Option<f64>,

    /// Months over which costs are projected
    pub projected_period_months: u32,

    /// One-time intervention cost
    #[serde(default)]
    pub intervention_cost: f64,

    /// Justification recorded with the latest status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Case history
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineEvent>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who opened the case)
    pub author: String,

    /// Revision, bumped on every save
    #[serde(default)]
    pub revision: u32,
}

/// Fields gathered when opening a case
#[derive(Debug, Clone, Default)]
pub struct NewCase {
    pub title: String,
    pub patient: String,
    pub diagnosis: String,
    pub evaluating_doctor: Option<String>,
    pub intervention_type: Option<String>,
    pub currency_type: CurrencyType,
    pub exchange_rate: f64,
    pub initial_monthly_cost: f64,
    pub projected_period_months: u32,
    pub intervention_cost: f64,
    pub tags: Vec<String>,
}

impl CostSavingsCase {
    /// Open a case in `EnEvaluacion` with a `created` timeline event
    pub fn new(fields: NewCase, author: impl Into<String>) -> Self {
        let author = author.into();
        let created = Utc::now();
        Self {
            id: CaseId::new(),
            title: fields.title,
            patient: fields.patient,
            diagnosis: fields.diagnosis,
            evaluating_doctor: fields.evaluating_doctor,
            intervention_type: fields.intervention_type,
            status: CaseStatus::EnEvaluacion,
            currency_type: fields.currency_type,
            exchange_rate: fields.exchange_rate,
            initial_monthly_cost: fields.initial_monthly_cost,
            current_monthly_cost: None,
            projected_period_months: fields.projected_period_months,
            intervention_cost: fields.intervention_cost,
            justification: None,
            tags: fields.tags,
            timeline: vec![TimelineEvent::created(author.clone(), created)],
            created,
            author,
            revision: 0,
        }
    }

    /// Calculator inputs; the baseline total is monthly cost times the period
    pub fn cost_inputs(&self) -> CostInputs {
        CostInputs::from_monthly(
            self.initial_monthly_cost,
            self.projected_period_months,
            self.current_monthly_cost,
            self.intervention_cost,
        )
    }

    /// Derived savings figures for the current raw inputs
    pub fn savings(&self) -> SavingsBreakdown {
        calculate(&self.cost_inputs())
    }

    /// Cost figures used to validate a status change
    pub fn snapshot(&self) -> CaseSnapshot {
        CaseSnapshot {
            current_monthly_cost: self.current_monthly_cost,
            initial_monthly_cost: self.initial_monthly_cost,
        }
    }
}

impl Entity for CostSavingsCase {
    const KIND: &'static str = "case";

    fn id_string(&self) -> String {
        self.id.to_string()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn revision(&self) -> u32 {
        self.revision
    }

    fn set_revision(&mut self, revision: u32) {
        self.revision = revision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::EventKind;

    fn sample_case() -> CostSavingsCase {
        CostSavingsCase::new(
            NewCase {
                title: "Sustitución por genérico".to_string(),
                patient: "HC-1042".to_string(),
                diagnosis: "Artritis reumatoidea".to_string(),
                initial_monthly_cost: 1000.0,
                projected_period_months: 6,
                intervention_cost: 200.0,
                exchange_rate: 1.0,
                ..Default::default()
            },
            "auditor",
        )
    }

    #[test]
    fn test_new_case_starts_in_evaluation() {
        let case = sample_case();
        assert_eq!(case.status, CaseStatus::EnEvaluacion);
        assert_eq!(case.current_monthly_cost, None);
        assert_eq!(case.timeline.len(), 1);
        assert_eq!(case.timeline[0].kind, EventKind::Created);
        assert_eq!(case.file_name(), format!("{}.case.yaml", case.id));
    }

    #[test]
    fn test_savings_follow_raw_inputs() {
        let mut case = sample_case();
        assert!(!case.savings().has_results);

        case.current_monthly_cost = Some(700.0);
        let savings = case.savings();
        assert_eq!(savings.initial_cost, 6000.0);
        assert_eq!(savings.projected_savings, 1600.0);

        case.intervention_cost = 0.0;
        assert_eq!(case.savings().projected_savings, 1800.0);
    }

    #[test]
    fn test_yaml_roundtrip_keeps_raw_fields_only() {
        let mut case = sample_case();
        case.current_monthly_cost = Some(700.0);
        let yaml = serde_yml::to_string(&case).unwrap();
        assert!(yaml.contains("status: en_evaluacion"));
        assert!(yaml.contains("currency_type: ARS"));
        assert!(!yaml.contains("projected_savings"));

        let parsed: CostSavingsCase = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, case.id);
        assert_eq!(parsed.current_monthly_cost, Some(700.0));
        assert_eq!(parsed.timeline.len(), 1);
    }
}
