//! Status change orchestration
//!
//! Turns a transition request into a commit the store can persist: the
//! validation verdict from [`TransitionEngine`], the caller's confirmation of
//! any warning, and the justification text when one is needed.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::status::CaseStatus;
use crate::core::timeline::TimelineEvent;
use crate::core::transitions::{auto_status_from_cost, TransitionCheck, TransitionEngine};
use crate::entities::CostSavingsCase;

/// A requested status change with the caller's answers
#[derive(Debug, Clone)]
pub struct StatusChangeRequest {
    pub target: CaseStatus,
    /// Who asks for the change
    pub actor: String,
    /// Whether the caller confirmed the advisory warning, if any
    pub confirmed: bool,
    pub justification: Option<String>,
}

/// Errors that stop a status change from being committed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    #[error("{0}")]
    Rejected(String),

    #[error("Confirmation required: {warning}")]
    ConfirmationRequired { warning: String },

    #[error("A justification is required to move to \"{}\"", .target.label())]
    JustificationRequired { target: CaseStatus },

    #[error("Case is {} and can no longer change", .status.label())]
    Terminal { status: CaseStatus },

    #[error("Current monthly cost must be a non-negative number, got {0}")]
    InvalidCost(f64),
}

/// A validated status change, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCommit {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub justification: Option<String>,
    pub warning: Option<String>,
    pub event: TimelineEvent,
}

/// Whether a request for `target` needs justification text given its check
pub fn needs_justification(
    engine: &TransitionEngine<'_>,
    target: CaseStatus,
    check: &TransitionCheck,
) -> bool {
    engine.requires_justification(target) || check.warning.is_some()
}

/// Build the commit for a status change, or explain why it cannot happen.
///
/// A warning from validation must be confirmed, and a justification is
/// needed both for targets that always require one and for any warned
/// transition.
pub fn plan_status_change(
    engine: &TransitionEngine<'_>,
    case: &CostSavingsCase,
    request: &StatusChangeRequest,
    now: DateTime<Utc>,
) -> Result<StatusCommit, CommitError> {
    let check = engine.validate_transition(case.status, request.target, &case.snapshot());
    if !check.valid {
        let reason = check.error.unwrap_or_default();
        tracing::info!(case = %case.id, to = %request.target, %reason, "status change rejected");
        return Err(CommitError::Rejected(reason));
    }

    if let Some(warning) = &check.warning {
        if !request.confirmed {
            return Err(CommitError::ConfirmationRequired {
                warning: warning.clone(),
            });
        }
    }

    let justification = request
        .justification
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if needs_justification(engine, request.target, &check) && justification.is_none() {
        return Err(CommitError::JustificationRequired {
            target: request.target,
        });
    }

    let event = match request.target {
        CaseStatus::Completado => TimelineEvent::completed(
            case.status,
            request.actor.clone(),
            now,
            justification.clone(),
        ),
        target => TimelineEvent::status_change(
            case.status,
            target,
            request.actor.clone(),
            now,
            justification.clone(),
        ),
    };

    Ok(StatusCommit {
        from: case.status,
        to: request.target,
        justification,
        warning: check.warning,
        event,
    })
}

/// Apply a planned commit to the in-memory case
pub fn apply_commit(case: &mut CostSavingsCase, commit: StatusCommit) {
    tracing::info!(case = %case.id, from = %commit.from, to = %commit.to, "status changed");
    case.status = commit.to;
    case.justification = commit.justification;
    case.timeline.push(commit.event);
}

/// Outcome of recording post-intervention results
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsUpdate {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub current_monthly_cost: f64,
}

/// Record the post-intervention monthly cost.
///
/// The new status comes from [`auto_status_from_cost`] and is applied
/// without going through transition validation; closed cases are refused.
pub fn record_results(
    case: &mut CostSavingsCase,
    current_monthly_cost: f64,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<ResultsUpdate, CommitError> {
    if case.status.is_terminal() {
        return Err(CommitError::Terminal {
            status: case.status,
        });
    }
    if !current_monthly_cost.is_finite() || current_monthly_cost < 0.0 {
        return Err(CommitError::InvalidCost(current_monthly_cost));
    }

    let from = case.status;
    let to = auto_status_from_cost(current_monthly_cost, case.initial_monthly_cost);

    case.current_monthly_cost = Some(current_monthly_cost);
    case.status = to;
    case.timeline.push(TimelineEvent::intervention(
        from,
        to,
        actor,
        now,
        format!("Costo mensual actual registrado: {:.2}", current_monthly_cost),
    ));
    if to == CaseStatus::Completado {
        case.timeline.push(TimelineEvent::completed(from, actor, now, None));
    }

    tracing::info!(case = %case.id, %from, %to, current_monthly_cost, "results recorded");
    Ok(ResultsUpdate {
        from,
        to,
        current_monthly_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::EventKind;
    use crate::entities::NewCase;

    fn case_with(status: CaseStatus, current: Option<f64>) -> CostSavingsCase {
        let mut case = CostSavingsCase::new(
            NewCase {
                title: "Biosimilar".to_string(),
                patient: "HC-77".to_string(),
                diagnosis: "Psoriasis".to_string(),
                initial_monthly_cost: 1000.0,
                projected_period_months: 12,
                exchange_rate: 1.0,
                ..Default::default()
            },
            "auditor",
        );
        case.status = status;
        case.current_monthly_cost = current;
        case
    }

    fn request(
        target: CaseStatus,
        confirmed: bool,
        justification: Option<&str>,
    ) -> StatusChangeRequest {
        StatusChangeRequest {
            target,
            actor: "dr.gomez".to_string(),
            confirmed,
            justification: justification.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_transition_commits() {
        let engine = TransitionEngine::default();
        let mut case = case_with(CaseStatus::EnEvaluacion, None);
        let commit = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::Intervenido, false, None),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(commit.event.kind, EventKind::StatusChange);
        assert_eq!(commit.event.actor, "dr.gomez");

        apply_commit(&mut case, commit);
        assert_eq!(case.status, CaseStatus::Intervenido);
        assert_eq!(case.timeline.len(), 2);
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let engine = TransitionEngine::default();
        let case = case_with(CaseStatus::EnEvaluacion, Some(500.0));
        let err = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::Completado, true, Some("x")),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CommitError::Rejected(_)));
    }

    #[test]
    fn test_no_optimization_needs_justification() {
        let engine = TransitionEngine::default();
        let case = case_with(CaseStatus::EnEvaluacion, None);
        let err = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::SinOptimizacion, false, Some("   ")),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CommitError::JustificationRequired {
                target: CaseStatus::SinOptimizacion
            }
        );

        let commit = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::SinOptimizacion, false, Some(" sin alternativa ")),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(commit.justification.as_deref(), Some("sin alternativa"));
    }

    #[test]
    fn test_warning_needs_confirmation_then_justification() {
        let engine = TransitionEngine::default();
        let case = case_with(CaseStatus::Intervenido, Some(1200.0));

        let err = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::Completado, false, None),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CommitError::ConfirmationRequired { .. }));

        let err = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::Completado, true, None),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CommitError::JustificationRequired { .. }));

        let commit = plan_status_change(
            &engine,
            &case,
            &request(CaseStatus::Completado, true, Some("cambio de presentación")),
            Utc::now(),
        )
        .unwrap();
        assert!(commit.warning.is_some());
        assert_eq!(commit.to, CaseStatus::Completado);
        assert_eq!(commit.event.kind, EventKind::Completed);
        assert_eq!(
            commit.event.justification.as_deref(),
            Some("cambio de presentación")
        );
    }

    #[test]
    fn test_record_results_uses_auto_status() {
        let mut case = case_with(CaseStatus::EnEvaluacion, None);
        let update = record_results(&mut case, 600.0, "auditor", Utc::now()).unwrap();
        assert_eq!(update.from, CaseStatus::EnEvaluacion);
        assert_eq!(update.to, CaseStatus::Completado);
        assert_eq!(case.status, CaseStatus::Completado);
        assert_eq!(case.current_monthly_cost, Some(600.0));
        let kinds: Vec<EventKind> = case.timeline.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Created, EventKind::Intervention, EventKind::Completed]
        );
    }

    #[test]
    fn test_record_results_without_savings_stays_intervened() {
        let mut case = case_with(CaseStatus::EnEvaluacion, None);
        let update = record_results(&mut case, 1000.0, "auditor", Utc::now()).unwrap();
        assert_eq!(update.to, CaseStatus::Intervenido);

        let update = record_results(&mut case, 0.0, "auditor", Utc::now()).unwrap();
        assert_eq!(update.to, CaseStatus::EnEvaluacion);
    }

    #[test]
    fn test_record_results_refuses_closed_case_and_bad_cost() {
        let mut closed = case_with(CaseStatus::Completado, Some(500.0));
        assert!(matches!(
            record_results(&mut closed, 400.0, "auditor", Utc::now()),
            Err(CommitError::Terminal { .. })
        ));

        let mut open = case_with(CaseStatus::Intervenido, None);
        assert_eq!(
            record_results(&mut open, -1.0, "auditor", Utc::now()),
            Err(CommitError::InvalidCost(-1.0))
        );
    }
}
