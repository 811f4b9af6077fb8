//! Status transition engine for cost-savings cases
//!
//! Validates requested status changes against the lifecycle graph and the
//! case's cost figures. Every decision here is pure: persistence and the
//! audit trail belong to the caller (see [`crate::core::commit`]).

use serde::Serialize;
use std::sync::OnceLock;

use crate::core::status::CaseStatus;

/// A directed edge of the lifecycle graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: CaseStatus,
    pub to: CaseStatus,
    /// Menu text for the action
    pub label: &'static str,
}

/// Immutable lifecycle graph
#[derive(Debug, Clone)]
pub struct TransitionTable {
    edges: Vec<Transition>,
}

impl TransitionTable {
    /// The case lifecycle graph
    pub fn standard() -> Self {
        use crate::core::status::CaseStatus::*;
        let edge = |from, to, label| Transition { from, to, label };
        Self {
            edges: vec![
                edge(EnEvaluacion, Intervenido, "Registrar Intervención"),
                edge(EnEvaluacion, SinOptimizacion, "Marcar Sin Optimización"),
                edge(Intervenido, Completado, "Completar Caso"),
                edge(Intervenido, EnEvaluacion, "Volver a Evaluación"),
                edge(SinOptimizacion, EnEvaluacion, "Reabrir Caso"),
            ],
        }
    }

    /// Shared instance of [`TransitionTable::standard`], built once
    pub fn global() -> &'static TransitionTable {
        static TABLE: OnceLock<TransitionTable> = OnceLock::new();
        TABLE.get_or_init(TransitionTable::standard)
    }

    fn edge(&self, from: CaseStatus, to: CaseStatus) -> Option<&Transition> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }
}

/// Cost figures needed to gate a transition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaseSnapshot {
    pub current_monthly_cost: Option<f64>,
    pub initial_monthly_cost: f64,
}

impl CaseSnapshot {
    /// Current cost, only when it was recorded as a positive amount
    fn recorded_current_cost(&self) -> Option<f64> {
        self.current_monthly_cost.filter(|c| *c > 0.0)
    }
}

/// Outcome of validating a transition request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TransitionCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            warning: None,
        }
    }

    pub fn warn(warning: impl Into<String>) -> Self {
        Self {
            valid: true,
            error: None,
            warning: Some(warning.into()),
        }
    }

    pub fn reject(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            warning: None,
        }
    }
}

pub const SAME_STATE_ERROR: &str = "El estado es el mismo";
pub const MISSING_CURRENT_COST_ERROR: &str =
    "Debe cargar el costo mensual actual antes de completar el caso";
pub const COST_INCREASE_WARNING: &str =
    "El costo actual es mayor o igual al inicial. Se requerirá justificación.";
pub const SAVINGS_POTENTIAL_WARNING: &str =
    "El caso tiene potencial de ahorro. ¿Está seguro de marcar como sin optimización?";

/// Transition engine over a lifecycle table
#[derive(Debug, Clone, Copy)]
pub struct TransitionEngine<'a> {
    table: &'a TransitionTable,
}

impl Default for TransitionEngine<'static> {
    fn default() -> Self {
        Self::new(TransitionTable::global())
    }
}

impl<'a> TransitionEngine<'a> {
    pub fn new(table: &'a TransitionTable) -> Self {
        Self { table }
    }

    /// Statuses reachable in one step from `current`
    pub fn available_transitions(&self, current: CaseStatus) -> Vec<CaseStatus> {
        self.table
            .edges
            .iter()
            .filter(|e| e.from == current)
            .map(|e| e.to)
            .collect()
    }

    pub fn can_transition(&self, current: CaseStatus, target: CaseStatus) -> bool {
        self.table.edge(current, target).is_some()
    }

    /// Label of the edge, if the edge exists
    pub fn transition_label(&self, current: CaseStatus, target: CaseStatus) -> Option<&'a str> {
        self.table.edge(current, target).map(|e| e.label)
    }

    /// Menu text for a target: the edge label, else the target's status label
    pub fn menu_label(&self, current: CaseStatus, target: CaseStatus) -> &'a str {
        self.transition_label(current, target)
            .unwrap_or_else(|| target.label())
    }

    /// Whether moving to `target` needs a free-text justification
    pub fn requires_justification(&self, target: CaseStatus) -> bool {
        requires_justification(target)
    }

    /// Decide whether `current → target` may proceed for this case.
    pub fn validate_transition(
        &self,
        current: CaseStatus,
        target: CaseStatus,
        snapshot: &CaseSnapshot,
    ) -> TransitionCheck {
        let check = self.decide(current, target, snapshot);
        tracing::debug!(
            from = %current,
            to = %target,
            valid = check.valid,
            warning = check.warning.is_some(),
            "validated status transition"
        );
        check
    }

    fn decide(
        &self,
        current: CaseStatus,
        target: CaseStatus,
        snapshot: &CaseSnapshot,
    ) -> TransitionCheck {
        if current == target {
            return TransitionCheck::reject(SAME_STATE_ERROR);
        }

        if !self.can_transition(current, target) {
            return TransitionCheck::reject(format!(
                "No puede cambiar de \"{}\" a \"{}\"",
                current.label(),
                target.label()
            ));
        }

        match target {
            CaseStatus::Completado => match snapshot.recorded_current_cost() {
                None => TransitionCheck::reject(MISSING_CURRENT_COST_ERROR),
                Some(cost) if cost >= snapshot.initial_monthly_cost => {
                    TransitionCheck::warn(COST_INCREASE_WARNING)
                }
                Some(_) => TransitionCheck::ok(),
            },
            CaseStatus::SinOptimizacion => match snapshot.recorded_current_cost() {
                Some(cost) if cost < snapshot.initial_monthly_cost => {
                    TransitionCheck::warn(SAVINGS_POTENTIAL_WARNING)
                }
                _ => TransitionCheck::ok(),
            },
            _ => TransitionCheck::ok(),
        }
    }
}

/// Whether moving to `target` needs a free-text justification
pub fn requires_justification(target: CaseStatus) -> bool {
    target == CaseStatus::SinOptimizacion
}

/// Status assigned when post-intervention results are recorded.
///
/// This is a separate policy from [`TransitionEngine::validate_transition`]:
/// the "record results" action applies it directly, without consulting the
/// lifecycle graph or raising warnings, so it can move e.g.
/// `EnEvaluacion → Completado` directly. Only the terminal-state guard in
/// [`crate::core::commit::record_results`] applies.
pub fn auto_status_from_cost(current_cost: f64, initial_cost: f64) -> CaseStatus {
    if current_cost <= 0.0 {
        CaseStatus::EnEvaluacion
    } else if current_cost < initial_cost {
        CaseStatus::Completado
    } else {
        CaseStatus::Intervenido
    }
}
