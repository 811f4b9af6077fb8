//! Case lifecycle status

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle position of a cost-savings case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Case is being evaluated (initial state)
    #[default]
    EnEvaluacion,
    /// An intervention has been applied
    Intervenido,
    /// Results recorded and case closed (terminal)
    Completado,
    /// Evaluated with no optimization possible
    SinOptimizacion,
}

/// Every status, in lifecycle order
pub const ALL_STATUSES: [CaseStatus; 4] = [
    CaseStatus::EnEvaluacion,
    CaseStatus::Intervenido,
    CaseStatus::Completado,
    CaseStatus::SinOptimizacion,
];

/// Visual tone hint for status badges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Blue,
    Yellow,
    Green,
    Gray,
}

impl CaseStatus {
    /// Machine name, as stored in case files
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::EnEvaluacion => "en_evaluacion",
            CaseStatus::Intervenido => "intervenido",
            CaseStatus::Completado => "completado",
            CaseStatus::SinOptimizacion => "sin_optimizacion",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::EnEvaluacion => "En Evaluación",
            CaseStatus::Intervenido => "Intervenido",
            CaseStatus::Completado => "Completado",
            CaseStatus::SinOptimizacion => "Sin Optimización",
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            CaseStatus::EnEvaluacion => StatusTone::Blue,
            CaseStatus::Intervenido => StatusTone::Yellow,
            CaseStatus::Completado => StatusTone::Green,
            CaseStatus::SinOptimizacion => StatusTone::Gray,
        }
    }

    /// Whether the status has no outbound transitions
    pub fn is_terminal(&self) -> bool {
        *self == CaseStatus::Completado
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status string outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid case status: {0}. Use en_evaluacion, intervenido, completado, or sin_optimizacion"
)]
pub struct StatusParseError(pub String);

impl std::str::FromStr for CaseStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "en_evaluacion" => Ok(CaseStatus::EnEvaluacion),
            "intervenido" => Ok(CaseStatus::Intervenido),
            "completado" => Ok(CaseStatus::Completado),
            "sin_optimizacion" => Ok(CaseStatus::SinOptimizacion),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_str() {
        for status in ALL_STATUSES {
            assert_eq!(status.as_str().parse::<CaseStatus>().unwrap(), status);
        }
        assert_eq!(
            "Sin-Optimizacion".parse::<CaseStatus>().unwrap(),
            CaseStatus::SinOptimizacion
        );
    }

    #[test]
    fn test_unknown_status_is_error() {
        let err = "cerrado".parse::<CaseStatus>().unwrap_err();
        assert!(err.to_string().contains("cerrado"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(CaseStatus::EnEvaluacion.label(), "En Evaluación");
        assert_eq!(CaseStatus::SinOptimizacion.label(), "Sin Optimización");
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yml::to_string(&CaseStatus::SinOptimizacion).unwrap();
        assert_eq!(yaml.trim(), "sin_optimizacion");
        let parsed: CaseStatus = serde_yml::from_str("en_evaluacion").unwrap();
        assert_eq!(parsed, CaseStatus::EnEvaluacion);
    }

    #[test]
    fn test_only_completado_is_terminal() {
        for status in ALL_STATUSES {
            assert_eq!(status.is_terminal(), status == CaseStatus::Completado);
        }
    }
}
