//! Case timeline (audit trail) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::core::status::CaseStatus;

/// Kind of timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    StatusChange,
    Intervention,
    Note,
    Completed,
}

impl EventKind {
    /// Title shown in the case history
    pub fn title(&self) -> &'static str {
        match self {
            EventKind::Created => "Caso Creado",
            EventKind::StatusChange => "Cambio de Estado",
            EventKind::Intervention => "Intervención Registrada",
            EventKind::Note => "Nota Agregada",
            EventKind::Completed => "Caso Completado",
        }
    }
}

/// One entry in a case's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Ulid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    /// Who performed the action
    pub actor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<CaseStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<CaseStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TimelineEvent {
    fn new(kind: EventKind, actor: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new(),
            kind,
            timestamp,
            actor: actor.into(),
            from: None,
            to: None,
            justification: None,
            description: None,
        }
    }

    pub fn created(actor: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            to: Some(CaseStatus::EnEvaluacion),
            ..Self::new(EventKind::Created, actor, timestamp)
        }
    }

    pub fn status_change(
        from: CaseStatus,
        to: CaseStatus,
        actor: impl Into<String>,
        timestamp: DateTime<Utc>,
        justification: Option<String>,
    ) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            justification,
            ..Self::new(EventKind::StatusChange, actor, timestamp)
        }
    }

    /// Closing event: the case reached `Completado`
    pub fn completed(
        from: CaseStatus,
        actor: impl Into<String>,
        timestamp: DateTime<Utc>,
        justification: Option<String>,
    ) -> Self {
        Self {
            from: Some(from),
            to: Some(CaseStatus::Completado),
            justification,
            ..Self::new(EventKind::Completed, actor, timestamp)
        }
    }

    pub fn intervention(
        from: CaseStatus,
        to: CaseStatus,
        actor: impl Into<String>,
        timestamp: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            description: Some(description.into()),
            ..Self::new(EventKind::Intervention, actor, timestamp)
        }
    }

    pub fn note(
        actor: impl Into<String>,
        timestamp: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(text.into()),
            ..Self::new(EventKind::Note, actor, timestamp)
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Events ordered newest first, as the history is displayed
pub fn newest_first(events: &[TimelineEvent]) -> Vec<&TimelineEvent> {
    let mut sorted: Vec<_> = events.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}
