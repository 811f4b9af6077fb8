//! Core module - lifecycle rules, savings arithmetic and their collaborators

pub mod commit;
pub mod config;
pub mod currency;
pub mod entity;
pub mod identity;
pub mod report;
pub mod savings;
pub mod status;
pub mod store;
pub mod timeline;
pub mod transitions;


pub use commit::{
    apply_commit, plan_status_change, record_results, CommitError, ResultsUpdate,
    StatusChangeRequest, StatusCommit,
};
pub use config::{Config, ConfigError};
pub use currency::{to_ars, ArsAmount, CurrencyType};
pub use entity::Entity;
pub use identity::{CaseId, IdParseError};
pub use report::{summarize, CaseRow, PortfolioSummary};
pub use savings::{calculate, CostInputs, SavingsBreakdown, SavingsLevel, SavingsThresholds};
pub use status::{CaseStatus, StatusParseError, ALL_STATUSES};
pub use store::StoreError;
pub use timeline::{EventKind, TimelineEvent};
pub use transitions::{
    auto_status_from_cost, requires_justification, CaseSnapshot, TransitionCheck, TransitionEngine,
    TransitionTable,
};
