//! The Process record: a durable, stateful record of one sync run for one
//! object type. Created once by the orchestrator, then mutated only by
//! queue-worker handlers until it reaches a terminal state.

use serde::{Deserialize, Serialize};

use super::common::{EntityId, Timestamp};
use crate::errors::SyncError;

/// Process type discriminator. Only one kind exists today but the field is
/// kept so future process kinds don't require a schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessType {
    CrmSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncType {
    Initial,
    Delta,
}

/// The state machine driven by the pagination engine. Terminal states
/// (`Completed`, `Failed`) are sinks: no further transition is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    Initializing,
    FetchingTotal,
    FetchingPage,
    QueuingPages,
    ProcessingBatches,
    Completing,
    Completed,
    Failed,
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Completed | ProcessState::Failed)
    }

    /// Validates a transition against the state machine in component design
    /// §4.3. `Failed` is reachable from any non-terminal state; all other
    /// edges are the explicit ones the pagination strategies drive.
    pub fn can_transition_to(&self, next: ProcessState) -> bool {
        use ProcessState::*;
        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        matches!(
            (self, next),
            (Initializing, FetchingTotal)
                | (Initializing, FetchingPage)
                | (FetchingTotal, QueuingPages)
                | (FetchingTotal, ProcessingBatches)
                | (QueuingPages, ProcessingBatches)
                | (FetchingPage, ProcessingBatches)
                | (ProcessingBatches, Completing)
                | (Completing, Completed)
                // redelivery of the same step is idempotent, not a transition
                | (FetchingTotal, FetchingTotal)
                | (FetchingPage, FetchingPage)
                | (ProcessingBatches, ProcessingBatches)
        )
    }
}

/// Pagination bookkeeping shared by both strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationState {
    pub page_size: u32,
    pub current_cursor: Option<String>,
    pub next_page: Option<u32>,
    pub has_more: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_size: 100,
            current_cursor: None,
            next_page: None,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessContext {
    pub sync_type: SyncType,
    pub person_object_type: String,
    pub total_records: u64,
    pub processed_records: u64,
    pub current_page: u32,
    pub pagination: PaginationState,
    pub start_time: Timestamp,
}

/// A single recorded failure, capped at 100 entries per process (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub error: String,
    pub external_id: Option<String>,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateData {
    pub total_synced: u64,
    pub total_failed: u64,
    pub duration_ms: Option<u64>,
    pub records_per_second: Option<f64>,
    pub errors: Vec<ErrorDetail>,
}

impl Default for AggregateData {
    fn default() -> Self {
        Self {
            total_synced: 0,
            total_failed: 0,
            duration_ms: None,
            records_per_second: None,
            errors: Vec::new(),
        }
    }
}

pub const MAX_RETAINED_ERRORS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub id: EntityId,
    pub integration_id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub process_type: ProcessType,
    pub state: ProcessState,
    pub context: ProcessContext,
    pub aggregate_data: AggregateData,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields supplied by the orchestrator when it creates a new Process.
pub struct NewProcess {
    pub integration_id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub sync_type: SyncType,
    pub person_object_type: String,
    pub page_size: u32,
}

impl Process {
    pub fn new(data: NewProcess) -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::new(),
            integration_id: data.integration_id,
            user_id: data.user_id,
            name: data.name,
            process_type: ProcessType::CrmSync,
            state: ProcessState::Initializing,
            context: ProcessContext {
                sync_type: data.sync_type,
                person_object_type: data.person_object_type,
                total_records: 0,
                processed_records: 0,
                current_page: 0,
                pagination: PaginationState {
                    page_size: data.page_size,
                    ..Default::default()
                },
                start_time: now,
            },
            aggregate_data: AggregateData::default(),
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    /// Enforces the invariant that `totalSynced + totalFailed <= totalRecords`
    /// whenever a total is known (page-based syncs). Cursor-based syncs only
    /// learn the total retroactively, so a zero total is never checked.
    pub fn within_total_budget(&self) -> bool {
        if self.context.total_records == 0 {
            return true;
        }
        self.aggregate_data.total_synced + self.aggregate_data.total_failed
            <= self.context.total_records
    }

    pub fn push_error(&mut self, error: String, external_id: Option<String>) {
        self.aggregate_data.errors.push(ErrorDetail {
            error,
            external_id,
            timestamp: Timestamp::now(),
        });
        if self.aggregate_data.errors.len() > MAX_RETAINED_ERRORS {
            let drop = self.aggregate_data.errors.len() - MAX_RETAINED_ERRORS;
            self.aggregate_data.errors.drain(0..drop);
        }
    }

    pub fn try_transition(&mut self, next: ProcessState) -> Result<(), SyncError> {
        if self.state == next {
            // redelivery of the same step: no-op, not an error
            return Ok(());
        }
        if !self.state.can_transition_to(next) {
            return Err(SyncError::illegal_transition(
                format!("{:?}", self.state),
                format!("{:?}", next),
            ));
        }
        self.state = next;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_process() -> Process {
        Process::new(NewProcess {
            integration_id: EntityId::new(),
            user_id: EntityId::new(),
            name: "contacts sync".into(),
            sync_type: SyncType::Initial,
            person_object_type: "Contact".into(),
            page_size: 100,
        })
    }

    #[test]
    fn starts_initializing() {
        let p = fresh_process();
        assert_eq!(p.state, ProcessState::Initializing);
        assert!(p.within_total_budget());
    }

    #[test]
    fn page_based_skeleton_transitions() {
        let mut p = fresh_process();
        p.try_transition(ProcessState::FetchingTotal).unwrap();
        p.try_transition(ProcessState::QueuingPages).unwrap();
        p.try_transition(ProcessState::ProcessingBatches).unwrap();
        p.try_transition(ProcessState::Completing).unwrap();
        p.try_transition(ProcessState::Completed).unwrap();
        assert!(p.state.is_terminal());
    }

    #[test]
    fn cursor_based_skeleton_transitions() {
        let mut p = fresh_process();
        p.try_transition(ProcessState::FetchingPage).unwrap();
        p.try_transition(ProcessState::ProcessingBatches).unwrap();
        assert_eq!(p.state, ProcessState::ProcessingBatches);
    }

    #[test]
    fn rejects_illegal_transition() {
        let mut p = fresh_process();
        let err = p.try_transition(ProcessState::Completed).unwrap_err();
        assert!(matches!(err, SyncError::IllegalTransition { .. }));
    }

    #[test]
    fn terminal_states_are_sinks() {
        let mut p = fresh_process();
        p.try_transition(ProcessState::FetchingTotal).unwrap();
        p.try_transition(ProcessState::Failed).unwrap();
        assert!(p.try_transition(ProcessState::ProcessingBatches).is_err());
    }

    #[test]
    fn any_non_terminal_state_can_fail() {
        let mut p = fresh_process();
        p.try_transition(ProcessState::FetchingTotal).unwrap();
        p.try_transition(ProcessState::QueuingPages).unwrap();
        p.try_transition(ProcessState::Failed).unwrap();
        assert!(p.state.is_terminal());
    }

    #[test]
    fn redelivery_of_same_state_is_a_no_op() {
        let mut p = fresh_process();
        p.try_transition(ProcessState::FetchingTotal).unwrap();
        p.try_transition(ProcessState::FetchingTotal).unwrap();
        assert_eq!(p.state, ProcessState::FetchingTotal);
    }

    #[test]
    fn error_list_is_capped_at_100() {
        let mut p = fresh_process();
        for i in 0..150 {
            p.push_error(format!("err {i}"), None);
        }
        assert_eq!(p.aggregate_data.errors.len(), MAX_RETAINED_ERRORS);
        assert_eq!(p.aggregate_data.errors[0].error, "err 50");
    }
}
