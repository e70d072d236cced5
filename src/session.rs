// ✏️ Edit Session Controller - snapshot, mutate, commit or discard
//
// Viewing --enter_edit--> Editing --commit/discard--> Viewing
//
// A commit sends one update per changed field. The updates are independent:
// one failing never stops the others, and nothing is rolled back.

use crate::api::ContractApi;
use crate::contract::{Contract, ContractField, ContractId};
use crate::diff::{diff, FieldChange};
use crate::error::{ContractError, DispatchFailure, SessionError};
use futures::future::join_all;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Viewing => "viewing",
            SessionState::Editing => "editing",
        }
    }
}

/// Outcome of a commit, per field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    /// Changes the API client accepted
    pub applied: Vec<FieldChange>,
    /// Changes that did not go through, with the reason
    pub failed: Vec<DispatchFailure>,
}

impl CommitReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty()
    }

    pub fn failed_fields(&self) -> Vec<ContractField> {
        self.failed.iter().map(|f| f.field).collect()
    }
}

/// Edit lifecycle of one loaded contract.
///
/// Owns the working copy exclusively. Field identity is always passed in
/// explicitly; the controller knows nothing about any UI.
#[derive(Debug, Clone)]
pub struct EditSession {
    working: Contract,
    last_snapshot: Option<Contract>,
    state: SessionState,
}

impl EditSession {
    /// Fresh session for a freshly loaded contract
    pub fn new(contract: Contract) -> Self {
        EditSession {
            working: contract,
            last_snapshot: None,
            state: SessionState::Viewing,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    pub fn id(&self) -> ContractId {
        self.working.id
    }

    pub fn working_copy(&self) -> &Contract {
        &self.working
    }

    /// Changes a commit would send right now (empty while viewing)
    pub fn pending_changes(&self) -> Vec<FieldChange> {
        match &self.last_snapshot {
            Some(snapshot) => diff(&snapshot.snapshot(false), &self.working.snapshot(self.is_editing())),
            None => Vec::new(),
        }
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::InvalidState {
                operation,
                state: self.state.as_str(),
            });
        }
        Ok(())
    }

    /// Snapshot the working copy and start editing.
    ///
    /// Calling this while already editing is an error; the first snapshot is kept.
    pub fn enter_edit(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Viewing, "enter_edit")?;
        self.last_snapshot = Some(self.working.clone());
        self.state = SessionState::Editing;
        debug!(id = self.working.id, "edit started");
        Ok(())
    }

    /// Change one editable field of the working copy
    pub fn set_field(&mut self, field_name: &str, value: impl Into<crate::contract::FieldValue>) -> Result<(), SessionError> {
        self.require(SessionState::Editing, "set_field")?;

        let field = field_name
            .parse::<ContractField>()
            .ok()
            .filter(ContractField::is_editable)
            .ok_or_else(|| SessionError::UnknownField(field_name.to_string()))?;

        self.working.set(field, value.into()).map_err(|e| match e {
            ContractError::InvalidValue { field, reason } => SessionError::InvalidValue { field, reason },
            other => SessionError::InvalidValue {
                field,
                reason: other.to_string(),
            },
        })
    }

    /// Send one update per changed field and return to viewing.
    ///
    /// The state flips to `Viewing` before any update is awaited. All
    /// updates are joined and reported together; failures are collected,
    /// never raised.
    pub async fn commit<A>(&mut self, api: &A) -> Result<CommitReport, SessionError>
    where
        A: ContractApi + ?Sized,
    {
        self.require(SessionState::Editing, "commit")?;

        let changes = self.pending_changes();
        self.last_snapshot = None;
        self.state = SessionState::Viewing;

        let id = self.working.id;
        debug!(id, changes = changes.len(), "committing edit");

        let dispatches = changes.iter().map(|change| {
            let change = change.clone();
            async move {
                let result = api.update_field(id, change.field, change.value.clone()).await;
                (change, result)
            }
        });

        let mut report = CommitReport::default();
        for (change, result) in join_all(dispatches).await {
            match result {
                Ok(_) => report.applied.push(change),
                Err(error) => {
                    warn!(id, field = %change.field, %error, "field update failed");
                    report.failed.push(DispatchFailure {
                        field: change.field,
                        value: change.value,
                        error,
                    });
                }
            }
        }

        info!(
            id,
            applied = report.applied.len(),
            failed = report.failed.len(),
            "edit committed"
        );
        Ok(report)
    }

    /// Drop all edits and return to viewing; nothing is sent
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Editing, "discard")?;
        if let Some(snapshot) = self.last_snapshot.take() {
            self.working = snapshot;
        }
        self.state = SessionState::Viewing;
        debug!(id = self.working.id, "edit discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DispatchResult;
    use crate::contract::tests::sample_contract;
    use crate::contract::{FieldValue, NewContract};
    use crate::error::DispatchError;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::sync::Mutex;

    /// Records every update and fails the fields it's told to
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(ContractId, ContractField, FieldValue)>>,
        failing: Vec<ContractField>,
    }

    impl RecordingApi {
        fn failing(fields: &[ContractField]) -> Self {
            RecordingApi {
                calls: Mutex::new(Vec::new()),
                failing: fields.to_vec(),
            }
        }

        fn calls(&self) -> Vec<(ContractId, ContractField, FieldValue)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContractApi for RecordingApi {
        async fn list(&self) -> DispatchResult<Vec<Contract>> {
            Ok(Vec::new())
        }

        async fn get(&self, id: ContractId) -> DispatchResult<Contract> {
            Err(DispatchError::NotFound(id))
        }

        async fn create(&self, contract: NewContract) -> DispatchResult<Contract> {
            Ok(contract.with_id(1))
        }

        async fn delete(&self, _id: ContractId) -> DispatchResult<()> {
            Ok(())
        }

        async fn update_field(
            &self,
            id: ContractId,
            field: ContractField,
            value: FieldValue,
        ) -> DispatchResult<Contract> {
            self.calls.lock().unwrap().push((id, field, value.clone()));
            if self.failing.contains(&field) {
                return Err(DispatchError::Transport("connection reset".to_string()));
            }
            let mut contract = sample_contract(id, "remote", 0.0, 1);
            contract.set(field, value).unwrap();
            Ok(contract)
        }
    }

    fn gym() -> Contract {
        sample_contract(7, "Gym", 30.0, 1)
    }

    #[test]
    fn test_new_session_is_viewing() {
        let session = EditSession::new(gym());
        assert_eq!(session.state(), SessionState::Viewing);
        assert!(session.pending_changes().is_empty());
    }

    #[test]
    fn test_enter_edit_twice_is_rejected() {
        let mut session = EditSession::new(gym());
        session.enter_edit().unwrap();
        session.set_field("name", "Foo").unwrap();

        let err = session.enter_edit().unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidState {
                operation: "enter_edit",
                state: "editing"
            }
        );

        // The original snapshot survives, so discard still restores it
        session.discard().unwrap();
        assert_eq!(session.working_copy().name, "Gym");
    }

    #[test]
    fn test_operations_outside_editing_are_rejected() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::default();

        assert!(matches!(
            session.set_field("name", "Foo"),
            Err(SessionError::InvalidState { operation: "set_field", .. })
        ));
        assert!(matches!(
            block_on(session.commit(&api)),
            Err(SessionError::InvalidState { operation: "commit", .. })
        ));
        assert!(matches!(
            session.discard(),
            Err(SessionError::InvalidState { operation: "discard", .. })
        ));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_set_field_unknown_name() {
        let mut session = EditSession::new(gym());
        session.enter_edit().unwrap();

        assert_eq!(
            session.set_field("editActive", true.to_string()),
            Err(SessionError::UnknownField("editActive".to_string()))
        );
        assert_eq!(
            session.set_field("inputColour", "red"),
            Err(SessionError::UnknownField("inputColour".to_string()))
        );
        // Updatable through the API, but not part of the editable view
        assert_eq!(
            session.set_field("startDate", "2024-01-01"),
            Err(SessionError::UnknownField("startDate".to_string()))
        );
    }

    #[test]
    fn test_set_field_invalid_value() {
        let mut session = EditSession::new(gym());
        session.enter_edit().unwrap();

        assert!(matches!(
            session.set_field("cycle", "every month"),
            Err(SessionError::InvalidValue { field: ContractField::Cycle, .. })
        ));
        assert_eq!(session.working_copy().cycle, 1);
    }

    #[test]
    fn test_discard_restores_working_copy() {
        let original = gym();
        let mut session = EditSession::new(original.clone());

        session.enter_edit().unwrap();
        session.set_field("name", "Foo").unwrap();
        session.set_field("expenses", 99.5).unwrap();
        session.discard().unwrap();

        assert_eq!(session.working_copy(), &original);
        assert_eq!(session.state(), SessionState::Viewing);
    }

    #[test]
    fn test_commit_dispatches_exactly_the_diff() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::default();

        session.enter_edit().unwrap();
        session.set_field("name", "Foo").unwrap();
        session.set_field("cycle", 3).unwrap();
        let report = block_on(session.commit(&api)).unwrap();

        assert_eq!(
            api.calls(),
            vec![
                (7, ContractField::Name, FieldValue::Text("Foo".to_string())),
                (7, ContractField::Cycle, FieldValue::Integer(3)),
            ]
        );
        assert!(report.is_success());
        assert_eq!(report.applied.len(), 2);
        assert_eq!(session.state(), SessionState::Viewing);
    }

    #[test]
    fn test_gym_expenses_edit_dispatches_once() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::default();

        session.enter_edit().unwrap();
        session.set_field("expenses", 45).unwrap();
        block_on(session.commit(&api)).unwrap();

        assert_eq!(api.calls(), vec![(7, ContractField::Expenses, FieldValue::Decimal(45.0))]);
    }

    #[test]
    fn test_commit_without_changes_sends_nothing() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::default();

        session.enter_edit().unwrap();
        session.set_field("name", "Gym").unwrap();
        let report = block_on(session.commit(&api)).unwrap();

        assert!(report.is_empty());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_commit_isolates_dispatch_failures() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::failing(&[ContractField::Name]);

        session.enter_edit().unwrap();
        session.set_field("name", "Foo").unwrap();
        session.set_field("cycle", 3).unwrap();
        let report = block_on(session.commit(&api)).unwrap();

        assert_eq!(api.calls().len(), 2);
        assert_eq!(
            report.applied,
            vec![FieldChange {
                field: ContractField::Cycle,
                value: FieldValue::Integer(3)
            }]
        );
        assert_eq!(report.failed_fields(), vec![ContractField::Name]);
        assert_eq!(
            report.failed[0].error,
            DispatchError::Transport("connection reset".to_string())
        );
        assert_eq!(session.state(), SessionState::Viewing);
    }

    #[test]
    fn test_commit_keeps_edited_working_copy() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::failing(&[ContractField::Expenses]);

        session.enter_edit().unwrap();
        session.set_field("expenses", 45).unwrap();
        block_on(session.commit(&api)).unwrap();

        assert_eq!(session.working_copy().expenses, 45.0);
        assert!(session.pending_changes().is_empty());
    }

    #[test]
    fn test_new_edit_after_commit() {
        let mut session = EditSession::new(gym());
        let api = RecordingApi::default();

        session.enter_edit().unwrap();
        session.set_field("category", "sports").unwrap();
        block_on(session.commit(&api)).unwrap();

        // Second round diffs against the committed state, not the original
        session.enter_edit().unwrap();
        session.set_field("description", "new notes").unwrap();
        assert_eq!(
            session.pending_changes(),
            vec![FieldChange {
                field: ContractField::Description,
                value: FieldValue::Text("new notes".to_string())
            }]
        );
    }
}
