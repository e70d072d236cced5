// 🔌 Contract API Client boundary
//
// The edit session only ever talks to a ContractApi. LocalApi runs the calls
// against an in-process Entity Store; the HTTP client lives in `client`.

use crate::contract::{Contract, ContractField, ContractId, FieldValue, NewContract};
use crate::db::EntityStore;
use crate::error::DispatchError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Network-facing verbs over contracts
#[async_trait]
pub trait ContractApi: Send + Sync {
    async fn list(&self) -> DispatchResult<Vec<Contract>>;

    async fn get(&self, id: ContractId) -> DispatchResult<Contract>;

    async fn create(&self, contract: NewContract) -> DispatchResult<Contract>;

    async fn delete(&self, id: ContractId) -> DispatchResult<()>;

    /// Update a single field, returning the contract as the remote side now has it
    async fn update_field(
        &self,
        id: ContractId,
        field: ContractField,
        value: FieldValue,
    ) -> DispatchResult<Contract>;
}

/// In-process API over a shared store
pub struct LocalApi<S> {
    store: Arc<Mutex<S>>,
}

impl<S> Clone for LocalApi<S> {
    fn clone(&self) -> Self {
        LocalApi {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EntityStore> LocalApi<S> {
    pub fn new(store: S) -> Self {
        LocalApi {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn from_shared(store: Arc<Mutex<S>>) -> Self {
        LocalApi { store }
    }

    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut S) -> Result<T, crate::error::StoreError>) -> DispatchResult<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| DispatchError::Transport("store lock poisoned".to_string()))?;
        f(&mut store).map_err(DispatchError::from)
    }
}

#[async_trait]
impl<S: EntityStore + Send> ContractApi for LocalApi<S> {
    async fn list(&self) -> DispatchResult<Vec<Contract>> {
        self.with_store(|store| store.get_all())
    }

    async fn get(&self, id: ContractId) -> DispatchResult<Contract> {
        self.with_store(|store| store.get_by_id(id))
    }

    async fn create(&self, contract: NewContract) -> DispatchResult<Contract> {
        self.with_store(|store| store.insert(contract))
    }

    async fn delete(&self, id: ContractId) -> DispatchResult<()> {
        self.with_store(|store| store.delete_by_id(id))
    }

    async fn update_field(
        &self,
        id: ContractId,
        field: ContractField,
        value: FieldValue,
    ) -> DispatchResult<Contract> {
        self.with_store(|store| store.apply_field_update(id, field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::tests::sample_contract;
    use crate::db::SqliteStore;
    use futures::executor::block_on;

    #[test]
    fn test_local_api_round_trip() {
        let api = LocalApi::new(SqliteStore::open_in_memory().unwrap());

        let created = block_on(api.create(sample_contract(0, "Gym", 30.0, 1).to_new())).unwrap();
        let updated = block_on(api.update_field(created.id, ContractField::Expenses, FieldValue::from(45))).unwrap();
        assert_eq!(updated.expenses, 45.0);

        assert_eq!(block_on(api.list()).unwrap().len(), 1);
        block_on(api.delete(created.id)).unwrap();
        assert_eq!(block_on(api.get(created.id)), Err(DispatchError::NotFound(created.id)));
    }

    #[test]
    fn test_local_api_maps_validation_to_rejected() {
        let api = LocalApi::new(SqliteStore::open_in_memory().unwrap());
        let created = block_on(api.create(sample_contract(0, "Gym", 30.0, 1).to_new())).unwrap();

        let result = block_on(api.update_field(created.id, ContractField::Cycle, FieldValue::from(0)));
        assert!(matches!(result, Err(DispatchError::Rejected(_))));
    }
}
