// End-to-end edit flow: store -> session -> diff -> per-field dispatch

use chrono::NaiveDate;
use contract_collection::{
    diff, ContractApi, ContractError, ContractField, DispatchError, EditSession, EntityStore, FieldValue,
    LocalApi, NewContract, SessionState, SqliteStore,
};
use futures::executor::block_on;

fn gym(expenses: f64, cycle: u32) -> NewContract {
    NewContract {
        name: "Gym".to_string(),
        category: "leisure".to_string(),
        expenses,
        cycle,
        contract_nr: "789xyz".to_string(),
        customer_nr: "123abc".to_string(),
        contract_period: 12,
        period_of_notice: 2,
        description: "test description".to_string(),
        document_path: "/path/to/stuff".to_string(),
        start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
    }
}

#[test]
fn commit_sends_only_the_changed_field() {
    let api = LocalApi::new(SqliteStore::open_in_memory().unwrap());
    let loaded = block_on(api.create(gym(30.0, 1))).unwrap();

    let mut session = EditSession::new(loaded.clone());
    session.enter_edit().unwrap();
    session.set_field("expenses", 45).unwrap();

    let pending = session.pending_changes();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].field, ContractField::Expenses);
    assert_eq!(pending[0].value, FieldValue::Decimal(45.0));

    let report = block_on(session.commit(&api)).unwrap();
    assert!(report.is_success());
    assert_eq!(report.applied, pending);
    assert_eq!(session.state(), SessionState::Viewing);

    let stored = block_on(api.get(loaded.id)).unwrap();
    assert_eq!(stored.expenses, 45.0);
    assert_eq!(stored.name, loaded.name);
    assert_eq!(stored.cycle, loaded.cycle);
}

#[test]
fn partial_failure_leaves_other_fields_applied() {
    let api = LocalApi::new(SqliteStore::open_in_memory().unwrap());
    let loaded = block_on(api.create(gym(30.0, 1))).unwrap();

    let mut session = EditSession::new(loaded.clone());
    session.enter_edit().unwrap();
    session.set_field("name", "").unwrap(); // the store refuses empty names
    session.set_field("category", "sports").unwrap();

    let report = block_on(session.commit(&api)).unwrap();
    assert_eq!(report.failed_fields(), vec![ContractField::Name]);
    assert!(matches!(report.failed[0].error, DispatchError::Rejected(_)));

    // No rollback: the accepted field stays persisted
    let stored = block_on(api.get(loaded.id)).unwrap();
    assert_eq!(stored.name, "Gym");
    assert_eq!(stored.category, "sports");
}

#[test]
fn commit_against_deleted_contract_reports_not_found() {
    let api = LocalApi::new(SqliteStore::open_in_memory().unwrap());
    let loaded = block_on(api.create(gym(30.0, 1))).unwrap();

    let mut session = EditSession::new(loaded.clone());
    session.enter_edit().unwrap();
    session.set_field("description", "gone").unwrap();

    block_on(api.delete(loaded.id)).unwrap();

    let report = block_on(session.commit(&api)).unwrap();
    assert_eq!(report.failed[0].error, DispatchError::NotFound(loaded.id));
}

#[test]
fn discard_sends_nothing() {
    let api = LocalApi::new(SqliteStore::open_in_memory().unwrap());
    let loaded = block_on(api.create(gym(30.0, 1))).unwrap();

    let mut session = EditSession::new(loaded.clone());
    session.enter_edit().unwrap();
    session.set_field("expenses", 99).unwrap();
    session.discard().unwrap();

    assert_eq!(session.working_copy(), &loaded);
    assert_eq!(block_on(api.get(loaded.id)).unwrap(), loaded);
}

#[test]
fn edit_flag_alone_is_no_change() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let loaded = store.insert(gym(30.0, 1)).unwrap();

    assert!(diff(&loaded.snapshot(false), &loaded.snapshot(true)).is_empty());
}

#[test]
fn zero_cycle_has_no_yearly_expenses() {
    let contract = gym(120.0, 1).with_id(1);
    assert_eq!(contract.yearly_expenses(), Ok(360.0 * 4.0));

    let mut broken = contract.clone();
    broken.cycle = 0;
    assert_eq!(broken.yearly_expenses(), Err(ContractError::ZeroCycle));
}
