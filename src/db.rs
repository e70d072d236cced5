// 🗄️ Entity Store - SQLite persistence for contracts
//
// The store is the sole owner of persisted contract state. Every field
// update is its own statement: nothing groups the updates of one edit.

use crate::contract::{validate_field, Contract, ContractField, ContractId, FieldValue, NewContract};
use crate::error::StoreError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tracing::{debug, info};

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the rest of the system needs from persistence
pub trait EntityStore {
    fn get_by_id(&self, id: ContractId) -> StoreResult<Contract>;

    fn get_all(&self) -> StoreResult<Vec<Contract>>;

    /// Persist a new contract; the store assigns the id
    fn insert(&mut self, contract: NewContract) -> StoreResult<Contract>;

    fn delete_by_id(&mut self, id: ContractId) -> StoreResult<()>;

    /// Change exactly one field of one contract
    fn apply_field_update(
        &mut self,
        id: ContractId,
        field: ContractField,
        value: FieldValue,
    ) -> StoreResult<Contract>;

    /// Remove every contract
    fn clear(&mut self) -> StoreResult<usize>;

    /// Bulk insert, optionally replacing the current contents
    fn import(&mut self, contracts: Vec<NewContract>, overwrite: bool) -> StoreResult<Vec<Contract>> {
        if overwrite {
            let removed = self.clear()?;
            info!(removed, "cleared contracts before import");
        }
        contracts.into_iter().map(|c| self.insert(c)).collect()
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, category, expenses, cycle, contract_nr, customer_nr,
        contract_period, period_of_notice, description, document_path, start_date
     FROM contracts";

/// SQLite-backed Entity Store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        info!(path = %path.display(), "opened contract database");
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn count(&self) -> StoreResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM contracts", [], |row| row.get(0))?;
        Ok(count)
    }
}

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // AUTOINCREMENT: ids of deleted contracts are never handed out again
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contracts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            expenses REAL NOT NULL,
            cycle INTEGER NOT NULL,
            contract_nr TEXT NOT NULL DEFAULT '',
            customer_nr TEXT NOT NULL DEFAULT '',
            contract_period INTEGER NOT NULL DEFAULT 0,
            period_of_notice INTEGER NOT NULL DEFAULT 0,
            description TEXT NOT NULL DEFAULT '',
            document_path TEXT NOT NULL DEFAULT '',
            start_date TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contracts_name ON contracts(name)",
        [],
    )?;

    Ok(())
}

fn row_to_contract(row: &Row<'_>) -> rusqlite::Result<(Contract, String)> {
    let start_date: String = row.get(11)?;
    let contract = Contract {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        expenses: row.get(3)?,
        cycle: row.get(4)?,
        contract_nr: row.get(5)?,
        customer_nr: row.get(6)?,
        contract_period: row.get(7)?,
        period_of_notice: row.get(8)?,
        description: row.get(9)?,
        document_path: row.get(10)?,
        start_date: NaiveDate::MIN,
    };
    Ok((contract, start_date))
}

// Dates are stored as text; a row that doesn't parse is reported, not skipped
fn finish_row((mut contract, start_date): (Contract, String)) -> StoreResult<Contract> {
    contract.start_date = NaiveDate::parse_from_str(&start_date, crate::contract::DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("contract {}: start_date '{}': {}", contract.id, start_date, e)))?;
    Ok(contract)
}

fn insert_row(conn: &Connection, contract: &NewContract) -> StoreResult<ContractId> {
    conn.execute(
        "INSERT INTO contracts (
            name, category, expenses, cycle, contract_nr, customer_nr,
            contract_period, period_of_notice, description, document_path, start_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            contract.name,
            contract.category,
            contract.expenses,
            contract.cycle,
            contract.contract_nr,
            contract.customer_nr,
            contract.contract_period,
            contract.period_of_notice,
            contract.description,
            contract.document_path,
            contract.start_date.format(crate::contract::DATE_FORMAT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl EntityStore for SqliteStore {
    fn get_by_id(&self, id: ContractId) -> StoreResult<Contract> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;
        let row = stmt.query_map([id], row_to_contract)?.next().transpose()?;

        match row {
            Some(row) => finish_row(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn get_all(&self) -> StoreResult<Vec<Contract>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map([], row_to_contract)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(finish_row).collect()
    }

    fn insert(&mut self, contract: NewContract) -> StoreResult<Contract> {
        contract.validate()?;
        let id = insert_row(&self.conn, &contract)?;
        info!(id, name = %contract.name, "contract created");
        Ok(contract.with_id(id))
    }

    fn delete_by_id(&mut self, id: ContractId) -> StoreResult<()> {
        let deleted = self.conn.execute("DELETE FROM contracts WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!(id, "contract deleted");
        Ok(())
    }

    fn apply_field_update(
        &mut self,
        id: ContractId,
        field: ContractField,
        value: FieldValue,
    ) -> StoreResult<Contract> {
        let value = value.coerce(field)?;
        validate_field(field, &value)?;

        // Column names come from the closed ContractField enum, never from input
        let sql = format!("UPDATE contracts SET {} = ?1 WHERE id = ?2", field.column());
        let updated = match &value {
            FieldValue::Text(s) => self.conn.execute(&sql, params![s, id])?,
            FieldValue::Decimal(f) => self.conn.execute(&sql, params![f, id])?,
            FieldValue::Integer(i) => self.conn.execute(&sql, params![i, id])?,
            FieldValue::Date(d) => self.conn.execute(
                &sql,
                params![d.format(crate::contract::DATE_FORMAT).to_string(), id],
            )?,
        };

        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!(id, %field, %value, "field updated");
        self.get_by_id(id)
    }

    fn clear(&mut self) -> StoreResult<usize> {
        Ok(self.conn.execute("DELETE FROM contracts", [])?)
    }

    /// All-or-nothing: a failing record rolls back the clear and every insert
    fn import(&mut self, contracts: Vec<NewContract>, overwrite: bool) -> StoreResult<Vec<Contract>> {
        let tx = self.conn.transaction()?;

        if overwrite {
            let removed = tx.execute("DELETE FROM contracts", [])?;
            info!(removed, "cleared contracts before import");
        }

        let mut imported = Vec::with_capacity(contracts.len());
        for contract in contracts {
            contract.validate()?;
            let id = insert_row(&tx, &contract)?;
            imported.push(contract.with_id(id));
        }

        tx.commit()?;
        info!(count = imported.len(), overwrite, "contracts imported");
        Ok(imported)
    }
}
