// 📦 Import / Export - contracts to and from files
//
// JSON arrays (the backup format of the collection) and CSV (for
// spreadsheets). Ids in imported files are ignored: the store assigns new ones.

use crate::contract::{Contract, NewContract};
use crate::error::TransferError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, TransferError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(FileFormat::Json),
            "csv" => Ok(FileFormat::Csv),
            _ => Err(TransferError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read contracts from a `.json` or `.csv` file; every record is validated
pub fn load_contracts(path: &Path) -> Result<Vec<NewContract>, TransferError> {
    let contracts = match FileFormat::from_path(path)? {
        FileFormat::Json => load_json(path)?,
        FileFormat::Csv => load_csv(path)?,
    };

    for (index, contract) in contracts.iter().enumerate() {
        contract.validate().map_err(|e| TransferError::InvalidRecord {
            index,
            reason: e.to_string(),
        })?;
    }

    info!(path = %path.display(), count = contracts.len(), "contracts loaded");
    Ok(contracts)
}

/// Write contracts to a `.json` or `.csv` file, replacing it if it exists
pub fn save_contracts(path: &Path, contracts: &[Contract]) -> Result<usize, TransferError> {
    match FileFormat::from_path(path)? {
        FileFormat::Json => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, contracts)?;
            writer.flush()?;
        }
        FileFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            for contract in contracts {
                writer.serialize(contract)?;
            }
            writer.flush()?;
        }
    }

    info!(path = %path.display(), count = contracts.len(), "contracts exported");
    Ok(contracts.len())
}

fn load_json(path: &Path) -> Result<Vec<NewContract>, TransferError> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record).map_err(|e| TransferError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn load_csv(path: &Path) -> Result<Vec<NewContract>, TransferError> {
    let mut rdr = csv::Reader::from_path(path)?;

    let mut contracts = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let contract: NewContract = result.map_err(|e| TransferError::InvalidRecord {
            index,
            reason: e.to_string(),
        })?;
        contracts.push(contract);
    }

    Ok(contracts)
}
