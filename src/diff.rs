// 🔍 Diff Engine - field-level changes between two contract snapshots
//
// Output order follows ContractField::EDITABLE. The view-only edit flag is
// never emitted, even when it is the only thing that changed.

use crate::contract::{ContractField, ContractSnapshot, FieldValue};
use serde::{Deserialize, Serialize};

/// One field whose value differs, with the value it should now have
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: ContractField,
    pub value: FieldValue,
}

/// Minimal ordered list of changes turning `before` into `after`
pub fn diff(before: &ContractSnapshot, after: &ContractSnapshot) -> Vec<FieldChange> {
    if std::ptr::eq(before, after) || before == after {
        return Vec::new();
    }

    ContractField::EDITABLE
        .iter()
        .filter_map(|&field| {
            let old = before.get(field)?;
            let new = after.get(field)?;
            (old != new).then_some(FieldChange { field, value: new })
        })
        .collect()
}
