// 📄 Contract Entity - the one record type of the collection
//
// "The id is IDENTITY (assigned by the store, never changes), every other
//  attribute is a VALUE that can be replaced field by field"
//
// Field-level access (get/set by ContractField) is what the edit session,
// the Entity Store and the HTTP surface all speak.

use crate::error::ContractError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier
pub type ContractId = i64;

/// Wire format of `startDate`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// FIELDS
// ============================================================================

/// Every attribute that can be changed through a field-level update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractField {
    Name,
    Category,
    Expenses,
    Cycle,
    CustomerNr,
    ContractNr,
    StartDate,
    ContractPeriod,
    PeriodOfNotice,
    Description,
    DocumentPath,
}

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Non-negative decimal amount
    Decimal,
    /// Whole number of months
    Integer,
    Date,
}

impl ContractField {
    /// Fields editable in a details view, in snapshot enumeration order
    pub const EDITABLE: [ContractField; 8] = [
        ContractField::Name,
        ContractField::Category,
        ContractField::Expenses,
        ContractField::Cycle,
        ContractField::ContractPeriod,
        ContractField::PeriodOfNotice,
        ContractField::Description,
        ContractField::DocumentPath,
    ];

    /// All updatable fields
    pub const ALL: [ContractField; 11] = [
        ContractField::Name,
        ContractField::Category,
        ContractField::Expenses,
        ContractField::Cycle,
        ContractField::CustomerNr,
        ContractField::ContractNr,
        ContractField::StartDate,
        ContractField::ContractPeriod,
        ContractField::PeriodOfNotice,
        ContractField::Description,
        ContractField::DocumentPath,
    ];

    /// Wire name (camelCase, as the frontends send it)
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractField::Name => "name",
            ContractField::Category => "category",
            ContractField::Expenses => "expenses",
            ContractField::Cycle => "cycle",
            ContractField::CustomerNr => "customerNr",
            ContractField::ContractNr => "contractNr",
            ContractField::StartDate => "startDate",
            ContractField::ContractPeriod => "contractPeriod",
            ContractField::PeriodOfNotice => "periodOfNotice",
            ContractField::Description => "description",
            ContractField::DocumentPath => "documentPath",
        }
    }

    /// Column name in the `contracts` table
    pub fn column(&self) -> &'static str {
        match self {
            ContractField::Name => "name",
            ContractField::Category => "category",
            ContractField::Expenses => "expenses",
            ContractField::Cycle => "cycle",
            ContractField::CustomerNr => "customer_nr",
            ContractField::ContractNr => "contract_nr",
            ContractField::StartDate => "start_date",
            ContractField::ContractPeriod => "contract_period",
            ContractField::PeriodOfNotice => "period_of_notice",
            ContractField::Description => "description",
            ContractField::DocumentPath => "document_path",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ContractField::Name => "Name",
            ContractField::Category => "Category",
            ContractField::Expenses => "Expenses per payment",
            ContractField::Cycle => "Payment cycle (months)",
            ContractField::CustomerNr => "Customer number",
            ContractField::ContractNr => "Contract number",
            ContractField::StartDate => "Start date",
            ContractField::ContractPeriod => "Contract period (months)",
            ContractField::PeriodOfNotice => "Period of notice (months)",
            ContractField::Description => "Description",
            ContractField::DocumentPath => "Document path",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ContractField::Expenses => FieldKind::Decimal,
            ContractField::Cycle | ContractField::ContractPeriod | ContractField::PeriodOfNotice => {
                FieldKind::Integer
            }
            ContractField::StartDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    pub fn is_editable(&self) -> bool {
        Self::EDITABLE.contains(self)
    }
}

impl fmt::Display for ContractField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractField {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ContractError::UnknownField(s.to_string()))
    }
}

// ============================================================================
// FIELD VALUES
// ============================================================================

/// A single attribute value, independent of the field it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Convert `self` into the representation `field` stores.
    ///
    /// Strings are parsed for numeric and date fields because the frontends
    /// send every input as text.
    pub fn coerce(self, field: ContractField) -> Result<FieldValue, ContractError> {
        let invalid = |reason: String| ContractError::InvalidValue { field, reason };

        match field.kind() {
            FieldKind::Text => Ok(match self {
                FieldValue::Text(s) => FieldValue::Text(s),
                other => FieldValue::Text(other.to_string()),
            }),
            FieldKind::Decimal => {
                let amount = match self {
                    FieldValue::Decimal(f) => f,
                    FieldValue::Integer(i) => i as f64,
                    FieldValue::Text(s) => s
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| invalid(format!("'{}' is not a number", s)))?,
                    FieldValue::Date(d) => return Err(invalid(format!("expected a number, got date {}", d))),
                };
                if !amount.is_finite() {
                    return Err(invalid("must be a finite number".to_string()));
                }
                Ok(FieldValue::Decimal(amount))
            }
            FieldKind::Integer => {
                let months = match self {
                    FieldValue::Integer(i) => i,
                    FieldValue::Decimal(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
                    FieldValue::Decimal(f) => return Err(invalid(format!("{} is not a whole number", f))),
                    FieldValue::Text(s) => s
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| invalid(format!("'{}' is not a whole number", s)))?,
                    FieldValue::Date(d) => return Err(invalid(format!("expected a number, got date {}", d))),
                };
                if months < 0 || months > i64::from(u32::MAX) {
                    return Err(invalid(format!("{} is out of range", months)));
                }
                Ok(FieldValue::Integer(months))
            }
            FieldKind::Date => match self {
                FieldValue::Date(d) => Ok(FieldValue::Date(d)),
                FieldValue::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                    .map(FieldValue::Date)
                    .map_err(|_| invalid(format!("'{}' is not a YYYY-MM-DD date", s))),
                other => Err(invalid(format!("expected a date, got {}", other))),
            },
        }
    }

    /// Build a value for `field` from loosely typed JSON
    pub fn from_json(field: ContractField, value: &serde_json::Value) -> Result<FieldValue, ContractError> {
        let raw = match value {
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Decimal(n.as_f64().unwrap_or(f64::NAN)),
            },
            other => {
                return Err(ContractError::InvalidValue {
                    field,
                    reason: format!("unsupported JSON value {}", other),
                })
            }
        };
        raw.coerce(field)
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Decimal(f)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

/// Range checks applied before a value is persisted
pub fn validate_field(field: ContractField, value: &FieldValue) -> Result<(), ContractError> {
    let invalid = |reason: &str| ContractError::InvalidValue {
        field,
        reason: reason.to_string(),
    };

    match (field, value) {
        (ContractField::Name, value) if value.as_text().map_or(true, |s| s.trim().is_empty()) => {
            Err(invalid("name is required"))
        }
        (ContractField::Expenses, FieldValue::Decimal(f)) if *f < 0.0 => {
            Err(invalid("expenses must not be negative"))
        }
        (ContractField::Cycle, FieldValue::Integer(i)) if *i < 1 => {
            Err(invalid("cycle must be at least 1 month"))
        }
        _ => Ok(()),
    }
}

// ============================================================================
// CONTRACT ENTITY
// ============================================================================

/// Contract - a recurring payment (subscription, insurance, membership...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Assigned by the Entity Store, immutable
    pub id: ContractId,

    pub name: String,
    pub category: String,

    /// Amount per payment
    pub expenses: f64,

    /// Months between payments
    pub cycle: u32,

    pub contract_nr: String,
    pub customer_nr: String,

    /// Months
    pub contract_period: u32,

    /// Months
    pub period_of_notice: u32,

    pub description: String,

    /// Not checked for existence
    pub document_path: String,

    pub start_date: NaiveDate,
}

impl Contract {
    /// Read one field
    pub fn get(&self, field: ContractField) -> FieldValue {
        match field {
            ContractField::Name => FieldValue::Text(self.name.clone()),
            ContractField::Category => FieldValue::Text(self.category.clone()),
            ContractField::Expenses => FieldValue::Decimal(self.expenses),
            ContractField::Cycle => FieldValue::Integer(i64::from(self.cycle)),
            ContractField::CustomerNr => FieldValue::Text(self.customer_nr.clone()),
            ContractField::ContractNr => FieldValue::Text(self.contract_nr.clone()),
            ContractField::StartDate => FieldValue::Date(self.start_date),
            ContractField::ContractPeriod => FieldValue::Integer(i64::from(self.contract_period)),
            ContractField::PeriodOfNotice => FieldValue::Integer(i64::from(self.period_of_notice)),
            ContractField::Description => FieldValue::Text(self.description.clone()),
            ContractField::DocumentPath => FieldValue::Text(self.document_path.clone()),
        }
    }

    /// Replace one field, coercing the value to the field's type first.
    ///
    /// Only type conversion happens here; range checks are the store's job.
    pub fn set(&mut self, field: ContractField, value: FieldValue) -> Result<(), ContractError> {
        let value = value.coerce(field)?;

        match (field, value) {
            (ContractField::Name, FieldValue::Text(s)) => self.name = s,
            (ContractField::Category, FieldValue::Text(s)) => self.category = s,
            (ContractField::Expenses, FieldValue::Decimal(f)) => self.expenses = f,
            (ContractField::Cycle, FieldValue::Integer(i)) => self.cycle = i as u32,
            (ContractField::CustomerNr, FieldValue::Text(s)) => self.customer_nr = s,
            (ContractField::ContractNr, FieldValue::Text(s)) => self.contract_nr = s,
            (ContractField::StartDate, FieldValue::Date(d)) => self.start_date = d,
            (ContractField::ContractPeriod, FieldValue::Integer(i)) => self.contract_period = i as u32,
            (ContractField::PeriodOfNotice, FieldValue::Integer(i)) => self.period_of_notice = i as u32,
            (ContractField::Description, FieldValue::Text(s)) => self.description = s,
            (ContractField::DocumentPath, FieldValue::Text(s)) => self.document_path = s,
            (field, value) => {
                return Err(ContractError::InvalidValue {
                    field,
                    reason: format!("coerced to unexpected value {:?}", value),
                })
            }
        }

        Ok(())
    }

    /// Annualized expenses: `expenses * 12 / cycle`
    ///
    /// A zero cycle is an error, never an infinite or NaN amount.
    pub fn yearly_expenses(&self) -> Result<f64, ContractError> {
        if self.cycle == 0 {
            return Err(ContractError::ZeroCycle);
        }
        Ok(self.expenses * 12.0 / f64::from(self.cycle))
    }

    /// Value copy of the editable fields, tagged with the view's edit flag
    pub fn snapshot(&self, edit_active: bool) -> ContractSnapshot {
        ContractSnapshot {
            name: self.name.clone(),
            category: self.category.clone(),
            expenses: self.expenses,
            cycle: self.cycle,
            contract_period: self.contract_period,
            period_of_notice: self.period_of_notice,
            description: self.description.clone(),
            document_path: self.document_path.clone(),
            edit_active,
        }
    }

    /// Everything except the id
    pub fn to_new(&self) -> NewContract {
        NewContract {
            name: self.name.clone(),
            category: self.category.clone(),
            expenses: self.expenses,
            cycle: self.cycle,
            contract_nr: self.contract_nr.clone(),
            customer_nr: self.customer_nr.clone(),
            contract_period: self.contract_period,
            period_of_notice: self.period_of_notice,
            description: self.description.clone(),
            document_path: self.document_path.clone(),
            start_date: self.start_date,
        }
    }
}

/// Submission for a new contract, all fields at once, no id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub expenses: f64,
    pub cycle: u32,
    #[serde(default)]
    pub contract_nr: String,
    #[serde(default)]
    pub customer_nr: String,
    #[serde(default)]
    pub contract_period: u32,
    #[serde(default)]
    pub period_of_notice: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub document_path: String,
    pub start_date: NaiveDate,
}

impl NewContract {
    /// Same rules as field-level updates
    pub fn validate(&self) -> Result<(), ContractError> {
        validate_field(ContractField::Name, &FieldValue::Text(self.name.clone()))?;
        validate_field(ContractField::Expenses, &FieldValue::Decimal(self.expenses))?;
        validate_field(ContractField::Cycle, &FieldValue::Integer(i64::from(self.cycle)))?;
        if !self.expenses.is_finite() {
            return Err(ContractError::InvalidValue {
                field: ContractField::Expenses,
                reason: "must be a finite number".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a loosely typed submission (numbers may arrive as strings).
    ///
    /// `name`, `expenses`, `cycle` and `startDate` are required; an `id`
    /// key is ignored.
    pub fn from_json(value: &serde_json::Value) -> Result<NewContract, ContractError> {
        const REQUIRED: [ContractField; 4] = [
            ContractField::Name,
            ContractField::Expenses,
            ContractField::Cycle,
            ContractField::StartDate,
        ];

        let object = value.as_object().ok_or_else(|| ContractError::InvalidValue {
            field: ContractField::Name,
            reason: "expected a JSON object".to_string(),
        })?;

        let mut draft = NewContract {
            name: String::new(),
            category: String::new(),
            expenses: 0.0,
            cycle: 0,
            contract_nr: String::new(),
            customer_nr: String::new(),
            contract_period: 0,
            period_of_notice: 0,
            description: String::new(),
            document_path: String::new(),
            start_date: NaiveDate::MIN,
        }
        .with_id(0);

        for field in ContractField::ALL {
            match object.get(field.as_str()) {
                Some(raw) if !raw.is_null() => draft.set(field, FieldValue::from_json(field, raw)?)?,
                _ if REQUIRED.contains(&field) => {
                    return Err(ContractError::InvalidValue {
                        field,
                        reason: "required field is missing".to_string(),
                    })
                }
                _ => {}
            }
        }

        let new = draft.to_new();
        new.validate()?;
        Ok(new)
    }

    pub fn with_id(self, id: ContractId) -> Contract {
        Contract {
            id,
            name: self.name,
            category: self.category,
            expenses: self.expenses,
            cycle: self.cycle,
            contract_nr: self.contract_nr,
            customer_nr: self.customer_nr,
            contract_period: self.contract_period,
            period_of_notice: self.period_of_notice,
            description: self.description,
            document_path: self.document_path,
            start_date: self.start_date,
        }
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Editable fields of a contract at one point in time, used as a diff baseline.
///
/// `edit_active` is view state and never part of a persisted change.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSnapshot {
    pub name: String,
    pub category: String,
    pub expenses: f64,
    pub cycle: u32,
    pub contract_period: u32,
    pub period_of_notice: u32,
    pub description: String,
    pub document_path: String,
    pub edit_active: bool,
}

impl ContractSnapshot {
    /// Value of an editable field, `None` for fields the snapshot doesn't carry
    pub fn get(&self, field: ContractField) -> Option<FieldValue> {
        let value = match field {
            ContractField::Name => FieldValue::Text(self.name.clone()),
            ContractField::Category => FieldValue::Text(self.category.clone()),
            ContractField::Expenses => FieldValue::Decimal(self.expenses),
            ContractField::Cycle => FieldValue::Integer(i64::from(self.cycle)),
            ContractField::ContractPeriod => FieldValue::Integer(i64::from(self.contract_period)),
            ContractField::PeriodOfNotice => FieldValue::Integer(i64::from(self.period_of_notice)),
            ContractField::Description => FieldValue::Text(self.description.clone()),
            ContractField::DocumentPath => FieldValue::Text(self.document_path.clone()),
            _ => return None,
        };
        Some(value)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_contract(id: ContractId, name: &str, expenses: f64, cycle: u32) -> Contract {
        Contract {
            id,
            name: name.to_string(),
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
    fn test_field_names_parse() {
        for field in ContractField::ALL {
            assert_eq!(field.as_str().parse::<ContractField>().unwrap(), field);
        }
        assert_eq!(
            "editActive".parse::<ContractField>(),
            Err(ContractError::UnknownField("editActive".to_string()))
        );
    }

    #[test]
    fn test_editable_fields_order() {
        let names: Vec<&str> = ContractField::EDITABLE.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "name",
                "category",
                "expenses",
                "cycle",
                "contractPeriod",
                "periodOfNotice",
                "description",
                "documentPath"
            ]
        );
        assert!(!ContractField::StartDate.is_editable());
    }

    #[test]
    fn test_coerce_text_inputs() {
        assert_eq!(
            FieldValue::from("45.5").coerce(ContractField::Expenses).unwrap(),
            FieldValue::Decimal(45.5)
        );
        assert_eq!(
            FieldValue::from(" 3 ").coerce(ContractField::Cycle).unwrap(),
            FieldValue::Integer(3)
        );
        assert_eq!(
            FieldValue::from(45).coerce(ContractField::Expenses).unwrap(),
            FieldValue::Decimal(45.0)
        );
        assert_eq!(
            FieldValue::from("2023-04-01").coerce(ContractField::StartDate).unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())
        );
        assert_eq!(
            FieldValue::from(12).coerce(ContractField::Name).unwrap(),
            FieldValue::Text("12".to_string())
        );
    }

    #[test]
    fn test_coerce_rejects_bad_values() {
        assert!(matches!(
            FieldValue::from("monthly").coerce(ContractField::Cycle),
            Err(ContractError::InvalidValue { field: ContractField::Cycle, .. })
        ));
        assert!(FieldValue::from(2.5).coerce(ContractField::Cycle).is_err());
        assert!(FieldValue::from(-1).coerce(ContractField::ContractPeriod).is_err());
        assert!(FieldValue::from(f64::INFINITY).coerce(ContractField::Expenses).is_err());
        assert!(FieldValue::from("01.04.2023").coerce(ContractField::StartDate).is_err());
    }

    #[test]
    fn test_from_json_accepts_numbers_and_strings() {
        let value = FieldValue::from_json(ContractField::Expenses, &serde_json::json!(45)).unwrap();
        assert_eq!(value, FieldValue::Decimal(45.0));

        let value = FieldValue::from_json(ContractField::Cycle, &serde_json::json!("6")).unwrap();
        assert_eq!(value, FieldValue::Integer(6));

        assert!(FieldValue::from_json(ContractField::Name, &serde_json::json!(null)).is_err());
    }

    #[test]
    fn test_get_and_set_fields() {
        let mut contract = sample_contract(1, "Gym", 30.0, 1);

        contract.set(ContractField::Expenses, FieldValue::from("45")).unwrap();
        contract.set(ContractField::Name, FieldValue::from("Fitness Club")).unwrap();
        contract.set(ContractField::PeriodOfNotice, FieldValue::from(3)).unwrap();

        assert_eq!(contract.expenses, 45.0);
        assert_eq!(contract.get(ContractField::Name), FieldValue::Text("Fitness Club".to_string()));
        assert_eq!(contract.get(ContractField::PeriodOfNotice), FieldValue::Integer(3));
    }

    #[test]
    fn test_yearly_expenses() {
        let monthly = sample_contract(1, "Gym", 30.0, 1);
        assert_eq!(monthly.yearly_expenses().unwrap(), 360.0);

        let quarterly = sample_contract(2, "Insurance", 120.0, 3);
        assert_eq!(quarterly.yearly_expenses().unwrap(), 480.0);
    }

    #[test]
    fn test_yearly_expenses_zero_cycle_is_error() {
        let broken = sample_contract(3, "Broken", 120.0, 0);
        assert_eq!(broken.yearly_expenses(), Err(ContractError::ZeroCycle));
    }

    #[test]
    fn test_validate_field_ranges() {
        assert!(validate_field(ContractField::Cycle, &FieldValue::Integer(0)).is_err());
        assert!(validate_field(ContractField::Expenses, &FieldValue::Decimal(-1.0)).is_err());
        assert!(validate_field(ContractField::Name, &FieldValue::Text("  ".to_string())).is_err());
        assert!(validate_field(ContractField::Expenses, &FieldValue::Decimal(0.0)).is_ok());
        assert!(validate_field(ContractField::Description, &FieldValue::Text(String::new())).is_ok());
    }

    #[test]
    fn test_new_contract_validation() {
        let mut new = sample_contract(0, "Gym", 30.0, 1).to_new();
        assert!(new.validate().is_ok());

        new.cycle = 0;
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let contract = sample_contract(7, "Gym", 30.0, 1);
        let json = serde_json::to_value(&contract).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["periodOfNotice"], 2);
        assert_eq!(json["documentPath"], "/path/to/stuff");
        assert_eq!(json["startDate"], "2022-01-01");
    }

    #[test]
    fn test_new_contract_defaults_optional_fields() {
        let new: NewContract = serde_json::from_value(serde_json::json!({
            "name": "Streaming",
            "expenses": 9.99,
            "cycle": 1,
            "startDate": "2024-02-01"
        }))
        .unwrap();

        assert_eq!(new.category, "");
        assert_eq!(new.contract_period, 0);
    }

    #[test]
    fn test_new_contract_from_form_strings() {
        let new = NewContract::from_json(&serde_json::json!({
            "category": "insurance",
            "name": "health insurance",
            "expenses": "100",
            "cycle": "12",
            "customerNr": "12345",
            "contractNr": "67890",
            "startDate": "2022-01-01",
            "contractPeriod": 1,
            "periodOfNotice": "2",
            "description": "public health insurance - student tariff",
            "documentPath": "/home/docs"
        }))
        .unwrap();

        assert_eq!(new.expenses, 100.0);
        assert_eq!(new.cycle, 12);
        assert_eq!(new.period_of_notice, 2);
        assert_eq!(new.customer_nr, "12345");
    }

    #[test]
    fn test_new_contract_from_json_requires_core_fields() {
        let result = NewContract::from_json(&serde_json::json!({
            "name": "Gym",
            "expenses": 30,
            "startDate": "2022-01-01"
        }));
        assert!(matches!(
            result,
            Err(ContractError::InvalidValue { field: ContractField::Cycle, .. })
        ));

        let result = NewContract::from_json(&serde_json::json!({
            "name": "Gym",
            "expenses": 30,
            "cycle": 0,
            "startDate": "2022-01-01"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_carries_only_editable_fields() {
        let contract = sample_contract(1, "Gym", 30.0, 1);
        let snapshot = contract.snapshot(false);

        for field in ContractField::EDITABLE {
            assert_eq!(snapshot.get(field), Some(contract.get(field)));
        }
        assert_eq!(snapshot.get(ContractField::StartDate), None);
        assert_eq!(snapshot.get(ContractField::CustomerNr), None);
    }
}
