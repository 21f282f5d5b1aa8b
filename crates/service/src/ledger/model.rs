use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Root of the persisted document: every client of the bank, keyed by id.
/// Identifiers are decimal strings used as JSON object keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BankDocument {
    pub clients: HashMap<String, Client>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub name: String,
    pub first_name: String,
    #[serde(default)]
    pub accounts: HashMap<String, Account>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub balance: f64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Immutable record of a balance change. Insertion order is chronological.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub label: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

/// Create/update input for a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub first_name: String,
}

impl ClientInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("name must not be blank".into()));
        }
        if self.first_name.trim().is_empty() {
            return Err(ServiceError::Validation("first_name must not be blank".into()));
        }
        Ok(())
    }
}

/// Deposit/withdrawal input. The amount is validated before any lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationInput {
    pub amount: f64,
    pub label: String,
}

impl OperationInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ServiceError::Validation("amount must be strictly positive".into()));
        }
        Ok(())
    }
}

/// API-facing view of a client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub first_name: String,
}

/// API-facing view of an account.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    pub id: String,
    pub balance: f64,
}

/// Allocate the next identifier: numeric max of the existing keys plus one,
/// formatted as a decimal string. Non-numeric keys are skipped.
pub(crate) fn next_id<'a, I>(keys: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let max = keys
        .into_iter()
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

/// Sort key for id-ordered listings.
pub(crate) fn numeric_key(id: &str) -> u64 {
    id.parse::<u64>().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_starts_at_one() {
        let keys: Vec<String> = Vec::new();
        assert_eq!(next_id(&keys), "1");
    }

    #[test]
    fn next_id_is_numeric_max_plus_one() {
        let keys: Vec<String> = vec!["2".into(), "10".into(), "9".into()];
        assert_eq!(next_id(&keys), "11");
    }

    #[test]
    fn next_id_skips_non_numeric_keys() {
        let keys: Vec<String> = vec!["abc".into(), "3".into()];
        assert_eq!(next_id(&keys), "4");
    }

    #[test]
    fn transaction_kind_uses_lowercase_on_the_wire() {
        assert_eq!(
            serde_json::to_value(TransactionKind::Withdrawal).expect("serialize"),
            serde_json::json!("withdrawal")
        );
        let kind: TransactionKind = serde_json::from_str("\"deposit\"").expect("parse");
        assert_eq!(kind, TransactionKind::Deposit);
    }

    #[test]
    fn client_without_accounts_key_parses_as_empty() {
        let client: Client =
            serde_json::from_str(r#"{"name":"Doe","first_name":"John"}"#).expect("parse");
        assert!(client.accounts.is_empty());
    }

    #[test]
    fn operation_input_rejects_non_positive_amounts() {
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let input = OperationInput { amount, label: "x".into() };
            assert!(matches!(input.validate(), Err(ServiceError::Validation(_))));
        }
        let ok = OperationInput { amount: 0.01, label: "x".into() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn client_input_rejects_blank_names() {
        let input = ClientInput { name: "  ".into(), first_name: "John".into() };
        assert!(matches!(input.validate(), Err(ServiceError::Validation(_))));
        let input = ClientInput { name: "Doe".into(), first_name: "".into() };
        assert!(matches!(input.validate(), Err(ServiceError::Validation(_))));
    }
}
