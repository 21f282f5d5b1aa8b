use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::ServiceError;
use crate::storage::json_doc_store::JsonDocStore;

use super::model::{
    next_id, numeric_key, Account, AccountSummary, BankDocument, Client, ClientInput,
    ClientRecord, OperationInput, Transaction, TransactionKind,
};

/// Trait abstraction over ledger storage, so handlers can be exercised
/// without a filesystem behind them.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn list_clients(&self) -> Vec<ClientRecord>;
    async fn get_client(&self, client_id: &str) -> Result<ClientRecord, ServiceError>;
    async fn create_client(&self, input: ClientInput) -> Result<ClientRecord, ServiceError>;
    async fn update_client(&self, client_id: &str, input: ClientInput) -> Result<ClientRecord, ServiceError>;
    async fn delete_client(&self, client_id: &str) -> Result<bool, ServiceError>;

    async fn list_accounts(&self, client_id: &str) -> Result<Vec<AccountSummary>, ServiceError>;
    async fn get_account(&self, client_id: &str, account_id: &str) -> Result<AccountSummary, ServiceError>;
    async fn create_account(&self, client_id: &str) -> Result<AccountSummary, ServiceError>;
    async fn delete_account(&self, client_id: &str, account_id: &str) -> Result<bool, ServiceError>;

    async fn deposit(&self, client_id: &str, account_id: &str, input: OperationInput) -> Result<AccountSummary, ServiceError>;
    async fn withdraw(&self, client_id: &str, account_id: &str, input: OperationInput) -> Result<AccountSummary, ServiceError>;
    async fn list_transactions(&self, client_id: &str, account_id: &str) -> Result<Vec<Transaction>, ServiceError>;
}

/// File storage: the whole bank persisted as one JSON document.
#[derive(Clone)]
pub struct BankStore {
    store: Arc<JsonDocStore<BankDocument>>,
}

fn client_of<'a>(doc: &'a BankDocument, client_id: &str) -> Result<&'a Client, ServiceError> {
    doc.clients.get(client_id).ok_or_else(|| ServiceError::not_found("client"))
}

fn client_of_mut<'a>(doc: &'a mut BankDocument, client_id: &str) -> Result<&'a mut Client, ServiceError> {
    doc.clients.get_mut(client_id).ok_or_else(|| ServiceError::not_found("client"))
}

fn account_of<'a>(doc: &'a BankDocument, client_id: &str, account_id: &str) -> Result<&'a Account, ServiceError> {
    let client = client_of(doc, client_id)?;
    client.accounts.get(account_id).ok_or_else(|| ServiceError::not_found("account"))
}

fn account_of_mut<'a>(doc: &'a mut BankDocument, client_id: &str, account_id: &str) -> Result<&'a mut Account, ServiceError> {
    let client = client_of_mut(doc, client_id)?;
    client.accounts.get_mut(account_id).ok_or_else(|| ServiceError::not_found("account"))
}

impl BankStore {
    /// Initialize the store; creates the backing file with an empty client
    /// collection when missing.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonDocStore::<BankDocument>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// List every client, ordered by numeric id.
    pub async fn list_clients(&self) -> Vec<ClientRecord> {
        let mut records = self
            .store
            .read(|doc| {
                doc.clients
                    .iter()
                    .map(|(id, c)| ClientRecord {
                        id: id.clone(),
                        name: c.name.clone(),
                        first_name: c.first_name.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .await;
        records.sort_by_key(|r| numeric_key(&r.id));
        records
    }

    /// Fetch one client by id.
    pub async fn get_client(&self, client_id: &str) -> Result<ClientRecord, ServiceError> {
        self.store
            .read(|doc| {
                let client = client_of(doc, client_id)?;
                Ok(ClientRecord {
                    id: client_id.to_string(),
                    name: client.name.clone(),
                    first_name: client.first_name.clone(),
                })
            })
            .await
    }

    /// Create a new client with an allocated id and no accounts.
    pub async fn create_client(&self, input: ClientInput) -> Result<ClientRecord, ServiceError> {
        input.validate()?;
        let ClientInput { name, first_name } = input;
        self.store
            .update(move |doc| {
                let id = next_id(doc.clients.keys());
                doc.clients.insert(
                    id.clone(),
                    Client {
                        name: name.clone(),
                        first_name: first_name.clone(),
                        accounts: HashMap::new(),
                    },
                );
                Ok(ClientRecord { id, name, first_name })
            })
            .await
    }

    /// Replace a client's names.
    pub async fn update_client(&self, client_id: &str, input: ClientInput) -> Result<ClientRecord, ServiceError> {
        input.validate()?;
        let ClientInput { name, first_name } = input;
        self.store
            .update(move |doc| {
                let client = client_of_mut(doc, client_id)?;
                client.name = name.clone();
                client.first_name = first_name.clone();
                Ok(ClientRecord { id: client_id.to_string(), name, first_name })
            })
            .await
    }

    /// Remove a client and every account it owns; returns whether it existed.
    pub async fn delete_client(&self, client_id: &str) -> Result<bool, ServiceError> {
        self.store
            .update(|doc| Ok(doc.clients.remove(client_id).is_some()))
            .await
    }

    /// List a client's accounts, ordered by numeric id.
    pub async fn list_accounts(&self, client_id: &str) -> Result<Vec<AccountSummary>, ServiceError> {
        let mut accounts = self
            .store
            .read(|doc| {
                let client = client_of(doc, client_id)?;
                Ok(client
                    .accounts
                    .iter()
                    .map(|(id, a)| AccountSummary { id: id.clone(), balance: a.balance })
                    .collect::<Vec<_>>())
            })
            .await?;
        accounts.sort_by_key(|a| numeric_key(&a.id));
        Ok(accounts)
    }

    /// Fetch one account of a client. The client is resolved first, so an
    /// unknown client and an unknown account both surface as not found.
    pub async fn get_account(&self, client_id: &str, account_id: &str) -> Result<AccountSummary, ServiceError> {
        self.store
            .read(|doc| {
                let account = account_of(doc, client_id, account_id)?;
                Ok(AccountSummary { id: account_id.to_string(), balance: account.balance })
            })
            .await
    }

    /// Open a new empty account for a client.
    pub async fn create_account(&self, client_id: &str) -> Result<AccountSummary, ServiceError> {
        self.store
            .update(|doc| {
                let client = client_of_mut(doc, client_id)?;
                let id = next_id(client.accounts.keys());
                client.accounts.insert(id.clone(), Account::default());
                Ok(AccountSummary { id, balance: 0.0 })
            })
            .await
    }

    /// Remove an account; returns whether it existed. An unknown client is
    /// an error rather than `false`.
    pub async fn delete_account(&self, client_id: &str, account_id: &str) -> Result<bool, ServiceError> {
        self.store
            .update(|doc| {
                let client = client_of_mut(doc, client_id)?;
                Ok(client.accounts.remove(account_id).is_some())
            })
            .await
    }

    /// Credit an account and append a deposit record.
    pub async fn deposit(&self, client_id: &str, account_id: &str, input: OperationInput) -> Result<AccountSummary, ServiceError> {
        input.validate()?;
        let OperationInput { amount, label } = input;
        self.store
            .update(move |doc| {
                let account = account_of_mut(doc, client_id, account_id)?;
                account.balance += amount;
                account.transactions.push(Transaction {
                    label,
                    value: amount,
                    kind: TransactionKind::Deposit,
                    date: Utc::now(),
                });
                Ok(AccountSummary { id: account_id.to_string(), balance: account.balance })
            })
            .await
    }

    /// Debit an account and append a withdrawal record with the negated
    /// amount. Refused when the balance would go negative; nothing is
    /// mutated or persisted in that case.
    pub async fn withdraw(&self, client_id: &str, account_id: &str, input: OperationInput) -> Result<AccountSummary, ServiceError> {
        input.validate()?;
        let OperationInput { amount, label } = input;
        self.store
            .update(move |doc| {
                let account = account_of_mut(doc, client_id, account_id)?;
                if account.balance - amount < 0.0 {
                    return Err(ServiceError::Forbidden("negative balance".into()));
                }
                account.balance -= amount;
                account.transactions.push(Transaction {
                    label,
                    value: -amount,
                    kind: TransactionKind::Withdrawal,
                    date: Utc::now(),
                });
                Ok(AccountSummary { id: account_id.to_string(), balance: account.balance })
            })
            .await
    }

    /// Full transaction history of an account, in insertion order.
    pub async fn list_transactions(&self, client_id: &str, account_id: &str) -> Result<Vec<Transaction>, ServiceError> {
        self.store
            .read(|doc| {
                let account = account_of(doc, client_id, account_id)?;
                Ok(account.transactions.clone())
            })
            .await
    }
}

#[async_trait]
impl LedgerStore for BankStore {
    async fn list_clients(&self) -> Vec<ClientRecord> { self.list_clients().await }
    async fn get_client(&self, client_id: &str) -> Result<ClientRecord, ServiceError> { self.get_client(client_id).await }
    async fn create_client(&self, input: ClientInput) -> Result<ClientRecord, ServiceError> { self.create_client(input).await }
    async fn update_client(&self, client_id: &str, input: ClientInput) -> Result<ClientRecord, ServiceError> { self.update_client(client_id, input).await }
    async fn delete_client(&self, client_id: &str) -> Result<bool, ServiceError> { self.delete_client(client_id).await }
    async fn list_accounts(&self, client_id: &str) -> Result<Vec<AccountSummary>, ServiceError> { self.list_accounts(client_id).await }
    async fn get_account(&self, client_id: &str, account_id: &str) -> Result<AccountSummary, ServiceError> { self.get_account(client_id, account_id).await }
    async fn create_account(&self, client_id: &str) -> Result<AccountSummary, ServiceError> { self.create_account(client_id).await }
    async fn delete_account(&self, client_id: &str, account_id: &str) -> Result<bool, ServiceError> { self.delete_account(client_id, account_id).await }
    async fn deposit(&self, client_id: &str, account_id: &str, input: OperationInput) -> Result<AccountSummary, ServiceError> { self.deposit(client_id, account_id, input).await }
    async fn withdraw(&self, client_id: &str, account_id: &str, input: OperationInput) -> Result<AccountSummary, ServiceError> { self.withdraw(client_id, account_id, input).await }
    async fn list_transactions(&self, client_id: &str, account_id: &str) -> Result<Vec<Transaction>, ServiceError> { self.list_transactions(client_id, account_id).await }
}
