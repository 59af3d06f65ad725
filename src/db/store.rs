//! SQLite-backed account store.
//!
//! Each account is one row: the aggregate serialized as JSON plus a version
//! column. Saves are conditional updates on that version, which gives the
//! per-account atomicity the ledger relies on without table-level locking.

use crate::domain::{Account, AccountId, CurrencyId};
use crate::store::{AccountStore, SaveOutcome, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
    starting_balances: BTreeMap<CurrencyId, u64>,
}

impl SqliteAccountStore {
    /// Create a store over an initialized pool, granting `starting_balances`
    /// to accounts on first access.
    pub fn new(pool: SqlitePool, starting_balances: BTreeMap<CurrencyId, u64>) -> Self {
        Self {
            pool,
            starting_balances,
        }
    }

    async fn fetch(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT state, version FROM accounts WHERE account_id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let state: String = row.get(0);
        let version: i64 = row.get(1);
        let mut account: Account =
            serde_json::from_str(&state).map_err(|e| StoreError::Corrupt {
                account: id.clone(),
                detail: e.to_string(),
            })?;
        account.version = version;
        Ok(Some(account))
    }

    async fn insert_default(&self, id: &AccountId) -> Result<(), StoreError> {
        let account = Account::new(id.clone(), &self.starting_balances);
        let state = encode(&account)?;
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO accounts (account_id, state, version, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            ON CONFLICT(account_id) DO NOTHING
            "#,
        )
        .bind(id.as_str())
        .bind(&state)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn load_or_create(&self, id: &AccountId) -> Result<Account, StoreError> {
        if let Some(account) = self.fetch(id).await? {
            return Ok(account);
        }

        // ON CONFLICT DO NOTHING keeps a concurrent creator's row; the
        // re-fetch returns whichever insert won.
        self.insert_default(id).await?;
        self.fetch(id).await?.ok_or_else(|| {
            StoreError::Unavailable(format!("account {} missing after create", id))
        })
    }

    async fn save(&self, account: &Account) -> Result<SaveOutcome, StoreError> {
        let state = encode(account)?;
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET state = ?, version = version + 1, updated_at = ?
            WHERE account_id = ? AND version = ?
            "#,
        )
        .bind(&state)
        .bind(now)
        .bind(account.id.as_str())
        .bind(account.version)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if result.rows_affected() > 0 {
            Ok(SaveOutcome::Committed)
        } else {
            Ok(SaveOutcome::Conflict)
        }
    }
}

fn encode(account: &Account) -> Result<String, StoreError> {
    serde_json::to_string(account).map_err(|e| StoreError::Corrupt {
        account: account.id.clone(),
        detail: e.to_string(),
    })
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn setup() -> (SqliteAccountStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        let balances = [
            (CurrencyId::new("crystals".to_string()), 1200u64),
            (CurrencyId::new("orbs".to_string()), 5u64),
        ]
        .into_iter()
        .collect();
        (SqliteAccountStore::new(pool, balances), temp_dir)
    }

    fn account_id() -> AccountId {
        AccountId::new("tg:12345".to_string())
    }

    #[tokio::test]
    async fn test_first_access_creates_account() {
        let (store, _temp) = setup().await;
        let account = store.load_or_create(&account_id()).await.unwrap();
        assert_eq!(
            account.balance(&CurrencyId::new("crystals".to_string())),
            1200
        );
        assert_eq!(account.version, 0);
        assert!(account.inventory.is_empty());
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let (store, _temp) = setup().await;
        let first = store.load_or_create(&account_id()).await.unwrap();
        let second = store.load_or_create(&account_id()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let (store, _temp) = setup().await;
        let mut account = store.load_or_create(&account_id()).await.unwrap();
        account
            .debit(&CurrencyId::new("orbs".to_string()), 1)
            .unwrap();
        account.push_item(crate::domain::ItemId::new("iron_dagger".to_string()));

        assert_eq!(store.save(&account).await.unwrap(), SaveOutcome::Committed);

        let reloaded = store.load_or_create(&account_id()).await.unwrap();
        assert_eq!(reloaded.balance(&CurrencyId::new("orbs".to_string())), 4);
        assert_eq!(reloaded.inventory.len(), 1);
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn test_stale_writer_gets_conflict() {
        let (store, _temp) = setup().await;
        let winner = store.load_or_create(&account_id()).await.unwrap();
        let loser = winner.clone();

        assert_eq!(store.save(&winner).await.unwrap(), SaveOutcome::Committed);
        assert_eq!(store.save(&loser).await.unwrap(), SaveOutcome::Conflict);

        // The losing write must not have clobbered the committed version.
        let reloaded = store.load_or_create(&account_id()).await.unwrap();
        assert_eq!(reloaded.version, 1);
    }
}
