//! Key-value persistence for the offline form.
//!
//! A sibling feature of the gateway sharing the same database: simple
//! put/get/delete/list over string values. The dispatch path does not
//! depend on this module.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored form item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

impl CacheDb {
    /// Insert or update a form item.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty key.
    pub async fn put_item(&self, key: &str, value: &str) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::InvalidInput("store key cannot be empty".into()));
        }

        let key = key.to_string();
        let value = value.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO form_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![key, value, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a form item by key.
    ///
    /// Returns None if the key doesn't exist in the store.
    pub async fn get_item(&self, key: &str) -> Result<Option<StoredItem>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredItem>, Error> {
                let mut stmt = conn.prepare("SELECT key, value, updated_at FROM form_store WHERE key = ?1")?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(StoredItem { key: row.get(0)?, value: row.get(1)?, updated_at: row.get(2)? })
                });

                match result {
                    Ok(item) => Ok(Some(item)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a form item.
    ///
    /// Returns whether a row was removed; deleting an absent key is a no-op.
    pub async fn delete_item(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let removed = conn.execute("DELETE FROM form_store WHERE key = ?1", params![key])?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// All form items, ordered by key.
    pub async fn list_items(&self) -> Result<Vec<StoredItem>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoredItem>, Error> {
                let mut stmt = conn.prepare("SELECT key, value, updated_at FROM form_store ORDER BY key")?;
                let items = stmt
                    .query_map([], |row| {
                        Ok(StoredItem { key: row.get(0)?, value: row.get(1)?, updated_at: row.get(2)? })
                    })?
                    .collect::<Result<Vec<StoredItem>, rusqlite::Error>>()?;
                Ok(items)
            })
            .await
            .map_err(Error::from)
    }
}
