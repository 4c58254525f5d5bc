//! Named response caches.
//!
//! A named cache is a persistent set of full response snapshots keyed by
//! request identity (method + URL). Entries are written in bulk at install
//! time or lazily on fetch misses, overwritten on every successful fetch,
//! and survive process restarts.

use super::connection::CacheDb;
use super::hash::request_key;
use crate::Error;
use crate::request::ResourceResponse;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Handle to one named cache inside the shared database.
///
/// Opening the same name twice yields handles over the same rows; the
/// handle itself is cheap to clone.
#[derive(Clone, Debug)]
pub struct NamedCache {
    db: CacheDb,
    name: String,
}

impl CacheDb {
    /// Open (or create) a named cache.
    ///
    /// Idempotent: the registry row is upserted, and repeated opens of the
    /// same name address the same logical cache.
    pub async fn open_cache(&self, name: &str) -> Result<NamedCache, Error> {
        let cache_name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO caches (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![cache_name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(NamedCache { db: self.clone(), name: name.to_string() })
    }

    /// Delete every named cache except `keep`.
    ///
    /// Returns the number of deleted response entries. Run at activation so
    /// a deployment that renamed its cache reclaims the old rows.
    pub async fn purge_other_caches(&self, keep: &str) -> Result<u64, Error> {
        let keep = keep.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let entries = conn.execute("DELETE FROM responses WHERE cache_name != ?1", params![keep])?;
                conn.execute("DELETE FROM caches WHERE name != ?1", params![keep])?;
                Ok(entries as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Names currently present in the cache registry, sorted.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }
}

impl NamedCache {
    /// The cache's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored snapshot for this request identity.
    ///
    /// Returns `Ok(None)` for an absent entry; an `Err` means the database
    /// itself failed.
    pub async fn lookup(&self, method: &str, url: &str) -> Result<Option<ResourceResponse>, Error> {
        let key = request_key(method, url);
        let cache_name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Option<ResourceResponse>, Error> {
                let mut stmt =
                    conn.prepare("SELECT status, headers_json, body FROM responses WHERE cache_name = ?1 AND key = ?2")?;

                let result = stmt.query_row(params![cache_name, key], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?))
                });

                match result {
                    Ok((status, headers_json, body)) => {
                        let headers = serde_json::from_str(&headers_json).unwrap_or_default();
                        Ok(Some(ResourceResponse { status: status as u16, headers, body }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store a snapshot for this request identity, overwriting any prior
    /// entry.
    ///
    /// The snapshot is cloned into the database, so the caller's copy and
    /// the stored copy stay independently readable. The returned future
    /// resolves only after the write has committed.
    pub async fn store(&self, method: &str, url: &str, response: &ResourceResponse) -> Result<(), Error> {
        let key = request_key(method, url);
        let cache_name = self.name.clone();
        let method = method.to_uppercase();
        let url = url.to_string();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let status = response.status;
        let body = response.body.clone();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO responses (cache_name, key, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(cache_name, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        cache_name,
                        key,
                        method,
                        url,
                        status,
                        headers_json,
                        body,
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries currently stored under this cache name.
    pub async fn entry_count(&self) -> Result<u64, Error> {
        let cache_name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM responses WHERE cache_name = ?1",
                    params![cache_name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response(body: &str) -> ResourceResponse {
        ResourceResponse::new(200)
            .with_header("content-type", "text/html")
            .with_body(body)
    }

    #[tokio::test]
    async fn test_open_cache_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = db.open_cache("static-v1").await.unwrap();
        let second = db.open_cache("static-v1").await.unwrap();

        first
            .store("GET", "http://origin.local/index.html", &sample_response("hello"))
            .await
            .unwrap();

        let found = second.lookup("GET", "http://origin.local/index.html").await.unwrap();
        assert_eq!(found.unwrap().body, b"hello");
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_missing_is_none() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("static-v1").await.unwrap();

        let found = cache.lookup("GET", "http://origin.local/absent").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("static-v1").await.unwrap();
        let url = "http://origin.local/app.js";

        cache.store("GET", url, &sample_response("v1")).await.unwrap();
        cache.store("GET", url, &sample_response("v2")).await.unwrap();

        let found = cache.lookup("GET", url).await.unwrap().unwrap();
        assert_eq!(found.body, b"v2");
        assert_eq!(cache.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entries_scoped_by_cache_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let old = db.open_cache("static-v1").await.unwrap();
        let new = db.open_cache("static-v2").await.unwrap();
        let url = "http://origin.local/index.html";

        old.store("GET", url, &sample_response("old")).await.unwrap();

        assert!(new.lookup("GET", url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stored_copy_round_trips_headers() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("static-v1").await.unwrap();
        let url = "http://origin.local/styles.css";

        let original = ResourceResponse::new(200)
            .with_header("content-type", "text/css")
            .with_header("cache-control", "max-age=86400")
            .with_body("body { margin: 0 }");
        cache.store("GET", url, &original).await.unwrap();

        let found = cache.lookup("GET", url).await.unwrap().unwrap();
        assert_eq!(found, original);
    }

    #[tokio::test]
    async fn test_purge_other_caches() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let old = db.open_cache("static-v1").await.unwrap();
        let current = db.open_cache("static-v2").await.unwrap();
        let url = "http://origin.local/index.html";

        old.store("GET", url, &sample_response("old")).await.unwrap();
        current.store("GET", url, &sample_response("new")).await.unwrap();

        let removed = db.purge_other_caches("static-v2").await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.cache_names().await.unwrap(), vec!["static-v2".to_string()]);
        assert!(old.lookup("GET", url).await.unwrap().is_none());
        assert_eq!(current.lookup("GET", url).await.unwrap().unwrap().body, b"new");
    }
}
