//! Response snapshot storage.
//!
//! Entries are keyed by (generation, request URL). A put with an existing key
//! replaces the previous snapshot; entries never expire on their own.

use super::connection::CacheDb;
use super::hash::compute_entry_key;
use crate::Error;
use crate::http::Response;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub version: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl CachedEntry {
    /// Rebuild the response this entry was stored from.
    pub fn into_response(self) -> Response {
        Response { status: self.status, headers: self.headers, body: self.body }
    }
}

impl CacheDb {
    /// Store a response snapshot under `url` in the named generation.
    ///
    /// The generation is created on first write. Uses UPSERT semantics:
    /// the last write for a key wins.
    pub async fn put_entry(&self, version: &str, url: &str, response: &Response) -> Result<(), Error> {
        let version = version.to_string();
        let url = url.to_string();
        let key_hash = compute_entry_key(&url);
        let status = response.status;
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;
        let body = response.body.to_vec();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_versions (name, created_at) VALUES (?1, ?2)",
                    params![version, stored_at],
                )?;
                tx.execute(
                    "INSERT INTO cache_entries (version, key_hash, url, status, headers_json, body, stored_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(version, key_hash) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![version, key_hash, url, status, headers_json, body, stored_at],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Exact lookup by URL within a generation.
    pub async fn get_entry(&self, version: &str, url: &str) -> Result<Option<CachedEntry>, Error> {
        let version = version.to_string();
        let key_hash = compute_entry_key(url);
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT version, url, status, headers_json, body, stored_at
                    FROM cache_entries WHERE version = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![version, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u16>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                });

                match result {
                    Ok((version, url, status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::InvalidInput(format!("corrupt headers for {url}: {e}")))?;
                        Ok(Some(CachedEntry { version, url, status, headers, body: Bytes::from(body), stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// URLs stored in a generation, in insertion order.
    pub async fn entry_urls(&self, version: &str) -> Result<Vec<String>, Error> {
        let version = version.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE version = ?1 ORDER BY rowid")?;
                let urls = stmt
                    .query_map(params![version], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a generation.
    pub async fn count_entries(&self, version: &str) -> Result<u64, Error> {
        let version = version.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE version = ?1", params![version], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
