//! Record queries: typed get/set, expiring writes and glob listing.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::db::{RecordStore, StoreError};
use crate::clock::duration_millis;

const PURGE_EXPIRED: &str = "DELETE FROM records WHERE expires_at IS NOT NULL AND expires_at <= ?";

impl RecordStore {
    /// Serialize `value` as JSON and store it under `key` without expiry.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let data = serde_json::to_string(value)?;
        self.write(key, &data, None).await
    }

    /// Store a pre-serialized value under `key` without expiry.
    pub async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write(key, value, None).await
    }

    /// Store a pre-serialized value under `key`, readable for `ttl`.
    pub async fn set_string_expire(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let expires_at = self.clock().unix_millis().saturating_add(duration_millis(ttl));
        self.write(key, value, Some(expires_at)).await
    }

    /// Serialize `value` as JSON and store it under `key`, readable for `ttl`.
    pub async fn set_expire<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let data = serde_json::to_string(value)?;
        self.set_string_expire(key, &data, ttl).await
    }

    /// Upsert one record. Expiring writes also reclaim rows whose expiry
    /// has passed, so the table stays bounded by the live set.
    async fn write(&self, key: &str, value: &str, expires_at: Option<i64>) -> Result<(), StoreError> {
        let mut tx = self.pool().begin().await?;
        if expires_at.is_some() {
            let purged = sqlx::query(PURGE_EXPIRED)
                .bind(self.clock().unix_millis())
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if purged > 0 {
                debug!(purged, "Expired records reclaimed");
            }
        }
        sqlx::query(
            "INSERT INTO records (key, value, expires_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(key, expires_at, "Record written");
        Ok(())
    }

    /// Raw value stored under `key`.
    pub async fn get_string(&self, key: &str) -> Result<String, StoreError> {
        let now = self.clock().unix_millis();
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM records WHERE key = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Record {key}")))
    }

    /// Value stored under `key`, decoded as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        let data = self.get_string(key).await?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Raw values of every live key matching the glob `pattern`, in
    /// descending key order. No match yields an empty list.
    pub async fn list(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let now = self.clock().unix_millis();
        let values = sqlx::query_scalar::<_, String>(
            "SELECT value FROM records \
             WHERE key GLOB ? AND (expires_at IS NULL OR expires_at > ?) \
             ORDER BY key DESC",
        )
        .bind(pattern)
        .bind(now)
        .fetch_all(self.pool())
        .await?;

        Ok(values)
    }

    /// [`list`](Self::list) followed by best-effort decoding; see [`decode_all`].
    pub async fn list_decoded<T: DeserializeOwned>(&self, pattern: &str) -> Result<Vec<T>, StoreError> {
        let raw = self.list(pattern).await?;
        Ok(decode_all(&raw, pattern))
    }

    /// Delete records whose expiry has passed. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock().unix_millis();
        let result = sqlx::query(PURGE_EXPIRED)
            .bind(now)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// Cheap liveness query against the database.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}

/// Decode every raw value as `T`, dropping the ones that fail.
///
/// Each failure is logged with `source` (usually the listing pattern) and
/// skipped, so one malformed record never hides the rest.
pub fn decode_all<T: DeserializeOwned>(raw: &[String], source: &str) -> Vec<T> {
    raw.iter()
        .filter_map(|value| match serde_json::from_str::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(source, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}
