use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::models::{IncomingPhoto, StoredPhoto};

use super::{
    helpers::{parse_datetime, to_i64, to_u64},
    Database,
};

const PHOTO_COLUMNS: &str = "id, sequence, received_at, file_name, mime_type, size_bytes, data";

fn photo_from_row(row: &Row<'_>) -> Result<StoredPhoto> {
    let data: Vec<u8> = row.get(6)?;
    Ok(StoredPhoto {
        id: row.get(0)?,
        sequence: to_u64(row.get(1)?, "sequence")?,
        received_at: parse_datetime(&row.get::<_, String>(2)?, "received_at")?,
        file_name: row.get(3)?,
        mime_type: row.get(4)?,
        size_bytes: to_u64(row.get(5)?, "size_bytes")?,
        bytes: Bytes::from(data),
    })
}

impl Database {
    /// Insert a photo with the next sequence number. Numbering and insert
    /// happen in one transaction.
    pub async fn insert_photo(&self, photo: IncomingPhoto) -> Result<StoredPhoto> {
        self.execute(move |conn| {
            let tx = conn.transaction().context("failed to open photo transaction")?;
            let last: i64 = tx.query_row(
                "SELECT COALESCE(MAX(sequence), 0) FROM photos",
                [],
                |row| row.get(0),
            )?;
            let stored = StoredPhoto::from_incoming(photo, to_u64(last, "sequence")? + 1, Utc::now());

            tx.execute(
                "INSERT INTO photos (id, sequence, received_at, file_name, mime_type, size_bytes, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    stored.id,
                    to_i64(stored.sequence)?,
                    stored.received_at.to_rfc3339(),
                    stored.file_name,
                    stored.mime_type,
                    to_i64(stored.size_bytes)?,
                    stored.bytes.as_ref(),
                ],
            )
            .with_context(|| "failed to insert photo")?;
            tx.commit().context("failed to commit photo insert")?;

            Ok(stored)
        })
        .await
    }

    pub async fn count_photos(&self) -> Result<usize> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
            Ok(to_u64(count, "count")? as usize)
        })
        .await
    }

    /// All photos in arrival order.
    pub async fn list_photos(&self) -> Result<Vec<StoredPhoto>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PHOTO_COLUMNS} FROM photos ORDER BY sequence ASC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut photos = Vec::new();
            while let Some(row) = rows.next()? {
                photos.push(photo_from_row(row)?);
            }
            Ok(photos)
        })
        .await
    }
}
