//! DuckDB-backed store for custom cards uploaded through the bot or site.
//!
//! Customs are the only cards the gallery persists itself. Each row carries a
//! store-assigned UUID, which keeps customs out of the id space of derived
//! catalog ids.

use crate::error::{GalleryError, Result};
use crate::models::{Card, CustomCardUpdate, ImageRef, NewCustomCard};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use duckdb::{params, types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS customs (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    image_url VARCHAR NOT NULL,
    item_type VARCHAR NOT NULL,
    category VARCHAR NOT NULL,
    idol_name VARCHAR,
    group_name VARCHAR,
    theme VARCHAR,
    subcat VARCHAR,
    code VARCHAR,
    print_number BIGINT,
    canvas_width BIGINT,
    canvas_height BIGINT,
    description VARCHAR,
    submitter_id VARCHAR,
    submitter_name VARCHAR,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
)";

const COLUMNS: &str = "id, name, image_url, item_type, category, idol_name, group_name, \
     theme, subcat, code, print_number, canvas_width, canvas_height, description, \
     submitter_id, submitter_name, created_at, updated_at";

// ---------------------------------------------------------------------------
// CustomStore
// ---------------------------------------------------------------------------

/// Read side of the persisted store, as seen by the merge.
pub trait CustomStore {
    /// Every persisted document, attributable or not.
    fn list_all(&self) -> Result<Vec<Card>>;
}

impl<T: CustomStore + ?Sized> CustomStore for &T {
    fn list_all(&self) -> Result<Vec<Card>> {
        (**self).list_all()
    }
}

// ---------------------------------------------------------------------------
// CardStore
// ---------------------------------------------------------------------------

/// Wraps a DuckDB connection holding the `customs` table.
pub struct CardStore {
    conn: DuckDbConnection,
}

impl CardStore {
    /// Open (or create) a store backed by a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::init(DuckDbConnection::open(path)?)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(DuckDbConnection::open_in_memory()?)
    }

    fn init(conn: DuckDbConnection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// List every custom, newest first.
    pub fn list_all(&self) -> Result<Vec<Card>> {
        let rows: Vec<CustomRow> = self.execute_into(
            &format!("SELECT {COLUMNS} FROM customs ORDER BY created_at DESC, id DESC"),
            &[],
        )?;
        rows.into_iter().map(Card::try_from).collect()
    }

    /// Retrieve a single custom by id.
    pub fn get(&self, id: &str) -> Result<Option<Card>> {
        let rows: Vec<CustomRow> = self.execute_into(
            &format!("SELECT {COLUMNS} FROM customs WHERE id = ? LIMIT 1"),
            &[id.to_string()],
        )?;
        rows.into_iter().next().map(Card::try_from).transpose()
    }

    /// Number of stored customs.
    pub fn count(&self) -> Result<usize> {
        let count = self
            .execute_scalar("SELECT COUNT(*) FROM customs", &[])?
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Ok(count as usize)
    }

    /// Persist a new custom and return it with its assigned id and timestamps.
    pub fn create(&self, data: NewCustomCard) -> Result<Card> {
        data.validate()?;
        let stamped_at = now();
        let card = Card {
            id: uuid::Uuid::now_v7().to_string(),
            name: data.name,
            image_url: data.image_url,
            item_type: data.item_type,
            category: data.category,
            idol_name: data.idol_name,
            group: data.group,
            theme: data.theme,
            subcat: data.subcat,
            code: data.code,
            print_number: Some(data.print_number.unwrap_or(1)),
            canvas_width: data.canvas_width,
            canvas_height: data.canvas_height,
            description: data.description,
            submitter_id: data.submitter_id,
            submitter_name: data.submitter_name,
            created_at: stamped_at,
            updated_at: stamped_at,
        };
        self.insert(&card)?;
        Ok(card)
    }

    /// Apply a partial update. Returns `None` if no custom has that id.
    pub fn update(&self, id: &str, data: CustomCardUpdate) -> Result<Option<Card>> {
        data.validate()?;
        let Some(mut card) = self.get(id)? else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            card.name = name;
        }
        if let Some(image_url) = data.image_url {
            card.image_url = image_url;
        }
        if let Some(item_type) = data.item_type {
            card.item_type = item_type;
        }
        if let Some(category) = data.category {
            card.category = category;
        }
        card.idol_name = data.idol_name.or(card.idol_name);
        card.group = data.group.or(card.group);
        card.theme = data.theme.or(card.theme);
        card.subcat = data.subcat.or(card.subcat);
        card.code = data.code.or(card.code);
        card.canvas_width = data.canvas_width.or(card.canvas_width);
        card.canvas_height = data.canvas_height.or(card.canvas_height);
        card.description = data.description.or(card.description);
        card.updated_at = now().max(card.created_at);

        self.conn.execute(
            "UPDATE customs SET name = ?, image_url = ?, item_type = ?, category = ?, \
             idol_name = ?, group_name = ?, theme = ?, subcat = ?, code = ?, \
             canvas_width = ?, canvas_height = ?, description = ?, updated_at = ? \
             WHERE id = ?",
            params![
                card.name,
                serde_json::to_string(&card.image_url)?,
                card.item_type.as_str(),
                card.category.as_str(),
                card.idol_name,
                card.group,
                card.theme,
                card.subcat,
                card.code,
                card.canvas_width.map(i64::from),
                card.canvas_height.map(i64::from),
                card.description,
                timestamp(&card.updated_at),
                card.id,
            ],
        )?;
        Ok(Some(card))
    }

    /// Delete a custom. Returns whether a row was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM customs WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }

    /// Insert a fully formed card as-is, keeping its id and timestamps.
    ///
    /// Used when importing customs from another store.
    pub fn insert(&self, card: &Card) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO customs ({COLUMNS}) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                card.id,
                card.name,
                serde_json::to_string(&card.image_url)?,
                card.item_type.as_str(),
                card.category.as_str(),
                card.idol_name,
                card.group,
                card.theme,
                card.subcat,
                card.code,
                card.print_number.map(i64::from),
                card.canvas_width.map(i64::from),
                card.canvas_height.map(i64::from),
                card.description,
                card.submitter_id,
                card.submitter_name,
                timestamp(&card.created_at),
                timestamp(&card.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available after the query has executed
        let column_names: Vec<String> = rows
            .as_ref()
            .map(|s| {
                s.column_names()
                    .into_iter()
                    .map(|n| n.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows.next()? {
            let mut map = HashMap::new();
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }
}

impl CustomStore for CardStore {
    fn list_all(&self) -> Result<Vec<Card>> {
        CardStore::list_all(self)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// A `customs` row as read back from DuckDB.
#[derive(Debug, Deserialize)]
struct CustomRow {
    id: String,
    name: String,
    image_url: String,
    item_type: String,
    category: String,
    idol_name: Option<String>,
    group_name: Option<String>,
    theme: Option<String>,
    subcat: Option<String>,
    code: Option<String>,
    print_number: Option<u32>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
    description: Option<String>,
    submitter_id: Option<String>,
    submitter_name: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CustomRow> for Card {
    type Error = GalleryError;

    fn try_from(row: CustomRow) -> Result<Self> {
        let image_url: ImageRef = serde_json::from_str(&row.image_url)?;
        Ok(Card {
            id: row.id,
            name: row.name,
            image_url,
            item_type: serde_json::from_value(serde_json::Value::String(row.item_type))?,
            category: serde_json::from_value(serde_json::Value::String(row.category))?,
            idol_name: row.idol_name,
            group: row.group_name,
            theme: row.theme,
            subcat: row.subcat,
            code: row.code,
            print_number: row.print_number,
            canvas_width: row.canvas_width,
            canvas_height: row.canvas_height,
            description: row.description,
            submitter_id: row.submitter_id,
            submitter_name: row.submitter_name,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Current time at the precision the table stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text order matches chronological order.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| GalleryError::InvalidArgument(format!("Bad timestamp '{}': {}", raw, e)))
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        _ => serde_json::Value::Null,
    }
}
