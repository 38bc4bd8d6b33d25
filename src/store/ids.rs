//! Sequential display ids for students (`s0001`) and professors (`i0001`).
//!
//! Allocation is an explicit call made inside the caller's transaction, before the
//! record is built. The `id_counters` row is bumped with a single atomic upsert, so two
//! allocations never hand out the same number; numbers are never reused.

use sqlx::SqliteConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Student,
    Professor,
}

impl IdKind {
    pub fn prefix(self) -> char {
        match self {
            IdKind::Student => 's',
            IdKind::Professor => 'i',
        }
    }

    fn table(self) -> &'static str {
        match self {
            IdKind::Student => "students",
            IdKind::Professor => "professors",
        }
    }

    fn counter_key(self) -> &'static str {
        self.table()
    }
}

pub fn format_id(prefix: char, n: i64) -> String {
    format!("{}{:04}", prefix, n)
}

/// Numeric part of `id` when it carries `prefix`.
pub fn parse_id(prefix: char, id: &str) -> Option<i64> {
    let rest = id.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Highest numeric suffix among existing ids of `kind`, 0 for an empty table.
async fn highest_existing(conn: &mut SqliteConnection, kind: IdKind) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT id FROM {} WHERE substr(id, 1, 1) = ?1", kind.table());
    let ids: Vec<String> = sqlx::query_scalar(&sql)
        .bind(kind.prefix().to_string())
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids.iter().filter_map(|id| parse_id(kind.prefix(), id)).max().unwrap_or(0))
}

/// Allocates the next id for `kind`.
pub async fn allocate(conn: &mut SqliteConnection, kind: IdKind) -> Result<String, sqlx::Error> {
    let highest = highest_existing(conn, kind).await?;
    let next: i64 = sqlx::query_scalar(
        r#"INSERT INTO id_counters (entity, last_value) VALUES (?1, ?2 + 1)
           ON CONFLICT(entity) DO UPDATE SET last_value = MAX(last_value, ?2) + 1
           RETURNING last_value"#,
    )
    .bind(kind.counter_key())
    .bind(highest)
    .fetch_one(&mut *conn)
    .await?;
    let id = format_id(kind.prefix(), next);
    tracing::debug!("Allocated {} id {}", kind.table(), id);
    Ok(id)
}
