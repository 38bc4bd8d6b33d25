//! Data access for the five record tables.
//!
//! Every function takes a `&mut SqliteConnection` so handlers can run several
//! statements inside one transaction (`&mut *tx`). Missing primary keys surface as
//! [`AppError::NotFound`](crate::error::AppError::NotFound).

pub mod courses;
pub mod enrollments;
pub mod ids;
pub mod payments;
pub mod professors;
mod seed;
pub mod students;

pub use seed::seed;

use sqlx::SqliteConnection;

use crate::config::DeletePolicy;
use crate::error::{AppError, AppResult};

/// Counts rows of `table` whose text `column` equals `value`.
pub(crate) async fn count_text(conn: &mut SqliteConnection, table: &str, column: &str, value: &str) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column);
    let n: i64 = sqlx::query_scalar(&sql).bind(value).fetch_one(&mut *conn).await?;
    Ok(n)
}

/// Counts rows of `table` whose integer `column` equals `value`.
pub(crate) async fn count_int(conn: &mut SqliteConnection, table: &str, column: &str, value: i64) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column);
    let n: i64 = sqlx::query_scalar(&sql).bind(value).fetch_one(&mut *conn).await?;
    Ok(n)
}

/// Dependents of a record, as `(table, count)` pairs with a non-zero count.
pub(crate) type Dependents = Vec<(&'static str, i64)>;

/// Applies `policy` before a delete. `Reject` fails with a conflict when anything
/// depends on the record; `Cascade` and `Orphan` let the caller proceed.
pub(crate) fn check_policy(policy: DeletePolicy, entity: &str, id: &str, deps: &Dependents) -> AppResult<()> {
    if policy != DeletePolicy::Reject || deps.is_empty() {
        return Ok(());
    }
    let listing: Vec<String> = deps.iter().map(|(t, n)| format!("{} {}", n, t)).collect();
    Err(AppError::Conflict(format!(
        "{} {} is still referenced by {}",
        entity,
        id,
        listing.join(", ")
    )))
}

pub(crate) fn non_zero(pairs: [(&'static str, i64); 2]) -> Dependents {
    pairs.into_iter().filter(|(_, n)| *n > 0).collect()
}
