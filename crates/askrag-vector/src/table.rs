//! LanceDB connection and table housekeeping helpers.

use std::sync::Arc;

use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection};

use askrag_core::error::{Error, Result};

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(Error::index)
}

/// Cheap existence check against the store's table listing.
pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(Error::index)?;
    Ok(names.contains(&name.to_string()))
}

/// Create `name` as an empty table (0 rows) when it does not exist yet.
pub async fn ensure_table(
    conn: &Connection,
    name: &str,
    schema: Arc<arrow_schema::Schema>,
) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    conn.create_table(name, Box::new(iter))
        .execute()
        .await
        .map_err(Error::index)?;
    Ok(())
}
