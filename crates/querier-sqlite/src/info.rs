//! Schema introspection for SQLite.

use async_trait::async_trait;
use querier_core::{append_to, Querier, Result};
use querier_migrate::DbInfo;

use crate::dialect::SqliteDialect;

#[async_trait]
impl DbInfo for SqliteDialect {
    async fn has_table(&self, q: &mut Querier<'_>, table: &str) -> Result<bool> {
        let mut exists = false;
        q.write("SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table'")
            .write_with("AND name = ?)", [table]);
        q.scan(&mut [&mut exists]).await?;
        Ok(exists)
    }

    async fn table_columns(&self, q: &mut Querier<'_>, table: &str) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        q.write_with("SELECT name FROM pragma_table_info(?)", [table]);
        q.for_each(append_to(&mut columns)).await?;
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteExecutor;

    #[tokio::test]
    async fn test_introspection() {
        let ex = SqliteExecutor::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        let dialect = SqliteDialect::new();
        let mut q = Querier::new(&ex, &dialect);

        assert!(!dialect.has_table(&mut q, "users").await.unwrap());
        q.reset();

        q.write("CREATE TABLE users (id INTEGER, name TEXT)");
        q.exec().await.unwrap();
        q.reset();

        assert!(dialect.has_table(&mut q, "users").await.unwrap());
        q.reset();

        let columns = dialect.table_columns(&mut q, "users").await.unwrap();
        assert_eq!(columns, ["id", "name"]);
        q.reset();

        let columns = dialect.table_columns(&mut q, "missing").await.unwrap();
        assert!(columns.is_empty());
    }
}
