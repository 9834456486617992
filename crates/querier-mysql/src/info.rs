//! Schema introspection through `information_schema`.

use async_trait::async_trait;
use querier_core::{append_to, Querier, Result};
use querier_migrate::DbInfo;

use crate::dialect::MySqlDialect;

#[async_trait]
impl DbInfo for MySqlDialect {
    async fn has_table(&self, q: &mut Querier<'_>, table: &str) -> Result<bool> {
        let mut exists = false;
        q.write("SELECT EXISTS ( SELECT table_name FROM information_schema.tables")
            .write("WHERE table_schema = (SELECT DATABASE())")
            .write_with("AND table_name = ? )", [table]);
        q.scan(&mut [&mut exists]).await?;
        Ok(exists)
    }

    async fn table_columns(&self, q: &mut Querier<'_>, table: &str) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        q.write("SELECT column_name FROM information_schema.columns")
            .write("WHERE table_schema = (SELECT DATABASE())")
            .write_with("AND table_name = ?", [table]);
        q.for_each(append_to(&mut columns)).await?;
        Ok(columns)
    }
}
