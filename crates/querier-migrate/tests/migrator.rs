//! Tests for the migrator against an in-memory fake database.
//!
//! The fake executor keeps a schema (table name to column names), applies
//! `CREATE TABLE`, `ALTER TABLE ... ADD` and `DROP TABLE` to it, and answers
//! the two introspection queries issued by `FakeInfo`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Mutex;

use querier_core::{
    append_to, async_trait, DefaultDialect, Dialect, Error, ExecResult, Executor, FieldDescriptor,
    Querier, Record, Rows, SqlValue, ValueType,
};
use querier_derive::Record;
use querier_migrate::{DbInfo, MigrateError, MigrateEvent, Migrator, Model};

// =============================================================================
// Fake database
// =============================================================================

#[derive(Default)]
struct FakeDb {
    schema: Mutex<BTreeMap<String, Vec<String>>>,
    log: Mutex<Vec<String>>,
    fail_on: Mutex<Option<&'static str>>,
}

impl FakeDb {
    fn failing_on(pattern: &'static str) -> Self {
        Self {
            fail_on: Mutex::new(Some(pattern)),
            ..Self::default()
        }
    }

    fn with_table(self, table: &str, columns: &[&str]) -> Self {
        self.schema.lock().unwrap().insert(
            table.to_string(),
            columns.iter().map(ToString::to_string).collect(),
        );
        self
    }

    fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    fn fails(&self, sql: &str) -> bool {
        self.fail_on
            .lock()
            .unwrap()
            .is_some_and(|pattern| sql.contains(pattern))
    }

    fn ddl(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| !sql.starts_with("SELECT"))
            .cloned()
            .collect()
    }

    fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.schema.lock().unwrap().get(table).cloned()
    }

    fn apply(&self, sql: &str) {
        let mut schema = self.schema.lock().unwrap();
        let words: Vec<&str> = sql.split_whitespace().collect();
        match words.as_slice() {
            ["CREATE", "TABLE", table, ..] => {
                let body = sql
                    .split_once('(')
                    .map_or("", |(_, rest)| rest.strip_suffix(')').unwrap_or(rest));
                let columns = body
                    .split(", ")
                    .filter_map(|def| def.split_whitespace().next())
                    .filter(|name| *name != "PRIMARY")
                    .map(ToString::to_string)
                    .collect();
                schema.insert((*table).to_string(), columns);
            }
            ["ALTER", "TABLE", table, "ADD", column, ..] => {
                if let Some(columns) = schema.get_mut(*table) {
                    columns.push((*column).to_string());
                }
            }
            ["DROP", "TABLE", table] => {
                schema.remove(*table);
            }
            _ => {}
        }
    }
}

#[async_trait]
impl Executor for FakeDb {
    async fn execute(&self, sql: &str, _params: &[SqlValue]) -> querier_core::Result<ExecResult> {
        self.log.lock().unwrap().push(sql.to_string());
        if self.fails(sql) {
            return Err(Error::executor(std::io::Error::other("disk full")));
        }
        self.apply(sql);
        Ok(ExecResult::default())
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> querier_core::Result<Rows> {
        self.log.lock().unwrap().push(sql.to_string());
        let Some(SqlValue::Text(table)) = params.first() else {
            return Err(Error::callback("missing table parameter"));
        };
        if self.fails(sql) {
            return Err(Error::executor(std::io::Error::other("connection lost")));
        }
        let columns = self.columns(table);
        let rows = if sql.starts_with("SELECT EXISTS") {
            Rows::new(
                vec!["exists".into()],
                vec![vec![SqlValue::Bool(columns.is_some())]],
            )
        } else {
            Rows::new(
                vec!["column_name".into()],
                columns
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| vec![SqlValue::Text(c)])
                    .collect(),
            )
        };
        Ok(rows)
    }
}

struct FakeInfo;

impl Dialect for FakeInfo {
    fn type_map(&self, ty: &ValueType) -> Option<Cow<'static, str>> {
        DefaultDialect::new().type_map(ty)
    }
}

#[async_trait]
impl DbInfo for FakeInfo {
    async fn has_table(&self, q: &mut Querier<'_>, table: &str) -> querier_core::Result<bool> {
        let mut exists = false;
        q.write_with("SELECT EXISTS (SELECT 1 FROM tables WHERE name = ?)", [table])
            .scan(&mut [&mut exists])
            .await?;
        Ok(exists)
    }

    async fn table_columns(
        &self,
        q: &mut Querier<'_>,
        table: &str,
    ) -> querier_core::Result<Vec<String>> {
        let mut columns = Vec::new();
        q.write_with("SELECT column_name FROM columns WHERE table_name = ?", [table])
            .for_each(append_to(&mut columns))
            .await?;
        Ok(columns)
    }
}

// =============================================================================
// Models
// =============================================================================

#[allow(dead_code)]
#[derive(Default, Record)]
struct User {
    #[db("ID")]
    id: i64,
    #[db("Name")]
    name: String,
}

#[allow(dead_code)]
#[derive(Default, Record)]
struct Post {
    id: i64,
    title: String,
    #[db(",TEXT NULL")]
    body: Option<String>,
    #[db("-")]
    draft: bool,
}

struct Table {
    name: &'static str,
    fields: &'static [FieldDescriptor],
    primary_key: Option<&'static str>,
    events: Mutex<Vec<String>>,
    fail_callback: bool,
}

impl Table {
    fn new<R: Record>(name: &'static str) -> Self {
        Self {
            name,
            fields: R::FIELDS,
            primary_key: None,
            events: Mutex::new(Vec::new()),
            fail_callback: false,
        }
    }

    fn primary_key(mut self, column: &'static str) -> Self {
        self.primary_key = Some(column);
        self
    }

    fn failing_callback(mut self) -> Self {
        self.fail_callback = true;
        self
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Model for Table {
    fn table_name(&self) -> &str {
        self.name
    }

    fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    fn create_table(&self, q: &mut Querier<'_>) {
        if let Some(column) = self.primary_key {
            q.write(format!("PRIMARY KEY ({column})"));
        }
    }

    async fn migrate(
        &self,
        _q: &mut Querier<'_>,
        event: MigrateEvent<'_>,
    ) -> querier_core::Result<()> {
        self.events.lock().unwrap().push(format!("{event:?}"));
        if self.fail_callback {
            return Err(Error::callback("backfill failed"));
        }
        Ok(())
    }
}

// =============================================================================
// Test: create and diff
// =============================================================================

#[tokio::test]
async fn test_create_then_idempotent() {
    let db = FakeDb::default();
    let users = Table::new::<User>("users").primary_key("ID");
    let migrator = Migrator::new(&db, FakeInfo);

    let result = migrator.migrate(&[&users]).await.unwrap();
    assert_eq!(result.tables_created, ["users"]);
    assert!(result.new_columns.is_empty());
    assert_eq!(
        db.ddl(),
        ["CREATE TABLE users ( ID BIGINT NOT NULL, Name VARCHAR(255) NOT NULL, PRIMARY KEY (ID))"]
    );
    assert_eq!(result.statements, db.ddl());
    assert_eq!(users.events(), ["Created"]);
    assert_eq!(db.columns("users").unwrap(), ["ID", "Name"]);

    let again = migrator.migrate(&[&users]).await.unwrap();
    assert!(again.is_empty());
    assert!(again.statements.is_empty());
    assert_eq!(db.ddl().len(), 1);
    assert_eq!(users.events().len(), 1);
}

#[tokio::test]
async fn test_one_new_column_issues_one_alter() {
    let db = FakeDb::default().with_table("users", &["ID"]);
    let users = Table::new::<User>("users");
    let migrator = Migrator::new(&db, FakeInfo);

    let result = migrator.migrate(&[&users]).await.unwrap();
    assert!(result.tables_created.is_empty());
    assert_eq!(result.new_columns, ["users.Name"]);
    assert_eq!(db.ddl(), ["ALTER TABLE users ADD Name VARCHAR(255) NOT NULL"]);
    assert_eq!(users.events(), [r#"AddedColumn("Name")"#]);
}

#[tokio::test]
async fn test_override_type_and_ignored_fields() {
    let db = FakeDb::default().with_table("posts", &["id", "title"]);
    let posts = Table::new::<Post>("posts");
    let migrator = Migrator::new(&db, FakeInfo);

    let result = migrator.migrate(&[&posts]).await.unwrap();
    assert_eq!(result.new_columns, ["posts.body"]);
    assert_eq!(db.ddl(), ["ALTER TABLE posts ADD body TEXT NULL"]);
}

#[tokio::test]
async fn test_models_run_in_order() {
    let db = FakeDb::default().with_table("users", &["ID", "Name"]);
    let users = Table::new::<User>("users");
    let posts = Table::new::<Post>("posts");
    let migrator = Migrator::new(&db, FakeInfo);

    let result = migrator.migrate(&[&posts, &users]).await.unwrap();
    assert_eq!(result.tables_created, ["posts"]);
    assert_eq!(
        db.ddl(),
        ["CREATE TABLE posts ( id BIGINT NOT NULL, title VARCHAR(255) NOT NULL, body TEXT NULL)"]
    );
}

// =============================================================================
// Test: failures
// =============================================================================

#[tokio::test]
async fn test_alter_failure_names_the_column() {
    let db = FakeDb::failing_on("ADD body").with_table("posts", &["id"]);
    let posts = Table::new::<Post>("posts");
    let migrator = Migrator::new(&db, FakeInfo);

    let err = migrator.migrate(&[&posts]).await.unwrap_err();
    assert!(matches!(
        &err,
        MigrateError::Column { table, column, .. } if table == "posts" && column == "body"
    ));
    assert_eq!(
        err.to_string(),
        "migration table posts, column body: executor error: disk full"
    );
    // The column before the failure stays added.
    assert_eq!(db.columns("posts").unwrap(), ["id", "title"]);
    assert_eq!(posts.events(), [r#"AddedColumn("title")"#]);
}

#[tokio::test]
async fn test_rerun_resumes_after_failed_column() {
    let db = FakeDb::failing_on("ADD body").with_table("posts", &["id"]);
    let posts = Table::new::<Post>("posts");
    let migrator = Migrator::new(&db, FakeInfo);

    migrator.migrate(&[&posts]).await.unwrap_err();
    let ddl_before = db.ddl().len();
    let events_before = posts.events().len();

    db.clear_failure();
    let result = migrator.migrate(&[&posts]).await.unwrap();
    assert!(result.tables_created.is_empty());
    assert_eq!(result.new_columns, ["posts.body"]);
    assert_eq!(
        db.ddl()[ddl_before..].to_vec(),
        ["ALTER TABLE posts ADD body TEXT NULL"]
    );
    assert!(db.ddl()[ddl_before..].iter().all(|sql| !sql.contains("title")));
    assert_eq!(
        posts.events()[events_before..].to_vec(),
        [r#"AddedColumn("body")"#]
    );
    assert_eq!(db.columns("posts").unwrap(), ["id", "title", "body"]);
}

#[tokio::test]
async fn test_callback_failure_is_wrapped() {
    let db = FakeDb::default().with_table("users", &["ID"]);
    let users = Table::new::<User>("users").failing_callback();
    let migrator = Migrator::new(&db, FakeInfo);

    let err = migrator.migrate(&[&users]).await.unwrap_err();
    assert_eq!(err.table_name(), "users");
    assert_eq!(err.column_name(), Some("Name"));
    assert!(matches!(err.inner(), Error::Callback(msg) if msg == "backfill failed"));
}

#[tokio::test]
async fn test_introspection_failure_is_wrapped() {
    let db = FakeDb::failing_on("SELECT EXISTS");
    let users = Table::new::<User>("users");
    let migrator = Migrator::new(&db, FakeInfo);

    let err = migrator.migrate(&[&users]).await.unwrap_err();
    assert!(matches!(err, MigrateError::Table { ref table, .. } if table == "users"));
    assert!(db.ddl().is_empty());
}

#[tokio::test]
async fn test_first_failure_aborts_the_batch() {
    let db = FakeDb::failing_on("CREATE TABLE posts");
    let users = Table::new::<User>("users");
    let posts = Table::new::<Post>("posts");
    let migrator = Migrator::new(&db, FakeInfo);

    let err = migrator.migrate(&[&posts, &users]).await.unwrap_err();
    assert_eq!(err.table_name(), "posts");
    assert!(db.columns("users").is_none());
    assert!(db.log.lock().unwrap().iter().all(|sql| !sql.contains("users")));
}

// =============================================================================
// Test: drop and dry run
// =============================================================================

#[tokio::test]
async fn test_drop_stops_at_first_failure() {
    let db = FakeDb::failing_on("DROP TABLE posts")
        .with_table("users", &["ID"])
        .with_table("posts", &["id"])
        .with_table("tags", &["id"]);
    let migrator = Migrator::new(&db, FakeInfo);
    let users = Table::new::<User>("users");
    let posts = Table::new::<Post>("posts");
    let tags = Table::new::<Post>("tags");

    let err = migrator.drop(&[&users, &posts, &tags]).await.unwrap_err();
    assert_eq!(err.to_string(), "migration table posts: executor error: disk full");
    assert_eq!(db.ddl(), ["DROP TABLE users", "DROP TABLE posts"]);
    assert!(db.columns("users").is_none());
    assert!(db.columns("tags").is_some());
}

#[tokio::test]
async fn test_dry_run_plans_without_executing() {
    let db = FakeDb::default().with_table("users", &["ID"]);
    let users = Table::new::<User>("users");
    let posts = Table::new::<Post>("posts");
    let migrator = Migrator::new(&db, FakeInfo).dry_run(true);

    let result = migrator.migrate(&[&users, &posts]).await.unwrap();
    assert_eq!(result.tables_created, ["posts"]);
    assert_eq!(result.new_columns, ["users.Name"]);
    assert_eq!(
        result.statements,
        [
            "ALTER TABLE users ADD Name VARCHAR(255) NOT NULL",
            "CREATE TABLE posts ( id BIGINT NOT NULL, title VARCHAR(255) NOT NULL, body TEXT NULL)",
        ]
    );
    assert!(db.ddl().is_empty());
    assert!(users.events().is_empty());
    assert!(posts.events().is_empty());
}
