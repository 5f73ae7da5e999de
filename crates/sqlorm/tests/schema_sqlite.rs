mod common;

use std::sync::Arc;

use common::{BlogModel, PostModel, count_blogs};
use sqlorm::prelude::*;
use sqlorm::{TableSchema, drop_table};
use sqlorm_sqlite::SqliteConnection;

struct BlogApp;

impl Database for BlogApp {
    const NAME: &'static str = "blog_app";

    fn tables() -> Result<Vec<Arc<TableSchema>>> {
        Ok(vec![BlogModel::schema()?, PostModel::schema()?])
    }
}

#[test]
fn create_database_builds_every_table() {
    let conn = SqliteConnection::open_memory().unwrap();
    create_database::<BlogApp, _>(&conn, Dialect::Sqlite).unwrap();
    let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);

    let mut blog = BlogModel::new().unwrap();
    blog.title.set("schema");
    blog.insert(&factory).unwrap();

    let mut post = PostModel::new().unwrap();
    post.blog_id.set(blog.id.get().unwrap());
    post.insert(&factory).unwrap();

    let mut select = PostModel::find(&factory, [post.id.eq(None)]).unwrap();
    let stored = select.first().unwrap();
    assert_eq!(stored.status.get().as_deref(), Some("draft"));
    assert_eq!(stored.published.get(), Some(false));
    assert_eq!(count_blogs(&conn), 1);
}

#[test]
fn database_schema_lists_tables_in_order() {
    let schema = BlogApp::schema().unwrap();
    assert_eq!(schema.name(), "blog_app");
    assert_eq!(
        schema.tables().iter().map(|t| t.name()).collect::<Vec<_>>(),
        ["blog", "post"]
    );
}

#[test]
fn create_table_is_idempotent_and_drop_removes_it() {
    let conn = SqliteConnection::open_memory().unwrap();
    create_table::<BlogModel, _>(&conn, Dialect::Sqlite).unwrap();
    create_table::<BlogModel, _>(&conn, Dialect::Sqlite).unwrap();

    drop_table::<BlogModel, _>(&conn, Dialect::Sqlite).unwrap();
    let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
    let proto = BlogModel::new().unwrap();
    let mut select = BlogModel::find(&factory, [proto.id.eq(Some(1))]).unwrap();
    assert!(matches!(select.all(), Err(Error::Query(_))));
}
