mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{BlogModel, PostModel, open_db, seed_blog};
use sqlorm::prelude::*;
use sqlorm::Statement;

#[test]
fn every_set_marks_field_and_model_dirty() {
    let mut post = PostModel::new().unwrap();
    assert!(!post.is_dirty());

    post.published.set(false);
    assert!(post.published.is_dirty());
    assert!(post.is_dirty());

    let mut blog = BlogModel::new_from_row(&Row::from_pairs([
        ("id", Value::Int(1)),
        ("title", Value::from("same")),
    ]))
    .unwrap();
    assert!(!blog.is_dirty());
    blog.title.set("same");
    assert!(blog.title.is_dirty());
    assert!(blog.is_dirty());
}

#[test]
fn undirty_clears_model_and_fields() {
    let mut post = PostModel::new().unwrap();
    post.tags.set(vec!["news".to_string()]);
    post.status.set("live");
    post.price.set(9.5);

    post.undirty();
    assert!(!post.is_dirty());
    assert!(post.fields().iter().all(|f| !f.is_dirty()));
    assert!(post.dirty_fields_to_query().is_empty());
}

#[test]
fn schema_is_shared_but_fields_are_not() {
    let row = Row::from_pairs([("id", Value::Int(1)), ("title", Value::from("t"))]);
    let mut a = BlogModel::new_from_row(&row).unwrap();
    let b = BlogModel::new_from_row(&row).unwrap();

    assert!(Arc::ptr_eq(&BlogModel::schema().unwrap(), &BlogModel::schema().unwrap()));
    assert_eq!(a.title.get(), b.title.get());

    a.title.set("changed");
    assert_eq!(b.title.get().as_deref(), Some("t"));
    assert!(!b.is_dirty());
}

#[test]
fn autoincrement_field_is_primary_key() {
    let post = PostModel::new().unwrap();
    assert_eq!(post.pk().unwrap().column_name(), "id");

    let blog = BlogModel::new().unwrap();
    assert_eq!(blog.pk().unwrap().column_name(), "id");
}

#[test]
fn empty_in_list_compares_against_current_value() {
    let mut blog = BlogModel::new().unwrap();
    blog.id.set(7);

    let empty = blog.id.is_in(Vec::new());
    let explicit = blog.id.is_in(vec![7]);
    assert_eq!(empty.cond(), explicit.cond());
    assert_eq!(empty.binds(), explicit.binds());
}

#[test]
fn comparison_values_are_not_replaced_by_current_value() {
    let mut post = PostModel::new().unwrap();
    post.published.set(true);
    post.blog_id.set(4);

    let by_false = post.published.eq(Some(false));
    assert_eq!(by_false.binds().get("published"), Some(&Value::Int(0)));
    let by_zero = post.blog_id.eq(Some(0));
    assert_eq!(by_zero.binds().get("blog_id"), Some(&Value::Int(0)));
    let current = post.blog_id.eq(None);
    assert_eq!(current.binds().get("blog_id"), Some(&Value::Int(4)));
}

#[test]
fn stored_post_round_trips_every_kind() {
    let conn = open_db();
    seed_blog(&conn, 1, "host");
    let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
    let created = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut post = PostModel::new().unwrap();
    post.blog_id.set(1);
    post.published.set(true);
    post.created_at.set(created);
    post.price.set(12.5);
    post.tags.set(vec!["news".to_string(), "tech".to_string()]);
    post.meta.set_json(&serde_json::json!({"views": 3}));
    post.status.set("live");
    post.digest.set(vec![0xde, 0xad, 0xbe, 0xef]);
    post.insert(&factory).unwrap();
    let id = post.id.get().unwrap();

    let mut select = PostModel::find(&factory, [post.id.eq(None)]).unwrap();
    let stored = select.first().unwrap();
    assert_eq!(stored.id.get(), Some(id));
    assert_eq!(stored.blog_id.get(), Some(1));
    assert_eq!(stored.published.get(), Some(true));
    assert_eq!(stored.created_at.get(), Some(created));
    assert_eq!(stored.price.get(), Some(12.5));
    assert_eq!(
        stored.tags.get(),
        Some(vec!["news".to_string(), "tech".to_string()])
    );
    assert_eq!(
        stored.meta.decode().unwrap(),
        Some(serde_json::json!({"views": 3}))
    );
    assert_eq!(stored.status.get().as_deref(), Some("live"));
    assert!(stored.status.is_valid_option());
    assert_eq!(stored.digest.get(), Some(vec![0xde, 0xad, 0xbe, 0xef]));
}

#[test]
fn text_values_are_coerced_on_hydration() {
    let post = PostModel::new_from_row(&Row::from_pairs([
        ("id", Value::from("3")),
        ("published", Value::from("1")),
        ("created_at", Value::from("2020-01-01 00:00:00")),
        ("price", Value::from("4.25")),
        ("tags", Value::from("life")),
    ]))
    .unwrap();

    assert_eq!(post.id.get(), Some(3));
    assert_eq!(post.published.get(), Some(true));
    assert_eq!(
        post.created_at.get(),
        NaiveDate::from_ymd_opt(2020, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    );
    assert_eq!(post.price.get(), Some(4.25));
    assert_eq!(post.tags.get(), Some(vec!["life".to_string()]));
    assert_eq!(post.meta.get(), None);
    assert!(!post.is_dirty());
}

#[test]
fn unparsable_value_is_type_error() {
    let err = PostModel::new_from_row(&Row::from_pairs([("published", Value::from("maybe"))]))
        .unwrap_err();
    match err {
        Error::Type(e) => assert_eq!(e.column.as_deref(), Some("published")),
        other => panic!("expected type error, got {other:?}"),
    }
}

#[test]
fn foreign_key_is_enforced() {
    let conn = open_db();
    let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);

    let mut post = PostModel::new().unwrap();
    post.blog_id.set(404);
    let err = post.insert(&factory).unwrap_err();
    assert!(err.is_insert_error());
    assert!(post.is_dirty());
}

#[test]
fn find_select_uses_declared_column_order() {
    let conn = open_db();
    let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
    let proto = PostModel::new().unwrap();

    let mut select = PostModel::find(&factory, [proto.status.eq(Some("live".to_string()))]).unwrap();
    assert!(select.all().unwrap().is_empty());
    let sql = select.statement().statement_text().unwrap();
    assert!(sql.starts_with("SELECT \"id\", \"blog_id\", \"published\", \"created_at\""));
    assert!(sql.ends_with("WHERE \"status\" = :status"));
}
