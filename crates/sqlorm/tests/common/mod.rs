#![allow(dead_code)]

use sqlorm::prelude::*;
use sqlorm::BindMap;
use sqlorm_sqlite::SqliteConnection;

#[derive(Debug)]
pub struct BlogModel {
    pub id: IntField,
    pub title: StringField,
    state: ModelState,
}

impl Model for BlogModel {
    fn from_row(row: &Row) -> Result<Self> {
        let mut fields = FieldRegistrar::<Self>::new(row);
        Ok(Self {
            id: fields.int("id", |c| c.size(11).unsigned().autoincrement())?,
            title: fields.varchar("title", |c| c.size(100).default_value(""))?,
            state: fields.finish(),
        })
    }

    model_fields!(state; id, title);
}

/// One field of every remaining kind.
#[derive(Debug)]
pub struct PostModel {
    pub id: IntField,
    pub blog_id: IntField,
    pub published: BoolField,
    pub created_at: DateTimeField,
    pub price: FloatField,
    pub tags: SetField,
    pub meta: JsonField,
    pub status: EnumField,
    pub digest: BinaryField,
    state: ModelState,
}

impl Model for PostModel {
    fn from_row(row: &Row) -> Result<Self> {
        let mut fields = FieldRegistrar::<Self>::new(row);
        Ok(Self {
            id: fields.big_int("id", |c| c.unsigned().autoincrement())?,
            blog_id: fields.int("blog_id", |c| c.size(11).unsigned())?,
            published: fields.bool("published", |c| c.default_value("0"))?,
            created_at: fields.datetime("created_at", |c| c.nullable(true))?,
            price: fields.decimal("price", |c| c.decimal(10, 2).nullable(true))?,
            tags: fields.set("tags", |c| c.options(["news", "tech", "life"]).nullable(true))?,
            meta: fields.json("meta", |c| c.nullable(true))?,
            status: fields.enumeration("status", |c| {
                c.options(["draft", "live"]).default_value("draft")
            })?,
            digest: fields.binary("digest", |c| c.size(4).nullable(true))?,
            state: fields.finish(),
        })
    }

    fn relations() -> Vec<ForeignKey> {
        vec![ForeignKey::new("post_blog", ["blog_id"], "blog", ["id"])]
    }

    model_fields!(state; id, blog_id, published, created_at, price, tags, meta, status, digest);
}

/// An in-memory database with the `blog` and `post` tables.
pub fn open_db() -> SqliteConnection {
    let conn = SqliteConnection::open_memory().unwrap();
    create_table::<BlogModel, _>(&conn, Dialect::Sqlite).unwrap();
    create_table::<PostModel, _>(&conn, Dialect::Sqlite).unwrap();
    conn
}

/// Insert a blog row directly, bypassing the model layer.
pub fn seed_blog(conn: &SqliteConnection, id: i64, title: &str) {
    let mut binds = BindMap::new();
    binds.insert("id".to_string(), Value::Int(id));
    binds.insert("title".to_string(), Value::from(title));
    conn.execute("INSERT INTO blog (id, title) VALUES (:id, :title)", &binds)
        .unwrap();
}

pub fn count_blogs(conn: &SqliteConnection) -> i64 {
    conn.query_one("SELECT COUNT(*) AS n FROM blog", &BindMap::new())
        .unwrap()
        .and_then(|row| row.get_by_name("n").and_then(Value::as_i64))
        .unwrap()
}
