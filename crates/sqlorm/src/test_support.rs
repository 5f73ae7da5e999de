//! Fixture models and a scripted connection for unit tests.

use std::sync::Mutex;

use sqlorm_core::connection::{no_active_transaction, query_error, transaction_already_active};
use sqlorm_core::{
    BindMap, Connection, FieldRegistrar, IntField, Model, ModelState, Result, Row, StringField,
};

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

    sqlorm_core::model_fields!(state; id, title);
}

/// A model without any primary key.
#[derive(Debug)]
pub struct NoteModel {
    pub body: StringField,
    state: ModelState,
}

impl Model for NoteModel {
    fn from_row(row: &Row) -> Result<Self> {
        let mut fields = FieldRegistrar::<Self>::new(row);
        Ok(Self {
            body: fields.text("body", |c| c)?,
            state: fields.finish(),
        })
    }

    sqlorm_core::model_fields!(state; body);
}

/// Answers every call from a fixed script and records what it was sent.
#[derive(Debug, Default)]
pub struct Scripted {
    rows: Vec<Row>,
    insert_id: String,
    affected: u64,
    failure: Option<String>,
    log: Mutex<Vec<(String, BindMap)>>,
    in_tx: Mutex<bool>,
}

impl Scripted {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_insert_id(id: &str) -> Self {
        Self {
            insert_id: id.to_string(),
            affected: 1,
            ..Self::default()
        }
    }

    pub fn with_affected(affected: u64) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn binds(&self) -> Vec<BindMap> {
        self.log.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }

    fn record(&self, sql: &str, binds: &BindMap) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(query_error(message.as_str(), sql));
        }
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), binds.clone()));
        Ok(())
    }
}

impl Connection for Scripted {
    fn query(&self, sql: &str, binds: &BindMap) -> Result<Vec<Row>> {
        self.record(sql, binds)?;
        Ok(self.rows.clone())
    }

    fn execute(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        self.record(sql, binds)?;
        Ok(self.affected)
    }

    fn last_insert_id(&self) -> Result<String> {
        Ok(self.insert_id.clone())
    }

    fn begin(&self) -> Result<()> {
        let mut in_tx = self.in_tx.lock().unwrap();
        if *in_tx {
            return Err(transaction_already_active());
        }
        *in_tx = true;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut in_tx = self.in_tx.lock().unwrap();
        if !*in_tx {
            return Err(no_active_transaction("commit"));
        }
        *in_tx = false;
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut in_tx = self.in_tx.lock().unwrap();
        if !*in_tx {
            return Err(no_active_transaction("rollback"));
        }
        *in_tx = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        *self.in_tx.lock().unwrap()
    }
}
