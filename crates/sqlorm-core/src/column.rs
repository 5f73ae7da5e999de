//! Column descriptors.

use crate::error::{Error, Result, SchemaErrorKind};
use crate::types::SqlType;
use crate::validate::is_identifier;

/// Metadata about one table column.
///
/// Built once per (model type, column name) and shared by every field of
/// that column through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// SQL type family
    pub sql_type: SqlType,
    /// Display width / length (INT(11), VARCHAR(100), ...)
    pub size: Option<u32>,
    /// Total digits for DECIMAL
    pub precision: Option<u8>,
    /// Digits after the decimal point for DECIMAL
    pub scale: Option<u8>,
    pub unsigned: bool,
    pub zerofill: bool,
    pub nullable: bool,
    /// Default value as literal text (quoted by DDL when textual)
    pub default: Option<String>,
    pub autoincrement: bool,
    /// Allowed values for ENUM / SET
    pub options: Vec<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
    /// `DEFAULT CURRENT_TIMESTAMP` for DATETIME/TIMESTAMP
    pub default_timestamp: bool,
}

impl Column {
    /// Create a NOT NULL column with no size or default.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            size: None,
            precision: None,
            scale: None,
            unsigned: false,
            zerofill: false,
            nullable: false,
            default: None,
            autoincrement: false,
            options: Vec::new(),
            charset: None,
            collation: None,
            comment: None,
            default_timestamp: false,
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set precision and scale, e.g. `DECIMAL(10,2)`.
    pub fn decimal(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn zerofill(mut self) -> Self {
        self.zerofill = true;
        self
    }

    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn default_timestamp(mut self) -> Self {
        self.default_timestamp = true;
        self
    }

    /// Check the descriptor for structural mistakes.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::schema(SchemaErrorKind::InvalidColumn, message));

        if !is_identifier(&self.name) {
            return invalid(format!("invalid column name '{}'", self.name));
        }
        if self.sql_type.requires_size() && self.size.is_none() {
            return invalid(format!(
                "column '{}' of type {} requires a size",
                self.name,
                self.sql_type.sql_name()
            ));
        }
        if let (Some(size), Some(max)) = (self.size, self.sql_type.max_size()) {
            if size == 0 || size > max {
                return invalid(format!(
                    "column '{}' size {} is outside 1..={}",
                    self.name, size, max
                ));
            }
        }
        if let (Some(precision), Some(scale)) = (self.precision, self.scale) {
            if precision == 0 || precision > 65 || scale > precision {
                return invalid(format!(
                    "column '{}' has invalid DECIMAL({},{})",
                    self.name, precision, scale
                ));
            }
        }
        if self.sql_type.has_options() && self.options.is_empty() {
            return invalid(format!(
                "column '{}' of type {} requires at least one option",
                self.name,
                self.sql_type.sql_name()
            ));
        }
        if self.autoincrement && !self.sql_type.is_integer() {
            return invalid(format!(
                "column '{}' cannot autoincrement a {} value",
                self.name,
                self.sql_type.sql_name()
            ));
        }
        if self.default_timestamp
            && !matches!(self.sql_type, SqlType::DateTime | SqlType::Timestamp)
        {
            return invalid(format!(
                "column '{}' cannot default to CURRENT_TIMESTAMP",
                self.name
            ));
        }
        Ok(())
    }

    /// Full type text, e.g. `INT(11) UNSIGNED` or `ENUM('a','b')`.
    pub fn type_definition(&self) -> String {
        let base = self.sql_type.sql_name();
        let mut def = match self.sql_type {
            SqlType::Bool => format!("{}(1)", base),
            SqlType::Decimal => match (self.precision, self.scale) {
                (Some(p), Some(s)) => format!("{}({},{})", base, p, s),
                _ => base.to_string(),
            },
            SqlType::Enum | SqlType::Set => {
                let opts: Vec<String> = self
                    .options
                    .iter()
                    .map(|o| format!("'{}'", o.replace('\'', "''")))
                    .collect();
                format!("{}({})", base, opts.join(","))
            }
            _ => match self.size {
                Some(size) => format!("{}({})", base, size),
                None => base.to_string(),
            },
        };
        if self.unsigned {
            def.push_str(" UNSIGNED");
        }
        if self.zerofill {
            def.push_str(" ZEROFILL");
        }
        def
    }
}
