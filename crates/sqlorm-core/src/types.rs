//! SQL type families.

/// SQL type family of a column.
///
/// Sizes, precision and enum/set options live on the
/// [`Column`](crate::column::Column) so one family covers every width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    // Integer types
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,

    // Boolean (stored as TINYINT(1))
    Bool,

    // Floating point / fixed precision
    Float,
    Double,
    Decimal,

    // String types
    Char,
    VarChar,
    Text,

    // Binary types
    Binary,
    VarBinary,
    Blob,

    // Date/time types
    Date,
    DateTime,
    Timestamp,
    Year,

    // Structured
    Json,
    Enum,
    Set,
}

impl SqlType {
    /// Get the SQL type keyword for this family.
    pub const fn sql_name(self) -> &'static str {
        match self {
            SqlType::TinyInt | SqlType::Bool => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::MediumInt => "MEDIUMINT",
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::Text => "TEXT",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::Blob => "BLOB",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Year => "YEAR",
            SqlType::Json => "JSON",
            SqlType::Enum => "ENUM",
            SqlType::Set => "SET",
        }
    }

    /// Check if this type is an integer family (autoincrement capable).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            SqlType::TinyInt
                | SqlType::SmallInt
                | SqlType::MediumInt
                | SqlType::Int
                | SqlType::BigInt
        )
    }

    /// Check if this type is numeric.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, SqlType::Float | SqlType::Double | SqlType::Decimal)
    }

    /// Check if this type is text-based.
    pub const fn is_text(self) -> bool {
        matches!(self, SqlType::Char | SqlType::VarChar | SqlType::Text)
    }

    /// Check if this type is a date/time type.
    pub const fn is_temporal(self) -> bool {
        matches!(
            self,
            SqlType::Date | SqlType::DateTime | SqlType::Timestamp | SqlType::Year
        )
    }

    /// Whether a column of this family must declare a size.
    pub const fn requires_size(self) -> bool {
        matches!(
            self,
            SqlType::Char | SqlType::VarChar | SqlType::Binary | SqlType::VarBinary
        )
    }

    /// Whether a column of this family carries an option list.
    pub const fn has_options(self) -> bool {
        matches!(self, SqlType::Enum | SqlType::Set)
    }

    /// Upper bound for the declared size, if the family has one.
    pub const fn max_size(self) -> Option<u32> {
        match self {
            SqlType::Char | SqlType::Binary => Some(255),
            SqlType::VarChar | SqlType::VarBinary => Some(65_535),
            SqlType::TinyInt
            | SqlType::SmallInt
            | SqlType::MediumInt
            | SqlType::Int
            | SqlType::BigInt => Some(255),
            _ => None,
        }
    }
}
