//! Column types and primary key storage.

use serde::Serialize;

/// How a primary key is generated and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyStorage {
    /// Auto-incrementing big integer.
    AutoIncrement,
    /// UUID string.
    Uuid,
    /// Any other declared type.
    Custom,
}

impl KeyStorage {
    /// Name used in messages and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStorage::AutoIncrement => "autoIncrement",
            KeyStorage::Uuid => "uuid",
            KeyStorage::Custom => "custom",
        }
    }
}

impl std::fmt::Display for KeyStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column type with its arguments, e.g. `decimal:8,2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnType {
    /// Type name.
    pub name: String,
    /// Type arguments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ColumnType {
    /// Create a type without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Set type arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn string() -> Self {
        Self::new("string")
    }

    pub fn uuid() -> Self {
        Self::new("uuid")
    }

    pub fn big_increments() -> Self {
        Self::new("bigIncrements")
    }

    pub fn unsigned_big_integer() -> Self {
        Self::new("unsignedBigInteger")
    }

    /// Type a column referencing a column of this type should have.
    ///
    /// Incrementing types map to their unsigned integer counterparts; every
    /// other type is referenced as is.
    pub fn referencing(&self) -> Self {
        let name = match self.name.as_str() {
            "id" | "bigIncrements" => "unsignedBigInteger",
            "increments" => "unsignedInteger",
            "mediumIncrements" => "unsignedMediumInteger",
            "smallIncrements" => "unsignedSmallInteger",
            "tinyIncrements" => "unsignedTinyInteger",
            _ => return self.clone(),
        };
        Self::new(name)
    }

    /// Check whether this is an auto-incrementing type.
    pub fn is_incrementing(&self) -> bool {
        matches!(
            self.name.as_str(),
            "id" | "bigIncrements" | "increments" | "mediumIncrements" | "smallIncrements" | "tinyIncrements"
        )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.args.join(","))
        }
    }
}

/// Default name of an auto-incrementing key.
pub const DEFAULT_ID: &str = "id";

/// Default name of a uuid key declared with `uuid: null`.
pub const DEFAULT_UUID: &str = "uuid";

/// Primary key of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryKey {
    /// Column name.
    pub name: String,
    /// Storage class.
    pub storage: KeyStorage,
    /// Declared column type.
    pub column_type: ColumnType,
    /// Whether the key was declared rather than implied.
    pub explicit: bool,
}

impl PrimaryKey {
    /// Create an implicit auto-incrementing `id` key.
    pub fn implicit() -> Self {
        Self {
            name: DEFAULT_ID.to_string(),
            storage: KeyStorage::AutoIncrement,
            column_type: ColumnType::big_increments(),
            explicit: false,
        }
    }

    /// Create a declared auto-incrementing key.
    pub fn auto_increment(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: KeyStorage::AutoIncrement,
            column_type: ColumnType::big_increments(),
            explicit: true,
        }
    }

    /// Create a declared uuid key.
    pub fn uuid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: KeyStorage::Uuid,
            column_type: ColumnType::uuid(),
            explicit: true,
        }
    }

    /// Create a key from a column carrying the `primary` modifier.
    ///
    /// Incrementing and uuid types keep their storage class; anything else
    /// is custom.
    pub fn from_column(name: impl Into<String>, column_type: ColumnType) -> Self {
        let storage = if column_type.is_incrementing() {
            KeyStorage::AutoIncrement
        } else if column_type.name == "uuid" {
            KeyStorage::Uuid
        } else {
            KeyStorage::Custom
        };
        Self {
            name: name.into(),
            storage,
            column_type,
            explicit: true,
        }
    }

    /// Type of a foreign column referencing this key.
    pub fn foreign_type(&self) -> ColumnType {
        match self.storage {
            KeyStorage::AutoIncrement => self.column_type.referencing(),
            KeyStorage::Uuid => ColumnType::uuid(),
            KeyStorage::Custom => self.column_type.referencing(),
        }
    }

    /// Check whether the key uses the conventional name of its storage class.
    pub fn has_default_name(&self) -> bool {
        self.name == DEFAULT_ID || self.name == DEFAULT_UUID
    }
}
