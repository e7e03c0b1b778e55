// ABOUTME: Static description of the pets table: store name, version, columns, and path constants.
// ABOUTME: Consumed by the store lifecycle to render the creation statement and by the router.

/// File name of the backing store inside the data directory.
pub const DATABASE_NAME: &str = "pets.db";

/// Schema version stamped into the store. Bump when the table layout changes.
pub const DATABASE_VERSION: i32 = 1;

pub const TABLE_NAME: &str = "pets";

pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_BREED: &str = "breed";
pub const COLUMN_GENDER: &str = "gender";
pub const COLUMN_WEIGHT: &str = "weight";

/// URI scheme used for resource paths.
pub const CONTENT_SCHEME: &str = "content";

/// Authority used when none is configured.
pub const DEFAULT_AUTHORITY: &str = "com.example.android.pets";

/// Path segment naming the pets collection.
pub const PATH_PETS: &str = "pets";

const LIST_KIND_PREFIX: &str = "vnd.android.cursor.dir";
const ITEM_KIND_PREFIX: &str = "vnd.android.cursor.item";

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
}

impl ColumnKind {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Text => "TEXT",
        }
    }
}

/// One column of the table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub default: Option<&'static str>,
    pub primary_key: bool,
}

/// A table name plus its ordered column list.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

/// The single table of the store.
pub const PETS_TABLE: TableDef = TableDef {
    name: TABLE_NAME,
    columns: &[
        ColumnDef {
            name: COLUMN_ID,
            kind: ColumnKind::Integer,
            nullable: false,
            default: None,
            primary_key: true,
        },
        ColumnDef {
            name: COLUMN_NAME,
            kind: ColumnKind::Text,
            nullable: false,
            default: None,
            primary_key: false,
        },
        ColumnDef {
            name: COLUMN_BREED,
            kind: ColumnKind::Text,
            nullable: true,
            default: None,
            primary_key: false,
        },
        ColumnDef {
            name: COLUMN_GENDER,
            kind: ColumnKind::Integer,
            nullable: false,
            default: None,
            primary_key: false,
        },
        ColumnDef {
            name: COLUMN_WEIGHT,
            kind: ColumnKind::Integer,
            nullable: false,
            default: Some("0"),
            primary_key: false,
        },
    ],
};

impl TableDef {
    /// Render the `CREATE TABLE` statement for this table. The primary key
    /// column auto-increments; `NOT NULL` and `DEFAULT` follow the column defs.
    pub fn create_statement(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let mut def = format!("{} {}", col.name, col.kind.sql_name());
                if col.primary_key {
                    def.push_str(" PRIMARY KEY AUTOINCREMENT");
                } else if !col.nullable {
                    def.push_str(" NOT NULL");
                }
                if let Some(default) = col.default {
                    def.push_str(" DEFAULT ");
                    def.push_str(default);
                }
                def
            })
            .collect();

        format!("CREATE TABLE {} ({});", self.name, columns.join(", "))
    }

    /// Whether a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|col| col.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|col| col.name).collect()
    }
}

/// Marker for a response holding any number of pets.
pub fn list_kind(authority: &str) -> String {
    format!("{LIST_KIND_PREFIX}/{authority}.{PATH_PETS}")
}

/// Marker for a response holding a single pet.
pub fn item_kind(authority: &str) -> String {
    format!("{ITEM_KIND_PREFIX}/{authority}.{PATH_PETS}")
}
