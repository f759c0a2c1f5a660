//! Table model: columns, keys and the table itself.

/// Type portion of a column: data type, nullability and optional size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub data_type: String,
    pub nullable: bool,
    pub size: Option<u64>,
}

impl Default for ColumnDef {
    fn default() -> Self {
        Self {
            data_type: String::new(),
            nullable: false,
            size: None,
        }
    }
}

impl ColumnDef {
    pub fn new(data_type: impl Into<String>, nullable: bool, size: Option<u64>) -> Self {
        Self {
            data_type: data_type.into(),
            nullable,
            size,
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub def: ColumnDef,
}

impl Column {
    pub fn new(name: impl Into<String>, def: ColumnDef) -> Self {
        Self {
            name: name.into(),
            def,
        }
    }
}

/// A column referencing the primary key of another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKey {
    pub fn new(
        column_name: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}

/// An ordered collection of columns with a primary key and foreign keys.
///
/// Column names are unique within a table; the primary-key list is an
/// ordered set of column names and every entry names an existing column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    name: String,
    if_not_exists: bool,
    columns: Vec<Column>,
    primary_keys: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn if_not_exists(&self) -> bool {
        self.if_not_exists
    }

    pub fn set_if_not_exists(&mut self, flag: bool) {
        self.if_not_exists = flag;
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Removes the first column equal to `column`. Returns whether one was found.
    pub fn remove_column(&mut self, column: &Column) -> bool {
        match self.columns.iter().position(|c| c == column) {
            Some(index) => {
                self.columns.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes the column named `name` and hands it back, together with any
    /// foreign keys that were attached to it.
    pub fn take_column(&mut self, name: &str) -> Option<(Column, Vec<ForeignKey>)> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        let column = self.columns.remove(index);
        let mut carried = Vec::new();
        self.foreign_keys.retain(|fk| {
            if fk.column_name == name {
                carried.push(fk.clone());
                false
            } else {
                true
            }
        });
        Some((column, carried))
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_keys.iter().any(|k| k == name)
    }

    pub fn has_composite_key(&self) -> bool {
        self.primary_keys.len() > 1
    }

    /// Appends a primary-key name; re-adding an existing name is a no-op.
    pub fn add_primary_key(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.is_primary_key(&name) {
            self.primary_keys.push(name);
        }
    }

    pub fn remove_primary_key(&mut self, name: &str) -> bool {
        match self.primary_keys.iter().position(|k| k == name) {
            Some(index) => {
                self.primary_keys.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces `old` with `new` at its position in the primary-key list.
    /// If `new` is already a member, `old` is simply removed.
    pub fn swap_primary_key(&mut self, old: &str, new: impl Into<String>) {
        let new = new.into();
        let Some(index) = self.primary_keys.iter().position(|k| k == old) else {
            return;
        };
        if self.is_primary_key(&new) {
            self.primary_keys.remove(index);
        } else {
            self.primary_keys[index] = new;
        }
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        if !self.foreign_keys.contains(&foreign_key) {
            self.foreign_keys.push(foreign_key);
        }
    }

    pub(crate) fn replace_foreign_keys(&mut self, foreign_keys: Vec<ForeignKey>) {
        self.foreign_keys = foreign_keys;
    }

    /// Column names that are not members of the primary key.
    pub fn non_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !self.is_primary_key(&c.name))
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn clear_nullability(&mut self) {
        for column in &mut self.columns {
            column.def.nullable = false;
        }
    }
}

/// Derives a table name from a column name: `orderId` becomes `OrderIdTable`.
pub fn derived_table_name(column: &str) -> String {
    compound_table_name(&[column])
}

/// Derives a table name from several column names: `orderId` and
/// `productId` become `OrderIdProductIdTable`.
pub fn compound_table_name<S: AsRef<str>>(columns: &[S]) -> String {
    let mut name = String::new();
    for column in columns {
        let mut chars = column.as_ref().chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name.push_str("Table");
    name
}
