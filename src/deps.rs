//! Functional and multi-valued dependency model.

/// Dependencies declared for one determinant column.
///
/// `singles` holds the right-hand sides of `->` declarations, `multis`
/// those of `->>`. Order of declaration is preserved and no name repeats
/// within either list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRow {
    determinant: String,
    singles: Vec<String>,
    multis: Vec<String>,
}

impl DependencyRow {
    pub fn new(determinant: impl Into<String>) -> Self {
        Self {
            determinant: determinant.into(),
            singles: Vec::new(),
            multis: Vec::new(),
        }
    }

    pub fn determinant(&self) -> &str {
        &self.determinant
    }

    pub fn singles(&self) -> &[String] {
        &self.singles
    }

    pub fn multis(&self) -> &[String] {
        &self.multis
    }

    pub fn add_single(&mut self, dependent: impl Into<String>) {
        self.singles.push(dependent.into());
    }

    pub fn add_multi(&mut self, dependent: impl Into<String>) {
        self.multis.push(dependent.into());
    }

    /// Right-hand sides of both kinds, singles first, without repeats.
    pub fn dependents(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for name in self.singles.iter().chain(self.multis.iter()) {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
        out
    }
}

/// All dependency rows of a schema plus the declared primary key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyManager {
    rows: Vec<DependencyRow>,
    primary_keys: Vec<String>,
}

impl DependencyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[DependencyRow] {
        &self.rows
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn row(&self, determinant: &str) -> Option<&DependencyRow> {
        self.rows.iter().find(|r| r.determinant() == determinant)
    }

    /// Appends a row; a determinant already present is left untouched.
    pub fn add_row(&mut self, row: DependencyRow) {
        if self.row(row.determinant()).is_none() {
            self.rows.push(row);
        }
    }

    /// Appends a primary-key name; re-adding an existing name is a no-op.
    pub fn add_primary_key(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.primary_keys.contains(&name) {
            self.primary_keys.push(name);
        }
    }

    /// Whether any row lists `name` as a dependent, single or multi valued.
    pub fn is_dependent(&self, name: &str) -> bool {
        self.rows.iter().any(|row| {
            row.singles().iter().any(|s| s == name) || row.multis().iter().any(|m| m == name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_row_is_idempotent_per_determinant() {
        let mut manager = DependencyManager::new();
        let mut row = DependencyRow::new("a");
        row.add_single("b");
        manager.add_row(row);
        manager.add_row(DependencyRow::new("a"));
        assert_eq!(manager.rows().len(), 1);
        assert_eq!(manager.row("a").unwrap().singles(), ["b"]);
    }

    #[test]
    fn test_dependents_merges_without_repeats() {
        let mut row = DependencyRow::new("a");
        row.add_single("b");
        row.add_multi("b");
        row.add_multi("c");
        assert_eq!(row.dependents(), ["b", "c"]);
    }

    #[test]
    fn test_is_dependent() {
        let mut manager = DependencyManager::new();
        let mut row = DependencyRow::new("a");
        row.add_multi("c");
        manager.add_row(row);
        assert!(manager.is_dependent("c"));
        assert!(!manager.is_dependent("a"));
    }
}
