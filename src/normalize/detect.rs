//! Read-only detection of normal-form violations.
//!
//! Every function takes the table to inspect plus the declared dependencies
//! and reports pairs in discovery order. A pair only counts while its
//! columns still live in the inspected table, which is what lets the
//! decomposition steps run each detector to the empty set.

use crate::deps::DependencyManager;
use crate::table::Table;

/// Outcome of the 1NF check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneNfStatus {
    pub needs_key: bool,
    pub needs_non_null: bool,
}

impl OneNfStatus {
    pub fn holds(&self) -> bool {
        !self.needs_key && !self.needs_non_null
    }
}

/// A table is in 1NF iff it has a primary key and no nullable column.
pub fn one_nf_status(table: &Table) -> OneNfStatus {
    OneNfStatus {
        needs_key: table.primary_keys().is_empty(),
        needs_non_null: table.columns().iter().any(|c| c.def.nullable),
    }
}

/// Columns that never occur on the right-hand side of any dependency,
/// in column order.
pub fn non_dependent_columns(table: &Table, deps: &DependencyManager) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|c| !deps.is_dependent(&c.name))
        .map(|c| c.name.clone())
        .collect()
}

/// Partial dependencies: `(pk, c)` where `c` hangs off `pk` but is not
/// determined by every member of the composite key.
pub fn partial_dependencies(table: &Table, deps: &DependencyManager) -> Vec<(String, String)> {
    let keys = table.primary_keys();
    let dependents_of: Vec<(&str, Vec<&str>)> = keys
        .iter()
        .map(|pk| {
            let dependents = deps
                .row(pk)
                .map(|row| {
                    row.dependents()
                        .into_iter()
                        .filter(|d| !table.is_primary_key(d))
                        .collect()
                })
                .unwrap_or_default();
            (pk.as_str(), dependents)
        })
        .collect();

    let mut pairs = Vec::new();
    for (pk, dependents) in &dependents_of {
        for dependent in dependents {
            if !table.has_column(dependent) {
                continue;
            }
            let determined_by = dependents_of
                .iter()
                .filter(|(_, list)| list.contains(dependent))
                .count();
            if determined_by < keys.len() {
                pairs.push((pk.to_string(), dependent.to_string()));
            }
        }
    }
    pairs
}

/// Transitive dependencies: a non-key determinant of the table pointing at
/// a non-key column of the table.
pub fn transitive_dependencies(table: &Table, deps: &DependencyManager) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for row in deps.rows() {
        let x = row.determinant();
        if table.is_primary_key(x) || !table.has_column(x) {
            continue;
        }
        for y in row.dependents() {
            if table.is_primary_key(y) || !table.has_column(y) {
                continue;
            }
            pairs.push((x.to_string(), y.to_string()));
        }
    }
    pairs
}

/// BCNF violations: a non-key determinant with a single-valued dependent
/// that is part of the table's key. A determinant whose declared dependents
/// cover the whole table is a superkey and does not violate.
pub fn bcnf_violations(table: &Table, deps: &DependencyManager) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for row in deps.rows() {
        let x = row.determinant();
        if table.is_primary_key(x) || !table.has_column(x) {
            continue;
        }
        let superkey = table
            .columns()
            .iter()
            .all(|c| c.name == x || row.singles().contains(&c.name));
        if superkey {
            continue;
        }
        for y in row.singles() {
            if table.is_primary_key(y) {
                pairs.push((x.to_string(), y.clone()));
            }
        }
    }
    pairs
}

/// Multi-valued violations under a composite key. A row needs at least two
/// multi-valued dependents, and a pair only counts while the table carries
/// a column beyond the two involved (a binary table cannot violate 4NF).
pub fn multivalued_violations(table: &Table, deps: &DependencyManager) -> Vec<(String, String)> {
    if !table.has_composite_key() {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    for row in deps.rows() {
        let x = row.determinant();
        if row.multis().len() < 2 || !table.has_column(x) {
            continue;
        }
        for m in row.multis() {
            if !table.has_column(m) {
                continue;
            }
            let has_third = table
                .columns()
                .iter()
                .any(|c| c.name != *x && c.name != *m);
            if has_third {
                pairs.push((x.to_string(), m.clone()));
            }
        }
    }
    pairs
}

/// Join dependencies: cycles `A -> B`, `A -> C`, `B -> C` whose three
/// columns all live in the table.
pub fn join_dependencies(
    table: &Table,
    deps: &DependencyManager,
) -> Vec<(String, String, String)> {
    let mut triples = Vec::new();
    for a_row in deps.rows() {
        let a = a_row.determinant();
        if a_row.singles().len() < 2 || !table.has_column(a) {
            continue;
        }
        for b in a_row.singles() {
            if !table.has_column(b) {
                continue;
            }
            let Some(b_row) = deps.row(b) else { continue };
            for c in b_row.singles() {
                if c != b && a_row.singles().contains(c) && table.has_column(c) {
                    triples.push((a.to_string(), b.clone(), c.clone()));
                }
            }
        }
    }
    triples
}
