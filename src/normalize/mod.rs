//! Normal-form classification and the decomposition driver.

mod decompose;
pub mod detect;

use crate::deps::DependencyManager;
use crate::table::Table;
use log::debug;
use std::fmt;

/// The normal forms the engine can target, in ascending strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NormalForm {
    One,
    Two,
    Three,
    Bcnf,
    Four,
    Five,
}

impl NormalForm {
    /// Parses the CLI spelling: `1`, `2`, `3`, `B`, `4` or `5`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            "3" => Some(Self::Three),
            "B" | "b" | "BCNF" | "bcnf" => Some(Self::Bcnf),
            "4" => Some(Self::Four),
            "5" => Some(Self::Five),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "1NF",
            Self::Two => "2NF",
            Self::Three => "3NF",
            Self::Bcnf => "BCNF",
            Self::Four => "4NF",
            Self::Five => "5NF",
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrites `table` into `target` normal form against the declared
/// dependencies, returning the decomposed table list. Never fails: the
/// parsers validated every name before this runs.
pub fn normalize(table: Table, deps: &DependencyManager, target: NormalForm) -> Vec<Table> {
    debug!("normalizing {} to {}", table.name(), target);
    let mut tables = vec![table];
    decompose::first_normal_form(&mut tables[0], deps);
    if target >= NormalForm::Two {
        decompose::second_normal_form(&mut tables, deps);
    }
    if target >= NormalForm::Three {
        decompose::third_normal_form(&mut tables, deps);
    }
    if target >= NormalForm::Bcnf {
        decompose::boyce_codd_normal_form(&mut tables, deps);
    }
    if target >= NormalForm::Four {
        decompose::fourth_normal_form(&mut tables, deps);
    }
    if target >= NormalForm::Five {
        decompose::fifth_normal_form(&mut tables, deps);
    }
    decompose::repair_foreign_keys(&mut tables);
    tables
}

/// Read-only: the highest form whose detection functions all come back
/// empty, or `None` when the table is not even in 1NF.
pub fn highest_form(table: &Table, deps: &DependencyManager) -> Option<NormalForm> {
    if !detect::one_nf_status(table).holds() {
        return None;
    }
    if !detect::partial_dependencies(table, deps).is_empty() {
        return Some(NormalForm::One);
    }
    if !detect::transitive_dependencies(table, deps).is_empty() {
        return Some(NormalForm::Two);
    }
    if !detect::bcnf_violations(table, deps).is_empty() {
        return Some(NormalForm::Three);
    }
    if !detect::multivalued_violations(table, deps).is_empty() {
        return Some(NormalForm::Bcnf);
    }
    if !detect::join_dependencies(table, deps).is_empty() {
        return Some(NormalForm::Four);
    }
    Some(NormalForm::Five)
}
