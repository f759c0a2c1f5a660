//! The decomposition steps behind each normal form.
//!
//! Every step takes the working list of tables and rewrites it until its
//! detection function comes back empty. Index 0 starts out as the parsed
//! table; decompositions append their side tables behind it.

use super::detect::{
    bcnf_violations, join_dependencies, multivalued_violations, non_dependent_columns,
    one_nf_status, partial_dependencies, transitive_dependencies,
};
use crate::deps::DependencyManager;
use crate::table::{compound_table_name, derived_table_name, ForeignKey, Table};
use log::debug;

/// 1NF: fabricate a primary key from the non-dependent columns when none is
/// declared, and force every column to `NOT NULL`.
pub(crate) fn first_normal_form(table: &mut Table, deps: &DependencyManager) {
    let status = one_nf_status(table);
    if status.holds() {
        return;
    }
    if status.needs_key {
        let mut keys = non_dependent_columns(table, deps);
        if keys.is_empty() {
            keys = table.columns().iter().map(|c| c.name.clone()).collect();
        }
        debug!("1NF: declaring primary key {:?} on {}", keys, table.name());
        for key in keys {
            table.add_primary_key(key);
        }
    }
    if status.needs_non_null {
        table.clear_nullability();
    }
}

/// 2NF: split every partially dependent column into a side table keyed by
/// the key part it hangs off, drag retained transitive dependents along,
/// and bridge a composite key over its side tables.
pub(crate) fn second_normal_form(tables: &mut Vec<Table>, deps: &DependencyManager) {
    loop {
        let pairs = partial_dependencies(&tables[0], deps);
        if pairs.is_empty() {
            return;
        }
        let retained = transitive_dependencies(&tables[0], deps);
        let mut created: Vec<String> = Vec::new();

        for (pk, column) in pairs {
            let side_name = derived_table_name(&pk);
            let target = match find_table(tables, &side_name) {
                Some(index) => index,
                None => {
                    debug!("2NF: splitting {} off {} under {}", column, tables[0].name(), pk);
                    created.push(side_name.clone());
                    push_side_table(tables, 0, &side_name, &pk)
                }
            };
            move_column(tables, 0, target, &column);
        }

        // Transitive dependents follow their determinant into its side table
        for (x, y) in retained {
            let target = tables
                .iter()
                .position(|t| created.iter().any(|n| n == t.name()) && t.has_column(&x));
            if let Some(target) = target {
                move_column(tables, 0, target, &y);
            }
        }

        let keep_residue = !tables[0].non_key_columns().is_empty();
        if tables[0].has_composite_key() && !created.is_empty() {
            let keys: Vec<String> = tables[0].primary_keys().to_vec();
            let bridge_name = compound_table_name(&keys);
            if find_table(tables, &bridge_name).is_none() {
                let mut bridge = Table::new(&bridge_name);
                bridge.set_if_not_exists(tables[0].if_not_exists());
                for pk in &keys {
                    if let Some(column) = copy_column(tables, pk) {
                        bridge.add_column(column);
                    }
                    bridge.add_primary_key(pk.clone());
                    let side_name = derived_table_name(pk);
                    if find_table(tables, &side_name).is_some() {
                        bridge.add_foreign_key(ForeignKey::new(pk.as_str(), side_name, pk.as_str()));
                    } else if keep_residue {
                        bridge.add_foreign_key(ForeignKey::new(
                            pk.as_str(),
                            tables[0].name(),
                            pk.as_str(),
                        ));
                    }
                }
                tables.push(bridge);
            }
        }
        if !keep_residue {
            tables.remove(0);
        }
    }
}

/// 3NF: move every transitively dependent column under its determinant's
/// own table and link the source back with a foreign key.
pub(crate) fn third_normal_form(tables: &mut Vec<Table>, deps: &DependencyManager) {
    while let Some((source, x, y)) = transitive_violation(tables, deps) {
        debug!("3NF: moving {} out of {} under {}", y, tables[source].name(), x);
        let side_name = derived_table_name(&x);
        let target = match find_table(tables, &side_name) {
            Some(index) => index,
            None => push_side_table(tables, source, &side_name, &x),
        };
        move_column(tables, source, target, &y);
        if let Some(holder) = tables
            .iter()
            .position(|t| t.name() != side_name && t.has_column(&x))
        {
            tables[holder].add_foreign_key(ForeignKey::new(x.as_str(), side_name.clone(), x.as_str()));
        }
    }
}

/// First transitive pair still worth acting on, in discovery order.
///
/// Pairs whose determinant lives in the table come straight from detection.
/// A determinant that was already split away can still strand its dependent
/// here (chained transitives); those count unless the table's own key
/// declares the dependent itself.
fn transitive_violation(
    tables: &[Table],
    deps: &DependencyManager,
) -> Option<(usize, String, String)> {
    for (index, table) in tables.iter().enumerate() {
        if let Some((x, y)) = transitive_dependencies(table, deps).into_iter().next() {
            return Some((index, x, y));
        }
    }
    for (index, table) in tables.iter().enumerate() {
        for row in deps.rows() {
            let x = row.determinant();
            if table.is_primary_key(x) || table.has_column(x) {
                continue;
            }
            for y in row.dependents() {
                if table.is_primary_key(y) || !table.has_column(y) {
                    continue;
                }
                if key_determines(table, deps, y) {
                    continue;
                }
                return Some((index, x.to_string(), y.to_string()));
            }
        }
    }
    None
}

/// Whether the table is keyed by a single column whose row declares `name`.
fn key_determines(table: &Table, deps: &DependencyManager, name: &str) -> bool {
    let [key] = table.primary_keys() else {
        return false;
    };
    deps.row(key)
        .is_some_and(|row| row.dependents().contains(&name))
}

/// BCNF: when a non-key column determines part of the key, the determined
/// part moves out and the determinant takes its key slot.
pub(crate) fn boyce_codd_normal_form(tables: &mut Vec<Table>, deps: &DependencyManager) {
    loop {
        let mut work = None;
        for (index, table) in tables.iter().enumerate() {
            if let Some((x, y)) = bcnf_violations(table, deps).into_iter().next() {
                work = Some((index, x, y));
                break;
            }
        }
        let Some((source, x, y)) = work else { return };
        debug!("BCNF: {} takes the key slot of {} in {}", x, y, tables[source].name());
        let side_name = derived_table_name(&x);
        let target = match find_table(tables, &side_name) {
            Some(index) => index,
            None => push_side_table(tables, source, &side_name, &x),
        };
        move_column(tables, source, target, &y);
        tables[source].swap_primary_key(&y, x.as_str());
        tables[source].add_foreign_key(ForeignKey::new(x.as_str(), side_name, x.as_str()));
    }
}

/// 4NF: a pair of multi-valued dependents under a composite key splits into
/// binary tables keyed by both columns.
pub(crate) fn fourth_normal_form(tables: &mut Vec<Table>, deps: &DependencyManager) {
    loop {
        let mut work = None;
        for (index, table) in tables.iter().enumerate() {
            let pairs = multivalued_violations(table, deps);
            if !pairs.is_empty() {
                work = Some((index, pairs));
                break;
            }
        }
        let Some((source, pairs)) = work else { return };
        for (x, y) in pairs {
            let split_name = compound_table_name(&[x.as_str(), y.as_str()]);
            debug!("4NF: splitting {} off {}", split_name, tables[source].name());
            let target = match find_table(tables, &split_name) {
                Some(index) => index,
                None => push_side_table(tables, source, &split_name, &x),
            };
            move_column(tables, source, target, &y);
            tables[target].add_primary_key(y.as_str());
            tables[source].remove_primary_key(&y);
        }
        prune_source(tables, source);
    }
}

/// 5NF: a join-dependency cycle materializes its three binary projections,
/// each keyed by both of its columns.
pub(crate) fn fifth_normal_form(tables: &mut Vec<Table>, deps: &DependencyManager) {
    loop {
        let mut work = None;
        for (index, table) in tables.iter().enumerate() {
            let triples = join_dependencies(table, deps);
            if !triples.is_empty() {
                work = Some((index, triples));
                break;
            }
        }
        let Some((source, triples)) = work else { return };
        let mut participating: Vec<String> = Vec::new();
        for (a, b, c) in &triples {
            debug!("5NF: projecting ({}, {}, {}) out of {}", a, b, c, tables[source].name());
            for (u, v) in [(a, b), (a, c), (b, c)] {
                let projection_name = compound_table_name(&[u.as_str(), v.as_str()]);
                if find_table(tables, &projection_name).is_none() {
                    let index = push_side_table(tables, source, &projection_name, u);
                    if let Some(column) = copy_column(tables, v) {
                        tables[index].add_column(column);
                    }
                    tables[index].add_primary_key(v.as_str());
                }
            }
            for name in [a, b, c] {
                if !participating.contains(name) {
                    participating.push(name.clone());
                }
            }
        }
        for name in &participating {
            let _ = tables[source].take_column(name);
            tables[source].remove_primary_key(name);
        }
        prune_source(tables, source);
    }
}

/// Re-points foreign keys whose referenced column stopped being primary in
/// the referenced table, and drops the ones no table can satisfy anymore.
/// References to tables outside the list are left alone.
pub(crate) fn repair_foreign_keys(tables: &mut Vec<Table>) {
    let catalog: Vec<(String, Vec<String>)> = tables
        .iter()
        .map(|t| (t.name().to_string(), t.primary_keys().to_vec()))
        .collect();
    for table in tables.iter_mut() {
        let own_name = table.name().to_string();
        let mut repaired: Vec<ForeignKey> = Vec::new();
        for fk in table.foreign_keys() {
            if !table.has_column(&fk.column_name) {
                continue;
            }
            let target_in_list = catalog.iter().any(|(name, _)| *name == fk.referenced_table);
            let still_valid = catalog.iter().any(|(name, keys)| {
                *name == fk.referenced_table
                    && *name != own_name
                    && keys.contains(&fk.referenced_column)
            });
            let fixed = if still_valid || !target_in_list {
                fk.clone()
            } else {
                match catalog
                    .iter()
                    .find(|(name, keys)| *name != own_name && keys.contains(&fk.referenced_column))
                {
                    Some((name, _)) => ForeignKey::new(
                        fk.column_name.as_str(),
                        name.as_str(),
                        fk.referenced_column.as_str(),
                    ),
                    None => continue,
                }
            };
            if !repaired.contains(&fixed) {
                repaired.push(fixed);
            }
        }
        table.replace_foreign_keys(repaired);
    }
}

fn find_table(tables: &[Table], name: &str) -> Option<usize> {
    tables.iter().position(|t| t.name() == name)
}

/// Copy of the named column from whichever table still carries it.
fn copy_column(tables: &[Table], name: &str) -> Option<crate::table::Column> {
    tables
        .iter()
        .find_map(|t| t.column(name))
        .cloned()
}

/// New table seeded with a copy of `key` as its primary key.
fn push_side_table(tables: &mut Vec<Table>, source: usize, name: &str, key: &str) -> usize {
    let mut side = Table::new(name);
    side.set_if_not_exists(tables[source].if_not_exists());
    if let Some(column) = copy_column(tables, key) {
        side.add_column(column);
    }
    side.add_primary_key(key);
    tables.push(side);
    tables.len() - 1
}

/// Moves a column between tables, carrying its foreign keys along.
fn move_column(tables: &mut [Table], from: usize, to: usize, name: &str) {
    if from == to {
        return;
    }
    if let Some((column, carried)) = tables[from].take_column(name) {
        let target = &mut tables[to];
        if !target.has_column(&column.name) {
            target.add_column(column);
        }
        for fk in carried {
            target.add_foreign_key(fk);
        }
    }
}

/// After a 4NF/5NF split the source may be reduced to key columns already
/// projected elsewhere, or stripped entirely; a keyless remainder re-keys
/// on its remaining columns the way 1NF fabricates a key.
fn prune_source(tables: &mut Vec<Table>, index: usize) {
    if tables[index].columns().is_empty() {
        tables.remove(index);
        return;
    }
    let covered = tables[index].columns().iter().all(|column| {
        tables
            .iter()
            .enumerate()
            .any(|(j, t)| j != index && t.has_column(&column.name))
    });
    if covered
        && (tables[index].non_key_columns().is_empty() || tables[index].primary_keys().is_empty())
    {
        tables.remove(index);
        return;
    }
    if tables[index].primary_keys().is_empty() {
        let names: Vec<String> = tables[index].columns().iter().map(|c| c.name.clone()).collect();
        for name in names {
            tables[index].add_primary_key(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnDef};

    fn table_with(name: &str, columns: &[&str], keys: &[&str]) -> Table {
        let mut table = Table::new(name);
        for column in columns {
            table.add_column(Column::new(*column, ColumnDef::new("INT", false, None)));
        }
        for key in keys {
            table.add_primary_key(*key);
        }
        table
    }

    #[test]
    fn test_move_column_carries_foreign_keys() {
        let mut tables = vec![
            table_with("A", &["x", "y"], &["x"]),
            table_with("B", &["z"], &["z"]),
        ];
        tables[0].add_foreign_key(ForeignKey::new("y", "Elsewhere", "y"));
        move_column(&mut tables, 0, 1, "y");
        assert!(!tables[0].has_column("y"));
        assert!(tables[0].foreign_keys().is_empty());
        assert!(tables[1].has_column("y"));
        assert_eq!(tables[1].foreign_keys().len(), 1);
    }

    #[test]
    fn test_prune_source_drops_fully_projected_tables() {
        let mut tables = vec![
            table_with("R", &["a"], &["a"]),
            table_with("ABTable", &["a", "b"], &["a", "b"]),
        ];
        prune_source(&mut tables, 0);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name(), "ABTable");
    }

    #[test]
    fn test_prune_source_rekeys_a_keyless_remainder() {
        let mut tables = vec![table_with("R", &["d"], &[])];
        prune_source(&mut tables, 0);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].primary_keys(), ["d"]);
    }

    #[test]
    fn test_repair_retargets_a_moved_reference() {
        let mut a = table_with("A", &["x", "k"], &["k"]);
        a.add_foreign_key(ForeignKey::new("x", "B", "x"));
        let mut tables = vec![
            a,
            table_with("B", &["y"], &["y"]),
            table_with("C", &["x"], &["x"]),
        ];
        repair_foreign_keys(&mut tables);
        assert_eq!(tables[0].foreign_keys()[0].referenced_table, "C");
    }

    #[test]
    fn test_repair_drops_an_unsatisfiable_reference() {
        let mut a = table_with("A", &["x", "k"], &["k"]);
        a.add_foreign_key(ForeignKey::new("x", "B", "x"));
        let mut tables = vec![a, table_with("B", &["y"], &["y"])];
        repair_foreign_keys(&mut tables);
        assert!(tables[0].foreign_keys().is_empty());
    }

    #[test]
    fn test_repair_leaves_external_references_alone() {
        let mut a = table_with("A", &["x", "k"], &["k"]);
        a.add_foreign_key(ForeignKey::new("x", "Elsewhere", "x"));
        let mut tables = vec![a];
        repair_foreign_keys(&mut tables);
        assert_eq!(tables[0].foreign_keys().len(), 1);
        assert_eq!(tables[0].foreign_keys()[0].referenced_table, "Elsewhere");
    }
}
