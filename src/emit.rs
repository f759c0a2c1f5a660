//! Renders tables back to `CREATE TABLE` text.

use crate::table::Table;

/// Renders the whole result list, one statement per table.
pub fn render_tables(tables: &[Table]) -> String {
    let mut output = String::new();
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&render_table(table));
    }
    output
}

/// Renders one table as a `CREATE TABLE` statement.
pub fn render_table(table: &Table) -> String {
    let mut output = String::from("CREATE TABLE");
    if table.if_not_exists() {
        output.push_str(" IF NOT EXISTS");
    }
    output.push_str(&format!(" {}(\n", table.name()));

    for column in table.columns() {
        output.push_str(&format!("    {} {}", column.name, column.def.data_type));
        if let Some(size) = column.def.size {
            output.push_str(&format!("({size})"));
        }
        output.push_str(if column.def.nullable { " NULL" } else { " NOT NULL" });
        output.push_str(",\n");
    }

    if !table.primary_keys().is_empty() {
        output.push_str(&format!("    PRIMARY KEY({})\n", table.primary_keys().join(", ")));
    }

    let foreign_keys = table.foreign_keys();
    for (i, fk) in foreign_keys.iter().enumerate() {
        output.push_str(&format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column_name, fk.referenced_table, fk.referenced_column
        ));
        output.push_str(if i + 1 < foreign_keys.len() { ",\n" } else { "\n" });
    }

    // No structural line follows the columns, so the last comma goes
    if table.primary_keys().is_empty() && foreign_keys.is_empty() {
        if let Some(stripped) = output.strip_suffix(",\n") {
            output = format!("{stripped}\n");
        }
    }

    output.push_str(");\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnDef, ForeignKey};

    fn sample() -> Table {
        let mut table = Table::new("Order");
        table.add_column(Column::new("orderId", ColumnDef::new("INT", false, None)));
        table.add_column(Column::new("productName", ColumnDef::new("VARCHAR", true, Some(50))));
        table.add_primary_key("orderId");
        table
    }

    #[test]
    fn test_render_columns_and_key() {
        assert_eq!(
            render_table(&sample()),
            "CREATE TABLE Order(\n\
             \x20   orderId INT NOT NULL,\n\
             \x20   productName VARCHAR(50) NULL,\n\
             \x20   PRIMARY KEY(orderId)\n\
             );\n"
        );
    }

    #[test]
    fn test_render_if_not_exists() {
        let mut table = sample();
        table.set_if_not_exists(true);
        assert!(render_table(&table).starts_with("CREATE TABLE IF NOT EXISTS Order("));
    }

    #[test]
    fn test_render_foreign_keys_strip_last_comma() {
        let mut table = sample();
        table.add_foreign_key(ForeignKey::new("orderId", "OrderIdTable", "orderId"));
        table.add_foreign_key(ForeignKey::new("productName", "NameTable", "productName"));
        let rendered = render_table(&table);
        assert!(rendered.contains("FOREIGN KEY (orderId) REFERENCES OrderIdTable(orderId),\n"));
        assert!(rendered.contains("FOREIGN KEY (productName) REFERENCES NameTable(productName)\n);\n"));
    }

    #[test]
    fn test_render_without_key_strips_column_comma() {
        let mut table = Table::new("R");
        table.add_column(Column::new("a", ColumnDef::new("INT", false, None)));
        assert_eq!(
            render_table(&table),
            "CREATE TABLE R(\n    a INT NOT NULL\n);\n"
        );
    }

    #[test]
    fn test_render_many_tables() {
        let rendered = render_tables(&[sample(), sample()]);
        assert_eq!(rendered.matches("CREATE TABLE").count(), 2);
    }
}
