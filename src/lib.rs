//! relnorm: decompose a `CREATE TABLE` schema into a target normal form.
//!
//! The pipeline is text in, text out: a schema file and a dependency file
//! go through the lexer and the two parsers into a [`table::Table`] plus a
//! [`deps::DependencyManager`], the normalizer rewrites them into a list of
//! tables, and the emitter renders the list back to `CREATE TABLE` text.

pub mod deps;
pub mod emit;
pub mod lexer;
pub mod normalize;
pub mod parse;
pub mod table;

use deps::DependencyManager;
use normalize::NormalForm;
use parse::ParseError;
use table::Table;

/// Parses both inputs and binds them: the dependency file is validated
/// against the schema's columns and its declared key is propagated onto
/// the table.
pub fn parse_inputs(
    schema: &str,
    dependencies: &str,
) -> Result<(Table, DependencyManager), ParseError> {
    let mut table = parse::parse_schema(schema)?;
    let manager = parse::parse_dependencies(dependencies, &table)?;
    for key in manager.primary_keys() {
        table.add_primary_key(key.clone());
    }
    Ok((table, manager))
}

/// Full pipeline: schema text + dependency text + target form, rendered as
/// `CREATE TABLE` statements.
pub fn normalize_to_form(
    schema: &str,
    dependencies: &str,
    form: NormalForm,
) -> Result<String, ParseError> {
    let (table, manager) = parse_inputs(schema, dependencies)?;
    let tables = normalize::normalize(table, &manager, form);
    Ok(emit::render_tables(&tables))
}

/// Read-only query for the highest form the input already satisfies.
pub fn highest_form(
    schema: &str,
    dependencies: &str,
) -> Result<Option<NormalForm>, ParseError> {
    let (table, manager) = parse_inputs(schema, dependencies)?;
    Ok(normalize::highest_form(&table, &manager))
}
