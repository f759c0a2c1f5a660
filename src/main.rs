//! relnorm CLI: read a schema file and a dependency file, print the
//! decomposed schema.

use anyhow::{Context, Result};
use clap::Parser;
use relnorm::normalize::NormalForm;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "relnorm")]
#[command(about = "Normalize a CREATE TABLE schema to a target normal form", long_about = None)]
struct Args {
    /// Path to the CREATE TABLE schema file
    schema: PathBuf,

    /// Path to the functional-dependency file
    dependencies: PathBuf,

    /// Target normal form: 1, 2, 3, B, 4 or 5
    #[arg(value_parser = parse_form, required_unless_present = "highest")]
    form: Option<NormalForm>,

    /// Report the highest form the input already satisfies, without rewriting
    #[arg(long)]
    highest: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_form(s: &str) -> Result<NormalForm, String> {
    NormalForm::parse(s)
        .ok_or_else(|| format!("unrecognized normal form {s:?} (expected 1, 2, 3, B, 4 or 5)"))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let schema = fs::read_to_string(&args.schema)
        .with_context(|| format!("failed to read {}", args.schema.display()))?;
    let dependencies = fs::read_to_string(&args.dependencies)
        .with_context(|| format!("failed to read {}", args.dependencies.display()))?;

    if args.highest {
        match relnorm::highest_form(&schema, &dependencies)? {
            Some(form) => println!("{form}"),
            None => println!("not in 1NF"),
        }
        return Ok(());
    }

    let form = args
        .form
        .context("a target normal form is required unless --highest is given")?;
    log::debug!("normalizing {} to {}", args.schema.display(), form);
    let rendered = relnorm::normalize_to_form(&schema, &dependencies, form)?;

    match &args.output {
        Some(path) => fs::write(path, &rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
