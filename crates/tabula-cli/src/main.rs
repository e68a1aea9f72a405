//! Tabula CLI - spreadsheet inspection and editing tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabula::column_to_letters;
use tabula::prelude::*;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Spreadsheet inspection and editing tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every non-empty cell with its contents and value
    Show {
        /// Input spreadsheet file
        input: PathBuf,

        /// Lay the values out as a grid instead of a list
        #[arg(short, long)]
        grid: bool,
    },

    /// Set one cell and save the result
    Set {
        /// Input spreadsheet file
        input: PathBuf,

        /// Cell name (e.g. A1)
        cell: String,

        /// New contents: a number, text, or a formula starting with '='
        contents: String,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a spreadsheet and report evaluation errors
    Check {
        /// Input spreadsheet file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { input, grid } => {
            if grid {
                show_grid(&input)
            } else {
                show_list(&input)
            }
        }
        Commands::Set {
            input,
            cell,
            contents,
            output,
        } => set_cell(&input, &cell, &contents, output.as_deref()),
        Commands::Check { input } => check(&input),
    }
}

fn open(input: &Path) -> Result<Spreadsheet> {
    Spreadsheet::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn show_list(input: &Path) -> Result<()> {
    let sheet = open(input)?;

    for cell in sheet.cells() {
        println!("{}\t{}\t{}", cell.name, cell.content, cell.value);
    }

    Ok(())
}

fn show_grid(input: &Path) -> Result<()> {
    let sheet = open(input)?;

    let mut positioned = BTreeMap::new();
    let mut skipped = 0;
    for cell in sheet.cells() {
        match cell.name.grid_position() {
            Some((col, row)) => {
                positioned.insert((row, col), cell.value.to_string());
            }
            None => skipped += 1,
        }
    }

    let Some(max_row) = positioned.keys().map(|(row, _)| *row).max() else {
        eprintln!("Warning: Sheet appears to be empty");
        return Ok(());
    };
    let max_col = positioned.keys().map(|(_, col)| *col).max().unwrap_or(0);

    let header: Vec<String> = (0..=max_col).map(column_to_letters).collect();
    println!("\t{}", header.join("\t"));

    for row in 0..=max_row {
        let values: Vec<&str> = (0..=max_col)
            .map(|col| positioned.get(&(row, col)).map(String::as_str).unwrap_or(""))
            .collect();
        println!("{}\t{}", row + 1, values.join("\t"));
    }

    if skipped > 0 {
        eprintln!("Warning: {} cell(s) lie outside the printable grid", skipped);
    }

    Ok(())
}

fn set_cell(input: &Path, cell: &str, contents: &str, output: Option<&Path>) -> Result<()> {
    let mut sheet = open(input)?;

    let affected = sheet
        .set_content(cell, contents)
        .with_context(|| format!("Failed to set {} to '{}'", cell, contents))?;

    for name in &affected {
        println!("{}\t{}", name, sheet.value(name.as_str())?);
    }

    let target = output.unwrap_or(input);
    sheet
        .save(target)
        .with_context(|| format!("Failed to write '{}'", target.display()))?;
    eprintln!(
        "Updated {} cell(s), wrote '{}'",
        affected.len(),
        target.display()
    );

    Ok(())
}

fn check(input: &Path) -> Result<()> {
    let sheet = open(input)?;

    let errors: Vec<_> = sheet.cells().filter(|cell| cell.value.is_error()).collect();

    println!("File: {}", input.display());
    println!("Cells: {}", sheet.len());
    println!("Formulas: {}", sheet.cells().filter(|c| c.content.is_formula()).count());
    println!("Errors: {}", errors.len());
    for cell in errors {
        println!("  {}: {}", cell.name, cell.value);
    }

    Ok(())
}
