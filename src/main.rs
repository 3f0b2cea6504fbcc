use anyhow::Result;
use clap::Parser;

use std::{path::PathBuf, process::ExitCode};

use orders::SystemClock;

#[derive(Parser)]
#[command(version)]
/// Splits sales line items into one spreadsheet sheet per order.
///
/// The workbook is written to `Orders_<YEAR>-<MONTH>-<DAY>/orders.xlsx`, next
/// to the input file.
struct Args {
    /// Path to the sales CSV file
    file_path: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let input = match orders::resolve_input(args.file_path) {
        Ok(path) => path,
        Err(err) => {
            println!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let (report, path) = orders::run(&input, &SystemClock)?;
    print!("{report}");
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}
