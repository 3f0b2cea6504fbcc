#![doc = include_str!("../README.md")]
use std::path::{Path, PathBuf};

mod error;
mod paths;
mod record;
mod report;
mod usd;
mod workbook;

pub use error::{Error, Result};
pub use paths::{
    create_orders_dir, orders_dir_name, resolve_input, Clock, FixedClock, SystemClock,
    ORDERS_DIR_PREFIX,
};
pub use record::{LineItem, OrderId, Record, REQUIRED_COLUMNS};
pub use report::{OrderGroup, Report};
pub use usd::Usd;
pub use workbook::{COLUMNS, GRAND_TOTAL_LABEL, WORKBOOK_NAME};

/// Creates the dated output directory next to `input`, then reads the sales
/// data in `input` and writes the order workbook into that directory.
///
/// Today's date, read once from `clock`, names the directory and is recorded
/// as the workbook's creation date. Returns the report and the path of the
/// workbook written.
///
/// # Errors
///
/// Returns any error from creating the directory, reading the sales data,
/// or writing the workbook.
pub fn run(input: impl AsRef<Path>, clock: &impl Clock) -> Result<(Report, PathBuf)> {
    let today = clock.today();
    let dir = create_orders_dir(&input, &FixedClock(today))?;
    let report = Report::read_csv(&input)?;
    let path = dir.join(WORKBOOK_NAME);
    report.save_xlsx(&path, today)?;
    Ok((report, path))
}
