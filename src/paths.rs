use chrono::{Datelike, Local, NaiveDate};

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Prefix of the dated output directory name.
pub const ORDERS_DIR_PREFIX: &str = "Orders_";

/// Supplies today's date for naming the output directory.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Checks that a file path was given and that it exists.
///
/// # Errors
///
/// Returns [`Error::Usage`] if `arg` is `None`, and [`Error::NotFound`] if
/// nothing exists at the path.
pub fn resolve_input(arg: Option<PathBuf>) -> Result<PathBuf> {
    let path = arg.ok_or(Error::Usage)?;
    if !path.exists() {
        return Err(Error::NotFound(path));
    }
    Ok(path)
}

/// Returns the output directory name for `date`, such as `Orders_2024-3-7`.
///
/// Month and day are not zero-padded.
#[must_use]
pub fn orders_dir_name(date: NaiveDate) -> String {
    format!(
        "{ORDERS_DIR_PREFIX}{}-{}-{}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Creates the dated output directory next to `input`, unless it already
/// exists, and returns its path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, or if something
/// other than a directory already has its name.
pub fn create_orders_dir(input: impl AsRef<Path>, clock: &impl Clock) -> Result<PathBuf> {
    let parent = input.as_ref().parent().unwrap_or_else(|| Path::new(""));
    let dir = parent.join(orders_dir_name(clock.today()));
    match fs::create_dir(&dir) {
        Ok(()) => Ok(dir),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(dir),
        Err(source) => Err(Error::Io { path: dir, source }),
    }
}
