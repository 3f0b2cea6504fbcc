use std::{io, path::PathBuf};

/// Everything that can stop a report run.
///
/// [`Error::Usage`] and [`Error::NotFound`] display exactly the message that
/// should be shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Please provide file path.")]
    Usage,

    #[error("File path is not correct.")]
    NotFound(PathBuf),

    #[error("reading {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("reading {path:?}: missing required columns: {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("reading {path:?}: {what} is too large")]
    Overflow { path: PathBuf, what: String },

    #[error("reading {path:?}: no order rows found")]
    NoOrders { path: PathBuf },

    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("building workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    /// Reports whether the input was present but could not be used as
    /// sales data.
    #[must_use]
    pub fn is_data_format(&self) -> bool {
        matches!(
            self,
            Self::Csv { .. }
                | Self::MissingColumns { .. }
                | Self::Overflow { .. }
                | Self::NoOrders { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
