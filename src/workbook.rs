use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{
    ColNum, DocProperties, ExcelDateTime, Format, FormatAlign, RowNum, Workbook, Worksheet,
    XlsxError,
};
use tempfile::NamedTempFile;

use std::{io::Write, path::Path};

use crate::{
    error::{Error, Result},
    record::LineItem,
    report::{OrderGroup, Report},
};

/// File name of the workbook written into the output directory.
pub const WORKBOOK_NAME: &str = "orders.xlsx";

/// Header row of every order sheet, in column order.
pub const COLUMNS: [&str; 9] = [
    "ORDER DATE",
    "ITEM NUMBER",
    "PRODUCT LINE",
    "PRODUCT CODE",
    "ITEM QUANTITY",
    "ITEM PRICE",
    "TOTAL PRICE",
    "STATUS",
    "CUSTOMER NAME",
];

/// Label written under the item price column of the last row.
pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL";

const COLUMN_WIDTH: f64 = 12.0;
const MONEY_FORMAT: &str = "$#,###.##";
const PRICE_COL: ColNum = 5;
const TOTAL_COL: ColNum = 6;

struct Formats {
    header: Format,
    center: Format,
    money: Format,
}

impl Formats {
    fn new() -> Self {
        let center = Format::new().set_align(FormatAlign::Center);
        Self {
            header: center.clone().set_bold(),
            money: center.clone().set_num_format(MONEY_FORMAT),
            center,
        }
    }

    fn for_column(&self, col: ColNum) -> &Format {
        if col == PRICE_COL || col == TOTAL_COL {
            &self.money
        } else {
            &self.center
        }
    }
}

impl Report {
    /// Renders the report as a workbook with one sheet per order.
    ///
    /// The workbook's creation date is set to `created`, so the same report
    /// and date always give the same file.
    ///
    /// # Errors
    ///
    /// Returns an error if an order id is not a valid sheet name, or
    /// `created` is outside the years a workbook can record.
    pub fn to_workbook(&self, created: NaiveDate) -> Result<Workbook> {
        let formats = Formats::new();
        let mut workbook = Workbook::new();
        let properties = DocProperties::new().set_creation_datetime(&excel_date(created)?);
        workbook.set_properties(&properties);
        for group in self.groups() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(group.sheet_name())?;
            write_order_sheet(sheet, &group, &formats)?;
        }
        Ok(workbook)
    }

    /// Writes the report to an `.xlsx` file at `path`, replacing any
    /// existing file. See [`Report::to_workbook`] for `created`.
    ///
    /// The workbook is written to a temporary file in the same directory and
    /// renamed into place, so `path` never holds a partial workbook.
    ///
    /// # Errors
    ///
    /// Returns errors if the workbook cannot be built, or the file cannot be
    /// written.
    pub fn save_xlsx(&self, path: impl AsRef<Path>, created: NaiveDate) -> Result<()> {
        let path = path.as_ref();
        let buffer = self.to_workbook(created)?.save_to_buffer()?;
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&buffer).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn excel_date(date: NaiveDate) -> std::result::Result<ExcelDateTime, XlsxError> {
    // years outside u16 become u16::MAX, which from_ymd rejects
    let year = u16::try_from(date.year()).unwrap_or(u16::MAX);
    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)
}

fn write_order_sheet(
    sheet: &mut Worksheet,
    group: &OrderGroup<'_>,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    for (col, name) in (0..).zip(COLUMNS) {
        sheet.set_column_width(col, COLUMN_WIDTH)?;
        sheet.set_column_format(col, formats.for_column(col))?;
        sheet.write_string_with_format(0, col, name, &formats.header)?;
    }
    let mut row: RowNum = 1;
    for item in group.items {
        write_line_item(sheet, row, item, formats)?;
        row += 1;
    }
    let grand_total = group.grand_total().to_string();
    for col in (0..).take(COLUMNS.len()) {
        match col {
            PRICE_COL => {
                sheet.write_string_with_format(row, col, GRAND_TOTAL_LABEL, &formats.center)?
            }
            TOTAL_COL => sheet.write_string_with_format(row, col, &grand_total, &formats.center)?,
            _ => sheet.write_blank(row, col, &formats.center)?,
        };
    }
    sheet.autofit();
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn write_line_item(
    sheet: &mut Worksheet,
    row: RowNum,
    item: &LineItem,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    sheet.write_string_with_format(row, 0, &item.order_date, &formats.center)?;
    sheet.write_number_with_format(row, 1, f64::from(item.item_number), &formats.center)?;
    sheet.write_string_with_format(row, 2, &item.product_line, &formats.center)?;
    sheet.write_string_with_format(row, 3, &item.product_code, &formats.center)?;
    sheet.write_number_with_format(row, 4, item.qty as f64, &formats.center)?;
    sheet.write_number_with_format(row, PRICE_COL, item.price.dollars(), &formats.money)?;
    sheet.write_number_with_format(row, TOTAL_COL, item.total.dollars(), &formats.money)?;
    sheet.write_string_with_format(row, 7, &item.status, &formats.center)?;
    sheet.write_string_with_format(row, 8, &item.customer_name, &formats.center)?;
    Ok(())
}
