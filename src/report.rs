use std::{
    collections::BTreeMap,
    fmt::Display,
    fs::File,
    path::Path,
};

use crate::{
    error::{Error, Result},
    record::{LineItem, OrderId, Record, REQUIRED_COLUMNS},
    usd::Usd,
};

/// Holds sales line items, grouped by order.
///
/// To build a `Report` from a CSV file, use [`Report::read_csv`]. To build
/// one from line items already in memory, use [`Report::from_line_items`].
///
/// To write the report as a spreadsheet, use [`Report::save_xlsx`].
///
/// To get a printable summary of the report, use its [`Display`] implementation.
#[derive(Debug, Default)]
pub struct Report {
    orders: BTreeMap<OrderId, Vec<LineItem>>,
}

/// The line items sharing one order id.
#[derive(Clone, Copy, Debug)]
pub struct OrderGroup<'a> {
    pub order_id: &'a OrderId,
    pub items: &'a [LineItem],
}

impl OrderGroup<'_> {
    /// Returns the sum of the total price of every line item in the order.
    ///
    /// # Panics
    ///
    /// If the sum overflows. Reports read by [`Report::read_csv`] are checked
    /// for this when they are read.
    #[must_use]
    pub fn grand_total(&self) -> Usd {
        self.items.iter().map(|item| item.total).sum()
    }

    /// Returns the name of the sheet this order is written to.
    #[must_use]
    pub fn sheet_name(&self) -> String {
        self.order_id.to_string()
    }
}

impl Report {
    /// Creates a new, empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads sales data from the CSV file at `path`.
    ///
    /// The header row must name every column in [`REQUIRED_COLUMNS`]; any
    /// other columns are ignored.
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// * The file cannot be opened
    /// * The header row lacks one or more required columns
    /// * A record cannot be parsed
    /// * A total price, grand total or the overall total is too large to hold
    /// * The file holds no records
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let csv_err = |source| Error::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        let headers = rdr.headers().map_err(csv_err)?;
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| !headers.iter().any(|h| h == name))
            .map(|&name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns {
                path: path.to_path_buf(),
                columns: missing,
            });
        }
        let overflow = |what| Error::Overflow {
            path: path.to_path_buf(),
            what,
        };
        let mut items = Vec::new();
        for (index, result) in rdr.deserialize().enumerate() {
            let record: Record = result.map_err(csv_err)?;
            let item = record
                .into_line_item()
                .ok_or_else(|| overflow(format!("total price of record {}", index + 1)))?;
            items.push(item);
        }
        if items.is_empty() {
            return Err(Error::NoOrders {
                path: path.to_path_buf(),
            });
        }
        let report = Self::from_line_items(items);
        let mut grand_totals = Vec::with_capacity(report.len());
        for group in report.groups() {
            let total = Usd::checked_sum(group.items.iter().map(|item| item.total))
                .ok_or_else(|| overflow(format!("grand total of order {}", group.order_id)))?;
            grand_totals.push(total);
        }
        Usd::checked_sum(grand_totals).ok_or_else(|| overflow("overall total".to_string()))?;
        Ok(report)
    }

    /// Builds a report from line items paired with their order ids.
    ///
    /// Items are sorted by item number before grouping. The sort is stable,
    /// so items with equal numbers keep their input order within an order.
    #[must_use]
    pub fn from_line_items(items: impl IntoIterator<Item = (OrderId, LineItem)>) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        items.sort_by_key(|(_, item)| item.item_number);
        let mut report = Self::new();
        for (order_id, item) in items {
            report.orders.entry(order_id).or_default().push(item);
        }
        report
    }

    /// Returns the orders in ascending order id order.
    pub fn groups(&self) -> impl Iterator<Item = OrderGroup<'_>> {
        self.orders.iter().map(|(order_id, items)| OrderGroup {
            order_id,
            items,
        })
    }

    /// Returns the number of orders in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns the sum of every order's grand total.
    #[must_use]
    pub fn revenue(&self) -> Usd {
        self.groups().map(|g| g.grand_total()).sum()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .orders
            .keys()
            .map(|id| id.to_string().chars().count())
            .chain(["Order".len()])
            .max()
            .unwrap_or_default();
        writeln!(f, "{:width$} {:>6} {:>12}", "Order", "Lines", "Grand total")?;
        let length = width + 20;
        writeln!(f, "{:-<length$}", "")?;
        let mut lines = 0;
        for group in self.groups() {
            lines += group.items.len();
            writeln!(
                f,
                "{:width$} {:6} {:>12}",
                group.order_id.to_string(),
                group.items.len(),
                group.grand_total()
            )?;
        }
        writeln!(f, "{:-<length$}", "")?;
        writeln!(f, "{:width$} {:6} {:>12}", "Total", lines, self.revenue())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn item(item_number: u32, qty: i64, price: &str) -> LineItem {
        let price: Usd = price.parse().unwrap();
        LineItem {
            order_date: "1/6/2003 0:00".into(),
            item_number,
            product_line: "Vintage Cars".into(),
            product_code: format!("S18_{item_number}"),
            qty,
            price,
            total: price * qty,
            status: "Shipped".into(),
            customer_name: "Online Diecast Creations Co.".into(),
        }
    }

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn read_csv_fn_groups_line_items_by_order() {
        let report = Report::read_csv("testdata/sales.csv").unwrap();
        let ids: Vec<String> = report.groups().map(|g| g.sheet_name()).collect();
        assert_eq!(ids, ["10100", "10101", "10102"]);
        let lines: usize = report.groups().map(|g| g.items.len()).sum();
        assert_eq!(lines, 9, "every record lands in exactly one order");
    }

    #[test]
    fn read_csv_fn_sorts_items_by_item_number_within_orders() {
        let report = Report::read_csv("testdata/sales.csv").unwrap();
        for group in report.groups() {
            let numbers: Vec<u32> = group.items.iter().map(|i| i.item_number).collect();
            let mut sorted = numbers.clone();
            sorted.sort_unstable();
            assert_eq!(numbers, sorted, "order {}", group.order_id);
        }
    }

    #[test]
    fn read_csv_fn_computes_totals_and_grand_totals() {
        let report = Report::read_csv("testdata/sales.csv").unwrap();
        let first = report.groups().next().unwrap();
        for item in first.items {
            assert_eq!(item.total, item.price * item.qty);
        }
        assert_eq!(first.grand_total().to_string(), "$10223.83");
        assert_eq!(report.revenue().to_string(), "$24227.52");
    }

    #[test]
    fn read_csv_fn_reports_every_missing_column() {
        let err = Report::read_csv("testdata/missing_columns.csv").unwrap_err();
        assert!(err.is_data_format());
        match err {
            Error::MissingColumns { columns, .. } => {
                assert_eq!(columns, ["ITEM PRICE", "CUSTOMER NAME"]);
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn read_csv_fn_returns_error_for_bad_price() {
        let file = write_csv(
            "ORDER ID,ORDER DATE,ITEM NUMBER,PRODUCT LINE,PRODUCT CODE,ITEM QUANTITY,ITEM PRICE,STATUS,CUSTOMER NAME\n\
             1,1/1/2003,1,Planes,P1,2,two dollars,Shipped,Acme\n",
        );
        let err = Report::read_csv(file.path()).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }), "wrong error: {err}");
    }

    #[test]
    fn read_csv_fn_returns_error_when_total_price_overflows() {
        let file = write_csv(
            "ORDER ID,ORDER DATE,ITEM NUMBER,PRODUCT LINE,PRODUCT CODE,ITEM QUANTITY,ITEM PRICE,STATUS,CUSTOMER NAME\n\
             1,1/1/2003,1,Planes,P1,9223372036854775807,2.00,Shipped,Acme\n",
        );
        let err = Report::read_csv(file.path()).unwrap_err();
        assert!(err.is_data_format(), "wrong error: {err}");
        assert!(err.to_string().contains("total price of record 1"), "{err}");
    }

    #[test]
    fn read_csv_fn_returns_error_when_grand_total_overflows() {
        let file = write_csv(
            "ORDER ID,ORDER DATE,ITEM NUMBER,PRODUCT LINE,PRODUCT CODE,ITEM QUANTITY,ITEM PRICE,STATUS,CUSTOMER NAME\n\
             1,1/1/2003,1,Planes,P1,4611686018427387903,0.02,Shipped,Acme\n\
             1,1/1/2003,2,Planes,P2,4611686018427387903,0.02,Shipped,Acme\n",
        );
        let err = Report::read_csv(file.path()).unwrap_err();
        assert!(matches!(err, Error::Overflow { .. }), "wrong error: {err}");
        assert!(err.to_string().contains("grand total of order 1"), "{err}");
    }

    #[test]
    fn read_csv_fn_returns_error_for_header_only_file() {
        let file = write_csv(
            "ORDER ID,ORDER DATE,ITEM NUMBER,PRODUCT LINE,PRODUCT CODE,ITEM QUANTITY,ITEM PRICE,STATUS,CUSTOMER NAME\n",
        );
        let err = Report::read_csv(file.path()).unwrap_err();
        assert!(matches!(err, Error::NoOrders { .. }), "wrong error: {err}");
    }

    #[test]
    fn read_csv_fn_returns_io_error_for_missing_file() {
        let err = Report::read_csv("testdata/bogus.csv").unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "wrong error: {err}");
    }

    #[test]
    fn from_line_items_fn_orders_items_and_sums_grand_total() {
        let one = OrderId::Number(1);
        let report = Report::from_line_items([
            (one.clone(), item(20, 3, "2.00")),
            (one, item(10, 1, "5.00")),
        ]);
        let group = report.groups().next().unwrap();
        assert_eq!(group.sheet_name(), "1");
        let numbers: Vec<u32> = group.items.iter().map(|i| i.item_number).collect();
        assert_eq!(numbers, [10, 20]);
        assert_eq!(group.items[0].total, Usd::from_cents(500));
        assert_eq!(group.items[1].total, Usd::from_cents(600));
        assert_eq!(group.grand_total().to_string(), "$11.00");
    }

    #[test]
    fn from_line_items_fn_keeps_input_order_for_equal_item_numbers() {
        let mut first = item(1, 1, "1.00");
        first.product_code = "first".into();
        let mut second = item(1, 1, "1.00");
        second.product_code = "second".into();
        let report = Report::from_line_items([
            (OrderId::Number(7), first),
            (OrderId::Number(7), second),
        ]);
        let group = report.groups().next().unwrap();
        assert_eq!(group.items[0].product_code, "first");
        assert_eq!(group.items[1].product_code, "second");
    }

    #[test]
    fn grand_total_fn_is_independent_of_row_order() {
        let forward = Report::from_line_items([
            (OrderId::Number(1), item(1, 3, "0.10")),
            (OrderId::Number(1), item(2, 7, "19.99")),
        ]);
        let backward = Report::from_line_items([
            (OrderId::Number(1), item(2, 7, "19.99")),
            (OrderId::Number(1), item(1, 3, "0.10")),
        ]);
        assert_eq!(forward.revenue(), backward.revenue());
        assert_eq!(forward.revenue(), Usd::from_cents(14_023));
    }

    #[test]
    fn display_fn_aligns_non_ascii_order_ids() {
        let report = Report::from_line_items([
            (OrderId::Text("Bestellung-ä".into()), item(1, 1, "1.00")),
            (OrderId::Text("Order-ab".into()), item(1, 1, "1.00")),
        ]);
        let text = report.to_string();
        let widths: Vec<usize> = text
            .lines()
            .filter(|l| !l.starts_with('-'))
            .map(|l| l.chars().count())
            .collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "{text}");
    }

    #[test]
    fn display_fn_prints_summary_table() {
        let report = Report::from_line_items([
            (OrderId::Number(1), item(1, 3, "2.00")),
            (OrderId::Number(2), item(1, 1, "5.00")),
        ]);
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Order"));
        assert!(lines[2].starts_with("1 "));
        assert!(lines[2].ends_with("$6.00"));
        assert!(lines[5].starts_with("Total"));
        assert!(lines[5].ends_with("$11.00"));
    }
}
