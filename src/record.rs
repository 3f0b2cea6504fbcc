use serde::Deserialize;
use serde_with::DeserializeFromStr;

use std::{
    convert::Infallible,
    fmt::{Debug, Display},
    str::FromStr,
};

use crate::usd::Usd;

/// Column names that every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "ORDER ID",
    "ORDER DATE",
    "ITEM NUMBER",
    "PRODUCT LINE",
    "PRODUCT CODE",
    "ITEM QUANTITY",
    "ITEM PRICE",
    "STATUS",
    "CUSTOMER NAME",
];

/// Identifies the order a line item belongs to.
///
/// Numeric ids compare as numbers, so order `9` sorts before order `10`.
/// Anything else is kept verbatim and sorts after every numeric id.
#[derive(Clone, DeserializeFromStr, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OrderId {
    Number(i64),
    Text(String),
}

impl FromStr for OrderId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Number))
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => Display::fmt(n, f),
            Self::Text(s) => Display::fmt(s, f),
        }
    }
}

impl Debug for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Defines the CSV format for sales data: one line item per row.
#[derive(Debug, Deserialize)]
pub struct Record {
    #[serde(rename = "ORDER ID")]
    pub order_id: OrderId,
    #[serde(rename = "ORDER DATE")]
    pub order_date: String,
    #[serde(rename = "ITEM NUMBER")]
    pub item_number: u32,
    #[serde(rename = "PRODUCT LINE")]
    pub product_line: String,
    #[serde(rename = "PRODUCT CODE")]
    pub product_code: String,
    #[serde(rename = "ITEM QUANTITY")]
    pub qty: i64,
    #[serde(rename = "ITEM PRICE")]
    pub price: Usd,
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "CUSTOMER NAME")]
    pub customer_name: String,
}

impl Record {
    /// Splits the record into its order id and a [`LineItem`] carrying the
    /// derived total price.
    ///
    /// Returns `None` if the total price does not fit in a [`Usd`].
    #[must_use]
    pub fn into_line_item(self) -> Option<(OrderId, LineItem)> {
        let total = self.price.checked_mul(self.qty)?;
        Some((
            self.order_id,
            LineItem {
                order_date: self.order_date,
                item_number: self.item_number,
                product_line: self.product_line,
                product_code: self.product_code,
                qty: self.qty,
                price: self.price,
                total,
                status: self.status,
                customer_name: self.customer_name,
            },
        ))
    }
}

/// One row of an order sheet.
///
/// Fields are declared in sheet column order. The order id is not part of
/// the row; it names the sheet instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub order_date: String,
    pub item_number: u32,
    pub product_line: String,
    pub product_code: String,
    pub qty: i64,
    pub price: Usd,
    pub total: Usd,
    pub status: String,
    pub customer_name: String,
}
