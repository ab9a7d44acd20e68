//! CSV import for the free shipping product catalog.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column         | Type    | Notes                              |
//! |----------------|---------|------------------------------------|
//! | `name`         | string  | Must not be blank                  |
//! | `price`        | decimal | Selling price per unit             |
//! | `cost`         | decimal | Landed cost per unit               |
//! | `sales_volume` | decimal | Units per month (or a sales share) |
//!
//! ```csv
//! name,price,cost,sales_volume
//! Widget,20.00,17.00,75
//! Gadget,100.00,40.00,25
//! ```
//!
//! Products get ids `1..=n` in file order. Value ranges are left to the
//! calculator's validation so the user sees the same messages as in the form.

use std::path::{Path, PathBuf};

use fulfill_core::calculations::Product;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    price: Decimal,
    cost: Decimal,
    sales_volume: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, a missing column or a value of the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based and does not count the header.
    #[error("product on row {row} has no name")]
    MissingName { row: usize },

    #[error("the catalog has no products")]
    Empty,
}

/// Parses catalog text into products, in file order.
pub fn load_from_str(input: &str) -> Result<Vec<Product>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let products = reader
        .deserialize::<CatalogRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            let row_number = idx + 1;
            if row.name.is_empty() {
                return Err(CsvLoadError::MissingName { row: row_number });
            }
            let id = u32::try_from(row_number).unwrap_or(u32::MAX);
            Ok(Product {
                id,
                name: row.name,
                price: row.price,
                cost: row.cost,
                sales_volume: row.sales_volume,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if products.is_empty() {
        return Err(CsvLoadError::Empty);
    }
    Ok(products)
}

/// Reads a catalog file from disk and delegates to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<Product>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let products = load_from_str(&contents)?;
    info!(path = %path.display(), count = products.len(), "imported product catalog");
    Ok(products)
}
