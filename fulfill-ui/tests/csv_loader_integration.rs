//! Loads the on-disk catalog fixture and runs it through the free shipping
//! calculator.

use std::path::PathBuf;

use fulfill_core::calculations::{FreeShippingCalculator, FreeShippingInput};
use fulfill_ui::csv_loader;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sample_catalog.csv")
}

#[test]
fn fixture_loads_every_row() {
    let products = csv_loader::load_from_file(&fixture_path()).expect("fixture should load");

    assert_eq!(products.len(), 3);
    assert_eq!(
        products.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(products[2].name, "Gift Card");
    assert_eq!(products[2].price, dec!(50.00));
}

#[test]
fn imported_catalog_feeds_the_calculator() {
    let products = csv_loader::load_from_file(&fixture_path()).expect("fixture should load");
    let input = FreeShippingInput {
        products,
        average_shipping_cost: dec!(10),
        average_order_value: dec!(30),
        use_multiple_products: true,
        ..FreeShippingInput::default()
    };

    let result = FreeShippingCalculator::new()
        .calculate(&input)
        .expect("fixture products are valid");

    // (20×75 + 100×25 + 50×10) / 110
    assert_eq!(result.weighted_average_price.round_dp(2), dec!(40.91));
    assert_eq!(result.product_breakdown.len(), 3);
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.contains("Widget") && r.contains("Gift Card"))
    );
}
