//! Free shipping threshold analysis.
//!
//! Works out the order value at which free shipping still pays for itself,
//! from sales-volume weighted product margins, and projects how a conversion
//! lift changes revenue and profit.
//!
//! # Thresholds
//!
//! | Figure | Formula |
//! |--------|---------|
//! | Minimum | shipping ÷ margin % |
//! | Recommended | (shipping + price × target %) ÷ margin % |
//! | Optimal | recommended rounded up to the next $10 |
//!
//! All thresholds are zero when the weighted margin is not positive.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{ceil_to_step, checked_sum, percent_of, ratio_percent};
use crate::calculations::validation::{GENERAL_FIELD, ValidationErrors};

/// Sales volume assigned to the single product when only one is analyzed.
const SINGLE_PRODUCT_VOLUME: Decimal = Decimal::ONE_HUNDRED;

/// Below this weighted margin %, free shipping is flagged as risky.
const HEALTHY_MARGIN_PERCENT: Decimal = dec!(30);
/// Shipping above this share of the margin is flagged as expensive.
const SHIPPING_MARGIN_SHARE: Decimal = dec!(0.5);
/// Thresholds above this multiple of the average order are flagged as out of reach.
const ORDER_VALUE_STRETCH: Decimal = dec!(1.5);
const LOW_PRODUCT_MARGIN_PERCENT: Decimal = dec!(20);
const HIGH_VOLUME_SHARE_PERCENT: Decimal = dec!(30);
/// Conversion lifts below this % should be tested before rollout.
const UNTESTED_LIFT_PERCENT: Decimal = dec!(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: Decimal,
    pub cost: Decimal,
    /// Units sold per month, or a share of total sales.
    pub sales_volume: Decimal,
}

impl Product {
    pub fn new(
        id: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price: Decimal::ZERO,
            cost: Decimal::ZERO,
            sales_volume: Decimal::ZERO,
        }
    }

    pub fn gross_margin(&self) -> Option<Decimal> {
        self.price.checked_sub(self.cost)
    }

    pub fn gross_margin_percentage(&self) -> Option<Decimal> {
        ratio_percent(self.gross_margin()?, self.price)
    }

    fn is_complete(&self) -> bool {
        self.price > Decimal::ZERO
            && self.cost > Decimal::ZERO
            && self.cost < self.price
            && self.sales_volume > Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeShippingInput {
    pub products: Vec<Product>,
    pub average_shipping_cost: Decimal,
    /// Percent of the average price the merchant wants to keep as profit.
    pub target_profit_margin: Decimal,
    pub current_conversion_rate: Decimal,
    pub estimated_conversion_increase: Decimal,
    pub average_order_value: Decimal,
    pub shipping_as_percent_of_revenue: Decimal,
    /// When false only the first product is analyzed.
    pub use_multiple_products: bool,
}

impl Default for FreeShippingInput {
    fn default() -> Self {
        let mut first = Product::new(1, "Product 1");
        first.sales_volume = SINGLE_PRODUCT_VOLUME;

        Self {
            products: vec![first],
            average_shipping_cost: Decimal::ZERO,
            target_profit_margin: dec!(20),
            current_conversion_rate: dec!(2.5),
            estimated_conversion_increase: dec!(15),
            average_order_value: Decimal::ZERO,
            shipping_as_percent_of_revenue: dec!(8),
            use_multiple_products: false,
        }
    }
}

impl FreeShippingInput {
    /// Appends a blank product named after its position and returns its id.
    pub fn add_product(&mut self) -> u32 {
        let id = self.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let name = format!("Product {}", self.products.len() + 1);
        self.products.push(Product::new(id, name));
        id
    }

    /// Removes a product unless it is the last one left.
    ///
    /// Returns whether anything was removed.
    pub fn remove_product(
        &mut self,
        id: u32,
    ) -> bool {
        if self.products.len() <= 1 {
            return false;
        }
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    pub fn product_mut(
        &mut self,
        id: u32,
    ) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// Products that take part in the analysis.
    fn analyzed_products(&self) -> &[Product] {
        if self.use_multiple_products {
            &self.products
        } else {
            &self.products[..self.products.len().min(1)]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionImpact {
    pub current_revenue: Decimal,
    pub projected_revenue: Decimal,
    pub revenue_increase: Decimal,
    pub additional_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBreakdown {
    pub product: Product,
    pub gross_margin: Decimal,
    pub gross_margin_percentage: Decimal,
    /// Share of total sales volume, in percent.
    pub contribution_to_threshold: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeShippingResult {
    pub weighted_average_price: Decimal,
    pub weighted_average_cost: Decimal,
    pub weighted_gross_margin: Decimal,
    pub weighted_gross_margin_percentage: Decimal,
    pub min_threshold_basic: Decimal,
    pub recommended_threshold: Decimal,
    pub optimal_threshold: Decimal,
    pub profit_impact_at_recommended: Decimal,
    pub profit_impact_at_optimal: Decimal,
    /// Conversion lift, in percent, needed to recover the shipping cost.
    pub break_even_point: Decimal,
    pub conversion_impact: ConversionImpact,
    pub product_breakdown: Vec<ProductBreakdown>,
    pub recommendations: Vec<String>,
}

/// Weighted price and cost over the analyzed products.
struct WeightedAverages {
    price: Decimal,
    cost: Decimal,
    total_volume: Decimal,
}

#[derive(Debug, Clone)]
pub struct FreeShippingCalculator {
    /// Store visitors the conversion projection is based on.
    visitors: Decimal,
    /// Optimal thresholds are rounded up to a multiple of this amount.
    threshold_step: Decimal,
}

impl Default for FreeShippingCalculator {
    fn default() -> Self {
        Self {
            visitors: dec!(1000),
            threshold_step: dec!(10),
        }
    }
}

impl FreeShippingCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(
        &self,
        input: &FreeShippingInput,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if input.use_multiple_products {
            for (index, product) in input.products.iter().enumerate() {
                let n = index + 1;
                let field = |name: &str| format!("products[{index}].{name}");
                if product.price <= Decimal::ZERO {
                    errors.add(field("price"), format!("Product {n} price must be greater than 0"));
                }
                if product.cost <= Decimal::ZERO {
                    errors.add(field("cost"), format!("Product {n} cost must be greater than 0"));
                }
                if product.cost >= product.price {
                    errors.add(field("cost"), format!("Product {n} cost must be less than price"));
                }
                if product.sales_volume <= Decimal::ZERO {
                    errors.add(
                        field("sales_volume"),
                        format!("Product {n} sales volume must be greater than 0"),
                    );
                }
            }
            errors.check(
                !input.products.iter().any(Product::is_complete),
                GENERAL_FIELD,
                "Please add at least one valid product with price, cost, and sales volume",
            );
        } else {
            match input.products.first() {
                Some(product) => {
                    errors.check(
                        product.price <= Decimal::ZERO,
                        "product_price",
                        "Product price must be greater than 0",
                    );
                    errors.check(
                        product.cost <= Decimal::ZERO,
                        "product_cost",
                        "Product cost must be greater than 0",
                    );
                    errors.check(
                        product.cost >= product.price,
                        "product_cost",
                        "Product cost must be less than product price",
                    );
                }
                None => errors.add(GENERAL_FIELD, "Please add a product"),
            }
        }

        errors.check(
            input.average_shipping_cost <= Decimal::ZERO,
            "average_shipping_cost",
            "Average shipping cost must be greater than 0",
        );
        errors.check(
            input.average_order_value <= Decimal::ZERO,
            "average_order_value",
            "Average order value must be greater than 0",
        );

        errors.into_result()
    }

    pub fn calculate(
        &self,
        input: &FreeShippingInput,
    ) -> Result<FreeShippingResult, ValidationErrors> {
        self.validate(input)?;
        let mut result = self.analyze(input).ok_or_else(ValidationErrors::too_large)?;
        result.recommendations = self.recommendations(input, &result);

        debug!(
            products = input.analyzed_products().len(),
            margin_percentage = %result.weighted_gross_margin_percentage,
            optimal_threshold = %result.optimal_threshold,
            "free shipping threshold calculated"
        );

        Ok(result)
    }

    /// Every figure except the recommendations, or `None` on overflow.
    fn analyze(
        &self,
        input: &FreeShippingInput,
    ) -> Option<FreeShippingResult> {
        let averages = self.weighted_averages(input)?;
        let weighted_gross_margin = averages.price.checked_sub(averages.cost)?;
        let margin_percentage = ratio_percent(weighted_gross_margin, averages.price)?;
        let shipping = input.average_shipping_cost;

        let min_threshold_basic = self.threshold(shipping, margin_percentage)?;
        let target_profit = percent_of(averages.price, input.target_profit_margin)?;
        let recommended_threshold =
            self.threshold(shipping.checked_add(target_profit)?, margin_percentage)?;
        let optimal_threshold = ceil_to_step(recommended_threshold, self.threshold_step)?;

        let profit_impact = weighted_gross_margin.checked_sub(shipping)?;

        Some(FreeShippingResult {
            weighted_average_price: averages.price,
            weighted_average_cost: averages.cost,
            weighted_gross_margin,
            weighted_gross_margin_percentage: margin_percentage,
            min_threshold_basic,
            recommended_threshold,
            optimal_threshold,
            profit_impact_at_recommended: profit_impact,
            profit_impact_at_optimal: profit_impact,
            break_even_point: ratio_percent(shipping, weighted_gross_margin)?,
            conversion_impact: self.conversion_impact(input, margin_percentage)?,
            product_breakdown: self.product_breakdown(input, averages.total_volume)?,
            recommendations: Vec::new(),
        })
    }

    fn weighted_averages(
        &self,
        input: &FreeShippingInput,
    ) -> Option<WeightedAverages> {
        if !input.use_multiple_products {
            let (price, cost) = input
                .products
                .first()
                .map(|p| (p.price, p.cost))
                .unwrap_or_default();
            return Some(WeightedAverages {
                price,
                cost,
                total_volume: SINGLE_PRODUCT_VOLUME,
            });
        }

        let total_volume = checked_sum(input.products.iter().map(|p| p.sales_volume))?;
        if total_volume <= Decimal::ZERO {
            return Some(WeightedAverages {
                price: Decimal::ZERO,
                cost: Decimal::ZERO,
                total_volume,
            });
        }

        let weighted = |value: fn(&Product) -> Decimal| -> Option<Decimal> {
            let mut total = Decimal::ZERO;
            for product in &input.products {
                total = total.checked_add(value(product).checked_mul(product.sales_volume)?)?;
            }
            total.checked_div(total_volume)
        };

        Some(WeightedAverages {
            price: weighted(|p: &Product| p.price)?,
            cost: weighted(|p: &Product| p.cost)?,
            total_volume,
        })
    }

    /// Order value whose margin covers `amount`.
    fn threshold(
        &self,
        amount: Decimal,
        margin_percentage: Decimal,
    ) -> Option<Decimal> {
        if margin_percentage > Decimal::ZERO {
            amount.checked_div(margin_percentage.checked_div(Decimal::ONE_HUNDRED)?)
        } else {
            Some(Decimal::ZERO)
        }
    }

    fn conversion_impact(
        &self,
        input: &FreeShippingInput,
        margin_percentage: Decimal,
    ) -> Option<ConversionImpact> {
        let revenue = |conversion_rate: Decimal| {
            percent_of(input.average_order_value, conversion_rate)?.checked_mul(self.visitors)
        };

        let current_revenue = revenue(input.current_conversion_rate)?;
        let lift = percent_of(
            input.current_conversion_rate,
            input.estimated_conversion_increase,
        )?;
        let projected_revenue = revenue(input.current_conversion_rate.checked_add(lift)?)?;
        let revenue_increase = projected_revenue.checked_sub(current_revenue)?;
        let additional_profit = percent_of(revenue_increase, margin_percentage)?.checked_sub(
            percent_of(projected_revenue, input.shipping_as_percent_of_revenue)?,
        )?;

        Some(ConversionImpact {
            current_revenue,
            projected_revenue,
            revenue_increase,
            additional_profit,
        })
    }

    fn product_breakdown(
        &self,
        input: &FreeShippingInput,
        total_volume: Decimal,
    ) -> Option<Vec<ProductBreakdown>> {
        input
            .products
            .iter()
            .map(|product| {
                Some(ProductBreakdown {
                    product: product.clone(),
                    gross_margin: product.gross_margin()?,
                    gross_margin_percentage: product.gross_margin_percentage()?,
                    contribution_to_threshold: ratio_percent(product.sales_volume, total_volume)?,
                })
            })
            .collect()
    }

    fn recommendations(
        &self,
        input: &FreeShippingInput,
        result: &FreeShippingResult,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if result.weighted_gross_margin_percentage < HEALTHY_MARGIN_PERCENT {
            recommendations.push(
                "Your weighted gross margin is below 30%. Consider increasing product margins before offering free shipping".to_string(),
            );
        }

        if input.average_shipping_cost > result.weighted_gross_margin * SHIPPING_MARGIN_SHARE {
            recommendations.push(
                "Your shipping costs are high relative to margins. Consider negotiating better shipping rates".to_string(),
            );
        }

        let order_value_reach = input.average_order_value.checked_mul(ORDER_VALUE_STRETCH);
        if order_value_reach.is_some_and(|reach| result.optimal_threshold > reach) {
            recommendations.push(
                "Your threshold may be too high. Consider product bundling or promotional strategies to increase order values".to_string(),
            );
        }

        if input.use_multiple_products {
            let low_margin = product_names(&result.product_breakdown, |b| {
                b.gross_margin_percentage < LOW_PRODUCT_MARGIN_PERCENT
            });
            if !low_margin.is_empty() {
                recommendations.push(format!(
                    "Consider reviewing pricing for low-margin products: {low_margin}"
                ));
            }

            let high_volume = product_names(&result.product_breakdown, |b| {
                b.contribution_to_threshold > HIGH_VOLUME_SHARE_PERCENT
            });
            if !high_volume.is_empty() {
                recommendations.push(format!(
                    "Focus free shipping strategy on high-volume products: {high_volume}"
                ));
            }
        }

        if input.estimated_conversion_increase < UNTESTED_LIFT_PERCENT {
            recommendations
                .push("Test your free shipping offer to validate the conversion impact".to_string());
        }

        recommendations.push(
            "Monitor your average order value closely after implementing free shipping".to_string(),
        );
        recommendations.push(
            "Consider offering free shipping on orders over your calculated threshold".to_string(),
        );

        if input.use_multiple_products {
            recommendations.push(
                "Consider implementing tiered free shipping based on product categories".to_string(),
            );
        }

        recommendations
    }
}

/// Comma-separated names of the products matching `predicate`.
fn product_names(
    breakdown: &[ProductBreakdown],
    predicate: impl Fn(&ProductBreakdown) -> bool,
) -> String {
    breakdown
        .iter()
        .filter(|b| predicate(b))
        .map(|b| b.product.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
