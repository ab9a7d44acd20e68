//! Text breakdowns of calculator results.
//!
//! A [`Report`] is what both the results pane and the CLI print: sections of
//! labeled, already formatted values plus free-text notes.

use std::fmt;

use fulfill_core::calculations::{
    CustomRequirementsForm, FreeShippingInput, FreeShippingResult, PickPackInput,
    PickPackResult, Projection, ReceivingInput, ReceivingResult, StandardFulfillmentInput,
    StandardFulfillmentResult, StorageInput, StorageResult,
};
use fulfill_core::models::{
    PickPackRates, RateCard, ReceivingRates, ReceivingType, StandardFulfillmentRates,
    StorageRates,
};
use rust_decimal::Decimal;

use crate::utils::{format_currency, format_percentage, format_quantity};

/// Longest label the text rendering pads to.
const LABEL_WIDTH: usize = 44;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
}

impl ReportRow {
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub heading: String,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            rows: Vec::new(),
        }
    }

    pub fn row(
        mut self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.rows.push(ReportRow::new(label, value));
        self
    }

    fn row_if(
        self,
        condition: bool,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        if condition { self.row(label, value) } else { self }
    }

    /// Looks up a row's value by label.
    pub fn value(
        &self,
        label: &str,
    ) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub notes: Vec<String>,
}

fn plural(
    count: u32,
    singular: &str,
    plural: &str,
) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Formats a rate stored as a fraction (0.25) as a percentage.
fn fraction_percentage(fraction: Decimal) -> String {
    format_percentage(fraction.saturating_mul(Decimal::ONE_HUNDRED))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn projection_section(
    heading: &str,
    projection: &Projection,
) -> ReportSection {
    ReportSection::new(heading)
        .row("Monthly", format_currency(projection.monthly))
        .row("Quarterly (3 months)", format_currency(projection.quarterly))
        .row("Half-year (6 months)", format_currency(projection.half_year))
        .row("Annual (12 months)", format_currency(projection.annual))
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn section(
        &self,
        heading: &str,
    ) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }

    pub fn receiving(
        input: &ReceivingInput,
        result: &ReceivingResult,
        rates: &ReceivingRates,
    ) -> Self {
        let surcharge_label = format!(
            "{} Surcharge ({})",
            input.receiving_type.as_str(),
            fraction_percentage(rates.surcharge(input.receiving_type))
        );
        let breakdown = ReportSection::new("Receiving Cost Breakdown")
            .row_if(
                input.pallets > 0,
                format!(
                    "{} × {}",
                    plural(input.pallets, "Pallet", "Pallets"),
                    format_currency(rates.pallet_fee)
                ),
                format_currency(result.pallet_cost),
            )
            .row_if(
                input.cartons > 0,
                format!(
                    "{} × {}",
                    plural(input.cartons, "Carton", "Cartons"),
                    format_currency(rates.carton_fee)
                ),
                format_currency(result.carton_cost),
            )
            .row_if(
                input.units > 0,
                format!(
                    "{} × {}",
                    plural(input.units, "Unit", "Units"),
                    format_currency(rates.unit_fee)
                ),
                format_currency(result.unit_cost),
            )
            .row_if(
                input.appointment_required,
                "Appointment Scheduling Fee",
                format_currency(result.appointment_cost),
            )
            .row_if(
                input.receiving_type != ReceivingType::Standard,
                surcharge_label,
                format_currency(result.surcharge_amount),
            )
            .row("Total Receiving Cost", format_currency(result.total_cost));

        let total_items = u64::from(input.pallets) + u64::from(input.cartons) + u64::from(input.units);
        let summary = ReportSection::new("Receiving Summary")
            .row("Receiving Type", input.receiving_type.as_str())
            .row("Appointment Required", yes_no(input.appointment_required))
            .row("Total Items", total_items.to_string());

        Self {
            title: "Receiving Calculator".to_string(),
            sections: vec![breakdown, summary],
            notes: vec![
                "You can adjust your input values and recalculate at any time.".to_string(),
            ],
        }
    }

    pub fn storage(
        input: &StorageInput,
        result: &StorageResult,
        rates: &StorageRates,
    ) -> Self {
        let long_term = input.storage_duration >= rates.long_term_min_months;
        let surcharge_percent = fraction_percentage(rates.long_term_surcharge);

        let breakdown = ReportSection::new("Storage Cost Breakdown")
            .row(
                format!(
                    "{} × {}/month",
                    plural(input.pallet_positions, "pallet position", "pallet positions"),
                    format_currency(rates.pallet_rate(input.storage_type))
                ),
                format_currency(result.monthly_storage_cost),
            )
            .row(
                format!(
                    "{} × {}/month",
                    plural(input.sku_count, "SKU", "SKUs"),
                    format_currency(rates.sku_management_fee)
                ),
                format_currency(result.sku_management_cost),
            )
            .row_if(
                long_term,
                format!("Long-term storage surcharge ({surcharge_percent})"),
                format_currency(result.long_term_surcharge),
            )
            .row("Monthly Total", format_currency(result.monthly_total))
            .row(
                format!(
                    "Total for {}",
                    plural(input.storage_duration, "month", "months")
                ),
                format_currency(result.total_duration_cost),
            );

        let summary = ReportSection::new("Storage Summary")
            .row("Storage Type", input.storage_type.as_str())
            .row("Pallet Positions", input.pallet_positions.to_string())
            .row(
                "Storage Duration",
                plural(input.storage_duration, "month", "months"),
            )
            .row("Number of SKUs", input.sku_count.to_string())
            .row(
                "Long-term Storage",
                if long_term {
                    format!("Yes (+{surcharge_percent})")
                } else {
                    "No".to_string()
                },
            );

        Self {
            title: "Storage Calculator".to_string(),
            sections: vec![
                breakdown,
                summary,
                projection_section("Storage Cost Projection", &result.projection),
            ],
            notes: Vec::new(),
        }
    }

    pub fn pick_pack(
        input: &PickPackInput,
        result: &PickPackResult,
        rates: &PickPackRates,
    ) -> Self {
        let orders = input.monthly_order_volume;
        let breakdown = ReportSection::new("Pick & Pack Cost Breakdown")
            .row(
                format!(
                    "Picking ({} items @ {}/item)",
                    format_quantity(result.total_items),
                    format_currency(rates.pick_fee_per_item)
                ),
                format_currency(result.pick_cost),
            )
            .row(
                format!(
                    "Packing ({orders} orders @ {}/order)",
                    format_currency(rates.pack_fee_per_order)
                ),
                format_currency(result.pack_cost),
            )
            .row(
                format!(
                    "{} ({orders} @ {}/order)",
                    input.packaging_type.as_str(),
                    format_currency(rates.packaging_cost(input.packaging_type))
                ),
                format_currency(result.packaging_cost),
            )
            .row_if(
                input.special_handling,
                format!(
                    "Special handling ({orders} @ {}/order)",
                    format_currency(rates.special_handling_fee)
                ),
                format_currency(result.special_handling_cost),
            )
            .row("Cost Per Order", format_currency(result.cost_per_order))
            .row("Monthly Total", format_currency(result.monthly_total()));

        let summary = ReportSection::new("Fulfillment Summary")
            .row("Monthly Order Volume", orders.to_string())
            .row(
                "Average Items Per Order",
                format_quantity(input.items_per_order),
            )
            .row("Packaging Type", input.packaging_type.as_str())
            .row("Special Handling", yes_no(input.special_handling))
            .row("Total Monthly Items", format_quantity(result.total_items));

        Self {
            title: "Pick & Pack Calculator".to_string(),
            sections: vec![
                breakdown,
                summary,
                projection_section("Cost Projections", &result.projection),
            ],
            notes: Vec::new(),
        }
    }

    pub fn standard_fulfillment(
        input: &StandardFulfillmentInput,
        result: &StandardFulfillmentResult,
        rates: &StandardFulfillmentRates,
    ) -> Self {
        let costs = ReportSection::new("Your Monthly Costs")
            .row("Receiving", format_currency(result.receiving_cost))
            .row("Storage", format_currency(result.storage_cost))
            .row("Pick & Pack", format_currency(result.pick_pack_cost))
            .row("Shipping", format_currency(result.shipping_cost))
            .row(
                "Total Monthly Cost",
                format_currency(result.total_monthly_cost),
            );

        let basis = ReportSection::new("Cost Basis")
            .row(
                "Inventory volume",
                format!(
                    "{} cubic feet",
                    format_quantity(input.monthly_inventory_volume)
                ),
            )
            .row(
                "Monthly storage fee",
                format!(
                    "{} at {} per cubic foot",
                    format_currency(result.monthly_storage_fee),
                    format_currency(rates.storage_rate_per_cubic_foot)
                ),
            )
            .row(
                "Orders per month",
                input.monthly_order_volume.to_string(),
            )
            .row(
                "Average order weight",
                format!("{} lbs", format_quantity(input.average_order_weight)),
            );

        Self {
            title: "Standard Fulfillment Calculator".to_string(),
            sections: vec![costs, basis],
            notes: vec!["Estimated monthly cost based on your inputs".to_string()],
        }
    }

    pub fn free_shipping(
        input: &FreeShippingInput,
        result: &FreeShippingResult,
    ) -> Self {
        let multi = input.use_multiple_products;

        let thresholds = ReportSection::new("Free Shipping Thresholds")
            .row(
                "Minimum Threshold (break-even point)",
                format_currency(result.min_threshold_basic),
            )
            .row(
                "Recommended (maintains margins)",
                format_currency(result.recommended_threshold),
            )
            .row(
                "Optimal Threshold (psychological pricing)",
                format_currency(result.optimal_threshold),
            )
            .row(
                "Profit per order at threshold",
                format_currency(result.profit_impact_at_optimal),
            );

        let (heading, price_label, cost_label) = if multi {
            (
                "Weighted Economics Summary",
                "Weighted Avg Price",
                "Weighted Avg Cost",
            )
        } else {
            ("Unit Economics Summary", "Product Price", "Product Cost")
        };
        let economics = ReportSection::new(heading)
            .row(price_label, format_currency(result.weighted_average_price))
            .row(cost_label, format_currency(result.weighted_average_cost))
            .row("Gross Margin", format_currency(result.weighted_gross_margin))
            .row(
                "Gross Margin %",
                format_percentage(result.weighted_gross_margin_percentage),
            )
            .row(
                "Shipping Cost Coverage",
                format_currency(input.average_shipping_cost),
            )
            .row(
                "Break-even Conversion Increase",
                format_percentage(result.break_even_point),
            );

        let impact = &result.conversion_impact;
        let conversion = ReportSection::new("Conversion Impact Analysis")
            .row(
                "Current Monthly Revenue (est.)",
                format_currency(impact.current_revenue),
            )
            .row(
                "Projected Monthly Revenue",
                format_currency(impact.projected_revenue),
            )
            .row(
                "Revenue Increase",
                format!("+{}", format_currency(impact.revenue_increase)),
            )
            .row(
                "Additional Profit Impact",
                format_currency(impact.additional_profit),
            );

        let mut sections = vec![thresholds, economics];
        if multi {
            let breakdown = result.product_breakdown.iter().fold(
                ReportSection::new("Product Breakdown Analysis"),
                |section, item| {
                    section.row(
                        item.product.name.clone(),
                        format!(
                            "{} of sales, price {}, margin {} ({})",
                            format_percentage(item.contribution_to_threshold),
                            format_currency(item.product.price),
                            format_currency(item.gross_margin),
                            format_percentage(item.gross_margin_percentage)
                        ),
                    )
                },
            );
            sections.push(breakdown);
        }
        sections.push(conversion);

        let mut notes = result.recommendations.clone();
        notes.push(
            "This analysis assumes 1,000 monthly visitors. Scale proportionally for your traffic volume."
                .to_string(),
        );

        Self {
            title: "Free Shipping Calculator".to_string(),
            sections,
            notes,
        }
    }

    pub fn custom_requirements(form: &CustomRequirementsForm) -> Self {
        let details = ReportSection::new("Request Details")
            .row("Company", form.company_name.trim())
            .row("Contact", form.contact_name.trim())
            .row("Email", form.email.trim())
            .row("Phone", form.phone.trim())
            .row("Requirements", form.requirements.trim());

        Self {
            title: "Thank You for Your Request!".to_string(),
            sections: vec![details],
            notes: vec![
                "We've received your custom requirements and will prepare a personalized quote for your business."
                    .to_string(),
            ],
        }
    }

    pub fn rate_card(card: &RateCard) -> Self {
        let mut sections: Vec<ReportSection> = Vec::new();
        for (key, amount) in card.rates() {
            let (group, rate) = key.split_once('.').unwrap_or(("other", key));
            if sections.last().is_none_or(|s| s.heading != group) {
                sections.push(ReportSection::new(group));
            }
            if let Some(section) = sections.last_mut() {
                section.rows.push(ReportRow::new(rate, format_quantity(amount)));
            }
        }

        Self {
            title: format!("Rate card '{}'", card.name),
            sections,
            notes: Vec::new(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.heading)?;
            for row in &section.rows {
                writeln!(f, "  {:<LABEL_WIDTH$} {}", row.label, row.value)?;
            }
        }
        if !self.notes.is_empty() {
            writeln!(f)?;
            for note in &self.notes {
                writeln!(f, "* {note}")?;
            }
        }
        Ok(())
    }
}
