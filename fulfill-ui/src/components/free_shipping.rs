//! Free shipping threshold calculator.
//!
//! Works on a single product or a weighted mix of products. The mix can be
//! typed in row by row or imported from a catalog CSV.

use fulfill_core::calculations::{
    FreeShippingCalculator, FreeShippingInput, Product, ValidationErrors,
};
use gpui::prelude::FluentBuilder;
use gpui::{
    App, ClickEvent, Context, Div, Entity, IntoElement, ParentElement, Render, Styled, Window,
    div, px,
};
use gpui_component::button::{Button, ButtonVariants};
use gpui_component::checkbox::Checkbox;
use gpui_component::input::{Input, InputState};
use gpui_component::{ActiveTheme, Disableable, Sizable, h_flex, v_flex};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::dialogs::pick_catalog_file;
use super::{
    decimal_field, field_row, general_errors, input_row, input_text, labeled_row, make_button,
    make_outline_button, number_input, page_header, read_decimal, report_view, set_input_text,
    text_input,
};
use crate::csv_loader::{CsvLoadError, load_from_file};
use crate::models::Report;
use crate::state::{Calculator, Phase};

/// Blank rather than "0" for money fields the user has not filled in yet.
fn amount_text(value: Decimal) -> String {
    if value.is_zero() {
        String::new()
    } else {
        value.normalize().to_string()
    }
}

fn product_field(
    index: usize,
    name: &str,
) -> String {
    format!("products[{index}].{name}")
}

struct ProductRow {
    id: u32,
    name: Entity<InputState>,
    price: Entity<InputState>,
    cost: Entity<InputState>,
    sales_volume: Entity<InputState>,
}

impl ProductRow {
    fn new(
        product: &Product,
        window: &mut Window,
        cx: &mut Context<FreeShippingView>,
    ) -> Self {
        Self {
            id: product.id,
            name: text_input("Product name", product.name.clone(), window, cx),
            price: number_input("Price", amount_text(product.price), 2, window, cx),
            cost: number_input("Cost", amount_text(product.cost), 2, window, cx),
            sales_volume: number_input(
                "Monthly units",
                amount_text(product.sales_volume),
                2,
                window,
                cx,
            ),
        }
    }
}

impl ProductRow {
    fn text(
        &self,
        cx: &App,
    ) -> ProductText {
        ProductText {
            id: self.id,
            name: input_text(&self.name, cx),
            price: input_text(&self.price, cx),
            cost: input_text(&self.cost, cx),
            sales_volume: input_text(&self.sales_volume, cx),
        }
    }
}

/// What the user has typed into one product row.
#[derive(Debug)]
struct ProductText {
    id: u32,
    name: String,
    price: String,
    cost: String,
    sales_volume: String,
}

/// Parses every product row.
///
/// In single-product mode only the first row's price and cost are on screen,
/// so only they report errors. The other rows are still parsed, which keeps
/// what was typed in them when the user switches back to a product mix.
fn parse_products(
    texts: &[ProductText],
    multi: bool,
    errors: &mut ValidationErrors,
) -> Vec<Product> {
    let mut hidden = ValidationErrors::new();
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let shown = multi || index == 0;
            let (price_field, cost_field) = if multi {
                (product_field(index, "price"), product_field(index, "cost"))
            } else {
                ("product_price".to_string(), "product_cost".to_string())
            };
            let name = text.name.trim();
            Product {
                id: text.id,
                name: if name.is_empty() {
                    format!("Product {}", index + 1)
                } else {
                    name.to_string()
                },
                price: decimal_field(
                    &text.price,
                    &price_field,
                    if shown { &mut *errors } else { &mut hidden },
                ),
                cost: decimal_field(
                    &text.cost,
                    &cost_field,
                    if shown { &mut *errors } else { &mut hidden },
                ),
                sales_volume: decimal_field(
                    &text.sales_volume,
                    &product_field(index, "sales_volume"),
                    if multi { &mut *errors } else { &mut hidden },
                ),
            }
        })
        .collect()
}

struct GlobalInputs {
    average_shipping_cost: Entity<InputState>,
    target_profit_margin: Entity<InputState>,
    current_conversion_rate: Entity<InputState>,
    estimated_conversion_increase: Entity<InputState>,
    average_order_value: Entity<InputState>,
    shipping_as_percent_of_revenue: Entity<InputState>,
}

impl GlobalInputs {
    fn new(
        input: &FreeShippingInput,
        window: &mut Window,
        cx: &mut Context<FreeShippingView>,
    ) -> Self {
        Self {
            average_shipping_cost: number_input(
                "Per order",
                amount_text(input.average_shipping_cost),
                2,
                window,
                cx,
            ),
            target_profit_margin: number_input(
                "Percent",
                amount_text(input.target_profit_margin),
                1,
                window,
                cx,
            ),
            current_conversion_rate: number_input(
                "Percent",
                amount_text(input.current_conversion_rate),
                2,
                window,
                cx,
            ),
            estimated_conversion_increase: number_input(
                "Percent",
                amount_text(input.estimated_conversion_increase),
                1,
                window,
                cx,
            ),
            average_order_value: number_input(
                "Per order",
                amount_text(input.average_order_value),
                2,
                window,
                cx,
            ),
            shipping_as_percent_of_revenue: number_input(
                "Percent",
                amount_text(input.shipping_as_percent_of_revenue),
                1,
                window,
                cx,
            ),
        }
    }

    fn reset(
        &self,
        defaults: &FreeShippingInput,
        window: &mut Window,
        cx: &mut App,
    ) {
        let fields = [
            (&self.average_shipping_cost, defaults.average_shipping_cost),
            (&self.target_profit_margin, defaults.target_profit_margin),
            (&self.current_conversion_rate, defaults.current_conversion_rate),
            (&self.estimated_conversion_increase, defaults.estimated_conversion_increase),
            (&self.average_order_value, defaults.average_order_value),
            (&self.shipping_as_percent_of_revenue, defaults.shipping_as_percent_of_revenue),
        ];
        for (state, value) in fields {
            set_input_text(state, amount_text(value), window, cx);
        }
    }
}

pub struct FreeShippingView {
    calculator: FreeShippingCalculator,
    /// Last input that calculated, plus the current mode and product ids.
    draft: FreeShippingInput,
    rows: Vec<ProductRow>,
    globals: GlobalInputs,
    errors: ValidationErrors,
    import_status: Option<String>,
    report: Option<Report>,
}

impl FreeShippingView {
    pub fn new(
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let draft = FreeShippingInput::default();
        let rows = draft
            .products
            .iter()
            .map(|product| ProductRow::new(product, window, cx))
            .collect();
        let globals = GlobalInputs::new(&draft, window, cx);

        Self {
            calculator: FreeShippingCalculator::new(),
            draft,
            rows,
            globals,
            errors: ValidationErrors::new(),
            import_status: None,
            report: None,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_submitted(self.report.is_some())
    }

    fn read_input(
        &self,
        cx: &App,
    ) -> Result<FreeShippingInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let multi = self.draft.use_multiple_products;
        let texts: Vec<ProductText> = self.rows.iter().map(|row| row.text(cx)).collect();
        let products = parse_products(&texts, multi, &mut errors);

        let globals = &self.globals;
        let input = FreeShippingInput {
            products,
            average_shipping_cost: read_decimal(
                &globals.average_shipping_cost,
                "average_shipping_cost",
                &mut errors,
                cx,
            ),
            target_profit_margin: read_decimal(
                &globals.target_profit_margin,
                "target_profit_margin",
                &mut errors,
                cx,
            ),
            current_conversion_rate: read_decimal(
                &globals.current_conversion_rate,
                "current_conversion_rate",
                &mut errors,
                cx,
            ),
            estimated_conversion_increase: read_decimal(
                &globals.estimated_conversion_increase,
                "estimated_conversion_increase",
                &mut errors,
                cx,
            ),
            average_order_value: read_decimal(
                &globals.average_order_value,
                "average_order_value",
                &mut errors,
                cx,
            ),
            shipping_as_percent_of_revenue: read_decimal(
                &globals.shipping_as_percent_of_revenue,
                "shipping_as_percent_of_revenue",
                &mut errors,
                cx,
            ),
            use_multiple_products: multi,
        };
        errors.into_result().map(|()| input)
    }

    fn calculate(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        let outcome = self.read_input(cx).and_then(|input| {
            let result = self.calculator.calculate(&input)?;
            let report = Report::free_shipping(&input, &result);
            self.draft = input;
            Ok(report)
        });
        match outcome {
            Ok(report) => {
                debug!(products = self.draft.products.len(), "free shipping results shown");
                self.errors = ValidationErrors::new();
                self.report = Some(report);
            }
            Err(errors) => {
                warn!(%errors, "free shipping form rejected");
                self.errors = errors;
            }
        }
        cx.notify();
    }

    fn set_multiple_products(
        &mut self,
        enabled: bool,
        cx: &mut Context<Self>,
    ) {
        self.draft.use_multiple_products = enabled;
        self.errors = ValidationErrors::new();
        cx.notify();
    }

    fn add_product(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let id = self.draft.add_product();
        if let Some(product) = self.draft.products.iter().find(|p| p.id == id) {
            let row = ProductRow::new(product, window, cx);
            self.rows.push(row);
        }
        cx.notify();
    }

    fn remove_product(
        &mut self,
        id: u32,
        cx: &mut Context<Self>,
    ) {
        if self.draft.remove_product(id) {
            self.rows.retain(|row| row.id != id);
            self.errors = ValidationErrors::new();
            cx.notify();
        }
    }

    fn replace_products(
        &mut self,
        products: Vec<Product>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.rows = products
            .iter()
            .map(|product| ProductRow::new(product, window, cx))
            .collect();
        self.draft.products = products;
        self.draft.use_multiple_products = true;
    }

    fn import_catalog(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        cx.spawn_in(window, async move |this, cx| {
            let Some(path) = pick_catalog_file().await else {
                debug!("catalog import cancelled");
                return;
            };
            let loaded = load_from_file(&path);
            let applied = this.update_in(cx, |view, window, cx| {
                view.apply_catalog(loaded, window, cx)
            });
            if let Err(error) = applied {
                warn!(%error, "free shipping view closed before the catalog loaded");
            }
        })
        .detach();
    }

    fn apply_catalog(
        &mut self,
        loaded: Result<Vec<Product>, CsvLoadError>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match loaded {
            Ok(products) => {
                info!(count = products.len(), "catalog imported");
                self.import_status = Some(format!("Imported {} products", products.len()));
                self.replace_products(products, window, cx);
                self.errors = ValidationErrors::new();
            }
            Err(error) => {
                warn!(%error, "catalog import failed");
                self.import_status = Some(format!("Import failed: {error}"));
            }
        }
        cx.notify();
    }

    fn reset(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let defaults = FreeShippingInput::default();
        self.rows = defaults
            .products
            .iter()
            .map(|product| ProductRow::new(product, window, cx))
            .collect();
        self.globals.reset(&defaults, window, cx);
        self.draft = defaults;
        self.errors = ValidationErrors::new();
        self.import_status = None;
        self.report = None;
        cx.notify();
    }

    fn render_single_product(
        &self,
        cx: &App,
    ) -> Div {
        let Some(row) = self.rows.first() else {
            return v_flex();
        };
        v_flex()
            .gap_3()
            .child(field_row(
                input_row(&row.price, "Product price ($):"),
                &self.errors,
                "product_price",
                cx,
            ))
            .child(field_row(
                input_row(&row.cost, "Product cost ($):"),
                &self.errors,
                "product_cost",
                cx,
            ))
    }

    fn render_product_rows(
        &self,
        cx: &mut Context<Self>,
    ) -> Div {
        let danger = cx.theme().danger;
        let can_remove = self.rows.len() > 1;

        let mut rows = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            let id = row.id;
            let messages: Vec<String> = ["price", "cost", "sales_volume"]
                .iter()
                .filter_map(|name| {
                    self.errors
                        .message_for(&product_field(index, name))
                        .map(str::to_string)
                })
                .collect();

            rows.push(
                v_flex()
                    .gap_1()
                    .child(
                        h_flex()
                            .gap_2()
                            .child(Input::new(&row.name).w(px(200.)))
                            .child(Input::new(&row.price).flex_1())
                            .child(Input::new(&row.cost).flex_1())
                            .child(Input::new(&row.sales_volume).flex_1())
                            .child(
                                Button::new(("remove-product", id as usize))
                                    .ghost()
                                    .small()
                                    .label("Remove")
                                    .disabled(!can_remove)
                                    .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                                        this.remove_product(id, cx)
                                    })),
                            ),
                    )
                    .children(
                        messages
                            .into_iter()
                            .map(|message| div().text_sm().text_color(danger).child(message)),
                    ),
            );
        }

        v_flex()
            .gap_2()
            .child(
                h_flex()
                    .gap_2()
                    .text_sm()
                    .child(div().w(px(200.)).child("Product"))
                    .child(div().flex_1().child("Price ($)"))
                    .child(div().flex_1().child("Cost ($)"))
                    .child(div().flex_1().child("Monthly units"))
                    .child(div().w(px(64.))),
            )
            .children(rows)
            .child(
                h_flex()
                    .gap_2()
                    .child(
                        Button::new("add-product")
                            .outline()
                            .small()
                            .label("Add Product")
                            .on_click(cx.listener(|this, _: &ClickEvent, window, cx| {
                                this.add_product(window, cx)
                            })),
                    )
                    .child(
                        Button::new("import-catalog")
                            .outline()
                            .small()
                            .label("Import catalog…")
                            .on_click(cx.listener(|this, _: &ClickEvent, window, cx| {
                                this.import_catalog(window, cx)
                            })),
                    ),
            )
    }

    fn render_form(
        &self,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let multi = self.draft.use_multiple_products;
        let products = if multi {
            self.render_product_rows(cx)
        } else {
            self.render_single_product(cx)
        };
        let globals = &self.globals;
        let muted = cx.theme().muted_foreground;

        v_flex()
            .gap_3()
            .child(
                labeled_row("").child(
                    Checkbox::new("use-multiple-products")
                        .label("Analyze a mix of products")
                        .checked(multi)
                        .on_click(cx.listener(|this, checked: &bool, _, cx| {
                            this.set_multiple_products(*checked, cx)
                        })),
                ),
            )
            .child(products)
            .when_some(self.import_status.clone(), |this, status| {
                this.child(div().text_sm().text_color(muted).child(status))
            })
            .child(field_row(
                input_row(&globals.average_shipping_cost, "Average shipping cost ($):"),
                &self.errors,
                "average_shipping_cost",
                cx,
            ))
            .child(field_row(
                input_row(&globals.target_profit_margin, "Target profit margin (%):"),
                &self.errors,
                "target_profit_margin",
                cx,
            ))
            .child(field_row(
                input_row(&globals.average_order_value, "Average order value ($):"),
                &self.errors,
                "average_order_value",
                cx,
            ))
            .child(field_row(
                input_row(&globals.current_conversion_rate, "Current conversion rate (%):"),
                &self.errors,
                "current_conversion_rate",
                cx,
            ))
            .child(field_row(
                input_row(
                    &globals.estimated_conversion_increase,
                    "Expected conversion increase (%):",
                ),
                &self.errors,
                "estimated_conversion_increase",
                cx,
            ))
            .child(field_row(
                input_row(
                    &globals.shipping_as_percent_of_revenue,
                    "Shipping as % of revenue:",
                ),
                &self.errors,
                "shipping_as_percent_of_revenue",
                cx,
            ))
            .child(general_errors(&self.errors, cx))
            .child(
                h_flex()
                    .gap_4()
                    .justify_center()
                    .child(make_outline_button(
                        "free-shipping-reset",
                        "Reset",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    ))
                    .child(make_button(
                        "free-shipping-calculate",
                        "Calculate Threshold",
                        cx.listener(|this, _: &ClickEvent, _, cx| this.calculate(cx)),
                    )),
            )
    }
}

impl Render for FreeShippingView {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let header = page_header(
            Calculator::FreeShipping.title(),
            Calculator::FreeShipping.description(),
            cx,
        );
        let body = match &self.report {
            Some(report) => v_flex()
                .gap_4()
                .child(report_view(report, cx))
                .child(
                    h_flex()
                        .gap_4()
                        .justify_center()
                        .child(make_outline_button(
                            "free-shipping-edit",
                            "Adjust Inputs",
                            cx.listener(|this, _: &ClickEvent, _, cx| {
                                this.report = None;
                                cx.notify();
                            }),
                        ))
                        .child(make_button(
                            "free-shipping-new",
                            "Start New Calculation",
                            cx.listener(|this, _: &ClickEvent, window, cx| {
                                this.reset(window, cx)
                            }),
                        )),
                ),
            None => div().child(self.render_form(cx)),
        };

        v_flex().gap_5().child(header).child(body)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn untouched_amounts_render_blank() {
        assert_eq!(amount_text(Decimal::ZERO), "");
        assert_eq!(amount_text(dec!(2.50)), "2.5");
        assert_eq!(amount_text(dec!(20)), "20");
    }

    #[test]
    fn product_fields_match_calculator_names() {
        let mut input = FreeShippingInput {
            use_multiple_products: true,
            ..FreeShippingInput::default()
        };
        input.average_shipping_cost = dec!(8);
        input.average_order_value = dec!(50);

        let errors = FreeShippingCalculator::new()
            .validate(&input)
            .expect_err("blank product");

        assert!(errors.message_for(&product_field(0, "price")).is_some());
        assert!(errors.message_for(&product_field(0, "cost")).is_some());
    }

    fn typed(
        id: u32,
        price: &str,
        cost: &str,
        sales_volume: &str,
    ) -> ProductText {
        ProductText {
            id,
            name: String::new(),
            price: price.to_string(),
            cost: cost.to_string(),
            sales_volume: sales_volume.to_string(),
        }
    }

    #[test]
    fn single_mode_keeps_what_was_typed_in_hidden_rows() {
        let texts = [typed(1, "40", "20", "100"), typed(2, "15.50", "6", "30")];
        let mut errors = ValidationErrors::new();

        let products = parse_products(&texts, false, &mut errors);

        assert!(errors.is_empty());
        assert_eq!(products[0].price, dec!(40));
        assert_eq!(products[1].price, dec!(15.50));
        assert_eq!(products[1].sales_volume, dec!(30));
        assert_eq!(products[1].name, "Product 2");
    }

    #[test]
    fn hidden_rows_never_report_errors() {
        let texts = [typed(1, "40", "20", "abc"), typed(2, "oops", "6", "30")];
        let mut errors = ValidationErrors::new();

        parse_products(&texts, false, &mut errors);

        assert!(errors.is_empty());
    }

    #[test]
    fn product_mix_reports_errors_per_row() {
        let texts = [typed(1, "40", "20", "100"), typed(2, "oops", "6", "-3")];
        let mut errors = ValidationErrors::new();

        let products = parse_products(&texts, true, &mut errors);

        assert_eq!(products.len(), 2);
        assert!(errors.message_for(&product_field(1, "price")).is_some());
        assert!(errors.message_for(&product_field(1, "sales_volume")).is_some());
        assert_eq!(errors.message_for(&product_field(0, "price")), None);
    }
}
