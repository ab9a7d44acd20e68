use fulfill_core::calculations::{PickPackCalculator, PickPackInput, ValidationErrors};
use fulfill_core::models::{PackagingType, PickPackRates};
use gpui::{
    App, ClickEvent, Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div,
};
use gpui_component::checkbox::Checkbox;
use gpui_component::input::InputState;
use gpui_component::select::Select;
use gpui_component::{h_flex, v_flex};
use tracing::{debug, warn};

use super::{
    OptionList, field_row, general_errors, input_row, labeled_row, make_button,
    make_outline_button, number_input, option_list, page_header, read_count, read_decimal,
    report_view, select_option, selected_label, set_input_text,
};
use crate::models::Report;
use crate::state::{Calculator, Phase};

fn packaging_index(packaging: PackagingType) -> usize {
    PackagingType::ALL
        .iter()
        .position(|p| *p == packaging)
        .unwrap_or(0)
}

/// Per-order picking and packing quote.
pub struct PickPackView {
    rates: PickPackRates,
    monthly_order_volume: Entity<InputState>,
    items_per_order: Entity<InputState>,
    packaging_type: Entity<OptionList>,
    special_handling: bool,
    errors: ValidationErrors,
    report: Option<Report>,
}

impl PickPackView {
    pub fn new(
        rates: PickPackRates,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let defaults = PickPackInput::default();
        Self {
            rates,
            monthly_order_volume: number_input(
                "Orders per month",
                defaults.monthly_order_volume.to_string(),
                0,
                window,
                cx,
            ),
            items_per_order: number_input(
                "Items per order",
                defaults.items_per_order.to_string(),
                2,
                window,
                cx,
            ),
            packaging_type: option_list(
                PackagingType::ALL.iter().map(|p| p.as_str()),
                packaging_index(defaults.packaging_type),
                window,
                cx,
            ),
            special_handling: defaults.special_handling,
            errors: ValidationErrors::new(),
            report: None,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_submitted(self.report.is_some())
    }

    fn read_input(
        &self,
        cx: &App,
    ) -> Result<PickPackInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let input = PickPackInput {
            monthly_order_volume: read_count(
                &self.monthly_order_volume,
                "monthly_order_volume",
                &mut errors,
                cx,
            ),
            items_per_order: read_decimal(&self.items_per_order, "items_per_order", &mut errors, cx),
            packaging_type: selected_label(&self.packaging_type, cx)
                .and_then(|label| PackagingType::parse(&label))
                .unwrap_or_default(),
            special_handling: self.special_handling,
        };
        errors.into_result().map(|()| input)
    }

    fn calculate(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        let outcome = self.read_input(cx).and_then(|input| {
            PickPackCalculator::new(&self.rates)
                .calculate(&input)
                .map(|result| Report::pick_pack(&input, &result, &self.rates))
        });
        match outcome {
            Ok(report) => {
                debug!("pick & pack results shown");
                self.errors = ValidationErrors::new();
                self.report = Some(report);
            }
            Err(errors) => {
                warn!(%errors, "pick & pack form rejected");
                self.errors = errors;
            }
        }
        cx.notify();
    }

    fn reset(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let defaults = PickPackInput::default();
        set_input_text(
            &self.monthly_order_volume,
            defaults.monthly_order_volume.to_string(),
            window,
            cx,
        );
        set_input_text(&self.items_per_order, defaults.items_per_order.to_string(), window, cx);
        select_option(
            &self.packaging_type,
            packaging_index(defaults.packaging_type),
            window,
            cx,
        );
        self.special_handling = defaults.special_handling;
        self.errors = ValidationErrors::new();
        self.report = None;
        cx.notify();
    }

    fn render_form(
        &self,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        v_flex()
            .gap_3()
            .child(field_row(
                input_row(&self.monthly_order_volume, "Monthly order volume:"),
                &self.errors,
                "monthly_order_volume",
                cx,
            ))
            .child(field_row(
                input_row(&self.items_per_order, "Average items per order:"),
                &self.errors,
                "items_per_order",
                cx,
            ))
            .child(labeled_row("Packaging:").child(Select::new(&self.packaging_type).w_full()))
            .child(
                labeled_row("").child(
                    Checkbox::new("special-handling")
                        .label("Special handling (fragile, kitting, inserts)")
                        .checked(self.special_handling)
                        .on_click(cx.listener(|this, checked: &bool, _, cx| {
                            this.special_handling = *checked;
                            cx.notify();
                        })),
                ),
            )
            .child(general_errors(&self.errors, cx))
            .child(
                h_flex()
                    .gap_4()
                    .justify_center()
                    .child(make_outline_button(
                        "pick-pack-reset",
                        "Reset",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    ))
                    .child(make_button(
                        "pick-pack-calculate",
                        "Calculate Pick & Pack",
                        cx.listener(|this, _: &ClickEvent, _, cx| this.calculate(cx)),
                    )),
            )
    }
}

impl Render for PickPackView {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let header = page_header(
            Calculator::PickPack.title(),
            Calculator::PickPack.description(),
            cx,
        );
        let body = match &self.report {
            Some(report) => v_flex()
                .gap_4()
                .child(report_view(report, cx))
                .child(
                    h_flex().justify_center().child(make_button(
                        "pick-pack-new",
                        "Start New Calculation",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    )),
                ),
            None => div().child(self.render_form(cx)),
        };

        v_flex().gap_5().child(header).child(body)
    }
}
