use fulfill_core::calculations::{StorageCalculator, StorageInput, ValidationErrors};
use fulfill_core::models::{StorageRates, StorageType};
use gpui::{
    App, ClickEvent, Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div,
};
use gpui_component::input::InputState;
use gpui_component::select::Select;
use gpui_component::{h_flex, v_flex};
use tracing::{debug, warn};

use super::{
    OptionList, field_row, general_errors, input_row, labeled_row, make_button,
    make_outline_button, number_input, option_list, page_header, read_count, report_view,
    select_option, selected_label, set_input_text,
};
use crate::models::Report;
use crate::state::{Calculator, Phase};

fn type_index(storage_type: StorageType) -> usize {
    StorageType::ALL
        .iter()
        .position(|t| *t == storage_type)
        .unwrap_or(0)
}

pub struct StorageView {
    rates: StorageRates,
    pallet_positions: Entity<InputState>,
    storage_duration: Entity<InputState>,
    sku_count: Entity<InputState>,
    storage_type: Entity<OptionList>,
    errors: ValidationErrors,
    report: Option<Report>,
}

impl StorageView {
    pub fn new(
        rates: StorageRates,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let defaults = StorageInput::default();
        Self {
            rates,
            pallet_positions: number_input(
                "Pallet positions",
                defaults.pallet_positions.to_string(),
                0,
                window,
                cx,
            ),
            storage_duration: number_input(
                "Months",
                defaults.storage_duration.to_string(),
                0,
                window,
                cx,
            ),
            sku_count: number_input("SKUs", defaults.sku_count.to_string(), 0, window, cx),
            storage_type: option_list(
                StorageType::ALL.iter().map(|t| t.as_str()),
                type_index(defaults.storage_type),
                window,
                cx,
            ),
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
    ) -> Result<StorageInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let input = StorageInput {
            pallet_positions: read_count(&self.pallet_positions, "pallet_positions", &mut errors, cx),
            storage_duration: read_count(&self.storage_duration, "storage_duration", &mut errors, cx),
            sku_count: read_count(&self.sku_count, "sku_count", &mut errors, cx),
            storage_type: selected_label(&self.storage_type, cx)
                .and_then(|label| StorageType::parse(&label))
                .unwrap_or_default(),
        };
        errors.into_result().map(|()| input)
    }

    fn calculate(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        let outcome = self.read_input(cx).and_then(|input| {
            StorageCalculator::new(&self.rates)
                .calculate(&input)
                .map(|result| Report::storage(&input, &result, &self.rates))
        });
        match outcome {
            Ok(report) => {
                debug!("storage results shown");
                self.errors = ValidationErrors::new();
                self.report = Some(report);
            }
            Err(errors) => {
                warn!(%errors, "storage form rejected");
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
        let defaults = StorageInput::default();
        set_input_text(&self.pallet_positions, defaults.pallet_positions.to_string(), window, cx);
        set_input_text(&self.storage_duration, defaults.storage_duration.to_string(), window, cx);
        set_input_text(&self.sku_count, defaults.sku_count.to_string(), window, cx);
        select_option(&self.storage_type, type_index(defaults.storage_type), window, cx);
        self.errors = ValidationErrors::new();
        self.report = None;
        cx.notify();
    }

    fn render_form(
        &self,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let long_term_hint = format!(
            "Stays of {} months or more carry a long-term surcharge.",
            self.rates.long_term_min_months
        );

        v_flex()
            .gap_3()
            .child(field_row(
                input_row(&self.pallet_positions, "Pallet positions:"),
                &self.errors,
                "pallet_positions",
                cx,
            ))
            .child(field_row(
                input_row(&self.storage_duration, "Storage duration (months):"),
                &self.errors,
                "storage_duration",
                cx,
            ))
            .child(field_row(
                input_row(&self.sku_count, "Number of SKUs:"),
                &self.errors,
                "sku_count",
                cx,
            ))
            .child(labeled_row("Storage type:").child(Select::new(&self.storage_type).w_full()))
            .child(labeled_row("").child(div().text_sm().child(long_term_hint)))
            .child(general_errors(&self.errors, cx))
            .child(
                h_flex()
                    .gap_4()
                    .justify_center()
                    .child(make_outline_button(
                        "storage-reset",
                        "Reset",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    ))
                    .child(make_button(
                        "storage-calculate",
                        "Calculate Storage Costs",
                        cx.listener(|this, _: &ClickEvent, _, cx| this.calculate(cx)),
                    )),
            )
    }
}

impl Render for StorageView {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let header = page_header(
            Calculator::Storage.title(),
            Calculator::Storage.description(),
            cx,
        );
        let body = match &self.report {
            Some(report) => v_flex()
                .gap_4()
                .child(report_view(report, cx))
                .child(
                    h_flex().justify_center().child(make_button(
                        "storage-new",
                        "Start New Calculation",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    )),
                ),
            None => div().child(self.render_form(cx)),
        };

        v_flex().gap_5().child(header).child(body)
    }
}
