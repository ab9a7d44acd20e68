use fulfill_core::calculations::{ReceivingCalculator, ReceivingInput, ValidationErrors};
use fulfill_core::models::{ReceivingRates, ReceivingType};
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
    make_outline_button, number_input, option_list, page_header, read_count, report_view,
    select_option, selected_label, set_input_text,
};
use crate::models::Report;
use crate::state::{Calculator, Phase};

fn default_type_index() -> usize {
    ReceivingType::ALL
        .iter()
        .position(|t| *t == ReceivingType::default())
        .unwrap_or(0)
}

/// Inbound receiving quote. State is local to the view.
pub struct ReceivingView {
    rates: ReceivingRates,
    pallets: Entity<InputState>,
    cartons: Entity<InputState>,
    units: Entity<InputState>,
    receiving_type: Entity<OptionList>,
    appointment_required: bool,
    errors: ValidationErrors,
    report: Option<Report>,
}

impl ReceivingView {
    pub fn new(
        rates: ReceivingRates,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let defaults = ReceivingInput::default();
        Self {
            rates,
            pallets: number_input("Pallets", defaults.pallets.to_string(), 0, window, cx),
            cartons: number_input("Cartons", defaults.cartons.to_string(), 0, window, cx),
            units: number_input("Individual units", defaults.units.to_string(), 0, window, cx),
            receiving_type: option_list(
                ReceivingType::ALL.iter().map(|t| t.as_str()),
                default_type_index(),
                window,
                cx,
            ),
            appointment_required: defaults.appointment_required,
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
    ) -> Result<ReceivingInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let input = ReceivingInput {
            pallets: read_count(&self.pallets, "pallets", &mut errors, cx),
            cartons: read_count(&self.cartons, "cartons", &mut errors, cx),
            units: read_count(&self.units, "units", &mut errors, cx),
            appointment_required: self.appointment_required,
            receiving_type: selected_label(&self.receiving_type, cx)
                .and_then(|label| ReceivingType::parse(&label))
                .unwrap_or_default(),
        };
        errors.into_result().map(|()| input)
    }

    fn calculate(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        let outcome = self.read_input(cx).and_then(|input| {
            ReceivingCalculator::new(&self.rates)
                .calculate(&input)
                .map(|result| Report::receiving(&input, &result, &self.rates))
        });
        match outcome {
            Ok(report) => {
                debug!("receiving results shown");
                self.errors = ValidationErrors::new();
                self.report = Some(report);
            }
            Err(errors) => {
                warn!(%errors, "receiving form rejected");
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
        let defaults = ReceivingInput::default();
        set_input_text(&self.pallets, defaults.pallets.to_string(), window, cx);
        set_input_text(&self.cartons, defaults.cartons.to_string(), window, cx);
        set_input_text(&self.units, defaults.units.to_string(), window, cx);
        select_option(&self.receiving_type, default_type_index(), window, cx);
        self.appointment_required = defaults.appointment_required;
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
                input_row(&self.pallets, "Number of pallets:"),
                &self.errors,
                "pallets",
                cx,
            ))
            .child(field_row(
                input_row(&self.cartons, "Number of cartons:"),
                &self.errors,
                "cartons",
                cx,
            ))
            .child(field_row(
                input_row(&self.units, "Number of individual units:"),
                &self.errors,
                "units",
                cx,
            ))
            .child(labeled_row("Receiving type:").child(Select::new(&self.receiving_type).w_full()))
            .child(
                labeled_row("").child(
                    Checkbox::new("appointment-required")
                        .label("Appointment scheduling required")
                        .checked(self.appointment_required)
                        .on_click(cx.listener(|this, checked: &bool, _, cx| {
                            this.appointment_required = *checked;
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
                        "receiving-reset",
                        "Reset",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    ))
                    .child(make_button(
                        "receiving-calculate",
                        "Calculate Receiving Costs",
                        cx.listener(|this, _: &ClickEvent, _, cx| this.calculate(cx)),
                    )),
            )
    }
}

impl Render for ReceivingView {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let header = page_header(
            Calculator::Receiving.title(),
            Calculator::Receiving.description(),
            cx,
        );
        let body = match (self.phase(), &self.report) {
            (Phase::Results, Some(report)) => v_flex()
                .gap_4()
                .child(report_view(report, cx))
                .child(
                    h_flex().justify_center().child(make_button(
                        "receiving-new",
                        "Start New Calculation",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    )),
                ),
            _ => div().child(self.render_form(cx)),
        };

        v_flex().gap_5().child(header).child(body)
    }
}
