//! Standard fulfillment calculator.
//!
//! Unlike the other calculator views this one keeps its inputs in the shared
//! [`CalculatorStore`], so the form and the results survive switching
//! calculators and restarting the app. Every calculate and reset is saved.

use fulfill_core::calculations::{StandardFulfillmentInput, ValidationErrors};
use gpui::{
    App, ClickEvent, Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div,
};
use gpui_component::input::InputState;
use gpui_component::{h_flex, v_flex};
use tracing::debug;

use super::{
    field_row, general_errors, input_row, make_button, make_outline_button, number_input,
    page_header, read_count, read_decimal, report_view, set_input_text,
};
use crate::app::AppServices;
use crate::models::Report;
use crate::state::{Calculator, CalculatorStore, Phase};

pub struct StandardFulfillmentView {
    store: Entity<CalculatorStore>,
    services: AppServices,
    monthly_inventory_volume: Entity<InputState>,
    monthly_order_volume: Entity<InputState>,
    average_order_weight: Entity<InputState>,
    errors: ValidationErrors,
}

impl StandardFulfillmentView {
    pub fn new(
        store: Entity<CalculatorStore>,
        services: AppServices,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let saved = store.read(cx).standard_fulfillment.input.clone();
        cx.observe(&store, |_, _, cx| cx.notify()).detach();

        Self {
            store,
            services,
            monthly_inventory_volume: number_input(
                "Cubic feet",
                saved.monthly_inventory_volume.to_string(),
                2,
                window,
                cx,
            ),
            monthly_order_volume: number_input(
                "Orders",
                saved.monthly_order_volume.to_string(),
                0,
                window,
                cx,
            ),
            average_order_weight: number_input(
                "Pounds",
                saved.average_order_weight.to_string(),
                2,
                window,
                cx,
            ),
            errors: ValidationErrors::new(),
        }
    }

    fn read_input(
        &self,
        cx: &App,
    ) -> Result<StandardFulfillmentInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let input = StandardFulfillmentInput {
            monthly_inventory_volume: read_decimal(
                &self.monthly_inventory_volume,
                "monthly_inventory_volume",
                &mut errors,
                cx,
            ),
            monthly_order_volume: read_count(
                &self.monthly_order_volume,
                "monthly_order_volume",
                &mut errors,
                cx,
            ),
            average_order_weight: read_decimal(
                &self.average_order_weight,
                "average_order_weight",
                &mut errors,
                cx,
            ),
        };
        errors.into_result().map(|()| input)
    }

    fn save(
        &self,
        cx: &App,
    ) {
        let state = self.store.read(cx).standard_fulfillment.clone();
        self.services
            .spawn_persist("save standard fulfillment", move |repo| async move {
                repo.save_standard_fulfillment(&state).await
            });
    }

    fn calculate(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        let input = match self.read_input(cx) {
            Ok(input) => input,
            Err(errors) => {
                self.errors = errors;
                cx.notify();
                return;
            }
        };

        let outcome = self.store.update(cx, |store, store_cx| {
            store.update_standard_fulfillment(input);
            let outcome = store.calculate_standard_costs();
            store_cx.notify();
            outcome
        });
        match outcome {
            Ok(result) => {
                debug!(total = %result.total_monthly_cost, "standard fulfillment results shown");
                self.errors = ValidationErrors::new();
            }
            Err(errors) => self.errors = errors,
        }
        self.save(cx);
        cx.notify();
    }

    fn reset(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.store.update(cx, |store, store_cx| {
            store.reset_standard_fulfillment();
            store_cx.notify();
        });

        let defaults = StandardFulfillmentInput::default();
        set_input_text(
            &self.monthly_inventory_volume,
            defaults.monthly_inventory_volume.to_string(),
            window,
            cx,
        );
        set_input_text(
            &self.monthly_order_volume,
            defaults.monthly_order_volume.to_string(),
            window,
            cx,
        );
        set_input_text(
            &self.average_order_weight,
            defaults.average_order_weight.to_string(),
            window,
            cx,
        );
        self.errors = ValidationErrors::new();
        self.save(cx);
        cx.notify();
    }

    fn results_report(
        &self,
        cx: &App,
    ) -> Option<Report> {
        let store = self.store.read(cx);
        if store.standard_fulfillment_phase() != Phase::Results {
            return None;
        }
        store.standard_fulfillment_result().map(|result| {
            Report::standard_fulfillment(
                &store.standard_fulfillment.input,
                &result,
                store.rates(),
            )
        })
    }

    fn render_form(
        &self,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        v_flex()
            .gap_3()
            .child(field_row(
                input_row(
                    &self.monthly_inventory_volume,
                    "Monthly inventory volume (cu ft):",
                ),
                &self.errors,
                "monthly_inventory_volume",
                cx,
            ))
            .child(field_row(
                input_row(&self.monthly_order_volume, "Monthly order volume:"),
                &self.errors,
                "monthly_order_volume",
                cx,
            ))
            .child(field_row(
                input_row(&self.average_order_weight, "Average order weight (lbs):"),
                &self.errors,
                "average_order_weight",
                cx,
            ))
            .child(general_errors(&self.errors, cx))
            .child(
                h_flex()
                    .gap_4()
                    .justify_center()
                    .child(make_outline_button(
                        "standard-reset",
                        "Reset",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    ))
                    .child(make_button(
                        "standard-calculate",
                        "Calculate Costs",
                        cx.listener(|this, _: &ClickEvent, _, cx| this.calculate(cx)),
                    )),
            )
    }
}

impl Render for StandardFulfillmentView {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let header = page_header(
            Calculator::StandardFulfillment.title(),
            Calculator::StandardFulfillment.description(),
            cx,
        );
        let body = match self.results_report(cx) {
            Some(report) => v_flex()
                .gap_4()
                .child(report_view(&report, cx))
                .child(
                    h_flex().justify_center().child(make_button(
                        "standard-new",
                        "Start New Calculation",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    )),
                ),
            None => div().child(self.render_form(cx)),
        };

        v_flex().gap_5().child(header).child(body)
    }
}
