use fulfill_core::calculations::{CustomRequirementsForm, ValidationErrors};
use fulfill_core::db::RepositoryError;
use gpui::{
    App, ClickEvent, Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div,
};
use gpui_component::input::InputState;
use gpui_component::{h_flex, v_flex};
use tracing::info;

use super::{
    field_row, general_errors, input_row, input_text, make_button, make_outline_button,
    page_header, report_view, set_input_text, text_input,
};
use crate::app::AppServices;
use crate::models::Report;
use crate::state::{Calculator, CalculatorStore, Phase, record_quote_request};

/// Lead form for quotes the calculators cannot price. The draft lives in the
/// shared store and is saved on submit and reset.
pub struct CustomRequirementsView {
    store: Entity<CalculatorStore>,
    services: AppServices,
    company_name: Entity<InputState>,
    contact_name: Entity<InputState>,
    email: Entity<InputState>,
    phone: Entity<InputState>,
    requirements: Entity<InputState>,
    errors: ValidationErrors,
}

impl CustomRequirementsView {
    pub fn new(
        store: Entity<CalculatorStore>,
        services: AppServices,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let draft = store.read(cx).custom_requirements.form.clone();
        cx.observe(&store, |_, _, cx| cx.notify()).detach();

        Self {
            store,
            services,
            company_name: text_input("Company name", draft.company_name, window, cx),
            contact_name: text_input("Your name", draft.contact_name, window, cx),
            email: text_input("name@company.com", draft.email, window, cx),
            phone: text_input("Phone number", draft.phone, window, cx),
            requirements: text_input(
                "Volumes, special handling, integrations…",
                draft.requirements,
                window,
                cx,
            ),
            errors: ValidationErrors::new(),
        }
    }

    fn read_form(
        &self,
        cx: &App,
    ) -> CustomRequirementsForm {
        CustomRequirementsForm {
            company_name: input_text(&self.company_name, cx),
            contact_name: input_text(&self.contact_name, cx),
            email: input_text(&self.email, cx),
            phone: input_text(&self.phone, cx),
            requirements: input_text(&self.requirements, cx),
        }
    }

    fn submit(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        let form = self.read_form(cx);
        let outcome = self.store.update(cx, |store, store_cx| {
            store.update_custom_requirements(form);
            let outcome = store.submit_custom_requirements();
            store_cx.notify();
            outcome
        });
        let state = self.store.read(cx).custom_requirements.clone();

        match outcome {
            Ok(request) => {
                self.errors = ValidationErrors::new();
                self.services
                    .spawn_persist("record quote request", move |repo| async move {
                        let stored = record_quote_request(repo.as_ref(), &state, request).await?;
                        info!(id = stored.id, company = %stored.company_name, "quote requested");
                        Ok::<(), RepositoryError>(())
                    });
            }
            Err(errors) => {
                self.errors = errors;
                self.services
                    .spawn_persist("save custom requirements", move |repo| async move {
                        repo.save_custom_requirements(&state).await
                    });
            }
        }
        cx.notify();
    }

    fn reset(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.store.update(cx, |store, store_cx| {
            store.reset_custom_requirements();
            store_cx.notify();
        });
        for input in [
            &self.company_name,
            &self.contact_name,
            &self.email,
            &self.phone,
            &self.requirements,
        ] {
            set_input_text(input, "", window, cx);
        }
        self.errors = ValidationErrors::new();

        let state = self.store.read(cx).custom_requirements.clone();
        self.services
            .spawn_persist("save custom requirements", move |repo| async move {
                repo.save_custom_requirements(&state).await
            });
        cx.notify();
    }

    fn render_form(
        &self,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        v_flex()
            .gap_3()
            .child(field_row(
                input_row(&self.company_name, "Company name:"),
                &self.errors,
                "company_name",
                cx,
            ))
            .child(field_row(
                input_row(&self.contact_name, "Contact name:"),
                &self.errors,
                "contact_name",
                cx,
            ))
            .child(field_row(
                input_row(&self.email, "Email:"),
                &self.errors,
                "email",
                cx,
            ))
            .child(field_row(
                input_row(&self.phone, "Phone:"),
                &self.errors,
                "phone",
                cx,
            ))
            .child(field_row(
                input_row(&self.requirements, "Your requirements:"),
                &self.errors,
                "requirements",
                cx,
            ))
            .child(general_errors(&self.errors, cx))
            .child(
                h_flex()
                    .gap_4()
                    .justify_center()
                    .child(make_outline_button(
                        "custom-reset",
                        "Clear",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    ))
                    .child(make_button(
                        "custom-submit",
                        "Request a Quote",
                        cx.listener(|this, _: &ClickEvent, _, cx| this.submit(cx)),
                    )),
            )
    }
}

impl Render for CustomRequirementsView {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let header = page_header(
            Calculator::CustomRequirements.title(),
            Calculator::CustomRequirements.description(),
            cx,
        );
        let report = {
            let store = self.store.read(cx);
            (store.custom_requirements_phase() == Phase::Results)
                .then(|| Report::custom_requirements(&store.custom_requirements.form))
        };
        let body = match report {
            Some(report) => v_flex()
                .gap_4()
                .child(report_view(&report, cx))
                .child(
                    h_flex().justify_center().child(make_button(
                        "custom-new",
                        "Submit Another Request",
                        cx.listener(|this, _: &ClickEvent, window, cx| this.reset(window, cx)),
                    )),
                ),
            None => div().child(self.render_form(cx)),
        };

        v_flex().gap_5().child(header).child(body)
    }
}
