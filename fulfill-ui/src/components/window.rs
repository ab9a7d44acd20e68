use gpui::prelude::FluentBuilder;
use gpui::{
    AnyView, App, AppContext, ClickEvent, Context, Entity, InteractiveElement, IntoElement,
    ParentElement, Render, StatefulInteractiveElement, Styled, Subscription, Window, div, px,
};
use gpui_component::button::{Button, ButtonVariants};
use gpui_component::{ActiveTheme, h_flex, v_flex};
use tracing::{debug, info};

use super::{
    CustomRequirementsView, FreeShippingView, PickPackView, ReceivingView,
    StandardFulfillmentView, StorageView,
};
use crate::app::AppServices;
use crate::state::{Calculator, CalculatorStore};

#[cfg(not(target_os = "linux"))]
use crate::Quit;
#[cfg(not(target_os = "linux"))]
use crate::quit;

/// Navigation column plus the active calculator.
///
/// Every calculator view is built once, so local form state survives
/// switching between them for the life of the window.
pub struct MainWindow {
    _window_close_subscription: Subscription,
    active: Calculator,
    standard_fulfillment: Entity<StandardFulfillmentView>,
    receiving: Entity<ReceivingView>,
    storage: Entity<StorageView>,
    pick_pack: Entity<PickPackView>,
    free_shipping: Entity<FreeShippingView>,
    custom_requirements: Entity<CustomRequirementsView>,
}

impl MainWindow {
    pub fn new(
        services: AppServices,
        store: Entity<CalculatorStore>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let subscription = cx.on_window_closed(|_cx: &mut App| {
            info!("main window closed");
            #[cfg(not(target_os = "linux"))]
            quit(&Quit, _cx);
        });

        let card = services.rate_card.clone();
        let standard_fulfillment = {
            let (store, services) = (store.clone(), services.clone());
            cx.new(|cx| StandardFulfillmentView::new(store, services, window, cx))
        };
        let receiving = cx.new(|cx| ReceivingView::new(card.receiving.clone(), window, cx));
        let storage = cx.new(|cx| StorageView::new(card.storage.clone(), window, cx));
        let pick_pack = cx.new(|cx| PickPackView::new(card.pick_pack.clone(), window, cx));
        let free_shipping = cx.new(|cx| FreeShippingView::new(window, cx));
        let custom_requirements =
            cx.new(|cx| CustomRequirementsView::new(store, services, window, cx));

        info!(card = %card.name, "main window constructed");
        Self {
            _window_close_subscription: subscription,
            active: Calculator::default(),
            standard_fulfillment,
            receiving,
            storage,
            pick_pack,
            free_shipping,
            custom_requirements,
        }
    }

    pub fn active(&self) -> Calculator {
        self.active
    }

    pub fn show(
        &mut self,
        calculator: Calculator,
        cx: &mut Context<Self>,
    ) {
        if self.active != calculator {
            debug!(calculator = calculator.title(), "switching calculator");
            self.active = calculator;
            cx.notify();
        }
    }

    fn active_view(&self) -> AnyView {
        match self.active {
            Calculator::StandardFulfillment => self.standard_fulfillment.clone().into(),
            Calculator::Receiving => self.receiving.clone().into(),
            Calculator::Storage => self.storage.clone().into(),
            Calculator::PickPack => self.pick_pack.clone().into(),
            Calculator::FreeShipping => self.free_shipping.clone().into(),
            Calculator::CustomRequirements => self.custom_requirements.clone().into(),
        }
    }
}

impl Render for MainWindow {
    fn render(
        &mut self,
        _: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let border = cx.theme().border;

        let mut nav = v_flex().gap_1().p_3().w(px(220.)).border_r_1().border_color(border);
        for (index, calculator) in Calculator::ALL.into_iter().enumerate() {
            let active = calculator == self.active;
            nav = nav.child(
                Button::new(("calculator", index))
                    .w_full()
                    .label(calculator.title())
                    .when(active, |button| button.primary())
                    .when(!active, |button| button.ghost())
                    .on_click(cx.listener(move |this, _: &ClickEvent, _, cx| {
                        this.show(calculator, cx)
                    })),
            );
        }

        h_flex()
            .size_full()
            .items_start()
            .child(nav)
            .child(
                div()
                    .id("calculator-content")
                    .flex_1()
                    .h_full()
                    .p_5()
                    .overflow_y_scroll()
                    .child(self.active_view()),
            )
    }
}
