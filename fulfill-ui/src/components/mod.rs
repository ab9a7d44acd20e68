pub mod custom_requirements;
pub mod dialogs;
pub mod free_shipping;
pub mod pick_pack;
pub mod receiving;
pub mod standard_fulfillment;
pub mod storage;
pub mod window;

use fulfill_core::calculations::{GENERAL_FIELD, ValidationErrors};
use gpui::prelude::FluentBuilder;
use gpui::{
    App, AppContext, ClickEvent, Context, Div, Entity, ParentElement, Pixels, SharedString, Size,
    Styled, TextAlign, Window, div, px,
};
use gpui_component::button::{Button, ButtonVariants};
use gpui_component::input::{Input, InputState, MaskPattern};
use gpui_component::select::SelectState;
use gpui_component::{ActiveTheme, IndexPath, Sizable, h_flex, v_flex};
use rust_decimal::Decimal;

pub use custom_requirements::CustomRequirementsView;
pub use free_shipping::FreeShippingView;
pub use pick_pack::PickPackView;
pub use receiving::ReceivingView;
pub use standard_fulfillment::StandardFulfillmentView;
pub use storage::StorageView;
pub use window::MainWindow;

use crate::models::Report;
use crate::utils::{INVALID_NUMBER, parse_count, parse_decimal};

pub type OptionList = SelectState<Vec<SharedString>>;

#[derive(Debug, Clone, Copy)]
pub struct WindowPreferences {
    pub size: Size<Pixels>,
}

impl Default for WindowPreferences {
    fn default() -> Self {
        Self::new(px(1080.0), px(820.0))
    }
}

impl WindowPreferences {
    pub fn new(
        width: impl Into<Pixels>,
        height: impl Into<Pixels>,
    ) -> Self {
        Self {
            size: Size {
                width: width.into(),
                height: height.into(),
            },
        }
    }
}

/// Primary action button.
pub fn make_button(
    id: impl Into<SharedString>,
    label: impl Into<SharedString>,
    on_click: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
) -> Button {
    Button::new(id.into())
        .primary()
        .large()
        .w(px(180.))
        .label(label.into())
        .on_click(on_click)
}

/// Secondary action button, e.g. reset.
pub fn make_outline_button(
    id: impl Into<SharedString>,
    label: impl Into<SharedString>,
    on_click: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
) -> Button {
    Button::new(id.into())
        .outline()
        .large()
        .w(px(180.))
        .label(label.into())
        .on_click(on_click)
}

/// Numeric input with thousands separators and up to `fraction` decimals.
pub fn number_input<V: 'static>(
    placeholder: impl Into<SharedString>,
    value: impl Into<SharedString>,
    fraction: usize,
    window: &mut Window,
    cx: &mut Context<V>,
) -> Entity<InputState> {
    let pattern = MaskPattern::Number {
        separator: Some(','),
        fraction: Some(fraction),
    };
    let placeholder = placeholder.into();
    let value = value.into();
    cx.new(|input_cx| {
        InputState::new(window, input_cx)
            .mask_pattern(pattern)
            .placeholder(placeholder)
            .default_value(value)
    })
}

pub fn text_input<V: 'static>(
    placeholder: impl Into<SharedString>,
    value: impl Into<SharedString>,
    window: &mut Window,
    cx: &mut Context<V>,
) -> Entity<InputState> {
    let placeholder = placeholder.into();
    let value = value.into();
    cx.new(|input_cx| {
        InputState::new(window, input_cx)
            .placeholder(placeholder)
            .default_value(value)
    })
}

/// Dropdown over fixed labels, starting at `selected`.
pub fn option_list<V: 'static>(
    labels: impl IntoIterator<Item = &'static str>,
    selected: usize,
    window: &mut Window,
    cx: &mut Context<V>,
) -> Entity<OptionList> {
    let items: Vec<SharedString> = labels.into_iter().map(SharedString::from).collect();
    cx.new(|select_cx| {
        SelectState::new(
            items,
            Some(IndexPath::default().row(selected)),
            window,
            select_cx,
        )
    })
}

pub fn select_option(
    state: &Entity<OptionList>,
    index: usize,
    window: &mut Window,
    cx: &mut App,
) {
    state.update(cx, |select, select_cx| {
        select.set_selected_index(Some(IndexPath::default().row(index)), window, select_cx)
    });
}

pub fn selected_label(
    state: &Entity<OptionList>,
    cx: &App,
) -> Option<SharedString> {
    state.read(cx).selected_value().cloned()
}

pub fn input_text(
    state: &Entity<InputState>,
    cx: &App,
) -> String {
    state.read(cx).value().to_string()
}

pub fn set_input_text(
    state: &Entity<InputState>,
    value: impl Into<SharedString>,
    window: &mut Window,
    cx: &mut App,
) {
    let value = value.into();
    state.update(cx, |input, input_cx| input.set_value(value, window, input_cx));
}

/// Reads a decimal field, recording a field error when it is not a number.
pub fn read_decimal(
    state: &Entity<InputState>,
    field: &str,
    errors: &mut ValidationErrors,
    cx: &App,
) -> Decimal {
    decimal_field(&input_text(state, cx), field, errors)
}

/// Parses already-read field text; unreadable text counts as zero.
pub fn decimal_field(
    text: &str,
    field: &str,
    errors: &mut ValidationErrors,
) -> Decimal {
    parse_decimal(text).unwrap_or_else(|_| {
        errors.add(field, INVALID_NUMBER);
        Decimal::ZERO
    })
}

/// Reads a whole-number field, recording a field error when it is not one.
pub fn read_count(
    state: &Entity<InputState>,
    field: &str,
    errors: &mut ValidationErrors,
    cx: &App,
) -> u32 {
    parse_count(&input_text(state, cx)).unwrap_or_else(|_| {
        errors.add(field, INVALID_NUMBER);
        0
    })
}

/// Label column plus content, shared by every form row.
pub fn labeled_row(label: impl Into<SharedString>) -> Div {
    h_flex().items_center().gap_5().p(px(2.)).child(
        div()
            .min_w(px(220.))
            .text_align(TextAlign::Right)
            .child(label.into()),
    )
}

pub fn input_row(
    state: &Entity<InputState>,
    label: impl Into<SharedString>,
) -> Div {
    labeled_row(label).child(Input::new(state).flex_grow())
}

/// A form row with the field's validation message underneath, if any.
pub fn field_row(
    row: Div,
    errors: &ValidationErrors,
    field: &str,
    cx: &App,
) -> Div {
    v_flex()
        .gap_1()
        .child(row)
        .children(errors.message_for(field).map(|message| {
            div()
                .pl(px(245.))
                .text_sm()
                .text_color(cx.theme().danger)
                .child(message.to_string())
        }))
}

/// Messages not tied to a single field.
pub fn general_errors(
    errors: &ValidationErrors,
    cx: &App,
) -> Div {
    v_flex().gap_1().children(errors.message_for(GENERAL_FIELD).map(|message| {
        div()
            .text_sm()
            .text_color(cx.theme().danger)
            .child(message.to_string())
    }))
}

pub fn page_header(
    title: impl Into<SharedString>,
    subtitle: impl Into<SharedString>,
    cx: &App,
) -> Div {
    v_flex()
        .gap_1()
        .child(div().text_2xl().child(title.into()))
        .child(
            div()
                .text_sm()
                .text_color(cx.theme().muted_foreground)
                .child(subtitle.into()),
        )
}

/// Renders a [`Report`] as headed sections of label/value rows.
pub fn report_view(
    report: &Report,
    cx: &App,
) -> Div {
    let border = cx.theme().border;
    let muted = cx.theme().muted_foreground;

    v_flex()
        .gap_4()
        .child(div().text_xl().child(report.title.clone()))
        .children(report.sections.iter().map(|section| {
            v_flex()
                .gap_1()
                .p_3()
                .rounded_md()
                .border_1()
                .border_color(border)
                .child(div().font_weight(gpui::FontWeight::SEMIBOLD).child(section.heading.clone()))
                .children(section.rows.iter().map(|row| {
                    h_flex()
                        .justify_between()
                        .gap_4()
                        .child(div().text_sm().child(row.label.clone()))
                        .child(div().text_sm().child(row.value.clone()))
                }))
        }))
        .when(!report.notes.is_empty(), |this| {
            this.child(
                v_flex().gap_1().children(
                    report
                        .notes
                        .iter()
                        .map(|note| div().text_sm().text_color(muted).child(format!("• {note}"))),
                ),
            )
        })
}
