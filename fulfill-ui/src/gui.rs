use gpui::{
    App, AppContext, Application, Bounds, KeyBinding, Menu, MenuItem, WindowBounds, WindowOptions,
};
use gpui_component::Root;
use tracing::{error, info};

use crate::app::AppServices;
use crate::components::{MainWindow, WindowPreferences};
use crate::state::CalculatorStore;
use crate::{Quit, quit};

pub fn setup_app(app_cx: &mut App) {
    // Must run before any gpui-component widget is built.
    gpui_component::init(app_cx);

    app_cx.activate(true);

    #[cfg(target_os = "macos")]
    app_cx.bind_keys([KeyBinding::new("cmd-q", Quit, None)]);

    #[cfg(not(target_os = "macos"))]
    app_cx.bind_keys([
        KeyBinding::new("ctrl-q", Quit, None),
        KeyBinding::new("alt-F4", Quit, None),
    ]);

    app_cx.on_action(quit);

    app_cx.set_menus(vec![Menu {
        name: "Fulfillment Calculators".into(),
        items: vec![MenuItem::action("Quit", Quit)],
    }]);
}

/// Opens the calculator window. Returns once the window is on screen.
pub fn open_main_window(
    services: AppServices,
    store: CalculatorStore,
    preferences: WindowPreferences,
    app_cx: &mut App,
) -> anyhow::Result<()> {
    let bounds = Bounds::centered(None, preferences.size, app_cx);
    let options = WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(bounds)),
        ..Default::default()
    };

    app_cx.open_window(options, |window, cx| {
        let store = cx.new(|_| store);
        let main = cx.new(|cx| MainWindow::new(services, store, window, cx));
        cx.new(|cx| Root::new(main, window, cx))
    })?;
    info!("main window opened");
    Ok(())
}

/// Runs the desktop app until the last window closes or Quit fires.
pub fn run_gui(
    services: AppServices,
    store: CalculatorStore,
) {
    Application::new()
        .with_assets(gpui_component_assets::Assets)
        .run(move |app_cx: &mut App| {
            setup_app(app_cx);
            if let Err(e) = open_main_window(services, store, WindowPreferences::default(), app_cx)
            {
                error!(error = %format!("{e:#}"), "cannot open main window");
                app_cx.quit();
            }
        });
}
