pub mod app;
pub mod components;
pub mod csv_loader;
pub mod gui;
pub mod logging;
pub mod models;
pub mod settings;
pub mod state;
pub mod utils;

use gpui::{App, actions};
pub use gui::{run_gui, setup_app};
use tracing::info;

actions!(fulfill, [Quit]);

pub fn quit(
    _: &Quit,
    cx: &mut App,
) {
    info!("quitting");
    cx.quit();
}
