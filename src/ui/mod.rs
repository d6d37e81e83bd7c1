mod app;
mod login;
mod shift_dialog;
mod theme;
mod views;

pub use app::ShiftboardApp;
pub use theme::{setup_fonts, setup_theme};
