//! Ratatui front-end. `app` owns the state and key handling, `screens` and
//! `forms` hold per-view state, and `terminal` drives the event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
