//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title and status bars, overlays
//! - `input`: keyboard event handling per screen
//! - `styles`: colors and text styling
//! - `screens`: content for each route

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
