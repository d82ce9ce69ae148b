//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the scene.
//!
//! - [`UiManager`] - ImGui context, winit platform and wgpu renderer
//! - [`panel`] - The Wave Studio panel and its persistent state
//!
//! The overlay gets input first. While it wants the mouse or keyboard,
//! events don't reach the camera.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{wave_studio_panel, WaveStudio};
