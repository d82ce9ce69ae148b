//! Ocean Simulator
//!
//! A real-time procedural ocean built on wgpu and winit. A tessellated grid
//! is displaced by a superposition of sine, steep-sine or Gerstner waves,
//! with floating surfboards, an articulated dummy and a skybox around it.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod ocean;
pub mod time;
pub mod ui;
pub mod wgpu_utils;
pub mod world;

pub use app::OceanApp;
pub use config::AppConfig;
