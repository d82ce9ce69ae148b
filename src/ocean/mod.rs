//! # Ocean Simulation
//!
//! Parametric waves ([`wave`]) and the animated water surface built from
//! them ([`water`]).

pub mod wave;
pub mod water;

pub use water::{Water, WaterConfig};
pub use wave::{Wave, WaveField, WaveFunction, WaveSpectrum, MAX_WAVES};
