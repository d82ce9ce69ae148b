//! # Parametric Waves
//!
//! A [`Wave`] is one travelling wave described by amplitude, wavelength,
//! speed, steepness and a horizontal direction. Up to [`MAX_WAVES`] of them
//! form a [`WaveField`], which is uploaded verbatim as the wave uniform block
//! and summed on the CPU to place floating objects.
//!
//! Three closed-form profiles are supported, selected by [`WaveFunction`]:
//!
//! - **Sine**: `a * sin(f)`
//! - **Steep sine**: `2a * ((sin(f) + 1) / 2)^k`, peaked crests for `k > 1`
//! - **Gerstner**: trochoidal motion, `(k*a*d.x*cos(f), a*sin(f), k*a*d.y*cos(f))`
//!
//! where `f = dot(p.xz, d) * frequency + t * phase`.

use bytemuck::{Pod, Zeroable};
use cgmath::{Deg, InnerSpace, Rad, Vector2, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::error::OceanError;

/// Number of wave slots in a [`WaveField`] and in the shader's uniform array
pub const MAX_WAVES: usize = 16;

/// One wave record, laid out for std140 uniform arrays
///
/// The direction is padded to a `vec4` so every record is 32 bytes and the
/// scalar fields start on a 16-byte boundary.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Wave {
    direction: [f32; 4],
    amplitude: f32,
    frequency: f32,
    phase: f32,
    steepness: f32,
}

impl Wave {
    /// Creates a wave from physical parameters
    ///
    /// # Arguments
    /// * `amplitude` - Crest height above rest level
    /// * `wavelength` - Crest-to-crest distance, must be positive
    /// * `speed` - Crest speed along `direction`
    /// * `steepness` - Crest sharpness (exponent for steep sine, horizontal
    ///   factor for Gerstner)
    /// * `direction` - Travel direction on the XZ plane, normalized here
    ///
    /// A zero direction is stored as zero rather than normalized.
    pub fn new(
        amplitude: f32,
        wavelength: f32,
        speed: f32,
        steepness: f32,
        direction: Vector2<f32>,
    ) -> Self {
        debug_assert!(wavelength > 0.0, "wavelength must be positive");
        let frequency = TAU / wavelength;
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            Vector2::new(0.0, 0.0)
        };

        Self {
            direction: [direction.x, direction.y, 0.0, 0.0],
            amplitude,
            frequency,
            phase: speed * frequency,
            steepness,
        }
    }

    /// A wave with zero amplitude, contributing nothing anywhere
    pub fn flat() -> Self {
        Self::new(0.0, 1.0, 0.0, 0.0, Vector2::new(0.0, 0.0))
    }

    pub fn direction(&self) -> Vector2<f32> {
        Vector2::new(self.direction[0], self.direction[1])
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn steepness(&self) -> f32 {
        self.steepness
    }

    pub fn wavelength(&self) -> f32 {
        TAU / self.frequency
    }

    pub fn speed(&self) -> f32 {
        self.phase / self.frequency
    }

    pub fn is_flat(&self) -> bool {
        self.amplitude == 0.0
    }

    /// Phase angle of this wave at a surface point and time
    fn angle(&self, pos: Vector3<f32>, time: f32) -> f32 {
        (pos.x * self.direction[0] + pos.z * self.direction[1]) * self.frequency
            + time * self.phase
    }
}

impl Default for Wave {
    fn default() -> Self {
        Self::flat()
    }
}

/// Height of a plain sine wave
pub fn sine(pos: Vector3<f32>, wave: &Wave, time: f32) -> f32 {
    wave.amplitude * wave.angle(pos, time).sin()
}

/// Height of a sine wave raised to `steepness`, always in `[0, 2a]`
pub fn steep_sine(pos: Vector3<f32>, wave: &Wave, time: f32) -> f32 {
    let normalized = (wave.angle(pos, time).sin() + 1.0) * 0.5;
    2.0 * wave.amplitude * normalized.powf(wave.steepness)
}

/// Gerstner displacement (horizontal and vertical) of a surface point
pub fn gerstner(pos: Vector3<f32>, wave: &Wave, time: f32) -> Vector3<f32> {
    let angle = wave.angle(pos, time);
    let (sin, cos) = angle.sin_cos();
    let horizontal = wave.steepness * wave.amplitude * cos;

    Vector3::new(
        horizontal * wave.direction[0],
        wave.amplitude * sin,
        horizontal * wave.direction[1],
    )
}

/// Displacement profile applied to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
#[repr(u32)]
pub enum WaveFunction {
    Sine = 0,
    SteepSine = 1,
    #[default]
    Gerstner = 2,
}

impl WaveFunction {
    pub const ALL: [WaveFunction; 3] = [Self::Sine, Self::SteepSine, Self::Gerstner];

    /// Integer code understood by the water shader
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sine => "Sine",
            Self::SteepSine => "Steep sine",
            Self::Gerstner => "Gerstner",
        }
    }
}

impl TryFrom<u32> for WaveFunction {
    type Error = OceanError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Sine),
            1 => Ok(Self::SteepSine),
            2 => Ok(Self::Gerstner),
            other => Err(OceanError::UnknownWaveFunction(other)),
        }
    }
}

/// Fixed-size set of waves, identical in memory to the shader's wave block
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct WaveField {
    waves: [Wave; MAX_WAVES],
}

impl WaveField {
    /// A field where every slot is a flat wave
    pub fn flat() -> Self {
        Self {
            waves: [Wave::flat(); MAX_WAVES],
        }
    }

    /// Fills the leading slots with `waves`, the rest stay flat
    ///
    /// Waves beyond [`MAX_WAVES`] are dropped with a warning.
    pub fn from_waves(waves: &[Wave]) -> Self {
        if waves.len() > MAX_WAVES {
            log::warn!(
                "{} waves requested, only the first {} are kept",
                waves.len(),
                MAX_WAVES
            );
        }
        let mut field = Self::flat();
        for (slot, wave) in field.waves.iter_mut().zip(waves) {
            *slot = *wave;
        }
        field
    }

    pub fn waves(&self) -> &[Wave; MAX_WAVES] {
        &self.waves
    }

    pub fn active_count(&self) -> usize {
        self.waves.iter().filter(|w| !w.is_flat()).count()
    }

    /// Displaced position of a rest point on the surface
    ///
    /// Sine profiles only move the point vertically and report
    /// `(x, sum of heights, z)`. Gerstner also shifts it horizontally.
    pub fn displacement(&self, pos: Vector3<f32>, time: f32, function: WaveFunction) -> Vector3<f32> {
        match function {
            WaveFunction::Sine => {
                let height = self.waves.iter().map(|w| sine(pos, w, time)).sum();
                Vector3::new(pos.x, height, pos.z)
            }
            WaveFunction::SteepSine => {
                let height = self.waves.iter().map(|w| steep_sine(pos, w, time)).sum();
                Vector3::new(pos.x, height, pos.z)
            }
            WaveFunction::Gerstner => {
                let offset = self
                    .waves
                    .iter()
                    .fold(Vector3::new(0.0, 0.0, 0.0), |acc, w| acc + gerstner(pos, w, time));
                Vector3::new(pos.x + offset.x, offset.y, pos.z + offset.z)
            }
        }
    }
}

impl Default for WaveField {
    fn default() -> Self {
        Self::flat()
    }
}

/// Parameters for randomized, reproducible wave generation
///
/// Each wave draws amplitude, wavelength, speed and steepness uniformly from
/// the given ranges, and travels at `direction_deg` plus a uniform offset in
/// `[-spread_deg, spread_deg]`. Equal parameters give bit-identical fields.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSpectrum {
    pub seed: u64,
    pub wave_count: usize,
    pub direction_deg: f32,
    pub spread_deg: f32,
    /// Upper steepness bound, waves draw from `[steepness / 2, steepness]`
    pub steepness: f32,
    pub amplitude_range: (f32, f32),
    pub wavelength_range: (f32, f32),
    pub speed_range: (f32, f32),
}

impl Default for WaveSpectrum {
    fn default() -> Self {
        Self {
            seed: 2,
            wave_count: MAX_WAVES,
            direction_deg: 300.0,
            spread_deg: 35.0,
            steepness: 0.15,
            amplitude_range: (0.02, 0.18),
            wavelength_range: (2.0, 14.0),
            speed_range: (0.6, 2.2),
        }
    }
}

/// Uniform draw in `[lo, hi]`, collapsing to `lo` for empty or inverted ranges
fn draw(rng: &mut StdRng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

impl WaveSpectrum {
    pub fn generate(&self) -> WaveField {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let spread = self.spread_deg.abs();
        let count = self.wave_count.min(MAX_WAVES);
        let min_wavelength = 1e-3;

        let mut field = WaveField::flat();
        for slot in field.waves.iter_mut().take(count) {
            let amplitude = draw(&mut rng, self.amplitude_range).max(0.0);
            let wavelength = draw(&mut rng, self.wavelength_range).max(min_wavelength);
            let speed = draw(&mut rng, self.speed_range);
            let steepness = draw(&mut rng, (self.steepness * 0.5, self.steepness)).max(0.0);
            let heading = self.direction_deg + draw(&mut rng, (-spread, spread));

            let Rad(radians) = Rad::from(Deg(heading));
            let direction = Vector2::new(radians.cos(), radians.sin());
            *slot = Wave::new(amplitude, wavelength, speed, steepness, direction);
        }
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f32, z: f32) -> Vector3<f32> {
        Vector3::new(x, 0.0, z)
    }

    #[test]
    fn test_wave_derived_parameters() {
        let wave = Wave::new(0.5, TAU, 2.0, 1.0, Vector2::new(0.0, 3.0));
        assert!((wave.frequency() - 1.0).abs() < 1e-6);
        assert!((wave.phase() - 2.0).abs() < 1e-6);
        assert!((wave.wavelength() - TAU).abs() < 1e-5);
        assert!((wave.speed() - 2.0).abs() < 1e-6);
        assert_eq!(wave.direction(), Vector2::new(0.0, 1.0));
    }

    #[test]
    fn test_direction_is_normalized() {
        let inputs = [
            Vector2::new(3.0, 4.0),
            Vector2::new(-0.001, 0.002),
            Vector2::new(1e4, -7.0),
            Vector2::new(0.0, -2.5),
        ];
        for input in inputs {
            let wave = Wave::new(1.0, 4.0, 1.0, 0.5, input);
            assert!((wave.direction().magnitude() - 1.0).abs() < 1e-5, "{:?}", input);
        }
    }

    #[test]
    fn test_wave_record_is_std140_sized() {
        assert_eq!(std::mem::size_of::<Wave>(), 32);
        assert_eq!(std::mem::size_of::<WaveField>(), 32 * MAX_WAVES);
    }

    #[test]
    fn test_flat_wave_contributes_nothing() {
        let flat = Wave::flat();
        for &(x, z, t) in &[(0.0, 0.0, 0.0), (3.5, -2.0, 10.0), (-40.0, 17.0, 999.0)] {
            assert_eq!(sine(pos(x, z), &flat, t), 0.0);
            assert_eq!(steep_sine(pos(x, z), &flat, t), 0.0);
            let g = gerstner(pos(x, z), &flat, t);
            assert_eq!((g.x, g.y, g.z), (0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_flat_field_leaves_rest_points_unmoved() {
        let field = WaveField::flat();
        let p = Vector3::new(1.5, 0.0, -2.0);
        for function in WaveFunction::ALL {
            assert_eq!(field.displacement(p, 12.0, function), p);
        }
    }

    #[test]
    fn test_displacement_is_continuous_in_time() {
        let wave = Wave::new(0.8, 5.0, 1.5, 2.0, Vector2::new(1.0, 1.0));
        let field = WaveField::from_waves(&[wave]);
        let p = pos(2.0, -1.0);
        let eps = 1e-3;
        for function in WaveFunction::ALL {
            for &t in &[0.0, 1.0, 50.0] {
                let a = field.displacement(p, t, function);
                let b = field.displacement(p, t + eps, function);
                assert!((a - b).magnitude() < 0.05, "{:?} jumped at t={}", function, t);
            }
        }
    }

    #[test]
    fn test_steep_sine_stays_within_bounds() {
        let wave = Wave::new(0.5, 3.0, 1.0, 4.0, Vector2::new(1.0, 0.0));
        for i in 0..100 {
            let h = steep_sine(pos(i as f32 * 0.1, 0.0), &wave, 0.3);
            assert!((0.0..=1.0 + 1e-6).contains(&h));
        }
    }

    #[test]
    fn test_gerstner_moves_along_direction() {
        let wave = Wave::new(1.0, TAU, 0.0, 0.5, Vector2::new(0.0, 1.0));
        // cos(0) = 1 so the horizontal offset is k*a along +z
        let d = gerstner(pos(0.0, 0.0), &wave, 0.0);
        assert!(d.x.abs() < 1e-6);
        assert!(d.y.abs() < 1e-6);
        assert!((d.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wave_function_codes() {
        for function in WaveFunction::ALL {
            assert_eq!(WaveFunction::try_from(function.code()), Ok(function));
        }
        assert_eq!(
            WaveFunction::try_from(7),
            Err(OceanError::UnknownWaveFunction(7))
        );
    }

    #[test]
    fn test_from_waves_truncates_and_pads() {
        let wave = Wave::new(0.1, 2.0, 1.0, 0.2, Vector2::new(1.0, 0.0));
        let field = WaveField::from_waves(&[wave; MAX_WAVES + 4]);
        assert_eq!(field.active_count(), MAX_WAVES);

        let field = WaveField::from_waves(&[wave, wave]);
        assert_eq!(field.active_count(), 2);
        assert!(field.waves()[2].is_flat());
    }

    #[test]
    fn test_generation_is_reproducible() {
        let spectrum = WaveSpectrum::default();
        let a = spectrum.generate();
        let b = spectrum.generate();
        assert_eq!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&b));

        let other = WaveSpectrum {
            seed: 3,
            ..WaveSpectrum::default()
        }
        .generate();
        assert_ne!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&other));
    }

    #[test]
    fn test_generation_respects_ranges() {
        let spectrum = WaveSpectrum {
            wave_count: 6,
            direction_deg: 90.0,
            spread_deg: 10.0,
            ..WaveSpectrum::default()
        };
        let field = spectrum.generate();
        assert_eq!(field.active_count(), 6);

        let (min_a, max_a) = spectrum.amplitude_range;
        let cos_spread = Rad::from(Deg(10.0f32)).0.cos();
        for wave in field.waves().iter().take(6) {
            assert!(wave.amplitude() >= min_a && wave.amplitude() <= max_a);
            assert!(wave.steepness() <= spectrum.steepness + 1e-6);
            // within +-10 degrees of +z
            assert!(wave.direction().y >= cos_spread - 1e-5);
        }
    }

    #[test]
    fn test_generation_with_degenerate_ranges() {
        let spectrum = WaveSpectrum {
            wave_count: 3,
            spread_deg: 0.0,
            amplitude_range: (0.3, 0.3),
            wavelength_range: (4.0, 1.0),
            ..WaveSpectrum::default()
        };
        let field = spectrum.generate();
        for wave in field.waves().iter().take(3) {
            assert_eq!(wave.amplitude(), 0.3);
            assert!((wave.wavelength() - 4.0).abs() < 1e-5);
        }
    }
}
