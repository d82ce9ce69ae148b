//! # Water Surface
//!
//! A square grid mesh lying in the XZ plane plus the wave field that animates
//! it. The waves live in a uniform buffer (binding 1 of the global group) so
//! the water shader can displace vertices; the same field is evaluated on the
//! CPU to place floating objects and, optionally, to ripple the mesh itself.

use cgmath::Vector3;

use super::wave::{Wave, WaveField, WaveFunction, WaveSpectrum};
use crate::gfx::geometry::generate_grid;
use crate::gfx::scene::mesh::{Mesh, MeshUsage};
use crate::gfx::scene::obj_loader::compute_vertex_normals;
use crate::wgpu_utils::uniform_buffer::UniformBuffer;

/// Uniform buffer holding the whole wave field
pub type WaveUBO = UniformBuffer<WaveField>;

/// Material the renderer shades the water surface with
pub const WATER_MATERIAL: &str = "water";

/// Construction parameters of a [`Water`] surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterConfig {
    /// Grid subdivisions per side
    pub resolution: u32,
    /// Side length in world units
    pub length: f32,
    pub wave_function: WaveFunction,
    /// Displace the mesh on the CPU every frame instead of in the shader
    pub ripple_mesh: bool,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            resolution: 1000,
            length: 50.0,
            wave_function: WaveFunction::Gerstner,
            ripple_mesh: false,
        }
    }
}

pub struct Water {
    config: WaterConfig,
    mesh: Mesh,
    rest_positions: Vec<[f32; 3]>,
    waves: WaveField,
    waves_ubo: Option<WaveUBO>,
    waves_dirty: bool,
}

impl Water {
    /// Creates the surface and generates its grid mesh
    ///
    /// All waves start flat.
    ///
    /// # Panics
    /// Panics if `config.resolution` is zero
    pub fn new(config: WaterConfig) -> Self {
        assert!(config.resolution > 0, "water resolution must be positive");

        let mut water = Self {
            config,
            mesh: Mesh::new("water", MeshUsage::Dynamic),
            rest_positions: Vec::new(),
            waves: WaveField::flat(),
            waves_ubo: None,
            waves_dirty: true,
        };
        water.generate_mesh();
        water
    }

    /// Rebuilds the flat grid from the configured resolution and length
    ///
    /// Releases any uploaded buffers; call `setup_buffers` again before the
    /// next draw. Until then the water is skipped.
    pub fn generate_mesh(&mut self) {
        let grid = generate_grid(self.config.resolution, self.config.length);
        self.mesh.set_attributes(
            &grid.positions,
            &grid.normals,
            Some(&grid.tex_coords),
            &grid.indices,
        );
        self.rest_positions = grid.positions;

        log::info!(
            "water grid {}x{} over {} units: {} vertices, {} indices",
            self.config.resolution,
            self.config.resolution,
            self.config.length,
            self.mesh.vertex_count(),
            self.mesh.index_count()
        );
    }

    /// Replaces the wave field with a freshly generated one
    pub fn generate_waves(&mut self, spectrum: &WaveSpectrum) {
        self.waves = spectrum.generate();
        self.waves_dirty = true;
        log::info!(
            "generated {} waves (seed {}, heading {}°, spread ±{}°)",
            self.waves.active_count(),
            spectrum.seed,
            spectrum.direction_deg,
            spectrum.spread_deg
        );
    }

    /// Replaces the wave field with explicit waves
    pub fn set_waves(&mut self, waves: &[Wave]) {
        self.waves = WaveField::from_waves(waves);
        self.waves_dirty = true;
    }

    /// Uploads the grid to the GPU
    pub fn setup_buffers(&mut self, device: &wgpu::Device) {
        self.mesh.upload(device);
    }

    /// Allocates the wave uniform buffer
    ///
    /// Only the first call allocates; the buffer size never changes.
    pub fn setup_waves_ubo(&mut self, device: &wgpu::Device) {
        if self.waves_ubo.is_none() {
            self.waves_ubo = Some(WaveUBO::new_with_data(device, &self.waves));
            self.waves_dirty = false;
        }
    }

    /// Pushes the wave field to the GPU if it changed since the last upload
    ///
    /// # Returns
    /// True if a write was queued
    pub fn update_waves_ubo(&mut self, queue: &wgpu::Queue) -> bool {
        if !self.waves_dirty {
            return false;
        }
        match &mut self.waves_ubo {
            Some(ubo) => {
                ubo.force_update_content(queue, self.waves);
                self.waves_dirty = false;
                true
            }
            None => false,
        }
    }

    /// Displaced grid positions and their normals at time `t`
    pub fn displace_surface(&self, t: f32) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        let function = self.config.wave_function;
        let positions: Vec<[f32; 3]> = self
            .rest_positions
            .iter()
            .map(|&rest| self.waves.displacement(rest.into(), t, function).into())
            .collect();
        let normals = compute_vertex_normals(&positions, self.mesh.indices());
        (positions, normals)
    }

    /// Ripples the mesh on the CPU when `ripple_mesh` is enabled
    pub fn update_surface(&mut self, queue: &wgpu::Queue, t: f32) {
        if !self.config.ripple_mesh {
            return;
        }
        let (positions, normals) = self.displace_surface(t);
        self.mesh.update_buffers(queue, &positions, &normals);
    }

    /// World position a rest point on the surface moves to at time `t`
    pub fn get_displacement(&self, pos: Vector3<f32>, t: f32) -> Vector3<f32> {
        self.waves.displacement(pos, t, self.config.wave_function)
    }

    /// Like [`get_displacement`](Self::get_displacement) for a raw function code
    ///
    /// Unknown codes leave the position unchanged.
    pub fn get_displacement_raw(&self, pos: Vector3<f32>, t: f32, code: u32) -> Vector3<f32> {
        match WaveFunction::try_from(code) {
            Ok(function) => self.waves.displacement(pos, t, function),
            Err(err) => {
                log::debug!("{err}, position left unchanged");
                pos
            }
        }
    }

    pub fn config(&self) -> &WaterConfig {
        &self.config
    }

    pub fn wave_function(&self) -> WaveFunction {
        self.config.wave_function
    }

    pub fn set_wave_function(&mut self, function: WaveFunction) {
        self.config.wave_function = function;
    }

    pub fn waves(&self) -> &WaveField {
        &self.waves
    }

    pub fn waves_ubo(&self) -> Option<&WaveUBO> {
        self.waves_ubo.as_ref()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Whether the shader should displace vertices itself
    pub fn displaces_in_shader(&self) -> bool {
        !self.config.ripple_mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector2;
    use std::f32::consts::PI;

    fn small_water(function: WaveFunction) -> Water {
        Water::new(WaterConfig {
            resolution: 4,
            length: 4.0,
            wave_function: function,
            ripple_mesh: false,
        })
    }

    #[test]
    fn test_grid_counts() {
        let water = small_water(WaveFunction::Sine);
        assert_eq!(water.mesh().vertex_count(), 25);
        assert_eq!(water.mesh().index_count(), 96);
        assert_eq!(water.mesh().usage(), MeshUsage::Dynamic);
    }

    #[test]
    fn test_single_sine_wave_at_origin() {
        let mut water = small_water(WaveFunction::Sine);
        water.set_waves(&[Wave::new(0.5, 2.0 * PI, 0.0, 0.0, Vector2::new(0.0, 1.0))]);

        let p = water.get_displacement(Vector3::new(0.0, 0.0, 0.0), 0.0);
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6 && p.z.abs() < 1e-6);

        // A quarter wavelength down the wave direction sits on the crest
        let crest = water.get_displacement(Vector3::new(0.0, 0.0, PI / 2.0), 0.0);
        assert!((crest.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_regenerated_grid_waits_for_upload() {
        let mut water = small_water(WaveFunction::Sine);
        water.generate_mesh();
        assert_eq!(water.mesh().vertex_count(), 25);
        assert!(!water.mesh().is_drawable());
    }

    #[test]
    fn test_flat_water_does_not_move() {
        let water = small_water(WaveFunction::Gerstner);
        let p = Vector3::new(1.25, 0.0, -0.5);
        assert_eq!(water.get_displacement(p, 3.0), p);
    }

    #[test]
    fn test_unknown_function_code_returns_input() {
        let mut water = small_water(WaveFunction::Gerstner);
        water.generate_waves(&WaveSpectrum::default());
        let p = Vector3::new(0.3, 0.0, 0.7);
        assert_eq!(water.get_displacement_raw(p, 1.0, 7), p);
        assert_eq!(
            water.get_displacement_raw(p, 1.0, WaveFunction::Gerstner.code()),
            water.get_displacement(p, 1.0)
        );
    }

    #[test]
    fn test_displaced_surface_keeps_vertex_count() {
        let mut water = small_water(WaveFunction::Gerstner);
        water.generate_waves(&WaveSpectrum::default());
        let (positions, normals) = water.displace_surface(2.5);
        assert_eq!(positions.len(), 25);
        assert_eq!(normals.len(), 25);
        for n in &normals {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((length - 1.0).abs() < 1e-4);
            assert!(n[1] > 0.0);
        }
    }

    #[test]
    fn test_regenerating_waves_is_reproducible() {
        let mut a = small_water(WaveFunction::Gerstner);
        let mut b = small_water(WaveFunction::Gerstner);
        let spectrum = WaveSpectrum {
            seed: 11,
            ..WaveSpectrum::default()
        };
        a.generate_waves(&spectrum);
        b.generate_waves(&spectrum);
        assert_eq!(a.waves(), b.waves());
    }

    #[test]
    #[should_panic]
    fn test_zero_resolution_panics() {
        Water::new(WaterConfig {
            resolution: 0,
            ..WaterConfig::default()
        });
    }
}
