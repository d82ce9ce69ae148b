//! Wave Studio overlay panel
//!
//! Shows frame statistics and edits the wave spectrum. Edits are collected
//! in a [`WaveStudio`] while the frame renders and applied to the water
//! afterwards with [`WaveStudio::apply`].

use crate::gfx::scene::scene::Scene;
use crate::ocean::{Water, WaveFunction, WaveSpectrum, MAX_WAVES};

/// Panel state that outlives a frame
#[derive(Debug, Clone, PartialEq)]
pub struct WaveStudio {
    pub spectrum: WaveSpectrum,
    pub wave_function: WaveFunction,
    pub regenerate_requested: bool,
}

impl WaveStudio {
    pub fn new(spectrum: WaveSpectrum, wave_function: WaveFunction) -> Self {
        Self {
            spectrum,
            wave_function,
            regenerate_requested: false,
        }
    }

    /// Pushes pending edits into `water`
    ///
    /// Returns true when the wave field was regenerated.
    pub fn apply(&mut self, water: &mut Water) -> bool {
        if water.wave_function() != self.wave_function {
            log::info!("wave function set to {}", self.wave_function.label());
            water.set_wave_function(self.wave_function);
        }

        if std::mem::take(&mut self.regenerate_requested) {
            water.generate_waves(&self.spectrum);
            true
        } else {
            false
        }
    }
}

/// Draws the panel
///
/// # Arguments
/// * `fps` - Frames per second to display
pub fn wave_studio_panel(ui: &imgui::Ui, studio: &mut WaveStudio, scene: &Scene, fps: f32) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Wave Studio")
        .size([320.0, 340.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_statistics(ui, scene, fps);
            ui.separator();
            render_wave_controls(ui, studio);
        });
}

fn render_statistics(ui: &imgui::Ui, scene: &Scene, fps: f32) {
    let position = scene.camera_manager.camera.position;
    let stats = scene.get_statistics();

    ui.text(format!("FPS: {:.1}", fps));
    ui.text(format!(
        "Camera: ({:.2}, {:.2}, {:.2})",
        position.x, position.y, position.z
    ));
    ui.text(format!(
        "Objects: {}  Triangles: {}",
        stats.object_count, stats.total_triangles
    ));
    ui.text(format!("Active waves: {}", scene.water.waves().active_count()));
}

fn render_wave_controls(ui: &imgui::Ui, studio: &mut WaveStudio) {
    if !ui.collapsing_header("Waves", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    let labels: Vec<&str> = WaveFunction::ALL.iter().map(|f| f.label()).collect();
    let mut selected = WaveFunction::ALL
        .iter()
        .position(|&f| f == studio.wave_function)
        .unwrap_or(0);
    if ui.combo_simple_string("Function", &mut selected, &labels) {
        studio.wave_function = WaveFunction::ALL[selected];
    }

    let spectrum = &mut studio.spectrum;

    let mut seed = spectrum.seed.min(i32::MAX as u64) as i32;
    if ui.input_int("Seed", &mut seed).build() {
        spectrum.seed = seed.max(0) as u64;
    }

    let mut count = spectrum.wave_count as i32;
    if ui.slider("Wave count", 0, MAX_WAVES as i32, &mut count) {
        spectrum.wave_count = count.max(0) as usize;
    }

    ui.slider("Direction", 0.0, 360.0, &mut spectrum.direction_deg);
    ui.slider("Spread", 0.0, 180.0, &mut spectrum.spread_deg);
    ui.slider("Steepness", 0.0, 1.0, &mut spectrum.steepness);

    ui.spacing();
    if ui.button("Regenerate waves") {
        studio.regenerate_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocean::WaterConfig;

    fn small_water() -> Water {
        Water::new(WaterConfig {
            resolution: 2,
            length: 2.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_apply_without_request_keeps_waves() {
        let mut water = small_water();
        let mut studio = WaveStudio::new(WaveSpectrum::default(), WaveFunction::Gerstner);
        assert!(!studio.apply(&mut water));
        assert_eq!(water.waves().active_count(), 0);
    }

    #[test]
    fn test_regenerate_request_is_consumed() {
        let mut water = small_water();
        let mut studio = WaveStudio::new(WaveSpectrum::default(), WaveFunction::Gerstner);
        studio.regenerate_requested = true;

        assert!(studio.apply(&mut water));
        assert_eq!(water.waves(), &WaveSpectrum::default().generate());
        assert!(!studio.regenerate_requested);
        assert!(!studio.apply(&mut water));
    }

    #[test]
    fn test_wave_function_follows_selection() {
        let mut water = small_water();
        let mut studio = WaveStudio::new(WaveSpectrum::default(), WaveFunction::Sine);
        studio.apply(&mut water);
        assert_eq!(water.wave_function(), WaveFunction::Sine);
    }
}
