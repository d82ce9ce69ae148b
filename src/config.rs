//! Command line and runtime configuration

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::ocean::{WaterConfig, WaveFunction, WaveSpectrum, MAX_WAVES};

/// Real-time procedural ocean renderer
#[derive(Debug, Clone, Parser)]
#[command(name = "oceansim", version, about)]
pub struct Args {
    /// Directory holding models, textures, the skybox and shaders
    #[arg(default_value = "resources")]
    pub resources: PathBuf,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Water grid subdivisions per side
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub resolution: u32,

    /// Side length of the water plane in world units
    #[arg(long, default_value_t = 50.0)]
    pub length: f32,

    #[arg(long, value_enum, default_value_t = WaveFunction::Gerstner)]
    pub wave_function: WaveFunction,

    /// Seed of the wave generator
    #[arg(long, default_value_t = 2)]
    pub seed: u64,

    /// Number of waves, at most 16
    #[arg(long, default_value_t = MAX_WAVES)]
    pub wave_count: usize,

    /// Mean heading of the waves in degrees
    #[arg(long, default_value_t = 300.0)]
    pub direction: f32,

    /// Maximum deviation from the mean heading in degrees
    #[arg(long, default_value_t = 35.0)]
    pub spread: f32,

    /// Upper bound of the wave steepness
    #[arg(long, default_value_t = 0.15)]
    pub steepness: f32,

    /// Displace the water grid on the CPU instead of in the vertex shader
    #[arg(long)]
    pub ripple_mesh: bool,

    /// Log full compiler output when a shader fails to compile
    #[arg(long)]
    pub verbose_shaders: bool,
}

/// Everything the app needs to start
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub resources: PathBuf,
    pub width: u32,
    pub height: u32,
    pub water: WaterConfig,
    pub spectrum: WaveSpectrum,
    pub verbose_shaders: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resources: PathBuf::from("resources"),
            width: 640,
            height: 480,
            water: WaterConfig::default(),
            spectrum: WaveSpectrum::default(),
            verbose_shaders: false,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let wave_count = if args.wave_count > MAX_WAVES {
            log::warn!("{} waves requested, using {}", args.wave_count, MAX_WAVES);
            MAX_WAVES
        } else {
            args.wave_count
        };

        Self {
            resources: args.resources,
            width: args.width.max(1),
            height: args.height.max(1),
            water: WaterConfig {
                resolution: args.resolution,
                length: args.length,
                wave_function: args.wave_function,
                ripple_mesh: args.ripple_mesh,
            },
            spectrum: WaveSpectrum {
                seed: args.seed,
                wave_count,
                direction_deg: args.direction,
                spread_deg: args.spread,
                steepness: args.steepness,
                ..WaveSpectrum::default()
            },
            verbose_shaders: args.verbose_shaders,
        }
    }
}

impl AppConfig {
    /// Path of a file directly under the resource directory
    pub fn resource(&self, name: &str) -> PathBuf {
        self.resources.join(name)
    }

    pub fn shader_dir(&self) -> PathBuf {
        self.resources.join("shaders")
    }

    pub fn skybox_dir(&self) -> PathBuf {
        self.resources.join("skycube1")
    }

    pub fn resources(&self) -> &Path {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_default_config() {
        let args = Args::try_parse_from(["oceansim"]).expect("no arguments is valid");
        assert_eq!(AppConfig::from(args), AppConfig::default());
    }

    #[test]
    fn test_parses_wave_options() {
        let args = Args::try_parse_from([
            "oceansim",
            "assets",
            "--wave-function",
            "steep-sine",
            "--seed",
            "7",
            "--resolution",
            "64",
            "--ripple-mesh",
        ])
        .expect("valid arguments");
        let config = AppConfig::from(args);

        assert_eq!(config.resources, PathBuf::from("assets"));
        assert_eq!(config.water.wave_function, WaveFunction::SteepSine);
        assert_eq!(config.water.resolution, 64);
        assert!(config.water.ripple_mesh);
        assert_eq!(config.spectrum.seed, 7);
        assert_eq!(config.shader_dir(), PathBuf::from("assets/shaders"));
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        assert!(Args::try_parse_from(["oceansim", "--resolution", "0"]).is_err());
    }

    #[test]
    fn test_wave_count_is_capped() {
        let args = Args::try_parse_from(["oceansim", "--wave-count", "40"]).expect("valid arguments");
        assert_eq!(AppConfig::from(args).spectrum.wave_count, MAX_WAVES);
    }
}
