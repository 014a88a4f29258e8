use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::scene::{SceneToggles, TransformPropagation};

/// Renders a car driving around a lamp-lit street.
#[derive(Debug, Clone, Parser)]
#[command(name = "street_scene", version)]
pub struct AppConfig {
    /// Directory holding car, street and lamp .obj/.mtl files
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Multiply each child's transform by its parent's
    #[arg(long)]
    pub composed_transforms: bool,

    /// Start with ambient and diffuse lighting off
    #[arg(long)]
    pub no_lighting: bool,

    /// Start with the car driving
    #[arg(long)]
    pub car_moving: bool,

    /// Start with the camera riding above the car
    #[arg(long)]
    pub camera_on_car: bool,
}

impl AppConfig {
    pub fn toggles(&self) -> SceneToggles {
        SceneToggles {
            lighting: !self.no_lighting,
            car_moving: self.car_moving,
            camera_on_car: self.camera_on_car,
        }
    }

    pub fn propagation(&self) -> TransformPropagation {
        if self.composed_transforms {
            TransformPropagation::Composed
        } else {
            TransformPropagation::Independent
        }
    }
}

pub fn parse_from_env() -> Result<AppConfig, String> {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> Result<AppConfig, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = AppConfig::try_parse_from(args).map_err(|error| error.to_string())?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), String> {
    if config.width == 0 || config.height == 0 {
        return Err(format!(
            "window size must be positive, got {}x{}",
            config.width, config.height
        ));
    }
    validate_directory(&config.assets, "assets")
}

fn validate_directory(path: &Path, label: &str) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("{} directory does not exist: {}", label, path.display()));
    }
    if !path.is_dir() {
        return Err(format!("{} path is not a directory: {}", label, path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir_arg() -> String {
        std::env::temp_dir().display().to_string()
    }

    #[test]
    fn defaults_start_lit_and_parked() {
        let config = parse_from(["street_scene", "--assets", temp_dir_arg().as_str()]).unwrap();

        assert_eq!(config.width, 800);
        assert_eq!(config.toggles(), SceneToggles::default());
        assert_eq!(config.propagation(), TransformPropagation::Independent);
    }

    #[test]
    fn flags_map_to_toggles_and_propagation() {
        let config = parse_from([
            "street_scene",
            "--assets",
            temp_dir_arg().as_str(),
            "--no-lighting",
            "--car-moving",
            "--camera-on-car",
            "--composed-transforms",
        ])
        .unwrap();

        assert_eq!(
            config.toggles(),
            SceneToggles {
                lighting: false,
                car_moving: true,
                camera_on_car: true,
            }
        );
        assert_eq!(config.propagation(), TransformPropagation::Composed);
    }

    #[test]
    fn missing_asset_directory_is_rejected() {
        let missing = std::env::temp_dir().join("street_scene_no_such_assets");
        let error = parse_from(["street_scene", "--assets", missing.display().to_string().as_str()])
            .unwrap_err();
        assert!(error.contains("does not exist"));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        let error = parse_from(["street_scene", "--assets", temp_dir_arg().as_str(), "--width", "0"])
            .unwrap_err();
        assert!(error.contains("window size"));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(parse_from(["street_scene", "--wireframe"]).is_err());
    }
}
