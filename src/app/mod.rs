pub mod cli;
pub mod error;

use log::info;

use crate::loaders::DirectorySource;
use crate::scene::SceneDriver;

use cli::AppConfig;
use error::AppError;

pub fn run_from_env() -> Result<(), AppError> {
    let config = cli::parse_from_env().map_err(AppError::Cli)?;
    run(config)
}

/// Loads the street scene from the configured asset directory, then hands it
/// to the renderer.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let driver = load_scene(&config)?;
    render(driver, &config)
}

pub fn load_scene(config: &AppConfig) -> Result<SceneDriver, AppError> {
    let source = DirectorySource::new(&config.assets);
    let mut driver = SceneDriver::street_scene().with_propagation(config.propagation());
    info!("loading scene from {}", source.root().display());
    pollster::block_on(driver.setup(&source))?;
    Ok(driver)
}

#[cfg(feature = "window")]
fn render(driver: SceneDriver, config: &AppConfig) -> Result<(), AppError> {
    let settings = crate::renderer::WindowSettings {
        width: config.width,
        height: config.height,
        toggles: config.toggles(),
    };
    crate::renderer::run(driver, settings).map_err(AppError::Renderer)
}

#[cfg(not(feature = "window"))]
fn render(_driver: SceneDriver, _config: &AppConfig) -> Result<(), AppError> {
    Err(AppError::Renderer(
        "built without the `window` feature; rebuild with --features window".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::LoadState;

    #[test]
    fn load_scene_reads_assets_from_disk() {
        let root = std::env::temp_dir().join(format!("street_scene_app_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        for name in ["car", "street", "lamp"] {
            std::fs::write(
                root.join(format!("{name}.obj")),
                "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Paint\nf 1 2 3\n",
            )
            .unwrap();
            std::fs::write(
                root.join(format!("{name}.mtl")),
                "newmtl Paint\nKa 1 1 1\nKd 1 1 1\nKs 1 1 1\nNs 8\n",
            )
            .unwrap();
        }

        let config =
            cli::parse_from(["street_scene", "--assets", root.display().to_string().as_str()])
                .unwrap();
        let driver = load_scene(&config).unwrap();
        assert!(driver.roots().iter().all(|entity| entity.state() == LoadState::Ready));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_assets_surface_as_scene_errors() {
        let root = std::env::temp_dir().join(format!("street_scene_empty_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();

        let config =
            cli::parse_from(["street_scene", "--assets", root.display().to_string().as_str()])
                .unwrap();
        let error = load_scene(&config).unwrap_err();
        assert!(matches!(error, AppError::Scene(_)));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
