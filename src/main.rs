fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    street_scene::app::run_from_env()?;
    Ok(())
}
