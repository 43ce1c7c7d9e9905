use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use std::path::Path;

const SETTINGS_PATH: &str = "config/settings.yaml";

/// Loads `config/settings.yaml`, overridden by `APP__SECTION__KEY` environment variables.
pub fn load_app_settings() -> Result<AppSettings> {
    // Need to load from dotenv to get it to overwrite the db url from env.
    dotenv::from_path(".env").ok();
    load_app_settings_from(Path::new(SETTINGS_PATH))
}

pub fn load_app_settings_from(config_path: &Path) -> Result<AppSettings> {
    let config_path = config_path.canonicalize()?;
    let builder = Config::builder()
        .add_source(File::from(config_path))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );
    build_settings(builder)
}

/// Parses settings from a YAML string, without environment overrides.
pub fn parse_app_settings(yaml: &str) -> Result<AppSettings> {
    build_settings(Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml)))
}

fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<AppSettings> {
    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    raw_settings.try_into()
}
