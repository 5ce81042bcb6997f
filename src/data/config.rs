use std::{
    io,
    path::{Path, PathBuf},
};

use fs_err as fs;
use maxpack::PackerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::glob::Glob;

static CONFIG_FILENAME: &str = "atlaspack.toml";

/// Configuration for an atlas project, contained in an atlaspack.toml file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// The name of the atlas. Pages are written as `<name>-<index>.png`.
    pub name: String,

    /// The folder that pages and the manifest are written to, relative to
    /// the folder containing this file.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Globs matching the PNG files to pack.
    #[serde(default)]
    pub inputs: Vec<Glob>,

    /// Pixels with an alpha below this value count as transparent when
    /// trimming sprites. 0 turns trimming off.
    #[serde(default = "default_crop_threshold")]
    pub crop_threshold: u8,

    #[serde(default)]
    pub packer: PackerConfig,

    /// The path that this config came from. Paths from this config should be
    /// relative to the folder containing this file.
    #[serde(skip)]
    pub file_path: PathBuf,
}

impl Config {
    pub fn read_from_folder_or_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        if meta.is_file() {
            Self::read_from_file(path)
        } else {
            Self::read_from_folder(path)
        }
    }

    pub fn read_from_folder<P: AsRef<Path>>(folder_path: P) -> Result<Self, ConfigError> {
        let file_path = folder_path.as_ref().join(CONFIG_FILENAME);

        Self::read_from_file(file_path)
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        Self::from_slice(&contents, path)
    }

    /// Parses and validates the contents of a config file that lives at
    /// `path`.
    pub fn from_slice(contents: &[u8], path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_slice(contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })?;
        config.file_path = path.to_owned();

        config.validate()?;

        Ok(config)
    }

    /// The path that paths in this Config should be considered relative to.
    pub fn folder(&self) -> &Path {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn output_folder(&self) -> PathBuf {
        self.folder().join(&self.output)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let packer = &self.packer;
        let invalid = |message: &str| ConfigError::Invalid {
            path: self.file_path.clone(),
            message: message.to_owned(),
        };

        if packer.size.0 == 0 || packer.size.1 == 0 {
            return Err(invalid("packer.size must not have a zero side"));
        }

        let below_size = packer.max_size.0 < packer.size.0 || packer.max_size.1 < packer.size.1;
        if packer.auto_grow && below_size {
            return Err(invalid("packer.max-size must be at least packer.size"));
        }

        if !(0.0..=1.0).contains(&packer.min_fill_rate) {
            return Err(invalid("packer.min-fill-rate must be between 0 and 1"));
        }

        Ok(())
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("atlas")
}

fn default_crop_threshold() -> u8 {
    1
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{source} in {}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{source} in {}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{message} in {}", path.display())]
    Invalid { path: PathBuf, message: String },
}

#[cfg(test)]
mod test {
    use super::*;

    use maxpack::{Heuristic, RotationPolicy};

    fn parse(source: &str) -> Result<Config, ConfigError> {
        Config::from_slice(source.as_bytes(), Path::new("project/atlaspack.toml"))
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(r#"name = "ui""#).unwrap();

        assert_eq!(config.name, "ui");
        assert_eq!(config.crop_threshold, 1);
        assert_eq!(config.packer, PackerConfig::default());
        assert_eq!(config.output_folder(), Path::new("project/atlas"));
        assert!(config.inputs.is_empty());
    }

    #[test]
    fn packer_table() {
        let config = parse(
            r#"
            name = "ui"
            inputs = ["sprites/**/*.png"]
            crop-threshold = 0

            [packer]
            size = [256, 256]
            auto-grow = false
            heuristic = "top-left"
            rotation = "only-when-needed"
            extrude = 2
            border = { top = 1, left = 1 }
            "#,
        )
        .unwrap();

        assert_eq!(config.inputs.len(), 1);
        assert_eq!(config.crop_threshold, 0);
        assert_eq!(config.packer.size, (256, 256));
        assert!(!config.packer.auto_grow);
        assert_eq!(config.packer.heuristic, Heuristic::TopLeft);
        assert_eq!(config.packer.rotation, RotationPolicy::OnlyWhenNeeded);
        assert_eq!(config.packer.extrude, 2);
        assert_eq!(config.packer.border.top, 1);
        assert_eq!(config.packer.border.right, 0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            parse("name = \"ui\"\nspritesheets = true"),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn bad_fill_rate_is_rejected() {
        let result = parse("name = \"ui\"\n[packer]\nmin-fill-rate = 80.0");

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn max_size_below_size_is_rejected() {
        let result = parse("name = \"ui\"\n[packer]\nsize = [512, 512]\nmax-size = [256, 256]");

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
