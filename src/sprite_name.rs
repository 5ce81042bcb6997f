use std::{
    fmt,
    path::{self, Path},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

/// The name a sprite is known by in an atlas manifest: its path relative to
/// the project folder, always separated with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteName(Arc<str>);

impl SpriteName {
    /// Returns `None` if `sprite_path` is not inside `root_path`.
    pub fn from_paths(root_path: &Path, sprite_path: &Path) -> Option<Self> {
        let relative = sprite_path.strip_prefix(root_path).ok()?;
        let displayed = relative.display().to_string();

        let displayed = if path::MAIN_SEPARATOR == '/' {
            displayed
        } else {
            displayed.replace(path::MAIN_SEPARATOR, "/")
        };

        Some(SpriteName(displayed.into()))
    }
}

impl From<&str> for SpriteName {
    fn from(name: &str) -> Self {
        SpriteName(name.into())
    }
}

impl AsRef<str> for SpriteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpriteName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
