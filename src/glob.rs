//! Input globs from atlaspack.toml, and the filesystem walk that resolves
//! them.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use globset::{Glob as InnerGlob, GlobMatcher};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use walkdir::WalkDir;

/// A compiled glob that serializes as its pattern string.
#[derive(Debug, Clone)]
pub struct Glob {
    inner: InnerGlob,
    matcher: GlobMatcher,
}

impl Glob {
    pub fn new(glob: &str) -> Result<Self, globset::Error> {
        let inner = InnerGlob::new(glob)?;
        let matcher = inner.compile_matcher();

        Ok(Glob { inner, matcher })
    }

    pub fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        self.matcher.is_match(path)
    }

    /// The leading directories of the pattern that contain no pattern
    /// syntax. Nothing outside of this folder can match.
    pub fn prefix(&self) -> PathBuf {
        literal_prefix(Path::new(self.inner.glob()))
    }

    /// Every file under `root` whose path relative to `root` matches, in a
    /// stable order.
    pub fn find_files(&self, root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut found = Vec::new();

        let walker =
            WalkDir::new(root.join(self.prefix())).sort_by(|a, b| a.file_name().cmp(b.file_name()));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let matches = entry
                .path()
                .strip_prefix(root)
                .map(|relative| self.is_match(relative))
                .unwrap_or(false);

            if matches {
                found.push(entry.into_path());
            }
        }

        Ok(found)
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Glob {}

impl Serialize for Glob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.inner.glob())
    }
}

impl<'de> Deserialize<'de> for Glob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let glob = String::deserialize(deserializer)?;

        Glob::new(&glob).map_err(D::Error::custom)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

// Characters that may start glob syntax. Escapes like `[*]` are treated as
// patterns too, which only makes the walk start higher up than it has to.
const PATTERN_CHARACTERS: &[char] = &['*', '?', '{', '}', '[', ']'];

fn literal_prefix(glob_path: &Path) -> PathBuf {
    let mut components: Vec<Component> = glob_path
        .components()
        .take_while(|component| {
            !component
                .as_os_str()
                .to_string_lossy()
                .contains(PATTERN_CHARACTERS)
        })
        .collect();

    // A fully literal pattern names a file; walk its folder instead.
    if components.len() == glob_path.components().count() {
        components.pop();
    }

    components.iter().collect()
}
