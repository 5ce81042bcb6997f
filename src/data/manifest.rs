use std::{
    collections::BTreeMap,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use fs_err as fs;
use maxpack::{Id, PackOutput, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sprite_name::SpriteName;

pub static MANIFEST_FILENAME: &str = "atlas.json";

/// Describes where every sprite of an atlas ended up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AtlasManifest {
    pub name: String,
    pub pages: Vec<PageManifest>,
    pub sprites: BTreeMap<SpriteName, SpriteManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PageManifest {
    pub file: String,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpriteManifest {
    /// Index into `pages`. Missing if the sprite did not fit.
    pub page: Option<usize>,

    /// The part of the page holding the sprite's pixels, in page space.
    pub frame: Option<Frame>,

    /// The frame holds the sprite turned 90 degrees counter-clockwise.
    pub rotated: bool,

    /// The part of the source image that was packed, after trimming.
    pub source: Frame,

    pub original_size: (u32, u32),

    /// The sprite shares its frame with this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<SpriteName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl From<Rect> for Frame {
    fn from(rect: Rect) -> Self {
        Frame {
            x: rect.pos.0,
            y: rect.pos.1,
            w: rect.size.0,
            h: rect.size.1,
        }
    }
}

/// What the manifest needs to know about a sprite beyond its placement.
#[derive(Debug, Clone)]
pub struct SpriteSource {
    pub name: SpriteName,
    pub size: (u32, u32),

    /// The region of the source image that was packed.
    pub region: Rect,
}

impl AtlasManifest {
    /// Builds a manifest from a packing run. `sources` must be in the same
    /// order the items were added to the session.
    pub fn from_output(name: &str, output: &PackOutput, sources: &[SpriteSource]) -> Self {
        let pages = output
            .bins()
            .iter()
            .map(|bin| PageManifest {
                file: page_file_name(name, bin.index()),
                size: bin.size(),
            })
            .collect();

        let name_of = |id: Id| {
            output
                .items()
                .iter()
                .position(|item| item.id() == id)
                .map(|index| sources[index].name.clone())
        };

        let sprites = output
            .items()
            .iter()
            .zip(sources)
            .map(|(item, source)| {
                let manifest = SpriteManifest {
                    page: item.placement().map(|placement| placement.bin),
                    frame: item.content_rect().map(Frame::from),
                    rotated: item.rotated(),
                    source: source.region.into(),
                    original_size: source.size,
                    duplicate_of: item.duplicate_of().and_then(name_of),
                };

                (source.name.clone(), manifest)
            })
            .collect();

        AtlasManifest {
            name: name.to_owned(),
            pages,
            sprites,
        }
    }

    pub fn write_to_folder<P: AsRef<Path>>(&self, folder_path: P) -> Result<(), ManifestError> {
        let file_path = folder_path.as_ref().join(MANIFEST_FILENAME);

        let mut file = BufWriter::new(fs::File::create(&file_path)?);
        serde_json::to_writer_pretty(&mut file, self)?;
        file.flush()?;

        log::trace!("Saved manifest to {}", file_path.display());

        Ok(())
    }

    /// Sprites that have no place in any page.
    pub fn missing(&self) -> impl Iterator<Item = &SpriteName> {
        self.sprites
            .iter()
            .filter(|(_, sprite)| sprite.page.is_none())
            .map(|(name, _)| name)
    }
}

pub fn page_file_name(atlas_name: &str, index: usize) -> String {
    format!("{}-{}.png", atlas_name, index)
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where a page of the atlas is written.
pub fn page_path(folder: &Path, atlas_name: &str, index: usize) -> PathBuf {
    folder.join(page_file_name(atlas_name, index))
}
