use std::{
    collections::BTreeMap,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use fs_err as fs;
use indicatif::ProgressBar;
use maxpack::{InputItem, PackError, PackOutput, PackingSession, Rect};
use thiserror::Error;

use crate::{
    data::{page_path, AtlasManifest, Config, ConfigError, ManifestError, SpriteSource},
    image::{Image, ImageError},
    sprite_name::SpriteName,
};

/// An atlas session holds all of the state for a single run of the
/// `atlaspack pack` or `atlaspack layout` commands.
#[derive(Debug)]
pub struct AtlasSession {
    config: Config,

    /// Decoded sprites, in the order they were added.
    sprites: Vec<Sprite>,
}

#[derive(Debug)]
struct Sprite {
    name: SpriteName,
    image: Image,

    /// The part of the image with visible content.
    trimmed: Rect,
}

impl AtlasSession {
    pub fn new(fuzzy_config_path: &Path) -> Result<Self, AtlasError> {
        log::trace!("Starting new atlas session");

        let config = Config::read_from_folder_or_file(fuzzy_config_path)?;

        log::trace!("Starting from config \"{}\"", config.name);

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            sprites: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Find all files on the filesystem matched by the config's inputs.
    pub fn discover_inputs(&self) -> Result<BTreeMap<SpriteName, PathBuf>, AtlasError> {
        let root = self.config.folder();
        let mut inputs = BTreeMap::new();

        for glob in &self.config.inputs {
            log::trace!("Searching for inputs matching '{}'", glob);

            for path in glob.find_files(root)? {
                let name = match SpriteName::from_paths(root, &path) {
                    Some(name) => name,
                    None => continue,
                };

                log::trace!("Found input {}", name);

                if let Some(existing) = inputs.insert(name, path) {
                    return Err(AtlasError::OverlappingGlobs { path: existing });
                }
            }
        }

        Ok(inputs)
    }

    /// Discovers and decodes every input.
    pub fn load_sprites(&mut self) -> Result<(), AtlasError> {
        for (name, path) in self.discover_inputs()? {
            let contents = fs::read(&path)?;
            let image = Image::decode_png(contents.as_slice())
                .map_err(|source| AtlasError::Image { path, source })?;

            self.add_sprite(name, image);
        }

        log::info!("Loaded {} sprites", self.sprites.len());

        Ok(())
    }

    pub fn add_sprite(&mut self, name: SpriteName, image: Image) {
        let trimmed = image.opaque_bounds(self.config.crop_threshold);

        log::debug!(
            "Sprite {} is {}x{}, trimmed to {}x{} at ({}, {})",
            name,
            image.size().0,
            image.size().1,
            trimmed.width(),
            trimmed.height(),
            trimmed.pos.0,
            trimmed.pos.1
        );

        self.sprites.push(Sprite {
            name,
            image,
            trimmed,
        });
    }

    /// Packs every sprite. Items in the output are in the same order as the
    /// session's sprites.
    pub fn layout(&self) -> Result<PackOutput, AtlasError> {
        let mut session = PackingSession::new(self.config.packer.clone());

        for sprite in &self.sprites {
            session.add(
                InputItem::new(sprite.image.size())
                    .with_crop(sprite.trimmed)
                    .with_content_hash(sprite.image.content_hash()),
            );
        }

        let output = session.pack()?;

        for (item, sprite) in output.items().iter().zip(&self.sprites) {
            let (width, height) = item.size();
            let has_area = width > 0 && height > 0;

            if item.duplicate_of().is_none() && item.placement().is_none() && has_area {
                log::warn!("Sprite {} did not fit into the atlas", sprite.name);
            }
        }

        log::info!(
            "Packed {} sprites into {} pages ({:.1}% filled)",
            self.sprites.len(),
            output.bins().len(),
            output.fill_rate() * 100.0
        );

        Ok(output)
    }

    pub fn manifest(&self, output: &PackOutput) -> AtlasManifest {
        let sources: Vec<_> = self
            .sprites
            .iter()
            .map(|sprite| SpriteSource {
                name: sprite.name.clone(),
                size: sprite.image.size(),
                region: self.source_region(sprite),
            })
            .collect();

        AtlasManifest::from_output(&self.config.name, output, &sources)
    }

    /// Draws every placed sprite into its page. Duplicates are skipped since
    /// they share their pixels with another sprite.
    pub fn compose(&self, output: &PackOutput, progress: &ProgressBar) -> Vec<Image> {
        let extrude = self.config.packer.extrude;
        let mut pages: Vec<_> = output
            .bins()
            .iter()
            .map(|bin| Image::new_empty_rgba8(bin.size()))
            .collect();

        progress.set_length(output.items().len() as u64);

        for (item, sprite) in output.items().iter().zip(&self.sprites) {
            progress.inc(1);

            if item.duplicate_of().is_some() {
                continue;
            }

            let (placement, content) = match (item.placement(), item.content_rect()) {
                (Some(placement), Some(content)) => (placement, content),
                _ => continue,
            };

            let page = &mut pages[placement.bin];
            page.blit_region(
                &sprite.image,
                self.source_region(sprite),
                content.pos,
                item.rotated(),
            );
            page.extrude(content, item.padding().limited(extrude));
        }

        progress.finish_and_clear();

        pages
    }

    pub fn write_pages(&self, folder: &Path, pages: &[Image]) -> Result<(), AtlasError> {
        for (index, page) in pages.iter().enumerate() {
            let path = page_path(folder, &self.config.name, index);
            let file = BufWriter::new(fs::File::create(&path)?);

            page.encode_png(file)
                .map_err(|source| AtlasError::Image { path: path.clone(), source })?;

            log::debug!("Wrote page {}", path.display());
        }

        Ok(())
    }

    fn source_region(&self, sprite: &Sprite) -> Rect {
        if self.config.packer.crop {
            sprite.trimmed
        } else {
            Rect::from_size(sprite.image.size())
        }
    }
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("Path {} was matched by more than one input glob", path.display())]
    OverlappingGlobs { path: PathBuf },

    #[error("{source} in {}", path.display())]
    Image { path: PathBuf, source: ImageError },

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::image::Pixel;

    const GREEN: Pixel = Pixel {
        r: 0,
        g: 255,
        b: 0,
        a: 255,
    };

    const RED: Pixel = Pixel {
        r: 255,
        g: 0,
        b: 0,
        a: 255,
    };

    fn session(packer: &str) -> AtlasSession {
        let source = format!("name = \"test\"\n[packer]\n{}", packer);
        let config = Config::from_slice(source.as_bytes(), Path::new("atlaspack.toml")).unwrap();

        AtlasSession::from_config(config)
    }

    /// A `size` image with a single green pixel at `pos`.
    fn dot(size: (u32, u32), pos: (u32, u32)) -> Image {
        let mut image = Image::new_empty_rgba8(size);
        image.set_pixel(pos, GREEN);
        image
    }

    fn solid(size: (u32, u32), pixel: Pixel) -> Image {
        let mut image = Image::new_empty_rgba8(size);
        for y in 0..size.1 {
            for x in 0..size.0 {
                image.set_pixel((x, y), pixel);
            }
        }
        image
    }

    fn filled(size: (u32, u32)) -> Image {
        solid(size, GREEN)
    }

    #[test]
    fn trimmed_sprite_lands_in_its_frame() {
        let mut session = session("size = [16, 16]\nauto-grow = false\nshrink = false");
        session.add_sprite("dot.png".into(), dot((8, 8), (5, 6)));

        let output = session.layout().unwrap();
        let manifest = session.manifest(&output);
        let pages = session.compose(&output, &ProgressBar::hidden());

        let sprite = &manifest.sprites[&SpriteName::from("dot.png")];
        let frame = sprite.frame.unwrap();

        assert_eq!((frame.w, frame.h), (1, 1));
        assert_eq!((sprite.source.x, sprite.source.y), (5, 6));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].get_pixel((frame.x, frame.y)), GREEN);
    }

    #[test]
    fn duplicates_are_drawn_once_and_share_a_frame() {
        let mut session = session("size = [16, 16]\nauto-grow = false\nshrink = false");
        session.add_sprite("a.png".into(), filled((2, 2)));
        session.add_sprite("b.png".into(), filled((2, 2)));

        let output = session.layout().unwrap();
        let manifest = session.manifest(&output);

        let a = &manifest.sprites[&SpriteName::from("a.png")];
        let b = &manifest.sprites[&SpriteName::from("b.png")];

        assert_eq!(output.merged(), 1);
        assert_eq!(a.frame, b.frame);
        assert_eq!(b.duplicate_of, Some(SpriteName::from("a.png")));
    }

    #[test]
    fn extrusion_fills_the_padding() {
        let mut session = session("size = [8, 8]\nauto-grow = false\nshrink = false\nextrude = 1");
        session.add_sprite("dot.png".into(), dot((1, 1), (0, 0)));

        let output = session.layout().unwrap();
        let pages = session.compose(&output, &ProgressBar::hidden());

        let content = output.items()[0].content_rect().unwrap();
        assert_eq!(content.pos, (1, 1));

        for &pos in &[(0, 0), (1, 0), (2, 2), (0, 1)] {
            assert_eq!(pages[0].get_pixel(pos), GREEN, "at {:?}", pos);
        }
    }

    #[test]
    fn extrusion_stays_out_of_neighbouring_sprites() {
        let mut session = session("size = [4, 4]\nextrude = 1");
        session.add_sprite("a.png".into(), filled((2, 2)));
        session.add_sprite("b.png".into(), solid((4, 1), RED));

        let output = session.layout().unwrap();
        let pages = session.compose(&output, &ProgressBar::hidden());

        // The full-width sprite has no horizontal padding to extrude into.
        let b = &output.items()[1];
        assert_eq!(b.padding().left + b.padding().right, 0);

        for (item, colour) in output.items().iter().zip(&[GREEN, RED]) {
            let rect = item.rect().unwrap();
            let page = &pages[item.placement().unwrap().bin];

            for y in rect.min().1..rect.max().1 {
                for x in rect.min().0..rect.max().0 {
                    let pixel = page.get_pixel((x, y));
                    assert!(
                        pixel == *colour || pixel.a == 0,
                        "{:?} at ({}, {}) in {:?}",
                        pixel,
                        x,
                        y,
                        item.id()
                    );
                }
            }
        }
    }

    #[test]
    fn rotated_sprite_is_drawn_turned() {
        let mut session = session(
            "size = [8, 8]\nauto-grow = false\nshrink = false\nrotation = \"width-greater-than-height\"",
        );
        let mut image = Image::new_empty_rgba8((3, 1));
        image.set_pixel((2, 0), GREEN);
        image.set_pixel((0, 0), RED);
        session.add_sprite("bar.png".into(), image);

        let output = session.layout().unwrap();
        let pages = session.compose(&output, &ProgressBar::hidden());
        let item = &output.items()[0];

        assert!(item.rotated());
        assert_eq!(item.content_rect(), Some(Rect::new((0, 0), (1, 3))));
        assert_eq!(pages[0].get_pixel((0, 0)), GREEN);
    }
}
