//! RGBA8 images: decoding sprites, trimming them and compositing them into
//! atlas pages.

use std::io::{Read, Write};

use maxpack::{Padding, Rect};
use thiserror::Error;

const STRIDE: usize = 4;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Decode(#[from] png::DecodingError),

    #[error(transparent)]
    Encode(#[from] png::EncodingError),

    #[error("Image has no pixels")]
    Empty,

    #[error("Unsupported PNG color type {0:?}")]
    UnsupportedColor(png::ColorType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    size: (u32, u32),
    data: Vec<u8>,
}

impl Image {
    pub fn new_rgba8<D: Into<Vec<u8>>>(size: (u32, u32), data: D) -> Self {
        let data = data.into();

        assert!(data.len() == size.0 as usize * size.1 as usize * STRIDE);

        Self { size, data }
    }

    pub fn new_empty_rgba8(size: (u32, u32)) -> Self {
        let data = vec![0; size.0 as usize * size.1 as usize * STRIDE];
        Self::new_rgba8(size, data)
    }

    /// Decodes a PNG of any color type into RGBA8.
    pub fn decode_png<R: Read>(input: R) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(input);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let (info, mut reader) = decoder.read_info()?;
        if info.width == 0 || info.height == 0 {
            return Err(ImageError::Empty);
        }

        let mut buffer = vec![0; info.buffer_size()];
        reader.next_frame(&mut buffer)?;

        let data = match info.color_type {
            png::ColorType::RGBA => buffer,
            png::ColorType::RGB => buffer
                .chunks_exact(3)
                .flat_map(|rgb| vec![rgb[0], rgb[1], rgb[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buffer
                .chunks_exact(2)
                .flat_map(|ga| vec![ga[0], ga[0], ga[0], ga[1]])
                .collect(),
            png::ColorType::Grayscale => buffer
                .iter()
                .flat_map(|&g| vec![g, g, g, 255])
                .collect(),
            other => return Err(ImageError::UnsupportedColor(other)),
        };

        Ok(Self::new_rgba8((info.width, info.height), data))
    }

    pub fn encode_png<W: Write>(&self, output: W) -> Result<(), ImageError> {
        let mut encoder = png::Encoder::new(output, self.size.0, self.size.1);
        encoder.set_color(png::ColorType::RGBA);
        encoder.set_depth(png::BitDepth::Eight);

        let mut output_writer = encoder.write_header()?;
        output_writer.write_image_data(&self.data)?;

        // On drop, output_writer will write the last chunk of the PNG file.
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Identifies the image by its size and pixels.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.size.0.to_le_bytes());
        hasher.update(&self.size.1.to_le_bytes());
        hasher.update(&self.data);

        *hasher.finalize().as_bytes()
    }

    /// The smallest rectangle holding every pixel with an alpha of at least
    /// `threshold`. Zero-sized if there is no such pixel; the whole image if
    /// `threshold` is 0.
    pub fn opaque_bounds(&self, threshold: u8) -> Rect {
        if threshold == 0 {
            return Rect::from_size(self.size);
        }

        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0, 0);

        for y in 0..self.size.1 {
            for x in 0..self.size.0 {
                if self.get_pixel((x, y)).a >= threshold {
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x + 1), max.1.max(y + 1));
                }
            }
        }

        if min.0 > max.0 {
            return Rect::new((0, 0), (0, 0));
        }

        Rect::new(min, (max.0 - min.0, max.1 - min.1))
    }

    /// Copies `region` of `other` into this image at `pos`. With `rotated`,
    /// the region is turned 90 degrees counter-clockwise on the way, so it
    /// covers `region.height() x region.width()` pixels.
    pub fn blit_region(&mut self, other: &Image, region: Rect, pos: (u32, u32), rotated: bool) {
        let (width, height) = region.size;

        if !rotated {
            for y in 0..height {
                let source_start = other.offset((region.pos.0, region.pos.1 + y));
                let target_start = self.offset((pos.0, pos.1 + y));
                let len = width as usize * STRIDE;

                self.data[target_start..target_start + len]
                    .copy_from_slice(&other.data[source_start..source_start + len]);
            }

            return;
        }

        for y in 0..height {
            for x in 0..width {
                let pixel = other.get_pixel((region.pos.0 + x, region.pos.1 + y));
                self.set_pixel((pos.0 + y, pos.1 + width - 1 - x), pixel);
            }
        }
    }

    /// Repeats the outermost pixels of `rect` outward, as far as `band`
    /// allows on each side and never past the edges of the image.
    pub fn extrude(&mut self, rect: Rect, band: Padding) {
        if band.horizontal() + band.vertical() == 0 || rect.is_empty() {
            return;
        }

        let (left, top) = rect.min();
        let (right, bottom) = rect.max();

        let reach_left = band.left.min(left);
        let reach_top = band.top.min(top);
        let reach_right = band.right.min(self.size.0 - right);
        let reach_bottom = band.bottom.min(self.size.1 - bottom);

        for y in top..bottom {
            let first = self.get_pixel((left, y));
            let last = self.get_pixel((right - 1, y));

            for i in 1..=reach_left {
                self.set_pixel((left - i, y), first);
            }
            for i in 0..reach_right {
                self.set_pixel((right + i, y), last);
            }
        }

        for x in (left - reach_left)..(right + reach_right) {
            let first = self.get_pixel((x, top));
            let last = self.get_pixel((x, bottom - 1));

            for i in 1..=reach_top {
                self.set_pixel((x, top - i), first);
            }
            for i in 0..reach_bottom {
                self.set_pixel((x, bottom + i), last);
            }
        }
    }

    pub fn get_pixel(&self, pos: (u32, u32)) -> Pixel {
        let start = self.offset(pos);

        Pixel {
            r: self.data[start],
            g: self.data[start + 1],
            b: self.data[start + 2],
            a: self.data[start + 3],
        }
    }

    pub fn set_pixel(&mut self, pos: (u32, u32), pixel: Pixel) {
        let start = self.offset(pos);

        self.data[start] = pixel.r;
        self.data[start + 1] = pixel.g;
        self.data[start + 2] = pixel.b;
        self.data[start + 3] = pixel.a;
    }

    fn offset(&self, pos: (u32, u32)) -> usize {
        assert!(pos.0 < self.size.0);
        assert!(pos.1 < self.size.1);

        STRIDE * (pos.0 as usize + pos.1 as usize * self.size.0 as usize)
    }
}
