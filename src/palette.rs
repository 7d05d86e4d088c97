//! Turning paletted pixels into colors.

use ::archive::wad::BareWAD;
use ::convert::ExtractionOptions;
use ::errors::{ErrorKind, Result};
use ::texture::DecodedTexture;

pub const PALETTE_SIZE: usize = 256 * 3;
pub const COLORMAP_SIZE: usize = 256;


/// The `index`th run of `size` bytes, if the lump is long enough to hold it.
fn nth_chunk(lump: &[u8], index: usize, size: usize) -> Option<&[u8]> {
    let start = index.checked_mul(size)?;
    let end = start.checked_add(size)?;
    lump.get(start .. end)
}


/// One of the 256-color RGB palettes from PLAYPAL.
pub struct Palette([u8; PALETTE_SIZE]);

impl Palette {
    /// Picks palette `index` out of a PLAYPAL lump.
    pub fn from_playpal(lump: &[u8], index: usize) -> Result<Self> {
        let bytes = match nth_chunk(lump, index, PALETTE_SIZE) {
            Some(bytes) => bytes,
            None => bail!(ErrorKind::RecordOutOfRange("PLAYPAL", index)),
        };
        let mut colors = [0; PALETTE_SIZE];
        colors.copy_from_slice(bytes);
        Ok(Palette(colors))
    }

    pub fn color(&self, index: u8) -> [u8; 3] {
        let i = index as usize * 3;
        [self.0[i], self.0[i + 1], self.0[i + 2]]
    }
}

/// One of the light-level remappings from COLORMAP.
pub struct Colormap([u8; COLORMAP_SIZE]);

impl Colormap {
    pub fn from_colormap(lump: &[u8], index: usize) -> Result<Self> {
        let bytes = match nth_chunk(lump, index, COLORMAP_SIZE) {
            Some(bytes) => bytes,
            None => bail!(ErrorKind::RecordOutOfRange("COLORMAP", index)),
        };
        let mut map = [0; COLORMAP_SIZE];
        map.copy_from_slice(bytes);
        Ok(Colormap(map))
    }

    pub fn remap(&self, index: u8) -> u8 {
        self.0[index as usize]
    }
}


/// Maps pixel indices to RGB through an optional colormap and an optional palette.
pub struct ColorResolver {
    palette: Option<Palette>,
    colormap: Option<Colormap>,
}

impl ColorResolver {
    pub fn new(palette: Option<Palette>, colormap: Option<Colormap>) -> Self {
        ColorResolver{ palette, colormap }
    }

    /// Loads whichever of PLAYPAL and COLORMAP the options ask for.  Skipped lumps aren't
    /// looked up at all, so a wad without them still works when both are skipped.
    pub fn from_wad(wad: &BareWAD, options: &ExtractionOptions) -> Result<Self> {
        let palette = if options.skip_palette {
            None
        }
        else {
            let index = wad.find_entry("PLAYPAL")?;
            Some(Palette::from_playpal(wad.entry_slice(index), options.palette_index)?)
        };
        let colormap = if options.skip_colormap {
            None
        }
        else {
            let index = wad.find_entry("COLORMAP")?;
            Some(Colormap::from_colormap(wad.entry_slice(index), options.colormap_index)?)
        };
        debug!("color resolver: palette {}, colormap {}",
            if palette.is_some() { options.palette_index.to_string() } else { "skipped".to_owned() },
            if colormap.is_some() { options.colormap_index.to_string() } else { "skipped".to_owned() });
        Ok(ColorResolver{ palette, colormap })
    }

    pub fn resolve(&self, index: u8) -> [u8; 3] {
        let index = match self.colormap {
            Some(ref colormap) => colormap.remap(index),
            None => index,
        };
        match self.palette {
            Some(ref palette) => palette.color(index),
            None => [index, index, index],
        }
    }

    /// Converts a whole texture to RGBA8, row-major, using its mask for alpha.
    pub fn to_rgba(&self, texture: &DecodedTexture) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(texture.pixels.len() * 4);
        for (&index, &alpha) in texture.pixels.iter().zip(texture.alpha_mask.iter()) {
            rgba.extend_from_slice(&self.resolve(index));
            rgba.push(alpha);
        }
        rgba
    }
}
