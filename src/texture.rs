//! Paletted images: patches, composite wall textures, flats, and sprites.

use std::collections::HashMap;

use ::archive::wad::BareWAD;
use ::errors::{ErrorKind, Result};
use ::name::Name;
use ::parse::patch::{column_posts, parse_patch_header};
use ::parse::texturex::{find_texture_definition, parse_pnames, TextureDefinition};


/// Flats are always this wide; their height is whatever the lump length allows.
pub const FLAT_WIDTH: u32 = 64;

/// A paletted image.  Both buffers are row-major, `width * height` long.  A pixel is only
/// meaningful where its alpha is 0xFF; everything else was never drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTexture {
    pub name: Name,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub alpha_mask: Vec<u8>,
}

impl DecodedTexture {
    /// A fully transparent canvas.
    pub fn blank(name: Name, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        DecodedTexture{
            name,
            width,
            height,
            pixels: vec![0; len],
            alpha_mask: vec![0; len],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Palette index and alpha at a pixel, or `None` off the edge.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) as usize;
        Some((self.pixels[i], self.alpha_mask[i]))
    }

    fn put(&mut self, x: i32, y: i32, index: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = (y as u32 * self.width + x as u32) as usize;
        self.pixels[i] = index;
        self.alpha_mask[i] = 0xFF;
    }

    /// Draws the opaque pixels of `source` with its top-left corner at `(x, y)`, clipping to
    /// this canvas.
    pub fn blit(&mut self, source: &DecodedTexture, x: i32, y: i32) {
        for sy in 0 .. source.height {
            for sx in 0 .. source.width {
                let i = (sy * source.width + sx) as usize;
                if source.alpha_mask[i] != 0 {
                    self.put(x + sx as i32, y + sy as i32, source.pixels[i]);
                }
            }
        }
    }
}


/// Decodes a patch-format lump: wall patches and sprites both use it.
pub fn decode_patch(name: Name, lump: &[u8]) -> Result<DecodedTexture> {
    let header = parse_patch_header(lump)?;
    let mut canvas = DecodedTexture::blank(name, header.width as u32, header.height as u32);
    for (x, &offset) in header.column_offsets.iter().enumerate() {
        for post in column_posts(lump, offset)? {
            for (i, &index) in post.pixels.iter().enumerate() {
                canvas.put(x as i32, post.row_start as i32 + i as i32, index);
            }
        }
    }
    Ok(canvas)
}

/// Decodes a flat: raw 64-pixel rows, every pixel opaque.
pub fn decode_flat(name: Name, lump: &[u8]) -> Option<DecodedTexture> {
    let height = lump.len() as u32 / FLAT_WIDTH;
    if height == 0 {
        return None;
    }
    let len = (FLAT_WIDTH * height) as usize;
    Some(DecodedTexture{
        name,
        width: FLAT_WIDTH,
        height,
        pixels: lump[..len].to_vec(),
        alpha_mask: vec![0xFF; len],
    })
}


/// Decoded patches, keyed by name, for the lifetime of one conversion.
#[derive(Default)]
pub struct PatchCache {
    patches: HashMap<Name, DecodedTexture>,
    decodes: usize,
}

impl PatchCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// How many patches have actually been decoded, as opposed to served from the cache.
    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    pub fn get(&mut self, wad: &BareWAD, name: Name) -> Result<&DecodedTexture> {
        if !self.patches.contains_key(&name) {
            let lump = wad.entry_slice(wad.find_entry(name)?);
            let patch = decode_patch(name, lump)?;
            debug!("decoded patch {} ({}x{})", name, patch.width, patch.height);
            self.decodes += 1;
            self.patches.insert(name, patch);
        }
        Ok(&self.patches[&name])
    }
}


/// Everything needed to turn a texture, flat, or sprite name into pixels.
pub struct TextureLibrary<'a> {
    wad: &'a BareWAD<'a>,
    pnames: Vec<Name>,
    /// TEXTURE1, then TEXTURE2, whichever exist
    texture_lumps: Vec<&'a [u8]>,
    patches: PatchCache,
}

impl<'a> TextureLibrary<'a> {
    pub fn new(wad: &'a BareWAD<'a>) -> Result<Self> {
        let pnames = match wad.first_entry("PNAMES") {
            Some(lump) => parse_pnames(lump)?,
            None => Vec::new(),
        };
        let texture_lumps: Vec<_> = ["TEXTURE1", "TEXTURE2"].iter()
            .filter_map(|&lump_name| wad.first_entry(lump_name))
            .collect();
        debug!("{} patch names, {} texture lumps", pnames.len(), texture_lumps.len());

        Ok(TextureLibrary{
            wad,
            pnames,
            texture_lumps,
            patches: PatchCache::new(),
        })
    }

    pub fn patch_cache(&self) -> &PatchCache {
        &self.patches
    }

    pub fn find_definition(&self, name: Name) -> Result<TextureDefinition> {
        for lump in &self.texture_lumps {
            if let Some(def) = find_texture_definition(lump, &name)? {
                return Ok(def);
            }
        }
        bail!(ErrorKind::TextureNotFound(name));
    }

    /// Builds a wall texture from its patches.  Later patches overwrite earlier ones, but only
    /// where they're opaque.
    pub fn composite(&mut self, name: Name) -> Result<DecodedTexture> {
        let def = self.find_definition(name)?;
        let mut canvas = DecodedTexture::blank(def.name, def.width as u32, def.height as u32);
        for placement in &def.patches {
            let patch_name = match self.pnames.get(placement.patch as usize) {
                Some(&patch_name) => patch_name,
                None => bail!(ErrorKind::RecordOutOfRange("PNAMES", placement.patch as usize)),
            };
            let patch = self.patches.get(self.wad, patch_name)?;
            canvas.blit(patch, placement.origin_x as i32, placement.origin_y as i32);
        }
        Ok(canvas)
    }

    /// Looks for a flat between the flat markers first, then anywhere at all.
    pub fn flat(&self, name: Name) -> Option<DecodedTexture> {
        let index = self.wad.find_entry_between("F_START", "F_END", name)
            .or_else(|| self.wad.find_entry(name).ok())?;
        decode_flat(name, self.wad.entry_slice(index))
    }

    /// Same search order as `flat`, but between the sprite markers.
    pub fn sprite(&self, name: Name) -> Result<Option<DecodedTexture>> {
        let index = match self.wad.find_entry_between("S_START", "S_END", name)
            .or_else(|| self.wad.find_entry(name).ok())
        {
            Some(index) => index,
            None => return Ok(None),
        };
        decode_patch(name, self.wad.entry_slice(index)).map(Some)
    }
}
