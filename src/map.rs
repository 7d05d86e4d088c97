//! The finished product of a conversion: meshes, textures, and things, with no ties back to the
//! wad they came from.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use ::errors::Result;
use ::geom::{Normal, Point, Position, TexCoord};
use ::name::Name;
use ::palette::ColorResolver;
use ::parse::map::ThingFlags;
use ::texture::DecodedTexture;


/// A typed index into one of the map's tables.
pub struct Handle<T>(usize, PhantomData<*const T>);

impl<T> Handle<T> {
    pub fn index(&self) -> usize {
        return self.0;
    }
}

// Implemented by hand because the auto-generated impls assume T must also implement them, but we
// don't actually own a T.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        return Handle(self.0, PhantomData);
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        return self.0 == other.0;
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl<T> From<usize> for Handle<T> {
    fn from(index: usize) -> Self {
        return Handle(index, PhantomData);
    }
}

pub type TextureHandle = Handle<DecodedTexture>;


#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceVertex {
    pub position: Position,
    pub uv: TexCoord,
}

/// A planar quad.  Vertices 0 and 1 are the bottom edge, 2 and 3 the top edge, each running
/// from the wall's start to its end.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face {
    pub vertices: [FaceVertex; 4],
    pub normal: Normal,
    pub texture: TextureHandle,
}

impl Face {
    /// Two counter-clockwise triangles covering the quad.
    pub const INDICES: [u32; 6] = [0, 1, 2, 3, 2, 1];
}

/// A triangulated floor or ceiling.
#[derive(Clone, Debug, PartialEq)]
pub struct Flat {
    pub vertices: Vec<FaceVertex>,
    pub indices: Vec<u32>,
    pub texture: Option<TextureHandle>,
}

impl Flat {
    pub fn empty() -> Self {
        return Flat{ vertices: Vec::new(), indices: Vec::new(), texture: None };
    }

    pub fn is_empty(&self) -> bool {
        return self.indices.is_empty();
    }

    pub fn triangle_count(&self) -> usize {
        return self.indices.len() / 3;
    }
}


/// A closed or open chain of sector boundary points, in walk order.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryLoop {
    pub points: Vec<Point>,
    pub closed: bool,
}

#[derive(Debug)]
pub struct SectorMesh {
    pub faces: Vec<Face>,
    pub floor: Flat,
    pub ceiling: Flat,
    pub loops: Vec<BoundaryLoop>,
    pub floor_height: i16,
    pub ceiling_height: i16,
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

impl SectorMesh {
    pub fn is_empty(&self) -> bool {
        return self.faces.is_empty() && self.floor.is_empty() && self.ceiling.is_empty();
    }
}


#[derive(Debug)]
pub struct Thing {
    /// Where the thing stands: its map position, at the floor of the sector containing it
    pub position: Position,
    /// Facing, in radians counter-clockwise from east
    pub angle: f32,
    pub doomednum: i16,
    pub flags: ThingFlags,
    /// Sprite quad in the thing's local space, facing -X; absent for things without a sprite
    pub billboard: Option<Face>,
}


/// Something in the map that couldn't be converted faithfully, but didn't stop the conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    DegenerateSector { line: usize, sector: usize },
    OpenLoop { sector: usize, points: usize },
    MissingMiddleTexture { line: usize, sector: usize },
    MissingFlat { sector: usize, name: Name },
    TriangulationFailed { sector: usize, reason: String },
    UnknownThingType { thing: usize, doomednum: i16 },
    MissingSprite { thing: usize, name: Name },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Diagnostic::DegenerateSector{ line, sector } =>
                write!(f, "line {} faces sector {}, which has no height", line, sector),
            Diagnostic::OpenLoop{ sector, points } =>
                write!(f, "sector {} has an unclosed boundary of {} points", sector, points),
            Diagnostic::MissingMiddleTexture{ line, sector } =>
                write!(f, "one-sided line {} in sector {} has no middle texture", line, sector),
            Diagnostic::MissingFlat{ sector, name } =>
                write!(f, "sector {} uses missing flat {}", sector, name),
            Diagnostic::TriangulationFailed{ sector, ref reason } =>
                write!(f, "couldn't triangulate sector {}: {}", sector, reason),
            Diagnostic::UnknownThingType{ thing, doomednum } =>
                write!(f, "thing {} has unknown type {}", thing, doomednum),
            Diagnostic::MissingSprite{ thing, name } =>
                write!(f, "thing {} wants missing sprite {}", thing, name),
        }
    }
}


/// Every image the map refers to, each stored once.  The first texture registered under a
/// name keeps that name for the rest of the conversion.
#[derive(Debug, Default)]
pub struct TextureTable {
    textures: Vec<DecodedTexture>,
    by_name: HashMap<Name, usize>,
}

impl TextureTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn get(&self, handle: TextureHandle) -> &DecodedTexture {
        &self.textures[handle.index()]
    }

    pub fn lookup(&self, name: Name) -> Option<TextureHandle> {
        self.by_name.get(&name).map(|&index| index.into())
    }

    /// Returns the existing handle for `name`, or calls `load` to produce the texture and
    /// appends it.  `load` is never called for a name already in the table.
    pub fn resolve_with<F>(&mut self, name: Name, load: F) -> Result<TextureHandle>
        where F: FnOnce(Name) -> Result<DecodedTexture>
    {
        if let Some(handle) = self.lookup(name) {
            return Ok(handle);
        }
        let texture = load(name)?;
        Ok(self.push(name, texture))
    }

    /// Appends a texture under `name` without checking for an existing one.
    fn push(&mut self, name: Name, texture: DecodedTexture) -> TextureHandle {
        let index = self.textures.len();
        self.textures.push(texture);
        self.by_name.entry(name).or_insert(index);
        index.into()
    }

    pub fn iter(&self) -> ::std::slice::Iter<DecodedTexture> {
        self.textures.iter()
    }
}


#[derive(Debug)]
pub struct Map {
    pub name: Name,
    pub sectors: Vec<SectorMesh>,
    pub textures: TextureTable,
    pub things: Vec<Thing>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Map {
    pub fn face_count(&self) -> usize {
        let sector_faces: usize = self.sectors.iter().map(|sector| sector.faces.len()).sum();
        return sector_faces + self.things.iter().filter(|thing| thing.billboard.is_some()).count();
    }

    pub fn triangle_count(&self) -> usize {
        self.sectors.iter()
        .map(|sector| sector.faces.len() * 2 + sector.floor.triangle_count() + sector.ceiling.triangle_count())
        .sum()
    }

    /// Every texture in table order, as RGBA8.
    pub fn rgba_textures(&self, resolver: &ColorResolver) -> Vec<Vec<u8>> {
        self.textures.iter().map(|texture| resolver.to_rgba(texture)).collect()
    }
}
