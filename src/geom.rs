use euclid::{TypedPoint2D, TypedPoint3D, TypedVector3D};

/// Doom map units: x east, y north.
pub struct MapSpace;
/// Output space: the map's x and y, plus z up.  Same scale as `MapSpace`.
pub struct WorldSpace;
/// Texture coordinates, where 1.0 spans the whole texture once.
pub struct TextureSpace;

pub type Coord = f64;
pub type Point = TypedPoint2D<Coord, MapSpace>;

pub type Position = TypedPoint3D<f32, WorldSpace>;
pub type Normal = TypedVector3D<f32, WorldSpace>;
pub type TexCoord = TypedPoint2D<f32, TextureSpace>;
