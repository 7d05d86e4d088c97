//! Turns linedefs into textured wall quads.
//!
//! A one-sided line is a single wall from floor to ceiling.  A two-sided line can show up to
//! three bands: the step between the two floors, the opening between them (if either side
//! has a middle texture), and the step between the two ceilings.  Each band belongs to the
//! sector it's visible from, and is wound to face into that sector.

use std::cmp;

use ::errors::Result;
use ::geom::{Normal, Position, TexCoord};
use ::map::{Diagnostic, Face, FaceVertex, TextureHandle};
use ::name::Name;
use ::parse::map::{BareLine, BareSector, BareSide, BareVertex, LineFlags};


/// A resolved texture, as far as wall layout cares.
#[derive(Copy, Clone, Debug)]
pub struct TextureRef {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// One side of a line, with the sector it faces.
#[derive(Copy, Clone)]
pub struct WallSide<'a> {
    pub side: &'a BareSide,
    pub sector: &'a BareSector,
}

/// Faces generated for one line, split by which sector they belong to.
#[derive(Debug, Default)]
pub struct LineFaces {
    pub front: Vec<Face>,
    pub back: Vec<Face>,
    pub diagnostics: Vec<Diagnostic>,
}


/// Builds one quad standing on the segment `v0`..`v1`.
///
/// `peg` is the height where the texture's top row lines up; V grows downward from there.
/// U runs from 0 at `v0` to the segment length at `v1`.  The side's offsets shift both before
/// scaling to the texture size.
pub fn make_face(
    v0: BareVertex, v1: BareVertex, bottom: i16, top: i16, peg: i16,
    side: &BareSide, texture: TextureRef,
) -> Face {
    let (x0, y0) = (v0.x as f32, v0.y as f32);
    let (x1, y1) = (v1.x as f32, v1.y as f32);
    let (bottom, top, peg) = (bottom as f32, top as f32, peg as f32);
    let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

    let positions = [
        Position::new(x0, y0, bottom),
        Position::new(x1, y1, bottom),
        Position::new(x0, y0, top),
        Position::new(x1, y1, top),
    ];
    let raw_uvs = [
        (0.0, peg - bottom),
        (length, peg - bottom),
        (0.0, peg - top),
        (length, peg - top),
    ];

    let width = cmp::max(texture.width, 1) as f32;
    let height = cmp::max(texture.height, 1) as f32;
    let mut vertices = [FaceVertex{ position: positions[0], uv: TexCoord::new(0.0, 0.0) }; 4];
    for (vertex, (&position, &(u, v))) in vertices.iter_mut().zip(positions.iter().zip(raw_uvs.iter())) {
        vertex.position = position;
        vertex.uv = TexCoord::new(
            (u + side.x_offset as f32) / width,
            (v + side.y_offset as f32) / height,
        );
    }

    Face{
        vertices,
        normal: face_normal(&positions),
        texture: texture.handle,
    }
}

fn face_normal(positions: &[Position; 4]) -> Normal {
    let along = (positions[1] - positions[0]).normalize();
    let diagonal = (positions[2] - positions[1]).normalize();
    along.cross(diagonal).normalize()
}


/// Generates every wall quad for one line.
///
/// `resolve` is only asked about names that are actually going to be drawn, never about the
/// `-` placeholder.
pub fn line_faces<F>(
    line_index: usize, line: &BareLine, v0: BareVertex, v1: BareVertex,
    front: WallSide, back: Option<WallSide>, resolve: &mut F,
) -> Result<LineFaces>
    where F: FnMut(Name) -> Result<TextureRef>
{
    let mut faces = LineFaces::default();
    match back {
        Some(back) if line.flags.contains(LineFlags::TWO_SIDED) => {
            two_sided(line, v0, v1, front, back, resolve, &mut faces)?;
        }
        Some(back) => {
            // Not marked two-sided, so each side is a solid wall of its own
            one_sided(line_index, line, v0, v1, front, resolve, &mut faces.front, &mut faces.diagnostics)?;
            one_sided(line_index, line, v1, v0, back, resolve, &mut faces.back, &mut faces.diagnostics)?;
        }
        None => {
            one_sided(line_index, line, v0, v1, front, resolve, &mut faces.front, &mut faces.diagnostics)?;
        }
    }
    Ok(faces)
}

fn one_sided<F>(
    line_index: usize, line: &BareLine, v0: BareVertex, v1: BareVertex, wall: WallSide,
    resolve: &mut F, out: &mut Vec<Face>, diagnostics: &mut Vec<Diagnostic>,
) -> Result<()>
    where F: FnMut(Name) -> Result<TextureRef>
{
    let sector = wall.sector;
    let sector_index = wall.side.sector as usize;
    if sector.is_degenerate() {
        diagnostics.push(Diagnostic::DegenerateSector{ line: line_index, sector: sector_index });
        return Ok(());
    }
    if wall.side.middle_texture.is_absent() {
        diagnostics.push(Diagnostic::MissingMiddleTexture{ line: line_index, sector: sector_index });
        return Ok(());
    }

    let peg = if line.flags.contains(LineFlags::LOWER_UNPEGGED) {
        sector.floor_height
    }
    else {
        sector.ceiling_height
    };
    let texture = resolve(wall.side.middle_texture)?;
    out.push(make_face(v0, v1, sector.floor_height, sector.ceiling_height, peg, wall.side, texture));
    Ok(())
}

fn two_sided<F>(
    line: &BareLine, v0: BareVertex, v1: BareVertex, front: WallSide, back: WallSide,
    resolve: &mut F, faces: &mut LineFaces,
) -> Result<()>
    where F: FnMut(Name) -> Result<TextureRef>
{
    let (fs, bs) = (front.sector, back.sector);
    let front_floor_lower = fs.floor_height <= bs.floor_height;
    let front_ceiling_higher = fs.ceiling_height >= bs.ceiling_height;
    let higher_ceiling = cmp::max(fs.ceiling_height, bs.ceiling_height);
    let lower_ceiling = cmp::min(fs.ceiling_height, bs.ceiling_height);
    let higher_floor = cmp::max(fs.floor_height, bs.floor_height);
    let lower_floor = cmp::min(fs.floor_height, bs.floor_height);
    let lower_unpegged = line.flags.contains(LineFlags::LOWER_UNPEGGED);
    let upper_unpegged = line.flags.contains(LineFlags::UPPER_UNPEGGED);

    // Lower band: the step up from the lower floor, seen from the lower side
    if fs.floor_height != bs.floor_height {
        let peg = if lower_unpegged { higher_ceiling } else { higher_floor };
        let (wall, a, b, out) = if front_floor_lower {
            (front, v0, v1, &mut faces.front)
        }
        else {
            (back, v1, v0, &mut faces.back)
        };
        if !wall.side.lower_texture.is_absent() {
            let texture = resolve(wall.side.lower_texture)?;
            out.push(make_face(a, b, lower_floor, higher_floor, peg, wall.side, texture));
        }
    }

    // Middle band: whatever hangs in the opening, drawn once per side that has something
    if lower_ceiling > higher_floor {
        let peg = if lower_unpegged { higher_floor } else { lower_ceiling };
        if !front.side.middle_texture.is_absent() {
            let texture = resolve(front.side.middle_texture)?;
            faces.front.push(make_face(v0, v1, higher_floor, lower_ceiling, peg, front.side, texture));
        }
        if !back.side.middle_texture.is_absent() {
            let texture = resolve(back.side.middle_texture)?;
            faces.back.push(make_face(v1, v0, higher_floor, lower_ceiling, peg, back.side, texture));
        }
    }

    // Upper band: the step down from the higher ceiling, seen from the higher side
    if fs.ceiling_height != bs.ceiling_height {
        let peg = if upper_unpegged { higher_ceiling } else { higher_floor };
        let (wall, a, b, out) = if front_ceiling_higher {
            (front, v0, v1, &mut faces.front)
        }
        else {
            (back, v1, v0, &mut faces.back)
        };
        if !wall.side.upper_texture.is_absent() {
            let texture = resolve(wall.side.upper_texture)?;
            out.push(make_face(a, b, lower_ceiling, higher_ceiling, peg, wall.side, texture));
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use errors::Result;
    use map::Diagnostic;
    use name::Name;
    use parse::map::{BareLine, BareSector, BareSide, BareVertex, LineFlags};

    fn sector(floor: i16, ceiling: i16) -> BareSector {
        BareSector{
            floor_height: floor,
            ceiling_height: ceiling,
            floor_texture: Name::new("FLOOR4_8"),
            ceiling_texture: Name::new("CEIL3_5"),
            light: 160,
            sector_type: 0,
            sector_tag: 0,
        }
    }

    fn side(sector: u16, upper: &str, middle: &str, lower: &str) -> BareSide {
        BareSide{
            x_offset: 0,
            y_offset: 0,
            upper_texture: Name::new(upper),
            lower_texture: Name::new(lower),
            middle_texture: Name::new(middle),
            sector,
        }
    }

    fn line(flags: LineFlags, two_sided: bool) -> BareLine {
        BareLine{
            v0: 0,
            v1: 1,
            flags,
            special: 0,
            sector_tag: 0,
            front_sidedef: 0,
            back_sidedef: if two_sided { Some(1) } else { None },
        }
    }

    const V0: BareVertex = BareVertex{ x: 0, y: 0 };
    const V1: BareVertex = BareVertex{ x: 64, y: 0 };

    /// Hands out a new index per distinct name and records what was asked for.
    struct FakeTextures {
        requested: Vec<Name>,
    }

    impl FakeTextures {
        fn new() -> Self {
            FakeTextures{ requested: Vec::new() }
        }

        fn resolve(&mut self, name: Name) -> Result<TextureRef> {
            assert!(!name.is_absent(), "asked to resolve a placeholder");
            let index = match self.requested.iter().position(|&n| n == name) {
                Some(index) => index,
                None => {
                    self.requested.push(name);
                    self.requested.len() - 1
                }
            };
            Ok(TextureRef{ handle: index.into(), width: 64, height: 128 })
        }
    }

    fn heights(face: &Face) -> (f32, f32) {
        (face.vertices[0].position.z, face.vertices[2].position.z)
    }

    #[test]
    fn one_sided_wall_spans_floor_to_ceiling() {
        let (front_sector, front_side) = (sector(0, 64), side(0, "-", "STARTAN3", "-"));
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(LineFlags::empty(), false), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector }, None,
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert_eq!(faces.front.len(), 1);
        assert!(faces.back.is_empty());
        let face = &faces.front[0];
        assert_eq!(heights(face), (0.0, 64.0));
        // Pegged to the ceiling: V is 0 at the top and 64 texels down at the bottom
        assert_relative_eq!(face.vertices[2].uv.y * 128.0, 0.0);
        assert_relative_eq!(face.vertices[0].uv.y * 128.0, 64.0);
        assert_relative_eq!(face.vertices[1].uv.x, 1.0);
        // Front of an eastward line is its south side
        assert_relative_eq!(face.normal.y, -1.0);
        assert_relative_eq!(face.normal.x, 0.0);
        assert_eq!(textures.requested, vec![Name::new("STARTAN3")]);
    }

    #[test]
    fn lower_unpegged_one_sided_wall_pegs_to_floor() {
        let (front_sector, mut front_side) = (sector(16, 80), side(0, "-", "STARTAN3", "-"));
        front_side.x_offset = 32;
        front_side.y_offset = 8;
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(LineFlags::LOWER_UNPEGGED, false), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector }, None,
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        let face = &faces.front[0];
        assert_relative_eq!(face.vertices[0].uv.y * 128.0, 8.0);
        assert_relative_eq!(face.vertices[2].uv.y * 128.0, -56.0);
        assert_relative_eq!(face.vertices[0].uv.x * 64.0, 32.0);
        assert_relative_eq!(face.vertices[3].uv.x * 64.0, 96.0);
    }

    #[test]
    fn one_sided_wall_without_middle_texture_is_reported() {
        let (front_sector, front_side) = (sector(0, 64), side(3, "-", "-", "-"));
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            7, &line(LineFlags::empty(), false), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector }, None,
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert!(faces.front.is_empty());
        assert_eq!(faces.diagnostics, vec![Diagnostic::MissingMiddleTexture{ line: 7, sector: 3 }]);
        assert!(textures.requested.is_empty());
    }

    #[test]
    fn degenerate_sector_gets_no_wall() {
        let (front_sector, front_side) = (sector(32, 32), side(2, "-", "STARTAN3", "-"));
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            1, &line(LineFlags::empty(), false), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector }, None,
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert!(faces.front.is_empty());
        assert_eq!(faces.diagnostics, vec![Diagnostic::DegenerateSector{ line: 1, sector: 2 }]);
    }

    #[test]
    fn two_sided_bands_cover_the_whole_span() {
        let front_sector = sector(0, 128);
        let back_sector = sector(32, 96);
        let front_side = side(0, "UPPER", "GRATE", "LOWER");
        let back_side = side(1, "BUPPER", "-", "BLOWER");
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(LineFlags::TWO_SIDED, true), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector },
            Some(WallSide{ side: &back_side, sector: &back_sector }),
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        // Everything is visible from the taller front sector
        assert!(faces.back.is_empty());
        let mut spans: Vec<_> = faces.front.iter().map(heights).collect();
        spans.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        assert_eq!(spans, vec![(0.0, 32.0), (32.0, 96.0), (96.0, 128.0)]);
        assert_eq!(textures.requested, vec![Name::new("LOWER"), Name::new("GRATE"), Name::new("UPPER")]);
    }

    #[test]
    fn steps_face_the_lower_side() {
        let front_sector = sector(32, 96);
        let back_sector = sector(0, 128);
        let front_side = side(0, "UPPER", "-", "LOWER");
        let back_side = side(1, "BUPPER", "-", "BLOWER");
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(LineFlags::TWO_SIDED, true), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector },
            Some(WallSide{ side: &back_side, sector: &back_sector }),
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert!(faces.front.is_empty());
        assert_eq!(faces.back.len(), 2);
        for face in &faces.back {
            // Wound from the end vertex back to the start, so it faces north into the back sector
            assert_eq!(face.vertices[0].position.x, 64.0);
            assert_relative_eq!(face.normal.y, 1.0);
        }
        assert_eq!(textures.requested, vec![Name::new("BLOWER"), Name::new("BUPPER")]);
    }

    #[test]
    fn two_sided_pegging() {
        let front_sector = sector(0, 128);
        let back_sector = sector(32, 96);
        let front_side = side(0, "UPPER", "-", "LOWER");
        let back_side = side(1, "-", "-", "-");
        let flags = LineFlags::TWO_SIDED | LineFlags::LOWER_UNPEGGED | LineFlags::UPPER_UNPEGGED;
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(flags, true), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector },
            Some(WallSide{ side: &back_side, sector: &back_sector }),
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert_eq!(faces.front.len(), 2);
        for face in &faces.front {
            // Both bands are pegged to the higher ceiling, 128
            let (bottom, top) = heights(face);
            assert_relative_eq!(face.vertices[0].uv.y * 128.0, 128.0 - bottom);
            assert_relative_eq!(face.vertices[2].uv.y * 128.0, 128.0 - top);
        }
    }

    #[test]
    fn closed_opening_has_no_middle() {
        let front_sector = sector(0, 64);
        let back_sector = sector(64, 128);
        let front_side = side(0, "-", "GRATE", "LOWER");
        let back_side = side(1, "BUPPER", "BGRATE", "-");
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(LineFlags::TWO_SIDED, true), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector },
            Some(WallSide{ side: &back_side, sector: &back_sector }),
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert_eq!(faces.front.iter().map(heights).collect::<Vec<_>>(), vec![(0.0, 64.0)]);
        assert_eq!(faces.back.iter().map(heights).collect::<Vec<_>>(), vec![(64.0, 128.0)]);
        assert!(!textures.requested.contains(&Name::new("GRATE")));
        assert!(!textures.requested.contains(&Name::new("BGRATE")));
    }

    #[test]
    fn back_side_without_flag_is_two_solid_walls() {
        let front_sector = sector(0, 64);
        let back_sector = sector(0, 96);
        let front_side = side(0, "-", "FRONTW", "-");
        let back_side = side(1, "-", "BACKW", "-");
        let mut textures = FakeTextures::new();
        let faces = line_faces(
            0, &line(LineFlags::empty(), true), V0, V1,
            WallSide{ side: &front_side, sector: &front_sector },
            Some(WallSide{ side: &back_side, sector: &back_sector }),
            &mut |name: Name| textures.resolve(name),
        ).unwrap();

        assert_eq!(faces.front.len(), 1);
        assert_eq!(faces.back.len(), 1);
        assert_eq!(heights(&faces.back[0]), (0.0, 96.0));
        assert_eq!(faces.back[0].vertices[0].position.x, 64.0);
    }
}
