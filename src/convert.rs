//! Runs one whole map conversion.
//!
//! All state that lives for the length of a conversion (the texture table, the patch cache,
//! the diagnostics so far) belongs to a `Conversion`, which is thrown away once the `Map` is
//! built.

use std::collections::HashSet;

use ::archive::wad::BareWAD;
use ::errors::{ErrorKind, Result};
use ::geom::{Normal, Point, Position, TexCoord};
use ::map::{BoundaryLoop, Diagnostic, Face, FaceVertex, Flat, Map, SectorMesh, TextureTable, Thing};
use ::name::Name;
use ::parse::map::{BareLine, BareSector, BareSide, BareThing, BareVertex};
use ::parse::wad::parse_wad;
use ::polygon;
use ::texture::{DecodedTexture, TextureLibrary, FLAT_WIDTH};
use ::universe::{lookup_thing_type, ThingType};
use ::view::MapView;
use ::walls::{self, TextureRef, WallSide};


/// Knobs for a conversion.  The defaults give the same output the game would draw.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionOptions {
    /// Load sprites and give known things a billboard.  Things are always recorded.
    pub export_things: bool,
    /// Which PLAYPAL palette to use for colors
    pub palette_index: usize,
    /// Which COLORMAP light level to apply before the palette
    pub colormap_index: usize,
    pub skip_palette: bool,
    pub skip_colormap: bool,
    /// Work out which sector loops are holes from how they nest, instead of treating every
    /// loop after the first as a hole
    pub classify_loops: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        ExtractionOptions{
            export_things: true,
            palette_index: 0,
            colormap_index: 0,
            skip_palette: false,
            skip_colormap: false,
            classify_loops: false,
        }
    }
}


/// Converts the map called `map_name` in the wad held by `buf`.
pub fn convert_map<N: Into<Name>>(buf: &[u8], map_name: N, options: &ExtractionOptions) -> Result<Map> {
    let map_name = map_name.into();
    let wad = parse_wad(buf)?;
    let block = wad.map_block(map_name)?;
    let view = MapView::new(&wad, &block);
    info!("converting {}: {} lines, {} sides, {} sectors, {} things",
        map_name, view.lines.len(), view.sides.len(), view.sectors.len(), view.things.len());

    let mut conversion = Conversion::new(&wad, options)?;
    let map = conversion.run(map_name, &view)?;
    info!("converted {}: {} faces, {} triangles, {} textures ({} patches decoded), {} things, {} diagnostics",
        map.name, map.face_count(), map.triangle_count(), map.textures.len(),
        conversion.library.patch_cache().decode_count(), map.things.len(), map.diagnostics.len());
    Ok(map)
}


fn wall_side<'r>(sides: &'r [BareSide], sectors: &'r [BareSector], index: u16) -> Result<(WallSide<'r>, usize)> {
    let side = record(sides, "SIDEDEFS", index as usize)?;
    let sector = record(sectors, "SECTORS", side.sector as usize)?;
    Ok((WallSide{ side, sector }, side.sector as usize))
}

fn record<'r, T>(records: &'r [T], lump: &'static str, index: usize) -> Result<&'r T> {
    match records.get(index) {
        Some(record) => Ok(record),
        None => bail!(ErrorKind::RecordOutOfRange(lump, index)),
    }
}

struct Conversion<'a> {
    library: TextureLibrary<'a>,
    textures: TextureTable,
    missing_flats: HashSet<Name>,
    diagnostics: Vec<Diagnostic>,
    options: &'a ExtractionOptions,
}

impl<'a> Conversion<'a> {
    fn new(wad: &'a BareWAD<'a>, options: &'a ExtractionOptions) -> Result<Self> {
        Ok(Conversion{
            library: TextureLibrary::new(wad)?,
            textures: TextureTable::new(),
            missing_flats: HashSet::new(),
            diagnostics: Vec::new(),
            options,
        })
    }

    fn run(&mut self, name: Name, view: &MapView) -> Result<Map> {
        let vertices = view.vertices.to_vec()?;
        let lines = view.lines.to_vec()?;
        let sides = view.sides.to_vec()?;
        let sectors = view.sectors.to_vec()?;

        let mut meshes: Vec<SectorMesh> = sectors.iter().map(|sector| SectorMesh{
            faces: Vec::new(),
            floor: Flat::empty(),
            ceiling: Flat::empty(),
            loops: Vec::new(),
            floor_height: sector.floor_height,
            ceiling_height: sector.ceiling_height,
            light: sector.light,
            special: sector.sector_type,
            tag: sector.sector_tag,
        }).collect();

        self.build_walls(&lines, &sides, &vertices, &sectors, &mut meshes)?;
        debug!("walls done, {} textures so far", self.textures.len());
        self.build_flats(&lines, &sides, &vertices, &sectors, &mut meshes)?;

        let things = view.things.to_vec()?;
        let things = self.place_things(&things, &meshes)?;

        for diagnostic in &self.diagnostics {
            warn!("{}: {}", name, diagnostic);
        }

        Ok(Map{
            name,
            sectors: meshes,
            textures: ::std::mem::replace(&mut self.textures, TextureTable::new()),
            things,
            diagnostics: ::std::mem::replace(&mut self.diagnostics, Vec::new()),
        })
    }

    fn wall_texture(&mut self, name: Name) -> Result<TextureRef> {
        let library = &mut self.library;
        let handle = self.textures.resolve_with(name, |name| library.composite(name))?;
        let texture = self.textures.get(handle);
        Ok(TextureRef{ handle, width: texture.width, height: texture.height })
    }

    /// Missing flats turn into a transparent placeholder, so the floor still has somewhere
    /// to point.
    fn flat_texture(&mut self, sector: usize, name: Name) -> Result<TextureRef> {
        let library = &self.library;
        let missing_flats = &mut self.missing_flats;
        let handle = self.textures.resolve_with(name, |name| {
            Ok(library.flat(name).unwrap_or_else(|| {
                missing_flats.insert(name);
                DecodedTexture::blank(name, FLAT_WIDTH, FLAT_WIDTH)
            }))
        })?;
        if self.missing_flats.contains(&name) {
            self.diagnostics.push(Diagnostic::MissingFlat{ sector, name });
        }
        let texture = self.textures.get(handle);
        Ok(TextureRef{ handle, width: texture.width, height: texture.height })
    }

    /// Tries each candidate lump name in turn.
    fn sprite_texture(&mut self, names: &[Name]) -> Result<Option<TextureRef>> {
        for &name in names {
            let handle = match self.textures.lookup(name) {
                Some(handle) => handle,
                None => match self.library.sprite(name)? {
                    Some(sprite) => self.textures.resolve_with(name, |_| Ok(sprite))?,
                    None => continue,
                },
            };
            let texture = self.textures.get(handle);
            return Ok(Some(TextureRef{ handle, width: texture.width, height: texture.height }));
        }
        Ok(None)
    }

    fn build_walls(
        &mut self, lines: &[BareLine], sides: &[BareSide], vertices: &[BareVertex],
        sectors: &[BareSector], meshes: &mut [SectorMesh],
    ) -> Result<()> {
        for (i, line) in lines.iter().enumerate() {
            let v0 = *record(vertices, "VERTEXES", line.v0 as usize)?;
            let v1 = *record(vertices, "VERTEXES", line.v1 as usize)?;
            let (front, front_sector) = wall_side(sides, sectors, line.front_sidedef)?;
            let back = match line.back_sidedef {
                Some(index) => Some(wall_side(sides, sectors, index)?),
                None => None,
            };

            let faces = walls::line_faces(
                i, line, v0, v1, front, back.map(|(side, _)| side),
                &mut |name: Name| self.wall_texture(name),
            )?;
            meshes[front_sector].faces.extend(faces.front);
            if let Some((_, back_sector)) = back {
                meshes[back_sector].faces.extend(faces.back);
            }
            self.diagnostics.extend(faces.diagnostics);
        }
        Ok(())
    }

    fn build_flats(
        &mut self, lines: &[BareLine], sides: &[BareSide], vertices: &[BareVertex],
        sectors: &[BareSector], meshes: &mut [SectorMesh],
    ) -> Result<()> {
        let segments = polygon::sector_segments(lines, sides, sectors.len())?;
        for (i, (sector, mesh)) in sectors.iter().zip(meshes.iter_mut()).enumerate() {
            let mut loops = Vec::new();
            for index_loop in polygon::extract_loops(&segments[i]) {
                let points = polygon::loop_points(vertices, &index_loop.vertices)?;
                if !index_loop.closed {
                    self.diagnostics.push(Diagnostic::OpenLoop{ sector: i, points: points.len() });
                }
                mesh.loops.push(BoundaryLoop{ points: points.clone(), closed: index_loop.closed });
                loops.push(points);
            }
            if loops.is_empty() || sector.is_degenerate() {
                continue;
            }

            let floor_texture = self.flat_texture(i, sector.floor_texture)?;
            let ceiling_texture = self.flat_texture(i, sector.ceiling_texture)?;
            match polygon::build_flats(
                &loops, sector.floor_height, sector.ceiling_height,
                &floor_texture, &ceiling_texture, self.options.classify_loops,
            ) {
                Ok((floor, ceiling)) => {
                    mesh.floor = floor;
                    mesh.ceiling = ceiling;
                }
                Err(err) => {
                    // Only a bad outline is survivable; anything else still ends the conversion
                    if let ErrorKind::TriangulationFailed(ref reason) = *err.kind() {
                        self.diagnostics.push(Diagnostic::TriangulationFailed{ sector: i, reason: reason.clone() });
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Every THINGS record becomes a `Thing`.  Sprites are only looked up when things are
    /// being exported, and only for types in the table.
    fn place_things(&mut self, things: &[BareThing], meshes: &[SectorMesh]) -> Result<Vec<Thing>> {
        let mut placed = Vec::with_capacity(things.len());
        for (i, bare) in things.iter().enumerate() {
            let billboard = match lookup_thing_type(bare.doomednum) {
                Some(thing_type) if self.options.export_things => self.thing_billboard(i, thing_type)?,
                Some(_) => None,
                None => {
                    self.diagnostics.push(Diagnostic::UnknownThingType{ thing: i, doomednum: bare.doomednum });
                    None
                }
            };

            let point = Point::new(bare.x as f64, bare.y as f64);
            let floor = containing_sector(meshes, point).map_or(0, |sector| meshes[sector].floor_height);
            placed.push(Thing{
                position: Position::new(bare.x as f32, bare.y as f32, floor as f32),
                angle: (bare.angle as f32).to_radians(),
                doomednum: bare.doomednum,
                flags: bare.flags,
                billboard,
            });
        }
        Ok(placed)
    }

    fn thing_billboard(&mut self, thing: usize, thing_type: &ThingType) -> Result<Option<Face>> {
        let names: Vec<Name> = thing_type.sprite_lump_names().iter().map(|name| Name::new(name)).collect();
        if names.is_empty() {
            return Ok(None);
        }
        match self.sprite_texture(&names)? {
            Some(texture) => Ok(Some(billboard(&texture))),
            None => {
                self.diagnostics.push(Diagnostic::MissingSprite{ thing, name: names[0] });
                Ok(None)
            }
        }
    }
}


/// The sector `point` stands in.  Inside a sector means inside an odd number of its closed
/// loops, so points in a hole don't count.  When sectors overlap, the one with the smallest
/// loop around the point wins, so a thing on a platform inside a room lands on the platform.
pub fn containing_sector(meshes: &[SectorMesh], point: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, mesh) in meshes.iter().enumerate() {
        let areas: Vec<f64> = mesh.loops.iter()
            .filter(|boundary| boundary.closed && polygon::is_point_in_polygon(point, &boundary.points))
            .map(|boundary| loop_area(&boundary.points))
            .collect();
        if areas.len() % 2 == 0 {
            continue;
        }
        let area = areas.iter().cloned().fold(::std::f64::INFINITY, f64::min);
        if best.map_or(true, |(_, best_area)| area < best_area) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

fn loop_area(points: &[Point]) -> f64 {
    let mut area = 0.0;
    for (i, p0) in points.iter().enumerate() {
        let p1 = points[(i + 1) % points.len()];
        area += p0.x * p1.y - p1.x * p0.y;
    }
    (area / 2.0).abs()
}

/// A sprite-sized quad standing on the origin, facing -X.  Unlike wall faces, vertices 0 and
/// 1 are the top edge.
pub fn billboard(texture: &TextureRef) -> Face {
    let half_width = texture.width as f32 / 2.0;
    let height = texture.height as f32;
    let vertex = |y: f32, z: f32, u: f32, v: f32| FaceVertex{
        position: Position::new(0.0, y, z),
        uv: TexCoord::new(u, v),
    };
    Face{
        vertices: [
            vertex(-half_width, height, 1.0, 0.0),
            vertex(half_width, height, 0.0, 0.0),
            vertex(-half_width, 0.0, 1.0, 1.0),
            vertex(half_width, 0.0, 0.0, 1.0),
        ],
        normal: Normal::new(-1.0, 0.0, 0.0),
        texture: texture.handle,
    }
}
