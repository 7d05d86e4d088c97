//! Sector outlines and the floors and ceilings filled in from them.
//!
//! Every side contributes one directed segment to the sector it faces.  Walking those
//! segments end to start produces the sector's boundary loops, which are then handed to an
//! ear-clipping triangulator.

use earcutr;

use ::errors::{ErrorKind, Result};
use ::geom::{Point, Position, TexCoord};
use ::map::{FaceVertex, Flat};
use ::parse::map::{BareLine, BareSide, BareVertex};
use ::walls::TextureRef;


/// A directed boundary edge, as a pair of vertex indices.
pub type Segment = (u16, u16);

/// Vertex indices of one boundary, in walk order, without repeating the first at the end.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexLoop {
    pub vertices: Vec<u16>,
    pub closed: bool,
}


/// Groups the map's lines into directed segments per sector.  The front side runs start to
/// end and the back side end to start, so every sector's boundary is consistently wound.
/// Lines with the same sector on both sides don't bound anything and are left out.
pub fn sector_segments(lines: &[BareLine], sides: &[BareSide], sector_count: usize) -> Result<Vec<Vec<Segment>>> {
    let side_sector = |index: u16| -> Result<usize> {
        let side = match sides.get(index as usize) {
            Some(side) => side,
            None => bail!(ErrorKind::RecordOutOfRange("SIDEDEFS", index as usize)),
        };
        let sector = side.sector as usize;
        if sector >= sector_count {
            bail!(ErrorKind::RecordOutOfRange("SECTORS", sector));
        }
        Ok(sector)
    };

    let mut segments = vec![Vec::new(); sector_count];
    for line in lines {
        let front = side_sector(line.front_sidedef)?;
        let back = match line.back_sidedef {
            Some(index) => Some(side_sector(index)?),
            None => None,
        };
        if back == Some(front) {
            continue;
        }
        segments[front].push((line.v0, line.v1));
        if let Some(back) = back {
            segments[back].push((line.v1, line.v0));
        }
    }
    Ok(segments)
}

/// Chains segments into loops.  Each loop starts from the first unused segment and follows
/// whichever unused segment begins where the last one ended, until it gets back to where it
/// started or runs out of options.
pub fn extract_loops(segments: &[Segment]) -> Vec<IndexLoop> {
    let mut remaining = segments.to_vec();
    let mut loops = Vec::new();
    while !remaining.is_empty() {
        let (origin, mut end) = remaining.remove(0);
        let mut vertices = vec![origin];
        let closed = loop {
            if end == origin {
                break true;
            }
            vertices.push(end);
            match remaining.iter().position(|&(start, _)| start == end) {
                Some(next) => {
                    end = remaining.remove(next).1;
                }
                None => break false,
            }
        };
        loops.push(IndexLoop{ vertices, closed });
    }
    loops
}


/// Shoelace test.  Map space has y pointing north, so a positive area is counter-clockwise.
pub fn is_polygon_clockwise(polygon: &[Point]) -> bool {
    let mut area = 0.0;
    for (i, p0) in polygon.iter().enumerate() {
        let p1 = polygon[(i + 1) % polygon.len()];
        area += p0.x * p1.y - p1.x * p0.y;
    }
    area < 0.0
}

/// Even-odd crossing test.  Points exactly on the boundary may land either way.
pub fn is_point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    if polygon.is_empty() {
        return inside;
    }
    let mut j = polygon.len() - 1;
    for i in 0 .. polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if ((point.y >= pi.y && point.y < pj.y) || (point.y >= pj.y && point.y < pi.y))
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A loop counts as inside another if any of its points is.
pub fn is_polygon_in_polygon(candidate: &[Point], outer: &[Point]) -> bool {
    candidate.iter().any(|&point| is_point_in_polygon(point, outer))
}

/// Sorts loops into polygons by nesting depth.  A loop inside an even number of others is an
/// outer boundary; one inside an odd number is a hole in the nearest loop around it.  Returns
/// loop indices, outer boundary first in each group.
pub fn group_loops(loops: &[Vec<Point>]) -> Vec<Vec<usize>> {
    let contains = |outer: usize, inner: usize| {
        outer != inner && is_polygon_in_polygon(&loops[inner], &loops[outer])
    };
    let depths: Vec<usize> = (0 .. loops.len())
        .map(|i| (0 .. loops.len()).filter(|&j| contains(j, i)).count())
        .collect();

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of = vec![None; loops.len()];
    for i in 0 .. loops.len() {
        if depths[i] % 2 == 0 {
            group_of[i] = Some(groups.len());
            groups.push(vec![i]);
        }
    }
    for i in 0 .. loops.len() {
        if depths[i] % 2 == 0 {
            continue;
        }
        let parent = (0 .. loops.len())
            .find(|&j| depths[j] + 1 == depths[i] && contains(j, i))
            .and_then(|j| group_of[j]);
        match parent {
            Some(group) => groups[group].push(i),
            None => groups.push(vec![i]),
        }
    }
    groups
}


/// Triangulates loops as one polygon: the first is the outer boundary, the rest are holes.
/// Indices refer to the loops' points laid end to end.
pub fn triangulate(loops: &[&[Point]]) -> Result<Vec<u32>> {
    let mut coords = Vec::new();
    let mut hole_starts = Vec::new();
    for (i, points) in loops.iter().enumerate() {
        if i > 0 {
            hole_starts.push(coords.len() / 2);
        }
        for point in points.iter() {
            coords.push(point.x);
            coords.push(point.y);
        }
    }
    if coords.len() < 6 {
        bail!(ErrorKind::TriangulationFailed(format!("only {} points", coords.len() / 2)));
    }

    let indices = match earcutr::earcut(&coords, &hole_starts, 2) {
        Ok(indices) => indices,
        Err(err) => bail!(ErrorKind::TriangulationFailed(format!("{:?}", err))),
    };
    if indices.is_empty() {
        bail!(ErrorKind::TriangulationFailed("no triangles produced".to_owned()));
    }
    Ok(indices.into_iter().map(|i| i as u32).collect())
}

/// Triangulates each group from `group_loops` separately, mapping the indices back to the
/// loops' points laid end to end.
fn triangulate_groups(loops: &[Vec<Point>]) -> Result<Vec<u32>> {
    let mut starts = Vec::with_capacity(loops.len());
    let mut total = 0;
    for points in loops {
        starts.push(total);
        total += points.len();
    }

    let mut indices = Vec::new();
    for group in group_loops(loops) {
        let group_loops: Vec<&[Point]> = group.iter().map(|&i| &loops[i][..]).collect();
        let mut remap = Vec::new();
        for &i in &group {
            remap.extend((0 .. loops[i].len()).map(|k| (starts[i] + k) as u32));
        }
        for index in triangulate(&group_loops)? {
            indices.push(remap[index as usize]);
        }
    }
    Ok(indices)
}


/// Resolves a boundary loop's vertex indices to points.
pub fn loop_points(vertices: &[BareVertex], indices: &[u16]) -> Result<Vec<Point>> {
    indices.iter().map(|&index| {
        match vertices.get(index as usize) {
            Some(vertex) => Ok(Point::new(vertex.x as f64, vertex.y as f64)),
            None => bail!(ErrorKind::RecordOutOfRange("VERTEXES", index as usize)),
        }
    }).collect()
}

fn flat_vertices(loops: &[Vec<Point>], z: i16, texture: &TextureRef) -> Vec<FaceVertex> {
    let (width, height) = (texture.width.max(1) as f32, texture.height.max(1) as f32);
    loops.iter().flat_map(|points| points.iter()).map(|point| {
        let (x, y) = (point.x as f32, point.y as f32);
        FaceVertex{
            position: Position::new(x, y, z as f32),
            uv: TexCoord::new(x / width, -y / height),
        }
    }).collect()
}

/// Builds a sector's floor and ceiling from its boundary loops.  Both share the same outline;
/// the ceiling's index list is the floor's reversed, so it faces down.
///
/// With `classify` off, the first loop is the outer boundary and every other loop is a hole.
/// With it on, loops are grouped by containment first.
pub fn build_flats(
    loops: &[Vec<Point>], floor_height: i16, ceiling_height: i16,
    floor_texture: &TextureRef, ceiling_texture: &TextureRef, classify: bool,
) -> Result<(Flat, Flat)> {
    let indices = if classify {
        triangulate_groups(loops)?
    }
    else {
        let all: Vec<&[Point]> = loops.iter().map(|points| &points[..]).collect();
        triangulate(&all)?
    };

    let mut ceiling_indices = indices.clone();
    ceiling_indices.reverse();
    let floor = Flat{
        vertices: flat_vertices(loops, floor_height, floor_texture),
        indices,
        texture: Some(floor_texture.handle),
    };
    let ceiling = Flat{
        vertices: flat_vertices(loops, ceiling_height, ceiling_texture),
        indices: ceiling_indices,
        texture: Some(ceiling_texture.handle),
    };
    Ok((floor, ceiling))
}

/// Signed area covered by a set of triangles, positive when they wind counter-clockwise.
pub fn triangle_area(vertices: &[FaceVertex], indices: &[u32]) -> f32 {
    indices.chunks(3).map(|tri| {
        let a = vertices[tri[0] as usize].position;
        let b = vertices[tri[1] as usize].position;
        let c = vertices[tri[2] as usize].position;
        ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) / 2.0
    }).sum()
}


#[cfg(test)]
mod tests {
    use super::*;
    use geom::Point;
    use map::TextureHandle;
    use name::Name;
    use parse::map::{BareLine, BareSide, LineFlags};
    use walls::TextureRef;

    fn side(sector: u16) -> BareSide {
        BareSide{
            x_offset: 0,
            y_offset: 0,
            upper_texture: Name::new("-"),
            lower_texture: Name::new("-"),
            middle_texture: Name::new("-"),
            sector,
        }
    }

    fn line(v0: u16, v1: u16, front: u16, back: Option<u16>) -> BareLine {
        BareLine{
            v0,
            v1,
            flags: if back.is_some() { LineFlags::TWO_SIDED } else { LineFlags::empty() },
            special: 0,
            sector_tag: 0,
            front_sidedef: front,
            back_sidedef: back,
        }
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    fn texture() -> TextureRef {
        let handle: TextureHandle = 0.into();
        TextureRef{ handle, width: 64, height: 64 }
    }

    #[test]
    fn rectangle_is_one_closed_loop() {
        // Clockwise from above, which is how a sector looks from its front sides
        let segments = [(0, 3), (3, 2), (2, 1), (1, 0)];
        let loops = extract_loops(&segments);
        assert_eq!(loops, vec![IndexLoop{ vertices: vec![0, 3, 2, 1], closed: true }]);
    }

    #[test]
    fn segments_are_chained_regardless_of_order() {
        let segments = [(2, 3), (0, 1), (3, 0), (1, 2), (5, 6), (6, 4), (4, 5)];
        let loops = extract_loops(&segments);
        assert_eq!(loops.len(), 2);
        assert_eq!(loops[0], IndexLoop{ vertices: vec![2, 3, 0, 1], closed: true });
        assert_eq!(loops[1], IndexLoop{ vertices: vec![5, 6, 4], closed: true });
    }

    #[test]
    fn dead_ends_make_open_loops() {
        let loops = extract_loops(&[(0, 1), (1, 2), (7, 8)]);
        assert_eq!(loops, vec![
            IndexLoop{ vertices: vec![0, 1, 2], closed: false },
            IndexLoop{ vertices: vec![7, 8], closed: false },
        ]);
    }

    #[test]
    fn back_sides_run_backwards() {
        let sides = vec![side(0), side(1), side(1)];
        let lines = vec![
            line(0, 1, 0, Some(1)),
            // Both sides in the same sector: no boundary
            line(1, 2, 1, Some(2)),
            line(2, 3, 2, None),
        ];
        let segments = sector_segments(&lines, &sides, 2).unwrap();
        assert_eq!(segments[0], vec![(0, 1)]);
        assert_eq!(segments[1], vec![(1, 0), (2, 3)]);
    }

    #[test]
    fn bad_side_index_is_an_error() {
        let sides = vec![side(0)];
        assert!(sector_segments(&[line(0, 1, 4, None)], &sides, 1).is_err());
        let sides = vec![side(9)];
        assert!(sector_segments(&[line(0, 1, 0, None)], &sides, 1).is_err());
    }

    #[test]
    fn winding_and_containment() {
        let outer = square(0.0, 0.0, 128.0);
        let mut reversed = outer.clone();
        reversed.reverse();
        assert!(!is_polygon_clockwise(&outer));
        assert!(is_polygon_clockwise(&reversed));

        assert!(is_point_in_polygon(Point::new(64.0, 64.0), &outer));
        assert!(!is_point_in_polygon(Point::new(200.0, 64.0), &outer));
        assert!(is_polygon_in_polygon(&square(32.0, 32.0, 16.0), &outer));
        assert!(!is_polygon_in_polygon(&square(256.0, 0.0, 16.0), &outer));
    }

    #[test]
    fn rectangle_makes_two_triangles_each_way() {
        let loops = vec![square(0.0, 0.0, 64.0)];
        let (floor, ceiling) = build_flats(&loops, 0, 128, &texture(), &texture(), false).unwrap();

        assert_eq!(floor.vertices.len(), 4);
        assert_eq!(floor.triangle_count(), 2);
        let mut reversed = floor.indices.clone();
        reversed.reverse();
        assert_eq!(ceiling.indices, reversed);
        assert_relative_eq!(triangle_area(&floor.vertices, &floor.indices).abs(), 64.0 * 64.0);
        assert_relative_eq!(ceiling.vertices[2].position.z, 128.0);
        assert_relative_eq!(floor.vertices[2].uv.x, 1.0);
        assert_relative_eq!(floor.vertices[2].uv.y, -1.0);
    }

    #[test]
    fn later_loops_are_holes() {
        let loops = vec![square(0.0, 0.0, 128.0), square(32.0, 32.0, 64.0)];
        let (floor, _) = build_flats(&loops, 0, 128, &texture(), &texture(), false).unwrap();
        assert_relative_eq!(triangle_area(&floor.vertices, &floor.indices).abs(), 128.0 * 128.0 - 64.0 * 64.0);
    }

    #[test]
    fn classification_separates_disjoint_pieces() {
        // Two separate rooms in one sector, the second with a pillar
        let loops = vec![
            square(0.0, 0.0, 64.0),
            square(256.0, 0.0, 128.0),
            square(288.0, 32.0, 32.0),
        ];
        let groups = group_loops(&loops);
        assert_eq!(groups, vec![vec![0], vec![1, 2]]);

        let (floor, _) = build_flats(&loops, 0, 128, &texture(), &texture(), true).unwrap();
        let expected = 64.0 * 64.0 + 128.0 * 128.0 - 32.0 * 32.0;
        assert_relative_eq!(triangle_area(&floor.vertices, &floor.indices).abs(), expected);
        assert!(floor.indices.iter().all(|&i| (i as usize) < floor.vertices.len()));
    }

    #[test]
    fn too_few_points_fail_to_triangulate() {
        let loops = vec![vec![Point::new(0.0, 0.0), Point::new(64.0, 0.0)]];
        match build_flats(&loops, 0, 128, &texture(), &texture(), false) {
            Err(err) => match *err.kind() {
                ErrorKind::TriangulationFailed(ref reason) => assert_eq!(reason, "only 2 points"),
                ref other => panic!("unexpected error {:?}", other),
            },
            Ok(_) => panic!("two points triangulated"),
        }
    }
}
