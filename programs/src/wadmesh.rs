use std::io::Write;

extern crate svg;
use svg::Document;
use svg::node::Node;
use svg::node::element::{Circle, Group, Path, Style};
use svg::node::element::path::Data;
extern crate termcolor;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate simplelog;
use simplelog::TermLogger;

extern crate wadmesh;
use wadmesh::errors::{Error, Result};
use wadmesh::map::Map;
use wadmesh::raw_buffer::RawBuffer;
use wadmesh::universe::{lookup_thing_type, ThingCategory};
use wadmesh::view::MapView;
use wadmesh::{BareWAD, ColorResolver, ExtractionOptions};

fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            drop(write_err(err));
            ::std::process::exit(1);
        }
    }
}

fn write_err(err: Error) -> Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(&mut stderr, "error: ")?;
    stderr.set_color(&ColorSpec::new())?;
    writeln!(&mut stderr, "{}", err)?;
    for cause in err.iter().skip(1) {
        writeln!(&mut stderr, "  caused by: {}", cause)?;
    }
    if let Some(backtrace) = err.backtrace() {
        writeln!(&mut stderr, "{:?}", backtrace)?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = clap_app!(wadmesh =>
        (about: "Rebuild textured level geometry from Doom wads")
        (@arg verbose: -v --verbose +multiple "Log more; repeat for even more")
        (@arg file: +required "Input WAD file, or - for stdin")
        (@arg no_things: --("no-things") "Don't place things or load sprites")
        (@arg palette: --palette +takes_value "PLAYPAL palette to use (default 0)")
        (@arg colormap: --colormap +takes_value "COLORMAP to apply (default 0)")
        (@arg skip_palette: --("skip-palette") "Leave pixels as grey palette indices")
        (@arg skip_colormap: --("skip-colormap") "Don't apply a colormap")
        (@arg classify_loops: --("classify-loops") "Work out sector holes from how loops nest")
        (@subcommand info =>
            (about: "Print the header and the maps in a WAD")
        )
        (@subcommand map =>
            (about: "Convert a map and summarize the result")
            (@arg name: +required "Map marker, e.g. E1M1 or MAP01")
        )
        (@subcommand chart =>
            (about: "Render an SVG of a map's sector outlines and triangulated floors")
            (@arg name: +required "Map marker, e.g. E1M1 or MAP01")
            (@arg outfile: +required "Output file")
        )
    ).get_matches();

    let level = match args.occurrences_of("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    TermLogger::init(level, simplelog::Config::default(), simplelog::TerminalMode::Mixed, simplelog::ColorChoice::Auto)
        .map_err(|err| err.to_string())?;

    let options = extraction_options(&args)?;

    // clap guarantees required arguments
    let filename = args.value_of("file").unwrap_or("-");
    let input = match filename {
        "-" => RawBuffer::from_stdin()?,
        f => RawBuffer::from_file(f)?,
    };

    match args.subcommand() {
        ("info", Some(_)) => do_info(input.bytes())?,
        ("map", Some(subargs)) => do_map(input.bytes(), subargs, &options)?,
        ("chart", Some(subargs)) => do_chart(input.bytes(), subargs, &options)?,
        _ => {
            println!("{}", args.usage());
        }
    }

    Ok(())
}

fn extraction_options(args: &clap::ArgMatches) -> Result<ExtractionOptions> {
    let mut options = ExtractionOptions::default();
    options.export_things = !args.is_present("no_things");
    options.skip_palette = args.is_present("skip_palette");
    options.skip_colormap = args.is_present("skip_colormap");
    options.classify_loops = args.is_present("classify_loops");
    if let Some(value) = args.value_of("palette") {
        options.palette_index = value.parse().map_err(|_| format!("bad palette index {:?}", value))?;
    }
    if let Some(value) = args.value_of("colormap") {
        options.colormap_index = value.parse().map_err(|_| format!("bad colormap index {:?}", value))?;
    }
    Ok(options)
}

fn do_info(buf: &[u8]) -> Result<()> {
    let wad = wadmesh::parse_wad(buf)?;
    println!("{:?}, {} lumps, directory at {}", wad.header.identification, wad.header.numlumps, wad.header.infotableofs);

    let mut found = 0;
    for block in wad.iter_maps() {
        found += 1;
        let view = MapView::new(&wad, &block);
        println!(
            "  {}: {} things, {} lines, {} sides, {} vertices, {} sectors",
            block.name, view.things.len(), view.lines.len(), view.sides.len(),
            view.vertices.len(), view.sectors.len());
    }
    if found == 0 {
        println!("  no maps");
    }
    Ok(())
}

fn do_map(buf: &[u8], subargs: &clap::ArgMatches, options: &ExtractionOptions) -> Result<()> {
    let name = subargs.value_of("name").unwrap_or("");
    let map = wadmesh::convert_map(buf, name, options)?;
    let wad = wadmesh::parse_wad(buf)?;
    let resolver = ColorResolver::from_wad(&wad, options)?;
    print_summary(&wad, &map, &resolver);
    Ok(())
}

fn print_summary(wad: &BareWAD, map: &Map, resolver: &ColorResolver) {
    let nonempty = map.sectors.iter().filter(|sector| !sector.is_empty()).count();
    println!("{} (from a {} lump wad)", map.name, wad.directory.len());
    println!("  sectors: {} ({} with geometry)", map.sectors.len(), nonempty);
    println!("  faces: {}", map.face_count());
    println!("  triangles: {}", map.triangle_count());

    let rgba_bytes: usize = map.rgba_textures(resolver).iter().map(|image| image.len()).sum();
    println!("  textures: {} ({} KiB as RGBA)", map.textures.len(), rgba_bytes / 1024);
    for texture in map.textures.iter() {
        debug!("    {} {}x{}", texture.name, texture.width, texture.height);
    }

    let billboards = map.things.iter().filter(|thing| thing.billboard.is_some()).count();
    println!("  things: {} ({} with sprites)", map.things.len(), billboards);

    if !map.diagnostics.is_empty() {
        println!("  diagnostics: {}", map.diagnostics.len());
        for diagnostic in &map.diagnostics {
            println!("    {}", diagnostic);
        }
    }
}

fn do_chart(buf: &[u8], subargs: &clap::ArgMatches, options: &ExtractionOptions) -> Result<()> {
    let name = subargs.value_of("name").unwrap_or("");
    let outfile = subargs.value_of("outfile").unwrap_or("map.svg");
    let map = wadmesh::convert_map(buf, name, options)?;
    let doc = map_as_svg(&map);
    svg::save(outfile, &doc)?;
    info!("wrote {}", outfile);
    Ok(())
}

fn map_as_svg(map: &Map) -> Document {
    let mut group = Group::new();
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    let mut grow = |x: f64, y: f64| {
        bounds = Some(match bounds {
            Some((minx, miny, maxx, maxy)) => (minx.min(x), miny.min(y), maxx.max(x), maxy.max(y)),
            None => (x, y, x, y),
        });
    };

    for (s, sector) in map.sectors.iter().enumerate() {
        // Triangulated floor first, so the outlines draw on top
        let mut data = Data::new();
        for triangle in sector.floor.indices.chunks(3) {
            let corners: Vec<_> = triangle.iter()
                .map(|&i| sector.floor.vertices[i as usize].position)
                .collect();
            data = data.move_to((corners[0].x, corners[0].y));
            for corner in &corners[1..] {
                data = data.line_to((corner.x, corner.y));
            }
            data = data.close();
        }
        if !sector.floor.is_empty() {
            group.append(
                Path::new()
                .set("d", data)
                .set("class", "triangles")
                .set("data-sector", s)
            );
        }

        for boundary in sector.loops.iter() {
            let (first, others) = match boundary.points.split_first() {
                Some(split) => split,
                None => continue,
            };
            grow(first.x, first.y);
            let mut data = Data::new().move_to((first.x as f32, first.y as f32));
            for point in others {
                grow(point.x, point.y);
                data = data.line_to((point.x as f32, point.y as f32));
            }
            if boundary.closed {
                data = data.close();
            }

            let mut path = Path::new().set("d", data);
            path.assign("class", if boundary.closed { "loop" } else { "loop open" });
            path.assign("data-sector", s);
            if sector.tag != 0 {
                path.assign("data-sector-tag", sector.tag);
            }
            group.append(path);
        }
    }

    for thing in map.things.iter() {
        let (class, radius) = match lookup_thing_type(thing.doomednum) {
            Some(thing_type) => {
                let category = thing_type.category();
                let class =
                    if thing_type.is_spriteless() { "thing marker" }
                    else if category.contains(ThingCategory::MONSTER) { "thing monster" }
                    else if category.contains(ThingCategory::PICKUP) { "thing pickup" }
                    else { "thing" };
                (class, thing_type.radius)
            }
            None => ("thing", 8),
        };
        group.append(
            Circle::new()
            .set("cx", thing.position.x)
            .set("cy", thing.position.y)
            .set("r", radius)
            .set("class", class)
        );
    }

    let (minx, miny, maxx, maxy) = bounds.unwrap_or((0.0, 0.0, 0.0, 0.0));
    const MARGIN: f64 = 16.0;

    // Doom's y-axis points up, but SVG's points down, so flip the whole map
    group.assign("transform", "scale(1 -1)");
    Document::new()
        .set("viewBox", (minx - MARGIN, -maxy - MARGIN, maxx - minx + MARGIN * 2., maxy - miny + MARGIN * 2.))
        .add(Style::new(include_str!("map-svg.css")))
        .add(group)
}
