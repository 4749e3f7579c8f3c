use serde::Serialize;
use slopegraph_core::{
    ChartTheme, CityPair, Comparison, Dataset, ItemCatalog, ItemSelection, run_pipeline,
};
use slopegraph_render::{layout_slopegraph, svg::render_svg};
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Pipeline(slopegraph_core::Error),
    Render(slopegraph_render::Error),
    Json(serde_json::Error),
    Raster(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Pipeline(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Raster(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<slopegraph_core::Error> for CliError {
    fn from(value: slopegraph_core::Error) -> Self {
        Self::Pipeline(value)
    }
}

impl From<slopegraph_render::Error> for CliError {
    fn from(value: slopegraph_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Table,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    out: Option<String>,
    theme_path: Option<String>,
    title: Option<String>,
    city_a: Option<String>,
    city_b: Option<String>,
    countries: Vec<String>,
    items: Option<String>,
}

fn usage() -> &'static str {
    "slopegraph-cli\n\
\n\
USAGE:\n\
  slopegraph-cli [table] [--pretty] [OPTIONS] [<csv>|-]\n\
  slopegraph-cli layout [--pretty] [OPTIONS] [<csv>|-]\n\
  slopegraph-cli render [--format svg|png|jpg] [--scale <n>] [--background <css-color>] [--out <path>] [OPTIONS] [<csv>|-]\n\
\n\
OPTIONS:\n\
  --city-a <name>      annotated city (default: London)\n\
  --city-b <name>      baseline city (default: New York)\n\
  --country <name>     country whitelist entry; repeatable\n\
  --items <id,id,...>  item columns to compare (default: the restaurant basket)\n\
  --theme <path>       JSON theme overrides, deep-merged over the default\n\
  --title <text>       chart title override\n\
\n\
NOTES:\n\
  - If <csv> is omitted or '-', input is read from stdin.\n\
  - table prints the comparison rows as JSON; layout prints the positioned chart.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
  - JPG output defaults to writing next to the input file (or ./out.jpg for stdin).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Table,
        render_format: RenderFormat::Svg,
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "table" => args.command = Command::Table,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--theme" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.theme_path = Some(path.clone());
            }
            "--title" => {
                let Some(title) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.title = Some(title.clone());
            }
            "--city-a" => {
                let Some(city) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.city_a = Some(city.clone());
            }
            "--city-b" => {
                let Some(city) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.city_b = Some(city.clone());
            }
            "--country" => {
                let Some(country) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.countries.push(country.clone());
            }
            "--items" => {
                let Some(items) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.items = Some(items.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn load_dataset(input: Option<&str>) -> Result<Dataset, CliError> {
    match input {
        None | Some("-") => Ok(Dataset::from_reader(std::io::stdin().lock())?),
        Some(path) => Ok(Dataset::from_path(path)?),
    }
}

fn build_theme(args: &Args) -> Result<ChartTheme, CliError> {
    let mut theme = ChartTheme::default();
    if let Some(path) = args.theme_path.as_deref() {
        let text = std::fs::read_to_string(path)?;
        let overrides: serde_json::Value = serde_json::from_str(&text)?;
        theme = theme.merged(&overrides)?;
    }
    if let Some(title) = args.title.as_deref() {
        theme.title = title.to_string();
    }
    Ok(theme)
}

fn build_pair(args: &Args) -> Result<CityPair, CliError> {
    match (args.city_a.as_deref(), args.city_b.as_deref()) {
        (None, None) if args.countries.is_empty() => Ok(CityPair::london_new_york()),
        (Some(a), Some(b)) => Ok(CityPair::new(a, b).with_countries(args.countries.clone())),
        // Custom countries only make sense once both cities are named.
        _ => Err(CliError::Usage(usage())),
    }
}

fn build_selection(args: &Args, catalog: &ItemCatalog) -> Result<ItemSelection, CliError> {
    match args.items.as_deref() {
        None => Ok(ItemSelection::restaurant_basket(catalog)?),
        Some(list) => {
            let ids: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .collect();
            if ids.is_empty() {
                return Err(CliError::Usage(usage()));
            }
            Ok(ItemSelection::new(ids, catalog)?)
        }
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        use std::io::Write;
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            255,
        )),
        4 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            hex1(bytes[3])?,
        )),
        6 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        )),
        8 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        )),
        _ => None,
    }
}

fn render_svg_to_pixmap(
    svg: &str,
    scale: f32,
    background: Option<&str>,
) -> Result<tiny_skia::Pixmap, CliError> {
    let mut opt = usvg::Options::default();
    // Keep output stable-ish across environments while still using system fonts.
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|_| CliError::Raster("failed to parse SVG for raster rendering"))?;

    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px)
        .ok_or(CliError::Raster("failed to allocate pixmap for raster rendering"))?;

    if let Some(bg) = background {
        if let Some(color) = parse_tiny_skia_color(bg) {
            pixmap.fill(color);
        }
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    Ok(pixmap)
}

fn render_svg_to_png(svg: &str, scale: f32, background: Option<&str>) -> Result<Vec<u8>, CliError> {
    let pixmap = render_svg_to_pixmap(svg, scale, background)?;
    pixmap
        .encode_png()
        .map_err(|_| CliError::Raster("failed to encode PNG"))
}

fn render_svg_to_jpeg(
    svg: &str,
    scale: f32,
    background: Option<&str>,
) -> Result<Vec<u8>, CliError> {
    let bg = background.unwrap_or("white");
    let Some(color) = parse_tiny_skia_color(bg) else {
        return Err(CliError::Raster("invalid --background color for JPG rendering"));
    };
    if color.alpha() != 1.0 {
        return Err(CliError::Raster(
            "JPG rendering requires an opaque --background (e.g. white)",
        ));
    }

    let pixmap = render_svg_to_pixmap(svg, scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // tiny-skia renders into an RGBA8 buffer. The destination is opaque (we
    // always fill a solid background for JPG), so alpha can be dropped.
    let rgba = pixmap.data();
    let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
    for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst[0] = src[0];
        dst[1] = src[1];
        dst[2] = src[2];
    }

    let mut out = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 90);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| CliError::Raster("failed to encode JPG"))?;
    Ok(out)
}

fn compute(args: &Args) -> Result<(Comparison, CityPair, ChartTheme), CliError> {
    let dataset = load_dataset(args.input.as_deref())?;
    let catalog = ItemCatalog::kaggle_2022();
    let selection = build_selection(args, &catalog)?;
    let pair = build_pair(args)?;
    let theme = build_theme(args)?;
    let comparison = run_pipeline(&dataset, &pair, &selection, &theme)?;
    Ok((comparison, pair, theme))
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Table => {
            let (comparison, _, _) = compute(&args)?;
            write_json(&comparison.rows, args.pretty)?;
            Ok(())
        }
        Command::Layout => {
            let (comparison, pair, theme) = compute(&args)?;
            let layout =
                layout_slopegraph(&comparison.observations, &comparison.rows, &pair, &theme)?;
            write_json(&layout, args.pretty)?;
            Ok(())
        }
        Command::Render => {
            let (comparison, pair, theme) = compute(&args)?;
            let layout =
                layout_slopegraph(&comparison.observations, &comparison.rows, &pair, &theme)?;
            let svg = render_svg(&layout);

            match args.render_format {
                RenderFormat::Svg => {
                    write_text(&svg, args.out.as_deref())?;
                }
                RenderFormat::Png => {
                    let bytes = render_svg_to_png(
                        &svg,
                        args.render_scale,
                        args.background.as_deref(),
                    )?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "png")
                            .to_string_lossy()
                            .to_string()
                    });
                    write_bytes(&bytes, &out)?;
                }
                RenderFormat::Jpeg => {
                    let bytes = render_svg_to_jpeg(
                        &svg,
                        args.render_scale,
                        args.background.as_deref(),
                    )?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "jpg")
                            .to_string_lossy()
                            .to_string()
                    });
                    write_bytes(&bytes, &out)?;
                }
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("SLOPEGRAPH_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
