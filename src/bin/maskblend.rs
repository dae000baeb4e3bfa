use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "maskblend", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rasterize a circle mask as a grayscale PNG.
    Mask(MaskArgs),
    /// Blend one RGBA PNG over another with a parameter record.
    Composite(CompositeArgs),
    /// Upgrade a binary legacy parameter record and print it as JSON.
    Upgrade(UpgradeArgs),
}

#[derive(Parser, Debug)]
struct MaskArgs {
    /// Image width in pixels.
    #[arg(long)]
    width: u32,

    /// Image height in pixels.
    #[arg(long)]
    height: u32,

    /// Circle center x, normalized to the image width.
    #[arg(long, default_value_t = 0.5)]
    cx: f32,

    /// Circle center y, normalized to the image height.
    #[arg(long, default_value_t = 0.5)]
    cy: f32,

    /// Radius, normalized to the shorter image side.
    #[arg(long)]
    radius: f32,

    /// Feather band width, normalized like the radius.
    #[arg(long, default_value_t = 0.0)]
    border: f32,

    /// Mesh cell size in pixels (1 evaluates every pixel).
    #[arg(long, default_value_t = 4)]
    mesh: u32,

    /// Worker thread count (defaults to the global rayon pool).
    #[arg(long)]
    threads: Option<usize>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CompositeArgs {
    /// Base image (module input).
    #[arg(long)]
    base: PathBuf,

    /// Blended image (module output), same size as the base.
    #[arg(long)]
    blended: PathBuf,

    /// Blend parameters JSON.
    #[arg(long)]
    params: PathBuf,

    /// Optional drawn shape JSON used when the parameters enable a drawn mask.
    #[arg(long)]
    shape: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct UpgradeArgs {
    /// Version of the stored record.
    #[arg(long)]
    version: u32,

    /// Binary record path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Mask(args) => cmd_mask(args),
        Command::Composite(args) => cmd_composite(args),
        Command::Upgrade(args) => cmd_upgrade(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn cmd_mask(args: MaskArgs) -> anyhow::Result<()> {
    let image = maskblend::ImageDims::new(args.width, args.height)?;
    let circle = maskblend::Circle::new((args.cx, args.cy), args.radius, args.border)?;
    let shape = maskblend::Shape::Circle(circle);
    let settings = maskblend::RasterSettings {
        mesh_stride: args.mesh,
        threads: args.threads,
        ..maskblend::RasterSettings::default()
    };
    let ctx = maskblend::MaskContext::new(image, &maskblend::Identity).with_settings(settings);
    let mask = maskblend::rasterize(&shape, &ctx, &maskblend::Roi::full(image))?;

    let bytes: Vec<u8> = mask.as_slice().iter().map(|v| to_u8(*v)).collect();
    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &bytes,
        mask.width(),
        mask.height(),
        image::ColorType::L8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn load_rgba(path: &Path) -> anyhow::Result<image::Rgba32FImage> {
    let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(img.to_rgba32f())
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<()> {
    let base = load_rgba(&args.base)?;
    let blended = load_rgba(&args.blended)?;
    if base.dimensions() != blended.dimensions() {
        anyhow::bail!(
            "image sizes differ: base {:?}, blended {:?}",
            base.dimensions(),
            blended.dimensions()
        );
    }
    let params: maskblend::BlendParams = read_json(&args.params, "blend parameters")?;
    let shape: Option<maskblend::Shape> = args
        .shape
        .as_deref()
        .map(|p| read_json(p, "shape"))
        .transpose()?;

    let (width, height) = base.dimensions();
    let image = maskblend::ImageDims::new(width, height)?;
    let roi = maskblend::Roi::full(image);
    let mut request = maskblend::BlendRequest::new(
        maskblend::ColorSpace::Rgb,
        roi,
        base.as_raw(),
        blended.as_raw(),
    );
    if let Some(shape) = shape.as_ref() {
        request = request.with_shape(shape);
    }
    let ctx = maskblend::MaskContext::new(image, &maskblend::Identity);
    let out = maskblend::blend_process(&params, &request, &ctx)?;

    let bytes: Vec<u8> = out.iter().map(|v| to_u8(*v)).collect();
    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &bytes,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_upgrade(args: UpgradeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read record '{}'", args.in_path.display()))?;
    let params = maskblend::upgrade(args.version, &bytes)?;
    let json = serde_json::to_string_pretty(&params).context("serialize blend parameters")?;

    match args.out {
        Some(out) => {
            ensure_parent(&out)?;
            std::fs::write(&out, json)
                .with_context(|| format!("write json '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
