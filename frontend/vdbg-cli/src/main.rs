use anyhow::{Context, anyhow};
use clap::Parser;
use env_logger::Env;
use std::fs;
use std::path::{Path, PathBuf};
use vdbg_proc_macros::{EnumDisplay, EnumFromStr};
use vera_config::{BitsPerPixel, VeraDebugConfig};
use vera_core::render::{PixelBuffer, RegionGeometry, RegionLayout};
use vera_core::{Layer, Vera, VeraDebugView, VeraInterface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumDisplay, EnumFromStr)]
enum RenderTarget {
    #[default]
    Layer0,
    Layer1,
    Viewport0,
    Viewport1,
    TileSheet0,
    TileSheet1,
    Sprite,
    Palette,
    Region,
}

const REGISTER_OPTIONS_HEADING: &str = "Register Options";
const SPRITE_OPTIONS_HEADING: &str = "Sprite Options";
const REGION_OPTIONS_HEADING: &str = "Region Options";

#[derive(Parser)]
struct Args {
    /// 128 KiB VRAM dump path
    #[arg(short = 'f', long)]
    vram_path: PathBuf,

    /// Output PNG path
    #[arg(short = 'o', long)]
    out_path: PathBuf,

    /// What to render (Layer0 / Layer1 / Viewport0 / Viewport1 / TileSheet0 / TileSheet1 /
    /// Sprite / Palette / Region)
    #[arg(long, default_value_t)]
    target: RenderTarget,

    /// Preview config file path (TOML); defaults are used if not set
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Layer 0 registers as 14 hex digits, e.g. 60000000000000
    #[arg(long, help_heading = REGISTER_OPTIONS_HEADING)]
    layer0: Option<String>,

    /// Layer 1 registers as 14 hex digits
    #[arg(long, help_heading = REGISTER_OPTIONS_HEADING)]
    layer1: Option<String>,

    /// Display composer registers as 16 hex digits
    #[arg(long, help_heading = REGISTER_OPTIONS_HEADING)]
    composer: Option<String>,

    /// Sprite to render (0-127)
    #[arg(long, default_value_t, help_heading = SPRITE_OPTIONS_HEADING)]
    sprite: u8,

    /// Apply the sprite's flip flags to the rendered image
    #[arg(long, default_value_t, help_heading = SPRITE_OPTIONS_HEADING)]
    apply_sprite_flip: bool,

    /// Read the region from this file instead of VRAM (e.g. a CPU memory dump)
    #[arg(long, help_heading = REGION_OPTIONS_HEADING)]
    region_source: Option<PathBuf>,

    /// Region start address; accepts decimal or 0x-prefixed hex
    #[arg(
        long,
        default_value = "0",
        value_parser = parse_address,
        help_heading = REGION_OPTIONS_HEADING
    )]
    region_address: usize,

    /// Region length in bytes; accepts decimal or 0x-prefixed hex
    #[arg(
        long,
        default_value = "0x2000",
        value_parser = parse_address,
        help_heading = REGION_OPTIONS_HEADING
    )]
    region_size: usize,

    /// Region bits per pixel (One / Two / Four / Eight)
    #[arg(long, default_value_t = BitsPerPixel::Four, help_heading = REGION_OPTIONS_HEADING)]
    region_bpp: BitsPerPixel,

    /// Render the region as a linear bitmap of this width instead of as tiles
    #[arg(long, help_heading = REGION_OPTIONS_HEADING)]
    region_width: Option<u32>,

    /// Region tile width in pixels
    #[arg(long, default_value_t = 8, help_heading = REGION_OPTIONS_HEADING)]
    region_tile_width: u32,

    /// Region tile height in pixels
    #[arg(long, default_value_t = 8, help_heading = REGION_OPTIONS_HEADING)]
    region_tile_height: u32,

    /// Region tiles per row
    #[arg(long, default_value_t = 16, help_heading = REGION_OPTIONS_HEADING)]
    region_columns: u32,

    /// Palette offset added to every region pixel
    #[arg(long, default_value_t, help_heading = REGION_OPTIONS_HEADING)]
    region_palette_offset: u8,
}

impl Args {
    fn region_geometry(&self) -> RegionGeometry {
        let layout = match self.region_width {
            Some(width) => RegionLayout::Linear { width },
            None => RegionLayout::Tiled {
                tile_width: self.region_tile_width,
                tile_height: self.region_tile_height,
                columns: self.region_columns,
            },
        };

        RegionGeometry {
            bpp: self.region_bpp,
            layout,
            palette_offset: self.region_palette_offset,
        }
    }
}

fn parse_address(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid address '{s}': {err}"))
}

fn parse_registers<const LEN: usize>(s: &str) -> anyhow::Result<[u8; LEN]> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("register string '{s}' contains non-hex characters"));
    }
    if digits.len() != 2 * LEN {
        return Err(anyhow!("expected {} hex digits, got {} in '{s}'", 2 * LEN, digits.len()));
    }

    let mut registers = [0; LEN];
    for (i, register) in registers.iter_mut().enumerate() {
        let byte = &digits[2 * i..2 * i + 2];
        *register = u8::from_str_radix(byte, 16)
            .with_context(|| format!("invalid hex byte '{byte}' in '{s}'"))?;
    }

    Ok(registers)
}

fn load_config(path: &Path) -> VeraDebugConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|err| {
        log::error!("Unable to read config from '{}': {err}", path.display());
        String::new()
    });
    toml::from_str(&config_str).unwrap_or_else(|err| {
        log::error!("Error deserializing config: {err}");
        VeraDebugConfig::default()
    })
}

fn log_registers<V: VeraInterface + ?Sized>(debug: &VeraDebugView<'_, V>, sprite: u8) {
    for layer in Layer::ALL {
        log::info!("Layer {layer}: {:?}", debug.decode_layer(layer));
    }
    log::info!("Composer: {:?}", debug.decode_composer());
    log::info!("Sprite {sprite}: {:?}", debug.decode_sprite(sprite));
}

fn write_png(buffer: &PixelBuffer, path: &Path) -> anyhow::Result<()> {
    let bytes = buffer.as_bytes().to_vec();
    let image = image::RgbaImage::from_raw(buffer.width, buffer.height, bytes)
        .ok_or_else(|| {
            anyhow!("Pixel buffer does not match size {}x{}", buffer.width, buffer.height)
        })?;
    image
        .save(path)
        .with_context(|| format!("Unable to write PNG to '{}'", path.display()))?;

    log::info!("Wrote {}x{} image to '{}'", buffer.width, buffer.height, path.display());

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = args.config_path.as_deref().map(load_config).unwrap_or_default();
    log::info!("Running with config:\n{config}");

    let vram = fs::read(&args.vram_path)
        .with_context(|| format!("Unable to read VRAM dump from '{}'", args.vram_path.display()))?;
    let mut vera = Vera::from_vram(&vram)?;

    if let Some(registers) = &args.layer0 {
        vera.set_layer_registers(Layer::Zero, parse_registers(registers).context("--layer0")?);
    }
    if let Some(registers) = &args.layer1 {
        vera.set_layer_registers(Layer::One, parse_registers(registers).context("--layer1")?);
    }
    if let Some(registers) = &args.composer {
        vera.set_composer_registers(parse_registers(registers).context("--composer")?);
    }

    let debug = vera.debug(&config);
    log_registers(&debug, args.sprite);

    let buffer = match args.target {
        RenderTarget::Layer0 => debug.render_layer(Layer::Zero),
        RenderTarget::Layer1 => debug.render_layer(Layer::One),
        RenderTarget::Viewport0 => {
            debug.render_layer_viewport(Layer::Zero, config.viewport_width, config.viewport_height)
        }
        RenderTarget::Viewport1 => {
            debug.render_layer_viewport(Layer::One, config.viewport_width, config.viewport_height)
        }
        RenderTarget::TileSheet0 => debug.render_tile_sheet(Layer::Zero),
        RenderTarget::TileSheet1 => debug.render_tile_sheet(Layer::One),
        RenderTarget::Sprite => {
            let mut buffer = debug.render_sprite(args.sprite);
            if args.apply_sprite_flip {
                let props = debug.decode_sprite(args.sprite);
                buffer.flip(props.h_flip, props.v_flip);
            }
            buffer
        }
        RenderTarget::Palette => debug.render_palette(),
        RenderTarget::Region => {
            let geometry = args.region_geometry();
            match &args.region_source {
                Some(path) => {
                    let source = fs::read(path).with_context(|| {
                        format!("Unable to read region source from '{}'", path.display())
                    })?;
                    debug.render_region(
                        source.as_slice(),
                        args.region_address,
                        args.region_size,
                        &geometry,
                    )
                }
                None => debug.render_vram_region(args.region_address, args.region_size, &geometry),
            }
        }
    };

    write_png(&buffer, &args.out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn register_strings() {
        assert_eq!(
            parse_registers::<7>("62 00 80 10 02 20 01").unwrap(),
            [0x62, 0x00, 0x80, 0x10, 0x02, 0x20, 0x01]
        );
        assert_eq!(parse_registers::<2>("a5,5A").unwrap(), [0xA5, 0x5A]);
        assert!(parse_registers::<7>("6200").is_err());
        assert!(parse_registers::<2>("zz00").is_err());
        assert!(parse_registers::<7>("0é00000000000").is_err());
        assert!(parse_registers::<2>("é0").is_err());
        assert!(parse_registers::<2>("+1+1").is_err());
    }

    #[test]
    fn addresses() {
        assert_eq!(parse_address("0x1FA00"), Ok(0x1FA00));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn region_layout_from_args() {
        let args = Args::parse_from([
            "vdbg-cli",
            "-f",
            "vram.bin",
            "-o",
            "out.png",
            "--region-width",
            "320",
        ]);
        assert_eq!(args.region_geometry().layout, RegionLayout::Linear { width: 320 });

        let args =
            Args::parse_from(["vdbg-cli", "-f", "vram.bin", "-o", "out.png", "--target", "region"]);
        assert_eq!(args.target, RenderTarget::Region);
        assert_eq!(
            args.region_geometry().layout,
            RegionLayout::Tiled { tile_width: 8, tile_height: 8, columns: 16 }
        );
        assert_eq!(args.region_size, 0x2000);
    }
}
