//! Image-in-image embedding in the 8×8 DCT domain.
//!
//! Each color channel of the cover is split into 8×8 blocks scanned in
//! raster order. Block 0 is reserved: its first four channel-0 samples hold
//! the secret height and width as big-endian `u16` values, written raw.
//! Every other full block carries one bit of the same channel of the secret
//! in the sign of coefficient (4, 3). Samples outside full blocks and alpha
//! samples are never modified.

use crate::carrier::{RasterImage, RasterShape};
use crate::config::dct_params::{BLOCK_SIZE, COEFF_COL, COEFF_ROW, MAX_ATTEMPTS, METADATA_BLOCKS};
use crate::config::CodecConfig;
use crate::encoding::{from_bits, to_bits};
use crate::error::{Error, Result};
use crate::stego::transform::{self, Block};
use tracing::{debug, info};

/// Bits one 8×8 block of secret samples occupies per channel.
const BITS_PER_SECRET_BLOCK: u64 = (BLOCK_SIZE * BLOCK_SIZE * 8) as u64;

/// Largest secret side that still fits the `u16` dimension header.
const MAX_SECRET_SIDE: u32 = (u16::MAX as u32 / BLOCK_SIZE as u32) * BLOCK_SIZE as u32;

/// Full blocks per row and per column.
fn block_grid(shape: &RasterShape) -> (usize, usize) {
    (
        shape.width as usize / BLOCK_SIZE,
        shape.height as usize / BLOCK_SIZE,
    )
}

/// Data-carrying blocks per color channel.
pub fn usable_blocks(shape: &RasterShape) -> usize {
    let (cols, rows) = block_grid(shape);
    (cols * rows).saturating_sub(METADATA_BLOCKS)
}

/// Largest `(width, height)`, multiples of 8 with the secret's aspect ratio,
/// whose samples fit the cover's usable blocks.
pub fn fit_secret_dimensions(
    cover: &RasterShape,
    secret_width: u32,
    secret_height: u32,
) -> Result<(u32, u32)> {
    if secret_width == 0 || secret_height == 0 {
        return Err(Error::UnsupportedFormat("empty secret image".to_string()));
    }

    let usable = usable_blocks(cover) as u64;
    let max_pixels = usable / 8;
    let aspect = secret_width as f64 / secret_height as f64;

    let round8 = |v: f64| -> u32 {
        let v = v.max(0.0).min(MAX_SECRET_SIDE as f64) as u32;
        v - v % BLOCK_SIZE as u32
    };
    let mut height = round8((max_pixels as f64 / aspect).sqrt());
    let mut width = round8(height as f64 * aspect);

    // Guard against float overshoot.
    while height > 0 && width > 0 && height as u64 * width as u64 * 8 > usable {
        height -= BLOCK_SIZE as u32;
        width = round8(height as f64 * aspect);
    }

    if height == 0 || width == 0 {
        return Err(Error::Capacity {
            needed: BITS_PER_SECRET_BLOCK,
            available: usable,
        });
    }
    Ok((width, height))
}

/// Normalize a secret to the cover's color layout and resize it to the
/// largest fitting dimensions.
pub fn prepare_secret(cover: &RasterImage, secret: &RasterImage) -> Result<RasterImage> {
    let normalized = match cover.shape().color_channels() {
        1 => secret.to_grayscale(),
        _ => secret.to_rgb(),
    };
    let (width, height) =
        fit_secret_dimensions(&cover.shape(), normalized.width(), normalized.height())?;
    normalized.resize(width, height)
}

/// Whether a secret can be embedded as-is: the cover's color layout,
/// multiple-of-8 sides, and small enough for the usable blocks.
fn is_prepared(cover: &RasterImage, secret: &RasterImage) -> bool {
    let layout = match cover.shape().color_channels() {
        1 => 1,
        _ => 3,
    };
    let side = BLOCK_SIZE as u32;
    secret.channels() == layout
        && secret.width() % side == 0
        && secret.height() % side == 0
        && secret.width() <= MAX_SECRET_SIDE
        && secret.height() <= MAX_SECRET_SIDE
        && secret.shape().pixel_count() * 8 <= usable_blocks(&cover.shape())
}

fn block_origin(shape: &RasterShape, block: usize) -> (u32, u32) {
    let (cols, _) = block_grid(shape);
    (
        ((block % cols) * BLOCK_SIZE) as u32,
        ((block / cols) * BLOCK_SIZE) as u32,
    )
}

fn load_block(image: &RasterImage, channel: usize, block: usize) -> Block {
    let (x0, y0) = block_origin(&image.shape(), block);
    let mut out = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
    for (dy, row) in out.iter_mut().enumerate() {
        for (dx, value) in row.iter_mut().enumerate() {
            *value = image.get(x0 + dx as u32, y0 + dy as u32, channel) as f64;
        }
    }
    out
}

fn store_block(image: &mut RasterImage, channel: usize, block: usize, samples: &Block) {
    let (x0, y0) = block_origin(&image.shape(), block);
    for (dy, row) in samples.iter().enumerate() {
        for (dx, &value) in row.iter().enumerate() {
            image.set(x0 + dx as u32, y0 + dy as u32, channel, value as u8);
        }
    }
}

fn quantize(block: &Block) -> Block {
    let mut out = *block;
    for value in out.iter_mut().flatten() {
        *value = value.round().clamp(0.0, 255.0);
    }
    out
}

fn carries(coeff: f64, bit: bool, margin: f64) -> bool {
    if bit {
        coeff >= margin.max(f64::MIN_POSITIVE)
    } else {
        coeff <= -margin
    }
}

/// Read the bit held by one block of one color channel.
pub fn read_block_bit(image: &RasterImage, channel: usize, block: usize) -> bool {
    transform::forward(&load_block(image, channel, block))[COEFF_ROW][COEFF_COL] > 0.0
}

/// Force the coefficient sign for `bit`, doubling the strength until the
/// bit survives rounding and clipping.
fn embed_bit(
    image: &mut RasterImage,
    channel: usize,
    block: usize,
    bit: bool,
    config: &CodecConfig,
) -> Result<()> {
    let spatial = load_block(image, channel, block);
    let mut coeffs = transform::forward(&spatial);
    if carries(coeffs[COEFF_ROW][COEFF_COL], bit, config.dct_margin) {
        return Ok(());
    }

    let mut strength = config.dct_strength;
    for _ in 0..MAX_ATTEMPTS {
        coeffs[COEFF_ROW][COEFF_COL] = if bit { strength } else { -strength };
        let candidate = quantize(&transform::inverse(&coeffs));
        let achieved = transform::forward(&candidate)[COEFF_ROW][COEFF_COL];
        if carries(achieved, bit, config.dct_margin) {
            store_block(image, channel, block, &candidate);
            return Ok(());
        }
        strength *= 2.0;
    }

    Err(Error::Embedding(format!(
        "block {block} of channel {channel} cannot hold bit {}",
        u8::from(bit)
    )))
}

fn write_dimensions(image: &mut RasterImage, width: u32, height: u32) -> Result<()> {
    let height = u16::try_from(height)
        .map_err(|_| Error::UnsupportedFormat(format!("secret height {height} exceeds header")))?;
    let width = u16::try_from(width)
        .map_err(|_| Error::UnsupportedFormat(format!("secret width {width} exceeds header")))?;
    let [h0, h1] = height.to_be_bytes();
    let [w0, w1] = width.to_be_bytes();
    for (x, byte) in [h0, h1, w0, w1].into_iter().enumerate() {
        image.set(x as u32, 0, 0, byte);
    }
    Ok(())
}

fn read_dimensions(image: &RasterImage) -> (u32, u32) {
    let byte = |x: u32| image.get(x, 0, 0);
    let height = u16::from_be_bytes([byte(0), byte(1)]);
    let width = u16::from_be_bytes([byte(2), byte(3)]);
    (width as u32, height as u32)
}

/// Hide a secret image inside a cover image.
///
/// A secret already in the cover's color layout, with multiple-of-8 sides
/// that fit the usable blocks, is embedded unchanged. Any other secret is
/// normalized and resized with [`prepare_secret`]. Returns a new image;
/// `cover` is not modified.
pub fn hide_image(
    cover: &RasterImage,
    secret: &RasterImage,
    config: &CodecConfig,
) -> Result<RasterImage> {
    config.validate()?;
    let secret = if is_prepared(cover, secret) {
        secret.clone()
    } else {
        prepare_secret(cover, secret)?
    };
    let shape = cover.shape();
    let usable = usable_blocks(&shape);
    let needed = secret.shape().pixel_count() * 8;
    if needed > usable {
        return Err(Error::Capacity {
            needed: needed as u64,
            available: usable as u64,
        });
    }

    debug!(
        cover_width = shape.width,
        cover_height = shape.height,
        secret_width = secret.width(),
        secret_height = secret.height(),
        usable_blocks = usable,
        "embedding secret image in DCT domain"
    );

    let mut stego = cover.clone();
    write_dimensions(&mut stego, secret.width(), secret.height())?;

    let channels = shape.color_channels();
    let secret_channels = secret.channels() as usize;
    for channel in 0..channels {
        let plane: Vec<u8> = secret
            .samples()
            .iter()
            .skip(channel)
            .step_by(secret_channels)
            .copied()
            .collect();
        for (offset, bit) in to_bits(&plane).into_iter().enumerate() {
            embed_bit(&mut stego, channel, METADATA_BLOCKS + offset, bit, config)?;
        }
    }

    info!(
        width = secret.width(),
        height = secret.height(),
        channels,
        "secret image hidden in DCT domain"
    );
    Ok(stego)
}

/// Recover a secret image hidden with [`hide_image`].
///
/// A missing or implausible dimension header yields [`Error::NoPayload`].
pub fn reveal_image(stego: &RasterImage) -> Result<RasterImage> {
    let shape = stego.shape();
    let usable = usable_blocks(&shape);
    if usable == 0 {
        return Err(Error::NoPayload);
    }

    let (width, height) = read_dimensions(stego);
    let side = BLOCK_SIZE as u32;
    let pixels = width as usize * height as usize;
    if width == 0 || height == 0 || width % side != 0 || height % side != 0 || pixels * 8 > usable
    {
        debug!(width, height, usable_blocks = usable, "implausible DCT dimension header");
        return Err(Error::NoPayload);
    }

    let channels = shape.color_channels();
    let mut samples = vec![0u8; pixels * channels];
    for channel in 0..channels {
        let bits: Vec<bool> = (0..pixels * 8)
            .map(|offset| read_block_bit(stego, channel, METADATA_BLOCKS + offset))
            .collect();
        for (i, value) in from_bits(&bits).into_iter().enumerate() {
            samples[i * channels + channel] = value;
        }
    }

    info!(width, height, channels, "secret image revealed from DCT domain");
    RasterImage::new(width, height, channels as u8, samples)
}
