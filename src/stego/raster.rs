//! LSB embedding in raster image color samples.
//!
//! Carrier units are the color samples of the image in row-major,
//! channel-interleaved order; alpha samples are skipped. Every function
//! returns a new image and leaves its input untouched.

use crate::carrier::{deserialize_image, serialize_image, RasterImage};
use crate::error::{Error, Result};
use crate::stego::scheme::{PayloadKind, Scheme};
use tracing::info;

fn expect_kind(scheme: &Scheme, kind: PayloadKind) -> Result<()> {
    if scheme.kind() != kind {
        return Err(Error::InvalidConfig(format!(
            "scheme built for {:?} payloads, not {kind:?}",
            scheme.kind()
        )));
    }
    Ok(())
}

/// Hide a message in the cover's color samples.
pub fn hide(cover: &RasterImage, message: &[u8], scheme: &Scheme) -> Result<RasterImage> {
    expect_kind(scheme, PayloadKind::Text)?;
    let mut units = cover.color_samples();
    scheme.embed(&mut units, message)?;
    let stego = cover.with_color_samples(&units)?;
    info!(tier = %scheme.tier(), bytes = message.len(), "message hidden in raster image");
    Ok(stego)
}

/// Recover a message hidden with [`hide`].
///
/// Wrong key, corrupted carrier and absent payload all yield
/// [`Error::NoPayload`].
pub fn reveal(stego: &RasterImage, scheme: &Scheme) -> Result<Vec<u8>> {
    expect_kind(scheme, PayloadKind::Text)?;
    let message = scheme
        .extract(&stego.color_samples())
        .map_err(Error::conceal)?;
    info!(tier = %scheme.tier(), bytes = message.len(), "message revealed from raster image");
    Ok(message)
}

/// Hide a secret image, serialized with its shape header, in the cover.
pub fn hide_image(cover: &RasterImage, secret: &RasterImage, scheme: &Scheme) -> Result<RasterImage> {
    expect_kind(scheme, PayloadKind::Image)?;
    let payload = serialize_image(secret);
    let mut units = cover.color_samples();
    scheme.embed(&mut units, &payload)?;
    let stego = cover.with_color_samples(&units)?;
    info!(
        tier = %scheme.tier(),
        width = secret.width(),
        height = secret.height(),
        "secret image hidden in raster image"
    );
    Ok(stego)
}

/// Recover a secret image hidden with [`hide_image`].
pub fn reveal_image(stego: &RasterImage, scheme: &Scheme) -> Result<RasterImage> {
    expect_kind(scheme, PayloadKind::Image)?;
    let secret = scheme
        .extract(&stego.color_samples())
        .and_then(|payload| deserialize_image(&payload))
        .map_err(Error::conceal)?;
    info!(
        tier = %scheme.tier(),
        width = secret.width(),
        height = secret.height(),
        "secret image revealed from raster image"
    );
    Ok(secret)
}
