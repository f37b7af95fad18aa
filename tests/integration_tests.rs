//! Integration tests for end-to-end hide/reveal across carriers and tiers.

use pixelghost::capacity;
use pixelghost::carrier::{AudioPcm, PcmSamples, RasterImage, RasterShape};
use pixelghost::encoding::to_bits;
use pixelghost::stego::{audio, dct, raster};
use pixelghost::{CodecConfig, Error, PayloadKind, Scheme, Tier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TIERS: [Tier; 3] = [Tier::Sequential, Tier::Keyed, Tier::Encrypted];

fn test_config() -> CodecConfig {
    CodecConfig::with_iterations(1_000)
}

/// Helper to create a cover of random samples.
fn random_cover(seed: u64, width: u32, height: u32, channels: u8) -> RasterImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = (0..width as usize * height as usize * channels as usize)
        .map(|_| rng.gen())
        .collect();
    RasterImage::new(width, height, channels, samples).expect("Failed to build cover")
}

/// Helper to create a smooth cover that never saturates.
fn smooth_cover(seed: u64, width: u32, height: u32, channels: u8) -> RasterImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut image = RasterImage::filled(width, height, channels, 0).expect("Failed to build cover");
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels as usize {
                let base = 40 + (x + y + c as u32 * 30) % 160;
                image.set(x, y, c, (base + rng.gen_range(0..16)) as u8);
            }
        }
    }
    image
}

fn scheme(tier: Tier, kind: PayloadKind) -> Scheme {
    Scheme::new(tier, Some("integration-key"), kind, &test_config()).expect("Failed to build scheme")
}

#[test]
fn test_text_roundtrip_every_tier() {
    let cover = random_cover(1, 64, 64, 3);
    let message = b"The quick brown fox jumps over the lazy dog";

    for tier in TIERS {
        let scheme = scheme(tier, PayloadKind::Text);
        let stego = raster::hide(&cover, message, &scheme).expect("Failed to hide");
        let revealed = raster::reveal(&stego, &scheme).expect("Failed to reveal");
        assert_eq!(revealed, message, "tier {tier}");
    }
}

#[test]
fn test_sequential_hello_scenario() {
    let cover = random_cover(2, 100, 100, 3);
    let scheme = Scheme::sequential(PayloadKind::Text);

    let stego = raster::hide(&cover, b"hello!!", &scheme).unwrap();

    // "hello!!###" is 10 bytes: exactly the first 80 color samples may change.
    assert_eq!(&stego.samples()[80..], &cover.samples()[80..]);
    for (a, b) in stego.samples()[..80].iter().zip(&cover.samples()[..80]) {
        assert_eq!(a & !1, b & !1);
    }
    assert_eq!(raster::reveal(&stego, &scheme).unwrap(), b"hello!!");

    // Damage outside the 80 payload samples leaves the decode unchanged.
    let mut samples = stego.samples().to_vec();
    for index in [80, 81, 500, 29_999] {
        samples[index] ^= 1;
    }
    let damaged = RasterImage::new(100, 100, 3, samples).unwrap();
    assert_eq!(raster::reveal(&damaged, &scheme).unwrap(), b"hello!!");
}

#[test]
fn test_keyed_embedding_is_deterministic() {
    let cover = random_cover(3, 50, 50, 3);
    let scheme = scheme(Tier::Keyed, PayloadKind::Text);

    let first = raster::hide(&cover, b"same input", &scheme).unwrap();
    let second = raster::hide(&cover, b"same input", &scheme).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_encrypted_embedding_uses_fresh_nonce() {
    let cover = random_cover(4, 50, 50, 3);
    let scheme = scheme(Tier::Encrypted, PayloadKind::Text);

    let first = raster::hide(&cover, b"same input", &scheme).unwrap();
    let second = raster::hide(&cover, b"same input", &scheme).unwrap();
    assert_ne!(first, second);
    assert_eq!(raster::reveal(&first, &scheme).unwrap(), b"same input");
    assert_eq!(raster::reveal(&second, &scheme).unwrap(), b"same input");
}

#[test]
fn test_capacity_boundary_matches_report() {
    let cover = random_cover(5, 100, 100, 3);
    let shape = cover.shape();

    let expected = [(Tier::Sequential, 3747u64), (Tier::Keyed, 3742), (Tier::Encrypted, 3718)];
    for (tier, max_bytes) in expected {
        let report = capacity::raster_message(&shape, tier);
        assert_eq!(report.max_payload_units, max_bytes, "tier {tier}");

        let scheme = scheme(tier, PayloadKind::Text);
        let fits = vec![b'a'; max_bytes as usize];
        let stego = raster::hide(&cover, &fits, &scheme).expect("Exact capacity should fit");
        assert_eq!(raster::reveal(&stego, &scheme).unwrap(), fits);

        let overflow = vec![b'a'; max_bytes as usize + 1];
        let result = raster::hide(&cover, &overflow, &scheme);
        assert!(
            matches!(result, Err(Error::Capacity { .. })),
            "tier {tier} accepted an oversized payload"
        );
    }
}

#[test]
fn test_rgba_and_gray_covers() {
    for channels in [1u8, 2, 4] {
        let cover = random_cover(6, 40, 40, channels);
        for tier in TIERS {
            let scheme = scheme(tier, PayloadKind::Text);
            let stego = raster::hide(&cover, b"alpha-aware", &scheme).unwrap();
            assert_eq!(raster::reveal(&stego, &scheme).unwrap(), b"alpha-aware");
        }
    }
}

#[test]
fn test_image_in_image_lsb_every_tier() {
    let cover = random_cover(7, 80, 80, 3);
    let secret = random_cover(8, 12, 9, 3);

    for tier in TIERS {
        let scheme = scheme(tier, PayloadKind::Image);
        let stego = raster::hide_image(&cover, &secret, &scheme).expect("Failed to hide image");
        let revealed = raster::reveal_image(&stego, &scheme).expect("Failed to reveal image");
        assert_eq!(revealed, secret, "tier {tier}");
    }
}

#[test]
fn test_image_capacity_report_is_achievable() {
    let cover = random_cover(9, 60, 60, 3);
    let report = capacity::raster_image(&cover.shape(), Tier::Keyed);
    let side: u32 = report
        .max_square_dimensions
        .as_deref()
        .and_then(|s| s.split('x').next())
        .and_then(|s| s.parse().ok())
        .expect("Report should carry square dimensions");

    let scheme = scheme(Tier::Keyed, PayloadKind::Image);
    let secret = random_cover(10, side, side, 3);
    let stego = raster::hide_image(&cover, &secret, &scheme).unwrap();
    assert_eq!(raster::reveal_image(&stego, &scheme).unwrap(), secret);

    let too_big = random_cover(11, side + 1, side + 1, 3);
    assert!(matches!(
        raster::hide_image(&cover, &too_big, &scheme),
        Err(Error::Capacity { .. })
    ));
}

#[test]
fn test_audio_roundtrip_through_bytes() {
    let mut rng = StdRng::seed_from_u64(12);
    for width in [1usize, 2, 4] {
        let bytes: Vec<u8> = (0..4000 * width).map(|_| rng.gen()).collect();
        let pcm = AudioPcm::from_le_bytes(&bytes, width, 2, 22_050).unwrap();

        let stego = audio::hide(&pcm, b"audio payload").unwrap();
        let reloaded =
            AudioPcm::from_le_bytes(&stego.to_le_bytes(), width, 2, 22_050).unwrap();
        assert_eq!(audio::reveal(&reloaded).unwrap(), b"audio payload");
    }
}

#[test]
fn test_audio_capacity_boundary() {
    let pcm = AudioPcm::new(1, 8_000, PcmSamples::I16(vec![0; 800])).unwrap();
    let max = capacity::audio_message(&pcm).max_payload_units as usize;
    assert_eq!(max, (800 - 160) / 8);

    assert!(audio::hide(&pcm, &vec![b'x'; max]).is_ok());
    assert!(matches!(
        audio::hide(&pcm, &vec![b'x'; max + 1]),
        Err(Error::Capacity { .. })
    ));
}

#[test]
fn test_concurrent_calls_share_scheme() {
    let scheme = scheme(Tier::Encrypted, PayloadKind::Text);

    std::thread::scope(|s| {
        for i in 0..8u64 {
            let scheme = &scheme;
            s.spawn(move || {
                let cover = random_cover(100 + i, 48, 48, 3);
                let message = format!("message from thread {i}");
                let stego = raster::hide(&cover, message.as_bytes(), scheme).unwrap();
                assert_eq!(raster::reveal(&stego, scheme).unwrap(), message.as_bytes());
            });
        }
    });
}

#[test]
fn test_dct_roundtrip_prepared_secret() {
    let cover = smooth_cover(13, 512, 512, 3);
    let secret = random_cover(14, 40, 30, 3);

    let prepared = dct::prepare_secret(&cover, &secret).unwrap();
    assert_eq!((prepared.width(), prepared.height()), (16, 16));

    let stego = dct::hide_image(&cover, &prepared, &CodecConfig::default()).unwrap();
    let revealed = dct::reveal_image(&stego).unwrap();
    assert_eq!(revealed, prepared);
}

#[test]
fn test_dct_keeps_fitting_secret_size() {
    let cover = smooth_cover(19, 512, 512, 3);
    let secret = random_cover(20, 8, 8, 3);

    let stego = dct::hide_image(&cover, &secret, &CodecConfig::default()).unwrap();
    let revealed = dct::reveal_image(&stego).unwrap();
    assert_eq!((revealed.width(), revealed.height()), (8, 8));
    assert_eq!(revealed, secret);
}

#[test]
fn test_dct_gray_cover_color_secret() {
    let cover = smooth_cover(15, 256, 256, 1);
    let secret = random_cover(16, 8, 8, 3);

    let stego = dct::hide_image(&cover, &secret, &CodecConfig::default()).unwrap();
    let revealed = dct::reveal_image(&stego).unwrap();
    assert_eq!(revealed.channels(), 1);
    assert_eq!(revealed, dct::prepare_secret(&cover, &secret).unwrap());
}

#[test]
fn test_dct_block_signs_carry_secret_bits() {
    let cover = smooth_cover(17, 512, 512, 3);
    let secret = dct::prepare_secret(&cover, &random_cover(18, 16, 16, 3)).unwrap();
    let stego = dct::hide_image(&cover, &secret, &CodecConfig::default()).unwrap();

    for channel in 0..3 {
        let plane: Vec<u8> = secret.samples().iter().skip(channel).step_by(3).copied().collect();
        for (offset, bit) in to_bits(&plane).into_iter().enumerate() {
            assert_eq!(dct::read_block_bit(&stego, channel, 1 + offset), bit);
        }
    }

    // 2048 data blocks end in block row 32; everything below is untouched.
    for y in 33 * 8..512 {
        for x in 0..512 {
            for c in 0..3 {
                assert_eq!(stego.get(x, y, c), cover.get(x, y, c));
            }
        }
    }
}

#[test]
fn test_dct_capacity_report() {
    let shape = RasterShape::new(512, 512, 3).unwrap();
    let report = capacity::dct_image(&shape);
    assert_eq!(report.usable_bits, 4095 * 3);
    assert_eq!(report.max_square_dimensions.as_deref(), Some("16x16"));

    let small = RasterImage::filled(64, 64, 3, 100).unwrap();
    let secret = RasterImage::filled(8, 8, 3, 1).unwrap();
    assert!(matches!(
        dct::hide_image(&small, &secret, &CodecConfig::default()),
        Err(Error::Capacity { .. })
    ));
}
