//! Pixelghost - hide and reveal payloads in raw image and audio samples.
//!
//! Carriers are raw sample files: interleaved 8-bit pixels for images,
//! little-endian PCM for audio. Container formats are converted elsewhere.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pixelghost::capacity::{self, CapacityReport};
use pixelghost::carrier::{AudioPcm, RasterImage, RasterShape};
use pixelghost::stego::{audio, dct, raster};
use pixelghost::{CodecConfig, PayloadKind, Scheme, Tier};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixelghost")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Keyed steganography for raw image and audio samples",
    long_about = "Hides text or images in the least significant bits or DCT coefficients of raw carrier samples, optionally keyed and encrypted."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON codec configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a text message in an image
    HideText {
        #[command(flatten)]
        cover: RasterArgs,

        #[command(flatten)]
        payload: PayloadArgs,

        /// Security tier
        #[arg(long, value_enum, default_value = "encrypted")]
        tier: TierArg,

        /// Output file for the stego samples
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Reveal a text message hidden in an image
    RevealText {
        #[command(flatten)]
        stego: RasterArgs,

        /// Security tier
        #[arg(long, value_enum, default_value = "encrypted")]
        tier: TierArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Hide a secret image in a cover image
    HideImage {
        #[command(flatten)]
        cover: RasterArgs,

        /// Raw samples of the secret image
        #[arg(long)]
        secret: PathBuf,

        /// Secret image width
        #[arg(long)]
        secret_width: u32,

        /// Secret image height
        #[arg(long)]
        secret_height: u32,

        /// Secret image channels
        #[arg(long, default_value = "3")]
        secret_channels: u8,

        /// Embedding method
        #[arg(long, value_enum, default_value = "lsb")]
        method: Method,

        /// Security tier (LSB only)
        #[arg(long, value_enum, default_value = "encrypted")]
        tier: TierArg,

        /// Output file for the stego samples
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Reveal a secret image hidden in a cover image
    RevealImage {
        #[command(flatten)]
        stego: RasterArgs,

        /// Embedding method
        #[arg(long, value_enum, default_value = "lsb")]
        method: Method,

        /// Security tier (LSB only)
        #[arg(long, value_enum, default_value = "encrypted")]
        tier: TierArg,

        /// Output file for the secret samples
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Hide a text message in PCM audio
    HideAudio {
        #[command(flatten)]
        cover: AudioArgs,

        #[command(flatten)]
        payload: PayloadArgs,

        /// Output file for the stego samples
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Reveal a text message hidden in PCM audio
    RevealAudio {
        #[command(flatten)]
        stego: AudioArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report carrier capacity as JSON
    Capacity {
        #[command(subcommand)]
        target: CapacityTarget,

        /// Label echoed back in the report
        #[arg(long, global = true)]
        key_echo: Option<String>,
    },
}

#[derive(Subcommand)]
enum CapacityTarget {
    /// LSB capacity of an image
    Raster {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Security tier
        #[arg(long, value_enum, default_value = "encrypted")]
        tier: TierArg,

        /// Report secret-image capacity instead of text
        #[arg(long)]
        image: bool,
    },

    /// DCT image-in-image capacity
    Dct {
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Text capacity of PCM audio
    Audio {
        #[command(flatten)]
        audio: AudioArgs,
    },
}

#[derive(Args)]
struct ShapeArgs {
    /// Image width in pixels
    #[arg(long)]
    width: u32,

    /// Image height in pixels
    #[arg(long)]
    height: u32,

    /// Interleaved channels (1 gray, 2 gray+alpha, 3 RGB, 4 RGBA)
    #[arg(long, default_value = "3")]
    channels: u8,
}

#[derive(Args)]
struct RasterArgs {
    /// Raw interleaved 8-bit samples
    input: PathBuf,

    #[command(flatten)]
    shape: ShapeArgs,
}

#[derive(Args)]
struct AudioArgs {
    /// Raw little-endian PCM samples
    input: PathBuf,

    /// Bytes per sample (1, 2 or 4)
    #[arg(long, default_value = "2")]
    sample_width: usize,

    /// Interleaved audio channels
    #[arg(long, default_value = "1")]
    audio_channels: u16,

    /// Sample rate in Hz
    #[arg(long, default_value = "44100")]
    sample_rate: u32,
}

#[derive(Args)]
struct PayloadArgs {
    /// Message text
    #[arg(short, long, conflicts_with = "message_file")]
    message: Option<String>,

    /// Read the message from a file (defaults to stdin)
    #[arg(long)]
    message_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Sequential,
    Keyed,
    Encrypted,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Sequential => Tier::Sequential,
            TierArg::Keyed => Tier::Keyed,
            TierArg::Encrypted => Tier::Encrypted,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    Lsb,
    Dct,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodecConfig::default(),
    };

    match cli.command {
        Commands::HideText {
            cover,
            payload,
            tier,
            output,
        } => cmd_hide_text(&cover, &payload, tier.into(), &output, &config),

        Commands::RevealText {
            stego,
            tier,
            output,
        } => cmd_reveal_text(&stego, tier.into(), output.as_deref(), &config),

        Commands::HideImage {
            cover,
            secret,
            secret_width,
            secret_height,
            secret_channels,
            method,
            tier,
            output,
        } => {
            let secret = load_raster(&secret, secret_width, secret_height, secret_channels)?;
            cmd_hide_image(&cover, &secret, method, tier.into(), &output, &config)
        }

        Commands::RevealImage {
            stego,
            method,
            tier,
            output,
        } => cmd_reveal_image(&stego, method, tier.into(), &output, &config),

        Commands::HideAudio {
            cover,
            payload,
            output,
        } => cmd_hide_audio(&cover, &payload, &output),

        Commands::RevealAudio { stego, output } => cmd_reveal_audio(&stego, output.as_deref()),

        Commands::Capacity { target, key_echo } => cmd_capacity(target, key_echo),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Ok(password),
        Err(_) => {
            eprint!("{prompt}");
            io::stderr().flush()?;
            let mut password = String::new();
            io::stdin().lock().read_line(&mut password)?;
            Ok(password.trim().to_string())
        }
    }
}

/// Build the scheme for a tier, prompting for a passphrase when needed.
fn build_scheme(tier: Tier, kind: PayloadKind, confirm: bool, config: &CodecConfig) -> Result<Scheme> {
    if !tier.is_keyed() {
        return Ok(Scheme::sequential(kind));
    }
    let passphrase = prompt_password("Passphrase: ")?;
    if confirm && passphrase != prompt_password("Confirm passphrase: ")? {
        bail!("Passphrases do not match");
    }
    Ok(Scheme::new(tier, Some(passphrase.as_str()), kind, config)?)
}

fn load_raster(path: &Path, width: u32, height: u32, channels: u8) -> Result<RasterImage> {
    let samples = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(RasterImage::new(width, height, channels, samples)?)
}

fn load_raster_args(args: &RasterArgs) -> Result<RasterImage> {
    load_raster(
        &args.input,
        args.shape.width,
        args.shape.height,
        args.shape.channels,
    )
}

fn load_audio(args: &AudioArgs) -> Result<AudioPcm> {
    let bytes =
        std::fs::read(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
    Ok(AudioPcm::from_le_bytes(
        &bytes,
        args.sample_width,
        args.audio_channels,
        args.sample_rate,
    )?)
}

fn read_message(args: &PayloadArgs) -> Result<Vec<u8>> {
    match (&args.message, &args.message_file) {
        (Some(text), _) => Ok(text.clone().into_bytes()),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        (None, None) => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn emit(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            write_output(path, bytes)?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            io::stdout().write_all(bytes)?;
        }
    }
    Ok(())
}

fn cmd_hide_text(
    cover: &RasterArgs,
    payload: &PayloadArgs,
    tier: Tier,
    output: &Path,
    config: &CodecConfig,
) -> Result<()> {
    let image = load_raster_args(cover)?;
    let message = read_message(payload)?;
    let scheme = build_scheme(tier, PayloadKind::Text, true, config)?;

    let stego = raster::hide(&image, &message, &scheme)?;
    write_output(output, stego.samples())?;
    println!(
        "Hid {} bytes ({} tier) in {}",
        message.len(),
        tier,
        output.display()
    );
    Ok(())
}

fn cmd_reveal_text(
    stego: &RasterArgs,
    tier: Tier,
    output: Option<&Path>,
    config: &CodecConfig,
) -> Result<()> {
    let image = load_raster_args(stego)?;
    let scheme = build_scheme(tier, PayloadKind::Text, false, config)?;
    let message = raster::reveal(&image, &scheme)?;
    emit(output, &message)
}

fn cmd_hide_image(
    cover: &RasterArgs,
    secret: &RasterImage,
    method: Method,
    tier: Tier,
    output: &Path,
    config: &CodecConfig,
) -> Result<()> {
    let image = load_raster_args(cover)?;

    let stego = match method {
        Method::Lsb => {
            let scheme = build_scheme(tier, PayloadKind::Image, true, config)?;
            raster::hide_image(&image, secret, &scheme)?
        }
        Method::Dct => dct::hide_image(&image, secret, config)?,
    };

    write_output(output, stego.samples())?;
    println!("Wrote stego image to {}", output.display());
    Ok(())
}

fn cmd_reveal_image(
    stego: &RasterArgs,
    method: Method,
    tier: Tier,
    output: &Path,
    config: &CodecConfig,
) -> Result<()> {
    let image = load_raster_args(stego)?;

    let secret = match method {
        Method::Lsb => {
            let scheme = build_scheme(tier, PayloadKind::Image, false, config)?;
            raster::reveal_image(&image, &scheme)?
        }
        Method::Dct => dct::reveal_image(&image)?,
    };

    write_output(output, secret.samples())?;
    println!(
        "Recovered {}x{}x{} image to {}",
        secret.width(),
        secret.height(),
        secret.channels(),
        output.display()
    );
    Ok(())
}

fn cmd_hide_audio(cover: &AudioArgs, payload: &PayloadArgs, output: &Path) -> Result<()> {
    let pcm = load_audio(cover)?;
    let message = read_message(payload)?;
    let stego = audio::hide(&pcm, &message)?;
    write_output(output, &stego.to_le_bytes())?;
    println!("Hid {} bytes in {}", message.len(), output.display());
    Ok(())
}

fn cmd_reveal_audio(stego: &AudioArgs, output: Option<&Path>) -> Result<()> {
    let pcm = load_audio(stego)?;
    let message = audio::reveal(&pcm)?;
    emit(output, &message)
}

fn cmd_capacity(target: CapacityTarget, key_echo: Option<String>) -> Result<()> {
    let to_shape = |args: &ShapeArgs| RasterShape::new(args.width, args.height, args.channels);

    let mut report: CapacityReport = match target {
        CapacityTarget::Raster { shape: s, tier, image } => {
            let shape = to_shape(&s)?;
            if image {
                capacity::raster_image(&shape, tier.into())
            } else {
                capacity::raster_message(&shape, tier.into())
            }
        }
        CapacityTarget::Dct { shape: s } => capacity::dct_image(&to_shape(&s)?),
        CapacityTarget::Audio { audio } => capacity::audio_message(&load_audio(&audio)?),
    };
    if let Some(key) = key_echo {
        report = report.with_key_echo(key);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
