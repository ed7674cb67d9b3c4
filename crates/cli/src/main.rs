#![deny(unsafe_code)]
//! CLI binary for the glmix transition mixer.
//!
//! Subcommands:
//! - `render <from> <to>`: blend two images on the GPU, write PNG(s)
//! - `translate <shader>`: print the native GLSL a shader compiles to
//! - `info`: print plugin metadata
//! - `list`: print builtin transitions

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use glmix_core::frame::{pack, unpack};
use glmix_core::render::{GlfwSurface, Instance};
use glmix_core::translate::native_source;
use glmix_core::{builtin, Device, Dialect, FragmentShader, FrameSize, MixerConfig, PluginInfo};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glmix", about = "GPU transition mixer CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Blend two equally sized images and write PNG output.
    Render {
        /// Outgoing image.
        from: PathBuf,

        /// Incoming image.
        to: PathBuf,

        /// Builtin transition name (fade, wipe, circle).
        #[arg(short, long, default_value = builtin::DEFAULT_TRANSITION)]
        transition: String,

        /// Fragment shader file; overrides --transition.
        #[arg(short, long)]
        shader: Option<PathBuf>,

        /// Shader dialect (native, webgl); detected when omitted.
        #[arg(long)]
        dialect: Option<String>,

        /// Transition progress for a single frame.
        #[arg(short, long, default_value_t = 0.5)]
        progress: f64,

        /// Render this many frames from progress 0 to 1 instead.
        #[arg(short, long)]
        frames: Option<usize>,

        /// Output file path; numbered when rendering several frames.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Print the native GLSL a fragment shader compiles to.
    Translate {
        /// Fragment shader file.
        shader: PathBuf,

        /// Shader dialect (native, webgl); detected when omitted.
        #[arg(long)]
        dialect: Option<String>,
    },
    /// Print plugin metadata.
    Info,
    /// List builtin transitions.
    List,
}

fn parse_dialect(name: Option<&str>) -> Result<Option<Dialect>, CliError> {
    name.map(|n| {
        Dialect::from_name(n).ok_or_else(|| CliError::Input(format!("unknown dialect: {n}")))
    })
    .transpose()
}

/// Loads an image as packed (B, G, R, A) host pixels.
fn load_bgra(path: &Path) -> Result<(FrameSize, Vec<u32>), CliError> {
    let image = image::open(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let size = FrameSize::new(image.width(), image.height())?;
    let pixels = image
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            pack([b, g, r, a])
        })
        .collect();
    Ok((size, pixels))
}

/// Writes packed (R, G, B, A) pixels as a PNG.
fn save_rgba(path: &Path, size: FrameSize, pixels: &[u32]) -> Result<(), CliError> {
    let bytes: Vec<u8> = pixels.iter().flat_map(|&p| unpack(p)).collect();
    let image = image::RgbaImage::from_raw(size.width(), size.height(), bytes)
        .ok_or_else(|| CliError::Io("output buffer does not match image size".into()))?;
    image
        .save(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

/// Progress values for `frames` evenly spaced frames covering 0 to 1.
fn progress_steps(frames: usize) -> Vec<f64> {
    match frames {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// `out.png` becomes `out_0003.png` for frame 3.
fn numbered_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map_or_else(|| "frame".into(), |s| s.to_string_lossy().into_owned());
    let ext = output
        .extension()
        .map_or_else(|| "png".into(), |s| s.to_string_lossy().into_owned());
    output.with_file_name(format!("{stem}_{index:04}.{ext}"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(glmix_core::config::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(glmix_core::config::DEFAULT_LOG));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let transitions = builtin::list();
            if cli.json {
                let info = serde_json::json!({ "transitions": transitions });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Transitions:");
                for name in transitions {
                    println!("  {name}");
                }
            }
        }
        Command::Info => {
            let info = PluginInfo::mixer();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} {}.{}", info.name, info.major_version, info.minor_version);
                println!("  {}", info.explanation);
                println!("  type: {:?}, color model: {:?}", info.plugin_type, info.color_model);
                println!("  parameters: {}", info.num_params);
            }
        }
        Command::Translate { shader, dialect } => {
            let config = MixerConfig {
                shader: Some(shader),
                dialect: parse_dialect(dialect.as_deref())?,
                ..MixerConfig::default()
            };
            let fragment = config.resolve_shader()?;
            let native = native_source(&fragment).map_err(glmix_core::MixError::from)?;
            if cli.json {
                let info = serde_json::json!({
                    "dialect": fragment.dialect(),
                    "source": native,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{native}");
            }
        }
        Command::Render {
            from,
            to,
            transition,
            shader,
            dialect,
            progress,
            frames,
            output,
        } => {
            let config = MixerConfig {
                transition: Some(transition.clone()),
                shader: shader.clone(),
                dialect: parse_dialect(dialect.as_deref())?,
                ..MixerConfig::default()
            };
            let fragment: FragmentShader = config.resolve_shader()?;

            let (size, a) = load_bgra(&from)?;
            let (to_size, b) = load_bgra(&to)?;
            if size != to_size {
                return Err(CliError::Input(format!(
                    "image sizes differ: {}x{} vs {}x{}",
                    size.width(),
                    size.height(),
                    to_size.width(),
                    to_size.height()
                )));
            }

            let steps: Vec<(f64, PathBuf)> = match frames {
                Some(n) => progress_steps(n)
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| (p, numbered_path(&output, i)))
                    .collect(),
                None => vec![(progress, output.clone())],
            };

            let device = Device::new(GlfwSurface::create()?);
            let instance = Instance::new(&device, size, &fragment)?;
            let mut out = vec![0u32; size.pixel_count()];
            let mut written = Vec::with_capacity(steps.len());
            let result = steps.iter().try_for_each(|(p, path)| {
                instance.render(&device, *p, &a, &b, &mut out)?;
                save_rgba(path, size, &out)?;
                written.push(path.display().to_string());
                Ok::<(), CliError>(())
            });
            instance.destroy(&device);
            if device.shutdown().is_err() {
                tracing::warn!("render device not torn down");
            }
            result?;

            let name = shader
                .as_ref()
                .map_or(transition, |p| p.display().to_string());
            if cli.json {
                let info = serde_json::json!({
                    "transition": name,
                    "width": size.width(),
                    "height": size.height(),
                    "outputs": written,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {name} ({}x{}, {} frame(s)) -> {}",
                    size.width(),
                    size.height(),
                    written.len(),
                    written.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
