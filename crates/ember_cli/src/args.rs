//! Command-line argument parsing.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

pub const USAGE: &str = "\
Usage: ember <config.json> <scene.json> [options]

Options:
  --frames N            Number of frames to render (default: 5 seconds' worth)
  --output PATH         Final image path (default: render.png)
  --snapshot-every K    Also save a numbered snapshot every K frames
  --resize WxH@FRAME    Resize the image before frame FRAME
  -h, --help            Print this message";

/// A buffer resize scheduled before a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
    pub frame: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: PathBuf,
    pub scene: PathBuf,
    pub frames: Option<u64>,
    pub output: PathBuf,
    pub snapshot_every: Option<u64>,
    pub resize: Option<ResizeEvent>,
}

impl Args {
    /// Parse arguments (without the program name).
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn parse<I>(args: I) -> Result<Option<Args>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut frames = None;
        let mut output = PathBuf::from("render.png");
        let mut snapshot_every = None;
        let mut resize = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{} needs a value", flag))
            };

            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--frames" => frames = Some(parse_count(&value("--frames")?, "--frames")?),
                "--output" => output = PathBuf::from(value("--output")?),
                "--snapshot-every" => {
                    let every = parse_count(&value("--snapshot-every")?, "--snapshot-every")?;
                    if every == 0 {
                        bail!("--snapshot-every must be at least 1");
                    }
                    snapshot_every = Some(every);
                }
                "--resize" => resize = Some(parse_resize(&value("--resize")?)?),
                flag if flag.starts_with("--") => bail!("Unknown option {}", flag),
                other => positional.push(PathBuf::from(other)),
            }
        }

        let [config, scene]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|p: Vec<PathBuf>| anyhow!("Expected 2 file arguments, got {}", p.len()))?;

        Ok(Some(Args {
            config,
            scene,
            frames,
            output,
            snapshot_every,
            resize,
        }))
    }
}

fn parse_count(text: &str, flag: &str) -> Result<u64> {
    text.parse()
        .with_context(|| format!("{} expects a whole number, got '{}'", flag, text))
}

/// Parse `WxH@FRAME`, e.g. `320x240@10`.
fn parse_resize(text: &str) -> Result<ResizeEvent> {
    let malformed = || anyhow!("--resize expects WxH@FRAME, got '{}'", text);

    let (size, frame) = text.split_once('@').ok_or_else(malformed)?;
    let (width, height) = size.split_once(['x', 'X']).ok_or_else(malformed)?;

    let event = ResizeEvent {
        width: width.parse().map_err(|_| malformed())?,
        height: height.parse().map_err(|_| malformed())?,
        frame: frame.parse().map_err(|_| malformed())?,
    };
    if event.width == 0 || event.height == 0 {
        bail!("--resize size {}x{} has no pixels", event.width, event.height);
    }
    Ok(event)
}

/// `out.png` + frame 12 -> `out_0012.png`, next to the final image.
pub fn snapshot_path(output: &Path, frame: u64) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    output.with_file_name(format!("{}_{:04}.{}", stem, frame, ext))
}
