//! Conversion strategies
//!
//! A strategy turns one source file into a PNG. The pipeline tries them in
//! priority order until one succeeds.
//!
//! ```text
//! 1. NativeSvgStrategy  (resvg, in-process, SVG only)
//! 2. rsvg-convert       (SVG only)
//! 3. magick / convert   (ImageMagick, any raster or vector format)
//! 4. sips               (macOS, raster formats)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use once_cell::sync::Lazy;
use texdok_core::exec::{probe_tool, run_with_timeout};

use crate::error::{ImageError, Result};

/// One conversion to perform
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    /// Existing source file
    pub source: &'a Path,
    /// PNG file to create; its parent directory exists
    pub target: &'a Path,
    /// Maximum width and height in pixels
    pub max_dimension: u32,
    /// Deadline for external tools
    pub timeout: Duration,
}

/// A way of converting images to PNG
pub trait ConversionStrategy: Send + Sync {
    /// Strategy name for logs and status output
    fn name(&self) -> &'static str;

    /// Whether this strategy reads files with the given lowercase extension
    fn supports(&self, extension: &str) -> bool;

    /// Whether the strategy can run in this process
    fn is_available(&self) -> bool;

    /// Write `request.target` from `request.source`
    fn convert(&self, request: &ConversionRequest<'_>) -> Result<()>;
}

/// External conversion tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// librsvg command-line renderer
    RsvgConvert,
    /// ImageMagick 7
    Magick,
    /// ImageMagick 6
    Convert,
    /// macOS scriptable image processing
    Sips,
}

const SVG_FORMATS: &[&str] = &["svg", "svgz"];

const SIPS_FORMATS: &[&str] = &["gif", "bmp", "tif", "tiff", "heic", "heif", "webp", "psd", "ico", "jp2"];

impl Tool {
    /// Every tool, in priority order
    pub const ALL: [Tool; 4] = [Tool::RsvgConvert, Tool::Magick, Tool::Convert, Tool::Sips];

    /// Executable name
    pub fn program(self) -> &'static str {
        match self {
            Tool::RsvgConvert => "rsvg-convert",
            Tool::Magick => "magick",
            Tool::Convert => "convert",
            Tool::Sips => "sips",
        }
    }

    fn probe_args(self) -> &'static [&'static str] {
        match self {
            Tool::Sips => &["--help"],
            _ => &["--version"],
        }
    }

    /// Whether the tool reads a lowercase extension
    pub fn supports(self, extension: &str) -> bool {
        match self {
            Tool::RsvgConvert => SVG_FORMATS.contains(&extension),
            // ImageMagick delegates cover practically everything
            Tool::Magick | Tool::Convert => !extension.is_empty(),
            Tool::Sips => SIPS_FORMATS.contains(&extension),
        }
    }

    /// Full command line for a conversion
    pub fn command(self, request: &ConversionRequest<'_>) -> Command {
        let size = request.max_dimension.to_string();
        let mut command = Command::new(self.program());
        match self {
            Tool::RsvgConvert => {
                command
                    .args(["-f", "png", "-a", "-w", &size, "-h", &size, "-o"])
                    .arg(request.target)
                    .arg(request.source);
            }
            Tool::Magick | Tool::Convert => {
                // [0] picks the first frame of animations and multi-page files
                let mut source = request.source.as_os_str().to_os_string();
                source.push("[0]");
                command
                    .arg(source)
                    .args(["-quality", "90", "-resize"])
                    .arg(format!("{}x{}>", size, size))
                    .arg(request.target);
            }
            Tool::Sips => {
                command
                    .args(["-s", "format", "png", "-Z", &size])
                    .arg(request.source)
                    .arg("--out")
                    .arg(request.target);
            }
        }
        command
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Probe timeout for `--version` style checks
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tool availability, probed once per process
static TOOL_PROBES: Lazy<HashMap<Tool, bool>> = Lazy::new(|| {
    Tool::ALL
        .iter()
        .map(|tool| {
            let available = probe_tool(tool.program(), tool.probe_args(), PROBE_TIMEOUT);
            log::debug!("probe {}: {}", tool, if available { "found" } else { "missing" });
            (*tool, available)
        })
        .collect()
});

/// Whether an external tool was found by the process-wide probe
pub fn tool_available(tool: Tool) -> bool {
    TOOL_PROBES.get(&tool).copied().unwrap_or(false)
}

/// Strategy backed by an external executable
#[derive(Debug, Clone, Copy)]
pub struct ToolStrategy {
    tool: Tool,
}

impl ToolStrategy {
    /// Wrap a tool
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    /// The wrapped tool
    pub fn tool(&self) -> Tool {
        self.tool
    }
}

impl ConversionStrategy for ToolStrategy {
    fn name(&self) -> &'static str {
        self.tool.program()
    }

    fn supports(&self, extension: &str) -> bool {
        self.tool.supports(extension)
    }

    fn is_available(&self) -> bool {
        tool_available(self.tool)
    }

    fn convert(&self, request: &ConversionRequest<'_>) -> Result<()> {
        let mut command = self.tool.command(request);
        let output = run_with_timeout(&mut command, request.timeout)?;
        if output.timed_out {
            return Err(ImageError::Timeout {
                tool: self.name().to_string(),
                secs: request.timeout.as_secs(),
            });
        }
        if !output.success() {
            let message = match output.stderr.trim() {
                "" => format!("exit status {:?}", output.status.and_then(|s| s.code())),
                stderr => stderr.lines().take(3).collect::<Vec<_>>().join("; "),
            };
            return Err(ImageError::ConversionFailed {
                tool: self.name().to_string(),
                message,
            });
        }
        match std::fs::metadata(request.target) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(ImageError::ConversionFailed {
                tool: self.name().to_string(),
                message: "no output written".to_string(),
            }),
        }
    }
}
