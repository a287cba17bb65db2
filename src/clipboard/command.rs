use anyhow::{Context, Result, anyhow};
use percent_encoding::percent_decode_str;
use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

use super::polling::{ClipboardSnapshot, ClipboardSource};

/// Image targets in order of preference
const IMAGE_TARGETS: [&str; 4] = ["image/png", "image/bmp", "image/jpeg", "image/x-png"];
const URI_LIST_TARGET: &str = "text/uri-list";
const TEXT_TARGETS: [&str; 4] = [
    "UTF8_STRING",
    "text/plain;charset=utf-8",
    "text/plain",
    "STRING",
];

/// External clipboard utility used on Linux
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTool {
    /// wl-paste / wl-copy from wl-clipboard
    WlClipboard,
    /// xclip against the CLIPBOARD selection
    Xclip,
}

impl CommandTool {
    /// Wayland if WAYLAND_DISPLAY is set, X11 otherwise
    pub fn detect() -> Self {
        if env::var("WAYLAND_DISPLAY").is_ok() {
            log::info!("Detected Wayland display server");
            CommandTool::WlClipboard
        } else {
            CommandTool::Xclip
        }
    }

    fn paste_command(self) -> Command {
        match self {
            CommandTool::WlClipboard => {
                let mut cmd = Command::new("wl-paste");
                cmd.arg("--no-newline");
                cmd
            }
            CommandTool::Xclip => {
                let mut cmd = Command::new("xclip");
                cmd.arg("-selection").arg("clipboard").arg("-o");
                with_display(&mut cmd);
                cmd
            }
        }
    }
}

/// xclip needs an X display; fall back to :0 when none is set
fn with_display(cmd: &mut Command) {
    if env::var("DISPLAY").map(|d| d.is_empty()).unwrap_or(true) {
        cmd.env("DISPLAY", ":0");
    }
}

/// Linux clipboard source backed by wl-clipboard or xclip
pub struct CommandSource {
    tool: CommandTool,
}

impl CommandSource {
    pub fn new(tool: CommandTool) -> Self {
        CommandSource { tool }
    }

    pub fn detect() -> Self {
        Self::new(CommandTool::detect())
    }

    pub fn tool(&self) -> CommandTool {
        self.tool
    }

    /// Targets (MIME types / atoms) currently offered by the clipboard owner
    fn list_targets(&self) -> Result<Vec<String>> {
        let mut cmd = match self.tool {
            CommandTool::WlClipboard => {
                let mut cmd = Command::new("wl-paste");
                cmd.arg("--list-types");
                cmd
            }
            CommandTool::Xclip => {
                let mut cmd = self.tool.paste_command();
                cmd.arg("-t").arg("TARGETS");
                cmd
            }
        };

        let output = cmd
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .context("Failed to list clipboard targets")?;

        // Both tools exit non-zero when nothing is copied
        if !output.status.success() {
            return Ok(Vec::new());
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    fn fetch(&self, target: &str) -> Result<Vec<u8>> {
        let mut cmd = self.tool.paste_command();
        match self.tool {
            CommandTool::WlClipboard => cmd.arg("--type").arg(target),
            CommandTool::Xclip => cmd.arg("-t").arg(target),
        };

        let output = cmd
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("Failed to read clipboard target {}", target))?;

        if !output.status.success() {
            return Err(anyhow!(
                "Reading target {} failed with status: {}",
                target,
                output.status
            ));
        }
        Ok(output.stdout)
    }

    /// Empty the clipboard
    pub fn clear(&self) -> Result<()> {
        let status = match self.tool {
            CommandTool::WlClipboard => Command::new("wl-copy")
                .arg("--clear")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .context("Failed to spawn wl-copy")?,
            CommandTool::Xclip => {
                let mut cmd = Command::new("xclip");
                cmd.arg("-selection").arg("clipboard");
                with_display(&mut cmd);
                let mut child = cmd
                    .stdin(Stdio::piped())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .context("Failed to spawn xclip")?;

                // Empty input, then close stdin so xclip takes ownership
                if let Some(mut stdin) = child.stdin.take() {
                    stdin
                        .write_all(b"")
                        .context("Failed to write to xclip stdin")?;
                }
                child.wait().context("Failed to wait for xclip")?
            }
        };

        if !status.success() {
            return Err(anyhow!("Clearing clipboard failed with status: {}", status));
        }

        log::debug!("Cleared clipboard via {}", self.name());
        Ok(())
    }
}

impl ClipboardSource for CommandSource {
    fn read(&self) -> Result<Option<ClipboardSnapshot>> {
        let targets = self.list_targets()?;
        if targets.is_empty() {
            return Ok(None);
        }
        let offered = |t: &str| targets.iter().any(|o| o.eq_ignore_ascii_case(t));

        if let Some(target) = IMAGE_TARGETS.into_iter().find(|t| offered(*t)) {
            let data = self.fetch(target)?;
            if !data.is_empty() {
                return Ok(Some(ClipboardSnapshot::Image(data)));
            }
        }

        if offered(URI_LIST_TARGET) {
            let raw = self.fetch(URI_LIST_TARGET)?;
            let paths = parse_uri_list(&String::from_utf8_lossy(&raw));
            if !paths.is_empty() {
                return Ok(Some(ClipboardSnapshot::Files(paths)));
            }
        }

        if let Some(target) = TEXT_TARGETS.into_iter().find(|t| offered(*t)) {
            let data = self.fetch(target)?;
            if !data.is_empty() {
                let text = String::from_utf8_lossy(&data).into_owned();
                return Ok(Some(ClipboardSnapshot::Text(text)));
            }
        }

        Ok(None)
    }

    fn name(&self) -> &'static str {
        match self.tool {
            CommandTool::WlClipboard => "wl-clipboard",
            CommandTool::Xclip => "xclip",
        }
    }
}

/// Turn a `text/uri-list` body into newline-separated local paths
/// Comment lines are skipped and `file://` URIs are percent-decoded.
pub fn parse_uri_list(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let path = line
                .strip_prefix("file://localhost")
                .or_else(|| line.strip_prefix("file://"))
                .unwrap_or(line);
            percent_decode_str(path).decode_utf8_lossy().into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
