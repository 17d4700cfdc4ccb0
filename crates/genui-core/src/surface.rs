//! Render surfaces for the code buffer
//!
//! A surface receives the whole document at once, srcDoc style, and never
//! shares execution context with the host UI. [`TextSurface`] draws a
//! terminal rendition; [`BrowserSurface`] hands the document to a separate
//! browser process through its own temporary file.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use crate::error::ViewError;

pub trait RenderSurface {
    /// Replace whatever is displayed with `document`, from scratch
    fn load(&mut self, document: &str) -> Result<(), ViewError>;

    fn document(&self) -> Option<&str>;

    /// Bumped on every load, including reloads of the same document
    fn revision(&self) -> u64;

    fn clear(&mut self);
}

/// Largest scroll offset that still shows `visible` rows of `lines`,
/// clamped to what a `u16` offset can address.
pub fn max_scroll(lines: usize, visible: u16) -> u16 {
    let hidden = lines.saturating_sub(usize::from(visible.max(1)));
    u16::try_from(hidden).unwrap_or(u16::MAX)
}

/// Terminal rendition: scripts and styles dropped, tags stripped, block
/// elements on their own lines.
#[derive(Debug, Default)]
pub struct TextSurface {
    document: Option<String>,
    lines: Vec<String>,
    revision: u64,
    pub scroll: u16,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn scroll_down(&mut self) {
        let max = max_scroll(self.lines.len(), 1);
        self.scroll = self.scroll.saturating_add(1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

impl RenderSurface for TextSurface {
    fn load(&mut self, document: &str) -> Result<(), ViewError> {
        self.document = Some(document.to_string());
        self.lines = render_text(document);
        self.scroll = 0;
        self.revision += 1;
        Ok(())
    }

    fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn clear(&mut self) {
        self.document = None;
        self.lines.clear();
        self.scroll = 0;
    }
}

fn hidden_elements() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<head\b.*?</head\s*>|<svg\b.*?</svg\s*>|<!--.*?-->",
        )
        .expect("hidden element pattern is valid")
    })
}

fn block_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)</?(br|p|div|h[1-6]|li|ul|ol|tr|table|section|article|header|footer|nav|main|aside|form|button|label|blockquote|pre)\b[^>]*>")
            .expect("block tag pattern is valid")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&copy;", "©")
        .replace("&amp;", "&")
}

/// Visible text of an HTML document, one block element per line
pub fn render_text(document: &str) -> Vec<String> {
    let without_hidden = hidden_elements().replace_all(document, "");
    let with_breaks = block_tags().replace_all(&without_hidden, "\n");
    let stripped = any_tag().replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

type Launcher = Box<dyn Fn(&Path) -> std::io::Result<()> + Send>;

/// Writes the document to a private temporary file and opens it in the
/// system browser.
pub struct BrowserSurface {
    dir: tempfile::TempDir,
    document: Option<String>,
    revision: u64,
    launcher: Launcher,
}

impl BrowserSurface {
    pub fn new() -> Result<Self, ViewError> {
        Self::with_launcher(Box::new(open_in_system_browser))
    }

    pub fn with_launcher(launcher: Launcher) -> Result<Self, ViewError> {
        let dir = tempfile::Builder::new()
            .prefix("genui-preview-")
            .tempdir()
            .map_err(|e| ViewError::PreviewFailure(e.to_string()))?;

        Ok(Self {
            dir,
            document: None,
            revision: 0,
            launcher,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("preview.html")
    }
}

impl RenderSurface for BrowserSurface {
    fn load(&mut self, document: &str) -> Result<(), ViewError> {
        let path = self.path();
        fs::write(&path, document).map_err(|e| ViewError::PreviewFailure(e.to_string()))?;
        (self.launcher)(&path).map_err(|e| ViewError::PreviewFailure(e.to_string()))?;

        self.document = Some(document.to_string());
        self.revision += 1;
        Ok(())
    }

    fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn clear(&mut self) {
        self.document = None;
        let _ = fs::remove_file(self.path());
    }
}

fn open_in_system_browser(path: &Path) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_render_text_strips_markup() {
        let doc = r#"<!DOCTYPE html>
<html><head><title>T</title><style>.a{color:red}</style></head>
<body>
  <nav><a href="/">Home</a> &amp; <b>More</b></nav>
  <div class="card"><h2>Pro</h2><p>$19&nbsp;/ month</p></div>
  <script>alert('x')</script>
</body></html>"#;

        assert_eq!(render_text(doc), vec!["Home & More", "Pro", "$19 / month"]);
    }

    #[test]
    fn test_text_surface_reload_bumps_revision() {
        let mut surface = TextSurface::new();
        surface.load("<p>a</p>").unwrap();
        surface.scroll = 3;
        surface.load("<p>a</p>").unwrap();

        assert_eq!(surface.revision(), 2);
        assert_eq!(surface.scroll, 0);
        assert_eq!(surface.document(), Some("<p>a</p>"));
        assert_eq!(surface.lines(), ["a".to_string()]);

        surface.clear();
        assert_eq!(surface.document(), None);
    }

    #[test]
    fn test_scroll_is_clamped_for_huge_documents() {
        assert_eq!(max_scroll(10, 4), 6);
        assert_eq!(max_scroll(3, 10), 0);
        assert_eq!(max_scroll(100_000, 1), u16::MAX);

        let mut surface = TextSurface::new();
        surface.lines = vec![String::new(); 70_000];
        surface.scroll = u16::MAX;
        surface.scroll_down();
        assert_eq!(surface.scroll, u16::MAX);
    }

    #[test]
    fn test_browser_surface_writes_private_file() {
        let opened: Arc<Mutex<Vec<PathBuf>>> = Arc::default();
        let seen = opened.clone();
        let mut surface = BrowserSurface::with_launcher(Box::new(move |path| {
            seen.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }))
        .unwrap();

        surface.load("<p>Hi</p>").unwrap();

        let path = surface.path();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>Hi</p>");
        assert_eq!(opened.lock().unwrap().as_slice(), [path]);
        assert_eq!(surface.revision(), 1);
    }

    #[test]
    fn test_browser_launch_failure_is_reported() {
        let mut surface = BrowserSurface::with_launcher(Box::new(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
        }))
        .unwrap();

        let err = surface.load("<p>Hi</p>").unwrap_err();
        assert!(matches!(err, ViewError::PreviewFailure(_)));
        assert_eq!(surface.document(), None);
    }
}
