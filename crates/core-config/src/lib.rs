//! Configuration loading and parsing.
//!
//! Parses `quill.toml` (or an override path supplied by the host). Every
//! section and field is optional and falls back to its default; unknown fields
//! are ignored so newer files keep loading on older builds.
//!
//! ```toml
//! [editor]
//! indent_width = 4
//!
//! [history]
//! coalesce_timeout_ms = 500
//! branching = false
//! max_depth = 0
//!
//! [scroll.margin]
//! vertical = 0
//! ```
//!
//! Raw values are kept as parsed. Values that depend on runtime context (the
//! vertical margin depends on viewport height) are clamped by
//! `Config::apply_viewport_height` and can be re-clamped after a resize.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "quill.toml";
pub const MIN_INDENT_WIDTH: usize = 1;
pub const MAX_INDENT_WIDTH: usize = 16;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_indent_width")]
    pub indent_width: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_width: Self::default_indent_width(),
        }
    }
}

impl EditorConfig {
    const fn default_indent_width() -> usize {
        4
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_coalesce_timeout_ms")]
    pub coalesce_timeout_ms: u64,
    /// Keep every branch (undo tree) instead of discarding redo on a new edit.
    #[serde(default)]
    pub branching: bool,
    /// 0 = unbounded. Linear history only.
    #[serde(default)]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            coalesce_timeout_ms: Self::default_coalesce_timeout_ms(),
            branching: false,
            max_depth: 0,
        }
    }
}

impl HistoryConfig {
    const fn default_coalesce_timeout_ms() -> u64 {
        500
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct MarginConfig {
    #[serde(default)]
    pub vertical: usize,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ScrollConfig {
    #[serde(default)]
    pub margin: MarginConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,              // original file string (optional)
    pub file: ConfigFile,                 // parsed (or default) data
    pub effective_vertical_margin: usize, // clamped to viewport semantics
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load configuration. A missing file yields defaults; so does a file that
/// fails to parse (with a warning naming the path).
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let cfg = Config {
                raw: Some(content),
                file,
                effective_vertical_margin: 0, // computed later
            };
            info!(
                target: "config",
                path = %path.display(),
                indent_width = cfg.file.editor.indent_width,
                branching = cfg.file.history.branching,
                "config_loaded"
            );
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Indent width clamped to `MIN_INDENT_WIDTH..=MAX_INDENT_WIDTH`.
    pub fn effective_indent_width(&self) -> usize {
        let raw = self.file.editor.indent_width;
        let clamped = raw.clamp(MIN_INDENT_WIDTH, MAX_INDENT_WIDTH);
        if clamped != raw {
            info!(target: "config", raw, clamped, "indent_width_clamped");
        }
        clamped
    }

    pub fn coalesce_timeout(&self) -> Duration {
        Duration::from_millis(self.file.history.coalesce_timeout_ms)
    }

    /// Clamp the vertical margin against a viewport of `viewport_height` rows:
    /// at most `(h - 2) / 2`, and 0 for viewports of 3 rows or fewer. Returns
    /// the effective value.
    pub fn apply_viewport_height(&mut self, viewport_height: usize) -> usize {
        let raw = self.file.scroll.margin.vertical;
        let (clamped, max) = if viewport_height <= 3 {
            (0, 0)
        } else {
            let max = (viewport_height - 2) / 2;
            (raw.min(max), max)
        };
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max,
                viewport_height,
                "scroll_margin_vertical_clamped"
            );
        }
        self.effective_vertical_margin = clamped;
        clamped
    }

    /// Recompute the effective vertical margin after a viewport change. Returns
    /// `Some(new_margin)` when the effective value changed, else `None`.
    pub fn recompute_after_resize(&mut self, new_viewport_height: usize) -> Option<usize> {
        let prev = self.effective_vertical_margin;
        let current = self.apply_viewport_height(new_viewport_height);
        if current != prev { Some(current) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture<F: FnOnce()>(level: Level, f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    fn load_str(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert_eq!(cfg.file.editor.indent_width, 4);
        assert_eq!(cfg.coalesce_timeout(), Duration::from_millis(500));
        assert!(!cfg.file.history.branching);
        assert_eq!(cfg.file.history.max_depth, 0);
        assert_eq!(cfg.file.scroll.margin.vertical, 0);
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let cfg = load_str(
            "[editor]\nindent_width = 2\n\
             [history]\ncoalesce_timeout_ms = 250\nbranching = true\nmax_depth = 100\n\
             [scroll.margin]\nvertical = 3\n",
        );
        assert_eq!(cfg.effective_indent_width(), 2);
        assert_eq!(cfg.coalesce_timeout(), Duration::from_millis(250));
        assert!(cfg.file.history.branching);
        assert_eq!(cfg.file.history.max_depth, 100);
        assert_eq!(cfg.file.scroll.margin.vertical, 3);
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let cfg = load_str("[history]\nbranching = true\nunknown_key = 1\n");
        assert!(cfg.file.history.branching);
        assert_eq!(cfg.file.history.coalesce_timeout_ms, 500);
        assert_eq!(cfg.file.editor.indent_width, 4);
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editor\nindent_width = ").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = None;
        let log = capture(Level::WARN, || {
            cfg = Some(load_from(Some(path)).unwrap());
        });
        assert_eq!(cfg.map(|c| c.file), Some(ConfigFile::default()));
        assert!(log.contains("WARN config:"));
        assert!(log.contains("config_parse_failed"));
    }

    #[test]
    fn indent_width_is_clamped() {
        let zero = load_str("[editor]\nindent_width = 0\n");
        assert_eq!(zero.effective_indent_width(), 1);
        let huge = load_str("[editor]\nindent_width = 64\n");
        let log = capture(Level::INFO, || {
            assert_eq!(huge.effective_indent_width(), 16);
        });
        assert!(log.contains("indent_width_clamped"));
    }

    #[test]
    fn clamps_when_value_exceeds_half_minus_one() {
        let mut cfg = load_str("[scroll.margin]\nvertical = 50\n");
        // viewport height 20 -> max = (20 - 2)/2 = 9
        let eff = cfg.apply_viewport_height(20);
        assert_eq!(eff, 9);
        assert_eq!(cfg.effective_vertical_margin, 9);
        assert_eq!(cfg.apply_viewport_height(3), 0);
    }

    #[test]
    fn recompute_changes_when_height_shrinks() {
        let mut cfg = load_str("[scroll.margin]\nvertical = 10\n");
        cfg.apply_viewport_height(50);
        assert_eq!(cfg.effective_vertical_margin, 10);
        // max = (10 - 2)/2 = 4
        assert_eq!(cfg.recompute_after_resize(10), Some(4));
        // max = (11 - 2)/2 = 4, unchanged
        assert_eq!(cfg.recompute_after_resize(11), None);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let mut cfg = load_str("[scroll.margin]\nvertical = 8\n");
        let log = capture(Level::INFO, || {
            cfg.apply_viewport_height(6);
        });
        assert!(log.contains("INFO config:"));
        assert!(log.contains("scroll_margin_vertical_clamped"));
        assert_eq!(cfg.effective_vertical_margin, 2);
    }
}
