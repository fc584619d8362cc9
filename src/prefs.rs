use std::fmt;
use std::path::{Path, PathBuf};

/// Chrome state that survives restarts. Simulation state never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampPrefs {
    pub minimized: bool,
    pub show_hud: bool,
}

impl Default for LampPrefs {
    fn default() -> Self {
        Self {
            minimized: false,
            show_hud: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    Io(String),
    Parse { line: usize, message: String },
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
        }
    }
}

impl std::error::Error for PrefsError {}

impl LampPrefs {
    /// Missing file (or no path at all) means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(PrefsError::Io(err.to_string())),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, PrefsError> {
        let mut prefs = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(PrefsError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let slot = match key.trim() {
                "minimized" => &mut prefs.minimized,
                "show_hud" => &mut prefs.show_hud,
                // Unknown keys are left for newer versions.
                _ => continue,
            };
            *slot = parse_bool(value).ok_or_else(|| PrefsError::Parse {
                line: line_no,
                message: format!("{} must be true/false", key.trim()),
            })?;
        }
        Ok(prefs)
    }

    pub fn to_text(&self) -> String {
        format!(
            "# lava_blob prefs v1\nminimized={}\nshow_hud={}\n",
            self.minimized, self.show_hud
        )
    }

    /// Atomic replace through a sibling temp file.
    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Io(e.to_string()))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, self.to_text()).map_err(|e| PrefsError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| PrefsError::Io(e.to_string()))
    }
}

/// `$XDG_CONFIG_HOME/lava_blob/prefs.txt`, else `~/.config/lava_blob/prefs.txt`.
pub fn prefs_storage_path() -> Option<PathBuf> {
    storage_path_from(|key| std::env::var(key).ok())
}

pub fn storage_path_from(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = env("XDG_CONFIG_HOME").filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(xdg).join("lava_blob").join("prefs.txt"));
    }
    let home = env("HOME").filter(|v| !v.trim().is_empty())?;
    Some(PathBuf::from(home).join(".config").join("lava_blob").join("prefs.txt"))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
