// Game paths: string-backed so network locators survive untouched.

use std::fmt;
use std::path::PathBuf;

/// File name of the executable inside a packaged-container directory.
pub const EBOOT_NAME: &str = "EBOOT.PBP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Native,
    Http,
}

/// A path to a game artifact: a local file or directory, or a network locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GamePath {
    path: String,
}

impl GamePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn kind(&self) -> PathKind {
        if self.path.starts_with("http://") || self.path.starts_with("https://") {
            PathKind::Http
        } else {
            PathKind::Native
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == PathKind::Http
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Last path component, ignoring a trailing separator.
    pub fn file_name(&self) -> &str {
        let trimmed = self.path.trim_end_matches(['/', '\\']);
        match trimmed.rfind(['/', '\\']) {
            Some(pos) => &trimmed[pos + 1..],
            None => trimmed,
        }
    }

    /// Lower-cased extension including the dot, or an empty string.
    pub fn extension(&self) -> String {
        let name = self.file_name();
        match name.rfind('.') {
            Some(pos) if pos > 0 => name[pos..].to_ascii_lowercase(),
            _ => String::new(),
        }
    }

    pub fn join(&self, child: &str) -> GamePath {
        let base = self.path.trim_end_matches(['/', '\\']);
        GamePath::new(format!("{}/{}", base, child))
    }

    /// Parent path. A path without a separator is returned unchanged.
    pub fn navigate_up(&self) -> GamePath {
        let trimmed = self.path.trim_end_matches(['/', '\\']);
        match trimmed.rfind(['/', '\\']) {
            Some(0) => GamePath::new("/"),
            Some(pos) => GamePath::new(&trimmed[..pos]),
            None => self.clone(),
        }
    }

    /// Parent directory as a string.
    pub fn directory(&self) -> String {
        self.navigate_up().path
    }

    /// Case-sensitive substring test with `\` treated as `/`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.path.replace('\\', "/").contains(fragment)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

impl fmt::Display for GamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for GamePath {
    fn from(path: &str) -> Self {
        GamePath::new(path)
    }
}

impl From<String> for GamePath {
    fn from(path: String) -> Self {
        GamePath::new(path)
    }
}

/// Map an `EBOOT.PBP` path back to the directory holding it.
pub fn resolve_pbp_directory(path: &GamePath) -> GamePath {
    if path.file_name() == EBOOT_NAME {
        path.navigate_up()
    } else {
        path.clone()
    }
}

/// Map a game directory to the `EBOOT.PBP` inside it.
pub fn resolve_pbp_file(path: &GamePath) -> GamePath {
    if path.file_name() != EBOOT_NAME {
        path.join(EBOOT_NAME)
    } else {
        path.clone()
    }
}
