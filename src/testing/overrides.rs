use crate::run::{
    ConfigSource,
    env::{BIND_ADDRESS, DATA_DIR, DATA_WAL_DIR, HTTP_BIND_ADDRESS, META_DIR, REPORTING_DISABLED},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Configuration lookup for a test server: explicit overrides, then test defaults rooted at the
/// harness directory, then the empty string.
#[derive(Debug, Clone)]
pub struct Overrides {
    env: HashMap<String, String>,
    dir: PathBuf,
}

impl Overrides {
    pub fn new(env: HashMap<String, String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            env,
            dir: dir.into(),
        }
    }

    /// Resolve `key`. Unknown keys resolve to `""`.
    ///
    /// Panics if a directory default is needed and the harness directory is not valid UTF-8.
    pub fn getenv(&self, key: &str) -> String {
        if let Some(value) = self.env.get(key) {
            return value.clone();
        }

        match key {
            DATA_DIR => subdir(&self.dir, "data"),
            META_DIR => subdir(&self.dir, "meta"),
            DATA_WAL_DIR => subdir(&self.dir, "wal"),
            HTTP_BIND_ADDRESS | BIND_ADDRESS => "localhost:0".to_owned(),
            REPORTING_DISABLED => "true".to_owned(),
            _ => String::new(),
        }
    }
}

fn subdir(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    match path.to_str() {
        Some(path) => path.to_owned(),
        None => panic!("test directory {} is not valid UTF-8", path.display()),
    }
}

impl ConfigSource for Overrides {
    fn getenv(&self, key: &str) -> String {
        Overrides::getenv(self, key)
    }
}
