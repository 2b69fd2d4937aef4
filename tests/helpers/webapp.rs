use std::path::{Path, PathBuf};

use tempfile::TempDir;
use warden::authz::DescriptorSource;

/// Web application root on disk with automatic cleanup
pub struct TestWebApp {
    dir: TempDir,
}

impl TestWebApp {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `WEB-INF/web.xml`
    pub fn with_descriptor(self, contents: &str) -> Self {
        let web_inf = self.dir.path().join("WEB-INF");
        std::fs::create_dir_all(&web_inf).expect("Failed to create WEB-INF");
        std::fs::write(web_inf.join("web.xml"), contents).expect("Failed to write web.xml");
        self
    }

    /// Write an arbitrary file under the root and return its path
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }

    pub fn source(&self) -> DescriptorSource {
        DescriptorSource::new(self.dir.path())
    }
}
