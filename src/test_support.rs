//! Filesystem and logging helpers shared by unit tests.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once, PoisonError};

/// A scratch directory under the system temp dir, removed on drop.
pub(crate) struct TempDir {
    path: PathBuf,
}

impl TempDir {
    /// Fresh empty directory; `name` keeps concurrently running tests apart.
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "glow-triangle-demo-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a text file and return its path.
    pub fn write(&self, file: &str, contents: &str) -> PathBuf {
        self.write_bytes(file, contents.as_bytes())
    }

    /// Write a binary file and return its path.
    pub fn write_bytes(&self, file: &str, contents: &[u8]) -> PathBuf {
        let path = self.path.join(file);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Encode `image` as PNG bytes.
pub(crate) fn encode_png(image: image::DynamicImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// Keeps every record logged by any test, so diagnostics can be asserted on.
struct CaptureLogger {
    records: Mutex<Vec<(log::Level, String)>>,
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

/// Install the capturing logger; later calls are no-ops.
pub(crate) fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger installed in tests");
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Captured records whose message contains `needle`. Tests run in parallel,
/// so `needle` should be unique to the calling test (a temp path works).
pub(crate) fn logged_messages(needle: &str) -> Vec<(log::Level, String)> {
    LOGGER
        .records
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .filter(|(_, message)| message.contains(needle))
        .cloned()
        .collect()
}
