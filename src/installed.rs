//! Installed version lookup from a component's header comment
//!
//! Component main files carry a metadata header such as:
//!
//! ```text
//! /**
//!  * Plugin Name: Example
//!  * Version: 1.4.2
//!  */
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::release::error::ConfigError;

/// Only the start of the file is scanned for the header
const HEADER_SCAN_BYTES: u64 = 8 * 1024;

static VERSION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t/*#@]*Version:\s*(\S+)").expect("version header pattern is valid")
});

/// Extract the `Version:` header value from file contents
pub fn parse_version_header(contents: &str) -> Option<String> {
    VERSION_HEADER_RE
        .captures(contents)
        .map(|caps| caps[1].trim().to_string())
}

/// Read the `Version:` header from the start of `path`
pub fn read_version_header(path: &Path) -> Result<Option<String>, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut head = Vec::new();
    file.take(HEADER_SCAN_BYTES)
        .read_to_end(&mut head)
        .map_err(io_err)?;

    let version = parse_version_header(&String::from_utf8_lossy(&head));
    debug!("Version header in {:?}: {:?}", path, version);
    Ok(version)
}
