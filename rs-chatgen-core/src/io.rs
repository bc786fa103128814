use std::io::Write;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use tempfile::NamedTempFile;

/// Name of the application folder inside the platform data directory.
pub const APP_DIR_NAME: &str = "rs-chatgen";

/// Reads a whole text file into a `String`.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Fully replaces `filename` with `contents`.
///
/// - Creates missing parent directories
/// - Writes to a temporary file next to the target, then renames it over
///   the target, so readers never observe a half-written file
pub(crate) fn write_file<P: AsRef<Path>>(filename: P, contents: &[u8]) -> io::Result<()> {
	let path = filename.as_ref();
	let parent = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	fs::create_dir_all(parent)?;

	let mut file = NamedTempFile::new_in(parent)?;
	file.write_all(contents)?;
	file.as_file().sync_all()?;
	file.persist(path).map_err(|e| e.error)?;

	Ok(())
}

/// Default application data directory.
///
/// `<local data dir>/rs-chatgen`, or `./rs-chatgen` when the platform
/// has no such directory.
pub fn default_data_dir() -> PathBuf {
	dirs::data_local_dir()
		.unwrap_or_else(|| PathBuf::from("."))
		.join(APP_DIR_NAME)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}
