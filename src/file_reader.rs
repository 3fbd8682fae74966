//! Line reader with automatic gzip decompression
//!
//! Used to stream address lists (one per line) into batch lookups, and to
//! detect compressed database files.
//!
//! # Example
//!
//! ```rust,no_run
//! use ip17mon::file_reader;
//! use std::io::BufRead;
//!
//! // Automatically detects .gz and decompresses
//! let reader = file_reader::open("addresses.txt.gz")?;
//!
//! for line in reader.lines() {
//!     println!("{}", line?);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, stdin, BufRead, BufReader};
use std::path::Path;

/// Buffer size for file reading (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// Whether a path names a gzip file, by its `.gz` extension (any case)
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Open a file with automatic gzip detection based on file extension
///
/// Files ending in `.gz` (case-insensitive) are decompressed on the fly.
/// The path "-" reads from stdin.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();

    if path.to_str() == Some("-") {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, stdin())));
    }

    let file = File::open(path)?;
    Ok(from_file(file, is_gzip_path(path)))
}

/// Create a reader from an already-opened file with explicit gzip flag
pub fn from_file(file: File, is_gzip: bool) -> Box<dyn BufRead + Send> {
    if is_gzip {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, GzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_lines(reader: Box<dyn BufRead + Send>) -> Vec<String> {
        reader.lines().collect::<io::Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_plain_text_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.2.3.4").unwrap();
        writeln!(file, "10.0.0.1").unwrap();
        file.flush().unwrap();

        let lines = read_lines(open(file.path()).unwrap());
        assert_eq!(lines, vec!["1.2.3.4", "10.0.0.1"]);
    }

    #[test]
    fn test_gzip_file() {
        let mut file = NamedTempFile::with_suffix(".gz").unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        writeln!(encoder, "8.8.8.8").unwrap();
        writeln!(encoder, "1.1.1.1").unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let lines = read_lines(open(file.path()).unwrap());
        assert_eq!(lines, vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_from_file_explicit_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        writeln!(encoder, "forced gzip").unwrap();
        let mut file = NamedTempFile::with_suffix(".bin").unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let reader = from_file(File::open(file.path()).unwrap(), true);
        assert_eq!(read_lines(reader), vec!["forced gzip"]);
    }

    #[test]
    fn test_is_gzip_path() {
        assert!(is_gzip_path(Path::new("db.dat.gz")));
        assert!(is_gzip_path(Path::new("DB.DAT.GZ")));
        assert!(!is_gzip_path(Path::new("db.dat")));
        assert!(!is_gzip_path(Path::new("gz")));
    }
}
