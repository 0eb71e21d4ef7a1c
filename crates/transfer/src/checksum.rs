//! SHA-512 content digests.
//!
//! The archive identifies content by the lowercase hex SHA-512 of the
//! package. It is either read from a sidecar (`<file>.sha512`, one line
//! `<hexdigest> *<original-path>`) or computed by streaming the file through
//! a [`DigestWriter`] whose output is discarded.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use ona_protocol::constants::{CHECKSUM_TYPE, SIDECAR_SEPARATOR};
use sha2::{Digest, Sha512};

/// Write-through digest: every byte written is hashed and forwarded.
pub struct DigestWriter<W: Write> {
    inner: W,
    hasher: Sha512,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha512::new(),
        }
    }

    /// Flushes the inner writer and returns the hex digest with it.
    pub fn finish(mut self) -> io::Result<(String, W)> {
        self.inner.flush()?;
        Ok((hex::encode(self.hasher.finalize()), self.inner))
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streams `reader` through a digest into a sink and returns the hex digest.
pub fn digest_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut writer = DigestWriter::new(io::sink());
    io::copy(reader, &mut writer)?;
    let (digest, _) = writer.finish()?;
    Ok(digest)
}

/// Computes the SHA-512 of an entire file.
pub fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    digest_reader(&mut file)
}

/// Path of the sidecar digest file belonging to `path`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(CHECKSUM_TYPE);
    PathBuf::from(name)
}

/// Extracts the digest from sidecar contents.
///
/// Returns `None` if the first token is empty.
pub fn parse_sidecar(contents: &str) -> Option<String> {
    let token = contents.split(SIDECAR_SEPARATOR).next()?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // sha512("0123456789")
    const DIGITS_SHA512: &str = "bb96c2fc40d2d54617d6f276febe571f623a8dadf0b734855299b0e107fda32cf6b69f2da32b36445d73690b93cbd0f7bfc20e0f7f28553d2a4428f23b716e90";

    #[test]
    fn digest_of_known_input() {
        let mut input: &[u8] = b"0123456789";
        assert_eq!(digest_reader(&mut input).unwrap(), DIGITS_SHA512);
    }

    #[test]
    fn digest_file_matches_reader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pkg.zip");
        std::fs::write(&path, b"0123456789").unwrap();
        assert_eq!(digest_file(&path).unwrap(), DIGITS_SHA512);
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let mut input: &[u8] = b"anything";
        let d = digest_reader(&mut input).unwrap();
        assert_eq!(d.len(), 128);
        assert!(d.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn writer_forwards_bytes() {
        let mut w = DigestWriter::new(Vec::new());
        w.write_all(b"abc").unwrap();
        let (_, inner) = w.finish().unwrap();
        assert_eq!(inner, b"abc");
    }

    #[test]
    fn sidecar_keeps_first_token() {
        assert_eq!(
            parse_sidecar("deadbeefcafe *myfile.zip").as_deref(),
            Some("deadbeefcafe")
        );
        assert_eq!(
            parse_sidecar("deadbeefcafe *dir/my file.zip\n").as_deref(),
            Some("deadbeefcafe")
        );
    }

    #[test]
    fn sidecar_without_separator() {
        assert_eq!(parse_sidecar("abc123\n").as_deref(), Some("abc123"));
    }

    #[test]
    fn empty_sidecar_rejected() {
        assert!(parse_sidecar("").is_none());
        assert!(parse_sidecar(" *file.zip").is_none());
    }

    #[test]
    fn sidecar_path_appends_extension() {
        assert_eq!(
            sidecar_path(Path::new("/data/123-345.zip")),
            PathBuf::from("/data/123-345.zip.sha512")
        );
    }
}
