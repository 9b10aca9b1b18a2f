//! Transparent decompression of the source table.
//!
//! A compressed table is recognised by its file extension first and by its leading magic
//! bytes second; anything unrecognised is read as plain text. Codecs are compiled in per
//! feature flag:
//! - **Gzip** (`.gz`) - feature `compression-gzip`
//! - **Zstd** (`.zst`) - feature `compression-zstd`
//! - **Bzip2** (`.bz2`) - feature `compression-bzip2`
//! - **Xz** (`.xz`) - feature `compression-xz`

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A decompression algorithm the table reader can sit on top of.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g. "gzip").
    fn name(&self) -> &str;

    /// Lowercase file extensions including the leading dot.
    fn extensions(&self) -> &[&str];

    /// Signature at the start of the stream, if the format has one.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// Whether `head`, the first buffered bytes of a stream, carries this codec's signature.
    fn matches_magic(&self, head: &[u8]) -> bool {
        self.magic_bytes().is_some_and(|m| head.starts_with(m))
    }

    /// Wrap `reader` so reads yield decompressed bytes.
    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;
}

/// Codecs enabled in this build, in detection order.
#[must_use]
pub fn builtin_codecs() -> Vec<Box<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Box::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Box::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Box::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Box::new(XzCodec),
    ]
}

fn detect_from_extension<'a>(
    codecs: &'a [Box<dyn CompressionCodec>],
    path: &Path,
) -> Option<&'a dyn CompressionCodec> {
    let name = path.to_string_lossy().to_lowercase();
    codecs
        .iter()
        .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
        .map(|c| &**c)
}

/// Peek at the buffered stream without consuming it.
fn detect_from_magic<'a, R: BufRead>(
    codecs: &'a [Box<dyn CompressionCodec>],
    reader: &mut R,
) -> Option<&'a dyn CompressionCodec> {
    let buf = reader.fill_buf().ok()?;
    if buf.is_empty() {
        return None;
    }
    codecs
        .iter()
        .find(|c| c.matches_magic(buf))
        .map(|c| &**c)
}

/// Wrap `reader` with a decompressor when `path_hint` or the stream header calls for one.
///
/// # Errors
/// Returns an error if the codec fails to initialise on the stream.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    let codecs = builtin_codecs();

    if let Some(codec) = detect_from_extension(&codecs, path_hint.as_ref()) {
        return codec
            .wrap_reader_dyn(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    let mut buf_reader = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&codecs, &mut buf_reader) {
        return codec
            .wrap_reader_dyn(Box::new(buf_reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    Ok(Box::new(buf_reader))
}

/// Open `path` and return a reader over its (decompressed) contents.
///
/// # Errors
/// Returns an error if the file cannot be opened or the decompressor cannot be set up.
pub fn open_decompressed(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        use flate2::read::MultiGzDecoder;
        Ok(Box::new(MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(b"BZh")
    }

    // "BZh" alone can open a plain header, so also require the block size digit and the
    // first block (or end-of-stream) marker.
    fn matches_magic(&self, head: &[u8]) -> bool {
        const BLOCK: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
        const END: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];
        match head {
            [b'B', b'Z', b'h', level, rest @ ..] if (b'1'..=b'9').contains(level) => {
                rest.starts_with(&BLOCK) || rest.starts_with(&END)
            }
            _ => false,
        }
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        use bzip2::read::MultiBzDecoder;
        Ok(Box::new(MultiBzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        use xz2::read::XzDecoder;
        Ok(Box::new(XzDecoder::new_multi_decoder(reader)))
    }
}
