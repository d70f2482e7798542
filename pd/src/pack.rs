//! Packed binary store
//!
//! Each byte holds one pair of consecutive digits as a number in `0..=99`
//! (`"07"` becomes `7`, `"93"` becomes `93`). An odd corpus ends with a byte
//! whose ones digit is a synthetic `0`; readers stop at the manifest's digit
//! count so that padding digit is never observed.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::DEFAULT_BLOCK_SIZE;
use crate::chunks::{ChunkFile, check_coverage, list_chunk_files_auto, read_chunk};
use crate::error::{CorpusError, Result};
use crate::manifest::{PackedManifest, load_packed_manifest, load_text_manifest, write_manifest};

/// Default binary filename in a packed corpus
pub const BINARY_FILE: &str = "pi_digits.bin";

/// Split a packed byte into its tens and ones digits
pub fn decode_byte(value: u8) -> Result<(u8, u8)> {
    if value > 99 {
        return Err(CorpusError::Format(format!("packed byte {} is outside 0..=99", value)));
    }
    Ok((value / 10, value % 10))
}

fn digit_value(c: u8) -> Result<u8> {
    if c.is_ascii_digit() {
        Ok(c - b'0')
    } else {
        Err(CorpusError::Format(format!("non-digit character {:?} in digit stream", c as char)))
    }
}

/// Streaming two-digits-per-byte encoder
///
/// Chunks may have any length; an unpaired trailing digit is carried into
/// the next call to [`PackWriter::push`].
pub struct PackWriter<W: Write> {
    out: W,
    carry: Option<u8>,
    digits: u64,
    buf: Vec<u8>,
}

impl<W: Write> PackWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            carry: None,
            digits: 0,
            buf: Vec::new(),
        }
    }

    /// Real digits accepted so far
    pub fn digits(&self) -> u64 {
        self.digits
    }

    /// Encode a run of ASCII digits
    pub fn push(&mut self, chunk: &str) -> Result<()> {
        let mut bytes = chunk.as_bytes();
        if bytes.is_empty() {
            return Ok(());
        }

        self.buf.clear();
        if let Some(tens) = self.carry.take() {
            self.buf.push(tens * 10 + digit_value(bytes[0])?);
            bytes = &bytes[1..];
        }

        let mut pairs = bytes.chunks_exact(2);
        for pair in pairs.by_ref() {
            self.buf.push(digit_value(pair[0])? * 10 + digit_value(pair[1])?);
        }
        if let [last] = pairs.remainder() {
            self.carry = Some(digit_value(*last)?);
        }

        self.out.write_all(&self.buf)?;
        self.digits += chunk.len() as u64;
        Ok(())
    }

    /// Flush any carried digit (padded with a synthetic zero) and return the sink
    pub fn finish(mut self) -> Result<(W, u64)> {
        if let Some(tens) = self.carry.take() {
            self.out.write_all(&[tens * 10])?;
        }
        self.out.flush()?;
        Ok((self.out, self.digits))
    }
}

/// Pack a text corpus into `output_dir`, returning the packed manifest
///
/// The binary is written under a temporary name and renamed into place once
/// complete, so a failed run never leaves a truncated `pi_digits.bin`.
pub fn pack_digits(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<PackedManifest> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    let text_manifest = load_text_manifest(input_dir)?;
    let chunks = list_chunk_files_auto(input_dir)?;
    if chunks.is_empty() {
        return Err(CorpusError::NotFound {
            path: input_dir.join("pi_digits_*.txt"),
        });
    }
    check_coverage(&chunks, text_manifest.digits)?;

    fs::create_dir_all(output_dir)?;
    let binary_path = output_dir.join(BINARY_FILE);
    let tmp_path = output_dir.join(format!("{}.tmp", BINARY_FILE));

    let result = write_packed(&chunks, &tmp_path);
    let digits = match result {
        Ok(digits) => digits,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!(?tmp_path, %cleanup, "Failed to remove partial packed file");
            }
            return Err(e);
        }
    };
    fs::rename(&tmp_path, &binary_path)?;

    let manifest = PackedManifest::new(digits, BINARY_FILE);
    write_manifest(output_dir, &manifest)?;
    info!(?binary_path, digits, bytes = manifest.expected_bytes(), "Packed corpus");
    Ok(manifest)
}

fn write_packed(chunks: &[ChunkFile], path: &Path) -> Result<u64> {
    let file = File::create(path)?;
    let mut writer = PackWriter::new(BufWriter::new(file));

    for chunk in chunks {
        let text = read_chunk(chunk)?;
        writer.push(&text)?;
        debug!(start = chunk.start, end = chunk.end, "write_packed: chunk encoded");
    }

    let (out, digits) = writer.finish()?;
    out.into_inner().map_err(|e| CorpusError::Io(e.into_error()))?.sync_all()?;
    Ok(digits)
}

/// Block-wise digit reader over a packed byte stream
///
/// Yields exactly `total` digits; a trailing synthetic padding digit is
/// dropped and any bytes after it are never read.
pub struct PackedDigits<R: Read> {
    reader: R,
    block: Vec<u8>,
    pos: usize,
    filled: usize,
    pending: Option<u8>,
    emitted: u64,
    total: u64,
}

impl<R: Read> PackedDigits<R> {
    pub fn new(reader: R, total: u64, block_size: usize) -> Self {
        Self {
            reader,
            block: vec![0; block_size.max(1)],
            pos: 0,
            filled: 0,
            pending: None,
            emitted: 0,
            total,
        }
    }

    /// Digits yielded so far
    pub fn position(&self) -> u64 {
        self.emitted
    }

    fn refill(&mut self) -> Result<usize> {
        loop {
            match self.reader.read(&mut self.block) {
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_digit(&mut self) -> Result<u8> {
        if let Some(ones) = self.pending.take() {
            return Ok(ones);
        }
        if self.pos == self.filled && self.refill()? == 0 {
            return Err(CorpusError::Format(format!(
                "packed data ends after {} of {} digits",
                self.emitted, self.total
            )));
        }
        let (tens, ones) = decode_byte(self.block[self.pos])?;
        self.pos += 1;
        self.pending = Some(ones);
        Ok(tens)
    }
}

impl<R: Read> Iterator for PackedDigits<R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.total {
            return None;
        }
        match self.next_digit() {
            Ok(digit) => {
                self.emitted += 1;
                Some(Ok(digit))
            }
            Err(e) => {
                // Stop after the first failure
                self.total = self.emitted;
                Some(Err(e))
            }
        }
    }
}

/// An opened, validated packed corpus
#[derive(Debug, Clone)]
pub struct PackedCorpus {
    pub manifest: PackedManifest,
    pub binary_path: PathBuf,
}

impl PackedCorpus {
    /// Load the manifest and check the binary it names
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest = load_packed_manifest(dir)?;
        let binary_path = dir.join(&manifest.binary_file);

        let size = fs::metadata(&binary_path)
            .map_err(|e| CorpusError::from_io(e, &binary_path))?
            .len();
        if size != manifest.expected_bytes() {
            return Err(CorpusError::Format(format!(
                "{} is {} bytes; {} digits need {}",
                binary_path.display(),
                size,
                manifest.digits,
                manifest.expected_bytes()
            )));
        }

        debug!(?binary_path, digits = manifest.digits, "Opened packed corpus");
        Ok(Self { manifest, binary_path })
    }

    /// Stream the corpus digits, `block_size` bytes at a time
    pub fn digits(&self, block_size: usize) -> Result<PackedDigits<File>> {
        let file = File::open(&self.binary_path).map_err(|e| CorpusError::from_io(e, &self.binary_path))?;
        Ok(PackedDigits::new(file, self.manifest.digits, block_size))
    }

    /// Write the corpus back out as ASCII digits
    pub fn unpack(&self, out: &mut impl Write) -> Result<u64> {
        let mut line = Vec::with_capacity(DEFAULT_BLOCK_SIZE);
        let mut count = 0u64;
        for digit in self.digits(DEFAULT_BLOCK_SIZE)? {
            line.push(b'0' + digit?);
            count += 1;
            if line.len() >= DEFAULT_BLOCK_SIZE {
                out.write_all(&line)?;
                line.clear();
            }
        }
        out.write_all(&line)?;
        out.flush()?;
        Ok(count)
    }
}
