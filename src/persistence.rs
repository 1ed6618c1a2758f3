// File: src/persistence.rs
//! On-disk formats: the binary embedding layout and the edge-list file.
//!
//! Dense layout (little-endian):
//! - `i32` word count, or `-1` followed by `i32` format version, `i32` model
//!   id and the real `i32` word count;
//! - `i32` dimension;
//! - per word: `i32` byte length, the UTF-8 bytes, an `f32` norm statistic
//!   when the format version is at least 1, then `dimension` `f32` values.

use crate::error::{ClueError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Longest word entry accepted by the reader, in bytes.
pub const MAX_WORD_BYTES: usize = 1 << 16;
/// Largest vector dimension accepted by the reader.
pub const MAX_DIMENSION: usize = 1 << 16;

const EXTENDED_HEADER_MARKER: i32 = -1;

/// Upper bound on vector values reserved up front from header counts.
const MAX_RESERVED_VALUES: usize = 1 << 20;

/// Raw contents of a dense embedding file, before any model transform.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTable {
    pub format_version: i32,
    pub model_id: i32,
    pub dimension: usize,
    pub words: Vec<String>,
    /// One statistic per word; 1.0 when the file predates format version 1.
    pub norms: Vec<f32>,
    /// `words.len() * dimension` values, row-major.
    pub vectors: Vec<f32>,
}

impl DenseTable {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn vector(&self, index: usize) -> &[f32] {
        &self.vectors[index * self.dimension..(index + 1) * self.dimension]
    }
}

/// Serialized form of the explicit pairwise similarity backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeListFile {
    pub format_version: u32,
    pub words: Vec<String>,
    /// `(fixed, dynamic, similarity)` with indices into `words`.
    pub edges: Vec<(u32, u32, f32)>,
}

pub fn load_dense(path: &Path) -> Result<DenseTable> {
    let file = File::open(path).map_err(|e| ClueError::load(path, e.to_string()))?;
    read_dense(BufReader::new(file), path)
}

/// Decodes the dense layout. `source` is only used for error reporting.
pub fn read_dense<R: Read>(mut reader: R, source: &Path) -> Result<DenseTable> {
    let mut format_version = 0;
    let mut model_id = 0;
    let mut word_count = read_i32(&mut reader, source, "header")?;
    if word_count == EXTENDED_HEADER_MARKER {
        format_version = read_i32(&mut reader, source, "header")?;
        model_id = read_i32(&mut reader, source, "header")?;
        word_count = read_i32(&mut reader, source, "header")?;
    }
    let dimension = read_i32(&mut reader, source, "header")?;

    let word_count = usize::try_from(word_count)
        .map_err(|_| ClueError::load(source, format!("negative word count {}", word_count)))?;
    let dimension = usize::try_from(dimension)
        .ok()
        .filter(|&d| d <= MAX_DIMENSION)
        .ok_or_else(|| ClueError::load(source, format!("invalid dimension {}", dimension)))?;

    // Counts come from the file; don't trust them for large preallocations.
    let reserve = word_count
        .min(1 << 16)
        .min(MAX_RESERVED_VALUES / dimension.max(1));
    let mut table = DenseTable {
        format_version,
        model_id,
        dimension,
        words: Vec::with_capacity(reserve),
        norms: Vec::with_capacity(reserve),
        vectors: Vec::with_capacity(reserve * dimension),
    };

    let mut text_buf = Vec::new();
    let mut value_buf = vec![0u8; dimension * 4];
    for entry in 0..word_count {
        let what = format!("entry {}", entry);
        let len = read_i32(&mut reader, source, &what)?;
        if len <= 0 || len as usize > MAX_WORD_BYTES {
            return Err(ClueError::load(source, format!("invalid length {} at {}", len, what)));
        }
        text_buf.resize(len as usize, 0);
        read_exact(&mut reader, &mut text_buf, source, &what)?;
        let word = String::from_utf8(text_buf.clone())
            .map_err(|_| ClueError::load(source, format!("{} is not valid UTF-8", what)))?;

        let norm = if format_version >= 1 {
            f32::from_le_bytes(read_array(&mut reader, source, &what)?)
        } else {
            1.0
        };

        read_exact(&mut reader, &mut value_buf, source, &what)?;
        table.vectors.extend(
            value_buf
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
        );
        table.words.push(word);
        table.norms.push(norm);
    }
    Ok(table)
}

/// Encodes a table. Version 0 tables with model id 0 use the short header.
pub fn write_dense<W: Write>(mut writer: W, table: &DenseTable) -> Result<()> {
    let extended = table.format_version != 0 || table.model_id != 0;
    if extended {
        writer.write_all(&EXTENDED_HEADER_MARKER.to_le_bytes())?;
        writer.write_all(&table.format_version.to_le_bytes())?;
        writer.write_all(&table.model_id.to_le_bytes())?;
    }
    writer.write_all(&to_i32(table.len(), "word count")?.to_le_bytes())?;
    writer.write_all(&to_i32(table.dimension, "dimension")?.to_le_bytes())?;

    for (index, word) in table.words.iter().enumerate() {
        if word.is_empty() || word.len() > MAX_WORD_BYTES {
            return Err(ClueError::Encode(format!("word {} has invalid length {}", index, word.len())));
        }
        writer.write_all(&(word.len() as i32).to_le_bytes())?;
        writer.write_all(word.as_bytes())?;
        if table.format_version >= 1 {
            writer.write_all(&table.norms[index].to_le_bytes())?;
        }
        for value in table.vector(index) {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes a dense file atomically.
pub fn save_dense(table: &DenseTable, path: &Path) -> Result<()> {
    persist_atomically(path, |writer| write_dense(writer, table))
}

pub fn load_edge_list(path: &Path) -> Result<EdgeListFile> {
    let file = File::open(path).map_err(|e| ClueError::load(path, e.to_string()))?;
    let data: EdgeListFile = bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| ClueError::load(path, e.to_string()))?;

    let word_count = data.words.len();
    if let Some(&(fixed, dynamic, _)) = data
        .edges
        .iter()
        .find(|(a, b, _)| *a as usize >= word_count || *b as usize >= word_count)
    {
        return Err(ClueError::load(
            path,
            format!("edge ({}, {}) outside vocabulary of {} words", fixed, dynamic, word_count),
        ));
    }
    Ok(data)
}

/// Writes an edge-list file atomically.
pub fn save_edge_list(data: &EdgeListFile, path: &Path) -> Result<()> {
    persist_atomically(path, |writer| {
        bincode::serialize_into(writer, data).map_err(|e| ClueError::Encode(e.to_string()))
    })
}

/// Converts the textual word2vec/GloVe format into a dense table.
///
/// Each line is `word v1 ... vD`; an optional first line `count dim` is
/// skipped. Vectors are L2-normalized and their squared norm is kept as the
/// per-word statistic.
pub fn text_to_dense<R: BufRead>(
    reader: R,
    model_id: i32,
    limit: Option<usize>,
    source: &Path,
) -> Result<DenseTable> {
    let mut table = DenseTable {
        format_version: 1,
        model_id,
        dimension: 0,
        words: Vec::new(),
        norms: Vec::new(),
        vectors: Vec::new(),
    };

    for (line_no, line) in reader.lines().enumerate() {
        if limit.is_some_and(|l| table.len() >= l) {
            break;
        }
        let line = line?;
        let mut tokens = line.split_whitespace();
        let Some(word) = tokens.next() else { continue };
        let values: Vec<&str> = tokens.collect();

        if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() && values[0].parse::<usize>().is_ok() {
            continue;
        }

        let mut vector = values
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| ClueError::load(source, format!("line {}: {}", line_no + 1, e)))?;

        if table.is_empty() {
            if vector.is_empty() || vector.len() > MAX_DIMENSION {
                return Err(ClueError::load(source, format!("line {}: invalid dimension {}", line_no + 1, vector.len())));
            }
            table.dimension = vector.len();
        } else if vector.len() != table.dimension {
            return Err(ClueError::load(
                source,
                format!("line {}: expected {} values, found {}", line_no + 1, table.dimension, vector.len()),
            ));
        }

        let squared: f32 = vector.iter().map(|v| v * v).sum();
        if squared <= 0.0 || !squared.is_finite() {
            return Err(ClueError::load(source, format!("line {}: cannot normalize '{}'", line_no + 1, word)));
        }
        let length = squared.sqrt();
        vector.iter_mut().for_each(|v| *v /= length);

        table.words.push(word.to_string());
        table.norms.push(squared);
        table.vectors.extend_from_slice(&vector);
    }
    Ok(table)
}

fn persist_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| ClueError::Io(e.error))?;
    Ok(())
}

fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| ClueError::Encode(format!("{} {} does not fit in 32 bits", what, value)))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], source: &Path, what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        let reason = if e.kind() == ErrorKind::UnexpectedEof {
            format!("truncated while reading {}", what)
        } else {
            format!("failed at reading {}: {}", what, e)
        };
        ClueError::load(source, reason)
    })
}

fn read_array<R: Read, const N: usize>(reader: &mut R, source: &Path, what: &str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    read_exact(reader, &mut buf, source, what)?;
    Ok(buf)
}

fn read_i32<R: Read>(reader: &mut R, source: &Path, what: &str) -> Result<i32> {
    Ok(i32::from_le_bytes(read_array(reader, source, what)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_table(format_version: i32, model_id: i32) -> DenseTable {
        DenseTable {
            format_version,
            model_id,
            dimension: 2,
            words: vec!["cat".to_string(), "ice_cream".to_string()],
            norms: if format_version >= 1 { vec![2.5, 0.5] } else { vec![1.0, 1.0] },
            vectors: vec![1.0, 0.0, 0.6, 0.8],
        }
    }

    fn encode(table: &DenseTable) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_dense(&mut bytes, table).unwrap();
        bytes
    }

    #[test]
    fn short_header_layout_is_bit_exact() {
        let bytes = encode(&sample_table(0, 0));
        assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3i32.to_le_bytes());
        assert_eq!(&bytes[12..15], b"cat");
        assert_eq!(&bytes[15..19], &1.0f32.to_le_bytes());
        // 8 header + (4 + 3 + 8) + (4 + 9 + 8)
        assert_eq!(bytes.len(), 44);
    }

    #[test]
    fn extended_header_carries_version_model_and_norms() {
        let table = sample_table(1, 2);
        let bytes = encode(&table);
        assert_eq!(&bytes[0..4], &(-1i32).to_le_bytes());
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2i32.to_le_bytes());
        let decoded = read_dense(Cursor::new(bytes), Path::new("mem")).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn version_zero_defaults_norms_to_one() {
        let decoded = read_dense(Cursor::new(encode(&sample_table(0, 0))), Path::new("mem")).unwrap();
        assert_eq!(decoded.norms, vec![1.0, 1.0]);
        assert_eq!(decoded.vector(1), &[0.6, 0.8]);
    }

    #[test]
    fn truncated_stream_is_a_load_error() {
        let bytes = encode(&sample_table(1, 0));
        for cut in [0, 3, 10, bytes.len() - 1] {
            let err = read_dense(Cursor::new(&bytes[..cut]), Path::new("mem")).unwrap_err();
            assert!(matches!(err, ClueError::Load { .. }), "cut at {}", cut);
        }
    }

    #[test]
    fn rejects_bad_word_lengths() {
        for len in [0i32, -4, (MAX_WORD_BYTES + 1) as i32] {
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&1i32.to_le_bytes());
            bytes.extend_from_slice(&1i32.to_le_bytes());
            bytes.extend_from_slice(&len.to_le_bytes());
            bytes.extend_from_slice(&[b'a'; 8]);
            let err = read_dense(Cursor::new(bytes), Path::new("mem")).unwrap_err();
            assert!(matches!(err, ClueError::Load { ref reason, .. } if reason.contains("invalid length")));
        }
    }

    fn header(count: i32, dimension: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&dimension.to_le_bytes());
        bytes
    }

    fn load_reason(bytes: Vec<u8>) -> String {
        match read_dense(Cursor::new(bytes), Path::new("mem")) {
            Err(ClueError::Load { reason, .. }) => reason,
            other => panic!("expected a load error, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn rejects_negative_counts_and_dimensions() {
        assert!(load_reason(header(-2, 3)).contains("negative word count"));
        assert!(load_reason(header(1, -3)).contains("invalid dimension"));

        let mut extended = Vec::new();
        for v in [-1i32, 1, 0, -7, 2] {
            extended.extend_from_slice(&v.to_le_bytes());
        }
        assert!(load_reason(extended).contains("negative word count"));
    }

    #[test]
    fn rejects_oversized_dimension() {
        let reason = load_reason(header(1, MAX_DIMENSION as i32 + 1));
        assert!(reason.contains("invalid dimension"));
    }

    #[test]
    fn rejects_invalid_utf8_words() {
        let mut bytes = header(1, 1);
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&[0xC3, 0x28]);
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        assert!(load_reason(bytes).contains("not valid UTF-8"));
    }

    #[test]
    fn huge_header_counts_on_a_short_file_fail_cleanly() {
        let max = MAX_DIMENSION as i32;
        for (count, dimension) in [(max, max), (i32::MAX, max), (i32::MAX, 1)] {
            let reason = load_reason(header(count, dimension));
            assert!(reason.contains("entry 0"), "{} x {}: {}", count, dimension, reason);
        }
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_dense(Path::new("/nonexistent/clue_core_test.bin")).unwrap_err();
        assert!(matches!(err, ClueError::Load { .. }));
    }

    #[test]
    fn save_and_load_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vectors.bin");
        let table = sample_table(1, 1);
        save_dense(&table, &path).unwrap();
        assert_eq!(load_dense(&path).unwrap(), table);
    }

    #[test]
    fn edge_list_rejects_dangling_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.bin");
        let data = EdgeListFile {
            format_version: 1,
            words: vec!["a".to_string(), "b".to_string()],
            edges: vec![(0, 1, 0.5), (1, 7, 0.2)],
        };
        save_edge_list(&data, &path).unwrap();
        assert!(matches!(load_edge_list(&path), Err(ClueError::Load { .. })));
    }

    #[test]
    fn text_conversion_normalizes_and_skips_header() {
        let text = "2 2\ncat 3 4\ndog 0 -2\n";
        let table = text_to_dense(Cursor::new(text), 0, None, Path::new("mem")).unwrap();
        assert_eq!(table.format_version, 1);
        assert_eq!(table.words, vec!["cat", "dog"]);
        assert_eq!(table.norms, vec![25.0, 4.0]);
        assert!((table.vector(0)[0] - 0.6).abs() < 1e-6);
        assert_eq!(table.vector(1), &[0.0, -1.0]);
    }

    #[test]
    fn text_conversion_honours_limit_and_rejects_ragged_rows() {
        let text = "a 1 0\nb 0 1\nc 1 1\n";
        let table = text_to_dense(Cursor::new(text), 0, Some(2), Path::new("mem")).unwrap();
        assert_eq!(table.len(), 2);

        let ragged = "a 1 0\nb 0 1 1\n";
        assert!(text_to_dense(Cursor::new(ragged), 0, None, Path::new("mem")).is_err());
        let zero = "a 0 0\n";
        assert!(text_to_dense(Cursor::new(zero), 0, None, Path::new("mem")).is_err());
    }
}
