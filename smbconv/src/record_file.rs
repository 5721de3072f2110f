//! Memory-mapped record files
//!
//! Layout, little-endian:
//!
//! | off | size | field |
//! |---|---|---|
//! | 0 | 4 | magic `SMDR` |
//! | 4 | 1 | version |
//! | 5 | 3 | padding |
//! | 8 | 8 | record count |
//!
//! followed by `count` entries of taxonomy GUID (16), producer GUID (16),
//! data length (u32) and the data bytes.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use memmap2::Mmap;
use smbconv_core::Guid;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::record::DataRecord;

/// File magic
pub const MAGIC: [u8; 4] = *b"SMDR";

/// Current file version
pub const VERSION: u8 = 1;

/// Fixed file header
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct RecordFileHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub _pad: [u8; 3],
    pub count: u64,
}

impl RecordFileHeader {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub const fn new(count: u64) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            _pad: [0; 3],
            count,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes
            .get(..Self::SIZE)
            .ok_or(EngineError::RecordFile("file shorter than header"))?;
        let header: Self = bytemuck::pod_read_unaligned(bytes);
        if header.magic != MAGIC {
            return Err(EngineError::RecordFile("bad magic"));
        }
        if header.version != VERSION {
            return Err(EngineError::RecordFile("unsupported version"));
        }
        Ok(header)
    }
}

/// Per-record prefix preceding the data bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
struct EntryPrefix {
    taxonomy: Guid,
    producer: Guid,
    length: u32,
}

const PREFIX_SIZE: usize = std::mem::size_of::<EntryPrefix>();

/// Read-only record file backed by a memory map
pub struct RecordFile {
    mmap: Mmap,
    header: RecordFileHeader,
    path: PathBuf,
}

impl RecordFile {
    /// Map `path` and check its header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        // SAFETY: the map is read-only and owned by the returned value; the
        // file is not expected to change while it is being converted
        let mmap = unsafe { Mmap::map(&file)? };
        let header = RecordFileHeader::from_bytes(&mmap)?;
        debug!(path = %path.display(), count = header.count, "opened record file");
        Ok(Self {
            mmap,
            header,
            path,
        })
    }

    pub fn header(&self) -> &RecordFileHeader {
        &self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.header.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.header.count == 0
    }

    /// Records in file order
    pub fn records(&self) -> RecordIter<'_> {
        RecordIter::new(&self.mmap[RecordFileHeader::SIZE..], self.header.count)
    }
}

/// Decode the records of an in-memory record file
pub fn parse_records(bytes: &[u8]) -> Result<RecordIter<'_>> {
    let header = RecordFileHeader::from_bytes(bytes)?;
    Ok(RecordIter::new(&bytes[RecordFileHeader::SIZE..], header.count))
}

/// Iterator over the entries of a record file
///
/// Stops after the first malformed entry.
pub struct RecordIter<'a> {
    bytes: &'a [u8],
    remaining: u64,
}

impl<'a> RecordIter<'a> {
    fn new(bytes: &'a [u8], count: u64) -> Self {
        Self {
            bytes,
            remaining: count,
        }
    }

    fn next_entry(&mut self) -> Result<DataRecord> {
        let prefix = self
            .bytes
            .get(..PREFIX_SIZE)
            .ok_or(EngineError::RecordFile("truncated entry prefix"))?;
        let prefix: EntryPrefix = bytemuck::pod_read_unaligned(prefix);
        let end = PREFIX_SIZE
            .checked_add(prefix.length as usize)
            .ok_or(EngineError::RecordFile("entry length overflows"))?;
        let data = self
            .bytes
            .get(PREFIX_SIZE..end)
            .ok_or(EngineError::RecordFile("truncated entry data"))?;

        let record = DataRecord::new(prefix.taxonomy, prefix.producer, data.to_vec());
        self.bytes = &self.bytes[end..];
        Ok(record)
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<DataRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.next_entry();
        self.remaining = if entry.is_ok() { self.remaining - 1 } else { 0 };
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, usize::try_from(self.remaining).ok())
    }
}

fn write_entry<W: Write>(out: &mut W, record: &DataRecord) -> Result<()> {
    let length = u32::try_from(record.data.len())
        .map_err(|_| EngineError::RecordFile("record too large"))?;
    let prefix = EntryPrefix {
        taxonomy: record.taxonomy,
        producer: record.producer,
        length,
    };
    out.write_all(bytemuck::bytes_of(&prefix))?;
    out.write_all(&record.data)?;
    Ok(())
}

/// Encode records as an in-memory record file
pub fn encode_records<'r, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'r DataRecord>,
{
    let mut body = Vec::new();
    let mut count = 0u64;
    for record in records {
        write_entry(&mut body, record)?;
        count += 1;
    }
    let mut bytes = Vec::with_capacity(RecordFileHeader::SIZE + body.len());
    bytes.extend_from_slice(bytemuck::bytes_of(&RecordFileHeader::new(count)));
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Streaming writer; the record count is patched in by [`finish`](Self::finish)
pub struct RecordFileWriter {
    out: BufWriter<File>,
    count: u64,
}

impl RecordFileWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(bytemuck::bytes_of(&RecordFileHeader::new(0)))?;
        Ok(Self { out, count: 0 })
    }

    pub fn write(&mut self, record: &DataRecord) -> Result<()> {
        write_entry(&mut self.out, record)?;
        self.count += 1;
        Ok(())
    }

    /// Write the header and flush, returning the record count
    pub fn finish(mut self) -> Result<u64> {
        self.out.seek(SeekFrom::Start(0))?;
        self.out
            .write_all(bytemuck::bytes_of(&RecordFileHeader::new(self.count)))?;
        self.out.flush()?;
        Ok(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smbconv_core::format::constants::instance::NOT_APPLICABLE;
    use smbconv_core::taxonomy;

    fn sample() -> Vec<DataRecord> {
        let producer = Guid::from_fields(7, 8, 9, [1; 8]);
        vec![
            DataRecord::with_payload(taxonomy::MISC, producer, 1, 1, NOT_APPLICABLE, &[1, 0]),
            DataRecord::with_payload(
                taxonomy::PROCESSOR,
                producer,
                9,
                2,
                NOT_APPLICABLE,
                &[0x10, 0, 9, 0],
            ),
            DataRecord::new(taxonomy::MEMORY, producer, vec![1, 2, 3]),
        ]
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(RecordFileHeader::SIZE, 16);
        assert_eq!(PREFIX_SIZE, 36);
        let bytes = bytemuck::bytes_of(&RecordFileHeader::new(3)).to_vec();
        assert_eq!(&bytes[..5], b"SMDR\x01");
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 3);
    }

    #[test]
    fn test_encode_and_parse() {
        let records = sample();
        let bytes = encode_records(&records).unwrap();
        let parsed: Vec<DataRecord> = parse_records(&bytes)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_truncated_file() {
        let bytes = encode_records(&sample()).unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        let results: Vec<_> = parse_records(truncated).unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].is_err());

        assert!(matches!(parse_records(&bytes[..10]), Err(EngineError::RecordFile(_))));
        let mut bad = bytes.clone();
        bad[0] = b'X';
        assert!(matches!(parse_records(&bad), Err(EngineError::RecordFile("bad magic"))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("smbconv-records-{}.bin", std::process::id()));
        let records = sample();

        let mut writer = RecordFileWriter::create(&path).unwrap();
        for record in &records {
            writer.write(record).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), 3);

        let file = RecordFile::open(&path).unwrap();
        assert_eq!(file.len(), 3);
        let read: Vec<DataRecord> = file.records().collect::<Result<_>>().unwrap();
        assert_eq!(read, records);

        drop(file);
        std::fs::remove_file(&path).unwrap();
    }
}
