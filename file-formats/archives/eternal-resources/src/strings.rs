//! String pool shared by all entries of an archive

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Decoded string pool
///
/// Stored as a `u64` count, `count` offsets relative to the start of the
/// character data, and the NUL-terminated strings themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Create a table from owned strings
    pub fn new(strings: Vec<String>) -> Self {
        Self { strings }
    }

    /// Read a table occupying `table_size` bytes
    pub fn read<R: Read>(reader: &mut R, table_size: u32) -> Result<Self> {
        let table_size = u64::from(table_size);
        let count = reader.read_u64::<LittleEndian>()?;

        let index_bytes = count
            .checked_add(1)
            .and_then(|n| n.checked_mul(8))
            .filter(|&n| n <= table_size)
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "string table declares {count} strings but is only {table_size} bytes"
                ))
            })?;

        let mut offsets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            offsets.push(reader.read_u64::<LittleEndian>()?);
        }

        let mut data = vec![0u8; (table_size - index_bytes) as usize];
        reader.read_exact(&mut data)?;

        let mut strings = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let start = usize::try_from(offset)
                .ok()
                .filter(|&s| s <= data.len())
                .ok_or_else(|| {
                    Error::invalid_format(format!("string offset {offset} outside string data"))
                })?;
            let end = data[start..]
                .iter()
                .position(|&b| b == 0)
                .map_or(data.len(), |p| start + p);
            strings.push(String::from_utf8_lossy(&data[start..end]).into_owned());
        }

        log::debug!("Read {} strings from string table", strings.len());
        Ok(Self { strings })
    }

    /// Write the table; returns the number of bytes written
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<u32> {
        writer.write_u64::<LittleEndian>(self.strings.len() as u64)?;

        let mut offset = 0u64;
        for s in &self.strings {
            writer.write_u64::<LittleEndian>(offset)?;
            offset += s.len() as u64 + 1;
        }
        for s in &self.strings {
            writer.write_all(s.as_bytes())?;
            writer.write_u8(0)?;
        }

        let size = 8 * (self.strings.len() as u64 + 1) + offset;
        u32::try_from(size).map_err(|_| Error::invalid_format("string table exceeds 4 GiB"))
    }

    /// Look up a string by id
    pub fn get(&self, index: u64) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(Error::InvalidStringIndex {
                index,
                len: self.strings.len(),
            })
    }

    /// Number of strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_string_table_layout() {
        let table = StringTable::new(vec!["model".into(), "models/crate.lwo".into()]);
        let mut buf = Vec::new();
        let size = table.write(&mut buf).unwrap();
        assert_eq!(size as usize, buf.len());
        // count + 2 offsets + "model\0" + "models/crate.lwo\0"
        assert_eq!(buf.len(), 24 + 6 + 17);
        assert_eq!(u64::from_le_bytes(buf[16..24].try_into().unwrap()), 6);

        let parsed = StringTable::read(&mut Cursor::new(&buf), size).unwrap();
        assert_eq!(parsed.get(1).unwrap(), "models/crate.lwo");
    }

    #[test]
    fn test_out_of_range_index() {
        let table = StringTable::new(vec!["a".into()]);
        let err = table.get(5).unwrap_err();
        assert!(matches!(err, Error::InvalidStringIndex { index: 5, len: 1 }));
    }

    #[test]
    fn test_count_exceeds_table_size() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1000u64.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        let err = StringTable::read(&mut Cursor::new(&buf), 24).unwrap_err();
        assert!(err.is_corruption());
    }
}
