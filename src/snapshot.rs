use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::partition::{Calendar, CalendarPartition};

/// Encode a single partition to [len][bincode][crc32] format.
fn encode_partition(writer: &mut impl Write, partition: &CalendarPartition) -> io::Result<()> {
    let payload = bincode::serialize(partition)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let len = payload.len() as u32;
    let crc = crc32fast::hash(&payload);
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.write_all(&crc.to_le_bytes())?;
    Ok(())
}

fn corrupt(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Serialize the whole calendar, one record per partition in year order.
///
/// Format per record: `[u32: len][bincode: CalendarPartition][u32: crc32]`.
/// Output is deterministic for a given calendar.
pub fn encode(calendar: &Calendar) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    for partition in calendar.partitions() {
        encode_partition(&mut buf, partition)?;
    }
    Ok(buf)
}

/// Parse a snapshot produced by [`encode`].
///
/// Unlike a log, a snapshot is written atomically, so any damage is an error:
/// truncation, CRC mismatch, duplicate years and partitions that fail
/// validation all return `InvalidData`.
pub fn decode(bytes: &[u8]) -> io::Result<Calendar> {
    let mut calendar = Calendar::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        let (len_buf, tail) = rest
            .split_first_chunk::<4>()
            .ok_or_else(|| corrupt("truncated record length"))?;
        let len = u32::from_le_bytes(*len_buf) as usize;
        if tail.len() < len + 4 {
            return Err(corrupt("truncated record"));
        }
        let (payload, tail) = tail.split_at(len);
        let (crc_buf, tail) = tail
            .split_first_chunk::<4>()
            .ok_or_else(|| corrupt("truncated record checksum"))?;
        if u32::from_le_bytes(*crc_buf) != crc32fast::hash(payload) {
            return Err(corrupt("record checksum mismatch"));
        }

        let partition: CalendarPartition =
            bincode::deserialize(payload).map_err(|e| corrupt(e.to_string()))?;
        partition
            .validate()
            .map_err(|e| corrupt(format!("partition {}: {e}", partition.year())))?;
        let year = partition.year();
        if calendar.insert(partition).is_some() {
            return Err(corrupt(format!("duplicate partition for {year}")));
        }
        rest = tail;
    }

    Ok(calendar)
}

/// Atomically replace the file at `path` with `bytes`: write a temp file,
/// fsync, rename over the target, then fsync the directory.
///
/// Callers writing the same `path` concurrently must serialize; they share
/// the temp file.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }
    let tmp_path = path.with_extension("snap.tmp");
    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    fs::rename(&tmp_path, path)?;
    sync_dir(dir.unwrap_or(Path::new(".")))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directories cannot be opened as files here; the rename is as durable as it gets.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Encode `calendar` and write it to `path`.
pub fn write_file(path: &Path, calendar: &Calendar) -> io::Result<()> {
    write_bytes(path, &encode(calendar)?)
}

/// Load the calendar stored at `path`. A missing file is an empty calendar.
pub fn load_file(path: &Path) -> io::Result<Calendar> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Calendar::new()),
        Err(e) => Err(e),
    }
}
