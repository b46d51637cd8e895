//! Byte-Range Relocator
//!
//! Moves a contiguous byte range inside a file by a signed offset, one block
//! at a time, so that overlapping source and destination ranges are safe.
//!
//! ```text
//! delta < 0 (toward file start): walk forward
//!
//!   ┌────────┬──────────────────────┐
//!   │  dest  │ src  ──read──▶ write │   cursor ──▶
//!   └────────┴──────────────────────┘
//!
//! delta > 0 (toward file end): walk backward
//!
//!   ┌──────────────────────┬────────┐
//!   │ read ◀── src         │  dest  │   ◀── cursor
//!   └──────────────────────┴────────┘
//! ```

use std::io::{self, Read, Seek, SeekFrom, Write};

/// Shift `len` bytes starting at `start` by `delta` bytes.
///
/// Returns `Ok(false)` without touching the file when the arguments describe
/// nothing to move: an empty range, a zero delta, a range that does not lie
/// inside the file, or a destination before byte 0.
///
/// Bytes between the old and new range positions that are not covered by the
/// destination keep their previous contents.
pub fn shift<F>(file: &mut F, start: u64, len: u64, delta: i64, block_size: usize) -> io::Result<bool>
where
    F: Read + Write + Seek,
{
    let file_len = file.seek(SeekFrom::End(0))?;

    if len == 0 || delta == 0 || start >= file_len {
        return Ok(false);
    }
    let end = match start.checked_add(len) {
        Some(end) if end <= file_len => end,
        _ => return Ok(false),
    };
    if delta < 0 && delta.unsigned_abs() > start {
        return Ok(false);
    }

    let block = block_size.max(1) as u64;
    let mut buf = vec![0u8; block.min(len) as usize];

    if delta < 0 {
        let back = delta.unsigned_abs();
        let mut cursor = start;
        while cursor < end {
            let n = (end - cursor).min(block) as usize;
            file.seek(SeekFrom::Start(cursor))?;
            file.read_exact(&mut buf[..n])?;
            file.seek(SeekFrom::Start(cursor - back))?;
            file.write_all(&buf[..n])?;
            cursor += n as u64;
        }
    } else {
        let forward = delta as u64;
        let mut cursor = end;
        while cursor > start {
            let n = (cursor - start).min(block) as usize;
            let src = cursor - n as u64;
            file.seek(SeekFrom::Start(src))?;
            file.read_exact(&mut buf[..n])?;
            file.seek(SeekFrom::Start(src + forward))?;
            file.write_all(&buf[..n])?;
            cursor = src;
        }
    }

    tracing::trace!(start, len, delta, "relocated byte range");
    Ok(true)
}
