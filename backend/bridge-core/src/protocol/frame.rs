use crate::error::FramingError;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Length of the frame header in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload accepted unless configured otherwise (16 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Reads one frame and returns its payload.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between
/// frames.
///
/// # Errors
///
/// - [`FramingError::Truncated`] if the stream ends inside the length
///   prefix or before `length` payload bytes arrived
/// - [`FramingError::FrameTooLarge`] if the declared length exceeds
///   `max_frame_bytes`
/// - [`FramingError::Io`] for any other socket failure
pub async fn read_frame<R>(
    reader: &mut R,
    max_frame_bytes: u32,
) -> Result<Option<Vec<u8>>, FramingError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0;

    while filled < LENGTH_PREFIX_SIZE {
        let read = reader.read(&mut prefix[filled..]).await?;
        if read == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FramingError::truncated(format!(
                "stream ended after {filled} of {LENGTH_PREFIX_SIZE} length bytes"
            )));
        }
        filled += read;
    }

    let length = u32::from_be_bytes(prefix);
    if length > max_frame_bytes {
        return Err(FramingError::frame_too_large(length, max_frame_bytes));
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FramingError::truncated(format!("stream ended before {length} payload bytes"))
        } else {
            FramingError::from(e)
        }
    })?;

    Ok(Some(payload))
}

/// Writes one frame and flushes the writer.
///
/// # Errors
///
/// Returns [`FramingError::FrameTooLarge`] if the payload does not fit a
/// `u32` length, or [`FramingError::Io`] if the write fails.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    let length = u32::try_from(payload.len())
        .map_err(|_| FramingError::frame_too_large(u32::MAX, u32::MAX))?;

    writer.write_all(&length.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
