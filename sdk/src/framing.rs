//! The length-prefixed frame format shared by the TCP client and the server's
//! connection handler. Not a general-purpose RPC framework — just enough
//! streaming-decodable framing to carry the two request/response pairs.
//!
//! Request frame:  `[u32 LE length][u32 LE command code][u64 LE deadline millis][payload]`
//! Response frame: `[u32 LE status][u32 LE length][payload]`
//!
//! `length` always covers only the bytes that follow it. `payload` is a
//! bincode encoding of the relevant request/response struct (or, for an
//! error response, of the error message string). `deadline millis` is the
//! caller-supplied budget (§5 of the design) for the whole request/response
//! round trip, counted from the moment the server starts dispatching it; the
//! handler aborts the wait for the store's mutex/call once it elapses.

use crate::command::{STATUS_ERROR, STATUS_OK};
use crate::error::BrokerError;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const CODE_LENGTH: usize = 4;
pub const DEADLINE_LENGTH: usize = 8;
pub const STATUS_LENGTH: usize = 4;
pub const PAYLOAD_LENGTH_FIELD: usize = 4;

pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    code: u32,
    deadline: Duration,
    payload: &[u8],
) -> Result<(), BrokerError> {
    let length = (CODE_LENGTH + DEADLINE_LENGTH + payload.len()) as u32;
    writer
        .write_all(&length.to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing request length", e))?;
    writer
        .write_all(&code.to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing request code", e))?;
    writer
        .write_all(&(deadline.as_millis() as u64).to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing request deadline", e))?;
    writer
        .write_all(payload)
        .await
        .map_err(|e| BrokerError::io("writing request payload", e))?;
    writer
        .flush()
        .await
        .map_err(|e| BrokerError::io("flushing request", e))?;
    Ok(())
}

pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<(u32, Duration, Vec<u8>), BrokerError> {
    let mut length_bytes = [0u8; PAYLOAD_LENGTH_FIELD];
    reader
        .read_exact(&mut length_bytes)
        .await
        .map_err(|e| BrokerError::io("reading request length", e))?;
    let length = u32::from_le_bytes(length_bytes) as usize;

    let mut code_bytes = [0u8; CODE_LENGTH];
    reader
        .read_exact(&mut code_bytes)
        .await
        .map_err(|e| BrokerError::io("reading request code", e))?;
    let code = u32::from_le_bytes(code_bytes);

    let mut deadline_bytes = [0u8; DEADLINE_LENGTH];
    reader
        .read_exact(&mut deadline_bytes)
        .await
        .map_err(|e| BrokerError::io("reading request deadline", e))?;
    let deadline = Duration::from_millis(u64::from_le_bytes(deadline_bytes));

    let payload_len = length.saturating_sub(CODE_LENGTH + DEADLINE_LENGTH);
    let mut payload = vec![0u8; payload_len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| BrokerError::io("reading request payload", e))?;
    Ok((code, deadline, payload))
}

pub async fn write_ok_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), BrokerError> {
    writer
        .write_all(&STATUS_OK.to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing response status", e))?;
    writer
        .write_all(&(payload.len() as u32).to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing response length", e))?;
    writer
        .write_all(payload)
        .await
        .map_err(|e| BrokerError::io("writing response payload", e))?;
    writer
        .flush()
        .await
        .map_err(|e| BrokerError::io("flushing response", e))?;
    Ok(())
}

pub async fn write_error_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &str,
) -> Result<(), BrokerError> {
    let payload = message.as_bytes();
    writer
        .write_all(&STATUS_ERROR.to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing response status", e))?;
    writer
        .write_all(&(payload.len() as u32).to_le_bytes())
        .await
        .map_err(|e| BrokerError::io("writing response length", e))?;
    writer
        .write_all(payload)
        .await
        .map_err(|e| BrokerError::io("writing response payload", e))?;
    writer
        .flush()
        .await
        .map_err(|e| BrokerError::io("flushing response", e))?;
    Ok(())
}

/// Returns `Ok(payload)` for a status-ok response, or `Err` with the
/// server's error message for a status-error response.
pub async fn read_response<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, BrokerError> {
    let mut status_bytes = [0u8; STATUS_LENGTH];
    reader
        .read_exact(&mut status_bytes)
        .await
        .map_err(|e| BrokerError::io("reading response status", e))?;
    let status = u32::from_le_bytes(status_bytes);

    let mut length_bytes = [0u8; PAYLOAD_LENGTH_FIELD];
    reader
        .read_exact(&mut length_bytes)
        .await
        .map_err(|e| BrokerError::io("reading response length", e))?;
    let length = u32::from_le_bytes(length_bytes) as usize;

    let mut payload = vec![0u8; length];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| BrokerError::io("reading response payload", e))?;

    if status == STATUS_OK {
        Ok(payload)
    } else {
        let message = String::from_utf8_lossy(&payload).into_owned();
        Err(BrokerError::Io {
            context: "server returned an error".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, message),
        })
    }
}
