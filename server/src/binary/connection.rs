use crate::binary::handlers::{poll, produce};
use msgd::command::{POLL_CODE, PRODUCE_CODE};
use msgd::error::BrokerError;
use msgd::framing;
use msgd::messages::{PollCommand, ProduceCommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use streaming::BackingStore;
use tokio::io::{AsyncRead, AsyncWrite, BufReader, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, instrument};

/// How long the connection waits for the *next* request frame to start
/// arriving before it is dropped as idle. Distinct from a request's own
/// deadline (carried on the wire, honored in `dispatch`): this timeout
/// guards a peer that stops sending entirely, not a slow in-flight call.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[instrument(skip(store, stream), fields(%peer))]
pub async fn handle(store: Arc<dyn BackingStore>, stream: TcpStream, peer: SocketAddr) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    info!("connection opened");
    loop {
        match tokio::time::timeout(IDLE_TIMEOUT, serve_one(&store, &mut reader, &mut writer)).await {
            Ok(Ok(true)) => continue,
            Ok(Ok(false)) => {
                debug!("connection closed by peer");
                break;
            }
            Ok(Err(error)) => {
                error!(%error, "connection error");
                break;
            }
            Err(_) => {
                debug!("connection idle past timeout");
                break;
            }
        }
    }
    info!("connection closed");
}

/// Reads, dispatches and answers exactly one request. Returns `Ok(false)`
/// when the peer has cleanly closed the stream (EOF before a new frame).
async fn serve_one<R, W>(store: &Arc<dyn BackingStore>, reader: &mut R, writer: &mut W) -> Result<bool, BrokerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (code, deadline, payload) = match framing::read_request(reader).await {
        Ok(frame) => frame,
        Err(BrokerError::Io { source, .. }) if source.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Ok(false)
        }
        Err(error) => return Err(error),
    };

    // The caller's deadline bounds only the wait for the mutex/store call
    // (§5): dispatch, not the read/write framing around it.
    let result = match tokio::time::timeout(deadline, dispatch(store, code, payload)).await {
        Ok(result) => result,
        Err(_) => Err(BrokerError::DeadlineExceeded(format!(
            "command {code} exceeded its {deadline:?} deadline"
        ))),
    };
    match result {
        Ok(response_bytes) => framing::write_ok_response(writer, &response_bytes).await?,
        Err(error) => framing::write_error_response(writer, &error.to_string()).await?,
    }
    Ok(true)
}

async fn dispatch(store: &Arc<dyn BackingStore>, code: u32, payload: Vec<u8>) -> Result<Vec<u8>, BrokerError> {
    match code {
        PRODUCE_CODE => {
            let command: ProduceCommand =
                bincode::deserialize(&payload).map_err(|source| BrokerError::Decode {
                    what: "ProduceCommand",
                    source,
                })?;
            let response = produce::handle(store, command).await?;
            bincode::serialize(&response).map_err(|source| BrokerError::Encode {
                what: "ProduceResponse",
                source,
            })
        }
        POLL_CODE => {
            let command: PollCommand =
                bincode::deserialize(&payload).map_err(|source| BrokerError::Decode {
                    what: "PollCommand",
                    source,
                })?;
            let response = poll::handle(store, command).await?;
            bincode::serialize(&response).map_err(|source| BrokerError::Encode {
                what: "PollResponse",
                source,
            })
        }
        other => Err(BrokerError::io(
            format!("unknown command code {other}"),
            std::io::Error::from(std::io::ErrorKind::InvalidData),
        )),
    }
}
