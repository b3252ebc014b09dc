use crate::command::{POLL_CODE, PRODUCE_CODE};
use crate::error::BrokerError;
use crate::framing::{read_response, write_request};
use crate::messages::{PollCommand, PollResponse, ProduceCommand, ProduceResponse};
use std::time::Duration;
use tokio::io::{BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// The deadline used by `produce`/`poll` when the caller doesn't need a
/// tighter one. Each RPC still carries its own deadline on the wire (§5 of
/// the design); this is just this client's default choice of value.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// A minimal TCP client for the Produce/Poll RPC surface. Used by the
/// integration tests and available to any future producer/consumer built on
/// top of this crate; it is deliberately thin rather than a full reconnect/
/// retry-aware client like the teacher's `TcpClient`.
pub struct BrokerClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl BrokerClient {
    pub async fn connect(address: &str) -> Result<Self, BrokerError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| BrokerError::io(format!("connecting to {address}"), e))?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    pub async fn produce(&mut self, topic: &str, payload: Vec<u8>) -> Result<u32, BrokerError> {
        self.produce_with_deadline(topic, payload, DEFAULT_DEADLINE).await
    }

    pub async fn produce_with_deadline(
        &mut self,
        topic: &str,
        payload: Vec<u8>,
        deadline: Duration,
    ) -> Result<u32, BrokerError> {
        let command = ProduceCommand {
            topic: topic.to_string(),
            payload,
        };
        let encoded = bincode::serialize(&command).map_err(|source| BrokerError::Encode {
            what: "ProduceCommand",
            source,
        })?;
        write_request(&mut self.writer, PRODUCE_CODE, deadline, &encoded).await?;
        let response_bytes = read_response(&mut self.reader).await?;
        let response: ProduceResponse =
            bincode::deserialize(&response_bytes).map_err(|source| BrokerError::Decode {
                what: "ProduceResponse",
                source,
            })?;
        Ok(response.message_number)
    }

    pub async fn poll(
        &mut self,
        topic: &str,
        read_from: u32,
    ) -> Result<(Vec<Vec<u8>>, u32), BrokerError> {
        self.poll_with_deadline(topic, read_from, DEFAULT_DEADLINE).await
    }

    pub async fn poll_with_deadline(
        &mut self,
        topic: &str,
        read_from: u32,
        deadline: Duration,
    ) -> Result<(Vec<Vec<u8>>, u32), BrokerError> {
        let command = PollCommand {
            topic: topic.to_string(),
            read_from,
        };
        let encoded = bincode::serialize(&command).map_err(|source| BrokerError::Encode {
            what: "PollCommand",
            source,
        })?;
        write_request(&mut self.writer, POLL_CODE, deadline, &encoded).await?;
        let response_bytes = read_response(&mut self.reader).await?;
        let response: PollResponse =
            bincode::deserialize(&response_bytes).map_err(|source| BrokerError::Decode {
                what: "PollResponse",
                source,
            })?;
        Ok((response.payloads, response.new_read_from))
    }
}
