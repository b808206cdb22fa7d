//! Replay one precomputed request over an open connection

use std::time::Instant;

use crate::metrics::CallOutcome;
use crate::traits::{Connection, ReplyOutcome, TransportError};

/// Write the request verbatim and consume one reply.
///
/// The measured span covers the write and the reply read only; connection
/// setup is excluded. A server exception becomes a [`CallOutcome::Failure`]
/// and leaves the connection usable; a transport failure propagates and ends
/// the calling worker.
pub async fn replay(
    conn: &mut dyn Connection,
    request: &[u8],
) -> Result<CallOutcome, TransportError> {
    let start = Instant::now();
    conn.send_request(request).await?;
    let reply = conn.read_reply().await?;
    let elapsed_micros = start.elapsed().as_micros() as u64;

    Ok(match reply {
        ReplyOutcome::Success => CallOutcome::Success { elapsed_micros },
        ReplyOutcome::Exception(kind) => CallOutcome::Failure { kind },
    })
}
