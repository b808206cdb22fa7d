//! Strict binary protocol codec
//!
//! Just enough of the Thrift binary protocol for a benchmarking client: a
//! writer that encodes one call message into a byte buffer, and an async
//! reader that consumes one reply by skipping the result body or decoding an
//! application exception. Containers and structs are only ever skipped, never
//! materialized.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use thriftmark_core::{ErrorKind, ReplyOutcome, TransportError};

/// Strict protocol version word (high 16 bits of the first i32).
const VERSION_1: u32 = 0x8001_0000;
const VERSION_MASK: u32 = 0xffff_0000;

/// Upper bound for any length read off the wire.
const MAX_WIRE_LENGTH: i32 = 64 * 1024 * 1024;

/// Protocol message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// A client call
    Call = 1,
    /// A normal reply
    Reply = 2,
    /// An application exception reply
    Exception = 3,
    /// A one-way call (no reply expected)
    Oneway = 4,
}

impl MessageType {
    fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(MessageType::Call),
            2 => Some(MessageType::Reply),
            3 => Some(MessageType::Exception),
            4 => Some(MessageType::Oneway),
            _ => None,
        }
    }
}

/// Field type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TType {
    /// End of struct
    Stop = 0,
    /// No value
    Void = 1,
    /// Boolean
    Bool = 2,
    /// Signed byte
    Byte = 3,
    /// 64-bit float
    Double = 4,
    /// 16-bit integer
    I16 = 6,
    /// 32-bit integer
    I32 = 8,
    /// 64-bit integer
    I64 = 10,
    /// Length-prefixed string or binary
    String = 11,
    /// Struct
    Struct = 12,
    /// Map
    Map = 13,
    /// Set
    Set = 14,
    /// List
    List = 15,
}

impl TType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TType::Stop),
            1 => Some(TType::Void),
            2 => Some(TType::Bool),
            3 => Some(TType::Byte),
            4 => Some(TType::Double),
            6 => Some(TType::I16),
            8 => Some(TType::I32),
            10 => Some(TType::I64),
            11 => Some(TType::String),
            12 => Some(TType::Struct),
            13 => Some(TType::Map),
            14 => Some(TType::Set),
            15 => Some(TType::List),
            _ => None,
        }
    }
}

/// Encoder for strict binary messages, writing into a growable buffer
#[derive(Debug, Default)]
pub struct MessageWriter {
    buf: BytesMut,
}

impl MessageWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the strict message header: version word, name, sequence id.
    pub fn write_message_begin(&mut self, name: &str, message_type: MessageType, sequence_id: i32) {
        self.buf.put_u32(VERSION_1 | message_type as u32);
        self.write_string(name);
        self.buf.put_i32(sequence_id);
    }

    /// Begin a struct field.
    pub fn write_field_begin(&mut self, ttype: TType, id: i16) {
        self.buf.put_u8(ttype as u8);
        self.buf.put_i16(id);
    }

    /// Terminate the current struct.
    pub fn write_field_stop(&mut self) {
        self.buf.put_u8(TType::Stop as u8);
    }

    /// Write a boolean value.
    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(value as u8);
    }

    /// Write a signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    /// Write a 16-bit integer.
    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    /// Write a 32-bit integer.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Write a 64-bit integer.
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    /// Write a 64-bit float.
    pub fn write_double(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    /// Write a length-prefixed string.
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Write length-prefixed binary data.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.buf.put_i32(value.len() as i32);
        self.buf.put_slice(value);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether anything has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish and take the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Decoder consuming one reply message from an async byte source
pub struct MessageReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin + Send> MessageReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub(crate) async fn read_u8(&mut self) -> Result<u8, TransportError> {
        self.inner.read_u8().await.map_err(TransportError::Read)
    }

    pub(crate) async fn read_i16(&mut self) -> Result<i16, TransportError> {
        self.inner.read_i16().await.map_err(TransportError::Read)
    }

    pub(crate) async fn read_i32(&mut self) -> Result<i32, TransportError> {
        self.inner.read_i32().await.map_err(TransportError::Read)
    }

    pub(crate) async fn read_i64(&mut self) -> Result<i64, TransportError> {
        self.inner.read_i64().await.map_err(TransportError::Read)
    }

    pub(crate) async fn read_f64(&mut self) -> Result<f64, TransportError> {
        self.inner.read_f64().await.map_err(TransportError::Read)
    }

    pub(crate) async fn read_binary(&mut self) -> Result<Vec<u8>, TransportError> {
        let len = self.read_i32().await?;
        if !(0..=MAX_WIRE_LENGTH).contains(&len) {
            return Err(TransportError::Malformed(format!(
                "unreasonable length on the wire: {len}"
            )));
        }
        let mut buf = vec![0u8; len as usize];
        self.inner
            .read_exact(&mut buf)
            .await
            .map_err(TransportError::Read)?;
        Ok(buf)
    }

    async fn read_ttype(&mut self) -> Result<TType, TransportError> {
        let raw = self.read_u8().await?;
        TType::from_u8(raw)
            .ok_or_else(|| TransportError::Malformed(format!("unknown field type {raw}")))
    }

    /// Read the strict message header: name, type, sequence id.
    pub async fn read_message_begin(&mut self) -> Result<(String, MessageType, i32), TransportError> {
        let header = self.read_i32().await? as u32;
        if header & VERSION_MASK != VERSION_1 {
            return Err(TransportError::Malformed(format!(
                "bad protocol version word: {header:#010x}"
            )));
        }
        let message_type = MessageType::from_i32((header & 0xff) as i32).ok_or_else(|| {
            TransportError::Malformed(format!("unknown message type {}", header & 0xff))
        })?;
        let name_bytes = self.read_binary().await?;
        let name = String::from_utf8(name_bytes)
            .map_err(|_| TransportError::Malformed("method name is not UTF-8".to_string()))?;
        let sequence_id = self.read_i32().await?;
        Ok((name, message_type, sequence_id))
    }

    /// Skip one value of the given type without materializing it.
    pub async fn skip(&mut self, ttype: TType) -> Result<(), TransportError> {
        match ttype {
            TType::Stop | TType::Void => Ok(()),
            TType::Bool | TType::Byte => {
                self.read_u8().await?;
                Ok(())
            }
            TType::Double => {
                self.read_f64().await?;
                Ok(())
            }
            TType::I16 => {
                self.read_i16().await?;
                Ok(())
            }
            TType::I32 => {
                self.read_i32().await?;
                Ok(())
            }
            TType::I64 => {
                self.read_i64().await?;
                Ok(())
            }
            TType::String => {
                self.read_binary().await?;
                Ok(())
            }
            TType::Struct => loop {
                let field_type = self.read_ttype().await?;
                if field_type == TType::Stop {
                    return Ok(());
                }
                self.read_i16().await?;
                Box::pin(self.skip(field_type)).await?;
            },
            TType::Map => {
                let key_type = self.read_ttype().await?;
                let value_type = self.read_ttype().await?;
                let size = self.read_container_size().await?;
                for _ in 0..size {
                    Box::pin(self.skip(key_type)).await?;
                    Box::pin(self.skip(value_type)).await?;
                }
                Ok(())
            }
            TType::Set | TType::List => {
                let element_type = self.read_ttype().await?;
                let size = self.read_container_size().await?;
                for _ in 0..size {
                    Box::pin(self.skip(element_type)).await?;
                }
                Ok(())
            }
        }
    }

    async fn read_container_size(&mut self) -> Result<i32, TransportError> {
        let size = self.read_i32().await?;
        if !(0..=MAX_WIRE_LENGTH).contains(&size) {
            return Err(TransportError::Malformed(format!(
                "unreasonable container size: {size}"
            )));
        }
        Ok(size)
    }

    /// Decode a TApplicationException struct: message (field 1) and numeric
    /// kind (field 2); unknown fields are skipped.
    pub async fn read_application_exception(&mut self) -> Result<(String, i32), TransportError> {
        let mut message = String::new();
        let mut code = 0i32;

        loop {
            let field_type = self.read_ttype().await?;
            if field_type == TType::Stop {
                break;
            }
            let field_id = self.read_i16().await?;
            match (field_id, field_type) {
                (1, TType::String) => {
                    message = String::from_utf8_lossy(&self.read_binary().await?).into_owned();
                }
                (2, TType::I32) => {
                    code = self.read_i32().await?;
                }
                (_, other) => self.skip(other).await?,
            }
        }

        Ok((message, code))
    }

    /// Consume one complete reply message and classify it.
    ///
    /// A `Reply` has its result struct skipped (the body is irrelevant to the
    /// benchmark); an `Exception` is decoded and classified by its kind code.
    pub async fn read_reply_outcome(&mut self) -> Result<ReplyOutcome, TransportError> {
        let (_name, message_type, _sequence_id) = self.read_message_begin().await?;
        match message_type {
            MessageType::Reply => {
                self.skip(TType::Struct).await?;
                Ok(ReplyOutcome::Success)
            }
            MessageType::Exception => {
                let (message, code) = self.read_application_exception().await?;
                tracing::debug!(code, %message, "server replied with application exception");
                Ok(ReplyOutcome::Exception(ErrorKind::from_code(code)))
            }
            other => Err(TransportError::Malformed(format!(
                "unexpected {other:?} message in reply position"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: Bytes) -> MessageReader<Cursor<Vec<u8>>> {
        MessageReader::new(Cursor::new(bytes.to_vec()))
    }

    #[tokio::test]
    async fn test_message_header_round_trip() {
        let mut writer = MessageWriter::new();
        writer.write_message_begin("ping", MessageType::Call, 7);

        let (name, message_type, sequence_id) = reader(writer.into_bytes())
            .read_message_begin()
            .await
            .unwrap();
        assert_eq!(name, "ping");
        assert_eq!(message_type, MessageType::Call);
        assert_eq!(sequence_id, 7);
    }

    #[tokio::test]
    async fn test_reply_with_result_struct_is_success() {
        let mut writer = MessageWriter::new();
        writer.write_message_begin("ping", MessageType::Reply, 0);
        writer.write_field_begin(TType::I32, 0);
        writer.write_i32(42);
        writer.write_field_stop();

        let outcome = reader(writer.into_bytes()).read_reply_outcome().await.unwrap();
        assert_eq!(outcome, ReplyOutcome::Success);
    }

    #[tokio::test]
    async fn test_exception_reply_classifies_kind() {
        let mut writer = MessageWriter::new();
        writer.write_message_begin("ping", MessageType::Exception, 0);
        writer.write_field_begin(TType::String, 1);
        writer.write_string("unknown method 'ping'");
        writer.write_field_begin(TType::I32, 2);
        writer.write_i32(1);
        writer.write_field_stop();

        let outcome = reader(writer.into_bytes()).read_reply_outcome().await.unwrap();
        assert_eq!(
            outcome,
            ReplyOutcome::Exception(ErrorKind::UnknownMethod)
        );
    }

    #[tokio::test]
    async fn test_exception_with_unrecognized_code_passes_through() {
        let mut writer = MessageWriter::new();
        writer.write_message_begin("ping", MessageType::Exception, 0);
        writer.write_field_begin(TType::I32, 2);
        writer.write_i32(42);
        writer.write_field_stop();

        let outcome = reader(writer.into_bytes()).read_reply_outcome().await.unwrap();
        assert_eq!(outcome, ReplyOutcome::Exception(ErrorKind::Other(42)));
    }

    #[tokio::test]
    async fn test_skip_traverses_nested_values() {
        // struct { 1: string, 2: struct { 1: i64 }, 3: list<i32>, 4: map<i32,string> }
        let mut bytes = BytesMut::new();
        bytes.put_u8(TType::String as u8);
        bytes.put_i16(1);
        bytes.put_i32(7);
        bytes.put_slice(b"payload");

        bytes.put_u8(TType::Struct as u8);
        bytes.put_i16(2);
        bytes.put_u8(TType::I64 as u8);
        bytes.put_i16(1);
        bytes.put_i64(9);
        bytes.put_u8(TType::Stop as u8);

        bytes.put_u8(TType::List as u8);
        bytes.put_i16(3);
        bytes.put_u8(TType::I32 as u8);
        bytes.put_i32(2);
        bytes.put_i32(11);
        bytes.put_i32(22);

        bytes.put_u8(TType::Map as u8);
        bytes.put_i16(4);
        bytes.put_u8(TType::I32 as u8);
        bytes.put_u8(TType::String as u8);
        bytes.put_i32(1);
        bytes.put_i32(5);
        bytes.put_i32(1);
        bytes.put_slice(b"x");

        bytes.put_u8(TType::Stop as u8);
        // trailing sentinel proves the skip stopped at the right offset
        bytes.put_i32(0x5EED);

        let mut reader = MessageReader::new(Cursor::new(bytes.to_vec()));
        reader.skip(TType::Struct).await.unwrap();
        let sentinel = reader.read_i32().await.unwrap();
        assert_eq!(sentinel, 0x5EED);
    }

    #[tokio::test]
    async fn test_bad_version_word_is_malformed() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(0x1234_0001);

        let result = MessageReader::new(Cursor::new(bytes.to_vec()))
            .read_message_begin()
            .await;
        assert!(matches!(result, Err(TransportError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_call_in_reply_position_is_malformed() {
        let mut writer = MessageWriter::new();
        writer.write_message_begin("ping", MessageType::Call, 0);
        writer.write_field_stop();

        let result = reader(writer.into_bytes()).read_reply_outcome().await;
        assert!(matches!(result, Err(TransportError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_truncated_reply_is_read_error() {
        let mut writer = MessageWriter::new();
        writer.write_message_begin("ping", MessageType::Reply, 0);
        // No result struct follows: the skip hits EOF.

        let result = reader(writer.into_bytes()).read_reply_outcome().await;
        assert!(matches!(result, Err(TransportError::Read(_))));
    }

    #[test]
    fn test_writer_is_deterministic() {
        let encode = || {
            let mut writer = MessageWriter::new();
            writer.write_message_begin("get_user", MessageType::Call, 0);
            writer.write_field_begin(TType::I64, 1);
            writer.write_i64(42);
            writer.write_field_stop();
            writer.into_bytes()
        };
        assert_eq!(encode(), encode());
    }
}
