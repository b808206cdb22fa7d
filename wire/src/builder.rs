//! One-time request construction from schema and case definitions

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use thriftmark_core::{BenchConfig, RequestBuilder, SchemaError, Wrapper};

use crate::binary::{MessageType, MessageWriter, TType};
use crate::case::{ApiCase, CaseFile};
use crate::schema::{FieldSchema, ServiceSchema};

/// Separator between service and method names for multiplexed services.
const MULTIPLEXED_SEPARATOR: &str = ":";

/// Benchmark calls never pipeline on one connection, so a constant sequence
/// id keeps the precomputed request byte-identical across the run.
const SEQUENCE_ID: i32 = 0;

/// Builds the single request every worker replays
///
/// Schema and case sources are loaded eagerly in [`Self::from_config`], so
/// every [`SchemaError`] surfaces before a connection is opened; `build` is a
/// pure deterministic encode over the loaded state.
pub struct CaseRequestBuilder {
    schema: Option<ServiceSchema>,
    case: ApiCase,
    service: Option<String>,
    wrapper: Wrapper,
}

impl CaseRequestBuilder {
    /// Construct from already-loaded schema and case state.
    pub fn new(
        schema: Option<ServiceSchema>,
        case: ApiCase,
        service: Option<String>,
        wrapper: Wrapper,
    ) -> Self {
        Self {
            schema,
            case,
            service,
            wrapper,
        }
    }

    /// Load the schema and case sources named by the configuration.
    ///
    /// An absent case name selects the built-in ping case; a named case
    /// requires a case-definition file.
    pub fn from_config(config: &BenchConfig) -> Result<Self, SchemaError> {
        let schema = config
            .thrift_file
            .as_deref()
            .map(ServiceSchema::load)
            .transpose()?;

        let case = match config.case_name.as_deref() {
            None | Some("") => ApiCase::ping(),
            Some(name) => {
                let path = config.api_file.as_deref().ok_or_else(|| {
                    SchemaError::Parse("a case name requires --api-file".to_string())
                })?;
                CaseFile::load(path)?.get(name)?.clone()
            }
        };

        Ok(Self::new(
            schema,
            case,
            config.service.clone(),
            config.wrapper,
        ))
    }

    fn qualified_method(&self) -> String {
        match self.service.as_deref() {
            Some(service) if !service.is_empty() => {
                format!("{service}{MULTIPLEXED_SEPARATOR}{}", self.case.method)
            }
            _ => self.case.method.clone(),
        }
    }

    fn encode_args(&self, writer: &mut MessageWriter) -> Result<(), SchemaError> {
        let no_args: &[FieldSchema] = &[];
        let args = match self
            .schema
            .as_ref()
            .and_then(|schema| schema.method(&self.case.method))
        {
            Some(method) => method.args.as_slice(),
            // A method the schema does not describe is callable only with
            // zero arguments; the values would have no declared types.
            None if self.case.args.is_empty() => no_args,
            None => return Err(SchemaError::UnknownMethod(self.case.method.clone())),
        };

        for field in args {
            let value = self
                .case
                .args
                .get(&field.name)
                .ok_or_else(|| SchemaError::MissingValue(field.name.clone()))?;
            writer.write_field_begin(field.ttype, field.id);
            write_value(writer, field, value)?;
        }
        writer.write_field_stop();
        Ok(())
    }
}

impl RequestBuilder for CaseRequestBuilder {
    fn build(&self) -> Result<Bytes, SchemaError> {
        let mut writer = MessageWriter::new();
        writer.write_message_begin(&self.qualified_method(), MessageType::Call, SEQUENCE_ID);
        self.encode_args(&mut writer)?;
        let message = writer.into_bytes();

        Ok(match self.wrapper {
            Wrapper::Framed => {
                let mut framed = BytesMut::with_capacity(message.len() + 4);
                framed.put_u32(message.len() as u32);
                framed.put_slice(&message);
                framed.freeze()
            }
            Wrapper::Buffered => message,
        })
    }
}

fn write_value(
    writer: &mut MessageWriter,
    field: &FieldSchema,
    value: &Value,
) -> Result<(), SchemaError> {
    let bad = || SchemaError::BadValue(field.name.clone());
    match field.ttype {
        TType::Bool => writer.write_bool(value.as_bool().ok_or_else(bad)?),
        TType::Byte => {
            writer.write_i8(int_in_range(value, i8::MIN as i64, i8::MAX as i64).ok_or_else(bad)?
                as i8)
        }
        TType::I16 => writer.write_i16(
            int_in_range(value, i16::MIN as i64, i16::MAX as i64).ok_or_else(bad)? as i16,
        ),
        TType::I32 => writer.write_i32(
            int_in_range(value, i32::MIN as i64, i32::MAX as i64).ok_or_else(bad)? as i32,
        ),
        TType::I64 => writer.write_i64(value.as_i64().ok_or_else(bad)?),
        TType::Double => writer.write_double(value.as_f64().ok_or_else(bad)?),
        TType::String => writer.write_string(value.as_str().ok_or_else(bad)?),
        other => return Err(SchemaError::UnsupportedType(format!("{other:?}"))),
    }
    Ok(())
}

fn int_in_range(value: &Value, min: i64, max: i64) -> Option<i64> {
    value.as_i64().filter(|v| (min..=max).contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::MessageReader;
    use serde_json::json;
    use std::io::Cursor;

    fn ping_builder(wrapper: Wrapper, service: Option<&str>) -> CaseRequestBuilder {
        CaseRequestBuilder::new(
            None,
            ApiCase::ping(),
            service.map(str::to_string),
            wrapper,
        )
    }

    fn charge_case(args: serde_json::Value) -> ApiCase {
        ApiCase {
            name: "charge_small".to_string(),
            method: "charge".to_string(),
            args: match args {
                Value::Object(map) => map,
                _ => panic!("case args must be an object"),
            },
        }
    }

    fn charge_schema() -> ServiceSchema {
        ServiceSchema::parse(
            "service Revenue { i64 charge(1: i64 account_id, 2: double amount, 3: string memo) }",
        )
        .unwrap()
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = ping_builder(Wrapper::Buffered, None);
        assert_eq!(builder.build().unwrap(), builder.build().unwrap());
    }

    #[tokio::test]
    async fn test_ping_request_round_trips() {
        let request = ping_builder(Wrapper::Buffered, None).build().unwrap();

        let mut reader = MessageReader::new(Cursor::new(request.to_vec()));
        let (name, message_type, sequence_id) = reader.read_message_begin().await.unwrap();
        assert_eq!(name, "ping");
        assert_eq!(message_type, MessageType::Call);
        assert_eq!(sequence_id, 0);
        // Empty argument struct follows.
        reader.skip(TType::Struct).await.unwrap();
    }

    #[tokio::test]
    async fn test_multiplexed_service_prefixes_method_name() {
        let request = ping_builder(Wrapper::Buffered, Some("Revenue")).build().unwrap();

        let mut reader = MessageReader::new(Cursor::new(request.to_vec()));
        let (name, _, _) = reader.read_message_begin().await.unwrap();
        assert_eq!(name, "Revenue:ping");
    }

    #[test]
    fn test_framed_request_carries_length_prefix() {
        let buffered = ping_builder(Wrapper::Buffered, None).build().unwrap();
        let framed = ping_builder(Wrapper::Framed, None).build().unwrap();

        assert_eq!(framed.len(), buffered.len() + 4);
        let prefix = u32::from_be_bytes([framed[0], framed[1], framed[2], framed[3]]);
        assert_eq!(prefix as usize, buffered.len());
        assert_eq!(&framed[4..], &buffered[..]);
    }

    #[tokio::test]
    async fn test_schema_typed_args_encode() {
        let case = charge_case(json!({ "account_id": 42, "amount": 9.5, "memo": "latte" }));
        let builder =
            CaseRequestBuilder::new(Some(charge_schema()), case, None, Wrapper::Buffered);
        let request = builder.build().unwrap();

        let mut reader = MessageReader::new(Cursor::new(request.to_vec()));
        let (name, _, _) = reader.read_message_begin().await.unwrap();
        assert_eq!(name, "charge");
        // field 1: i64 42
        assert_eq!(reader.read_u8().await.unwrap(), TType::I64 as u8);
        assert_eq!(reader.read_i16().await.unwrap(), 1);
        assert_eq!(reader.read_i64().await.unwrap(), 42);
        // field 2: double 9.5
        assert_eq!(reader.read_u8().await.unwrap(), TType::Double as u8);
        assert_eq!(reader.read_i16().await.unwrap(), 2);
        assert_eq!(reader.read_f64().await.unwrap(), 9.5);
        // field 3: string "latte"
        assert_eq!(reader.read_u8().await.unwrap(), TType::String as u8);
        assert_eq!(reader.read_i16().await.unwrap(), 3);
        assert_eq!(reader.read_binary().await.unwrap(), b"latte");
        // stop
        assert_eq!(reader.read_u8().await.unwrap(), TType::Stop as u8);
    }

    #[test]
    fn test_missing_argument_value() {
        let case = charge_case(json!({ "account_id": 42 }));
        let builder =
            CaseRequestBuilder::new(Some(charge_schema()), case, None, Wrapper::Buffered);
        assert!(matches!(
            builder.build(),
            Err(SchemaError::MissingValue(name)) if name == "amount"
        ));
    }

    #[test]
    fn test_mistyped_argument_value() {
        let case = charge_case(json!({ "account_id": "not-a-number", "amount": 1.0, "memo": "" }));
        let builder =
            CaseRequestBuilder::new(Some(charge_schema()), case, None, Wrapper::Buffered);
        assert!(matches!(
            builder.build(),
            Err(SchemaError::BadValue(name)) if name == "account_id"
        ));
    }

    #[test]
    fn test_args_without_schema_entry() {
        let case = charge_case(json!({ "account_id": 42, "amount": 1.0, "memo": "" }));
        let builder = CaseRequestBuilder::new(None, case, None, Wrapper::Buffered);
        assert!(matches!(
            builder.build(),
            Err(SchemaError::UnknownMethod(name)) if name == "charge"
        ));
    }

    #[test]
    fn test_zero_arg_method_needs_no_schema() {
        let case = ApiCase {
            name: "reset".to_string(),
            method: "reset".to_string(),
            args: serde_json::Map::new(),
        };
        let builder = CaseRequestBuilder::new(None, case, None, Wrapper::Buffered);
        assert!(builder.build().is_ok());
    }
}
