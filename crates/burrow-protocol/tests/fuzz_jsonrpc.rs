//! Property-based tests for the JSON-RPC codec.
//!
//! Ensures the decoder never panics on arbitrary input and that every
//! legally constructed message survives `decode(encode(m))`.

use burrow_protocol::{
    decode, encode, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcOutput,
    JsonRpcRequest, JsonRpcResponse, Message, RequestId,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn id_strategy() -> impl Strategy<Value = RequestId> {
    prop_oneof![
        any::<i64>().prop_map(RequestId::Number),
        ((i64::MAX as u64 + 1)..=u64::MAX).prop_map(RequestId::Unsigned),
        "\\PC{0,16}".prop_map(RequestId::String),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "\\PC{0,16}".prop_map(Value::String),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Params must be structured (object or array) when present.
fn params_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        prop::collection::btree_map("[a-z]{1,8}", value_strategy(), 0..4)
            .prop_map(|m| Some(Value::Object(m.into_iter().collect()))),
        prop::collection::vec(value_strategy(), 0..4).prop_map(|v| Some(Value::Array(v))),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    prop_oneof![
        (id_strategy(), "[a-z/]{1,24}", params_strategy())
            .prop_map(|(id, m, p)| Message::Request(JsonRpcRequest::new(id, m, p))),
        ("[a-z/]{1,24}", params_strategy())
            .prop_map(|(m, p)| Message::Notification(JsonRpcNotification::new(m, p))),
        (id_strategy(), value_strategy()).prop_map(|(id, v)| {
            Message::Response(JsonRpcOutput::Success(JsonRpcResponse::success(id, v)))
        }),
        (
            id_strategy(),
            any::<i32>(),
            "\\PC{0,24}",
            prop::option::of(value_strategy())
        )
            .prop_map(|(id, code, msg, data)| {
                let mut error = JsonRpcError::new(code, msg);
                error.data = data;
                Message::Response(JsonRpcOutput::Error(JsonRpcErrorResponse::from_error(
                    id, error,
                )))
            }),
    ]
}

proptest! {
    /// Arbitrary text never causes a panic.
    #[test]
    fn no_panic_on_arbitrary_text(input in "\\PC{0,256}") {
        let _ = decode(input.as_bytes());
    }

    /// Arbitrary bytes never cause a panic.
    #[test]
    fn no_panic_on_arbitrary_bytes(input in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&input);
    }

    /// decode(encode(m)) == m for every legally constructed message.
    #[test]
    fn codec_roundtrips(msg in message_strategy()) {
        let bytes = encode(&msg).expect("encode");
        prop_assert!(!bytes.contains(&b'\n'), "encoded frame contains a newline");
        let back = decode(&bytes);
        prop_assert_eq!(back, Ok(msg));
    }

    /// Missing "jsonrpc" field is rejected but the id is recovered.
    #[test]
    fn missing_jsonrpc_field_recovers_id(method in "[a-z]{2,16}", id in 1i64..1000) {
        let line = format!(r#"{{"id":{id},"method":"{method}"}}"#);
        let err = decode(line.as_bytes()).expect_err("must be rejected");
        prop_assert_eq!(err.id(), Some(&RequestId::Number(id)));
    }

    /// Missing "method" and result/error is rejected with no id to answer.
    #[test]
    fn bare_id_is_rejected_silently(id in 1i64..1000) {
        let line = format!(r#"{{"jsonrpc":"2.0","id":{id}}}"#);
        let err = decode(line.as_bytes()).expect_err("must be rejected");
        prop_assert!(err.to_response().is_none());
    }
}
