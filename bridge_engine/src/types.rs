use serde::{Deserialize, Deserializer, Serialize, de};

use crate::errors::TranslateError;

/// Message sent by the browser extension.
///
/// Every field is optional on the wire; missing fields and explicit `null`s
/// both decode to the empty value.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub message_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub host: String,
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Reply written back to the extension, one per inbound frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl OutboundMessage {
    pub fn ok(code: u16, body: String) -> Self {
        Self {
            status: ResponseStatus::Ok,
            code: Some(code),
            message: None,
            body: non_empty(body),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            code: None,
            message: Some(message.into()),
            body: None,
        }
    }

    /// The server answered with a status of 400 or above.
    pub fn http_error(code: u16, body: String) -> Self {
        Self {
            status: ResponseStatus::Error,
            code: Some(code),
            message: Some(format!("HTTP {}", code)),
            body: non_empty(body),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

impl From<TranslateError> for OutboundMessage {
    fn from(err: TranslateError) -> Self {
        Self {
            code: err.code(),
            ..OutboundMessage::error(err.to_string())
        }
    }
}

/// JSON body posted to the media server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerRequest {
    pub url: String,
    pub action: String,
    pub params: Vec<String>,
}

fn non_empty(body: String) -> Option<String> {
    if body.is_empty() { None } else { Some(body) }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// `port` is a JSON number or a string holding a decimal number; `""` and `null` mean unset
#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(0),
        Some(PortValue::Number(port)) => Ok(port),
        Some(PortValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(0);
            }
            text.parse()
                .map_err(|_| de::Error::custom(format!("invalid port {:?}", text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn decodes_full_message() {
        let raw = json!({
            "type": "queue",
            "url": "https://example.com/watch?v=1",
            "host": "http://127.0.0.1",
            "port": 8000,
            "action": "append",
            "params": ["--mute", "--fs"],
            "token": "s3cret"
        });
        let msg: InboundMessage = serde_json::from_value(raw).unwrap();

        assert_eq!(
            msg,
            InboundMessage {
                message_type: "queue".into(),
                url: "https://example.com/watch?v=1".into(),
                host: "http://127.0.0.1".into(),
                port: 8000,
                action: "append".into(),
                params: vec!["--mute".into(), "--fs".into()],
                token: "s3cret".into(),
            }
        );
    }

    #[test]
    fn missing_and_null_fields_are_empty() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"url":"u","host":null,"params":null,"port":null}"#).unwrap();

        assert_eq!(msg.url, "u");
        assert_eq!(msg.host, "");
        assert_eq!(msg.port, 0);
        assert!(msg.params.is_empty());
        assert_eq!(msg.token, "");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let msg: InboundMessage = serde_json::from_str(r#"{"url":"u","extra":1}"#).unwrap();
        assert_eq!(msg.url, "u");
    }

    #[test]
    fn port_accepts_numeric_string() {
        let msg: InboundMessage = serde_json::from_str(r#"{"port":" 7000 "}"#).unwrap();
        assert_eq!(msg.port, 7000);

        let msg: InboundMessage = serde_json::from_str(r#"{"port":""}"#).unwrap();
        assert_eq!(msg.port, 0);
    }

    #[test]
    fn port_out_of_range_is_rejected() {
        assert!(serde_json::from_str::<InboundMessage>(r#"{"port":70000}"#).is_err());
        assert!(serde_json::from_str::<InboundMessage>(r#"{"port":"abc"}"#).is_err());
        assert!(serde_json::from_str::<InboundMessage>(r#"{"port":-1}"#).is_err());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(serde_json::from_str::<InboundMessage>(r#""play""#).is_err());
        assert!(serde_json::from_str::<InboundMessage>("[1,2]").is_err());
    }

    #[test]
    fn unset_fields_are_omitted() {
        let value = serde_json::to_value(OutboundMessage::error("'url' required")).unwrap();
        assert_eq!(value, json!({"status": "error", "message": "'url' required"}));

        let value = serde_json::to_value(OutboundMessage::ok(204, String::new())).unwrap();
        assert_eq!(value, json!({"status": "ok", "code": 204}));
    }

    #[test]
    fn outbound_survives_encoding() {
        let original = OutboundMessage::http_error(404, "not here".into());
        let encoded = serde_json::to_vec(&original).unwrap();
        let decoded: OutboundMessage = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(decoded, original);
        let value: Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(value["message"], "HTTP 404");
    }

    #[test]
    fn translate_error_keeps_known_status() {
        let out = OutboundMessage::from(TranslateError::invalid_host("bad scheme"));
        assert_eq!(out.status, ResponseStatus::Error);
        assert_eq!(out.code, None);
        assert_eq!(out.message.as_deref(), Some("Failed to create request: bad scheme"));
    }
}
