//! The single-key JSON envelope every response is wrapped in.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer, ser::SerializeMap as _};

/// Serialises as `{ key: payload }`.
#[derive(Debug)]
pub struct Envelope<T> {
  key:     &'static str,
  payload: T,
}

pub fn envelope<T: Serialize>(key: &'static str, payload: T) -> Envelope<T> {
  Envelope { key, payload }
}

impl<T: Serialize> Serialize for Envelope<T> {
  fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(self.key, &self.payload)?;
    map.end()
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response { Json(self).into_response() }
}

/// Acknowledgement body for writes that return no entity.
#[derive(Debug, Serialize)]
pub struct Ack {
  pub ok:      bool,
  pub message: String,
}

/// `{"response": {"ok": true, "message": ""}}`
pub fn ok() -> Envelope<Ack> {
  envelope("response", Ack { ok: true, message: String::new() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn envelope_has_exactly_one_key() {
    let json = serde_json::to_value(envelope("threads", vec![1, 2])).unwrap();
    assert_eq!(json, serde_json::json!({ "threads": [1, 2] }));
  }

  #[test]
  fn ack_shape() {
    let json = serde_json::to_value(ok()).unwrap();
    assert_eq!(json, serde_json::json!({ "response": { "ok": true, "message": "" } }));
  }
}
