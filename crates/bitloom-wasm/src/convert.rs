use std::collections::BTreeMap;

use bitloom::{serde::LiteralDef, snapshot::Snapshot, value::Value};
use serde::Serialize;
use wasm_bindgen::JsValue;

/// Largest integer a JS number holds exactly (`Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Field value as handed to JavaScript. Integers within the safe range become
/// numbers, larger ones become BigInt.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsValueOut {
    Bool(bool),
    Number(f64),
    U64(u64),
    I64(i64),
    Variant(String),
    Object(BTreeMap<String, JsValueOut>),
}

pub fn value_to_js(value: Value) -> JsValueOut {
    match value {
        Value::Bool(v) => JsValueOut::Bool(v),
        Value::Unsigned(v) if v <= MAX_SAFE_INTEGER => JsValueOut::Number(v as f64),
        Value::Unsigned(v) => JsValueOut::U64(v),
        Value::Signed(v) if v.unsigned_abs() <= MAX_SAFE_INTEGER => JsValueOut::Number(v as f64),
        Value::Signed(v) => JsValueOut::I64(v),
        Value::Enum(member) => JsValueOut::Variant(member.name),
        Value::Nested(snapshot) => JsValueOut::Object(snapshot_fields(&snapshot)),
    }
}

fn snapshot_fields(snapshot: &Snapshot) -> BTreeMap<String, JsValueOut> {
    snapshot
        .iter()
        .map(|(name, value)| (name.to_string(), value_to_js(value)))
        .collect()
}

pub fn snapshot_to_js(snapshot: &Snapshot) -> Result<JsValue, JsValue> {
    to_js(&snapshot_fields(snapshot))
}

/// Serializes with 64-bit integers as BigInt, so values beyond 2^53 survive.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    value.serialize(&serializer).map_err(error_to_js)
}

/// Reads a JS object of field literals.
pub fn literals_from_js(obj: JsValue) -> Result<BTreeMap<String, LiteralDef>, JsValue> {
    let raw: BTreeMap<String, serde_json::Value> =
        serde_wasm_bindgen::from_value(obj).map_err(error_to_js)?;

    raw.into_iter()
        .map(|(name, value)| Ok((name, convert_json_value(value)?)))
        .collect()
}

pub fn convert_json_value(value: serde_json::Value) -> Result<LiteralDef, JsValue> {
    serde_json::from_value(value).map_err(error_to_js)
}

pub fn error_to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
