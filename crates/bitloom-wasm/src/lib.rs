//! WASM bindings for the `bitloom` bit-packing engine.
//!
//! JavaScript describes its containers once as a JSON schema document (see
//! `bitloom::serde::SchemaDocument`), then packs objects into integers and
//! unpacks integers into objects by container name.
//!
//! ```text
//! // const set = new WasmSchemaSet(JSON.stringify({
//! //   enums: [{ name: "Mode", variants: [{ name: "Off", value: 0 }, { name: "On", value: 1 }], fallback: "Off" }],
//! //   containers: [{
//! //     name: "Control",
//! //     storage: "u8",
//! //     fields: [
//! //       { name: "mode", type: "Mode", bits: 1, custom: { backing: "u8", base: "Enum" } },
//! //       { name: "level", type: "u8", bits: 7, default: 5 }
//! //     ]
//! //   }]
//! // }));
//! //
//! // set.pack("Control", { mode: "On" });   // 11n
//! // set.unpack("Control", 11n);            // { level: 5, mode: "On" }
//! ```
//!
//! Objects map field names to booleans, numbers, enum variant names, or
//! nested objects. Integers beyond `Number.MAX_SAFE_INTEGER` in either
//! direction come back as BigInt. Errors are returned as strings.

mod convert;

use bitloom::{
    schema::Schema,
    serde::{SchemaDocument, SchemaSet},
    snapshot::Snapshot,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Schemas registered from one JSON document.
#[wasm_bindgen]
pub struct WasmSchemaSet {
    set: SchemaSet,
}

#[derive(Serialize)]
struct FieldLayout<'a> {
    name: &'a str,
    bits: u32,
    offset: u32,
}

#[wasm_bindgen]
impl WasmSchemaSet {
    /// Parses and registers a schema document.
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: &str) -> Result<WasmSchemaSet, JsValue> {
        let document: SchemaDocument =
            serde_json::from_str(document_json).map_err(convert::error_to_js)?;
        let set = SchemaSet::try_from(document).map_err(convert::error_to_js)?;
        Ok(WasmSchemaSet { set })
    }

    /// Packs `obj` into `container`. Fields missing from `obj` keep their
    /// defaults.
    pub fn pack(&self, container: &str, obj: JsValue) -> Result<u64, JsValue> {
        let schema = self.schema(container)?;
        let mut snapshot = schema.defaulted();

        for (name, literal) in convert::literals_from_js(obj)? {
            let field = schema
                .field(&name)
                .ok_or_else(|| convert::error_to_js(format!("`{container}` has no field `{name}`")))?;
            let value = self
                .set
                .literal_value(field.ty(), &literal)
                .map_err(convert::error_to_js)?;
            snapshot.set(&name, value).map_err(convert::error_to_js)?;
        }

        Ok(snapshot.pack())
    }

    /// Unpacks `raw` into an object of field values.
    pub fn unpack(&self, container: &str, raw: u64) -> Result<JsValue, JsValue> {
        self.with_schema(container, |schema| schema.unpack(raw))
    }

    /// Like [WasmSchemaSet::unpack], with declared defaults overriding the
    /// decoded values.
    pub fn unpack_with_defaults(&self, container: &str, raw: u64) -> Result<JsValue, JsValue> {
        self.with_schema(container, |schema| schema.unpack_with_defaults(raw))
    }

    pub fn defaulted(&self, container: &str) -> Result<JsValue, JsValue> {
        self.with_schema(container, Schema::defaulted)
    }

    pub fn zeroed(&self, container: &str) -> Result<JsValue, JsValue> {
        self.with_schema(container, Schema::zeroed)
    }

    /// `[{ name, bits, offset }]` for every accessible field.
    pub fn layout(&self, container: &str) -> Result<JsValue, JsValue> {
        let layout: Vec<FieldLayout> = self
            .schema(container)?
            .layout()
            .map(|(name, bits, offset)| FieldLayout { name, bits, offset })
            .collect();

        convert::to_js(&layout)
    }
}

impl WasmSchemaSet {
    fn schema(&self, container: &str) -> Result<&Schema, JsValue> {
        self.set
            .get(container)
            .ok_or_else(|| convert::error_to_js(format!("unknown container `{container}`")))
    }

    fn with_schema(
        &self,
        container: &str,
        f: impl FnOnce(&Schema) -> Snapshot,
    ) -> Result<JsValue, JsValue> {
        convert::snapshot_to_js(&f(self.schema(container)?))
    }
}
