// nrcq - CLI for the NagRestConf REST API
// Copyright (C) 2014  Mark Clarkson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Request payloads and response parsing for a single table.

use crate::error::{NrcqError, Result};
use crate::registry::ResourceSchema;
use serde_json::{Map, Value};
use tracing::debug;
use url::form_urlencoded;

/// What a handler is bound to: a table schema, or one of the
/// maintenance endpoints that only return free-form output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Table(&'static ResourceSchema),
    Check,
    ApplyConfig,
    LastGood,
    Restart,
}

/// A row from a table, values in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<(&'static str, String)>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(name, value)| (*name, value.as_str()))
    }

    fn from_pairs(schema: &ResourceSchema, pairs: &[(&str, &Value)]) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| {
                let value = pairs
                    .iter()
                    .rev()
                    .find(|(key, _)| key == field)
                    .map(|(_, v)| value_to_str(v))
                    .unwrap_or_default();
                (*field, value)
            })
            .collect();
        Self { values }
    }
}

/// Parsed server output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Records(Vec<Record>),
    Lines(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ResourceHandler {
    kind: HandlerKind,
    encode: bool,
}

impl ResourceHandler {
    pub fn new(kind: HandlerKind, encode: bool) -> Self {
        Self { kind, encode }
    }

    pub fn schema(&self) -> Option<&'static ResourceSchema> {
        match self.kind {
            HandlerKind::Table(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.schema().map(|s| s.fields).unwrap_or(&[])
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        self.schema().map(|s| s.required).unwrap_or(&[])
    }

    /// Turn `option:value` arguments into the request payload. Only the
    /// first colon separates, so values may contain colons themselves.
    pub fn build_request_body(&self, data: &[String]) -> Result<Map<String, Value>> {
        let mut body = Map::new();
        for datum in data {
            let (key, value) = datum
                .split_once(':')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| NrcqError::MalformedData(datum.clone()))?;
            let value = if self.encode {
                form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
            } else {
                value.to_string()
            };
            if let Some(schema) = self.schema()
                && !schema.has_field(key)
            {
                debug!(table = schema.name, option = key, "option not in local schema");
            }
            body.insert(key.to_string(), Value::String(value));
        }
        Ok(body)
    }

    pub fn parse_response(&self, raw: &str) -> Result<Response> {
        if raw.trim().is_empty() {
            return Ok(match self.kind {
                HandlerKind::Table(_) => Response::Records(Vec::new()),
                _ => Response::Lines(Vec::new()),
            });
        }
        let json: Value = serde_json::from_str(raw)
            .map_err(|e| NrcqError::InvalidResponse(format!("body is not JSON ({e})")))?;
        match self.kind {
            HandlerKind::Table(schema) => parse_records(schema, &json).map(Response::Records),
            _ => parse_lines(&json).map(Response::Lines),
        }
    }
}

// Rows come either as plain objects or, in NagRestConf's own format, as an
// array of single-key objects.
fn parse_records(schema: &ResourceSchema, json: &Value) -> Result<Vec<Record>> {
    let rows = json
        .as_array()
        .ok_or_else(|| NrcqError::InvalidResponse("expected a JSON array of rows".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let mut pairs: Vec<(&str, &Value)> = Vec::new();
        match row {
            Value::Object(map) => pairs.extend(map.iter().map(|(k, v)| (k.as_str(), v))),
            Value::Array(cells) => {
                for cell in cells {
                    let map = cell.as_object().ok_or_else(|| {
                        NrcqError::InvalidResponse(format!("row {idx} holds a non-object cell"))
                    })?;
                    pairs.extend(map.iter().map(|(k, v)| (k.as_str(), v)));
                }
            }
            _ => {
                return Err(NrcqError::InvalidResponse(format!(
                    "row {idx} is not an object"
                )));
            }
        }
        let dropped = pairs.iter().filter(|(k, _)| !schema.has_field(k)).count();
        if dropped > 0 {
            debug!(table = schema.name, row = idx, dropped, "ignoring unknown fields");
        }
        records.push(Record::from_pairs(schema, &pairs));
    }
    Ok(records)
}

fn parse_lines(json: &Value) -> Result<Vec<String>> {
    match json {
        Value::Array(items) => Ok(items.iter().map(value_to_str).collect()),
        Value::String(s) => Ok(s.lines().map(str::to_string).collect()),
        _ => Err(NrcqError::InvalidResponse(
            "expected a JSON array or string of output lines".into(),
        )),
    }
}

fn value_to_str(value: &Value) -> String {
    match value {
        Value::Null => "".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
