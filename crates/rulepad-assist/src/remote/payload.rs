use crate::types::*;
use serde_json::Value;

/// One hint as sent by a plugin endpoint, before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHint {
    pub text: String,
    pub label: Option<String>,
    pub is_key: bool,
    pub help: Option<String>,
}

/// Validated hint response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintPayload {
    pub items: Vec<RawHint>,
    pub position: InsertPosition,
    pub offset: usize,
}

/// Accepts `[..]` or `{ "list": [..], "position": .., "offset": .. }`
///
/// Items are strings or `{ "value", "label"|"display", "isKey", "help" }`;
/// anything else is skipped.
pub fn parse_payload(data: &Value) -> AssistResult<HintPayload> {
    let (list, position, offset) = match data {
        Value::Array(list) => (list, InsertPosition::Word, 0),
        Value::Object(map) => {
            let Some(Value::Array(list)) = map.get("list") else {
                return Err(AssistError::InvalidResponse(
                    "expected an array or an object with a list".to_string(),
                ));
            };
            let position = match map.get("position").and_then(Value::as_str) {
                Some("cursor") => InsertPosition::Cursor,
                Some("tail") => InsertPosition::Tail,
                _ => InsertPosition::Word,
            };
            (list, position, parse_offset(map.get("offset")))
        }
        other => {
            return Err(AssistError::InvalidResponse(format!(
                "unexpected hint payload: {}",
                type_name(other)
            )))
        }
    };

    let items = list.iter().filter_map(parse_item).collect();
    Ok(HintPayload {
        items,
        position,
        offset,
    })
}

fn parse_item(item: &Value) -> Option<RawHint> {
    match item {
        Value::String(text) => Some(RawHint {
            text: text.trim().to_string(),
            label: None,
            is_key: false,
            help: None,
        }),
        Value::Object(map) => {
            let text = map.get("value").and_then(Value::as_str)?.trim().to_string();
            let label = ["label", "display"]
                .iter()
                .filter_map(|field| map.get(*field).and_then(Value::as_str))
                .map(str::trim)
                .find(|label| !label.is_empty())
                .map(str::to_string);
            Some(RawHint {
                text,
                label,
                is_key: map.get("isKey").and_then(Value::as_bool).unwrap_or(false),
                help: map.get("help").and_then(Value::as_str).map(str::to_string),
            })
        }
        _ => None,
    }
}

fn parse_offset(offset: Option<&Value>) -> usize {
    match offset {
        Some(Value::Number(n)) => n.as_f64().filter(|n| *n > 0.0).map_or(0, |n| n as usize),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok().filter(|n| *n > 0).map_or(0, |n| n as usize),
        _ => 0,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
