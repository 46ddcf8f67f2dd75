//! Explicit-type pass: amount envelopes become plain decimal strings.

use serde_json::{Map, Value};

use super::amount::Amount;
use super::MAX_DEPTH;
use crate::error::ExplorerError;

/// Replace every `{"type":"amount","value":V}` object with the decimal
/// string of `V`. Children are expanded before their parent is inspected.
pub fn expand_amounts(doc: &mut Value) -> Result<(), ExplorerError> {
    expand(doc, 0)
}

fn expand(node: &mut Value, depth: u32) -> Result<(), ExplorerError> {
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        return Err(ExplorerError::RecursionLimit);
    }

    let replacement = match node {
        Value::Array(items) => {
            for item in items.iter_mut() {
                expand(item, depth)?;
            }
            None
        }
        Value::Object(map) => {
            for (_, child) in map.iter_mut() {
                expand(child, depth)?;
            }
            amount_text(map)
        }
        _ => None,
    };

    if let Some(text) = replacement {
        *node = Value::String(text);
    }
    Ok(())
}

fn amount_text(map: &Map<String, Value>) -> Option<String> {
    match (map.get("type"), map.get("value")) {
        (Some(Value::String(t)), Some(v)) if t == "amount" => Amount::read(v).map(|a| a.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_envelope_is_flattened() {
        let mut doc = json!({
            "fee": {"type": "amount", "value": "123"},
            "height": 5,
            "label": "x"
        });
        expand_amounts(&mut doc).unwrap();
        assert_eq!(doc, json!({"fee": "123", "height": 5, "label": "x"}));
    }

    #[test]
    fn nested_in_arrays_and_signed() {
        let mut doc = json!([
            [{"type": "amount", "value": "-42"}, {"type": "amount", "value": 7}],
            {"type": "aid", "value": 3}
        ]);
        expand_amounts(&mut doc).unwrap();
        assert_eq!(doc, json!([["-42", "7"], {"type": "aid", "value": 3}]));
    }

    #[test]
    fn unreadable_amount_untouched() {
        let mut doc = json!({"type": "amount", "value": "abc"});
        expand_amounts(&mut doc).unwrap();
        assert_eq!(doc, json!({"type": "amount", "value": "abc"}));
    }

    #[test]
    fn depth_limit() {
        let mut ok = json!(1);
        for _ in 0..127 {
            ok = json!([ok]);
        }
        assert!(expand_amounts(&mut ok).is_ok());

        let mut deep = json!(1);
        for _ in 0..128 {
            deep = json!([deep]);
        }
        assert!(matches!(expand_amounts(&mut deep), Err(ExplorerError::RecursionLimit)));
    }
}
