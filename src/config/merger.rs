//! Layering of settings documents.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences and scalars in the upper layer replace the lower value
//! - A `null` in the upper layer removes the key, restoring the default

use serde_yaml::Value;

/// Lay `upper` over `lower`.
pub fn deep_merge(lower: &Value, upper: &Value) -> Value {
    match (lower, upper) {
        (Value::Mapping(lower_map), Value::Mapping(upper_map)) => {
            let mut merged = lower_map.clone();

            for (key, upper_value) in upper_map {
                if upper_value.is_null() {
                    merged.remove(key);
                    continue;
                }
                let value = match lower_map.get(key) {
                    Some(lower_value) => deep_merge(lower_value, upper_value),
                    None => upper_value.clone(),
                };
                merged.insert(key.clone(), value);
            }

            Value::Mapping(merged)
        }
        (_, upper) => upper.clone(),
    }
}

/// Merge layers in order; the last layer has the highest priority.
pub fn merge_layers(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}
