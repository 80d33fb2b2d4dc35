//! Overlay semantics for configuration value trees.

use serde_json::Value;

/// Overlay `src` onto `dest`: mappings merge key by key, everything else
/// (including explicit nulls) replaces. Keys absent from `src` are left
/// untouched, which is what makes later files win only on the fields they
/// mention.
pub(crate) fn deep_merge(dest: &mut Value, src: Value) {
    match (dest, src) {
        (Value::Object(dest_map), Value::Object(src_map)) => {
            for (key, value) in src_map {
                match dest_map.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        dest_map.insert(key, value);
                    }
                }
            }
        }
        (dest, src) => *dest = src,
    }
}
