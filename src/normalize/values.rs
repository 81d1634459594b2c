use std::collections::{BTreeMap, HashMap};

use crate::types::Value;

/// Read-only lookup from variant spellings to their canonical spelling
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    mappings: HashMap<String, String>,
}

impl ValueMap {
    pub fn new(mappings: &BTreeMap<String, String>) -> Self {
        Self {
            mappings: mappings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Canonical spelling for `value`, if it is a known variant
    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.mappings.get(value).map(String::as_str)
    }

    /// Replace a known variant; anything else passes through
    pub fn canonicalize(&self, value: Option<Value>) -> Option<Value> {
        match value {
            Some(Value::Text(s)) => match self.lookup(&s) {
                Some(canonical) => Some(Value::text(canonical)),
                None => Some(Value::Text(s)),
            },
            other => other,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_map() -> ValueMap {
        let mut m = BTreeMap::new();
        m.insert("biobio".to_string(), "bio bio".to_string());
        m.insert("iquique".to_string(), "tarapaca".to_string());
        ValueMap::new(&m)
    }

    #[test]
    fn test_known_variant_mapped() {
        let map = region_map();
        assert_eq!(
            map.canonicalize(Some(Value::text("biobio"))),
            Some(Value::text("bio bio"))
        );
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_unknown_value_passes_through() {
        let map = region_map();
        assert_eq!(
            map.canonicalize(Some(Value::text("valparaiso"))),
            Some(Value::text("valparaiso"))
        );
        assert_eq!(map.canonicalize(None), None);
        assert_eq!(map.canonicalize(Some(Value::Number(1.0))), Some(Value::Number(1.0)));
    }
}
