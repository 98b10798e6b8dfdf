//! Shared serializer configuration.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use crate::convert::{dynamic_map_converter, dynamic_value_converter, Converter};

/// The list of active value converters.
///
/// Built once and never mutated afterwards; there are no post-construction
/// setters. That immutability is what makes sharing one configuration across
/// threads safe without a lock: every adapter holds an `Arc` to the same
/// read-only value, and all per-call state lives on the calling thread's
/// stack.
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    converters: Vec<Converter>,
}

impl SerializerConfig {
    /// A configuration with the dynamic value converters installed: one for
    /// the ordered string-to-value mapping type, one for the value type
    /// itself.
    pub fn new() -> Self {
        Self::with_converters(vec![dynamic_map_converter(), dynamic_value_converter()])
    }

    /// A configuration with an explicit converter list. Entries are
    /// consulted in the order given; the first applicable one wins.
    pub fn with_converters(converters: Vec<Converter>) -> Self {
        Self { converters }
    }

    /// The process-wide shared configuration, built on first use.
    pub fn shared() -> Arc<SerializerConfig> {
        static SHARED: OnceLock<Arc<SerializerConfig>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(SerializerConfig::new()))
            .clone()
    }

    /// Finds the first converter whose applicability test accepts the target
    /// type. `None` means the target falls back to default type-driven
    /// serialization.
    pub fn converter_for(&self, target: TypeId) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|converter| (converter.applies)(target))
    }
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Map, Value};

    #[test]
    fn first_match_wins() {
        let catch_all = Converter {
            applies: |_| true,
            ..dynamic_value_converter()
        };
        let config =
            SerializerConfig::with_converters(vec![catch_all, dynamic_map_converter()]);

        // Both entries apply to `Map`; the registry must pick the first. The
        // catch-all is recognizable by accepting any type id.
        let picked = config.converter_for(TypeId::of::<Map>()).unwrap();
        assert!((picked.applies)(TypeId::of::<String>()));
    }

    #[test]
    fn unknown_types_fall_through() {
        let config = SerializerConfig::new();
        assert!(config.converter_for(TypeId::of::<Map>()).is_some());
        assert!(config.converter_for(TypeId::of::<Value>()).is_some());
        assert!(config.converter_for(TypeId::of::<String>()).is_none());
    }

    #[test]
    fn shared_config_is_one_instance() {
        assert!(Arc::ptr_eq(
            &SerializerConfig::shared(),
            &SerializerConfig::shared()
        ));
    }
}
