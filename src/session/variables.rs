use crate::eval::wire::VariableValue;
use std::collections::BTreeMap;

/// Bindings produced by assignment expressions, sent back with every request
/// so later drawings can refer to earlier results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    bindings: BTreeMap<String, VariableValue>,
}

impl VariableStore {
    /// Last write wins, within a batch and across batches.
    pub fn record_assignment(&mut self, name: impl Into<String>, value: VariableValue) {
        let name = name.into();
        tracing::debug!(%name, %value, "variable bound");
        self.bindings.insert(name, value);
    }

    pub fn snapshot(&self) -> BTreeMap<String, VariableValue> {
        self.bindings.clone()
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.bindings.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableValue)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
