//! Ordered collection of untrained models

use super::config::ModelSpec;
use super::models::Model;
use crate::error::{EvalError, Result};

/// Name → untrained model mapping that remembers insertion order.
///
/// Insertion order is the order models are evaluated and reported in.
#[derive(Default)]
pub struct ModelRegistry {
    entries: Vec<(String, Box<dyn Model>)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration entries
    pub fn from_specs(specs: &[ModelSpec]) -> Result<Self> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec.name(), spec.build())?;
        }
        Ok(registry)
    }

    /// Add a model under a unique name
    pub fn register(&mut self, name: impl Into<String>, model: Box<dyn Model>) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(EvalError::DuplicateModel(name));
        }
        self.entries.push((name, model));
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_model(mut self, name: impl Into<String>, model: Box<dyn Model>) -> Result<Self> {
        self.register(name, model)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Registered names in evaluation order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ModelRegistry {
    type Item = (String, Box<dyn Model>);
    type IntoIter = std::vec::IntoIter<(String, Box<dyn Model>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{MajorityClass, ModelType};

    #[test]
    fn test_insertion_order() {
        let registry = ModelRegistry::new()
            .with_model("b", Box::new(MajorityClass::new()))
            .unwrap()
            .with_model("a", Box::new(MajorityClass::new()))
            .unwrap()
            .with_model("c", Box::new(MajorityClass::new()))
            .unwrap();

        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        let consumed: Vec<String> = registry.into_iter().map(|(n, _)| n).collect();
        assert_eq!(consumed, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_name() {
        let mut registry = ModelRegistry::new();
        registry.register("KNN", Box::new(MajorityClass::new())).unwrap();
        let err = registry.register("KNN", Box::new(MajorityClass::new())).unwrap_err();

        assert!(matches!(err, EvalError::DuplicateModel(name) if name == "KNN"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_specs() {
        let specs = vec![
            ModelSpec::new(ModelType::knn()),
            ModelSpec::new(ModelType::Majority).with_name("Baseline"),
        ];
        let registry = ModelRegistry::from_specs(&specs).unwrap();
        assert_eq!(registry.names(), vec!["KNN", "Baseline"]);
    }

    #[test]
    fn test_from_specs_rejects_duplicates() {
        let specs = vec![ModelSpec::new(ModelType::knn()), ModelSpec::new(ModelType::knn())];
        assert!(matches!(
            ModelRegistry::from_specs(&specs),
            Err(EvalError::DuplicateModel(_))
        ));
    }
}
