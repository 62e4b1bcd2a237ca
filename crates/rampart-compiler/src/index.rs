//! By-name method index of one compilation run.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CompileError;
use crate::model::Method;

/// Every method seen in a compilation run, keyed by FQMN.
///
/// Exposed and unexposed methods alike are registered, so a method whose
/// service was dropped from the HTTP surface is still resolvable here.
#[derive(Debug, Default, Clone)]
pub struct MethodIndex {
    methods: HashMap<String, Arc<Method>>,
}

impl MethodIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method. A second method with the same FQMN is an error.
    pub fn register(&mut self, method: Arc<Method>) -> Result<(), CompileError> {
        let fqmn = method.fqmn();
        if self.methods.contains_key(&fqmn) {
            return Err(CompileError::DuplicateMethod(fqmn));
        }
        self.methods.insert(fqmn, method);
        Ok(())
    }

    /// Move all entries of `other` into this index.
    pub fn merge(&mut self, other: MethodIndex) -> Result<(), CompileError> {
        if let Some(duplicate) = other.methods.keys().find(|k| self.methods.contains_key(*k)) {
            return Err(CompileError::DuplicateMethod(duplicate.clone()));
        }
        self.methods.extend(other.methods);
        Ok(())
    }

    pub fn get(&self, fqmn: &str) -> Option<&Arc<Method>> {
        self.methods.get(fqmn)
    }

    pub fn contains(&self, fqmn: &str) -> bool {
        self.methods.contains_key(fqmn)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
