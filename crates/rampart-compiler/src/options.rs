use serde::{Deserialize, Serialize};

/// Options for compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Expose methods without any HTTP rule as `POST /<service>/<method>`.
    pub generate_unbound_methods: bool,
    /// Log unbound methods at warn level instead of info.
    pub warn_on_unbound_methods: bool,
    /// Allow DELETE rules to bind a request body.
    pub allow_delete_body: bool,
    /// Report services under their package-prefixed name.
    pub standalone: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generate_unbound_methods(mut self, enabled: bool) -> Self {
        self.generate_unbound_methods = enabled;
        self
    }

    pub fn with_warn_on_unbound_methods(mut self, enabled: bool) -> Self {
        self.warn_on_unbound_methods = enabled;
        self
    }

    pub fn with_allow_delete_body(mut self, enabled: bool) -> Self {
        self.allow_delete_body = enabled;
        self
    }

    pub fn with_standalone(mut self, enabled: bool) -> Self {
        self.standalone = enabled;
        self
    }
}
