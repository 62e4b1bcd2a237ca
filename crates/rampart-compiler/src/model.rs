//! Compiled services, methods and bindings.

use std::fmt;
use std::sync::Arc;

use rampart_httprule::Template;
use rampart_schema::{Field, Message};

/// One resolved segment of a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPathComponent {
    /// The segment as written in the selector.
    pub name: String,
    /// FQMN of the message declaring `target`.
    pub owner: String,
    pub target: Arc<Field>,
}

/// A resolved dotted field path, rooted at some message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<FieldPathComponent>);

impl FieldPath {
    pub fn new(components: Vec<FieldPathComponent>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[FieldPathComponent] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The field the path ends at.
    pub fn target(&self) -> Option<&Arc<Field>> {
        self.0.last().map(|c| &c.target)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&component.name)?;
        }
        Ok(())
    }
}

/// A path parameter of a binding.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// FQMN of the owning method.
    pub method: String,
    pub field_path: FieldPath,
    /// Terminal field of `field_path`.
    pub target: Arc<Field>,
}

/// Body selector. An empty path binds the whole message.
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub field_path: FieldPath,
}

impl Body {
    pub fn is_whole_message(&self) -> bool {
        self.field_path.is_empty()
    }
}

/// One HTTP exposure of a method.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Position among the method's bindings.
    pub index: usize,
    pub http_method: String,
    pub path_tmpl: Template,
    pub path_params: Vec<Parameter>,
    /// `None`: no body binding.
    pub body: Option<Body>,
    /// `None`: the whole response is the body.
    pub response_body: Option<Body>,
}

/// An RPC method with its HTTP bindings.
#[derive(Debug)]
pub struct Method {
    pub name: String,
    /// FQSN of the owning service.
    pub service: String,
    pub request_type: Arc<Message>,
    pub response_type: Arc<Message>,
    pub client_streaming: bool,
    pub server_streaming: bool,
    /// Possibly empty; an unbound method is not exposed over HTTP.
    pub bindings: Vec<Binding>,
}

impl Method {
    /// Fully-qualified method name, e.g. `.compute.v1.InstanceService.Show`.
    pub fn fqmn(&self) -> String {
        format!("{}.{}", self.service, self.name)
    }

    pub fn is_exposed(&self) -> bool {
        !self.bindings.is_empty()
    }
}

/// A service of one schema file.
#[derive(Debug)]
pub struct Service {
    pub name: String,
    pub package: String,
    /// File the service is declared in.
    pub file: String,
    /// Report the package-prefixed name (standalone mode).
    pub force_prefixed_name: bool,
    pub methods: Vec<Arc<Method>>,
}

impl Service {
    /// Fully-qualified service name with a leading dot.
    pub fn fqsn(&self) -> String {
        fqsn(&self.package, &self.name)
    }

    /// Name under which the service is reported.
    pub fn instance_name(&self) -> String {
        if self.force_prefixed_name && !self.package.is_empty() {
            format!("{}.{}", self.package, self.name)
        } else {
            self.name.clone()
        }
    }

    /// Methods with at least one binding.
    pub fn exposed_methods(&self) -> impl Iterator<Item = &Arc<Method>> {
        self.methods.iter().filter(|m| m.is_exposed())
    }
}

/// `.package.Service`, or `.Service` in the root namespace.
pub fn fqsn(package: &str, service: &str) -> String {
    if package.is_empty() {
        format!(".{}", service)
    } else {
        format!(".{}.{}", package, service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_schema::FieldKind;

    fn component(name: &str) -> FieldPathComponent {
        FieldPathComponent {
            name: name.to_string(),
            owner: ".test.Msg".to_string(),
            target: Arc::new(Field::new(name, FieldKind::String)),
        }
    }

    fn service(package: &str, prefixed: bool) -> Service {
        Service {
            name: "EchoService".to_string(),
            package: package.to_string(),
            file: "echo.proto".to_string(),
            force_prefixed_name: prefixed,
            methods: Vec::new(),
        }
    }

    #[test]
    fn field_path_display_joins_segments() {
        let path = FieldPath::new(vec![component("metadata"), component("uid")]);
        assert_eq!(path.to_string(), "metadata.uid");
        assert_eq!(path.target().unwrap().name(), "uid");
        assert_eq!(FieldPath::default().to_string(), "");
    }

    #[test]
    fn fqsn_with_and_without_package() {
        assert_eq!(fqsn("example.v1", "Echo"), ".example.v1.Echo");
        assert_eq!(fqsn("", "Echo"), ".Echo");
    }

    #[test]
    fn instance_name_honors_standalone() {
        assert_eq!(service("example", false).instance_name(), "EchoService");
        assert_eq!(service("example", true).instance_name(), "example.EchoService");
        assert_eq!(service("", true).instance_name(), "EchoService");
        assert_eq!(service("example", true).fqsn(), ".example.EchoService");
    }

    #[test]
    fn whole_message_body() {
        assert!(Body::default().is_whole_message());
        let body = Body {
            field_path: FieldPath::new(vec![component("payload")]),
        };
        assert!(!body.is_whole_message());
    }
}
