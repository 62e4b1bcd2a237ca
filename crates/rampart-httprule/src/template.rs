//! Compiled path templates.

use std::fmt;

/// One `/`-separated piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// `*`: matches one segment.
    Wildcard,
    /// `**`: matches the remaining segments.
    DeepWildcard,
    /// `{field.path=segments}`: captures what `segments` match into a request field.
    Variable {
        field_path: String,
        segments: Vec<Segment>,
    },
}

impl Segment {
    /// Append this segment to `out` with variables replaced by what they match.
    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Segment>) {
        match self {
            Segment::Variable { segments, .. } => {
                for segment in segments {
                    segment.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Wildcard => f.write_str("*"),
            Segment::DeepWildcard => f.write_str("**"),
            Segment::Variable {
                field_path,
                segments,
            } => {
                if matches!(segments.as_slice(), [Segment::Wildcard]) {
                    write!(f, "{{{}}}", field_path)
                } else {
                    write!(f, "{{{}=", field_path)?;
                    write_segments(f, segments)?;
                    f.write_str("}")
                }
            }
        }
    }
}

fn write_segments(f: &mut fmt::Formatter<'_>, segments: &[Segment]) -> fmt::Result {
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            f.write_str("/")?;
        }
        write!(f, "{}", segment)?;
    }
    Ok(())
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub(crate) template: String,
    pub(crate) segments: Vec<Segment>,
    pub(crate) verb: Option<String>,
    pub(crate) fields: Vec<String>,
}

impl Template {
    /// The template text this was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Custom verb suffix (`:cancel` yields `cancel`).
    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    /// Field paths captured by the template, in template order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Structure of the template with capture names erased.
    ///
    /// Two templates with the same shape match exactly the same request paths:
    /// `/v1/{id}` and `/v1/*` both have shape `/v1/*`.
    pub fn shape(&self) -> String {
        let mut flat = Vec::new();
        for segment in &self.segments {
            segment.flatten_into(&mut flat);
        }
        let mut shape = String::with_capacity(self.template.len());
        if flat.is_empty() {
            shape.push('/');
        }
        for segment in flat {
            shape.push('/');
            shape.push_str(&segment.to_string());
        }
        if let Some(verb) = &self.verb {
            shape.push(':');
            shape.push_str(verb);
        }
        shape
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        write_segments(f, &self.segments)?;
        if let Some(verb) = &self.verb {
            write!(f, ":{}", verb)?;
        }
        Ok(())
    }
}
