//! Recursive-descent parser for path templates.
//!
//! ```text
//! Template = "/" Segments [ Verb ] ;
//! Segments = Segment { "/" Segment } ;
//! Segment  = "*" | "**" | LITERAL | Variable ;
//! Variable = "{" FieldPath [ "=" Segments ] "}" ;
//! FieldPath = IDENT { "." IDENT } ;
//! Verb     = ":" LITERAL ;
//! ```

use std::collections::HashSet;

use crate::error::TemplateError;
use crate::template::{Segment, Template};

/// A syntactically valid path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    template: String,
    segments: Vec<Segment>,
    verb: Option<String>,
}

impl Parsed {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    /// Compile into a [`Template`], collecting the captured field paths.
    pub fn compile(&self) -> Template {
        let mut fields = Vec::new();
        collect_fields(&self.segments, &mut fields);
        Template {
            template: self.template.clone(),
            segments: self.segments.clone(),
            verb: self.verb.clone(),
            fields,
        }
    }
}

/// Parse a path template.
pub fn parse(template: &str) -> Result<Parsed, TemplateError> {
    let Some(body) = template.strip_prefix('/') else {
        return Err(TemplateError::MissingLeadingSlash(template.to_string()));
    };
    if body.is_empty() {
        return Ok(Parsed {
            template: template.to_string(),
            segments: Vec::new(),
            verb: None,
        });
    }

    let (path_len, verb) = split_verb(template, body)?;
    let mut parser = Parser {
        template,
        bytes: template.as_bytes(),
        pos: 1,
        end: 1 + path_len,
    };
    let segments = parser.segments(false)?;
    if parser.pos < parser.end {
        return Err(parser.unexpected());
    }

    validate(template, &segments)?;

    Ok(Parsed {
        template: template.to_string(),
        segments,
        verb,
    })
}

/// Split a trailing `:verb` off the path. Only a colon outside braces and
/// after the last top-level slash starts a verb.
fn split_verb(template: &str, body: &str) -> Result<(usize, Option<String>), TemplateError> {
    let mut depth = 0usize;
    let mut last_slash = None;
    let mut last_colon = None;
    for (i, b) in body.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'/' if depth == 0 => last_slash = Some(i),
            b':' if depth == 0 => last_colon = Some(i),
            _ => {}
        }
    }

    match last_colon {
        Some(colon) if last_slash.map_or(true, |slash| colon > slash) => {
            let verb = &body[colon + 1..];
            if verb.is_empty() || !verb.bytes().all(|b| is_literal_byte(b) && b != b':') {
                return Err(TemplateError::InvalidVerb(template.to_string()));
            }
            Ok((colon, Some(verb.to_string())))
        }
        _ => Ok((body.len(), None)),
    }
}

struct Parser<'a> {
    template: &'a str,
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        (self.pos < self.end).then(|| self.bytes[self.pos])
    }

    fn segments(&mut self, in_variable: bool) -> Result<Vec<Segment>, TemplateError> {
        let mut segments = vec![self.segment(in_variable)?];
        while self.peek() == Some(b'/') {
            self.pos += 1;
            segments.push(self.segment(in_variable)?);
        }
        Ok(segments)
    }

    fn segment(&mut self, in_variable: bool) -> Result<Segment, TemplateError> {
        match self.peek() {
            None | Some(b'/') | Some(b'}') => Err(TemplateError::EmptySegment {
                template: self.template.to_string(),
                offset: self.pos,
            }),
            Some(b'*') => {
                self.pos += 1;
                if self.peek() == Some(b'*') {
                    self.pos += 1;
                    Ok(Segment::DeepWildcard)
                } else {
                    Ok(Segment::Wildcard)
                }
            }
            Some(b'{') if in_variable => Err(TemplateError::NestedVariable {
                template: self.template.to_string(),
                offset: self.pos,
            }),
            Some(b'{') => self.variable(),
            Some(_) => self.literal(),
        }
    }

    fn literal(&mut self) -> Result<Segment, TemplateError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'%' {
                let escaped = self
                    .bytes
                    .get(self.pos + 1..self.pos + 3)
                    .filter(|_| self.pos + 3 <= self.end)
                    .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
                if !escaped {
                    return Err(self.unexpected());
                }
                self.pos += 3;
                continue;
            }
            if !is_literal_byte(b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(Segment::Literal(self.template[start..self.pos].to_string()))
    }

    fn variable(&mut self) -> Result<Segment, TemplateError> {
        // '{'
        self.pos += 1;
        let field_path = self.field_path()?;
        let segments = if self.peek() == Some(b'=') {
            self.pos += 1;
            self.segments(true)?
        } else {
            vec![Segment::Wildcard]
        };
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
                Ok(Segment::Variable {
                    field_path,
                    segments,
                })
            }
            None => Err(TemplateError::UnterminatedVariable(
                self.template.to_string(),
            )),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn field_path(&mut self) -> Result<String, TemplateError> {
        let start = self.pos;
        loop {
            self.ident()?;
            if self.peek() != Some(b'.') {
                break;
            }
            self.pos += 1;
        }
        Ok(self.template[start..self.pos].to_string())
    }

    fn ident(&mut self) -> Result<(), TemplateError> {
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            None => {
                return Err(TemplateError::UnterminatedVariable(
                    self.template.to_string(),
                ))
            }
            Some(_) => {
                return Err(TemplateError::InvalidFieldPath {
                    template: self.template.to_string(),
                    offset: self.pos,
                })
            }
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        Ok(())
    }

    fn unexpected(&self) -> TemplateError {
        TemplateError::UnexpectedChar {
            template: self.template.to_string(),
            offset: self.pos,
            found: self.template[self.pos..].chars().next().unwrap_or_default(),
        }
    }
}

/// Unreserved, sub-delims, `:` and `@` (RFC 3986 `pchar` without `%`).
fn is_literal_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._~!$&'()+,;=:@".contains(&b)
}

fn collect_fields(segments: &[Segment], fields: &mut Vec<String>) {
    for segment in segments {
        if let Segment::Variable { field_path, .. } = segment {
            fields.push(field_path.clone());
        }
    }
}

fn validate(template: &str, segments: &[Segment]) -> Result<(), TemplateError> {
    let mut flat = Vec::new();
    for segment in segments {
        match segment {
            Segment::Variable { segments, .. } => flat.extend(segments.iter()),
            other => flat.push(other),
        }
    }
    let last = flat.len().saturating_sub(1);
    if flat
        .iter()
        .enumerate()
        .any(|(i, s)| matches!(s, Segment::DeepWildcard) && i != last)
    {
        return Err(TemplateError::DeepWildcardNotLast(template.to_string()));
    }

    let mut seen = HashSet::new();
    for segment in segments {
        if let Segment::Variable { field_path, .. } = segment {
            if !seen.insert(field_path.as_str()) {
                return Err(TemplateError::DuplicateVariable {
                    template: template.to_string(),
                    field: field_path.clone(),
                });
            }
        }
    }
    Ok(())
}
