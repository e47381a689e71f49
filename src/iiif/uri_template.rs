use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ConversionError, Result};

// @module: RFC 6570 URI templates (simple and reserved expansion)

// @const: `{var}` or `{+var}`; any other brace run is literal text
static EXPRESSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(\+?)([A-Za-z0-9_][A-Za-z0-9_.]*)\}").expect("expression regex is valid")
});

const RESERVED: &str = ":/?#[]@!$&'()*+,;=";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable { name: String, reserved: bool },
}

/// Parsed URI template such as `https://example.org/iiif/canvas/{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a template. Text that is not a well-formed expression, such as a
    /// Liquid `{{ '/' | absolute_url }}` tag, is carried through untouched.
    pub fn parse(template: &str) -> Result<Self> {
        if template.trim().is_empty() {
            return Err(ConversionError::Parse("URI template is empty".to_string()));
        }

        let mut parts = Vec::new();
        let mut last = 0;

        for caps in EXPRESSION_REGEX.captures_iter(template) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            if whole.start > last {
                parts.push(Part::Literal(template[last..whole.start].to_string()));
            }
            parts.push(Part::Variable {
                name: caps[2].to_string(),
                reserved: !caps[1].is_empty(),
            });
            last = whole.end;
        }

        if last < template.len() {
            parts.push(Part::Literal(template[last..].to_string()));
        }

        Ok(UriTemplate {
            source: template.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the variables referenced by the template
    pub fn variables(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Variable { name, .. } => Some(name.as_str()),
                Part::Literal(_) => None,
            })
            .collect()
    }

    pub fn references(&self, variable: &str) -> bool {
        self.variables().contains(&variable)
    }

    /// Expand with a single variable binding; other variables expand to nothing
    pub fn expand(&self, variable: &str, value: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + value.len());

        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Variable { name, reserved } if name == variable => {
                    if *reserved {
                        out.push_str(&encode_reserved(value));
                    } else {
                        out.push_str(&urlencoding::encode(value));
                    }
                }
                Part::Variable { name, .. } => {
                    warn!("URI template variable '{}' is undefined in {}", name, self.source);
                }
            }
        }

        out
    }

    /// Expand the `id` variable
    pub fn expand_id(&self, identifier: &str) -> String {
        self.expand("id", identifier)
    }
}

fn encode_reserved(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];

    for c in value.chars() {
        if RESERVED.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }

    out
}

/// Join two URL pieces with exactly one `/` between them
pub fn join_url(base: &str, segment: &str) -> String {
    if base.is_empty() {
        return segment.to_string();
    }
    if segment.is_empty() {
        return base.to_string();
    }

    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}
