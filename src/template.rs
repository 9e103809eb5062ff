//! Validated filename templates.
//!
//! Replaces the original format-string mechanism with an explicit
//! substitution over exactly three placeholders: `{base}`, `{index}` and
//! `{suffix}`. `{index}` accepts a zero-padding spec such as `{index:03d}`.
//! `{{` and `}}` render literal braces. Anything else is rejected up
//! front with an error naming the offending template, instead of a
//! generic formatting fault at render time.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z0-9_]+)(?::([^{}]*))?\}|\{|\}")
        .expect("placeholder pattern is valid")
});

/// Errors raised while parsing a filename template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template names a placeholder other than base/index/suffix.
    #[error("unknown placeholder `{name}` in template `{template}`")]
    UnknownPlaceholder { name: String, template: String },

    /// A placeholder carries a format spec the engine does not support.
    #[error("unsupported format spec `{spec}` for `{name}` in template `{template}`")]
    UnsupportedSpec {
        name: String,
        spec: String,
        template: String,
    },

    /// A `{` or `}` without a matching partner (use `{{` / `}}` for literals).
    #[error("unbalanced brace in template `{template}`")]
    UnbalancedBrace { template: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Base,
    Index { pad: Option<usize> },
    Suffix,
}

/// A parsed, validated filename template.
///
/// Parsing happens once per call, before any state is touched, so a bad
/// template can never leave a workflow half-advanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    /// Parse and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for caps in PLACEHOLDER.captures_iter(raw) {
            let matched = caps.get(0).expect("group 0 always participates");
            if matched.start() > cursor {
                segments.push(Segment::Literal(raw[cursor..matched.start()].to_string()));
            }
            cursor = matched.end();

            match matched.as_str() {
                "{{" => segments.push(Segment::Literal("{".to_string())),
                "}}" => segments.push(Segment::Literal("}".to_string())),
                _ => match caps.get(1) {
                    Some(name) => {
                        let spec = caps.get(2).map(|m| m.as_str());
                        segments.push(parse_placeholder(name.as_str(), spec, raw)?);
                    }
                    // A stray `{` or `}` with no matching partner.
                    None => {
                        return Err(TemplateError::UnbalancedBrace {
                            template: raw.to_string(),
                        })
                    }
                },
            }
        }

        if cursor < raw.len() {
            segments.push(Segment::Literal(raw[cursor..].to_string()));
        }

        Ok(Self { segments })
    }

    /// Render the template against the resolved values.
    pub fn render(&self, base: &str, index: usize, suffix: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Base => out.push_str(base),
                Segment::Index { pad: Some(width) } => {
                    let width = *width;
                    out.push_str(&format!("{index:0width$}"));
                }
                Segment::Index { pad: None } => out.push_str(&index.to_string()),
                Segment::Suffix => out.push_str(suffix),
            }
        }
        out
    }
}

fn parse_placeholder(
    name: &str,
    spec: Option<&str>,
    template: &str,
) -> Result<Segment, TemplateError> {
    match name {
        "base" | "suffix" => match spec {
            None | Some("") => Ok(if name == "base" {
                Segment::Base
            } else {
                Segment::Suffix
            }),
            Some(spec) => Err(TemplateError::UnsupportedSpec {
                name: name.to_string(),
                spec: spec.to_string(),
                template: template.to_string(),
            }),
        },
        "index" => match spec {
            None | Some("") | Some("d") => Ok(Segment::Index { pad: None }),
            Some(spec) => parse_pad_spec(spec)
                .map(|pad| Segment::Index { pad: Some(pad) })
                .ok_or_else(|| TemplateError::UnsupportedSpec {
                    name: name.to_string(),
                    spec: spec.to_string(),
                    template: template.to_string(),
                }),
        },
        other => Err(TemplateError::UnknownPlaceholder {
            name: other.to_string(),
            template: template.to_string(),
        }),
    }
}

/// Accepts zero-pad specs of the shape `0<width>d`, e.g. `03d`.
fn parse_pad_spec(spec: &str) -> Option<usize> {
    let digits = spec.strip_prefix('0')?.strip_suffix('d')?;
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
