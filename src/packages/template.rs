//! `{{.key}}` substitution for package-name templates.
use std::collections::BTreeMap;

use thiserror::Error;

/// Template syntax errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// An opening `{{` has no matching `}}`.
    #[error("unclosed action at offset {offset} in '{template}'")]
    Unclosed {
        /// Template being expanded.
        template: String,
        /// Byte offset of the opening braces.
        offset: usize,
    },

    /// A `}}` appears without a preceding `{{`.
    #[error("unexpected '}}}}' at offset {offset} in '{template}'")]
    StrayClose {
        /// Template being expanded.
        template: String,
        /// Byte offset of the closing braces.
        offset: usize,
    },

    /// The action is not a `.key` reference.
    #[error("unsupported action '{{{{{action}}}}}' in '{template}'")]
    BadAction {
        /// Template being expanded.
        template: String,
        /// Trimmed action body.
        action: String,
    },
}

/// Expand every `{{ .key }}` action in `template` using `params`.
///
/// Keys absent from `params` expand to the empty string.
///
/// # Errors
///
/// Returns a [`TemplateError`] on malformed template syntax only.
pub fn expand(template: &str, params: &BTreeMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0;

    while let Some((literal, after_open)) = rest.split_once("{{") {
        check_no_close(template, literal, consumed)?;
        out.push_str(literal);

        let (body, after_close) =
            after_open
                .split_once("}}")
                .ok_or_else(|| TemplateError::Unclosed {
                    template: template.to_string(),
                    offset: consumed + literal.len(),
                })?;

        let action = body.trim();
        let key = action
            .strip_prefix('.')
            .filter(|k| is_identifier(k))
            .ok_or_else(|| TemplateError::BadAction {
                template: template.to_string(),
                action: action.to_string(),
            })?;
        if let Some(value) = params.get(key) {
            out.push_str(value);
        }

        consumed += literal.len() + body.len() + 4;
        rest = after_close;
    }

    check_no_close(template, rest, consumed)?;
    out.push_str(rest);
    Ok(out)
}

fn check_no_close(template: &str, literal: &str, base: usize) -> Result<(), TemplateError> {
    match literal.find("}}") {
        Some(idx) => Err(TemplateError::StrayClose {
            template: template.to_string(),
            offset: base + idx,
        }),
        None => Ok(()),
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
