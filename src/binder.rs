//! Placeholder extraction and parameter binding.
//!
//! Two entry points feed a command's [`ParameterCollection`]:
//! * [`ParameterBinder::set`] binds a named parameter, overwriting one that already exists;
//! * [`ParameterBinder::bind_positional`] scans the SQL text for placeholders and fills the
//!   ones that are still unbound, in order, from a list of values.

use crate::codec::TypeCodec;
use crate::config::{BindingMode, ContextOptions};
use crate::error::SqlContextError;
use crate::types::{ParamKind, RowValues};

/// A named, typed value attached to a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    value: RowValues,
}

impl Parameter {
    /// Normalized name, including its leading marker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the leading marker.
    #[must_use]
    pub fn bare_name(&self) -> &str {
        let mut chars = self.name.chars();
        chars.next();
        chars.as_str()
    }

    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &RowValues {
        &self.value
    }
}

/// Ordered parameters of one command. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterCollection {
    items: Vec<Parameter>,
}

impl ParameterCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a parameter by its normalized name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.items.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.items.iter_mut().find(|p| p.name == name)
    }

    fn push(&mut self, parameter: Parameter) {
        debug_assert!(self.get(&parameter.name).is_none());
        self.items.push(parameter);
    }
}

impl<'a> IntoIterator for &'a ParameterCollection {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Ensure `name` carries exactly one leading `marker`.
#[must_use]
pub fn normalize_name(marker: char, name: &str) -> String {
    let bare = name.trim_start_matches(marker);
    let mut out = String::with_capacity(bare.len() + marker.len_utf8());
    out.push(marker);
    out.push_str(bare);
    out
}

fn is_name_char(c: char) -> bool {
    c == '_' || c == '-' || c.is_alphanumeric()
}

/// Distinct placeholder names in `sql`, in first-occurrence order, without the marker.
///
/// A placeholder runs from `marker` across letters, digits, `_` and `-`. Quoted literals
/// and comments are scanned like any other text.
#[must_use]
pub fn extract_placeholders(sql: &str, marker: char) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != marker {
            continue;
        }
        let start = idx + c.len_utf8();
        let mut end = start;
        while let Some(&(next_idx, next)) = chars.peek() {
            if !is_name_char(next) {
                break;
            }
            end = next_idx + next.len_utf8();
            chars.next();
        }
        let name = &sql[start..end];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    names
}

/// Applies named and positional bindings under one set of [`ContextOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterBinder {
    options: ContextOptions,
}

impl ParameterBinder {
    #[must_use]
    pub fn new(options: ContextOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> ContextOptions {
        self.options
    }

    /// Bind `value` under `name`, replacing the kind and value of an existing parameter with
    /// the same normalized name.
    pub fn set(
        &self,
        params: &mut ParameterCollection,
        name: &str,
        kind: ParamKind,
        value: RowValues,
    ) {
        let name = normalize_name(self.options.marker, name);
        if let Some(existing) = params.get_mut(&name) {
            tracing::trace!(%name, ?kind, "overwriting bound parameter");
            existing.kind = kind;
            existing.value = value;
            return;
        }
        tracing::trace!(%name, ?kind, "binding parameter");
        params.push(Parameter { name, kind, value });
    }

    /// Bind `values` in order to the placeholders of `sql` that are not bound yet.
    ///
    /// Returns the number of parameters added.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::TypeNotSupported` if a value's kind cannot be inferred, or
    /// `SqlContextError::ParameterMismatch` in strict mode when the counts differ. Nothing is
    /// bound when an error is returned.
    pub fn bind_positional(
        &self,
        params: &mut ParameterCollection,
        sql: &str,
        values: Vec<RowValues>,
    ) -> Result<usize, SqlContextError> {
        let marker = self.options.marker;
        let mut names = extract_placeholders(sql, marker);
        names.retain(|name| params.get(&normalize_name(marker, name)).is_none());

        if names.len() != values.len() {
            match self.options.binding {
                BindingMode::Strict => {
                    return Err(SqlContextError::ParameterMismatch {
                        placeholders: names.len(),
                        values: values.len(),
                    });
                }
                BindingMode::Permissive => {
                    tracing::debug!(
                        placeholders = names.len(),
                        values = values.len(),
                        "positional binding count mismatch; binding the shorter side"
                    );
                }
            }
        }

        let pending = names
            .into_iter()
            .zip(values)
            .map(|(name, value)| {
                let kind = TypeCodec::kind_of_value(&value)?;
                Ok(Parameter {
                    name: normalize_name(marker, &name),
                    kind,
                    value,
                })
            })
            .collect::<Result<Vec<_>, SqlContextError>>()?;

        let added = pending.len();
        for parameter in pending {
            tracing::trace!(name = %parameter.name, kind = ?parameter.kind, "binding positional parameter");
            params.push(parameter);
        }
        Ok(added)
    }
}
