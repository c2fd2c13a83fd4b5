//! Flag declarations: a script's `supports` entries, validated.

use crate::args::catalog::{self, FlagArity};
use crate::error::RegistryError;

/// One validated entry of a script's supported-flag declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDecl {
    /// Canonical name. Standard flags use the catalog name; private flags
    /// use their long form (or short form) without dashes.
    pub name: String,
    /// Forms this script accepts the flag as.
    pub forms: Vec<String>,
    pub arity: FlagArity,
    /// True when the flag comes from the catalog.
    pub standard: bool,
    /// Value placeholder for value flags (e.g., "FORMAT").
    pub value_name: Option<String>,
}

impl FlagDecl {
    /// Parse a declaration such as `-R`, `--dry-run`, `--format <FORMAT>`
    /// or `-o, --output <PATH>`.
    ///
    /// Naming any form of a standard flag declares the whole standard flag.
    /// Well-formed forms that are not in the catalog become private flags.
    pub fn parse(declaration: &str) -> Result<Self, RegistryError> {
        let malformed = |reason: &str| RegistryError::MalformedFlagDeclaration {
            declaration: declaration.to_string(),
            reason: reason.to_string(),
        };

        let (forms_part, value_name) = match declaration.find('<') {
            Some(start) => {
                let placeholder = declaration[start..].trim_end();
                let inner = placeholder
                    .strip_prefix('<')
                    .and_then(|p| p.strip_suffix('>'))
                    .ok_or_else(|| malformed("value placeholder must look like <NAME>"))?;
                if inner.is_empty() || inner.contains(['<', '>']) || inner.contains(char::is_whitespace) {
                    return Err(malformed("value placeholder must look like <NAME>"));
                }
                (&declaration[..start], Some(inner.to_string()))
            }
            None => (declaration, None),
        };

        let forms: Vec<String> = forms_part
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        if forms.is_empty() {
            return Err(malformed("no flag forms given"));
        }
        for form in &forms {
            if !is_valid_form(form) {
                return Err(malformed(&format!("'{}' is not a flag form", form)));
            }
        }

        let standard = forms.iter().find_map(|f| catalog::lookup(f));
        if let Some(spec) = standard {
            if forms.iter().any(|f| !spec.matches(f)) {
                return Err(malformed(&format!(
                    "mixes forms of standard flag '{}' with other forms",
                    spec.name
                )));
            }
            if value_name.is_some() {
                return Err(malformed(&format!(
                    "standard flag '{}' does not take a value",
                    spec.name
                )));
            }
            return Ok(Self {
                name: spec.name.to_string(),
                forms: spec.forms.iter().map(|f| f.to_string()).collect(),
                arity: spec.arity,
                standard: true,
                value_name: None,
            });
        }

        let name = forms
            .iter()
            .find_map(|f| f.strip_prefix("--"))
            .or_else(|| forms[0].strip_prefix('-'))
            .unwrap_or_default()
            .to_string();

        let arity = if value_name.is_some() {
            FlagArity::Value
        } else {
            FlagArity::Boolean
        };

        Ok(Self {
            name,
            forms,
            arity,
            standard: false,
            value_name,
        })
    }

    /// Check if this declaration covers the given flag form.
    pub fn matches(&self, form: &str) -> bool {
        self.forms.iter().any(|f| f == form)
    }

    /// Short form character, if declared.
    pub fn short(&self) -> Option<char> {
        self.forms
            .iter()
            .find(|f| !f.starts_with("--"))
            .and_then(|f| f.chars().nth(1))
    }

    /// Long form without dashes, if declared.
    pub fn long(&self) -> Option<&str> {
        self.forms.iter().find_map(|f| f.strip_prefix("--"))
    }
}

/// `-x` (one character, not `-`) or `--name` (alphanumeric start, then
/// alphanumerics, `-` or `_`).
fn is_valid_form(form: &str) -> bool {
    if let Some(long) = form.strip_prefix("--") {
        let mut chars = long.chars();
        return match chars.next() {
            Some(first) if first.is_ascii_alphanumeric() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            }
            _ => false,
        };
    }
    if let Some(short) = form.strip_prefix('-') {
        let mut chars = short.chars();
        return matches!((chars.next(), chars.next()), (Some(c), None) if c != '-' && !c.is_whitespace() && c != '=');
    }
    false
}

/// True when a token has the syntactic shape of a flag.
pub fn is_flag_shaped(token: &str) -> bool {
    token.starts_with('-') && token.len() > 1
}
