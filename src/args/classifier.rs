//! Argument classifier: raw tokens → classified tokens.

use std::collections::HashMap;

use crate::args::catalog::{self, FlagArity};
use crate::args::decl::{is_flag_shaped, FlagDecl};
use crate::error::RouteError;

/// The end-of-flags marker.
pub const TERMINATOR: &str = "--";

/// A classified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedArg {
    /// Known flag. `raw` is the token as typed (may carry `=value`);
    /// `value` is the separate value token for value-arity flags.
    Flag {
        form: String,
        raw: String,
        value: Option<String>,
    },
    /// Flag-shaped token matching nothing in the table, with the value token
    /// it swallowed, if any. Never forwarded.
    Unknown { raw: String, value: Option<String> },
    /// Positional argument (not a flag).
    Positional(String),
    /// The first bare `--`. Everything after it is positional.
    Terminator,
}

/// Result of classifying raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyResult {
    /// Classified arguments in order.
    pub args: Vec<ClassifiedArg>,
    /// Unknown flag forms, in first-seen order, without duplicates.
    pub unrecognized: Vec<String>,
}

#[derive(Debug, Clone)]
struct TableEntry {
    name: String,
    arity: FlagArity,
    /// Script that declared it; `None` for catalog flags.
    owner: Option<String>,
}

/// Every flag form known for one routing call: the catalog plus the private
/// flags of each target.
#[derive(Debug, Clone)]
pub struct FlagTable {
    entries: HashMap<String, TableEntry>,
}

impl FlagTable {
    /// Table holding only the standard flags.
    pub fn standard() -> Self {
        let mut entries = HashMap::new();
        for spec in catalog::all() {
            for form in spec.forms {
                entries.insert(
                    form.to_string(),
                    TableEntry {
                        name: spec.name.to_string(),
                        arity: spec.arity,
                        owner: None,
                    },
                );
            }
        }
        Self { entries }
    }

    /// Add a script's declaration.
    ///
    /// Two scripts may share a private form only if they agree on its
    /// canonical name and arity.
    pub fn declare(&mut self, owner: &str, decl: &FlagDecl) -> Result<(), RouteError> {
        if decl.standard {
            return Ok(());
        }
        for form in &decl.forms {
            match self.entries.get(form) {
                Some(existing) if existing.name == decl.name && existing.arity == decl.arity => {}
                Some(existing) => {
                    return Err(RouteError::ConflictingFlag {
                        form: form.clone(),
                        first: existing.owner.clone().unwrap_or_else(|| "standard".into()),
                        second: owner.to_string(),
                    });
                }
                None => {
                    self.entries.insert(
                        form.clone(),
                        TableEntry {
                            name: decl.name.clone(),
                            arity: decl.arity,
                            owner: Some(owner.to_string()),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Canonical name and arity for a form.
    pub fn lookup(&self, form: &str) -> Option<(&str, FlagArity)> {
        self.entries
            .get(form)
            .map(|entry| (entry.name.as_str(), entry.arity))
    }
}

impl Default for FlagTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Classify raw args against the table.
///
/// Fails only when a known value-arity flag is the last token.
pub fn classify(raw_args: &[String], table: &FlagTable) -> Result<ClassifyResult, RouteError> {
    let mut args = Vec::with_capacity(raw_args.len());
    let mut unrecognized: Vec<String> = Vec::new();
    let mut iter = raw_args.iter().peekable();

    while let Some(arg) = iter.next() {
        if arg == TERMINATOR {
            args.push(ClassifiedArg::Terminator);
            args.extend(iter.by_ref().cloned().map(ClassifiedArg::Positional));
            break;
        }

        if !is_flag_shaped(arg) {
            args.push(ClassifiedArg::Positional(arg.clone()));
            continue;
        }

        // --name=value carries its value inline
        let (form, inline) = match arg.split_once('=') {
            Some((form, _)) if form.starts_with("--") => (form, true),
            _ => (arg.as_str(), false),
        };

        match table.lookup(form) {
            Some((_, FlagArity::Value)) if !inline => {
                let value = iter.next().ok_or_else(|| RouteError::MissingFlagValue {
                    flag: form.to_string(),
                })?;
                args.push(ClassifiedArg::Flag {
                    form: form.to_string(),
                    raw: arg.clone(),
                    value: Some(value.clone()),
                });
            }
            Some(_) => {
                args.push(ClassifiedArg::Flag {
                    form: form.to_string(),
                    raw: arg.clone(),
                    value: None,
                });
            }
            None => {
                if !unrecognized.iter().any(|u| u == form) {
                    unrecognized.push(form.to_string());
                }
                // Unknown arity: the next token is taken as its value unless
                // it looks like a flag itself.
                let value = if inline {
                    None
                } else {
                    iter.next_if(|next| !is_flag_shaped(next)).cloned()
                };
                args.push(ClassifiedArg::Unknown {
                    raw: arg.clone(),
                    value,
                });
            }
        }
    }

    Ok(ClassifyResult { args, unrecognized })
}
