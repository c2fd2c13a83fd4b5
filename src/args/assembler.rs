//! Argument assembler: classified tokens → one script's token list.

use crate::args::classifier::{ClassifiedArg, TERMINATOR};
use crate::args::decl::FlagDecl;

/// Tokens routed to one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedArgs {
    tokens: Vec<String>,
    /// Index of the first token that came after a `--` terminator.
    trailing_from: Option<usize>,
}

impl RoutedArgs {
    /// The routed tokens, in original order, without the terminator.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens for the script's parser: a `--` is re-inserted before the
    /// positionals that followed the terminator.
    pub fn parser_args(&self) -> Vec<String> {
        let mut args = self.tokens.clone();
        if let Some(at) = self.trailing_from {
            args.insert(at, TERMINATOR.to_string());
        }
        args
    }
}

/// Builder for the token list of a single target.
#[derive(Debug, Clone)]
pub struct ArgAssembler<'a> {
    supports: &'a [FlagDecl],
}

impl<'a> ArgAssembler<'a> {
    /// Start an assembler for a script with the given declarations.
    pub fn new(supports: &'a [FlagDecl]) -> Self {
        Self { supports }
    }

    fn supports(&self, form: &str) -> bool {
        self.supports.iter().any(|decl| decl.matches(form))
    }

    /// Keep positionals and supported flags (with their values); drop the rest.
    pub fn build(&self, classified: &[ClassifiedArg]) -> RoutedArgs {
        let mut routed = RoutedArgs::default();
        for arg in classified {
            match arg {
                ClassifiedArg::Positional(s) => routed.tokens.push(s.clone()),
                ClassifiedArg::Flag { form, raw, value } if self.supports(form) => {
                    routed.tokens.push(raw.clone());
                    if let Some(val) = value {
                        routed.tokens.push(val.clone());
                    }
                }
                ClassifiedArg::Terminator => routed.trailing_from = Some(routed.tokens.len()),
                // Unsupported and unknown flags are filtered out
                ClassifiedArg::Flag { .. } | ClassifiedArg::Unknown { .. } => {}
            }
        }
        routed
    }
}
