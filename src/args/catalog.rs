//! Flag catalog: single source of truth for the standard flags.

/// Whether a flag takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagArity {
    /// Boolean switch, no value (e.g., --verbose).
    Boolean,
    /// Consumes the next token as its value (e.g., --format json).
    Value,
}

/// A single standard flag definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Canonical name (e.g., "dry-run").
    pub name: &'static str,
    /// Every string form the flag may appear as.
    pub forms: &'static [&'static str],
    /// Does it take a value?
    pub arity: FlagArity,
    /// Human-readable description (for help text).
    pub help: &'static str,
}

impl FlagSpec {
    /// Check if this definition matches the given argument string.
    pub fn matches(&self, arg: &str) -> bool {
        self.forms.contains(&arg)
    }

    /// Short form, if any (e.g., "-R").
    pub fn short(&self) -> Option<char> {
        self.forms
            .iter()
            .find(|f| !f.starts_with("--"))
            .and_then(|f| f.chars().nth(1))
    }

    /// Long form without the leading dashes (e.g., "recursive").
    pub fn long(&self) -> Option<&'static str> {
        self.forms.iter().find_map(|f| f.strip_prefix("--"))
    }
}

/// Canonical name of the help flag. Every parser exposes it.
pub const HELP: &str = "help";

static CATALOG: [FlagSpec; 5] = [
    FlagSpec {
        name: HELP,
        forms: &["-h", "--help"],
        arity: FlagArity::Boolean,
        help: "Print help",
    },
    FlagSpec {
        name: "recursive",
        forms: &["-R", "--recursive"],
        arity: FlagArity::Boolean,
        help: "Process directories recursively",
    },
    FlagSpec {
        name: "dry-run",
        forms: &["-n", "--dry-run"],
        arity: FlagArity::Boolean,
        help: "Show what would be done without making changes",
    },
    FlagSpec {
        name: "yes",
        forms: &["-y", "--yes"],
        arity: FlagArity::Boolean,
        help: "Automatically answer yes to all prompts",
    },
    FlagSpec {
        name: "verbose",
        forms: &["-v", "--verbose"],
        arity: FlagArity::Boolean,
        help: "Enable verbose output",
    },
];

/// All standard flags, in catalog order.
pub fn all() -> &'static [FlagSpec] {
    &CATALOG
}

/// Find the standard flag a form belongs to.
pub fn lookup(form: &str) -> Option<&'static FlagSpec> {
    CATALOG.iter().find(|spec| spec.matches(form))
}

/// Find a standard flag by canonical name.
pub fn get(name: &str) -> Option<&'static FlagSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Arity of a standard flag, by canonical name.
pub fn arity(name: &str) -> Option<FlagArity> {
    get(name).map(|spec| spec.arity)
}
