//! Symbol tables
//!
//!     A `SymbolTable` maps cells to output text for one category of one language (letters,
//!     punctuation, digits, fraction denominators or math operators). Tables are immutable once
//!     built and are shared read-only by every decode call.
//!
//! Composition
//!
//!     Tables are assembled from ordered `Fragment`s. Fragments are applied in declaration order
//!     and a later fragment wins when it rewrites a cell. That rewrite has to be asked for: the
//!     fragment must be declared with `overrides: true`, otherwise building fails with
//!     `TableError::UnintendedOverride`. A cell listed twice inside the same fragment is always an
//!     error (`TableError::DuplicateCell`). Both checks run at construction, so a typo in the
//!     symbol data breaks the build of the registry instead of silently shadowing an entry.
//!
//!     The map itself is a `HashMap`, but nothing depends on its iteration order: application
//!     order comes from the fragment list, and `SymbolTable::iter` sorts by cell.

use super::cell::CellCode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which lookup table a symbol belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Letters,
    Punctuation,
    Digits,
    Denominators,
    Math,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Letters => "letters",
            Category::Punctuation => "punctuation",
            Category::Digits => "digits",
            Category::Denominators => "denominators",
            Category::Math => "math",
        };
        f.write_str(name)
    }
}

/// Marks a cell whose final text depends on its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Point between digits, multiplication otherwise
    Point,
    /// Always a colon
    Ratio,
    /// Opens or closes a pair depending on what is already open
    Bracket,
}

/// Where a symbol was declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub fragment: String,
    pub position: usize,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.fragment, self.position)
    }
}

/// The output unit a table yields for a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub text: String,
    pub role: Option<Role>,
    pub origin: Origin,
}

/// One declared mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub cell: CellCode,
    pub text: String,
    pub role: Option<Role>,
}

impl Entry {
    pub fn new(cell: CellCode, text: impl Into<String>) -> Self {
        Entry {
            cell,
            text: text.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// A named, ordered list of entries applied as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: String,
    pub overrides: bool,
    pub entries: Vec<Entry>,
}

impl Fragment {
    pub fn new(name: impl Into<String>, entries: Vec<Entry>) -> Self {
        Fragment {
            name: name.into(),
            overrides: false,
            entries,
        }
    }

    /// Same fragment, allowed to rewrite cells defined by earlier fragments
    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }
}

/// Errors raised while building tables or the registry that holds them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A cell appears twice inside one fragment
    DuplicateCell { fragment: String, cell: CellCode },
    /// A fragment rewrites an earlier cell without declaring `overrides`
    UnintendedOverride {
        fragment: String,
        cell: CellCode,
        previous: Origin,
    },
    /// A language refers to a fragment that is not declared
    UnknownFragment { language: String, fragment: String },
    /// A language extends a language that is not declared before it
    UnknownBase { language: String, base: String },
    /// Two languages (or aliases) share a code
    DuplicateLanguage(String),
    /// Two reserved markers use the same cell
    MarkerConflict { language: String, cell: CellCode },
    /// The symbol data document could not be parsed
    Syntax(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::DuplicateCell { fragment, cell } => {
                write!(f, "cell {cell} declared twice in fragment '{fragment}'")
            }
            TableError::UnintendedOverride {
                fragment,
                cell,
                previous,
            } => write!(
                f,
                "fragment '{fragment}' rewrites cell {cell} (declared at {previous}) without `overrides: true`"
            ),
            TableError::UnknownFragment { language, fragment } => {
                write!(f, "language '{language}' uses undeclared fragment '{fragment}'")
            }
            TableError::UnknownBase { language, base } => {
                write!(f, "language '{language}' extends undeclared language '{base}'")
            }
            TableError::DuplicateLanguage(code) => write!(f, "language code '{code}' declared twice"),
            TableError::MarkerConflict { language, cell } => {
                write!(f, "language '{language}' uses cell {cell} for two markers")
            }
            TableError::Syntax(msg) => write!(f, "invalid symbol data: {msg}"),
        }
    }
}

impl std::error::Error for TableError {}

/// Immutable cell -> symbol mapping for one category
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    category: Category,
    symbols: HashMap<CellCode, Symbol>,
}

impl SymbolTable {
    /// An empty table
    pub fn empty(category: Category) -> Self {
        SymbolTable {
            category,
            symbols: HashMap::new(),
        }
    }

    /// Build a table from fragments applied in order
    pub fn compose(category: Category, fragments: &[&Fragment]) -> Result<Self, TableError> {
        let mut builder = TableBuilder::new(category);
        for fragment in fragments {
            builder.apply(fragment)?;
        }
        Ok(builder.build())
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Look a cell up. Absence is normal: it means "try the next table".
    pub fn get(&self, cell: CellCode) -> Option<&Symbol> {
        self.symbols.get(&cell)
    }

    pub fn contains(&self, cell: CellCode) -> bool {
        self.symbols.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entries sorted by cell
    pub fn iter(&self) -> impl Iterator<Item = (CellCode, &Symbol)> {
        let mut entries: Vec<_> = self.symbols.iter().map(|(c, s)| (*c, s)).collect();
        entries.sort_by_key(|(c, _)| *c);
        entries.into_iter()
    }
}

/// Applies fragments to a growing table
#[derive(Debug)]
pub struct TableBuilder {
    category: Category,
    symbols: HashMap<CellCode, Symbol>,
}

impl TableBuilder {
    pub fn new(category: Category) -> Self {
        TableBuilder {
            category,
            symbols: HashMap::new(),
        }
    }

    /// Start from an already built table (language variants extending a base language)
    pub fn extending(base: &SymbolTable) -> Self {
        TableBuilder {
            category: base.category,
            symbols: base.symbols.clone(),
        }
    }

    /// Apply one fragment on top of what is already there
    pub fn apply(&mut self, fragment: &Fragment) -> Result<(), TableError> {
        let mut seen = HashSet::with_capacity(fragment.entries.len());
        for (position, entry) in fragment.entries.iter().enumerate() {
            if !seen.insert(entry.cell) {
                return Err(TableError::DuplicateCell {
                    fragment: fragment.name.clone(),
                    cell: entry.cell,
                });
            }
            let symbol = Symbol {
                text: entry.text.clone(),
                role: entry.role,
                origin: Origin {
                    fragment: fragment.name.clone(),
                    position,
                },
            };
            if let Some(previous) = self.symbols.get(&entry.cell) {
                if !fragment.overrides {
                    return Err(TableError::UnintendedOverride {
                        fragment: fragment.name.clone(),
                        cell: entry.cell,
                        previous: previous.origin.clone(),
                    });
                }
                log::debug!(
                    "{}: {} overrides cell {} ({:?} from {} -> {:?})",
                    self.category,
                    fragment.name,
                    entry.cell,
                    previous.text,
                    previous.origin,
                    symbol.text
                );
            }
            self.symbols.insert(entry.cell, symbol);
        }
        Ok(())
    }

    pub fn build(self) -> SymbolTable {
        SymbolTable {
            category: self.category,
            symbols: self.symbols,
        }
    }
}
