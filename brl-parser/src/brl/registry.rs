//! Language registry
//!
//!     The registry turns declarative symbol data (YAML, see `data/symbols.yaml`) into one
//!     `TableSet` per language. Everything is built up front: once `Registry::from_yaml` returns,
//!     every table is final and `load` only hands out shared references.
//!
//! Data Layout
//!
//!     markers:    reserved cells (number, markout, optional caps/math); a language may
//!                 override them under its own `markers` key
//!     fragments:  named, ordered entry lists; `overrides: true` allows rewriting earlier cells
//!     languages:  per category, the fragment names to apply in order; `base` starts every
//!                 category (and the markers) from an earlier language's finished tables
//!
//!     A language whose composed letter table is empty is a placeholder. It stays listed, but
//!     `load` reports it as `UnsupportedLanguage` rather than handing out an empty table.

use super::cell::CellCode;
use super::table::{Category, Entry, Fragment, Role, SymbolTable, TableBuilder, TableError};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Symbol data compiled into the crate
pub const BUILTIN_SYMBOLS: &str = include_str!("../../data/symbols.yaml");

static BUILTIN: OnceCell<Registry> = OnceCell::new();

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolData {
    markers: MarkerDecl,
    #[serde(default)]
    fragments: Vec<FragmentDecl>,
    languages: Vec<LanguageDecl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkerDecl {
    number: Option<CellCode>,
    markout: Option<CellCode>,
    caps: Option<CellCode>,
    math: Option<CellCode>,
}

impl MarkerDecl {
    fn layered(&self, over: &MarkerDecl) -> MarkerDecl {
        MarkerDecl {
            number: over.number.or(self.number),
            markout: over.markout.or(self.markout),
            caps: over.caps.or(self.caps),
            math: over.math.or(self.math),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FragmentDecl {
    name: String,
    #[serde(default)]
    overrides: bool,
    #[serde(default)]
    entries: Vec<EntryDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntryDecl {
    Pair(CellCode, String),
    Full {
        cell: CellCode,
        text: String,
        #[serde(default)]
        role: Option<Role>,
    },
}

impl From<EntryDecl> for Entry {
    fn from(decl: EntryDecl) -> Self {
        match decl {
            EntryDecl::Pair(cell, text) => Entry::new(cell, text),
            EntryDecl::Full { cell, text, role } => Entry {
                cell,
                text,
                role,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LanguageDecl {
    code: String,
    name: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    base: Option<String>,
    #[serde(default)]
    letters: Vec<String>,
    #[serde(default)]
    punctuation: Vec<String>,
    #[serde(default)]
    digits: Vec<String>,
    #[serde(default)]
    denominators: Vec<String>,
    #[serde(default)]
    math: Vec<String>,
    #[serde(default)]
    markers: MarkerDecl,
}

impl LanguageDecl {
    fn fragments_for(&self, category: Category) -> &[String] {
        match category {
            Category::Letters => &self.letters,
            Category::Punctuation => &self.punctuation,
            Category::Digits => &self.digits,
            Category::Denominators => &self.denominators,
            Category::Math => &self.math,
        }
    }
}

impl From<Markers> for MarkerDecl {
    fn from(markers: Markers) -> Self {
        MarkerDecl {
            number: Some(markers.number),
            markout: Some(markers.markout),
            caps: markers.caps,
            math: markers.math,
        }
    }
}

/// Reserved marker cells of one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub number: CellCode,
    pub markout: CellCode,
    pub caps: Option<CellCode>,
    pub math: Option<CellCode>,
}

impl Markers {
    fn cells(&self) -> impl Iterator<Item = CellCode> {
        [Some(self.number), Some(self.markout), self.caps, self.math]
            .into_iter()
            .flatten()
    }
}

/// Every table one language needs, built once and shared read-only
#[derive(Debug, Clone)]
pub struct TableSet {
    code: String,
    name: String,
    letters: SymbolTable,
    punctuation: SymbolTable,
    digits: SymbolTable,
    denominators: SymbolTable,
    math: Option<SymbolTable>,
    markers: Markers,
}

impl TableSet {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn letters(&self) -> &SymbolTable {
        &self.letters
    }

    pub fn punctuation(&self) -> &SymbolTable {
        &self.punctuation
    }

    pub fn digits(&self) -> &SymbolTable {
        &self.digits
    }

    pub fn denominators(&self) -> &SymbolTable {
        &self.denominators
    }

    pub fn math(&self) -> Option<&SymbolTable> {
        self.math.as_ref()
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    fn table(&self, category: Category) -> Option<&SymbolTable> {
        match category {
            Category::Letters => Some(&self.letters),
            Category::Punctuation => Some(&self.punctuation),
            Category::Digits => Some(&self.digits),
            Category::Denominators => Some(&self.denominators),
            Category::Math => self.math.as_ref(),
        }
    }
}

/// Why a language cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// No language or alias has this code
    Unknown,
    /// Declared, but no letter mappings are defined yet
    Placeholder,
}

/// A language selection that cannot be decoded with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLanguage {
    pub code: String,
    pub reason: Unsupported,
}

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            Unsupported::Unknown => write!(f, "unsupported language '{}': not declared", self.code),
            Unsupported::Placeholder => write!(
                f,
                "unsupported language '{}': no letter mappings defined",
                self.code
            ),
        }
    }
}

impl std::error::Error for UnsupportedLanguage {}

/// Summary of one registered language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub supported: bool,
}

#[derive(Debug, Clone)]
enum Slot {
    Ready(Arc<TableSet>),
    Placeholder,
}

/// All languages built from one symbol data document
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<(LanguageInfo, Slot)>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// The registry built from [`BUILTIN_SYMBOLS`], constructed on first use
    pub fn builtin() -> Result<&'static Registry, TableError> {
        BUILTIN.get_or_try_init(|| Registry::from_yaml(BUILTIN_SYMBOLS))
    }

    /// The registry from the symbol data file at `path`, or the built-in one
    pub fn open(path: Option<&Path>) -> Result<Cow<'static, Registry>, LoadError> {
        match path {
            Some(path) => {
                let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::debug!("loading symbol data from {}", path.display());
                Ok(Cow::Owned(Registry::from_yaml(&source)?))
            }
            None => Ok(Cow::Borrowed(Registry::builtin()?)),
        }
    }

    /// Build a registry from a YAML symbol data document
    pub fn from_yaml(source: &str) -> Result<Self, TableError> {
        let data: SymbolData =
            serde_yaml::from_str(source).map_err(|e| TableError::Syntax(e.to_string()))?;
        Registry::from_data(data)
    }

    fn from_data(data: SymbolData) -> Result<Self, TableError> {
        let mut fragments: HashMap<String, Fragment> = HashMap::new();
        for decl in data.fragments {
            let mut fragment = Fragment::new(
                decl.name.clone(),
                decl.entries.into_iter().map(Entry::from).collect(),
            );
            fragment.overrides = decl.overrides;
            if fragments.insert(decl.name.clone(), fragment).is_some() {
                return Err(TableError::Syntax(format!(
                    "fragment '{}' declared twice",
                    decl.name
                )));
            }
        }

        let mut built: HashMap<String, TableSet> = HashMap::new();
        let mut slots = Vec::with_capacity(data.languages.len());
        let mut index = HashMap::new();

        for decl in &data.languages {
            let code = decl.code.to_ascii_uppercase();
            let base = match &decl.base {
                Some(base) => Some(built.get(&base.to_ascii_uppercase()).ok_or_else(|| {
                    TableError::UnknownBase {
                        language: code.clone(),
                        base: base.clone(),
                    }
                })?),
                None => None,
            };

            let set = build_language(&code, decl, base, &data.markers, &fragments)?;
            let info = LanguageInfo {
                code: code.clone(),
                name: set.name.clone(),
                aliases: decl.aliases.iter().map(|a| a.to_ascii_uppercase()).collect(),
                supported: !set.letters.is_empty(),
            };

            for key in std::iter::once(&info.code).chain(info.aliases.iter()) {
                if index.insert(key.clone(), slots.len()).is_some() {
                    return Err(TableError::DuplicateLanguage(key.clone()));
                }
            }

            let slot = if info.supported {
                log::debug!(
                    "language {}: {} letters, {} punctuation, {} digits, {} denominators, math: {}",
                    code,
                    set.letters.len(),
                    set.punctuation.len(),
                    set.digits.len(),
                    set.denominators.len(),
                    set.math.as_ref().map_or(0, |m| m.len())
                );
                Slot::Ready(Arc::new(set.clone()))
            } else {
                log::debug!("language {code}: placeholder (no letters)");
                Slot::Placeholder
            };
            slots.push((info, slot));
            built.insert(code, set);
        }

        Ok(Registry { slots, index })
    }

    /// The tables for a language, or why they are not available.
    ///
    /// Codes and aliases are matched case-insensitively.
    pub fn load(&self, language: &str) -> Result<Arc<TableSet>, UnsupportedLanguage> {
        let key = language.to_ascii_uppercase();
        let slot = self.index.get(&key).map(|&i| &self.slots[i].1);
        match slot {
            Some(Slot::Ready(set)) => Ok(Arc::clone(set)),
            Some(Slot::Placeholder) => Err(UnsupportedLanguage {
                code: key,
                reason: Unsupported::Placeholder,
            }),
            None => Err(UnsupportedLanguage {
                code: key,
                reason: Unsupported::Unknown,
            }),
        }
    }

    /// Registered languages in declaration order
    pub fn languages(&self) -> impl Iterator<Item = &LanguageInfo> {
        self.slots.iter().map(|(info, _)| info)
    }
}

/// Errors raised while selecting the tables for a decode call
#[derive(Debug)]
pub enum LoadError {
    /// The symbol data file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// The symbol data did not build
    Table(TableError),
    /// The language cannot be decoded with
    Unsupported(UnsupportedLanguage),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read symbol data {}: {}", path.display(), source)
            }
            LoadError::Table(err) => write!(f, "{err}"),
            LoadError::Unsupported(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Table(err) => Some(err),
            LoadError::Unsupported(err) => Some(err),
        }
    }
}

impl From<TableError> for LoadError {
    fn from(err: TableError) -> Self {
        LoadError::Table(err)
    }
}

impl From<UnsupportedLanguage> for LoadError {
    fn from(err: UnsupportedLanguage) -> Self {
        LoadError::Unsupported(err)
    }
}

/// Tables for `language`, from the symbol data file at `path` or the built-in data
pub fn load(path: Option<&Path>, language: &str) -> Result<Arc<TableSet>, LoadError> {
    Ok(Registry::open(path)?.load(language)?)
}

fn build_language(
    code: &str,
    decl: &LanguageDecl,
    base: Option<&TableSet>,
    shared_markers: &MarkerDecl,
    fragments: &HashMap<String, Fragment>,
) -> Result<TableSet, TableError> {
    let compose = |category: Category| -> Result<Option<SymbolTable>, TableError> {
        let names = decl.fragments_for(category);
        let inherited = base.and_then(|b| b.table(category));
        if names.is_empty() && inherited.is_none() {
            return Ok(None);
        }
        let mut builder = match inherited {
            Some(table) => TableBuilder::extending(table),
            None => TableBuilder::new(category),
        };
        for name in names {
            let fragment = fragments.get(name).ok_or_else(|| TableError::UnknownFragment {
                language: code.to_string(),
                fragment: name.clone(),
            })?;
            builder.apply(fragment)?;
        }
        Ok(Some(builder.build()))
    };

    let required = |category: Category| -> Result<SymbolTable, TableError> {
        Ok(compose(category)?.unwrap_or_else(|| SymbolTable::empty(category)))
    };

    let inherited = match base {
        Some(b) => MarkerDecl::from(b.markers),
        None => shared_markers.clone(),
    };
    let marker_decl = inherited.layered(&decl.markers);
    let missing = |marker: &str| TableError::Syntax(format!("language '{code}' has no {marker} marker"));
    let markers = Markers {
        number: marker_decl.number.ok_or_else(|| missing("number"))?,
        markout: marker_decl.markout.ok_or_else(|| missing("markout"))?,
        caps: marker_decl.caps,
        math: marker_decl.math,
    };
    let mut seen = Vec::new();
    for cell in markers.cells() {
        if seen.contains(&cell) {
            return Err(TableError::MarkerConflict {
                language: code.to_string(),
                cell,
            });
        }
        seen.push(cell);
    }

    let set = TableSet {
        code: code.to_string(),
        name: decl
            .name
            .clone()
            .or_else(|| base.map(|b| b.name.clone()))
            .unwrap_or_else(|| code.to_string()),
        letters: required(Category::Letters)?,
        punctuation: required(Category::Punctuation)?,
        digits: required(Category::Digits)?,
        denominators: required(Category::Denominators)?,
        math: compose(Category::Math)?,
        markers,
    };

    // Markers are checked before any table, so a table entry on a marker cell is unreachable.
    for cell in set.markers.cells() {
        for table in [&set.letters, &set.punctuation].into_iter().chain(set.math.as_ref()) {
            if let Some(symbol) = table.get(cell) {
                log::debug!(
                    "language {}: marker cell {} shadows {} entry {:?}",
                    code,
                    cell,
                    table.category(),
                    symbol.text
                );
            }
        }
    }

    Ok(set)
}
