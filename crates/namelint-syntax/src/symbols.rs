//! Project-wide symbol table and the core's `SymbolModel` implementation.
//!
//! Resolution is lexical: symbols are keyed by name (and owning type for
//! members), not by full module paths. That is enough to rename within one
//! project snapshot, and it degrades predictably: a declaration the table
//! cannot resolve makes the fixer reject that one diagnostic instead of
//! failing the run.
//!
//! Construction runs three sweeps over the parsed files:
//!
//! 1. item declarations (types, free functions, consts/statics, trait
//!    members, named fields),
//! 2. impl blocks, where a member implementing a known trait member shares
//!    the trait member's symbol so one rename covers both sites,
//! 3. bodies, which register `let` locals and collect every identifier
//!    occurrence (see [`crate::references`]).

use crate::references;
use crate::span::ident_location;
use namelint_core::frontend::{Reference, SymbolModel};
use namelint_core::{Location, SymbolId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What a symbol is, for collision messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    Type,
    Function,
    Constant,
    Field,
    Method,
    AssociatedConst,
    Local,
}

impl SymbolKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Function => "function",
            Self::Constant => "constant",
            Self::Field => "field",
            Self::Method => "method",
            Self::AssociatedConst => "associated constant",
            Self::Local => "local variable",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SymbolData {
    pub(crate) name: String,
    pub(crate) kind: SymbolKind,
    pub(crate) file: PathBuf,
    pub(crate) line: usize,
    /// Owning type (or trait) name for members.
    pub(crate) owner: Option<String>,
    /// Lexical scope for locals.
    pub(crate) scope: Option<usize>,
}

/// An entry visible in a lexical scope.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScopeEntry {
    /// A reportable `let` local with its own symbol.
    Local(SymbolId),
    /// A non-reportable binding (parameter, match arm, loop pattern) that
    /// still occupies the name.
    Binding,
}

/// Resolved symbols for one project snapshot.
pub struct SymbolTable {
    symbols: Vec<SymbolData>,
    /// Declaration identifier site -> symbol, keyed by (file, byte offset).
    by_site: HashMap<(PathBuf, usize), SymbolId>,
    /// Module-level symbols by name. More than one entry means the name is
    /// ambiguous under lexical resolution and reference sites skip it.
    globals: HashMap<String, Vec<SymbolId>>,
    /// Members keyed by (owning type name, member name).
    members: HashMap<(String, String), SymbolId>,
    /// Parent link per lexical scope.
    scopes: Vec<Option<usize>>,
    /// Names bound in each scope.
    bound: HashMap<(usize, String), ScopeEntry>,
    occurrences: HashMap<SymbolId, Vec<Reference>>,
}

impl SymbolTable {
    /// Builds the table for `files` (paths relative to `root`).
    ///
    /// Never fails: files that cannot be read or parsed are skipped with a
    /// warning, leaving their symbols unresolved.
    #[must_use]
    pub fn build(root: &Path, files: &[PathBuf]) -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            by_site: HashMap::new(),
            globals: HashMap::new(),
            members: HashMap::new(),
            scopes: Vec::new(),
            bound: HashMap::new(),
            occurrences: HashMap::new(),
        };

        let mut parsed = Vec::new();
        for rel in files {
            let path = root.join(rel);
            let source = match std::fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            match syn::parse_file(&source) {
                Ok(ast) => parsed.push((rel.clone(), source, ast)),
                Err(e) => {
                    warn!(file = %rel.display(), error = %e, "skipping unparseable file");
                }
            }
        }

        for (rel, source, ast) in &parsed {
            let mut collector = DeclCollector {
                table: &mut table,
                file: rel,
                source,
                owner: None,
            };
            syn::visit::visit_file(&mut collector, ast);
        }
        for (rel, source, ast) in &parsed {
            collect_impls(&mut table, rel, source, ast);
        }
        for (rel, source, ast) in &parsed {
            references::collect_file(&mut table, rel, source, ast);
        }
        debug!(
            symbols = table.symbols.len(),
            files = parsed.len(),
            "symbol table built"
        );
        table
    }

    pub(crate) fn add_symbol(&mut self, data: SymbolData, site_offset: usize) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        self.by_site
            .insert((data.file.clone(), site_offset), id);
        self.symbols.push(data);
        id
    }

    pub(crate) fn add_global(&mut self, data: SymbolData, site_offset: usize) -> SymbolId {
        let name = data.name.clone();
        let id = self.add_symbol(data, site_offset);
        self.globals.entry(name).or_default().push(id);
        id
    }

    pub(crate) fn add_member(&mut self, data: SymbolData, site_offset: usize) -> SymbolId {
        let key = (
            data.owner.clone().unwrap_or_default(),
            data.name.clone(),
        );
        let id = self.add_symbol(data, site_offset);
        // The first declaration wins when a type has a field and a method
        // sharing a name; later ones keep their symbol but resolve by site
        // only.
        self.members.entry(key).or_insert(id);
        id
    }

    /// Registers an impl member site against an existing (trait) symbol.
    pub(crate) fn alias_site(&mut self, file: &Path, offset: usize, id: SymbolId) {
        self.by_site.insert((file.to_path_buf(), offset), id);
    }

    pub(crate) fn push_scope(&mut self, parent: Option<usize>) -> usize {
        self.scopes.push(parent);
        self.scopes.len() - 1
    }

    pub(crate) fn bind(&mut self, scope: usize, name: String, entry: ScopeEntry) {
        self.bound.insert((scope, name), entry);
    }

    /// Resolves `name` through the scope chain starting at `scope`.
    pub(crate) fn resolve_in_scope(&self, scope: usize, name: &str) -> Option<ScopeEntry> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(entry) = self.bound.get(&(s, name.to_string())) {
                return Some(*entry);
            }
            current = self.scopes.get(s).copied().flatten();
        }
        None
    }

    /// Resolves a module-level name, preferring a symbol declared in
    /// `from_file`, otherwise requiring the name to be project-unique.
    pub(crate) fn resolve_global(&self, name: &str, from_file: &Path) -> Option<SymbolId> {
        let ids = self.globals.get(name)?;
        match ids.as_slice() {
            [only] => Some(*only),
            many => many
                .iter()
                .copied()
                .find(|id| self.symbols[id.0 as usize].file == from_file),
        }
    }

    pub(crate) fn member(&self, owner: &str, name: &str) -> Option<SymbolId> {
        self.members
            .get(&(owner.to_string(), name.to_string()))
            .copied()
    }

    /// Returns true when `name` resolves to a known type.
    pub(crate) fn is_type(&self, name: &str) -> bool {
        self.globals
            .get(name)
            .is_some_and(|ids| ids.iter().any(|id| {
                self.symbols[id.0 as usize].kind == SymbolKind::Type
            }))
    }

    pub(crate) fn record(&mut self, id: SymbolId, reference: Reference) {
        self.occurrences.entry(id).or_default().push(reference);
    }

    pub(crate) fn record_ident(&mut self, id: SymbolId, file: &Path, source: &str, ident: &syn::Ident) {
        let loc = ident_location(file, source, ident);
        self.record(
            id,
            Reference {
                file: loc.file,
                offset: loc.offset,
                length: loc.length,
                text: ident.to_string(),
            },
        );
    }

    fn data(&self, id: SymbolId) -> Option<&SymbolData> {
        self.symbols.get(id.0 as usize)
    }

    fn describe(&self, id: SymbolId) -> String {
        match self.data(id) {
            Some(d) => format!(
                "{} `{}` at {}:{}",
                d.kind.describe(),
                d.name,
                d.file.display(),
                d.line
            ),
            None => "unknown symbol".to_string(),
        }
    }
}

impl SymbolModel for SymbolTable {
    fn resolve(&self, location: &Location) -> Option<SymbolId> {
        self.by_site
            .get(&(location.file.clone(), location.offset))
            .copied()
    }

    fn find_references(&self, symbol: SymbolId) -> Vec<Reference> {
        self.occurrences.get(&symbol).cloned().unwrap_or_default()
    }

    fn lookup_collision(&self, symbol: SymbolId, candidate: &str) -> Option<String> {
        let data = self.data(symbol)?;
        if data.name == candidate {
            return None;
        }

        if let Some(owner) = &data.owner {
            if let Some(other) = self.member(owner, candidate) {
                if other != symbol {
                    return Some(self.describe(other));
                }
            }
            return None;
        }

        if let Some(scope) = data.scope {
            // Walk outward through enclosing scopes, then module level.
            let mut current = Some(scope);
            while let Some(s) = current {
                match self.bound.get(&(s, candidate.to_string())) {
                    Some(ScopeEntry::Local(other)) if *other != symbol => {
                        return Some(self.describe(*other));
                    }
                    Some(ScopeEntry::Binding) => {
                        return Some(format!("binding `{candidate}` in an enclosing scope"));
                    }
                    _ => {}
                }
                current = self.scopes.get(s).copied().flatten();
            }
            if let Some(other) = self.resolve_global(candidate, &data.file) {
                return Some(self.describe(other));
            }
            return None;
        }

        // Module-level symbol: any other module-level symbol with the
        // candidate name collides, anywhere in the project.
        if let Some(ids) = self.globals.get(candidate) {
            if let Some(other) = ids.iter().find(|id| **id != symbol) {
                return Some(self.describe(*other));
            }
        }
        None
    }
}

/// Sweep 1: module-level items, trait members, named fields.
struct DeclCollector<'a> {
    table: &'a mut SymbolTable,
    file: &'a Path,
    source: &'a str,
    /// Enclosing type or trait name, for fields and trait members.
    owner: Option<String>,
}

impl DeclCollector<'_> {
    fn add_global(&mut self, ident: &syn::Ident, kind: SymbolKind) {
        let loc = ident_location(self.file, self.source, ident);
        self.table.add_global(
            SymbolData {
                name: ident.to_string(),
                kind,
                file: self.file.to_path_buf(),
                line: loc.line,
                owner: None,
                scope: None,
            },
            loc.offset,
        );
    }

    fn add_member(&mut self, ident: &syn::Ident, kind: SymbolKind, owner: String) {
        let loc = ident_location(self.file, self.source, ident);
        self.table.add_member(
            SymbolData {
                name: ident.to_string(),
                kind,
                file: self.file.to_path_buf(),
                line: loc.line,
                owner: Some(owner),
                scope: None,
            },
            loc.offset,
        );
    }

    fn with_owner<F: FnOnce(&mut Self)>(&mut self, name: String, f: F) {
        let previous = self.owner.replace(name);
        f(self);
        self.owner = previous;
    }
}

impl<'ast> syn::visit::Visit<'ast> for DeclCollector<'_> {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.add_global(&node.ident, SymbolKind::Type);
        self.with_owner(node.ident.to_string(), |this| {
            syn::visit::visit_item_struct(this, node);
        });
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.add_global(&node.ident, SymbolKind::Type);
        self.with_owner(node.ident.to_string(), |this| {
            syn::visit::visit_item_enum(this, node);
        });
    }

    fn visit_item_union(&mut self, node: &'ast syn::ItemUnion) {
        self.add_global(&node.ident, SymbolKind::Type);
        self.with_owner(node.ident.to_string(), |this| {
            syn::visit::visit_item_union(this, node);
        });
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.add_global(&node.ident, SymbolKind::Type);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.add_global(&node.ident, SymbolKind::Type);
        self.with_owner(node.ident.to_string(), |this| {
            syn::visit::visit_item_trait(this, node);
        });
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.add_global(&node.sig.ident, SymbolKind::Function);
        // Item declarations nested in the body are module-level too.
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.add_global(&node.ident, SymbolKind::Constant);
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        self.add_global(&node.ident, SymbolKind::Constant);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        if let Some(owner) = self.owner.clone() {
            self.add_member(&node.sig.ident, SymbolKind::Method, owner);
        }
    }

    fn visit_trait_item_const(&mut self, node: &'ast syn::TraitItemConst) {
        if let Some(owner) = self.owner.clone() {
            self.add_member(&node.ident, SymbolKind::AssociatedConst, owner);
        }
    }

    fn visit_field(&mut self, node: &'ast syn::Field) {
        if let (Some(ident), Some(owner)) = (&node.ident, self.owner.clone()) {
            self.add_member(ident, SymbolKind::Field, owner);
        }
    }

    fn visit_item_impl(&mut self, _node: &'ast syn::ItemImpl) {
        // Impl members are collected in sweep 2 once traits are known.
    }
}

/// Sweep 2: impl block members, aliasing trait implementations to the
/// trait's member symbols.
fn collect_impls(table: &mut SymbolTable, file: &Path, source: &str, ast: &syn::File) {
    struct ImplCollector<'a> {
        table: &'a mut SymbolTable,
        file: &'a Path,
        source: &'a str,
    }

    impl<'ast> syn::visit::Visit<'ast> for ImplCollector<'_> {
        fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
            let Some(type_name) = impl_type_name(node) else {
                syn::visit::visit_item_impl(self, node);
                return;
            };
            let trait_name = node
                .trait_
                .as_ref()
                .and_then(|(_, path, _)| path.segments.last())
                .map(|seg| seg.ident.to_string());

            for item in &node.items {
                let (ident, kind) = match item {
                    syn::ImplItem::Fn(f) => (&f.sig.ident, SymbolKind::Method),
                    syn::ImplItem::Const(c) => (&c.ident, SymbolKind::AssociatedConst),
                    _ => continue,
                };
                let loc = ident_location(self.file, self.source, ident);
                let shared = trait_name
                    .as_deref()
                    .and_then(|t| self.table.member(t, &ident.to_string()));
                if let Some(id) = shared {
                    self.table.alias_site(self.file, loc.offset, id);
                } else {
                    self.table.add_member(
                        SymbolData {
                            name: ident.to_string(),
                            kind,
                            file: self.file.to_path_buf(),
                            line: loc.line,
                            owner: Some(type_name.clone()),
                            scope: None,
                        },
                        loc.offset,
                    );
                }
            }
            syn::visit::visit_item_impl(self, node);
        }
    }

    let mut collector = ImplCollector {
        table,
        file,
        source,
    };
    syn::visit::visit_file(&mut collector, ast);
}

/// Extracts the implemented type's simple name from an impl block.
pub(crate) fn impl_type_name(node: &syn::ItemImpl) -> Option<String> {
    match node.self_ty.as_ref() {
        syn::Type::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}
