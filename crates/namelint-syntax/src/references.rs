//! Occurrence collection over function bodies and type positions.
//!
//! The third construction sweep. One visitor per file registers `let`
//! locals into the symbol table and records an occurrence for every
//! identifier site it can attribute to a symbol: declaration idents, path
//! expressions, type annotations, method calls, field accesses, struct
//! literals and patterns, and `use` leaves. Attribution is conservative:
//! an identifier that cannot be resolved (shadowed by an opaque binding,
//! ambiguous global, unknown receiver type) is left alone, which can only
//! make the fixer reject a rename, never corrupt one.

use crate::lower::pattern_idents;
use crate::span::ident_location;
use crate::symbols::{impl_type_name, ScopeEntry, SymbolData, SymbolKind, SymbolTable};
use namelint_core::frontend::SymbolModel;
use namelint_core::SymbolId;
use std::collections::HashMap;
use std::path::Path;
use syn::visit::Visit;

/// Registers locals and records occurrences for one file.
pub(crate) fn collect_file(table: &mut SymbolTable, file: &Path, source: &str, ast: &syn::File) {
    let root = table.push_scope(None);
    let mut visitor = RefVisitor {
        table,
        file,
        source,
        scopes: vec![root],
        types: HashMap::new(),
        impl_type: None,
    };
    visitor.visit_file(ast);
}

struct RefVisitor<'a> {
    table: &'a mut SymbolTable,
    file: &'a Path,
    source: &'a str,
    /// Stack of open lexical scopes; the last is the current one.
    scopes: Vec<usize>,
    /// Inferred types of bindings, keyed by (scope, name).
    types: HashMap<(usize, String), String>,
    impl_type: Option<String>,
}

impl RefVisitor<'_> {
    fn current_scope(&self) -> usize {
        *self.scopes.last().unwrap_or(&0)
    }

    fn enter_scope(&mut self) {
        let child = self.table.push_scope(Some(self.current_scope()));
        self.scopes.push(child);
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn record(&mut self, id: SymbolId, ident: &syn::Ident) {
        self.table.record_ident(id, self.file, self.source, ident);
    }

    /// Records a declaration identifier against its registered symbol.
    fn record_site(&mut self, ident: &syn::Ident) {
        let loc = ident_location(self.file, self.source, ident);
        if let Some(id) = self.table.resolve(&loc) {
            self.record(id, ident);
        }
    }

    fn bind_opaque(&mut self, pat: &syn::Pat) {
        let scope = self.current_scope();
        for ident in pattern_idents(pat) {
            self.table
                .bind(scope, ident.to_string(), ScopeEntry::Binding);
        }
    }

    fn bind_type(&mut self, name: &str, ty: String) {
        self.types
            .insert((self.current_scope(), name.to_string()), ty);
    }

    fn type_of_binding(&self, name: &str) -> Option<&String> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| self.types.get(&(*scope, name.to_string())))
    }

    /// Simple name of a type, through references.
    fn type_name(ty: &syn::Type) -> Option<String> {
        match ty {
            syn::Type::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
            syn::Type::Reference(r) => Self::type_name(&r.elem),
            syn::Type::Paren(p) => Self::type_name(&p.elem),
            _ => None,
        }
    }

    /// Shallow type inference for rename-relevant initializers: another
    /// binding, a struct literal, or a `Type::new()`-shaped call.
    fn infer_expr_type(&self, expr: &syn::Expr) -> Option<String> {
        match expr {
            syn::Expr::Path(p) => {
                let ident = p.path.get_ident()?;
                self.type_of_binding(&ident.to_string()).cloned()
            }
            syn::Expr::Struct(s) => s.path.segments.last().map(|s| s.ident.to_string()),
            syn::Expr::Call(call) => {
                if let syn::Expr::Path(p) = call.func.as_ref() {
                    let segs: Vec<_> = p.path.segments.iter().collect();
                    if segs.len() >= 2 {
                        let candidate = segs[segs.len() - 2].ident.to_string();
                        let candidate = if candidate == "Self" {
                            self.impl_type.clone()?
                        } else {
                            candidate
                        };
                        if self.table.is_type(&candidate) {
                            return Some(candidate);
                        }
                    }
                }
                None
            }
            syn::Expr::Reference(r) => self.infer_expr_type(&r.expr),
            syn::Expr::Paren(p) => self.infer_expr_type(&p.expr),
            _ => None,
        }
    }

    /// Resolves and records the identifiers of a path.
    ///
    /// In expression position a single-segment path goes through the scope
    /// chain first; a name occupied by an opaque binding is never
    /// attributed to an outer symbol.
    fn handle_path(&mut self, path: &syn::Path, expr_position: bool) {
        let segments: Vec<_> = path.segments.iter().collect();
        if expr_position && segments.len() == 1 {
            let ident = &segments[0].ident;
            let name = ident.to_string();
            match self.table.resolve_in_scope(self.current_scope(), &name) {
                Some(ScopeEntry::Local(id)) => self.record(id, ident),
                Some(ScopeEntry::Binding) => {}
                None => {
                    if let Some(id) = self.table.resolve_global(&name, self.file) {
                        self.record(id, ident);
                    }
                }
            }
            return;
        }

        let mut prev_type: Option<String> = None;
        // A path is only attributable when its prefix stays inside the
        // project: a bare name, a known type, or crate/super/self. The last
        // segment of `std::fs::read_to_string` must never be attributed to
        // a same-named project function.
        let mut prefix_known = true;
        let count = segments.len();
        for (i, segment) in segments.into_iter().enumerate() {
            let name = segment.ident.to_string();
            if name == "Self" {
                prev_type = self.impl_type.clone();
            } else if name == "crate" || name == "super" || name == "self" {
                prev_type = None;
            } else if i + 1 == count {
                let member = prev_type
                    .as_deref()
                    .and_then(|t| self.table.member(t, &name));
                if let Some(id) = member {
                    self.record(id, &segment.ident);
                } else if prefix_known {
                    if let Some(id) = self.table.resolve_global(&name, self.file) {
                        self.record(id, &segment.ident);
                    }
                }
            } else if self.table.is_type(&name) {
                if let Some(id) = self.table.resolve_global(&name, self.file) {
                    self.record(id, &segment.ident);
                }
                prev_type = Some(name);
            } else {
                prev_type = None;
                prefix_known = false;
            }
            syn::visit::visit_path_arguments(self, &segment.arguments);
        }
    }

    /// Binds a function signature's inputs in the current scope.
    fn bind_signature(&mut self, sig: &syn::Signature) {
        for input in &sig.inputs {
            match input {
                syn::FnArg::Receiver(_) => {
                    if let Some(ty) = self.impl_type.clone() {
                        self.bind_type("self", ty);
                    }
                    let scope = self.current_scope();
                    self.table
                        .bind(scope, "self".to_string(), ScopeEntry::Binding);
                }
                syn::FnArg::Typed(pt) => {
                    self.bind_opaque(&pt.pat);
                    if let (syn::Pat::Ident(pi), Some(ty)) =
                        (pt.pat.as_ref(), Self::type_name(&pt.ty))
                    {
                        self.bind_type(&pi.ident.to_string(), ty);
                    }
                }
            }
        }
    }

    fn visit_fn_like(&mut self, sig: &syn::Signature, body: Option<&syn::Block>) {
        self.record_site(&sig.ident);
        self.enter_scope();
        self.bind_signature(sig);
        syn::visit::visit_signature(self, sig);
        if let Some(block) = body {
            self.visit_block(block);
        }
        self.exit_scope();
    }
}

impl<'ast> Visit<'ast> for RefVisitor<'_> {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.handle_path(node, false);
    }

    fn visit_expr_path(&mut self, node: &'ast syn::ExprPath) {
        if let Some(qself) = &node.qself {
            self.visit_type(&qself.ty);
        }
        self.handle_path(&node.path, true);
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.visit_fn_like(&node.sig, Some(&node.block));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.visit_fn_like(&node.sig, Some(&node.block));
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        self.visit_fn_like(&node.sig, node.default.as_ref());
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        if let Some((_, trait_path, _)) = &node.trait_ {
            self.handle_path(trait_path, false);
        }
        self.visit_type(&node.self_ty);
        let previous = std::mem::replace(&mut self.impl_type, impl_type_name(node));
        for item in &node.items {
            self.visit_impl_item(item);
        }
        self.impl_type = previous;
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.record_site(&node.ident);
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.record_site(&node.ident);
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_union(&mut self, node: &'ast syn::ItemUnion) {
        self.record_site(&node.ident);
        syn::visit::visit_item_union(self, node);
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.record_site(&node.ident);
        syn::visit::visit_item_type(self, node);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.record_site(&node.ident);
        syn::visit::visit_item_trait(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.record_site(&node.ident);
        syn::visit::visit_item_const(self, node);
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        self.record_site(&node.ident);
        syn::visit::visit_item_static(self, node);
    }

    fn visit_trait_item_const(&mut self, node: &'ast syn::TraitItemConst) {
        self.record_site(&node.ident);
        syn::visit::visit_trait_item_const(self, node);
    }

    fn visit_impl_item_const(&mut self, node: &'ast syn::ImplItemConst) {
        self.record_site(&node.ident);
        syn::visit::visit_impl_item_const(self, node);
    }

    fn visit_field(&mut self, node: &'ast syn::Field) {
        if let Some(ident) = &node.ident {
            self.record_site(ident);
        }
        syn::visit::visit_field(self, node);
    }

    fn visit_block(&mut self, node: &'ast syn::Block) {
        self.enter_scope();
        syn::visit::visit_block(self, node);
        self.exit_scope();
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        // The initializer is visited before the new bindings exist, so
        // `let x = x;` attributes the right-hand side to the outer `x`.
        if let Some(init) = &node.init {
            self.visit_expr(&init.expr);
            if let Some((_, diverge)) = &init.diverge {
                self.visit_expr(diverge);
            }
        }

        let inferred = match node.pat {
            syn::Pat::Type(ref pt) => Self::type_name(&pt.ty),
            _ => None,
        }
        .or_else(|| {
            node.init
                .as_ref()
                .and_then(|init| self.infer_expr_type(&init.expr))
        });

        let idents = pattern_idents(&node.pat);
        let single = idents.len() == 1;
        let scope = self.current_scope();
        for ident in idents {
            let loc = ident_location(self.file, self.source, ident);
            let id = self.table.add_symbol(
                SymbolData {
                    name: ident.to_string(),
                    kind: SymbolKind::Local,
                    file: self.file.to_path_buf(),
                    line: loc.line,
                    owner: None,
                    scope: Some(scope),
                },
                loc.offset,
            );
            self.table
                .bind(scope, ident.to_string(), ScopeEntry::Local(id));
            self.record(id, ident);
            if single {
                if let Some(ty) = inferred.clone() {
                    self.bind_type(&ident.to_string(), ty);
                }
            }
        }

        // The pattern may carry type annotations and destructured fields.
        self.visit_pat(&node.pat);
    }

    fn visit_expr_closure(&mut self, node: &'ast syn::ExprClosure) {
        self.enter_scope();
        for input in &node.inputs {
            self.bind_opaque(input);
            if let syn::Pat::Type(pt) = input {
                if let (syn::Pat::Ident(pi), Some(ty)) =
                    (pt.pat.as_ref(), Self::type_name(&pt.ty))
                {
                    self.bind_type(&pi.ident.to_string(), ty);
                }
            }
        }
        self.visit_expr(&node.body);
        self.exit_scope();
    }

    fn visit_arm(&mut self, node: &'ast syn::Arm) {
        self.enter_scope();
        self.bind_opaque(&node.pat);
        syn::visit::visit_arm(self, node);
        self.exit_scope();
    }

    fn visit_expr_for_loop(&mut self, node: &'ast syn::ExprForLoop) {
        self.visit_expr(&node.expr);
        self.enter_scope();
        self.bind_opaque(&node.pat);
        self.visit_pat(&node.pat);
        self.visit_block(&node.body);
        self.exit_scope();
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        if let Some(receiver) = self.infer_expr_type(&node.receiver) {
            if let Some(id) = self.table.member(&receiver, &node.method.to_string()) {
                self.record(id, &node.method);
            }
        }
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_field(&mut self, node: &'ast syn::ExprField) {
        if let syn::Member::Named(field) = &node.member {
            if let Some(base) = self.infer_expr_type(&node.base) {
                if let Some(id) = self.table.member(&base, &field.to_string()) {
                    self.record(id, field);
                }
            }
        }
        syn::visit::visit_expr_field(self, node);
    }

    fn visit_expr_struct(&mut self, node: &'ast syn::ExprStruct) {
        self.handle_path(&node.path, false);
        let owner = node.path.segments.last().map(|s| s.ident.to_string());
        for field in &node.fields {
            if let syn::Member::Named(name) = &field.member {
                if let Some(id) = owner
                    .as_deref()
                    .and_then(|t| self.table.member(t, &name.to_string()))
                {
                    self.record(id, name);
                }
            }
            if field.colon_token.is_some() {
                self.visit_expr(&field.expr);
            } else if let (syn::Member::Named(name), syn::Expr::Path(_)) =
                (&field.member, &field.expr)
            {
                // Shorthand `S { field }`: the same ident is also a read of
                // the binding named `field`.
                if let Some(ScopeEntry::Local(id)) =
                    self.table.resolve_in_scope(self.current_scope(), &name.to_string())
                {
                    self.record(id, name);
                }
            }
        }
        if let Some(rest) = &node.rest {
            self.visit_expr(rest);
        }
    }

    fn visit_pat_struct(&mut self, node: &'ast syn::PatStruct) {
        self.handle_path(&node.path, false);
        let owner = node.path.segments.last().map(|s| s.ident.to_string());
        for field in &node.fields {
            if let syn::Member::Named(name) = &field.member {
                if let Some(id) = owner
                    .as_deref()
                    .and_then(|t| self.table.member(t, &name.to_string()))
                {
                    self.record(id, name);
                }
            }
            if field.colon_token.is_some() {
                self.visit_pat(&field.pat);
            }
        }
    }

    fn visit_use_name(&mut self, node: &'ast syn::UseName) {
        let name = node.ident.to_string();
        if let Some(id) = self.table.resolve_global(&name, self.file) {
            self.record(id, &node.ident);
        }
    }

    fn visit_use_rename(&mut self, node: &'ast syn::UseRename) {
        let name = node.ident.to_string();
        if let Some(id) = self.table.resolve_global(&name, self.file) {
            self.record(id, &node.ident);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namelint_core::Location;
    use std::path::PathBuf;

    fn table_for(source: &str) -> SymbolTable {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("lib.rs"), source).unwrap();
        SymbolTable::build(dir.path(), &[PathBuf::from("lib.rs")])
    }

    fn offset(source: &str, needle: &str, occurrence: usize) -> usize {
        source
            .match_indices(needle)
            .nth(occurrence)
            .map(|(i, _)| i)
            .unwrap()
    }

    fn resolve_at(table: &SymbolTable, source: &str, needle: &str, occurrence: usize) -> SymbolId {
        let loc = Location::new(PathBuf::from("lib.rs"), 1, 1)
            .with_span(offset(source, needle, occurrence), needle.len());
        table.resolve(&loc).unwrap()
    }

    #[test]
    fn function_call_sites_are_collected() {
        let src = "\
fn calculate_total_amount() -> u32 { 0 }
fn caller() {
    let x = calculate_total_amount();
    let y = calculate_total_amount();
    let _ = (x, y);
}
";
        let table = table_for(src);
        let id = resolve_at(&table, src, "calculate_total_amount", 0);
        let offsets: Vec<_> = table
            .find_references(id)
            .into_iter()
            .map(|r| r.offset)
            .collect();
        for occurrence in 0..3 {
            assert!(offsets.contains(&offset(src, "calculate_total_amount", occurrence)));
        }
    }

    #[test]
    fn method_calls_resolve_through_inferred_receiver_types() {
        let src = "\
struct Invoice { amount: u32 }
impl Invoice {
    fn new() -> Invoice { Invoice { amount: 0 } }
    fn computed_total(&self) -> u32 { self.amount }
}
fn caller() {
    let inv = Invoice::new();
    let _ = inv.computed_total();
}
";
        let table = table_for(src);
        let id = resolve_at(&table, src, "computed_total", 0);
        let refs = table.find_references(id);
        assert!(refs
            .iter()
            .any(|r| r.offset == offset(src, "computed_total", 1)));
    }

    #[test]
    fn field_access_and_struct_literals_resolve_fields() {
        let src = "\
struct Invoice { amount: u32 }
fn caller() {
    let inv = Invoice { amount: 3 };
    let _ = inv.amount;
}
";
        let table = table_for(src);
        let id = resolve_at(&table, src, "amount", 0);
        let refs = table.find_references(id);
        // Declaration, literal, and read.
        assert!(refs.len() >= 3);
        for occurrence in 0..3 {
            assert!(refs
                .iter()
                .any(|r| r.offset == offset(src, "amount", occurrence)));
        }
    }

    #[test]
    fn shadowing_bindings_block_outer_attribution() {
        let src = "\
fn f() {
    let value = 1;
    let doubled = match value {
        value => value + 1,
    };
    let _ = doubled;
}
";
        let table = table_for(src);
        let id = resolve_at(&table, src, "value", 0);
        let refs = table.find_references(id);
        // Declaration plus the match scrutinee; the arm's `value` sites
        // belong to the arm binding.
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn type_annotations_and_use_paths_reference_types() {
        let src = "\
pub struct WidelyUsedRecord;
mod inner {
    use super::WidelyUsedRecord;
    fn consume(r: &WidelyUsedRecord) -> Option<WidelyUsedRecord> { let _ = r; None }
}
";
        let table = table_for(src);
        let id = resolve_at(&table, src, "WidelyUsedRecord", 0);
        let refs = table.find_references(id);
        for occurrence in 0..4 {
            assert!(refs
                .iter()
                .any(|r| r.offset == offset(src, "WidelyUsedRecord", occurrence)));
        }
    }

    #[test]
    fn let_shadowing_outer_local_is_read_before_rebinding() {
        let src = "\
fn f() {
    let count = 1;
    let count = count + 1;
    let _ = count;
}
";
        let table = table_for(src);
        let outer = resolve_at(&table, src, "count", 0);
        let inner = resolve_at(&table, src, "count", 1);
        assert_ne!(outer, inner);
        let outer_refs = table.find_references(outer);
        // Outer: its declaration and the read in the second initializer.
        assert_eq!(outer_refs.len(), 2);
        assert!(outer_refs
            .iter()
            .any(|r| r.offset == offset(src, "count", 2)));
        // Inner: its declaration and the final read.
        assert_eq!(table.find_references(inner).len(), 2);
    }
}
