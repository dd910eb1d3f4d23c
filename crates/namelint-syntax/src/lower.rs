//! Lowering `syn` ASTs into the core's generic syntax tree.
//!
//! Only declaration shapes survive lowering as distinct nodes; everything
//! else flows through the visitor so that declarations nested arbitrarily
//! deep (closures, nested functions, blocks inside expressions) attach to
//! the nearest open node in source order. A `let` statement that binds
//! several identifiers (`let (a, b) = ..`) lowers to one local-declaration
//! statement holding one declarator list with one declarator per bound
//! identifier, which is what the classifier's multi-declarator rule
//! expects.

use crate::span::ident_location;
use namelint_core::frontend::{FrontendError, NodeKind, SourceParser, SyntaxNode, Token};
use namelint_core::Location;
use std::path::Path;
use syn::visit::{self, Visit};

/// `syn`-based parser implementing the core's front-end contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustParser;

impl RustParser {
    /// Creates a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for RustParser {
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxNode, FrontendError> {
        let ast = syn::parse_file(source).map_err(|e| FrontendError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(lower_file(path, source, &ast))
    }
}

/// Lowers a parsed file into the generic tree.
#[must_use]
pub fn lower_file(file: &Path, source: &str, ast: &syn::File) -> SyntaxNode {
    let root = SyntaxNode::new(NodeKind::Other, Location::new(file.to_path_buf(), 1, 1));
    let mut lowerer = Lowerer {
        file,
        source,
        stack: vec![root],
    };
    lowerer.visit_file(ast);
    lowerer.stack.pop().unwrap_or_else(|| {
        // The stack is opened/closed in matched pairs; the root survives.
        SyntaxNode::new(NodeKind::Other, Location::new(file.to_path_buf(), 1, 1))
    })
}

struct Lowerer<'a> {
    file: &'a Path,
    source: &'a str,
    stack: Vec<SyntaxNode>,
}

impl Lowerer<'_> {
    fn location(&self, ident: &syn::Ident) -> Location {
        ident_location(self.file, self.source, ident)
    }

    /// Opens a declaration node carrying the identifier token.
    fn open(&mut self, kind: NodeKind, ident: &syn::Ident) {
        let loc = self.location(ident);
        let node = SyntaxNode::new(kind, loc.clone())
            .with_token(Token::identifier(ident.to_string(), loc));
        self.stack.push(node);
    }

    /// Closes the top node and attaches it to its parent.
    fn close(&mut self) {
        if let Some(node) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(node);
            } else {
                self.stack.push(node);
            }
        }
    }

    /// Attaches a fully built node to the currently open node.
    fn attach(&mut self, node: SyntaxNode) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn declarator(&self, ident: &syn::Ident) -> SyntaxNode {
        let loc = self.location(ident);
        SyntaxNode::new(NodeKind::VariableDeclarator, loc.clone())
            .with_token(Token::identifier(ident.to_string(), loc))
    }
}

impl<'ast> Visit<'ast> for Lowerer<'_> {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.open(NodeKind::TypeDecl, &node.ident);
        visit::visit_item_struct(self, node);
        self.close();
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.open(NodeKind::TypeDecl, &node.ident);
        visit::visit_item_enum(self, node);
        self.close();
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.open(NodeKind::TypeDecl, &node.ident);
        visit::visit_item_trait(self, node);
        self.close();
    }

    fn visit_item_union(&mut self, node: &'ast syn::ItemUnion) {
        self.open(NodeKind::TypeDecl, &node.ident);
        visit::visit_item_union(self, node);
        self.close();
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.open(NodeKind::TypeDecl, &node.ident);
        visit::visit_item_type(self, node);
        self.close();
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.open(NodeKind::MethodDecl, &node.sig.ident);
        visit::visit_item_fn(self, node);
        self.close();
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.open(NodeKind::MethodDecl, &node.sig.ident);
        visit::visit_impl_item_fn(self, node);
        self.close();
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        self.open(NodeKind::MethodDecl, &node.sig.ident);
        visit::visit_trait_item_fn(self, node);
        self.close();
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.open(NodeKind::PropertyDecl, &node.ident);
        visit::visit_item_const(self, node);
        self.close();
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        self.open(NodeKind::PropertyDecl, &node.ident);
        visit::visit_item_static(self, node);
        self.close();
    }

    fn visit_impl_item_const(&mut self, node: &'ast syn::ImplItemConst) {
        self.open(NodeKind::PropertyDecl, &node.ident);
        visit::visit_impl_item_const(self, node);
        self.close();
    }

    fn visit_trait_item_const(&mut self, node: &'ast syn::TraitItemConst) {
        self.open(NodeKind::PropertyDecl, &node.ident);
        visit::visit_trait_item_const(self, node);
        self.close();
    }

    fn visit_field(&mut self, node: &'ast syn::Field) {
        // Tuple fields have no identifier and are not reportable.
        if let Some(ident) = &node.ident {
            let loc = self.location(ident);
            let stmt = SyntaxNode::new(NodeKind::FieldDecl, loc.clone()).with_child(
                SyntaxNode::new(NodeKind::VariableDeclaration, loc)
                    .with_child(self.declarator(ident)),
            );
            self.attach(stmt);
        }
        visit::visit_field(self, node);
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        let idents = pattern_idents(&node.pat);
        if let Some(first) = idents.first() {
            let loc = self.location(first);
            let mut list = SyntaxNode::new(NodeKind::VariableDeclaration, loc.clone());
            for ident in &idents {
                list.children.push(self.declarator(ident));
            }
            let stmt = SyntaxNode::new(NodeKind::LocalDecl, loc).with_child(list);
            self.stack.push(stmt);
            // Nested declarations inside the initializer (closures, blocks)
            // belong under this statement in pre-order.
            visit::visit_local(self, node);
            self.close();
        } else {
            visit::visit_local(self, node);
        }
    }
}

/// Collects the identifiers bound by a pattern, in source order.
pub(crate) fn pattern_idents(pat: &syn::Pat) -> Vec<&syn::Ident> {
    let mut idents = Vec::new();
    collect_pattern_idents(pat, &mut idents);
    idents
}

fn collect_pattern_idents<'a>(pat: &'a syn::Pat, out: &mut Vec<&'a syn::Ident>) {
    match pat {
        syn::Pat::Ident(p) => {
            out.push(&p.ident);
            if let Some((_, sub)) = &p.subpat {
                collect_pattern_idents(sub, out);
            }
        }
        syn::Pat::Paren(p) => collect_pattern_idents(&p.pat, out),
        syn::Pat::Reference(p) => collect_pattern_idents(&p.pat, out),
        syn::Pat::Type(p) => collect_pattern_idents(&p.pat, out),
        syn::Pat::Or(p) => {
            // All branches bind the same names; the first carries them.
            if let Some(first) = p.cases.first() {
                collect_pattern_idents(first, out);
            }
        }
        syn::Pat::Slice(p) => {
            for elem in &p.elems {
                collect_pattern_idents(elem, out);
            }
        }
        syn::Pat::Tuple(p) => {
            for elem in &p.elems {
                collect_pattern_idents(elem, out);
            }
        }
        syn::Pat::TupleStruct(p) => {
            for elem in &p.elems {
                collect_pattern_idents(elem, out);
            }
        }
        syn::Pat::Struct(p) => {
            for field in &p.fields {
                collect_pattern_idents(&field.pat, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namelint_core::{walk, DeclKind};

    fn declarations(source: &str) -> Vec<(DeclKind, String)> {
        let ast = syn::parse_file(source).unwrap();
        let tree = lower_file(Path::new("src/lib.rs"), source, &ast);
        walk(&tree).map(|d| (d.kind, d.name)).collect()
    }

    #[test]
    fn lowers_items_to_their_kinds() {
        let decls = declarations(
            r#"
struct Invoice {
    total_amount: u32,
}

const MAX_RETRIES: usize = 3;

fn calculate() {
    let running_total = 0;
}
"#,
        );
        assert_eq!(
            decls,
            vec![
                (DeclKind::Type, "Invoice".into()),
                (DeclKind::Field, "total_amount".into()),
                (DeclKind::Property, "MAX_RETRIES".into()),
                (DeclKind::Method, "calculate".into()),
                (DeclKind::LocalVariable, "running_total".into()),
            ]
        );
    }

    #[test]
    fn multi_binding_let_yields_one_declarator_per_identifier() {
        let decls = declarations(
            r#"
fn f() {
    let (longVariableName1, longVariableName2) = (1, 2);
}
"#,
        );
        assert_eq!(
            decls,
            vec![
                (DeclKind::Method, "f".into()),
                (DeclKind::LocalVariable, "longVariableName1".into()),
                (DeclKind::LocalVariable, "longVariableName2".into()),
            ]
        );
    }

    #[test]
    fn impl_and_trait_members_are_methods_and_properties() {
        let decls = declarations(
            r#"
trait Pricing {
    const RATE: u32;
    fn price(&self) -> u32;
}

struct Item;

impl Item {
    const LIMIT: u32 = 9;
    fn cost(&self) -> u32 { 0 }
}
"#,
        );
        assert_eq!(
            decls,
            vec![
                (DeclKind::Type, "Pricing".into()),
                (DeclKind::Property, "RATE".into()),
                (DeclKind::Method, "price".into()),
                (DeclKind::Type, "Item".into()),
                (DeclKind::Property, "LIMIT".into()),
                (DeclKind::Method, "cost".into()),
            ]
        );
    }

    #[test]
    fn declarations_nested_in_closures_and_blocks_are_found() {
        let decls = declarations(
            r#"
fn outer() {
    let residual = (|| {
        let captured_subtotal = 5;
        captured_subtotal
    })();
    if residual > 0 {
        let leftover = residual;
        let _ = leftover;
    }
}
"#,
        );
        let names: Vec<_> = decls.into_iter().map(|(_, n)| n).collect();
        assert_eq!(
            names,
            vec!["outer", "residual", "captured_subtotal", "leftover"]
        );
    }

    #[test]
    fn tuple_fields_are_not_reported() {
        let decls = declarations("struct Pair(u32, u32);\n");
        assert_eq!(decls, vec![(DeclKind::Type, "Pair".into())]);
    }

    #[test]
    fn parser_reports_parse_errors_per_file() {
        let err = RustParser::new()
            .parse(Path::new("bad.rs"), "fn broken( {")
            .unwrap_err();
        assert!(matches!(err, FrontendError::Parse { .. }));
    }
}
