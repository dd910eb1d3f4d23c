//! Exhaustive, lazy declaration traversal.
//!
//! Declarations can be nested arbitrarily deep inside statements,
//! expressions, and bodies, so every node is visited. Order is pre-order,
//! depth-first, left-to-right among children, which fixes diagnostic order
//! within one file. The traversal uses an explicit heap stack rather than
//! recursion, so deep trees cannot overflow the OS stack, and it is lazy:
//! a caller that stops early does no further work.

use crate::classify::classify;
use crate::frontend::{NodeKind, SyntaxNode};
use crate::types::Declaration;

/// Walks the tree rooted at `root`, yielding classified declarations.
#[must_use]
pub fn walk(root: &SyntaxNode) -> Declarations<'_> {
    Declarations {
        stack: vec![(root, 0)],
        ancestors: Vec::new(),
    }
}

/// Lazy pre-order iterator over the declarations in a syntax tree.
pub struct Declarations<'a> {
    // Each entry carries the node and its depth; `ancestors` is truncated
    // to that depth before the node is classified.
    stack: Vec<(&'a SyntaxNode, usize)>,
    ancestors: Vec<NodeKind>,
}

impl Iterator for Declarations<'_> {
    type Item = Declaration;

    fn next(&mut self) -> Option<Declaration> {
        while let Some((node, depth)) = self.stack.pop() {
            self.ancestors.truncate(depth);
            let classified = classify(node, &self.ancestors);

            self.ancestors.push(node.kind);
            for child in node.children.iter().rev() {
                self.stack.push((child, depth + 1));
            }

            if classified.is_some() {
                return classified;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Token;
    use crate::types::{DeclKind, Location};
    use std::path::PathBuf;

    fn at(line: usize, column: usize) -> Location {
        Location::new(PathBuf::from("src/lib.rs"), line, column)
    }

    fn ident_node(kind: NodeKind, name: &str, line: usize, column: usize) -> SyntaxNode {
        SyntaxNode::new(kind, at(line, column)).with_token(Token::identifier(name, at(line, column)))
    }

    /// `let (longVariableName1, longVariableName2) = ...;` inside a method:
    /// one statement, two declarators, two declarations with distinct
    /// locations.
    #[test]
    fn multi_declarator_statement_yields_one_declaration_per_declarator() {
        let local = SyntaxNode::new(NodeKind::LocalDecl, at(2, 5)).with_child(
            SyntaxNode::new(NodeKind::VariableDeclaration, at(2, 5))
                .with_child(ident_node(
                    NodeKind::VariableDeclarator,
                    "longVariableName1",
                    2,
                    10,
                ))
                .with_child(ident_node(
                    NodeKind::VariableDeclarator,
                    "longVariableName2",
                    2,
                    29,
                )),
        );
        let method = ident_node(NodeKind::MethodDecl, "run", 1, 4).with_child(local);
        let root = SyntaxNode::new(NodeKind::Other, at(1, 1)).with_child(method);

        let decls: Vec<_> = walk(&root).collect();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].kind, DeclKind::Method);
        assert_eq!(decls[1].name, "longVariableName1");
        assert_eq!(decls[1].kind, DeclKind::LocalVariable);
        assert_eq!(decls[2].name, "longVariableName2");
        assert_ne!(decls[1].location, decls[2].location);
    }

    #[test]
    fn order_is_preorder_left_to_right() {
        let inner = ident_node(NodeKind::MethodDecl, "inner", 3, 8);
        let ty = ident_node(NodeKind::TypeDecl, "Widget", 1, 8)
            .with_child(
                SyntaxNode::new(NodeKind::FieldDecl, at(2, 5)).with_child(
                    SyntaxNode::new(NodeKind::VariableDeclaration, at(2, 5)).with_child(
                        ident_node(NodeKind::VariableDeclarator, "total", 2, 5),
                    ),
                ),
            )
            .with_child(inner);
        let later = ident_node(NodeKind::MethodDecl, "after", 6, 4);
        let root = SyntaxNode::new(NodeKind::Other, at(1, 1))
            .with_child(ty)
            .with_child(later);

        let names: Vec<_> = walk(&root).map(|d| d.name).collect();
        assert_eq!(names, vec!["Widget", "total", "inner", "after"]);
    }

    #[test]
    fn field_declarator_is_classified_through_siblings() {
        // A declarator following another declarator still sees FieldDecl as
        // its nearest statement ancestor once the first one is popped.
        let field_stmt = SyntaxNode::new(NodeKind::FieldDecl, at(2, 5)).with_child(
            SyntaxNode::new(NodeKind::VariableDeclaration, at(2, 5))
                .with_child(ident_node(NodeKind::VariableDeclarator, "first", 2, 5))
                .with_child(ident_node(NodeKind::VariableDeclarator, "second", 2, 12)),
        );
        let ty = ident_node(NodeKind::TypeDecl, "S", 1, 8).with_child(field_stmt);
        let root = SyntaxNode::new(NodeKind::Other, at(1, 1)).with_child(ty);

        let kinds: Vec<_> = walk(&root).map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DeclKind::Type, DeclKind::Field, DeclKind::Field]
        );
    }

    #[test]
    fn traversal_is_lazy() {
        let mut root = SyntaxNode::new(NodeKind::Other, at(1, 1));
        for i in 0..1000 {
            root = root.with_child(ident_node(NodeKind::MethodDecl, "m", i + 1, 1));
        }
        // Taking one element must not drain the iterator.
        let mut it = walk(&root);
        assert!(it.next().is_some());
    }
}
