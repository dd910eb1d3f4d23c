//! Declaration classification.
//!
//! Decides whether a syntax node is a reportable declaration, and if so,
//! extracts its identifier token and declaration kind. The interesting case
//! is a variable declarator: the same node shape is a field when its
//! enclosing statement is a field declaration and a local variable when it
//! is a local declaration, so classification inspects the nearest statement
//! ancestor rather than the direct parent (the declarator sits one level
//! below the declaration statement, under the declarator list).

use crate::frontend::{NodeKind, SyntaxNode};
use crate::types::{Declaration, DeclKind};

/// Classifies a node given the kinds of its ancestors, outermost first.
///
/// Returns `None` for non-declaration nodes, for declarator-list and
/// declaration-statement nodes themselves (only declarators are reported,
/// so one identifier is never reported twice), and for malformed
/// declaration nodes that carry no identifier token.
#[must_use]
pub fn classify(node: &SyntaxNode, ancestors: &[NodeKind]) -> Option<Declaration> {
    let kind = match node.kind {
        NodeKind::TypeDecl => DeclKind::Type,
        NodeKind::MethodDecl => DeclKind::Method,
        NodeKind::PropertyDecl => DeclKind::Property,
        NodeKind::VariableDeclarator => declarator_kind(ancestors)?,
        NodeKind::FieldDecl
        | NodeKind::LocalDecl
        | NodeKind::VariableDeclaration
        | NodeKind::Other => return None,
    };

    let ident = node.identifier()?;
    Some(Declaration {
        kind,
        name: ident.text.clone(),
        location: ident.location.clone(),
    })
}

/// Resolves a declarator's kind from its nearest statement ancestor,
/// skipping the declarator-list node in between.
fn declarator_kind(ancestors: &[NodeKind]) -> Option<DeclKind> {
    let statement = ancestors
        .iter()
        .rev()
        .find(|k| !matches!(k, NodeKind::VariableDeclaration))?;
    match statement {
        NodeKind::FieldDecl => Some(DeclKind::Field),
        NodeKind::LocalDecl => Some(DeclKind::LocalVariable),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Token;
    use crate::types::Location;
    use std::path::PathBuf;

    fn loc() -> Location {
        Location::new(PathBuf::from("src/lib.rs"), 1, 1)
    }

    fn declarator(name: &str) -> SyntaxNode {
        SyntaxNode::new(NodeKind::VariableDeclarator, loc())
            .with_token(Token::identifier(name, loc()))
    }

    #[test]
    fn classifies_direct_kinds() {
        let node =
            SyntaxNode::new(NodeKind::MethodDecl, loc()).with_token(Token::identifier("run", loc()));
        let decl = classify(&node, &[NodeKind::Other]).unwrap();
        assert_eq!(decl.kind, DeclKind::Method);
        assert_eq!(decl.name, "run");
    }

    #[test]
    fn declarator_under_field_statement_is_field() {
        let ancestors = [
            NodeKind::Other,
            NodeKind::TypeDecl,
            NodeKind::FieldDecl,
            NodeKind::VariableDeclaration,
        ];
        let decl = classify(&declarator("count"), &ancestors).unwrap();
        assert_eq!(decl.kind, DeclKind::Field);
    }

    #[test]
    fn declarator_under_local_statement_is_variable() {
        let ancestors = [
            NodeKind::MethodDecl,
            NodeKind::LocalDecl,
            NodeKind::VariableDeclaration,
        ];
        let decl = classify(&declarator("total"), &ancestors).unwrap();
        assert_eq!(decl.kind, DeclKind::LocalVariable);
    }

    #[test]
    fn orphan_declarator_is_not_classified() {
        assert!(classify(&declarator("x"), &[NodeKind::Other]).is_none());
    }

    #[test]
    fn statement_nodes_are_not_reported_themselves() {
        let stmt = SyntaxNode::new(NodeKind::FieldDecl, loc())
            .with_token(Token::identifier("ignored", loc()));
        assert!(classify(&stmt, &[NodeKind::TypeDecl]).is_none());
    }

    #[test]
    fn declaration_without_identifier_fails_silently() {
        let node = SyntaxNode::new(NodeKind::TypeDecl, loc());
        assert!(classify(&node, &[]).is_none());
    }
}
