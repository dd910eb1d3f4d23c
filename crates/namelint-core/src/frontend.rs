//! Front-end collaborator surface.
//!
//! Parsing source text, building a symbol model, and applying edits are
//! supplied by a front-end the core depends on but does not implement.
//! The front-end lowers its native AST into the generic [`SyntaxNode`]
//! tree here, and exposes symbol resolution through [`SymbolModel`].

use crate::types::{Location, SymbolId};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Node kinds the classifier distinguishes.
///
/// A closed enum replaces open-ended runtime type checks: every declaration
/// shape the rule set cares about is a variant, and everything else is
/// [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A type declaration (struct, enum, trait, union, type alias).
    TypeDecl,
    /// A function or method declaration.
    MethodDecl,
    /// A const/static item or associated const.
    PropertyDecl,
    /// A field declaration statement. Never reported itself; its
    /// declarators are.
    FieldDecl,
    /// A local `let` declaration statement. Never reported itself; its
    /// declarators are.
    LocalDecl,
    /// The declarator list nested directly under a field or local
    /// declaration statement.
    VariableDeclaration,
    /// A single declarator introducing one identifier.
    VariableDeclarator,
    /// Any other node.
    Other,
}

/// Token kinds the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An identifier token.
    Identifier,
    /// Any other token.
    Other,
}

/// A token owned by a syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Token text.
    pub text: String,
    /// Mapped source location.
    pub location: Location,
}

impl Token {
    /// Creates an identifier token.
    #[must_use]
    pub fn identifier(text: impl Into<String>, location: Location) -> Self {
        Self {
            kind: TokenKind::Identifier,
            text: text.into(),
            location,
        }
    }
}

/// A node in the front-end's lowered syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Node kind.
    pub kind: NodeKind,
    /// Immediate child tokens.
    pub tokens: Vec<Token>,
    /// Child nodes, in source order.
    pub children: Vec<SyntaxNode>,
    /// Mapped source location of this node.
    pub location: Location,
}

impl SyntaxNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new(kind: NodeKind, location: Location) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
            children: Vec::new(),
            location,
        }
    }

    /// Adds a child token.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Adds a child node.
    #[must_use]
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the first identifier token among this node's own tokens.
    #[must_use]
    pub fn identifier(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.kind == TokenKind::Identifier)
    }
}

/// A reference site reported by [`SymbolModel::find_references`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Byte offset of the identifier.
    pub offset: usize,
    /// Byte length of the identifier.
    pub length: usize,
    /// Identifier text at the site.
    pub text: String,
}

/// Parses one source unit into the generic syntax tree.
pub trait SourceParser: Send + Sync {
    /// Parses `source`, producing a tree whose locations carry `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Parse`] on malformed input. Fatal for this
    /// file only; callers continue with other files.
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxNode, FrontendError>;
}

/// The front-end's resolved symbol model over one project snapshot.
///
/// Implementations are read-only; the fixer's proposal phase may query a
/// model from several threads at once.
pub trait SymbolModel: Send + Sync {
    /// Resolves a declaration site (its identifier token location) to a
    /// symbol handle. `None` when type information is unavailable for the
    /// scope; the fixer degrades to `Rejected(SymbolUnavailable)`.
    fn resolve(&self, location: &Location) -> Option<SymbolId>;

    /// Enumerates every identifier site referring to a symbol across the
    /// project. Implementations may include declaration sites; the edit
    /// builder deduplicates by (file, offset).
    fn find_references(&self, symbol: SymbolId) -> Vec<Reference>;

    /// Checks whether `candidate` already denotes a distinct symbol visible
    /// from `symbol`'s enclosing scope (for members, also among members
    /// reachable through the owning type). Returns a description of the
    /// colliding symbol when it does.
    fn lookup_collision(&self, symbol: SymbolId, candidate: &str) -> Option<String>;
}

/// Errors raised by the front-end collaborator.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Malformed source unit. Fatal for that file only.
    #[error("parse error in {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Symbol resolution unavailable; degrade to diagnostic-only mode.
    #[error("semantic model unavailable: {0}")]
    SemanticModel(String),

    /// The project/solution container could not be loaded. Fatal; aborts
    /// before any traversal begins.
    #[error("cannot load container {path}: {message}")]
    Container {
        /// Container path.
        path: PathBuf,
        /// Loader message.
        message: String,
    },

    /// Front-end initialization failed before any parse call.
    #[error("toolchain unavailable: {0}")]
    ToolchainUnavailable(String),
}
