// SPDX-License-Identifier: MIT

//! Structural parsing capability
//!
//! The engine walks syntax trees through the [`SyntaxNode`] trait and
//! [`NodeVisitor`] capability so other grammars can plug in their own tree
//! without the analysis code depending on a particular parser library.
//! Python is provided through tree-sitter in [`python`].

pub mod python;
pub mod render;

pub use python::{parse_expression, parse_python, ParsedSource, PyNode};
pub use render::{render_expression, render_module};

/// A node of a concrete syntax tree
pub trait SyntaxNode: Sized {
    /// Grammar kind of the node (e.g. `comparison_operator`)
    fn kind(&self) -> &str;

    /// Child nodes in order, named and anonymous, comments excluded
    fn children(&self) -> Vec<Self>;

    /// Named nodes are grammar rules; anonymous nodes are literal tokens
    fn is_named(&self) -> bool;

    /// Source text covered by the node
    fn text(&self) -> &str;

    /// 1-based line the node starts on
    fn line(&self) -> usize;
}

/// Visitor capability: declares the node kinds it handles and receives them
pub trait NodeVisitor<N: SyntaxNode> {
    fn supports(&self, kind: &str) -> bool;
    fn visit(&mut self, node: &N);
}

/// Pre-order traversal calling `visitor` on every supported node.
///
/// Children of a visited node are still walked, so nested matches are found.
pub fn walk<N, V>(node: &N, visitor: &mut V)
where
    N: SyntaxNode,
    V: NodeVisitor<N> + ?Sized,
{
    if visitor.supports(node.kind()) {
        visitor.visit(node);
    }
    for child in node.children() {
        walk(&child, visitor);
    }
}
