//! Python syntax trees via tree-sitter
//!
//! A fresh parser is built for every call; trees are owned by the caller.

use tree_sitter::{Node, Parser, Tree};

use super::SyntaxNode;
use crate::engine::error::AnalysisError;

/// A parsed Python snippet together with the text it was parsed from
pub struct ParsedSource<'s> {
    tree: Tree,
    source: &'s str,
}

/// A tree-sitter node bound to its source text
#[derive(Clone, Copy)]
pub struct PyNode<'a> {
    node: Node<'a>,
    source: &'a str,
}

fn make_python_parser() -> Result<Parser, AnalysisError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::language())
        .map_err(|e| AnalysisError::Grammar(e.to_string()))?;
    Ok(parser)
}

/// Parse a Python module.
///
/// Any syntax error anywhere in the tree is fatal and reported with the
/// position of the first error node.
pub fn parse_python(source: &str) -> Result<ParsedSource<'_>, AnalysisError> {
    let mut parser = make_python_parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::parse(1, 1, "parser produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(describe_error(root, source));
    }

    Ok(ParsedSource { tree, source })
}

/// Parse a standalone expression such as `price >= 100`.
///
/// The text must consist of exactly one expression statement.
pub fn parse_expression(text: &str) -> Result<ParsedSource<'_>, AnalysisError> {
    let parsed = parse_python(text)?;
    if parsed.single_expression().is_none() {
        return Err(AnalysisError::invalid_condition(text.trim()));
    }
    Ok(parsed)
}

impl<'s> ParsedSource<'s> {
    pub fn root(&self) -> PyNode<'_> {
        PyNode {
            node: self.tree.root_node(),
            source: self.source,
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// The expression of a module made of a single expression statement
    pub fn single_expression(&self) -> Option<PyNode<'_>> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let statements: Vec<Node> = root
            .named_children(&mut cursor)
            .filter(|n| !n.is_extra())
            .collect();

        match statements.as_slice() {
            [stmt] if stmt.kind() == "expression_statement" => {
                let mut inner = stmt.walk();
                let exprs: Vec<Node> = stmt
                    .named_children(&mut inner)
                    .filter(|n| !n.is_extra())
                    .collect();
                match exprs.as_slice() {
                    [expr] => Some(PyNode {
                        node: *expr,
                        source: self.source,
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl<'a> PyNode<'a> {
    pub fn raw(&self) -> Node<'a> {
        self.node
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn field(&self, name: &str) -> Option<PyNode<'a>> {
        self.node.child_by_field_name(name).map(|node| PyNode {
            node,
            source: self.source,
        })
    }

    pub fn id(&self) -> usize {
        self.node.id()
    }

    pub fn parent(&self) -> Option<PyNode<'a>> {
        self.node.parent().map(|node| PyNode {
            node,
            source: self.source,
        })
    }
}

impl SyntaxNode for PyNode<'_> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .filter(|n| !n.is_extra())
            .map(|node| PyNode {
                node,
                source: self.source,
            })
            .collect()
    }

    fn is_named(&self) -> bool {
        self.node.is_named()
    }

    fn text(&self) -> &str {
        self.node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn line(&self) -> usize {
        self.node.start_position().row + 1
    }
}

fn describe_error(root: Node, source: &str) -> AnalysisError {
    let node = first_error(root).unwrap_or(root);
    let pos = node.start_position();
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let snippet = node
            .utf8_text(source.as_bytes())
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .trim();
        if snippet.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near `{}`", snippet)
        }
    };
    AnalysisError::parse(pos.row + 1, pos.column + 1, message)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}
