//! Canonical re-serialization of Python syntax trees
//!
//! Output form: one statement per line, four-space indentation, comments
//! dropped, single spaces around operators and keywords, no padding inside
//! brackets. Parentheses are dropped where operator precedence does not need
//! them, so `if (price > 100):` and `if price > 100:` render the same.

use super::{PyNode, SyntaxNode};

const INDENT: &str = "    ";

/// Clauses that continue a compound statement on a new line at the same depth
const CONTINUATION_CLAUSES: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
];

/// Statements that may appear below a non-block child (decorated definitions)
const NESTED_DEFINITIONS: &[&str] = &["function_definition", "class_definition"];

/// Kinds rendered verbatim as a single token
const ATOMIC_KINDS: &[&str] = &["string"];

// Binding strength, loosest first
const TEST: u8 = 2;
const OR: u8 = 3;
const AND: u8 = 4;
const NOT: u8 = 5;
const CMP: u8 = 6;
const BOR: u8 = 7;
const BXOR: u8 = 8;
const BAND: u8 = 9;
const SHIFT: u8 = 10;
const ARITH: u8 = 11;
const TERM: u8 = 12;
const FACTOR: u8 = 13;
const POWER: u8 = 14;
const AWAIT: u8 = 15;
const ATOM: u8 = 16;

#[derive(Debug, Clone)]
struct Token {
    text: String,
    parent: String,
    named: bool,
}

/// Renders a tree, optionally substituting one node with replacement text
pub struct Renderer<'r> {
    replacement: Option<(usize, &'r str)>,
    lines: Vec<String>,
}

impl<'r> Renderer<'r> {
    pub fn new() -> Self {
        Self {
            replacement: None,
            lines: Vec::new(),
        }
    }

    /// Render `text` in place of the node with id `node_id`
    pub fn with_replacement(node_id: usize, text: &'r str) -> Self {
        Self {
            replacement: Some((node_id, text)),
            lines: Vec::new(),
        }
    }

    pub fn module(mut self, root: &PyNode) -> String {
        for stmt in root.children() {
            if stmt.is_named() {
                self.statement(&stmt, 0);
            }
        }
        self.lines.join("\n")
    }

    pub fn expression(self, node: &PyNode) -> String {
        let mut tokens = Vec::new();
        match node.parent() {
            Some(parent) => {
                let position = named_position(&parent, node);
                self.operand(node, &parent, position, &mut tokens);
            }
            None => self.collect(node, "module", &mut tokens),
        }
        join_tokens(&tokens)
    }

    fn statement(&mut self, node: &PyNode, depth: usize) {
        let mut tokens = Vec::new();
        let mut position = 0;

        for child in node.children() {
            let kind = child.kind();
            if kind == "block" {
                self.flush(&mut tokens, depth);
                for stmt in child.children() {
                    if stmt.is_named() {
                        self.statement(&stmt, depth + 1);
                    }
                }
            } else if CONTINUATION_CLAUSES.contains(&kind) || kind == "case_clause" {
                self.flush(&mut tokens, depth);
                self.statement(&child, depth);
            } else if kind == "decorator" {
                self.flush(&mut tokens, depth);
                let mut deco = Vec::new();
                self.collect(&child, node.kind(), &mut deco);
                self.flush(&mut deco, depth);
            } else if NESTED_DEFINITIONS.contains(&kind) && node.kind() == "decorated_definition" {
                self.flush(&mut tokens, depth);
                self.statement(&child, depth);
            } else if child.is_named() {
                self.operand(&child, node, position, &mut tokens);
            } else {
                self.collect(&child, node.kind(), &mut tokens);
            }
            if child.is_named() {
                position += 1;
            }
        }

        if node.children().is_empty() {
            tokens.push(Token {
                text: node.text().to_string(),
                parent: node.kind().to_string(),
                named: node.is_named(),
            });
        }

        self.flush(&mut tokens, depth);
    }

    fn collect(&self, node: &PyNode, parent: &str, out: &mut Vec<Token>) {
        if let Some((id, text)) = self.replacement {
            if node.id() == id {
                out.push(Token {
                    text: text.to_string(),
                    parent: parent.to_string(),
                    named: true,
                });
                return;
            }
        }

        let children = node.children();
        if children.is_empty() || ATOMIC_KINDS.contains(&node.kind()) {
            out.push(Token {
                text: node.text().to_string(),
                parent: parent.to_string(),
                named: node.is_named(),
            });
            return;
        }

        let mut position = 0;
        for child in &children {
            if child.is_named() {
                self.operand(child, node, position, out);
                position += 1;
            } else {
                self.collect(child, node.kind(), out);
            }
        }
    }

    /// Collect a named child, unwrapping parentheses its context does not need
    fn operand(&self, node: &PyNode, parent: &PyNode, position: usize, out: &mut Vec<Token>) {
        let replaced = self.replacement.is_some_and(|(id, _)| id == node.id());
        if !replaced {
            if let Some(inner) = redundant_parens(node, parent, position) {
                return self.operand(&inner, parent, position, out);
            }
        }
        self.collect(node, parent.kind(), out);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>, depth: usize) {
        if tokens.is_empty() {
            return;
        }
        let line = format!("{}{}", INDENT.repeat(depth), join_tokens(tokens));
        self.lines.push(line);
        tokens.clear();
    }
}

impl Default for Renderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical text of a whole module
pub fn render_module(root: &PyNode) -> String {
    Renderer::new().module(root)
}

/// Canonical single-line text of an expression node
pub fn render_expression(node: &PyNode) -> String {
    Renderer::new().expression(node)
}

/// Index of `node` among the named children of `parent`
fn named_position(parent: &PyNode, node: &PyNode) -> usize {
    parent
        .children()
        .iter()
        .filter(|c| c.is_named())
        .position(|c| c.id() == node.id())
        .unwrap_or(0)
}

fn operator_text<'a>(node: &PyNode<'a>) -> Option<&'a str> {
    node.field("operator").map(|op| {
        let source = op.source();
        &source[op.raw().byte_range()]
    })
}

/// Binding strength of an expression, `None` for kinds that always keep
/// their parentheses (walrus, yield and anything unrecognized)
fn precedence(node: &PyNode) -> Option<u8> {
    let level = match node.kind() {
        "lambda" | "conditional_expression" => TEST,
        "boolean_operator" => match operator_text(node)? {
            "or" => OR,
            _ => AND,
        },
        "not_operator" => NOT,
        "comparison_operator" => CMP,
        "binary_operator" => match operator_text(node)? {
            "|" => BOR,
            "^" => BXOR,
            "&" => BAND,
            "<<" | ">>" => SHIFT,
            "+" | "-" => ARITH,
            "**" => POWER,
            _ => TERM,
        },
        "unary_operator" => FACTOR,
        "await" => AWAIT,
        "identifier" | "integer" | "float" | "string" | "concatenated_string" | "true"
        | "false" | "none" | "ellipsis" | "call" | "attribute" | "subscript" | "list"
        | "tuple" | "dictionary" | "set" | "list_comprehension" | "set_comprehension"
        | "dictionary_comprehension" | "generator_expression" | "parenthesized_expression" => {
            ATOM
        }
        _ => return None,
    };
    Some(level)
}

/// Weakest binding an operand may have at `position` without parentheses
fn required_precedence(parent: &PyNode, position: usize) -> u8 {
    match parent.kind() {
        "boolean_operator" | "comparison_operator" => {
            precedence(parent).map_or(ATOM, |p| p + 1)
        }
        "binary_operator" => {
            let level = precedence(parent).unwrap_or(TERM);
            // `**` binds right to left
            let tighter_side = if level == POWER { 0 } else { 1 };
            if position == tighter_side {
                level + 1
            } else {
                level
            }
        }
        "not_operator" => NOT,
        "unary_operator" => FACTOR,
        "conditional_expression" if position < 2 => TEST + 1,
        "await" => ATOM,
        "attribute" | "call" | "subscript" if position == 0 => ATOM,
        "list_splat" | "dictionary_splat" => BOR,
        "for_in_clause" | "if_clause" => OR,
        _ => TEST,
    }
}

/// The inner expression when `node` is a parenthesized expression whose
/// parentheses can go
fn redundant_parens<'a>(node: &PyNode<'a>, parent: &PyNode, position: usize) -> Option<PyNode<'a>> {
    if node.kind() != "parenthesized_expression" {
        return None;
    }
    let mut named = node.children().into_iter().filter(|c| c.is_named());
    let inner = named.next()?;
    if named.next().is_some() {
        return None;
    }
    // `(1).real` is not `1.real`
    if parent.kind() == "attribute" && matches!(inner.kind(), "integer" | "float") {
        return None;
    }
    let level = precedence(&inner)?;
    (level >= required_precedence(parent, position)).then_some(inner)
}

fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            if needs_space(p, token) {
                out.push(' ');
            }
        }
        out.push_str(&token.text);
        prev = Some(token);
    }
    out
}

fn is_keyword(token: &Token) -> bool {
    !token.named && token.text.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_open(token: &Token) -> bool {
    !token.named && matches!(token.text.as_str(), "(" | "[" | "{")
}

fn is_close(token: &Token) -> bool {
    !token.named && matches!(token.text.as_str(), ")" | "]" | "}")
}

fn is_tight_equals(token: &Token) -> bool {
    token.text == "="
        && matches!(token.parent.as_str(), "keyword_argument" | "default_parameter")
}

fn is_prefix_operator(token: &Token) -> bool {
    if token.named {
        return false;
    }
    match token.parent.as_str() {
        "unary_operator" => matches!(token.text.as_str(), "-" | "+" | "~"),
        "list_splat" | "dictionary_splat" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            matches!(token.text.as_str(), "*" | "**")
        }
        "decorator" => token.text == "@",
        _ => false,
    }
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    let in_import_prefix = prev.parent == "import_prefix" || next.parent == "import_prefix";
    if in_import_prefix {
        return is_keyword(prev) || is_keyword(next);
    }

    if is_open(prev) || is_close(next) {
        return false;
    }
    if !next.named && matches!(next.text.as_str(), "," | ":" | ";") {
        return false;
    }
    if (!prev.named && prev.text == ".") || (!next.named && next.text == ".") {
        return false;
    }
    if !prev.named && prev.text == ":" {
        return prev.parent != "slice";
    }
    if is_tight_equals(prev) || is_tight_equals(next) {
        return false;
    }
    if is_prefix_operator(prev) {
        return false;
    }
    if !next.named && matches!(next.text.as_str(), "(" | "[") {
        // call or subscript directly after an atom
        return !(prev.named || is_close(prev));
    }
    true
}
