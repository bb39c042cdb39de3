// SPDX-License-Identifier: MIT

//! Condition extraction from syntax trees
//!
//! Every comparison of the form `identifier <op> integer` is collected in
//! document order. Other comparison shapes (chains, attribute operands,
//! float or string constants, `in`/`is`) are skipped without error.

use serde::{Deserialize, Serialize};

use crate::engine::condition::{parse_condition_text, parse_int_literal, CompareOp, Condition};
use crate::engine::error::AnalysisError;
use crate::engine::syntax::{
    parse_python, render_expression, walk, NodeVisitor, ParsedSource, PyNode, SyntaxNode,
};

/// Grammar node kinds the comparison visitor recognizes
#[derive(Debug, Clone, Copy)]
pub struct ComparisonKinds {
    pub comparison: &'static str,
    pub identifier: &'static str,
    pub integer: &'static str,
}

impl ComparisonKinds {
    pub const PYTHON: Self = Self {
        comparison: "comparison_operator",
        identifier: "identifier",
        integer: "integer",
    };
}

/// Collects simple comparisons from any [`SyntaxNode`] tree
pub struct ComparisonVisitor {
    kinds: ComparisonKinds,
    conditions: Vec<Condition>,
}

impl ComparisonVisitor {
    pub fn new(kinds: ComparisonKinds) -> Self {
        Self {
            kinds,
            conditions: Vec::new(),
        }
    }

    pub fn into_conditions(self) -> Vec<Condition> {
        self.conditions
    }

    fn simple_comparison<N: SyntaxNode>(&self, node: &N) -> Option<Condition> {
        let children = node.children();
        let operands: Vec<&N> = children.iter().filter(|c| c.is_named()).collect();
        let operators: Vec<&N> = children.iter().filter(|c| !c.is_named()).collect();

        let ([left, right], [op]) = (operands.as_slice(), operators.as_slice()) else {
            return None;
        };
        if left.kind() != self.kinds.identifier || right.kind() != self.kinds.integer {
            return None;
        }

        let operator = CompareOp::from_symbol(op.text())?;
        let value = parse_int_literal(right.text())?;
        Some(Condition::new(left.text(), operator, value).at_line(node.line()))
    }
}

impl<N: SyntaxNode> NodeVisitor<N> for ComparisonVisitor {
    fn supports(&self, kind: &str) -> bool {
        kind == self.kinds.comparison
    }

    fn visit(&mut self, node: &N) {
        match self.simple_comparison(node) {
            Some(cond) => self.conditions.push(cond),
            None => log::debug!(
                "Skipping unsupported comparison at line {}: {}",
                node.line(),
                node.text()
            ),
        }
    }
}

/// Extract every simple comparison from a Python source snippet
pub fn extract_conditions(source: &str) -> Result<Vec<Condition>, AnalysisError> {
    let parsed = parse_python(source)?;
    Ok(conditions_in(&parsed))
}

/// Conditions of an already parsed source
pub fn conditions_in(parsed: &ParsedSource) -> Vec<Condition> {
    let mut visitor = ComparisonVisitor::new(ComparisonKinds::PYTHON);
    walk(&parsed.root(), &mut visitor);
    visitor.into_conditions()
}

/// Parse a standalone condition string such as `age >= 18`.
///
/// The structural parse is tried first; when it yields nothing the textual
/// pattern is used. A syntax error is only reported if the textual pattern
/// also fails.
pub fn parse_condition_expr(text: &str) -> Result<Condition, AnalysisError> {
    let structural =
        parse_python(text).map(|parsed| conditions_in(&parsed).into_iter().next());

    match structural {
        Ok(Some(mut cond)) => {
            cond.source_line = None;
            Ok(cond)
        }
        Ok(None) => {
            parse_condition_text(text).ok_or_else(|| AnalysisError::invalid_condition(text.trim()))
        }
        Err(err) => {
            log::debug!("Structural parse of '{}' failed: {}", text, err);
            parse_condition_text(text).ok_or(err)
        }
    }
}

/// All rules that compare the same variable
pub fn match_rules<'c>(conditions: &'c [Condition], variable: &str) -> Vec<&'c Condition> {
    conditions.iter().filter(|c| c.variable == variable).collect()
}

/// Structural summary of a snippet: rendered guards and returned values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStructure {
    pub conditions: Vec<String>,
    pub returns: Vec<Option<String>>,
}

struct StructureVisitor {
    structure: CodeStructure,
}

impl<'a> NodeVisitor<PyNode<'a>> for StructureVisitor {
    fn supports(&self, kind: &str) -> bool {
        matches!(kind, "if_statement" | "elif_clause" | "return_statement")
    }

    fn visit(&mut self, node: &PyNode<'a>) {
        if node.kind() == "return_statement" {
            let value = node
                .children()
                .iter()
                .find(|c| c.is_named())
                .map(render_expression);
            self.structure.returns.push(value);
        } else if let Some(test) = node.field("condition") {
            self.structure.conditions.push(render_expression(&test));
        }
    }
}

/// Guards and return values of a Python snippet, in document order
pub fn extract_structure(source: &str) -> Result<CodeStructure, AnalysisError> {
    let parsed = parse_python(source)?;
    Ok(structure_in(&parsed))
}

/// Structure of an already parsed source
pub fn structure_in(parsed: &ParsedSource) -> CodeStructure {
    let mut visitor = StructureVisitor {
        structure: CodeStructure::default(),
    };
    walk(&parsed.root(), &mut visitor);
    visitor.structure
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICING: &str = r#"
def price_tier(price, qty):
    if price > 100:
        return "premium"
    elif price >= 50 and qty < 10:
        return "standard"
    return None
"#;

    #[test]
    fn test_extracts_in_document_order() {
        let conds = extract_conditions(PRICING).unwrap();
        assert_eq!(
            conds,
            vec![
                Condition::new("price", CompareOp::Gt, 100).at_line(3),
                Condition::new("price", CompareOp::Gte, 50).at_line(5),
                Condition::new("qty", CompareOp::Lt, 10).at_line(5),
            ]
        );
    }

    #[test]
    fn test_unsupported_shapes_are_skipped() {
        let source = r#"
if user.age > 18: pass
if score > 0.5: pass
if name == "bob": pass
if 0 < x < 10: pass
if x in items: pass
if x > -5: pass
if count != 3: pass
"#;
        let conds = extract_conditions(source).unwrap();
        assert_eq!(conds, vec![Condition::new("count", CompareOp::NotEq, 3).at_line(8)]);
    }

    #[test]
    fn test_comparisons_outside_if_are_found() {
        let conds = extract_conditions("eligible = age >= 18\n").unwrap();
        assert_eq!(conds.len(), 1);
        assert_eq!(conds[0].variable, "age");
    }

    #[test]
    fn test_no_comparisons_is_empty_not_error() {
        assert!(extract_conditions("x = 1\nprint(x)\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_source_is_parse_error() {
        let result = extract_conditions("if price >:\n    pass\n");
        assert!(matches!(result, Err(AnalysisError::Parse { .. })));
    }

    #[test]
    fn test_parse_condition_expr_structural() {
        let cond = parse_condition_expr("price >= 100").unwrap();
        assert_eq!(cond, Condition::new("price", CompareOp::Gte, 100));
    }

    #[test]
    fn test_parse_condition_expr_compound_takes_first() {
        let cond = parse_condition_expr("x > 5 and y < 10").unwrap();
        assert_eq!(cond, Condition::new("x", CompareOp::Gt, 5));
    }

    #[test]
    fn test_parse_condition_expr_falls_back_to_text() {
        // not valid Python, but the textual pattern still finds a triple
        let cond = parse_condition_expr("when age >= 18 then allow").unwrap();
        assert_eq!(cond, Condition::new("age", CompareOp::Gte, 18));
    }

    #[test]
    fn test_parse_condition_expr_invalid() {
        assert!(matches!(
            parse_condition_expr("price > 10.5"),
            Err(AnalysisError::InvalidCondition(_))
        ));
        assert!(matches!(
            parse_condition_expr("price >"),
            Err(AnalysisError::Parse { .. })
        ));
    }

    #[test]
    fn test_match_rules_by_variable() {
        let conds = extract_conditions(PRICING).unwrap();
        let price_rules = match_rules(&conds, "price");
        assert_eq!(price_rules.len(), 2);
        assert!(match_rules(&conds, "discount").is_empty());
    }

    #[test]
    fn test_extract_structure() {
        let structure = extract_structure(PRICING).unwrap();
        assert_eq!(
            structure.conditions,
            vec!["price > 100", "price >= 50 and qty < 10"]
        );
        assert_eq!(
            structure.returns,
            vec![
                Some("\"premium\"".to_string()),
                Some("\"standard\"".to_string()),
                Some("None".to_string()),
            ]
        );
    }

    #[test]
    fn test_structure_drops_redundant_parentheses() {
        let source = "if (age >= 18):\n    return (True)\nelif (a or b) and c:\n    return (x + 1) * 2\n";
        let parsed = parse_python(source).unwrap();
        let structure = structure_in(&parsed);
        assert_eq!(structure.conditions, vec!["age >= 18", "(a or b) and c"]);
        assert_eq!(
            structure.returns,
            vec![Some("True".to_string()), Some("(x + 1) * 2".to_string())]
        );
        assert_eq!(structure, extract_structure(source).unwrap());
    }

    #[test]
    fn test_bare_return() {
        let structure = extract_structure("def f():\n    return\n").unwrap();
        assert_eq!(structure.returns, vec![None]);
    }
}
