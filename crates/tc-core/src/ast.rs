//! Contracts for parsing, rewriting, and printing syntax trees.
//!
//! Trees are exchanged as [`AstNode`]: a `kind` tag plus an open set of
//! fields, which is the shape every JavaScript parser's JSON output takes.
//! Child nodes are any field value (or array element) that is itself an
//! object carrying a `kind`.

use serde::{Deserialize, Serialize};

use crate::types::RawConfig;

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    /// Node type, e.g. `CallExpression`.
    pub kind: String,

    /// All other node fields.
    #[serde(flatten)]
    pub fields: RawConfig,
}

impl AstNode {
    /// Creates a node with no fields.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: RawConfig::new(),
        }
    }

    /// Sets a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// Whether source is parsed as an ES module or a classic script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// ES module.
    #[default]
    Module,
    /// Classic script.
    Script,
}

/// Options passed to a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Module or script.
    pub source_type: SourceType,
    /// Parser plugins to enable (`jsx`, `typescript`, ...).
    pub plugins: Vec<String>,
    /// File name used in diagnostics.
    pub source_file: Option<String>,
}

/// Options passed to a code generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Keep output lines aligned with the input.
    pub retain_lines: bool,
    /// Minimize whitespace.
    pub compact: bool,
    /// Emit comments.
    pub comments: bool,
}

/// Parses source text into a tree.
pub trait AstParser: Send + Sync {
    /// Parses `code`.
    fn parse(&self, code: &str, options: &ParserOptions) -> anyhow::Result<AstNode>;
}

/// Rewrites a tree.
pub trait AstTransformer: Send + Sync {
    /// Applies `visitor` to `ast` and returns the rewritten tree.
    fn transform(&self, ast: AstNode, visitor: &mut dyn AstVisitor) -> anyhow::Result<AstNode>;
}

/// Prints a tree back to source text.
pub trait AstGenerator: Send + Sync {
    /// Generates code for `ast`.
    fn generate(&self, ast: &AstNode, options: &GeneratorOptions) -> anyhow::Result<String>;
}

/// Callbacks invoked while walking a tree.
pub trait AstVisitor {
    /// Called before a node's children are visited.
    fn enter(&mut self, _node: &mut AstNode) {}

    /// Called after a node's children are visited.
    fn exit(&mut self, _node: &mut AstNode) {}
}

/// Walks `node` depth-first, calling `enter` before and `exit` after each
/// node's children.
///
/// Field values that deserialize as [`AstNode`] are visited and written
/// back, so visitors may rewrite any part of the tree.
///
/// # Examples
///
/// ```
/// use tc_core::ast::{walk, AstNode, AstVisitor};
/// use serde_json::json;
///
/// struct Count(usize);
/// impl AstVisitor for Count {
///     fn enter(&mut self, _node: &mut AstNode) {
///         self.0 += 1;
///     }
/// }
///
/// let mut program = AstNode::new("Program").with_field(
///     "body",
///     json!([{ "kind": "ExpressionStatement", "expression": { "kind": "Identifier", "name": "x" } }]),
/// );
/// let mut count = Count(0);
/// walk(&mut program, &mut count);
/// assert_eq!(count.0, 3);
/// ```
pub fn walk(node: &mut AstNode, visitor: &mut dyn AstVisitor) {
    visitor.enter(node);
    for value in node.fields.values_mut() {
        walk_value(value, visitor);
    }
    visitor.exit(node);
}

fn walk_value(value: &mut serde_json::Value, visitor: &mut dyn AstVisitor) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                walk_value(item, visitor);
            }
        }
        serde_json::Value::Object(map) if map.get("kind").is_some_and(serde_json::Value::is_string) => {
            let Ok(mut child) = serde_json::from_value::<AstNode>(value.clone()) else {
                return;
            };
            walk(&mut child, visitor);
            if let Ok(rewritten) = serde_json::to_value(child) {
                *value = rewritten;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Order(Vec<String>);

    impl AstVisitor for Order {
        fn enter(&mut self, node: &mut AstNode) {
            self.0.push(format!("enter {}", node.kind));
        }

        fn exit(&mut self, node: &mut AstNode) {
            self.0.push(format!("exit {}", node.kind));
        }
    }

    struct RenameRequire;

    impl AstVisitor for RenameRequire {
        fn enter(&mut self, node: &mut AstNode) {
            if node.kind == "Identifier" && node.fields.get("name") == Some(&json!("require")) {
                node.fields.insert("name".to_owned(), json!("importModule"));
            }
        }
    }

    fn call() -> AstNode {
        AstNode::new("CallExpression")
            .with_field("callee", json!({ "kind": "Identifier", "name": "require" }))
            .with_field("arguments", json!([{ "kind": "StringLiteral", "value": "chai" }]))
    }

    #[test]
    fn test_walk_order() {
        let mut node = AstNode::new("Program").with_field("body", json!([call()]));
        let mut order = Order(Vec::new());
        walk(&mut node, &mut order);
        assert_eq!(
            order.0,
            vec![
                "enter Program",
                "enter CallExpression",
                "enter StringLiteral",
                "exit StringLiteral",
                "enter Identifier",
                "exit Identifier",
                "exit CallExpression",
                "exit Program",
            ]
        );
    }

    #[test]
    fn test_walk_writes_back_rewrites() {
        let mut node = call();
        walk(&mut node, &mut RenameRequire);
        assert_eq!(node.fields["callee"]["name"], json!("importModule"));
    }

    #[test]
    fn test_node_serialization_flattens_fields() {
        let node = AstNode::new("Identifier").with_field("name", json!("x"));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({ "kind": "Identifier", "name": "x" })
        );
    }
}
