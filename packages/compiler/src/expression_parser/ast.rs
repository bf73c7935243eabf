/**
 * Binding Expression AST
 *
 * Expressions are kept as source text; evaluating them is the job of the
 * change detection layer. Only the shape the compiler cares about (pipes,
 * interpolations, literal attribute values) is made explicit.
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Ast {
    /// Opaque expression source.
    Source { source: String },
    LiteralPrimitive { value: Value },
    Interpolation {
        strings: Vec<String>,
        expressions: Vec<Ast>,
    },
    Pipe {
        exp: Box<Ast>,
        name: String,
        args: Vec<Ast>,
    },
}

/// An expression together with the text and location it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstWithSource {
    pub ast: Ast,
    pub source: String,
    pub location: String,
}

impl AstWithSource {
    pub fn new(ast: Ast, source: impl Into<String>, location: impl Into<String>) -> Self {
        AstWithSource {
            ast,
            source: source.into(),
            location: location.into(),
        }
    }

    /// Names of the pipes applied to the expression, outermost last.
    pub fn pipe_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut ast = &self.ast;
        while let Ast::Pipe { exp, name, .. } = ast {
            names.push(name.as_str());
            ast = exp;
        }
        names.reverse();
        names
    }
}

/// One binding of the `template` attribute microsyntax.
///
/// `template="ng-for #item of items"` yields `ng-for`, the variable `item`
/// bound to `$implicit` and `ng-for-of` bound to `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBinding {
    pub key: String,
    pub key_is_var: bool,
    /// Exported name a variable reads, only for variables.
    pub name: Option<String>,
    pub expression: Option<AstWithSource>,
}
