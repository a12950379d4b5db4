//! Compiled templates: an instruction tree and the evaluator that walks it.
//!
//! The compiler never produces source text. It produces [`Node`]s:
//!
//! - [`Node::Load`] copies one free variable out of the context into the
//!   local scope. All loads sit at the top of the program, so a missing
//!   context key fails before any output is produced.
//! - [`Node::Append`] / [`Node::Extend`] add one or several buffered outputs.
//! - [`Node::Branch`] / [`Node::Loop`] hold nested bodies for `if` and `for`.
//! - [`Node::Return`] ends the program and yields the joined output.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use super::context::Context;
use super::error::RenderError;
use super::resolver::DotResolver;
use super::value::Value;

/// A compiled `{{ ... }}` or tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A loaded binding: a free variable or the current loop variable.
    Var(String),
    /// `base.a.b`, resolved at render time by the [`DotResolver`].
    Dots { base: Box<Expr>, names: Vec<String> },
    /// `arg|filter`: the binding `filter` applied to `arg`.
    Call { filter: String, arg: Box<Expr> },
}

/// One buffered output item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Literal(String),
    /// An expression converted to its string form.
    Expr(Expr),
}

/// A single instruction of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Load(String),
    Append(Output),
    Extend(Vec<Output>),
    Branch { cond: Expr, body: Vec<Node> },
    Loop { var: String, iter: Expr, body: Vec<Node> },
    Return,
}

impl Node {
    /// Whether this instruction owns a nested body.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(self, Node::Branch { .. } | Node::Loop { .. })
    }

    /// Replace the nested body of a block instruction.
    pub(crate) fn set_body(&mut self, nodes: Vec<Node>) {
        match self {
            Node::Branch {
                body,
                ..
            }
            | Node::Loop {
                body,
                ..
            } => *body = nodes,
            other => panic!("instruction has no body: {other:?}"),
        }
    }
}

/// An executable template body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    nodes: Vec<Node>,
}

impl Program {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Names applied as filters anywhere in the program.
    #[must_use]
    pub fn filter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_filters(&self.nodes, &mut names);
        names
    }

    /// Run the program against `context`, resolving dotted chains with `resolver`.
    ///
    /// # Arguments
    ///
    /// * `context` - Supplies every free variable the program loads
    /// * `resolver` - Resolves each `a.b.c` chain at render time
    ///
    /// # Errors
    ///
    /// Fails on the first [`RenderError`]: a free variable missing from
    /// `context`, a dotted step the resolver cannot follow, a `for` over a
    /// value that cannot be iterated, or a filter that is missing or fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use templite::{Context, StructuralResolver, Templite};
    ///
    /// let templite = Templite::new("{{ user.name }}").unwrap();
    /// let context = Context::from_json(serde_json::json!({"user": {"name": "ada"}})).unwrap();
    /// let output = templite.program().execute(&context, &StructuralResolver).unwrap();
    /// assert_eq!(output, "ada");
    /// ```
    pub fn execute(
        &self,
        context: &Context,
        resolver: &dyn DotResolver,
    ) -> Result<String, RenderError> {
        self.execute_layered(&[context], resolver)
    }

    /// Like [`execute`](Self::execute), reading variables from a stack of
    /// contexts. Later layers shadow earlier ones; none of them is copied.
    pub fn execute_layered(
        &self,
        layers: &[&Context],
        resolver: &dyn DotResolver,
    ) -> Result<String, RenderError> {
        let mut frame = Frame {
            layers,
            resolver,
            scope: HashMap::new(),
            result: String::new(),
        };
        frame.run(&self.nodes)?;
        Ok(frame.result)
    }
}

fn collect_filters(nodes: &[Node], names: &mut BTreeSet<String>) {
    fn walk_expr(expr: &Expr, names: &mut BTreeSet<String>) {
        match expr {
            Expr::Var(_) => {}
            Expr::Dots {
                base,
                ..
            } => walk_expr(base, names),
            Expr::Call {
                filter,
                arg,
            } => {
                names.insert(filter.clone());
                walk_expr(arg, names);
            }
        }
    }

    fn walk_output(output: &Output, names: &mut BTreeSet<String>) {
        if let Output::Expr(expr) = output {
            walk_expr(expr, names);
        }
    }

    for node in nodes {
        match node {
            Node::Load(_) | Node::Return => {}
            Node::Append(output) => walk_output(output, names),
            Node::Extend(outputs) => outputs.iter().for_each(|o| walk_output(o, names)),
            Node::Branch {
                cond: expr,
                body,
            }
            | Node::Loop {
                iter: expr,
                body,
                ..
            } => {
                walk_expr(expr, names);
                collect_filters(body, names);
            }
        }
    }
}

/// Evaluation state for one render call.
struct Frame<'a> {
    layers: &'a [&'a Context],
    resolver: &'a dyn DotResolver,
    scope: HashMap<String, Value>,
    result: String,
}

enum Flow {
    Continue,
    Return,
}

impl Frame<'_> {
    fn run(&mut self, nodes: &[Node]) -> Result<Flow, RenderError> {
        for node in nodes {
            if let Flow::Return = self.step(node)? {
                return Ok(Flow::Return);
            }
        }
        Ok(Flow::Continue)
    }

    fn step(&mut self, node: &Node) -> Result<Flow, RenderError> {
        match node {
            Node::Load(name) => {
                let value = self
                    .layers
                    .iter()
                    .rev()
                    .find_map(|layer| layer.get(name))
                    .cloned()
                    .ok_or_else(|| {
                        RenderError::missing_variable(
                            name,
                            self.layers.iter().flat_map(|layer| layer.keys()),
                        )
                    })?;
                tracing::trace!("Loaded '{}' ({}) from context", name, value.kind());
                self.scope.insert(name.clone(), value);
            }
            Node::Append(output) => self.emit(output)?,
            Node::Extend(outputs) => {
                for output in outputs {
                    self.emit(output)?;
                }
            }
            Node::Branch {
                cond,
                body,
            } => {
                if self.eval(cond)?.is_truthy() {
                    return self.run(body);
                }
            }
            Node::Loop {
                var,
                iter,
                body,
            } => {
                let source = self.eval(iter)?;
                let items = source.iter_items().ok_or(RenderError::NotIterable {
                    kind: source.kind(),
                })?;
                let shadowed = self.scope.remove(var);
                let mut flow = Flow::Continue;
                for item in items {
                    self.scope.insert(var.clone(), item);
                    flow = self.run(body)?;
                    if let Flow::Return = flow {
                        break;
                    }
                }
                match shadowed {
                    Some(previous) => self.scope.insert(var.clone(), previous),
                    None => self.scope.remove(var),
                };
                return Ok(flow);
            }
            Node::Return => return Ok(Flow::Return),
        }
        Ok(Flow::Continue)
    }

    fn emit(&mut self, output: &Output) -> Result<(), RenderError> {
        match output {
            Output::Literal(text) => self.result.push_str(text),
            Output::Expr(expr) => {
                let value = self.eval(expr)?;
                // Writing into a String cannot fail.
                let _ = write!(self.result, "{value}");
            }
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Value, RenderError> {
        match expr {
            Expr::Var(name) => self.scope.get(name).cloned().ok_or_else(|| RenderError::Unbound {
                name: name.clone(),
            }),
            Expr::Dots {
                base,
                names,
            } => self.resolver.resolve(self.eval(base)?, names),
            Expr::Call {
                filter,
                arg,
            } => {
                let arg = self.eval(arg)?;
                match self.scope.get(filter) {
                    Some(Value::Filter(func)) => {
                        func(&arg).map_err(|source| RenderError::FilterFailed {
                            name: filter.clone(),
                            source,
                        })
                    }
                    Some(other) => Err(RenderError::NotAFilter {
                        name: filter.clone(),
                        kind: other.kind(),
                    }),
                    None => Err(RenderError::Unbound {
                        name: filter.clone(),
                    }),
                }
            }
        }
    }
}
