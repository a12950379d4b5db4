//! The block compiler: turns template text into a [`Templite`].
//!
//! Tokens are consumed left to right. Literals and expressions are buffered
//! and flushed as one `Append` (single item) or `Extend` (several items)
//! whenever a tag is reached or the text ends. `if` and `for` tags push onto
//! a block stack and open a nested body; `end...` tags pop it and must match.
//!
//! Every referenced name lands in `all_vars`, every `for` name in
//! `loop_vars`. Their difference is only known after the last token, so the
//! loads for it go into a section reserved at the top of the body and filled
//! in at the end.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use super::builder::CodeBuilder;
use super::context::Context;
use super::error::{BlockKind, RenderError, SyntaxError, SyntaxErrorKind};
use super::expr::{compile_expr, register};
use super::program::{Node, Output, Program};
use super::resolver::{DotResolver, StructuralResolver};
use super::tokenizer::{Token, tag_words, tokenize};

/// A compiled template.
///
/// Compilation happens once, in the constructor. The result is immutable and
/// can be rendered any number of times, from any number of threads.
///
/// ```
/// use templite::{Context, Templite, filters};
///
/// let templite = Templite::with_contexts(
///     "<h1>Hello {{name|upper}}!</h1>{% for topic in topics %}<p>{{topic}}</p>{% endfor %}",
///     [filters::builtins()],
/// )?;
///
/// let context = Context::new()
///     .with("name", "Ned")
///     .with("topics", vec!["Python", "Geometry"]);
/// assert_eq!(
///     templite.render(Some(&context))?,
///     "<h1>Hello NED!</h1><p>Python</p><p>Geometry</p>"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Templite {
    context: Context,
    all_vars: BTreeSet<String>,
    loop_vars: BTreeSet<String>,
    program: Program,
}

impl Templite {
    /// Compile `text` with no compile-time context.
    pub fn new(text: &str) -> Result<Self, SyntaxError> {
        Self::with_contexts(text, Vec::<Context>::new())
    }

    /// Compile `text`; `contexts` are merged left to right, later entries
    /// overriding earlier ones, and become the base of every render.
    pub fn with_contexts<I>(text: &str, contexts: I) -> Result<Self, SyntaxError>
    where
        I: IntoIterator,
        I::Item: Borrow<Context>,
    {
        let mut context = Context::new();
        for extra in contexts {
            context.extend(extra.borrow());
        }

        let mut compiler = BlockCompiler::default();
        let program = compiler.compile(text)?;

        tracing::debug!(
            "Compiled template: {} instruction(s), {} free variable(s), {} loop variable(s)",
            program.nodes().len(),
            compiler.all_vars.difference(&compiler.loop_vars).count(),
            compiler.loop_vars.len()
        );

        Ok(Self {
            context,
            all_vars: compiler.all_vars,
            loop_vars: compiler.loop_vars,
            program,
        })
    }

    /// Render with the compile-time context, plus `context` layered on top.
    ///
    /// Render-time values shadow compile-time ones for this call only. The
    /// compile-time context is read in place, never copied or changed, so a
    /// shared `Templite` can render from many threads.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when a free variable is in neither context,
    /// or when a dotted lookup, loop or filter fails while rendering.
    pub fn render(&self, context: Option<&Context>) -> Result<String, RenderError> {
        self.render_with(context, &StructuralResolver)
    }

    /// Like [`render`](Self::render), resolving dotted chains with `resolver`.
    pub fn render_with(
        &self,
        context: Option<&Context>,
        resolver: &dyn DotResolver,
    ) -> Result<String, RenderError> {
        match context {
            Some(extra) => self.program.execute_layered(&[&self.context, extra], resolver),
            None => self.program.execute(&self.context, resolver),
        }
    }

    /// Every name referenced by the template: variables, filters, loop names.
    #[must_use]
    pub fn all_vars(&self) -> &BTreeSet<String> {
        &self.all_vars
    }

    /// Names bound by `{% for %}` tags.
    #[must_use]
    pub fn loop_vars(&self) -> &BTreeSet<String> {
        &self.loop_vars
    }

    /// Names that must come from the context, in load order.
    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<String> {
        self.all_vars.difference(&self.loop_vars).cloned().collect()
    }

    /// The merged compile-time context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }
}

#[derive(Default)]
struct BlockCompiler {
    all_vars: BTreeSet<String>,
    loop_vars: BTreeSet<String>,
    buffered: Vec<Output>,
    ops_stack: Vec<BlockKind>,
}

impl BlockCompiler {
    fn compile(&mut self, text: &str) -> Result<Program, SyntaxError> {
        let mut code = CodeBuilder::new();
        let vars_code = code.add_section();
        let mut last_line = 1;

        for spanned in tokenize(text) {
            let line = spanned.line;
            last_line = line;
            let at = |kind: SyntaxErrorKind| SyntaxError::new(kind, line);

            match spanned.token {
                Token::Comment(_) => {}
                Token::Literal(text) => {
                    if !text.is_empty() {
                        self.buffered.push(Output::Literal(text.to_string()));
                    }
                }
                Token::Expression(expr) => {
                    let expr = compile_expr(expr, &mut self.all_vars).map_err(at)?;
                    self.buffered.push(Output::Expr(expr));
                }
                Token::Tag(tag) => {
                    self.flush_output(&mut code);
                    self.compile_tag(tag, &mut code).map_err(at)?;
                }
            }
        }

        if let Some(open) = self.ops_stack.last() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnclosedBlock {
                    kind: *open,
                },
                last_line,
            ));
        }

        self.flush_output(&mut code);
        code.add_line(Node::Return);

        for name in self.all_vars.difference(&self.loop_vars) {
            code.section(vars_code).add_line(Node::Load(name.clone()));
        }
        tracing::debug!("Back-filled {} variable load(s)", code.section(vars_code).len());

        Ok(code.finalize())
    }

    fn compile_tag(&mut self, tag: &str, code: &mut CodeBuilder) -> Result<(), SyntaxErrorKind> {
        let words = tag_words(tag);
        let first = words.first().copied().unwrap_or_default();
        tracing::trace!("Compiling tag {:?}", tag);

        match first {
            "if" => {
                if words.len() != 2 {
                    return Err(SyntaxErrorKind::MalformedIf {
                        tag: tag.to_string(),
                    });
                }
                self.ops_stack.push(BlockKind::If);
                let cond = compile_expr(words[1], &mut self.all_vars)?;
                code.add_line(Node::Branch {
                    cond,
                    body: Vec::new(),
                });
                code.indent();
            }
            "for" => {
                if words.len() != 4 || words[2] != "in" {
                    return Err(SyntaxErrorKind::MalformedFor {
                        tag: tag.to_string(),
                    });
                }
                self.ops_stack.push(BlockKind::For);
                register(words[1], &mut self.loop_vars)?;
                let iter = compile_expr(words[3], &mut self.all_vars)?;
                code.add_line(Node::Loop {
                    var: words[1].to_string(),
                    iter,
                    body: Vec::new(),
                });
                code.indent();
            }
            word if word.starts_with("end") => {
                if words.len() != 1 {
                    return Err(SyntaxErrorKind::MalformedEnd {
                        tag: tag.to_string(),
                    });
                }
                let end_what = &word[3..];
                let Some(start_what) = self.ops_stack.pop() else {
                    return Err(SyntaxErrorKind::TooManyEnds {
                        tag: tag.to_string(),
                    });
                };
                if start_what.as_str() != end_what {
                    return Err(SyntaxErrorKind::MismatchedEnd {
                        open: start_what,
                        found: end_what.to_string(),
                    });
                }
                code.dedent();
            }
            word => {
                return Err(SyntaxErrorKind::UnknownTag {
                    word: word.to_string(),
                });
            }
        }
        Ok(())
    }

    fn flush_output(&mut self, code: &mut CodeBuilder) {
        match self.buffered.len() {
            0 => {}
            1 => code.add_line(Node::Append(self.buffered.remove(0))),
            _ => code.add_line(Node::Extend(std::mem::take(&mut self.buffered))),
        }
    }
}
