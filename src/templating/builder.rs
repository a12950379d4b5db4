//! Indentation-aware accumulator of template instructions.
//!
//! `CodeBuilder` mirrors how a code generator writes nested source: lines are
//! added at the current level, `indent` opens the body of the block that was
//! just added, and `dedent` closes it. A *section* is a placeholder reserved
//! at the current position and filled in later; the compiler uses one to hold
//! the variable loads, whose content is only known once the whole template
//! has been scanned.

use super::program::{Node, Program};

/// Handle to a section reserved with [`CodeBuilder::add_section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionId(usize);

/// Instructions reserved at one position and filled in later.
#[derive(Debug, Default)]
pub struct Section {
    nodes: Vec<Node>,
}

impl Section {
    pub fn add_line(&mut self, node: Node) {
        self.nodes.push(node);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug)]
enum Line {
    Node(Node),
    Block { node: Node, body: Vec<Line> },
    Section(SectionId),
}

/// Builds a [`Program`] line by line, tracking block nesting.
///
/// Block instructions (`Branch`, `Loop`) are added like any other line and
/// then opened with [`indent`](Self::indent); everything added until the
/// matching [`dedent`](Self::dedent) becomes their body. Sections reserved
/// with [`add_section`](Self::add_section) may be filled at any time before
/// [`finalize`](Self::finalize) and keep the position they were reserved at.
///
/// # Examples
///
/// ```
/// use templite::templating::builder::CodeBuilder;
/// use templite::templating::{Expr, Node, Output};
///
/// let mut code = CodeBuilder::new();
/// let loads = code.add_section();
/// code.add_line(Node::Branch {
///     cond: Expr::Var("show".into()),
///     body: Vec::new(),
/// });
/// code.indent();
/// code.add_line(Node::Append(Output::Literal("shown".into())));
/// code.dedent();
/// code.section(loads).add_line(Node::Load("show".into()));
///
/// let program = code.finalize();
/// assert_eq!(program.nodes()[0], Node::Load("show".into()));
/// assert!(program.nodes()[1].is_block());
/// ```
#[derive(Debug)]
pub struct CodeBuilder {
    /// Open levels; the last one receives new lines. Never empty.
    levels: Vec<Vec<Line>>,
    sections: Vec<Section>,
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: vec![Vec::new()],
            sections: Vec::new(),
        }
    }

    /// Current nesting depth; 0 at top level.
    #[must_use]
    pub fn indent_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// Append an instruction at the current level.
    pub fn add_line(&mut self, node: Node) {
        self.current().push(Line::Node(node));
    }

    /// Open the body of the most recently added block instruction.
    ///
    /// # Panics
    ///
    /// Panics if the last line at this level is not a `Branch` or `Loop`.
    pub fn indent(&mut self) {
        let opens_block = matches!(self.current().last(), Some(Line::Node(node)) if node.is_block());
        assert!(opens_block, "indent() must follow a block instruction");
        self.levels.push(Vec::new());
    }

    /// Close the innermost open body.
    ///
    /// # Panics
    ///
    /// Panics when already at top level.
    pub fn dedent(&mut self) {
        assert!(self.levels.len() > 1, "dedent() below top level");
        let body = self.levels.pop().unwrap_or_default();
        let header = self.current().pop();
        match header {
            Some(Line::Node(node)) => self.current().push(Line::Block {
                node,
                body,
            }),
            other => panic!("open body without a block instruction: {other:?}"),
        }
    }

    /// Reserve a section at the current position.
    pub fn add_section(&mut self) -> SectionId {
        let id = SectionId(self.sections.len());
        self.sections.push(Section::default());
        self.current().push(Line::Section(id));
        id
    }

    /// Access a reserved section to fill it.
    pub fn section(&mut self, id: SectionId) -> &mut Section {
        &mut self.sections[id.0]
    }

    /// Flatten lines and sections, in the order they were added, into a program.
    ///
    /// # Panics
    ///
    /// Panics if a body is still open.
    #[must_use]
    pub fn finalize(mut self) -> Program {
        assert_eq!(self.indent_level(), 0, "finalize() with an open block");
        let lines = self.levels.pop().unwrap_or_default();
        let mut sections: Vec<Option<Section>> = self.sections.into_iter().map(Some).collect();
        Program::new(flatten(lines, &mut sections))
    }

    fn current(&mut self) -> &mut Vec<Line> {
        self.levels.last_mut().expect("builder always has a top level")
    }
}

fn flatten(lines: Vec<Line>, sections: &mut [Option<Section>]) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(lines.len());
    for line in lines {
        match line {
            Line::Node(node) => nodes.push(node),
            Line::Block {
                mut node,
                body,
            } => {
                node.set_body(flatten(body, sections));
                nodes.push(node);
            }
            Line::Section(id) => {
                if let Some(section) = sections[id.0].take() {
                    nodes.extend(section.nodes);
                }
            }
        }
    }
    nodes
}
