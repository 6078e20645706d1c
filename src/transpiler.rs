use std::{
    borrow::Cow,
    fmt,
    io,
};

use tracing::debug;

use crate::{
    ast::{BinaryNode, FuncDefNode, LiteralNode, Node, ScopeKind, ScopeNode, VarDefNode},
    error::Error,
    token::{Pos, Span},
    types::TypeError,
};


const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranspilerOptions {
    /// The text inserted once per indentation level.
    pub indent: Cow<'static, str>,
}

impl Default for TranspilerOptions {
    fn default() -> Self {
        TranspilerOptions {
            indent: Cow::Borrowed("    "),
        }
    }
}

/// Lowers a program into C source text.
pub struct Transpiler<W> {
    sink: Sink<W>,
}

impl Transpiler<String> {
    pub fn new(options: TranspilerOptions) -> Transpiler<String> {
        Transpiler::with_writer(String::with_capacity(DEFAULT_CODE_CAPACITY), options)
    }
}

impl<W: fmt::Write> Transpiler<W> {
    pub fn with_writer(writer: W, options: TranspilerOptions) -> Transpiler<W> {
        Transpiler {
            sink: Sink::new(writer, options.indent),
        }
    }

    /// Compiles the program, returning the writer holding the C source.
    pub fn compile(mut self, root: &ScopeNode) -> Result<W> {
        self.compile_root(root)?;
        Ok(self.sink.into_inner())
    }

    fn compile_root(&mut self, root: &ScopeNode) -> Result<()> {
        if root.kind != ScopeKind::Global {
            return Err(internal(root.span(), InternalError::RootNotGlobal));
        }
        debug!(functions = root.statements.len(), "transpiling program");
        for node in &root.statements {
            match node {
                Node::FuncDef(func) => self.compile_func_def(func)?,
                other => self.compile_node(other)?,
            }
            self.sink.new_line()?;
        }
        Ok(())
    }

    fn compile_node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Binary(node) => self.compile_binary(node),
            Node::Literal(node) => self.compile_literal(node),
            Node::VarDef(node) => self.compile_var_def(node),
            Node::Scope(node) => self.compile_scope(node),
            Node::FuncDef(node) => Err(internal(
                node_span(&node.start, &node.end),
                InternalError::NestedFunction,
            )),
        }
    }

    fn compile_binary(&mut self, node: &BinaryNode) -> Result<()> {
        self.compile_node(&node.lhs)?;
        self.sink.append(" ")?;
        self.sink.append(node.op.symbol())?;
        self.sink.append(" ")?;
        self.compile_node(&node.rhs)
    }

    fn compile_literal(&mut self, node: &LiteralNode) -> Result<()> {
        self.sink.append(&node.value.to_string())?;
        Ok(())
    }

    fn compile_func_def(&mut self, node: &FuncDefNode) -> Result<()> {
        let ret_ty = node
            .return_ty
            .ret_c_type()
            .map_err(|e| type_error(e, &node.start, &node.end))?;

        self.sink.new_line()?;
        self.sink.append(ret_ty)?;
        self.sink.append(&format!(" {}() {{\n", node.name))?;
        self.sink.indent();
        self.compile_scope(&node.body)?;
        self.sink.dedent();
        self.sink.new_line()?;
        self.sink.append("}\n")?;
        Ok(())
    }

    fn compile_scope(&mut self, node: &ScopeNode) -> Result<()> {
        if node.kind == ScopeKind::Global {
            return Err(internal(node.span(), InternalError::NestedGlobalScope));
        }
        for statement in &node.statements {
            self.compile_node(statement)?;
            self.sink.new_line()?;
        }
        Ok(())
    }

    fn compile_var_def(&mut self, node: &VarDefNode) -> Result<()> {
        let ty = node
            .ty
            .var_c_type()
            .map_err(|e| type_error(e, &node.start, &node.end))?;

        self.sink.append(&format!("{ty} {} = ", node.name))?;
        self.compile_node(&node.value)?;
        self.sink.append(";")?;
        Ok(())
    }
}

impl<W: io::Write> Transpiler<IoAdapter<W>> {
    /// Creates a transpiler which streams its output into an [`io::Write`].
    pub fn with_io_writer(writer: W, options: TranspilerOptions) -> Transpiler<IoAdapter<W>> {
        let adapter = IoAdapter {
            inner: writer,
            error: None,
        };
        Transpiler::with_writer(adapter, options)
    }

    /// Compiles the program into the underlying writer, which is flushed
    /// whether or not compilation succeeds.
    pub fn compile_to(mut self, root: &ScopeNode) -> Result<W> {
        let result = self.compile_root(root);
        let IoAdapter { mut inner, error } = self.sink.into_inner();
        let flushed = inner.flush();
        if let Some(error) = error {
            return Err(Error::Io(error));
        }
        result?;
        flushed?;
        Ok(inner)
    }
}

/// Bridges [`fmt::Write`] to [`io::Write`], keeping the I/O error (which
/// [`fmt::Error`] can't carry).
pub struct IoAdapter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoAdapter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|error| {
            self.error = Some(error);
            fmt::Error
        })
    }
}

/// An indentation aware text sink.
///
/// Indentation is only written at the start of a line, and only once.
pub struct Sink<W> {
    out: W,
    indent_unit: Cow<'static, str>,
    depth: usize,
    /// Last character written, if any.
    last: Option<char>,
}

impl<W: fmt::Write> Sink<W> {
    pub fn new(out: W, indent_unit: Cow<'static, str>) -> Sink<W> {
        Sink {
            out,
            indent_unit,
            depth: 0,
            last: None,
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn at_line_start(&self) -> bool {
        matches!(self.last, None | Some('\n'))
    }

    fn write_indent(&mut self) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.write_str(&self.indent_unit)?;
        }
        Ok(())
    }

    /// Appends the text, indenting every non-empty line which starts a new
    /// line in the output.
    pub fn append(&mut self, text: &str) -> fmt::Result {
        let Some(last) = text.chars().next_back() else {
            return Ok(());
        };

        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();
        if self.at_line_start() && !first.is_empty() {
            self.write_indent()?;
        }
        self.out.write_str(first)?;
        for line in lines {
            self.out.write_char('\n')?;
            if !line.is_empty() {
                self.write_indent()?;
                self.out.write_str(line)?;
            }
        }

        self.last = Some(last);
        Ok(())
    }

    /// Ends the current line, unless nothing was written yet or the output
    /// already is at the start of a line.
    pub fn new_line(&mut self) -> fmt::Result {
        if self.at_line_start() {
            return Ok(());
        }
        self.out.write_char('\n')?;
        self.last = Some('\n');
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("compilation not defined for a function definition outside the global scope")]
    NestedFunction,
    #[error("compilation not defined for a global scope nested in another node")]
    NestedGlobalScope,
    #[error("compilation not defined for a root which is not a global scope")]
    RootNotGlobal,
}

fn node_span(start: &Pos, end: &Pos) -> Span {
    Span::new(start.clone(), end.clone())
}

fn internal(span: Span, error: InternalError) -> Error {
    Error::Internal(span.wrap(error))
}

fn type_error(source: TypeError, start: &Pos, end: &Pos) -> Error {
    Error::Type {
        source,
        span: Some(node_span(start, end)),
    }
}
