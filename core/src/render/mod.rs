//! Value rendering
//!
//! One dispatch over [`SexpType`] feeds three formatting policies:
//!
//! - [`Mode::Print`] - one line for a debugger's inline value view
//! - [`Mode::Inspect`] - node-by-node structure with addresses and flags
//! - [`Mode::Display`] - console-style output for a person reading it
//!
//! Rendering never fails as a whole. Errors below the root are written in
//! place of the failing child and siblings carry on. Every call is bounded by
//! the node budget and the per-mode element and depth limits.

mod atomic;
mod composite;
mod language;
mod layout;
mod opaque;


use std::cell::Cell;
use std::fmt::Write;

use crate::config::{ModeLimits, ProbeConfig};
use crate::error::{INVALID_HANDLE, RenderError};
use crate::handle::{Handle, Sexp};
use crate::runtime::Runtime;
use crate::types::{SexpType, sexptype};

pub(crate) type Result<T = ()> = std::result::Result<T, RenderError>;

/// Rendering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Print,
    Inspect,
    Display,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Print, Mode::Inspect, Mode::Display];
}

/// Per-node rendering context
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ctx {
    pub mode: Mode,
    /// Container nesting below the root
    pub depth: usize,
}

impl Ctx {
    fn root(mode: Mode) -> Self {
        Self { mode, depth: 0 }
    }

    pub fn deeper(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }
}

/// Render `x` as text
///
/// # Safety
///
/// `x` must be null or a live value of the runtime for the whole call.
pub unsafe fn render(runtime: &dyn Runtime, config: &ProbeConfig, x: Sexp, mode: Mode) -> String {
    // SAFETY: guaranteed by the caller.
    let Some(root) = (unsafe { Handle::new(x) }) else {
        return INVALID_HANDLE.to_string();
    };

    let renderer = Renderer::new(runtime, config);
    let mut out = String::new();
    let text = match renderer.value(&mut out, root, Ctx::root(mode)) {
        Ok(()) => renderer.fit_width(out, mode),
        Err(RenderError::BudgetExhausted) => {
            let mut text = renderer.fit_width(out, mode);
            if !text.is_empty() {
                text.push(if mode == Mode::Print { ' ' } else { '\n' });
            }
            text.push_str(&RenderError::BudgetExhausted.to_string());
            text
        }
        Err(err) => err.to_string(),
    };
    cap_output(text, config.max_output)
}

/// Cut `text` at a char boundary so it fits in `max` bytes, marking the cut
fn cap_output(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut marker = format!("\n<truncated: output exceeds {max} bytes>");
    if marker.len() >= max {
        // ASCII, so any length is a char boundary
        marker.truncate(max);
        return marker;
    }
    let mut end = max - marker.len();
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str(&marker);
    text
}

pub(crate) struct Renderer<'r> {
    pub(crate) runtime: &'r dyn Runtime,
    config: &'r ProbeConfig,
    visited: Cell<usize>,
}

impl<'r> Renderer<'r> {
    pub(crate) fn new(runtime: &'r dyn Runtime, config: &'r ProbeConfig) -> Self {
        Self {
            runtime,
            config,
            visited: Cell::new(0),
        }
    }

    pub(crate) fn max_nodes(&self) -> usize {
        self.config.max_nodes
    }

    pub(crate) fn limits(&self, mode: Mode) -> &ModeLimits {
        match mode {
            Mode::Print => &self.config.print,
            Mode::Inspect => &self.config.inspect,
            Mode::Display => &self.config.display,
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Render one value. The only place tags are dispatched.
    pub(crate) fn value<'a>(&self, out: &mut String, x: Handle<'a>, ctx: Ctx) -> Result {
        self.visit()?;
        let ty = self.classify(x)?;

        if ctx.mode == Mode::Inspect {
            self.inspect_header(out, x, ty)?;
        }

        match ty {
            SexpType::Nil => self.nil(out, ctx),
            SexpType::Symbol => self.symbol(out, x, ctx),
            SexpType::Pairlist => self.pairlist(out, x, ctx),
            SexpType::Closure => self.closure(out, x, ctx),
            SexpType::Environment => self.environment(out, x, ctx),
            SexpType::Promise => self.promise(out, x, ctx),
            SexpType::Language => self.language(out, x, ctx),
            SexpType::Special | SexpType::Builtin => self.primitive(out, x, ctx),
            SexpType::Char => self.char(out, x, ctx),
            SexpType::Logical
            | SexpType::Integer
            | SexpType::Real
            | SexpType::Complex
            | SexpType::String
            | SexpType::Raw => self.atomic(out, x, ty, ctx),
            SexpType::Dots => self.dots(out, x, ctx),
            SexpType::Any => self.any(out, ctx),
            SexpType::List => self.list(out, x, ctx),
            SexpType::Expression => self.expression(out, x, ctx),
            SexpType::Bytecode => self.bytecode(out, x, ctx),
            SexpType::ExternalPtr => self.external_ptr(out, x, ctx),
            SexpType::WeakRef => self.weak_ref(out, x, ctx),
            SexpType::Object => self.object(out, x, ctx),
            SexpType::New | SexpType::Free => Err(RenderError::TransientNode(ty)),
            SexpType::Function => self.function_marker(out, ctx),
        }?;

        if ctx.mode == Mode::Inspect {
            self.inspect_attributes(out, x, ctx)?;
        }
        Ok(())
    }

    /// Render the child `ptr` of `parent`, writing a marker in its place on
    /// any non-fatal error
    pub(crate) fn child_value<'a>(
        &self,
        out: &mut String,
        parent: Handle<'a>,
        ptr: Sexp,
        what: &'static str,
        ctx: Ctx,
    ) -> Result {
        self.guarded(out, |out| {
            let child = self.child(parent, ptr, what)?;
            self.value(out, child, ctx)
        })
    }

    /// Run `f`, replacing its partial output with a marker if it fails
    pub(crate) fn guarded(&self, out: &mut String, f: impl FnOnce(&mut String) -> Result) -> Result {
        let mark = out.len();
        match f(out) {
            Err(err) if !err.is_fatal() => {
                out.truncate(mark);
                out.push_str(&err.to_string());
                Ok(())
            }
            other => other,
        }
    }

    // =========================================================================
    // Helpers shared by the formatters
    // =========================================================================

    /// Count one visited node against the budget
    pub(crate) fn visit(&self) -> Result {
        let visited = self.visited.get() + 1;
        self.visited.set(visited);
        if visited > self.config.max_nodes {
            return Err(RenderError::BudgetExhausted);
        }
        Ok(())
    }

    pub(crate) fn classify(&self, x: Handle<'_>) -> Result<SexpType> {
        let code = self.runtime.type_of(x);
        SexpType::try_from(code).map_err(RenderError::UnknownType)
    }

    /// Wrap a child pointer, reporting null as malformed
    pub(crate) fn child<'a>(&self, parent: Handle<'a>, ptr: Sexp, what: &'static str) -> Result<Handle<'a>> {
        parent.child(ptr).ok_or(RenderError::NullChild(what))
    }

    pub(crate) fn is_nil(&self, x: Handle<'_>) -> bool {
        self.runtime.type_of(x) == sexptype::NILSXP
    }

    /// Whether a container at `ctx` may show its children
    pub(crate) fn can_descend(&self, ctx: Ctx) -> bool {
        ctx.depth < self.limits(ctx.mode).max_depth
    }

    /// Contents of a `CHARSXP`, `None` for `NA_STRING`
    pub(crate) fn char_text(&self, x: Handle<'_>) -> Result<Option<String>> {
        match self.classify(x)? {
            SexpType::Char => Ok(self
                .runtime
                .char_bytes(x)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())),
            found => Err(RenderError::UnexpectedType {
                expected: "CHARSXP",
                found,
            }),
        }
    }

    /// Print name of a symbol
    pub(crate) fn symbol_name(&self, x: Handle<'_>) -> Result<String> {
        match self.classify(x)? {
            SexpType::Symbol => {
                let name = self.child(x, self.runtime.printname(x), "PRINTNAME")?;
                Ok(self.char_text(name)?.unwrap_or_else(|| "NA".to_string()))
            }
            found => Err(RenderError::UnexpectedType {
                expected: "SYMSXP",
                found,
            }),
        }
    }

    /// Name carried by a pairlist `TAG`, `None` when untagged
    pub(crate) fn tag_name(&self, cell: Handle<'_>) -> Result<Option<String>> {
        let tag = self.child(cell, self.runtime.tag(cell), "TAG")?;
        if self.is_nil(tag) {
            return Ok(None);
        }
        self.symbol_name(tag).map(Some)
    }

    /// Walk a pairlist-shaped chain of cells, at most `limit` of them
    pub(crate) fn cells<'a>(&self, x: Handle<'a>, limit: usize) -> Result<Cells<'a>> {
        let mut cells = Vec::new();
        let mut cur = x;
        let rest = loop {
            if cells.len() == limit {
                break Rest::More;
            }
            if !cells.is_empty() {
                self.visit()?;
            }
            cells.push(cur);

            let cdr = self.child(cur, self.runtime.cdr(cur), "CDR")?;
            match self.classify(cdr)? {
                SexpType::Nil => break Rest::End,
                ty if ty.is_pairlist_like() => cur = cdr,
                _ => break Rest::Dotted(cdr),
            }
        };
        Ok(Cells { cells, rest })
    }

    /// Element names from the `names` attribute, when present
    pub(crate) fn names<'a>(&self, x: Handle<'a>) -> Result<Option<Handle<'a>>> {
        let Some(names) = self.attribute(x, "names")? else {
            return Ok(None);
        };
        match self.classify(names)? {
            SexpType::String => Ok(Some(names)),
            _ => Ok(None),
        }
    }

    /// The `i`-th name, empty for `NA` and unnamed entries
    pub(crate) fn name_at(&self, names: Handle<'_>, i: usize) -> Result<String> {
        if i >= self.runtime.length(names) {
            return Ok(String::new());
        }
        let elt = self.child(names, self.runtime.string_elt(names, i), "names element")?;
        Ok(self.char_text(elt)?.unwrap_or_default())
    }

    /// A null attribute pointer counts as no attributes
    pub(crate) fn has_attributes(&self, x: Handle<'_>) -> bool {
        x.child(self.runtime.attrib(x))
            .is_some_and(|attrib| !self.is_nil(attrib))
    }

    /// Look up an attribute by name
    pub(crate) fn attribute<'a>(&self, x: Handle<'a>, name: &str) -> Result<Option<Handle<'a>>> {
        let Some(attrib) = x.child(self.runtime.attrib(x)) else {
            return Ok(None);
        };
        if self.is_nil(attrib) {
            return Ok(None);
        }
        let walk = self.cells(attrib, self.config.max_nodes)?;
        for cell in walk.cells {
            if self.tag_name(cell)?.as_deref() == Some(name) {
                return self.child(cell, self.runtime.car(cell), "CAR").map(Some);
            }
        }
        Ok(None)
    }

    /// First element of the `class` attribute of an object
    pub(crate) fn class_name(&self, x: Handle<'_>) -> Result<Option<String>> {
        if !self.runtime.is_object(x) {
            return Ok(None);
        }
        self.first_class(x)
    }

    /// First element of the `class` attribute, object bit or not
    pub(crate) fn first_class(&self, x: Handle<'_>) -> Result<Option<String>> {
        let Some(class) = self.attribute(x, "class")? else {
            return Ok(None);
        };
        if self.classify(class)? != SexpType::String || self.runtime.length(class) == 0 {
            return Ok(None);
        }
        let first = self.child(class, self.runtime.string_elt(class, 0), "class element")?;
        self.char_text(first)
    }

    // =========================================================================
    // Inspect framing
    // =========================================================================

    /// `@<address> <code> <NAME> [flags] (len=n)`
    fn inspect_header(&self, out: &mut String, x: Handle<'_>, ty: SexpType) -> Result {
        write!(out, "@{:x} {:02} {}", x.address(), ty.code(), ty.c_name())?;
        if ty.is_gc_marker() {
            return Ok(());
        }

        let mut flags = Vec::new();
        if self.runtime.is_object(x) {
            flags.push("OBJ");
        }
        if self.has_attributes(x) {
            flags.push("ATT");
        }
        if ty == SexpType::Char && self.runtime.char_bytes(x).is_none() {
            flags.push("NA");
        }
        if ty == SexpType::Promise && self.runtime.promise_value(x).is_some() {
            flags.push("forced");
        }
        if !flags.is_empty() {
            write!(out, " [{}]", flags.join(","))?;
        }

        match ty {
            SexpType::Logical
            | SexpType::Integer
            | SexpType::Real
            | SexpType::Complex
            | SexpType::String
            | SexpType::Raw
            | SexpType::List
            | SexpType::Expression => write!(out, " (len={})", self.runtime.length(x))?,
            SexpType::Char => {
                let len = self.runtime.char_bytes(x).map_or(0, <[u8]>::len);
                write!(out, " (len={len})")?
            }
            _ => {}
        }
        Ok(())
    }

    /// Start a labelled child line one level below `ctx`
    pub(crate) fn inspect_line(&self, out: &mut String, ctx: Ctx, label: &str) {
        out.push('\n');
        push_indent(out, ctx.depth + 1);
        out.push_str(label);
    }

    /// `LABEL <child>` on its own line, or `LABEL ...` past the depth limit
    pub(crate) fn inspect_field<'a>(
        &self,
        out: &mut String,
        parent: Handle<'a>,
        ptr: Sexp,
        label: &'static str,
        ctx: Ctx,
    ) -> Result {
        self.inspect_line(out, ctx, label);
        out.push(' ');
        if !self.can_descend(ctx) {
            out.push_str("...");
            return Ok(());
        }
        self.child_value(out, parent, ptr, label, ctx.deeper())
    }

    /// Report elements left out of an inspect listing
    pub(crate) fn inspect_omitted(&self, out: &mut String, ctx: Ctx, omitted: usize) {
        if omitted > 0 {
            self.inspect_line(out, ctx, &format!("... ({omitted} more)"));
        }
    }

    fn inspect_attributes(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        if !self.has_attributes(x) {
            return Ok(());
        }
        self.inspect_field(out, x, self.runtime.attrib(x), "ATTRIB:", ctx)
    }

    // =========================================================================
    // Print framing
    // =========================================================================

    /// Cut a print-mode line at the configured width
    fn fit_width(&self, text: String, mode: Mode) -> String {
        if mode != Mode::Print {
            return text;
        }
        let width = self.config.print.width.max(4);
        if text.chars().count() <= width {
            return text;
        }
        let mut cut: String = text.chars().take(width - 3).collect();
        cut.push_str("...");
        cut
    }

    /// `<class> ` prefix for classed values in print mode
    pub(crate) fn print_class_prefix(&self, out: &mut String, x: Handle<'_>) -> Result {
        if let Some(class) = self.class_name(x)? {
            write!(out, "<{class}> ")?;
        }
        Ok(())
    }
}

/// Result of walking a chain of cons cells
pub(crate) struct Cells<'a> {
    pub cells: Vec<Handle<'a>>,
    pub rest: Rest<'a>,
}

pub(crate) enum Rest<'a> {
    /// The chain ended in the nil value
    End,
    /// The walk stopped at its limit with cells remaining
    More,
    /// The last `CDR` is neither nil nor a cell
    Dotted(Handle<'a>),
}

pub(crate) fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}
