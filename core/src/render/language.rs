//! Language objects and deparsing
//!
//! Calls are turned back into source text. Operators get their usual infix
//! or prefix form and operands are parenthesized only where precedence
//! requires it. Anything that has no source form falls back to a `<kind>`
//! placeholder.

use std::borrow::Cow;
use std::fmt::Write;

use super::atomic::{empty_vector, quote};
use super::{Ctx, Mode, Renderer, Rest, Result};
use crate::error::RenderError;
use crate::handle::Handle;
use crate::types::SexpType;

/// Nested expressions deparsed before the remainder is elided
const NESTING_LIMIT: usize = 64;

const INDENT: &str = "    ";

/// Deparse layout
#[derive(Debug, Clone, Copy)]
pub(super) struct Style {
    /// Break `{` blocks over lines
    pub multiline: bool,
    /// Block level for multiline output
    indent: usize,
    nesting: usize,
    /// Elements shown per argument list or vector constant
    pub max_elements: usize,
}

impl Style {
    pub fn new(multiline: bool, max_elements: usize) -> Self {
        Self {
            multiline,
            indent: 0,
            nesting: 0,
            max_elements: max_elements.max(1),
        }
    }

    fn nested(self) -> Self {
        Self {
            nesting: self.nesting + 1,
            ..self
        }
    }

    fn indented(self) -> Self {
        Self {
            indent: self.indent + 1,
            ..self.nested()
        }
    }
}

/// Operator table entry
#[derive(Debug, Clone, Copy)]
struct Operator {
    precedence: u8,
    right_assoc: bool,
    spaced: bool,
}

const fn op(precedence: u8, right_assoc: bool, spaced: bool) -> Option<Operator> {
    Some(Operator {
        precedence,
        right_assoc,
        spaced,
    })
}

fn binary_operator(name: &str) -> Option<Operator> {
    match name {
        "::" | ":::" => op(16, false, false),
        "$" | "@" => op(15, false, false),
        "^" => op(14, true, false),
        ":" => op(12, false, false),
        "|>" => op(11, false, true),
        "*" | "/" => op(10, false, true),
        "+" | "-" => op(9, false, true),
        "<" | ">" | "<=" | ">=" | "==" | "!=" => op(8, false, true),
        "&" | "&&" => op(6, false, true),
        "|" | "||" => op(5, false, true),
        "~" => op(4, false, true),
        "->" | "->>" => op(3, false, true),
        "<-" | "<<-" => op(2, true, true),
        "=" => op(1, true, true),
        "?" => op(0, false, true),
        name if name.len() > 1 && name.starts_with('%') && name.ends_with('%') => {
            op(11, false, true)
        }
        _ => None,
    }
}

fn unary_operator(name: &str) -> Option<Operator> {
    match name {
        "-" | "+" => op(13, false, false),
        "!" => op(7, false, false),
        "~" => op(4, false, false),
        "?" => op(0, false, false),
        _ => None,
    }
}

const RESERVED: &[&str] = &[
    "if", "else", "repeat", "while", "function", "for", "next", "break", "in", "TRUE", "FALSE",
    "NULL", "Inf", "NaN", "NA", "NA_integer_", "NA_real_", "NA_character_", "NA_complex_",
];

/// Whether `name` can be written as a bare symbol
pub(super) fn is_syntactic(name: &str) -> bool {
    if name == "..." || RESERVED.contains(&name) {
        return name == "...";
    }
    if let Some(rest) = name.strip_prefix("..") {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let valid_start = first.is_alphabetic()
        || (first == '.' && !name.chars().nth(1).is_some_and(|c| c.is_ascii_digit()));
    valid_start && chars.all(|c| c.is_alphanumeric() || c == '.' || c == '_')
}

/// Backquote a symbol name unless it is syntactic. The empty name (a missing
/// argument) stays empty.
pub(super) fn quote_symbol(name: &str) -> Cow<'_, str> {
    if name.is_empty() || is_syntactic(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{}`", name.replace('`', "\\`")))
    }
}

/// One call argument
struct Arg<'a> {
    name: Option<String>,
    value: Handle<'a>,
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

impl Renderer<'_> {
    pub(super) fn language(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let limits = self.limits(ctx.mode);
        match ctx.mode {
            Mode::Print => self.deparse(out, x, Style::new(false, limits.max_elements)),
            Mode::Display => self.deparse(out, x, Style::new(true, limits.max_elements)),
            Mode::Inspect => self.inspect_cells(out, x, ctx),
        }
    }

    /// Write `x` as source text, marking unreadable sub-expressions in place
    pub(super) fn deparse(&self, out: &mut String, x: Handle<'_>, style: Style) -> Result {
        self.guarded(out, |out| self.deparse_value(out, x, style))
    }

    fn deparse_value(&self, out: &mut String, x: Handle<'_>, style: Style) -> Result {
        if style.nesting > NESTING_LIMIT {
            out.push_str("...");
            return Ok(());
        }
        self.visit()?;

        let rt = self.runtime;
        match self.classify(x)? {
            SexpType::Nil => out.push_str("NULL"),
            SexpType::Symbol => out.push_str(&quote_symbol(&self.symbol_name(x)?)),
            SexpType::Language => self.deparse_call(out, x, style)?,
            ty @ (SexpType::Logical
            | SexpType::Integer
            | SexpType::Real
            | SexpType::Complex
            | SexpType::String
            | SexpType::Raw) => self.deparse_constant(out, x, ty, style)?,
            SexpType::Char => match self.char_text(x)? {
                Some(text) => out.push_str(&quote(&text)),
                None => out.push_str("NA_character_"),
            },
            SexpType::Pairlist | SexpType::Dots => {
                out.push_str("pairlist(");
                let (args, more) = self.call_args(x, style)?;
                self.deparse_args(out, &args, more, style)?;
                out.push(')');
            }
            ty @ (SexpType::List | SexpType::Expression) => {
                out.push_str(if ty == SexpType::List { "list(" } else { "expression(" });
                let len = rt.length(x);
                let shown = len.min(style.max_elements);
                let names = self.names(x)?;
                for i in 0..shown {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Some(names) = names {
                        let name = self.name_at(names, i)?;
                        if !name.is_empty() {
                            write!(out, "{} = ", quote_symbol(&name))?;
                        }
                    }
                    let elt = self.child(x, rt.vector_elt(x, i), "VECTOR_ELT")?;
                    self.deparse(out, elt, style.nested())?;
                }
                if shown < len {
                    out.push_str(", ...");
                }
                out.push(')');
            }
            SexpType::Closure => {
                let formals = self.child(x, rt.formals(x), "FORMALS")?;
                let body = self.child(x, rt.body(x), "BODY")?;
                self.deparse_function(out, formals, body, style)?;
            }
            SexpType::Promise => {
                let code = self.child(x, rt.promise_code(x), "PRCODE")?;
                self.deparse(out, code, style.nested())?;
            }
            SexpType::Bytecode => {
                let expr = self.child(x, rt.bytecode_expr(x), "bytecode expression")?;
                self.deparse(out, expr, style.nested())?;
            }
            ty if ty.is_gc_marker() => return Err(RenderError::TransientNode(ty)),
            ty => write!(out, "<{}>", ty.type_name())?,
        }
        Ok(())
    }

    /// Arguments of a call (the cells after the function), and whether
    /// more were left out
    fn call_args<'a>(&self, first: Handle<'a>, style: Style) -> Result<(Vec<Arg<'a>>, bool)> {
        if self.is_nil(first) {
            return Ok((Vec::new(), false));
        }
        let walk = self.cells(first, style.max_elements)?;
        let mut args = Vec::with_capacity(walk.cells.len());
        for cell in walk.cells {
            args.push(Arg {
                name: self.tag_name(cell)?,
                value: self.child(cell, self.runtime.car(cell), "CAR")?,
            });
        }
        Ok((args, matches!(walk.rest, Rest::More)))
    }

    fn deparse_args(&self, out: &mut String, args: &[Arg<'_>], more: bool, style: Style) -> Result {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(name) = &arg.name {
                out.push_str(&quote_symbol(name));
                if self.is_missing_arg(arg.value) {
                    continue;
                }
                out.push_str(" = ");
            }
            self.deparse(out, arg.value, style.nested())?;
        }
        if more {
            out.push_str(", ...");
        }
        Ok(())
    }

    /// The empty symbol stands in for a missing argument
    fn is_missing_arg(&self, x: Handle<'_>) -> bool {
        self.classify(x).ok() == Some(SexpType::Symbol)
            && self.symbol_name(x).is_ok_and(|name| name.is_empty())
    }

    /// Name of the function symbol at the head of a call
    fn call_name(&self, call: Handle<'_>) -> Result<Option<String>> {
        let head = self.child(call, self.runtime.car(call), "CAR")?;
        if self.classify(head)? != SexpType::Symbol {
            return Ok(None);
        }
        self.symbol_name(head).map(Some)
    }

    /// Operator binding `x`, when `x` is an operator call
    fn operator_of(&self, x: Handle<'_>) -> Result<Option<Operator>> {
        if self.classify(x)? != SexpType::Language {
            return Ok(None);
        }
        let Some(name) = self.call_name(x)? else {
            return Ok(None);
        };
        let args = self.child(x, self.runtime.cdr(x), "CDR")?;
        if self.is_nil(args) {
            return Ok(None);
        }
        let walk = self.cells(args, 3)?;
        Ok(match walk.cells.len() {
            1 => unary_operator(&name),
            2 => binary_operator(&name),
            _ => None,
        })
    }

    /// Deparse an operand, parenthesized when it binds looser than its
    /// operator
    fn deparse_operand(&self, out: &mut String, x: Handle<'_>, parent: Operator, left: bool, style: Style) -> Result {
        let needs_parens = match self.operator_of(x)? {
            Some(inner) => {
                inner.precedence < parent.precedence
                    || (inner.precedence == parent.precedence && left == parent.right_assoc)
            }
            None => false,
        };
        if needs_parens {
            out.push('(');
        }
        self.deparse(out, x, style.nested())?;
        if needs_parens {
            out.push(')');
        }
        Ok(())
    }

    fn deparse_call(&self, out: &mut String, call: Handle<'_>, style: Style) -> Result {
        let rt = self.runtime;
        let head = self.child(call, rt.car(call), "CAR")?;
        let first = self.child(call, rt.cdr(call), "CDR")?;
        let name = self.call_name(call)?;
        let (args, more) = self.call_args(first, style)?;
        let inner = style.nested();

        let operator = match (name.as_deref(), args.len(), more) {
            (Some(name), 2, false) => binary_operator(name),
            (Some(name), 1, false) => unary_operator(name),
            _ => None,
        };

        match (name.as_deref(), args.as_slice(), more, operator) {
            (Some("{"), statements, more, _) => self.deparse_block(out, statements, more, style)?,
            (Some("("), [expr], false, _) => {
                out.push('(');
                self.deparse(out, expr.value, inner)?;
                out.push(')');
            }
            (Some("if"), [condition, consequent, rest @ ..], false, _) if rest.len() <= 1 => {
                out.push_str("if (");
                self.deparse(out, condition.value, inner)?;
                out.push_str(") ");
                self.deparse(out, consequent.value, inner)?;
                if let [alternative] = rest {
                    out.push_str(" else ");
                    self.deparse(out, alternative.value, inner)?;
                }
            }
            (Some("for"), [var, seq, body], false, _) => {
                out.push_str("for (");
                self.deparse(out, var.value, inner)?;
                out.push_str(" in ");
                self.deparse(out, seq.value, inner)?;
                out.push_str(") ");
                self.deparse(out, body.value, inner)?;
            }
            (Some("while"), [condition, body], false, _) => {
                out.push_str("while (");
                self.deparse(out, condition.value, inner)?;
                out.push_str(") ");
                self.deparse(out, body.value, inner)?;
            }
            (Some(word @ ("break" | "next")), [], false, _) => out.push_str(word),
            (Some("repeat"), [body], false, _) => {
                out.push_str("repeat ");
                self.deparse(out, body.value, inner)?;
            }
            (Some("function"), [formals, body, ..], false, _) => {
                self.deparse_function(out, formals.value, body.value, style)?;
            }
            (Some(bracket @ ("[" | "[[")), [target, rest @ ..], more, _) => {
                let postfix = Operator {
                    precedence: 15,
                    right_assoc: false,
                    spaced: false,
                };
                self.deparse_operand(out, target.value, postfix, true, style)?;
                out.push_str(bracket);
                self.deparse_args(out, rest, more, style)?;
                out.push_str(if bracket == "[" { "]" } else { "]]" });
            }
            (Some(name), [lhs, rhs], false, Some(operator)) => {
                self.deparse_operand(out, lhs.value, operator, true, style)?;
                if operator.spaced {
                    write!(out, " {name} ")?;
                } else {
                    out.push_str(name);
                }
                self.deparse_operand(out, rhs.value, operator, false, style)?;
            }
            (Some(name), [operand], false, Some(operator)) => {
                out.push_str(name);
                self.deparse_operand(out, operand.value, operator, false, style)?;
            }
            _ => {
                let wrap = self.classify(head)? == SexpType::Language
                    && self.call_name(head)?.as_deref() == Some("function");
                if wrap {
                    out.push('(');
                }
                self.deparse(out, head, inner)?;
                if wrap {
                    out.push(')');
                }
                out.push('(');
                self.deparse_args(out, &args, more, style)?;
                out.push(')');
            }
        }
        Ok(())
    }

    fn deparse_block(&self, out: &mut String, statements: &[Arg<'_>], more: bool, style: Style) -> Result {
        if statements.is_empty() {
            out.push_str(if style.multiline { "{\n" } else { "{" });
            if style.multiline {
                push_indent(out, style.indent);
            }
            out.push('}');
            return Ok(());
        }

        if !style.multiline {
            out.push('{');
            for (i, statement) in statements.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                self.deparse(out, statement.value, style.nested())?;
            }
            if more {
                out.push_str("; ...");
            }
            out.push('}');
            return Ok(());
        }

        out.push_str("{\n");
        for statement in statements {
            push_indent(out, style.indent + 1);
            self.deparse(out, statement.value, style.indented())?;
            out.push('\n');
        }
        if more {
            push_indent(out, style.indent + 1);
            out.push_str("...\n");
        }
        push_indent(out, style.indent);
        out.push('}');
        Ok(())
    }

    /// `function(x, y = 2) body`
    pub(super) fn deparse_function(&self, out: &mut String, formals: Handle<'_>, body: Handle<'_>, style: Style) -> Result {
        self.deparse_signature(out, formals, style)?;
        out.push(' ');
        self.deparse(out, body, style.nested())
    }

    /// `function(x, y = 2)`
    pub(super) fn deparse_signature(&self, out: &mut String, formals: Handle<'_>, style: Style) -> Result {
        out.push_str("function(");
        let (args, more) = self.call_args(formals, style)?;
        self.deparse_args(out, &args, more, style)?;
        out.push(')');
        Ok(())
    }

    fn deparse_constant(&self, out: &mut String, x: Handle<'_>, ty: SexpType, style: Style) -> Result {
        let len = self.runtime.length(x);
        if len == 0 {
            out.push_str(empty_vector(ty));
            return Ok(());
        }
        let shown = len.min(style.max_elements);
        let elements = self.elements(x, ty, shown, Mode::Print)?;
        let elements: Vec<String> = match ty {
            SexpType::Raw => elements.into_iter().map(|e| format!("0x{e}")).collect(),
            _ => elements,
        };
        let names = self.names(x)?;

        let wrap_raw = ty == SexpType::Raw;
        if wrap_raw {
            out.push_str("as.raw(");
        }
        if len == 1 && names.is_none() {
            out.push_str(&elements[0]);
        } else {
            out.push_str("c(");
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if let Some(names) = names {
                    let name = self.name_at(names, i)?;
                    if !name.is_empty() {
                        write!(out, "{} = ", quote_symbol(&name))?;
                    }
                }
                out.push_str(element);
            }
            if shown < len {
                out.push_str(", ...");
            }
            out.push(')');
        }
        if wrap_raw {
            out.push(')');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntactic_names() {
        for name in ["x", "foo.bar", "x_1", ".hidden", "...", "..1", "café"] {
            assert!(is_syntactic(name), "{name} should be syntactic");
        }
        for name in ["", "1x", "a b", "_x", ".1x", "if", "TRUE", "NULL", "a-b"] {
            assert!(!is_syntactic(name), "{name} should not be syntactic");
        }
    }

    #[test]
    fn test_quote_symbol() {
        assert_eq!(quote_symbol("x"), "x");
        assert_eq!(quote_symbol("my var"), "`my var`");
        assert_eq!(quote_symbol("if"), "`if`");
        assert_eq!(quote_symbol(""), "");
    }

    #[test]
    fn test_operator_table() {
        let plus = binary_operator("+").unwrap();
        let times = binary_operator("*").unwrap();
        assert!(times.precedence > plus.precedence);
        assert!(binary_operator("^").unwrap().right_assoc);
        assert!(binary_operator("%in%").is_some());
        assert!(binary_operator("%").is_none());
        assert!(!binary_operator("$").unwrap().spaced);
        assert!(unary_operator("!").is_some());
        assert!(unary_operator("*").is_none());
    }
}
