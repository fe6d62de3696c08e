//! Values without a printable payload: nil, symbols, primitives, bytecode,
//! external pointers, weak references and marker tags

use std::fmt::Write;

use super::language::Style;
use super::{Ctx, Mode, Renderer, Result};
use crate::handle::Handle;

impl Renderer<'_> {
    pub(super) fn nil(&self, out: &mut String, ctx: Ctx) -> Result {
        if ctx.mode != Mode::Inspect {
            out.push_str("NULL");
        }
        Ok(())
    }

    pub(super) fn symbol(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let name = self.symbol_name(x)?;
        match ctx.mode {
            Mode::Print => write!(out, "`{}`", name.replace('`', "\\`"))?,
            Mode::Display if name.is_empty() => out.push_str("``"),
            Mode::Display => out.push_str(&name),
            Mode::Inspect => write!(out, " \"{name}\"")?,
        }
        Ok(())
    }

    pub(super) fn primitive(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let name = self
            .runtime
            .primitive_name(x)
            .unwrap_or_else(|| "<unknown>".to_string());
        match ctx.mode {
            Mode::Print => write!(out, ".Primitive(\"{name}\")")?,
            Mode::Display => write!(out, "function (...) .Primitive(\"{name}\")")?,
            Mode::Inspect => write!(out, " .Primitive(\"{name}\")")?,
        }
        Ok(())
    }

    pub(super) fn any(&self, out: &mut String, ctx: Ctx) -> Result {
        if ctx.mode != Mode::Inspect {
            out.push_str("<any>");
        }
        Ok(())
    }

    pub(super) fn function_marker(&self, out: &mut String, ctx: Ctx) -> Result {
        if ctx.mode != Mode::Inspect {
            out.push_str("<function marker>");
        }
        Ok(())
    }

    pub(super) fn bytecode(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        match ctx.mode {
            Mode::Print => out.push_str("<bytecode>"),
            Mode::Display => {
                write!(out, "<bytecode: {:#x}>", x.address())?;
                let expr = self.child(x, self.runtime.bytecode_expr(x), "bytecode expression")?;
                if !self.is_nil(expr) {
                    out.push('\n');
                    let max_elements = self.limits(ctx.mode).max_elements;
                    self.deparse(out, expr, Style::new(true, max_elements))?;
                }
            }
            Mode::Inspect => self.inspect_field(out, x, self.runtime.bytecode_expr(x), "EXPR:", ctx)?,
        }
        Ok(())
    }

    pub(super) fn external_ptr(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let rt = self.runtime;
        let pointer = format!("<pointer: {:#x}>", rt.extptr_addr(x));
        match ctx.mode {
            Mode::Print => out.push_str(&pointer),
            Mode::Display => {
                out.push_str(&pointer);
                let tag = self.child(x, rt.extptr_tag(x), "EXTPTR_TAG")?;
                if !self.is_nil(tag) {
                    out.push_str("\ntag: ");
                    self.child_value(out, x, tag.as_ptr(), "EXTPTR_TAG", ctx.deeper().with_mode(Mode::Print))?;
                }
            }
            Mode::Inspect => {
                write!(out, " {pointer}")?;
                self.inspect_field(out, x, rt.extptr_tag(x), "TAG:", ctx)?;
                self.inspect_field(out, x, rt.extptr_prot(x), "PROT:", ctx)?;
            }
        }
        Ok(())
    }

    pub(super) fn weak_ref(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        match ctx.mode {
            Mode::Print | Mode::Display => out.push_str("<weak reference>"),
            Mode::Inspect => {
                self.inspect_field(out, x, self.runtime.weakref_key(x), "KEY:", ctx)?;
                self.inspect_field(out, x, self.runtime.weakref_value(x), "VALUE:", ctx)?;
            }
        }
        Ok(())
    }
}
