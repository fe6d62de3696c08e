//! Containers: lists, pairlists, environments, promises, closures and S4
//! objects

use std::fmt::Write;

use super::language::{Style, quote_symbol};
use super::layout;
use super::{Ctx, Mode, Renderer, Rest, Result};
use crate::error::RenderError;
use crate::handle::{Handle, Sexp};
use crate::types::SexpType;

/// One named or positional child of a container
struct Entry<'a> {
    name: Option<String>,
    parent: Handle<'a>,
    ptr: Sexp,
    what: &'static str,
}

/// Entries read from a container, and how many were left out
struct Entries<'a> {
    items: Vec<Entry<'a>>,
    /// `None` when the total is unknown (a chain cut at its limit)
    omitted: Option<usize>,
}

impl Entries<'_> {
    fn truncated(&self) -> bool {
        self.omitted != Some(0)
    }
}

impl Renderer<'_> {
    // =========================================================================
    // Entry collection
    // =========================================================================

    fn vector_entries<'a>(&self, x: Handle<'a>, limit: usize) -> Result<Entries<'a>> {
        let len = self.runtime.length(x);
        let shown = len.min(limit);
        let names = self.names(x)?;
        let mut items = Vec::with_capacity(shown);
        for i in 0..shown {
            let name = match names {
                Some(names) => Some(self.name_at(names, i)?).filter(|name| !name.is_empty()),
                None => None,
            };
            items.push(Entry {
                name,
                parent: x,
                ptr: self.runtime.vector_elt(x, i),
                what: "VECTOR_ELT",
            });
        }
        Ok(Entries {
            items,
            omitted: Some(len - shown),
        })
    }

    fn cell_entries<'a>(&self, x: Handle<'a>, limit: usize) -> Result<Entries<'a>> {
        let walk = self.cells(x, limit)?;
        let mut items = Vec::with_capacity(walk.cells.len());
        for cell in walk.cells {
            items.push(Entry {
                name: self.tag_name(cell)?,
                parent: cell,
                ptr: self.runtime.car(cell),
                what: "CAR",
            });
        }
        let omitted = match walk.rest {
            Rest::More => None,
            Rest::End | Rest::Dotted(_) => Some(0),
        };
        Ok(Entries { items, omitted })
    }

    // =========================================================================
    // Shared layouts
    // =========================================================================

    /// `list(a = 1L, "x", ...)`
    fn print_entries(&self, out: &mut String, head: &str, entries: &Entries<'_>, ctx: Ctx) -> Result {
        write!(out, "{head}(")?;
        for (i, entry) in entries.items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(name) = &entry.name {
                write!(out, "{} = ", quote_symbol(name))?;
            }
            self.child_value(out, entry.parent, entry.ptr, entry.what, ctx.deeper())?;
        }
        if entries.truncated() {
            out.push_str(if entries.items.is_empty() { "..." } else { ", ..." });
        }
        out.push(')');
        Ok(())
    }

    /// `$name` / `[[i]]` sections, nested containers extending the label
    fn display_entries(&self, out: &mut String, prefix: &str, entries: &Entries<'_>, ctx: Ctx) -> Result {
        for (i, entry) in entries.items.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            let label = match &entry.name {
                Some(name) => format!("{prefix}${}", quote_symbol(name)),
                None => format!("{prefix}[[{}]]", i + 1),
            };
            out.push_str(&label);
            out.push('\n');
            self.guarded(out, |out| {
                let child = self.child(entry.parent, entry.ptr, entry.what)?;
                self.display_nested(out, child, &label, ctx.deeper())
            })?;
        }
        match entries.omitted {
            Some(omitted) => layout::omitted(out, omitted),
            None => out.push_str("\n [ reached max_elements -- omitted further entries ]"),
        }
        Ok(())
    }

    /// Display a list element, continuing the section label into plain
    /// nested lists
    fn display_nested(&self, out: &mut String, x: Handle<'_>, label: &str, ctx: Ctx) -> Result {
        let ty = self.classify(x)?;
        let plain_container = matches!(ty, SexpType::List | SexpType::Pairlist)
            && !self.runtime.is_object(x)
            && (ty == SexpType::Pairlist || self.runtime.length(x) > 0);
        if !plain_container || !self.can_descend(ctx) {
            return self.value(out, x, ctx);
        }

        self.visit()?;
        let limit = self.limits(ctx.mode).max_elements;
        let entries = match ty {
            SexpType::List => self.vector_entries(x, limit)?,
            _ => self.cell_entries(x, limit)?,
        };
        self.display_entries(out, label, &entries, ctx)?;
        self.display_attributes(out, x, ctx)
    }

    /// Trailing `attr(,"name")` sections; `names` is shown inline instead
    pub(super) fn display_attributes(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        if !self.has_attributes(x) {
            return Ok(());
        }
        let limit = self.limits(ctx.mode).max_elements;
        let attrib = self.child(x, self.runtime.attrib(x), "ATTRIB")?;
        let entries = self.cell_entries(attrib, limit)?;
        let skip_class = self.runtime.is_object(x);
        for entry in &entries.items {
            let name = entry.name.as_deref().unwrap_or_default();
            if name == "names" || (skip_class && name == "class") {
                continue;
            }
            write!(out, "\nattr(,\"{name}\")\n")?;
            if !self.can_descend(ctx) {
                out.push_str("...");
                continue;
            }
            self.child_value(out, entry.parent, entry.ptr, entry.what, ctx.deeper())?;
        }
        Ok(())
    }

    /// `TAG:`/`CAR:` lines for each cell of a pairlist-shaped value
    pub(super) fn inspect_cells(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        if !self.can_descend(ctx) {
            out.push_str(" ...");
            return Ok(());
        }
        let walk = self.cells(x, self.limits(ctx.mode).max_elements)?;
        for cell in walk.cells {
            let tag = self.runtime.tag(cell);
            if cell.child(tag).is_some_and(|tag| !self.is_nil(tag)) {
                self.inspect_field(out, cell, tag, "TAG:", ctx)?;
            }
            self.inspect_field(out, cell, self.runtime.car(cell), "CAR:", ctx)?;
        }
        match walk.rest {
            Rest::End => {}
            Rest::More => self.inspect_line(out, ctx, "..."),
            Rest::Dotted(cdr) => self.inspect_field(out, cdr, cdr.as_ptr(), "CDR:", ctx)?,
        }
        Ok(())
    }

    /// An environment header with its name, never its bindings
    fn inspect_environment_ref(&self, out: &mut String, env: Handle<'_>, label: &str, ctx: Ctx) -> Result {
        self.inspect_line(out, ctx, label);
        out.push(' ');
        self.guarded(out, |out| {
            self.visit()?;
            let ty = self.classify(env)?;
            self.inspect_header(out, env, ty)?;
            if ty == SexpType::Environment {
                write!(out, " <{}>", self.environment_label(env))?;
            }
            Ok(())
        })
    }

    pub(super) fn environment_label(&self, env: Handle<'_>) -> String {
        self.runtime
            .environment_name(env)
            .unwrap_or_else(|| format!("{:#x}", env.address()))
    }

    // =========================================================================
    // Per-tag formatters
    // =========================================================================

    pub(super) fn list(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let limits = *self.limits(ctx.mode);
        let len = self.runtime.length(x);
        match ctx.mode {
            Mode::Print => {
                self.print_class_prefix(out, x)?;
                if len == 0 {
                    out.push_str("list()");
                } else if !self.can_descend(ctx) {
                    out.push_str("list(...)");
                } else {
                    let entries = self.vector_entries(x, limits.max_elements)?;
                    self.print_entries(out, "list", &entries, ctx)?;
                }
                Ok(())
            }
            Mode::Display => {
                if len == 0 {
                    out.push_str("list()");
                } else if !self.can_descend(ctx) {
                    out.push_str("list(...)");
                } else {
                    let entries = self.vector_entries(x, limits.max_elements)?;
                    self.display_entries(out, "", &entries, ctx)?;
                }
                self.display_attributes(out, x, ctx)
            }
            Mode::Inspect => self.inspect_vector_children(out, x, len, ctx),
        }
    }

    pub(super) fn expression(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let limits = *self.limits(ctx.mode);
        let len = self.runtime.length(x);
        match ctx.mode {
            Mode::Print => self.deparse(out, x, Style::new(false, limits.max_elements)),
            Mode::Display => {
                if len == 0 {
                    out.push_str("expression()");
                    return Ok(());
                }
                let shown = len.min(limits.max_elements.max(1));
                for i in 0..shown {
                    if i > 0 {
                        out.push('\n');
                    }
                    self.guarded(out, |out| {
                        let elt = self.child(x, self.runtime.vector_elt(x, i), "VECTOR_ELT")?;
                        self.deparse(out, elt, Style::new(true, limits.max_elements))
                    })?;
                }
                layout::omitted(out, len - shown);
                Ok(())
            }
            Mode::Inspect => self.inspect_vector_children(out, x, len, ctx),
        }
    }

    fn inspect_vector_children(&self, out: &mut String, x: Handle<'_>, len: usize, ctx: Ctx) -> Result {
        if len == 0 {
            return Ok(());
        }
        if !self.can_descend(ctx) {
            out.push_str(" ...");
            return Ok(());
        }
        let shown = len.min(self.limits(ctx.mode).max_elements);
        for i in 0..shown {
            self.inspect_line(out, ctx, &format!("[{}] ", i + 1));
            self.child_value(out, x, self.runtime.vector_elt(x, i), "VECTOR_ELT", ctx.deeper())?;
        }
        self.inspect_omitted(out, ctx, len - shown);
        Ok(())
    }

    pub(super) fn pairlist(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let limits = *self.limits(ctx.mode);
        match ctx.mode {
            Mode::Print => {
                self.print_class_prefix(out, x)?;
                if !self.can_descend(ctx) {
                    out.push_str("pairlist(...)");
                    return Ok(());
                }
                let entries = self.cell_entries(x, limits.max_elements)?;
                self.print_entries(out, "pairlist", &entries, ctx)
            }
            Mode::Display => {
                if !self.can_descend(ctx) {
                    out.push_str("pairlist(...)");
                } else {
                    let entries = self.cell_entries(x, limits.max_elements)?;
                    self.display_entries(out, "", &entries, ctx)?;
                }
                self.display_attributes(out, x, ctx)
            }
            Mode::Inspect => self.inspect_cells(out, x, ctx),
        }
    }

    pub(super) fn dots(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        match ctx.mode {
            Mode::Print => {
                let walk = self.cells(x, self.max_nodes())?;
                let count = walk.cells.len();
                match walk.rest {
                    Rest::More => write!(out, "<...> ({count}+)")?,
                    Rest::End | Rest::Dotted(_) => write!(out, "<...> ({count})")?,
                }
                Ok(())
            }
            Mode::Display => {
                if !self.can_descend(ctx) {
                    out.push_str("<...>");
                    return Ok(());
                }
                let entries = self.cell_entries(x, self.limits(ctx.mode).max_elements)?;
                self.display_entries(out, "", &entries, ctx)
            }
            Mode::Inspect => self.inspect_cells(out, x, ctx),
        }
    }

    pub(super) fn environment(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let rt = self.runtime;
        let label = self.environment_label(x);
        match ctx.mode {
            Mode::Print => {
                write!(out, "<environment: {label}>")?;
                Ok(())
            }
            Mode::Display => {
                write!(out, "<environment: {label}>")?;
                let count = rt.binding_count(x);
                let shown = count.min(self.limits(ctx.mode).max_elements);
                for i in 0..shown {
                    out.push('\n');
                    self.guarded(out, |out| self.binding_line(out, x, i, ctx.deeper().with_mode(Mode::Print)))?;
                }
                layout::omitted(out, count - shown);
                Ok(())
            }
            Mode::Inspect => {
                write!(out, " <{label}>")?;
                if !self.can_descend(ctx) {
                    out.push_str(" ...");
                    return Ok(());
                }
                let count = rt.binding_count(x);
                let shown = count.min(self.limits(ctx.mode).max_elements);
                for i in 0..shown {
                    self.inspect_line(out, ctx, "");
                    self.guarded(out, |out| self.binding_line(out, x, i, ctx.deeper()))?;
                }
                self.inspect_omitted(out, ctx, count - shown);
                let enclos = self.child(x, rt.enclosure(x), "ENCLOS")?;
                self.inspect_environment_ref(out, enclos, "ENCLOS:", ctx)
            }
        }
    }

    /// `name: value` for the `i`-th binding of `env`
    fn binding_line(&self, out: &mut String, env: Handle<'_>, i: usize, ctx: Ctx) -> Result {
        let binding = self.runtime.binding(env, i).ok_or(RenderError::NullChild("binding"))?;
        let symbol = self.child(env, binding.symbol, "binding symbol")?;
        write!(out, "{}: ", quote_symbol(&self.symbol_name(symbol)?))?;
        if binding.value.is_null() {
            out.push_str("<active binding>");
            return Ok(());
        }
        self.child_value(out, env, binding.value, "binding value", ctx)
    }

    pub(super) fn promise(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let rt = self.runtime;
        let limits = *self.limits(ctx.mode);
        match ctx.mode {
            Mode::Print => {
                out.push_str("<promise: ");
                let code = self.child(x, rt.promise_code(x), "PRCODE")?;
                self.deparse(out, code, Style::new(false, limits.max_elements))?;
                out.push('>');
                Ok(())
            }
            Mode::Display => match rt.promise_value(x) {
                Some(value) if self.can_descend(ctx) => {
                    self.child_value(out, x, value, "PRVALUE", ctx.deeper())
                }
                Some(_) => {
                    out.push_str("...");
                    Ok(())
                }
                None => {
                    out.push_str("<promise: ");
                    let code = self.child(x, rt.promise_code(x), "PRCODE")?;
                    self.deparse(out, code, Style::new(false, limits.max_elements))?;
                    out.push('>');
                    Ok(())
                }
            },
            Mode::Inspect => {
                self.inspect_field(out, x, rt.promise_code(x), "PRCODE:", ctx)?;
                match rt.promise_value(x) {
                    Some(value) => self.inspect_field(out, x, value, "PRVALUE:", ctx),
                    None => {
                        self.inspect_line(out, ctx, "PRVALUE: <unforced>");
                        let env = self.child(x, rt.promise_env(x), "PRENV")?;
                        if self.is_nil(env) {
                            return Ok(());
                        }
                        self.inspect_environment_ref(out, env, "PRENV:", ctx)
                    }
                }
            }
        }
    }

    pub(super) fn closure(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let rt = self.runtime;
        let limits = *self.limits(ctx.mode);
        match ctx.mode {
            Mode::Print => {
                let formals = self.child(x, rt.formals(x), "FORMALS")?;
                self.deparse_signature(out, formals, Style::new(false, limits.max_elements))
            }
            Mode::Display => {
                let formals = self.child(x, rt.formals(x), "FORMALS")?;
                let body = self.child(x, rt.body(x), "BODY")?;
                self.deparse_function(out, formals, body, Style::new(true, limits.max_elements))?;
                if self.classify(body)? == SexpType::Bytecode {
                    write!(out, "\n<bytecode: {:#x}>", body.address())?;
                }
                let env = self.child(x, rt.closure_env(x), "CLOENV")?;
                let label = self.environment_label(env);
                if label != "R_GlobalEnv" {
                    write!(out, "\n<environment: {label}>")?;
                }
                Ok(())
            }
            Mode::Inspect => {
                self.inspect_field(out, x, rt.formals(x), "FORMALS:", ctx)?;
                self.inspect_field(out, x, rt.body(x), "BODY:", ctx)?;
                let env = self.child(x, rt.closure_env(x), "CLOENV")?;
                self.inspect_environment_ref(out, env, "CLOENV:", ctx)
            }
        }
    }

    pub(super) fn object(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let summary = match self.first_class(x)? {
            Some(class) => format!("<S4 object of class \"{class}\">"),
            None => "<S4 object>".to_string(),
        };

        match ctx.mode {
            Mode::Print => out.push_str(&summary),
            Mode::Display => {
                out.push_str(&summary);
                if !self.has_attributes(x) {
                    return Ok(());
                }
                let attrib = self.child(x, self.runtime.attrib(x), "ATTRIB")?;
                let entries = self.cell_entries(attrib, self.limits(ctx.mode).max_elements)?;
                for entry in &entries.items {
                    let name = entry.name.as_deref().unwrap_or_default();
                    if name == "class" {
                        continue;
                    }
                    write!(out, "\nSlot \"{name}\":\n")?;
                    if !self.can_descend(ctx) {
                        out.push_str("...");
                        continue;
                    }
                    self.child_value(out, entry.parent, entry.ptr, entry.what, ctx.deeper())?;
                }
            }
            // Slots are attributes, listed under ATTRIB
            Mode::Inspect => {}
        }
        Ok(())
    }
}
