//! Shared test utilities: an in-memory value heap and a runtime over it

use std::cell::{Cell, RefCell};

use crate::config::ProbeConfig;
use crate::handle::{Handle, Sexp};
use crate::render::{self, Mode};
use crate::runtime::{Binding, Complex, Runtime};
use crate::types::sexptype::*;

// ============================================================================
// Test Heap
// ============================================================================

/// One value on the test heap
pub struct Node {
    tag: Cell<u32>,
    object: Cell<bool>,
    attrib: Cell<Sexp>,
    payload: Payload,
}

enum Payload {
    Empty,
    Symbol(Sexp),
    Cons {
        car: Cell<Sexp>,
        cdr: Cell<Sexp>,
        tag: Cell<Sexp>,
    },
    Closure {
        formals: Sexp,
        body: Sexp,
        env: Sexp,
    },
    Environment {
        name: Option<String>,
        bindings: RefCell<Vec<Binding>>,
        enclos: Sexp,
    },
    Promise {
        code: Sexp,
        value: Option<Sexp>,
        env: Sexp,
    },
    Primitive(String),
    Char(Option<Vec<u8>>),
    Logical(Vec<i32>),
    Integer(Vec<i32>),
    Real(Vec<f64>),
    Complex(Vec<Complex>),
    Raw(Vec<u8>),
    Strings(Vec<Sexp>),
    Vector(Vec<Sexp>),
    Bytecode(Sexp),
    ExternalPtr {
        addr: usize,
        tag: Sexp,
        prot: Sexp,
    },
    WeakRef {
        key: Sexp,
        value: Sexp,
    },
}

/// Owns every node it hands out; pointers stay valid while the heap lives
pub struct TestHeap {
    nodes: RefCell<Vec<Box<Node>>>,
    nil: Sexp,
}

impl TestHeap {
    pub fn new() -> Self {
        let mut heap = Self {
            nodes: RefCell::new(Vec::new()),
            nil: std::ptr::null_mut(),
        };
        heap.nil = heap.alloc(NILSXP, Payload::Empty);
        node(heap.nil).attrib.set(heap.nil);
        heap
    }

    fn alloc(&self, tag: u32, payload: Payload) -> Sexp {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Box::new(Node {
            tag: Cell::new(tag),
            object: Cell::new(false),
            attrib: Cell::new(self.nil),
            payload,
        }));
        let last = &nodes[nodes.len() - 1];
        &**last as *const Node as *mut Node as Sexp
    }

    pub fn nil(&self) -> Sexp {
        self.nil
    }

    /// A node with the given tag and no payload (any, GC markers, unknown)
    pub fn bare(&self, tag: u32) -> Sexp {
        self.alloc(tag, Payload::Empty)
    }

    // ------------------------------------------------------------------------
    // Scalars and vectors
    // ------------------------------------------------------------------------

    pub fn char(&self, text: &str) -> Sexp {
        self.alloc(CHARSXP, Payload::Char(Some(text.as_bytes().to_vec())))
    }

    pub fn char_bytes(&self, bytes: &[u8]) -> Sexp {
        self.alloc(CHARSXP, Payload::Char(Some(bytes.to_vec())))
    }

    pub fn na_char(&self) -> Sexp {
        self.alloc(CHARSXP, Payload::Char(None))
    }

    pub fn symbol(&self, name: &str) -> Sexp {
        let printname = self.char(name);
        self.alloc(SYMSXP, Payload::Symbol(printname))
    }

    /// The empty symbol used for missing arguments
    pub fn missing_arg(&self) -> Sexp {
        self.symbol("")
    }

    pub fn logical(&self, values: &[i32]) -> Sexp {
        self.alloc(LGLSXP, Payload::Logical(values.to_vec()))
    }

    pub fn integer(&self, values: &[i32]) -> Sexp {
        self.alloc(INTSXP, Payload::Integer(values.to_vec()))
    }

    pub fn real(&self, values: &[f64]) -> Sexp {
        self.alloc(REALSXP, Payload::Real(values.to_vec()))
    }

    pub fn complex(&self, values: &[(f64, f64)]) -> Sexp {
        let values = values.iter().map(|&(re, im)| Complex { re, im }).collect();
        self.alloc(CPLXSXP, Payload::Complex(values))
    }

    pub fn raw(&self, bytes: &[u8]) -> Sexp {
        self.alloc(RAWSXP, Payload::Raw(bytes.to_vec()))
    }

    pub fn strings(&self, values: &[&str]) -> Sexp {
        let elements = values.iter().map(|value| self.char(value)).collect();
        self.alloc(STRSXP, Payload::Strings(elements))
    }

    /// A string vector over arbitrary element pointers
    pub fn string_vector(&self, elements: &[Sexp]) -> Sexp {
        self.alloc(STRSXP, Payload::Strings(elements.to_vec()))
    }

    pub fn list(&self, elements: &[Sexp]) -> Sexp {
        self.alloc(VECSXP, Payload::Vector(elements.to_vec()))
    }

    pub fn expression(&self, elements: &[Sexp]) -> Sexp {
        self.alloc(EXPRSXP, Payload::Vector(elements.to_vec()))
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    pub fn set_attr(&self, x: Sexp, name: &str, value: Sexp) {
        let cell = self.cons_tagged(LISTSXP, Some(name), value, self.nil);
        let target = node(x);
        let head = target.attrib.get();
        if head == self.nil {
            target.attrib.set(cell);
            return;
        }
        let mut cur = head;
        loop {
            let Payload::Cons { cdr, .. } = &node(cur).payload else {
                panic!("attribute list is not a pairlist");
            };
            if cdr.get() == self.nil {
                cdr.set(cell);
                return;
            }
            cur = cdr.get();
        }
    }

    pub fn set_names(&self, x: Sexp, names: &[&str]) -> Sexp {
        let names = self.strings(names);
        self.set_attr(x, "names", names);
        x
    }

    /// Set the class attribute and the object bit
    pub fn set_class(&self, x: Sexp, class: &str) -> Sexp {
        let class = self.strings(&[class]);
        self.set_attr(x, "class", class);
        node(x).object.set(true);
        x
    }

    // ------------------------------------------------------------------------
    // Cons cells and language
    // ------------------------------------------------------------------------

    fn cons_tagged(&self, tag: u32, name: Option<&str>, car: Sexp, cdr: Sexp) -> Sexp {
        let tag_sym = match name {
            Some(name) => self.symbol(name),
            None => self.nil,
        };
        self.alloc(
            tag,
            Payload::Cons {
                car: Cell::new(car),
                cdr: Cell::new(cdr),
                tag: Cell::new(tag_sym),
            },
        )
    }

    fn chain(&self, first_tag: u32, items: &[(Option<&str>, Sexp)]) -> Sexp {
        let mut cdr = self.nil;
        for (i, (name, car)) in items.iter().enumerate().rev() {
            let tag = if i == 0 { first_tag } else { LISTSXP };
            cdr = self.cons_tagged(tag, *name, *car, cdr);
        }
        cdr
    }

    pub fn pairlist(&self, items: &[(Option<&str>, Sexp)]) -> Sexp {
        self.chain(LISTSXP, items)
    }

    pub fn dots(&self, items: &[(Option<&str>, Sexp)]) -> Sexp {
        self.chain(DOTSXP, items)
    }

    /// A call with tagged arguments
    pub fn lang(&self, fun: Sexp, args: &[(Option<&str>, Sexp)]) -> Sexp {
        let args = self.chain(LISTSXP, args);
        self.cons_tagged(LANGSXP, None, fun, args)
    }

    /// A call to a named function with positional arguments
    pub fn call(&self, fun: &str, args: &[Sexp]) -> Sexp {
        let fun = self.symbol(fun);
        let args: Vec<_> = args.iter().map(|&arg| (None, arg)).collect();
        self.lang(fun, &args)
    }

    pub fn set_cdr(&self, cell: Sexp, cdr: Sexp) {
        let Payload::Cons { cdr: slot, .. } = &node(cell).payload else {
            panic!("not a cons cell");
        };
        slot.set(cdr);
    }

    // ------------------------------------------------------------------------
    // Functions and environments
    // ------------------------------------------------------------------------

    /// Formal arguments; `None` defaults are missing
    pub fn formals(&self, args: &[(&str, Option<Sexp>)]) -> Sexp {
        let items: Vec<_> = args
            .iter()
            .map(|&(name, default)| (Some(name), default.unwrap_or_else(|| self.missing_arg())))
            .collect();
        self.pairlist(&items)
    }

    pub fn closure(&self, formals: Sexp, body: Sexp, env: Sexp) -> Sexp {
        self.alloc(CLOSXP, Payload::Closure { formals, body, env })
    }

    pub fn environment(&self, name: Option<&str>, enclos: Sexp) -> Sexp {
        self.alloc(
            ENVSXP,
            Payload::Environment {
                name: name.map(str::to_string),
                bindings: RefCell::new(Vec::new()),
                enclos,
            },
        )
    }

    pub fn define(&self, env: Sexp, name: &str, value: Sexp) {
        let symbol = self.symbol(name);
        let Payload::Environment { bindings, .. } = &node(env).payload else {
            panic!("not an environment");
        };
        bindings.borrow_mut().push(Binding { symbol, value });
    }

    pub fn define_active(&self, env: Sexp, name: &str) {
        self.define(env, name, std::ptr::null_mut());
    }

    pub fn promise(&self, code: Sexp, value: Option<Sexp>, env: Sexp) -> Sexp {
        self.alloc(PROMSXP, Payload::Promise { code, value, env })
    }

    pub fn special(&self, name: &str) -> Sexp {
        self.alloc(SPECIALSXP, Payload::Primitive(name.to_string()))
    }

    pub fn builtin(&self, name: &str) -> Sexp {
        self.alloc(BUILTINSXP, Payload::Primitive(name.to_string()))
    }

    pub fn bytecode(&self, expr: Sexp) -> Sexp {
        self.alloc(BCODESXP, Payload::Bytecode(expr))
    }

    pub fn external_ptr(&self, addr: usize, tag: Sexp, prot: Sexp) -> Sexp {
        self.alloc(EXTPTRSXP, Payload::ExternalPtr { addr, tag, prot })
    }

    pub fn weak_ref(&self, key: Sexp, value: Sexp) -> Sexp {
        self.alloc(WEAKREFSXP, Payload::WeakRef { key, value })
    }

    pub fn s4(&self, class: &str) -> Sexp {
        let x = self.alloc(OBJSXP, Payload::Empty);
        self.set_class(x, class)
    }
}

impl Default for TestHeap {
    fn default() -> Self {
        Self::new()
    }
}

fn node<'a>(x: Sexp) -> &'a Node {
    // SAFETY: test pointers come from a live `TestHeap`.
    unsafe { &*(x as *const Node) }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Runtime over `TestHeap` nodes
pub struct TestRuntime;

impl TestRuntime {
    fn node<'a>(x: Handle<'a>) -> &'a Node {
        node(x.as_ptr())
    }
}

macro_rules! payload {
    ($x:expr, $pattern:pat => $value:expr) => {
        match &TestRuntime::node($x).payload {
            $pattern => $value,
            _ => panic!("unexpected payload for tag {}", TestRuntime::node($x).tag.get()),
        }
    };
}

impl Runtime for TestRuntime {
    fn type_of(&self, x: Handle<'_>) -> u32 {
        Self::node(x).tag.get()
    }

    fn is_object(&self, x: Handle<'_>) -> bool {
        Self::node(x).object.get()
    }

    fn attrib(&self, x: Handle<'_>) -> Sexp {
        Self::node(x).attrib.get()
    }

    fn length(&self, x: Handle<'_>) -> usize {
        match &Self::node(x).payload {
            Payload::Char(bytes) => bytes.as_ref().map_or(0, Vec::len),
            Payload::Logical(v) | Payload::Integer(v) => v.len(),
            Payload::Real(v) => v.len(),
            Payload::Complex(v) => v.len(),
            Payload::Raw(v) => v.len(),
            Payload::Strings(v) | Payload::Vector(v) => v.len(),
            _ => 0,
        }
    }

    fn logical_elt(&self, x: Handle<'_>, i: usize) -> i32 {
        payload!(x, Payload::Logical(v) => v[i])
    }

    fn integer_elt(&self, x: Handle<'_>, i: usize) -> i32 {
        payload!(x, Payload::Integer(v) => v[i])
    }

    fn real_elt(&self, x: Handle<'_>, i: usize) -> f64 {
        payload!(x, Payload::Real(v) => v[i])
    }

    fn complex_elt(&self, x: Handle<'_>, i: usize) -> Complex {
        payload!(x, Payload::Complex(v) => v[i])
    }

    fn raw_elt(&self, x: Handle<'_>, i: usize) -> u8 {
        payload!(x, Payload::Raw(v) => v[i])
    }

    fn string_elt(&self, x: Handle<'_>, i: usize) -> Sexp {
        payload!(x, Payload::Strings(v) => v[i])
    }

    fn vector_elt(&self, x: Handle<'_>, i: usize) -> Sexp {
        payload!(x, Payload::Vector(v) => v[i])
    }

    fn char_bytes<'a>(&self, x: Handle<'a>) -> Option<&'a [u8]> {
        payload!(x, Payload::Char(bytes) => bytes.as_deref())
    }

    fn car(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Cons { car, .. } => car.get())
    }

    fn cdr(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Cons { cdr, .. } => cdr.get())
    }

    fn tag(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Cons { tag, .. } => tag.get())
    }

    fn printname(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Symbol(printname) => *printname)
    }

    fn formals(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Closure { formals, .. } => *formals)
    }

    fn body(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Closure { body, .. } => *body)
    }

    fn closure_env(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Closure { env, .. } => *env)
    }

    fn binding_count(&self, x: Handle<'_>) -> usize {
        payload!(x, Payload::Environment { bindings, .. } => bindings.borrow().len())
    }

    fn binding(&self, x: Handle<'_>, i: usize) -> Option<Binding> {
        payload!(x, Payload::Environment { bindings, .. } => bindings.borrow().get(i).copied())
    }

    fn enclosure(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Environment { enclos, .. } => *enclos)
    }

    fn environment_name(&self, x: Handle<'_>) -> Option<String> {
        payload!(x, Payload::Environment { name, .. } => name.clone())
    }

    fn promise_code(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Promise { code, .. } => *code)
    }

    fn promise_value(&self, x: Handle<'_>) -> Option<Sexp> {
        payload!(x, Payload::Promise { value, .. } => *value)
    }

    fn promise_env(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Promise { env, .. } => *env)
    }

    fn primitive_name(&self, x: Handle<'_>) -> Option<String> {
        payload!(x, Payload::Primitive(name) => Some(name.clone()))
    }

    fn bytecode_expr(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::Bytecode(expr) => *expr)
    }

    fn extptr_addr(&self, x: Handle<'_>) -> usize {
        payload!(x, Payload::ExternalPtr { addr, .. } => *addr)
    }

    fn extptr_tag(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::ExternalPtr { tag, .. } => *tag)
    }

    fn extptr_prot(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::ExternalPtr { prot, .. } => *prot)
    }

    fn weakref_key(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::WeakRef { key, .. } => *key)
    }

    fn weakref_value(&self, x: Handle<'_>) -> Sexp {
        payload!(x, Payload::WeakRef { value, .. } => *value)
    }
}

// ============================================================================
// Rendering shortcuts
// ============================================================================

pub fn render(x: Sexp, mode: Mode) -> String {
    render_with(&ProbeConfig::default(), x, mode)
}

pub fn render_with(config: &ProbeConfig, x: Sexp, mode: Mode) -> String {
    // SAFETY: test pointers come from a live `TestHeap` or are null.
    unsafe { render::render(&TestRuntime, config, x, mode) }
}

pub fn print(x: Sexp) -> String {
    render(x, Mode::Print)
}

pub fn inspect(x: Sexp) -> String {
    render(x, Mode::Inspect)
}

pub fn display(x: Sexp) -> String {
    render(x, Mode::Display)
}
