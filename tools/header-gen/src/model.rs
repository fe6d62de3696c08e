//! Intermediate representation for the generated header

use serde::{Deserialize, Serialize};

/// Everything the header declares, extracted from Rust source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderModel {
    /// Workspace-relative files the model was read from
    pub sources: Vec<String>,
    pub type_tags: Vec<TypeTag>,
    pub functions: Vec<ExportedFunction>,
}

/// One `SEXPTYPE` enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTag {
    pub name: String,
    pub value: u32,
    pub doc: String,
}

/// An unmangled `extern "C"` function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedFunction {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub doc_comment: String,
}

impl ExportedFunction {
    /// First paragraph of the doc comment, on one line
    pub fn summary(&self) -> String {
        self.doc_comment
            .lines()
            .take_while(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    pub rust_type: String,
    pub c_type: String,
}

impl Type {
    pub fn new(rust_type: &str) -> Self {
        Self {
            rust_type: rust_type.to_string(),
            c_type: map_rust_to_c(rust_type),
        }
    }
}

/// Map a Rust type as written in `ffi.rs` to its C spelling
pub fn map_rust_to_c(rust_type: &str) -> String {
    if let Some(inner) = rust_type.strip_prefix("*const ") {
        return format!("const {}*", map_rust_to_c(inner));
    } else if let Some(inner) = rust_type.strip_prefix("*mut ") {
        return format!("{}*", map_rust_to_c(inner));
    }

    match rust_type {
        "Sexp" => "SEXP".to_string(),
        "c_char" => "char".to_string(),
        "u8" => "uint8_t".to_string(),
        "u32" => "uint32_t".to_string(),
        "i32" => "int32_t".to_string(),
        "usize" => "size_t".to_string(),
        "f64" => "double".to_string(),
        "()" => "void".to_string(),
        _ => rust_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_to_c() {
        assert_eq!(map_rust_to_c("Sexp"), "SEXP");
        assert_eq!(map_rust_to_c("*const c_char"), "const char*");
        assert_eq!(map_rust_to_c("*mut u8"), "uint8_t*");
        assert_eq!(map_rust_to_c("()"), "void");
    }

    #[test]
    fn test_summary_stops_at_blank_line() {
        let func = ExportedFunction {
            name: "print".to_string(),
            params: vec![],
            return_type: Type::new("()"),
            doc_comment: "First line\ncontinued\n\n# Safety\n\nDetails".to_string(),
        };
        assert_eq!(func.summary(), "First line continued");
    }
}
