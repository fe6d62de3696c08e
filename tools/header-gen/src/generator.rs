//! C header generator

use anyhow::Result;
use std::fmt::Write as FmtWrite;

use crate::model::HeaderModel;

const GUARD: &str = "SEXP_PROBE_DEBUG_H";

fn section(output: &mut String, title: &str) -> std::fmt::Result {
    writeln!(output, "// =============================================================================")?;
    writeln!(output, "// {title}")?;
    writeln!(output, "// =============================================================================")?;
    writeln!(output)
}

/// Generate `debug.h` from the model
pub fn generate_c_header(model: &HeaderModel) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "// GENERATED FILE - DO NOT EDIT")?;
    writeln!(output, "// Source: {}", model.sources.join(", "))?;
    writeln!(output, "// Generator: tools/header-gen")?;
    writeln!(output)?;

    writeln!(output, "#ifndef {GUARD}")?;
    writeln!(output, "#define {GUARD}")?;
    writeln!(output)?;

    writeln!(output, "#ifdef __cplusplus")?;
    writeln!(output, "extern \"C\" {{")?;
    writeln!(output, "#endif")?;
    writeln!(output)?;

    section(&mut output, "Value type tags")?;
    writeln!(output, "typedef enum {{")?;
    for tag in &model.type_tags {
        write!(output, "    {} = {},", tag.name, tag.value)?;
        if !tag.doc.is_empty() {
            write!(output, " /* {} */", tag.doc.replace('\n', " "))?;
        }
        writeln!(output)?;
    }
    writeln!(output, "}} SEXPTYPE;")?;
    writeln!(output)?;
    writeln!(output, "/** Opaque interpreter value */")?;
    writeln!(output, "typedef struct SEXPREC *SEXP;")?;
    writeln!(output)?;

    section(&mut output, "Debugger entry points")?;
    for func in &model.functions {
        let summary = func.summary();
        if !summary.is_empty() {
            writeln!(output, "/** {summary} */")?;
        }

        write!(output, "{} {}(", func.return_type.c_type, func.name)?;
        if func.params.is_empty() {
            write!(output, "void")?;
        } else {
            for (i, param) in func.params.iter().enumerate() {
                if i > 0 {
                    write!(output, ", ")?;
                }
                write!(output, "{} {}", param.ty.c_type, param.name)?;
            }
        }
        writeln!(output, ");")?;
        writeln!(output)?;
    }

    writeln!(output, "#ifdef __cplusplus")?;
    writeln!(output, "}}")?;
    writeln!(output, "#endif")?;
    writeln!(output)?;

    writeln!(output, "#endif /* {GUARD} */")?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExportedFunction, Parameter, Type, TypeTag};

    fn sample_model() -> HeaderModel {
        HeaderModel {
            sources: vec!["core/src/types.rs".to_string(), "core/src/ffi.rs".to_string()],
            type_tags: vec![
                TypeTag {
                    name: "NILSXP".to_string(),
                    value: 0,
                    doc: "nil = NULL".to_string(),
                },
                TypeTag {
                    name: "FUNSXP".to_string(),
                    value: 99,
                    doc: String::new(),
                },
            ],
            functions: vec![ExportedFunction {
                name: "print".to_string(),
                params: vec![Parameter {
                    name: "x".to_string(),
                    ty: Type::new("Sexp"),
                }],
                return_type: Type::new("*const c_char"),
                doc_comment: "Concise text\n\n# Safety".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_header() {
        let header = generate_c_header(&sample_model()).unwrap();

        assert!(header.starts_with("// GENERATED FILE - DO NOT EDIT\n"));
        assert!(header.contains("// Source: core/src/types.rs, core/src/ffi.rs\n"));
        assert!(header.contains("#ifndef SEXP_PROBE_DEBUG_H"));
        assert!(header.contains("    NILSXP = 0, /* nil = NULL */\n"));
        assert!(header.contains("    FUNSXP = 99,\n"));
        assert!(header.contains("} SEXPTYPE;"));
        assert!(header.contains("typedef struct SEXPREC *SEXP;"));
        assert!(header.contains("/** Concise text */\nconst char* print(SEXP x);"));
        assert!(header.ends_with("#endif /* SEXP_PROBE_DEBUG_H */\n"));
    }

    #[test]
    fn test_generation_is_stable() {
        let model = sample_model();
        assert_eq!(
            generate_c_header(&model).unwrap(),
            generate_c_header(&model).unwrap()
        );
    }
}
