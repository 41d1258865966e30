use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use swc_core::common::{FileName, Mark, Spanned, GLOBALS};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config as JsCodegenConfig, Emitter};
use swc_core::ecma::parser::error::Error as SwcParseError;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax};
use swc_core::ecma::transforms::base::resolver;
use swc_core::ecma::visit::{VisitMutWith, VisitWith};

use crate::ast::error::{GenerateError, ParseError};
use crate::ast::file::File;
use crate::ast::utils;
use crate::compiler::Context;
use crate::module::Dependency;
use crate::visitors::dep_analyzer::DepAnalyzer;

#[derive(Clone)]
pub struct JsAst {
    pub ast: Module,
    pub unresolved_mark: Mark,
    pub top_level_mark: Mark,
    pub path: String,
    context: Arc<Context>,
}

impl fmt::Debug for JsAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsAst({})", self.path)
    }
}

impl JsAst {
    /// Parses the file and runs the scope resolver, so every identifier
    /// carries either the unresolved mark or the context of its binding.
    pub fn new(file: &File, context: Arc<Context>) -> Result<Self> {
        let path = file.relative_path.to_string_lossy().to_string();
        let fm = context.meta.script.cm.new_source_file(
            FileName::Real(file.relative_path.to_path_buf()).into(),
            file.get_js_source(),
        );
        let syntax = Syntax::Es(EsSyntax {
            jsx: file.is_jsx(),
            ..Default::default()
        });
        let lexer = Lexer::new(syntax, EsVersion::EsNext, StringInput::from(&*fm), None);
        let mut parser = Parser::new_from(lexer);
        let ast = parser.parse_module();

        // handle ast errors
        let mut ast_errors = parser.take_errors();
        let ast = match ast {
            Ok(ast) => Some(ast),
            Err(err) => {
                ast_errors.push(err);
                None
            }
        };
        let mut ast = match ast {
            Some(ast) if ast_errors.is_empty() => ast,
            _ => {
                let messages = ast_errors
                    .iter()
                    .map(|err| format_parse_error(err, &path, &context))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(anyhow!(ParseError::JsParseError { messages }));
            }
        };

        // marks need to be persisted for the provide pass and dep analysis
        GLOBALS.set(&context.meta.script.globals, || {
            let top_level_mark = Mark::new();
            let unresolved_mark = Mark::new();
            ast.visit_mut_with(&mut resolver(unresolved_mark, top_level_mark, false));
            Ok(JsAst {
                ast,
                unresolved_mark,
                top_level_mark,
                path,
                context: context.clone(),
            })
        })
    }

    pub fn is_esm(&self) -> bool {
        utils::is_esm(&self.ast)
    }

    pub fn analyze_deps(&self) -> Vec<Dependency> {
        let mut visitor = DepAnalyzer::new(self.unresolved_mark);
        GLOBALS.set(&self.context.meta.script.globals, || {
            self.ast.visit_with(&mut visitor);
            visitor.dependencies
        })
    }

    pub fn generate(&self) -> Result<String> {
        let cm = self.context.meta.script.cm.clone();
        let mut buf = vec![];
        {
            let mut emitter = Emitter {
                cfg: JsCodegenConfig::default().with_target(EsVersion::EsNext),
                cm: cm.clone(),
                comments: None,
                wr: JsWriter::new(cm, "\n", &mut buf, None),
            };
            emitter.emit_module(&self.ast).map_err(|err| {
                anyhow!(GenerateError::JsGenerateError {
                    message: format!("{}: {}", self.path, err),
                })
            })?;
        }
        let code = String::from_utf8(buf)?;
        Ok(code)
    }
}

fn format_parse_error(err: &SwcParseError, path: &str, context: &Context) -> String {
    let loc = context.meta.script.cm.lookup_char_pos(err.span().lo);
    format!(
        "{} ({}:{}:{})",
        err.kind().msg(),
        path,
        loc.line,
        loc.col_display + 1
    )
}
