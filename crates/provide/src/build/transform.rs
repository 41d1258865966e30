use swc_core::common::GLOBALS;
use swc_core::ecma::visit::VisitMutWith;

use crate::ast::js_ast::JsAst;
use crate::compiler::Context;
use crate::module::ProvideUsage;
use crate::visitors::provide::Provide;

pub fn transform(ast: &mut JsAst, context: &Context) -> ProvideUsage {
    if context.provide.is_empty() {
        return ProvideUsage::default();
    }
    GLOBALS.set(&context.meta.script.globals, || {
        let mut provide = Provide::new(&context.provide, ast.unresolved_mark, ast.top_level_mark);
        ast.ast.visit_mut_with(&mut provide);
        provide.usage
    })
}
