use swc_core::common::{Mark, DUMMY_SP};
use swc_core::ecma::ast::{
    CallExpr, Callee, ComputedPropName, Expr, Ident, IdentName, Import, Lit, MemberProp, Module,
    ModuleExportName, ModuleItem,
};
use swc_core::ecma::utils::quote_str;

use crate::utils::is_valid_identifier;

pub fn is_esm(module: &Module) -> bool {
    module
        .body
        .iter()
        .any(|item| matches!(item, ModuleItem::ModuleDecl(_)))
}

pub fn is_dynamic_import(call_expr: &CallExpr) -> bool {
    matches!(&call_expr.callee, Callee::Import(Import { .. }))
}

pub fn is_commonjs_require(call_expr: &CallExpr, unresolved_mark: &Mark) -> bool {
    get_call_expr_ident(call_expr)
        .map(|ident| is_ident_undefined(ident, "require", unresolved_mark))
        .unwrap_or(false)
}

pub fn get_call_expr_ident(call_expr: &CallExpr) -> Option<&Ident> {
    match &call_expr.callee {
        Callee::Expr(expr) => match &**expr {
            Expr::Ident(ident) => Some(ident),
            _ => None,
        },
        _ => None,
    }
}

pub fn is_ident_undefined(ident: &Ident, sym: &str, unresolved_mark: &Mark) -> bool {
    ident.sym == *sym && ident.ctxt.outer() == *unresolved_mark
}

pub fn get_first_str_arg(call_expr: &CallExpr) -> Option<String> {
    let arg = call_expr.args.first()?;
    match &*arg.expr {
        Expr::Lit(Lit::Str(str_)) => Some(str_.value.to_string()),
        _ => None,
    }
}

/// `.name`, or `["name"]` when the export is not an identifier.
pub fn member_prop(name: &str) -> MemberProp {
    if is_valid_identifier(name) {
        MemberProp::Ident(IdentName {
            span: DUMMY_SP,
            sym: name.into(),
        })
    } else {
        MemberProp::Computed(ComputedPropName {
            span: DUMMY_SP,
            expr: Box::new(Expr::Lit(Lit::Str(quote_str!(name)))),
        })
    }
}

pub fn module_export_name(name: &str) -> ModuleExportName {
    if is_valid_identifier(name) {
        ModuleExportName::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP))
    } else {
        ModuleExportName::Str(quote_str!(name))
    }
}

#[cfg(test)]
mod tests {
    use swc_core::common::GLOBALS;
    use swc_core::ecma::ast::{Expr, ModuleItem, Stmt};

    use super::*;
    use crate::ast::tests::TestUtils;

    fn first_call(test_utils: &TestUtils) -> CallExpr {
        match &test_utils.ast.ast.body[0] {
            ModuleItem::Stmt(Stmt::Expr(expr_stmt)) => match &*expr_stmt.expr {
                Expr::Call(call) => call.clone(),
                _ => panic!("not a call"),
            },
            _ => panic!("not an expression statement"),
        }
    }

    #[test]
    fn test_is_commonjs_require() {
        let test_utils = TestUtils::gen_js_ast("require('a');");
        let call = first_call(&test_utils);
        GLOBALS.set(&test_utils.context.meta.script.globals, || {
            assert!(is_commonjs_require(&call, &test_utils.ast.unresolved_mark));
        });
        assert_eq!(get_first_str_arg(&call), Some("a".to_string()));
    }

    #[test]
    fn test_shadowed_require_is_not_commonjs_require() {
        let test_utils = TestUtils::gen_js_ast("require('a');\nvar require = () => {};");
        let call = first_call(&test_utils);
        GLOBALS.set(&test_utils.context.meta.script.globals, || {
            assert!(!is_commonjs_require(&call, &test_utils.ast.unresolved_mark));
        });
    }

    #[test]
    fn test_is_dynamic_import() {
        let test_utils = TestUtils::gen_js_ast("import('a');");
        assert!(is_dynamic_import(&first_call(&test_utils)));
        assert!(!is_esm(&test_utils.ast.ast));
    }

    #[test]
    fn test_member_prop() {
        assert!(matches!(member_prop("default"), MemberProp::Ident(_)));
        assert!(matches!(member_prop("my-export"), MemberProp::Computed(_)));
        assert!(matches!(module_export_name("a b"), ModuleExportName::Str(_)));
    }
}
