use std::collections::HashMap;

use swc_core::common::Mark;
use swc_core::ecma::ast::{CallExpr, Expr, Lit, ModuleDecl, Str};
use swc_core::ecma::utils::quote_str;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::ast::utils::{is_commonjs_require, is_dynamic_import};

/// Rewrites import sources (static, dynamic and `require`) to the emitted
/// path of the module they resolved to.
pub struct DepReplacer<'a> {
    // source -> replacement
    pub to_replace: &'a HashMap<String, String>,
    pub unresolved_mark: Mark,
}

impl DepReplacer<'_> {
    fn replace_source(&self, source: &mut Str) {
        if let Some(replacement) = self.to_replace.get(&*source.value) {
            let span = source.span;
            *source = quote_str!(span, replacement.as_str());
        }
    }
}

impl VisitMut for DepReplacer<'_> {
    fn visit_mut_module_decl(&mut self, decl: &mut ModuleDecl) {
        match decl {
            ModuleDecl::Import(import) => self.replace_source(&mut import.src),
            ModuleDecl::ExportNamed(export) => {
                if let Some(src) = &mut export.src {
                    self.replace_source(src);
                }
            }
            ModuleDecl::ExportAll(export) => self.replace_source(&mut export.src),
            _ => {}
        }
        decl.visit_mut_children_with(self);
    }

    fn visit_mut_call_expr(&mut self, call_expr: &mut CallExpr) {
        if is_commonjs_require(call_expr, &self.unresolved_mark) || is_dynamic_import(call_expr) {
            if let Some(arg) = call_expr.args.first_mut() {
                if let Expr::Lit(Lit::Str(source)) = &mut *arg.expr {
                    self.replace_source(source);
                }
            }
        }
        call_expr.visit_mut_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use swc_core::common::GLOBALS;
    use swc_core::ecma::visit::VisitMutWith;

    use super::DepReplacer;
    use crate::ast::tests::TestUtils;

    fn run(js_code: &str, to_replace: &[(&str, &str)]) -> String {
        let mut test_utils = TestUtils::gen_js_ast(js_code);
        let to_replace = to_replace
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        let ast = &mut test_utils.ast;
        GLOBALS.set(&test_utils.context.meta.script.globals, || {
            let mut visitor = DepReplacer {
                to_replace: &to_replace,
                unresolved_mark: ast.unresolved_mark,
            };
            ast.ast.visit_mut_with(&mut visitor);
        });
        test_utils.js_ast_to_code()
    }

    #[test]
    fn test_replace_esm_sources() {
        assert_eq!(
            run(
                r#"import a from "./a";
export * from "./b";
export { c } from "./c";"#,
                &[("./a", "./a.js"), ("./b", "./b/index.js"), ("./c", "../c.js")]
            ),
            r#"import a from "./a.js";
export * from "./b/index.js";
export { c } from "../c.js";"#
        );
    }

    #[test]
    fn test_replace_require_and_dynamic_import() {
        assert_eq!(
            run(
                r#"const a = require("./a");
import("./b");"#,
                &[("./a", "./a.js"), ("./b", "./b.js")]
            ),
            r#"const a = require("./a.js");
import("./b.js");"#
        );
    }

    #[test]
    fn test_keep_unknown_and_local_require() {
        assert_eq!(
            run(
                r#"function f(require) {
    return require("./a");
}
require("./b");"#,
                &[("./a", "./a.js")]
            ),
            r#"function f(require) {
    return require("./a");
}
require("./b");"#
        );
    }
}
