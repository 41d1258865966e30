use swc_core::common::{Mark, Span};
use swc_core::ecma::ast::{CallExpr, ModuleDecl};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::ast::utils;
use crate::module::{Dependency, ResolveType};

/// Collects the explicit dependencies of a module in source order.
pub struct DepAnalyzer {
    pub dependencies: Vec<Dependency>,
    order: usize,
    unresolved_mark: Mark,
}

impl DepAnalyzer {
    pub fn new(unresolved_mark: Mark) -> Self {
        Self {
            dependencies: vec![],
            order: 1,
            unresolved_mark,
        }
    }

    fn add_dependency(&mut self, source: String, resolve_type: ResolveType, span: Option<Span>) {
        self.dependencies.push(Dependency {
            source,
            order: self.order,
            resolve_type,
            span,
        });
        self.order += 1;
    }
}

impl Visit for DepAnalyzer {
    fn visit_module_decl(&mut self, decl: &ModuleDecl) {
        match decl {
            // import { a } from './module';
            ModuleDecl::Import(import) => {
                if !import.type_only {
                    self.add_dependency(
                        import.src.value.to_string(),
                        ResolveType::Import,
                        Some(import.src.span),
                    );
                }
            }
            // export { a } from './module';
            ModuleDecl::ExportNamed(export) => {
                if let Some(src) = &export.src {
                    self.add_dependency(
                        src.value.to_string(),
                        ResolveType::ExportNamed,
                        Some(src.span),
                    );
                }
            }
            // export * from './module';
            ModuleDecl::ExportAll(export) => {
                self.add_dependency(
                    export.src.value.to_string(),
                    ResolveType::ExportAll,
                    Some(export.src.span),
                );
            }
            _ => {}
        }
        // export function a() { require('b') }
        decl.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, expr: &CallExpr) {
        if utils::is_commonjs_require(expr, &self.unresolved_mark) {
            if let Some(src) = utils::get_first_str_arg(expr) {
                self.add_dependency(src, ResolveType::Require, Some(expr.span));
                return;
            }
        } else if utils::is_dynamic_import(expr) {
            if let Some(src) = utils::get_first_str_arg(expr) {
                self.add_dependency(src, ResolveType::DynamicImport, Some(expr.span));
                return;
            }
        }
        expr.visit_children_with(self);
    }
}
