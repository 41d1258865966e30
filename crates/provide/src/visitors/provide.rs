use std::collections::HashSet;

use indexmap::IndexMap;
use swc_core::common::{Mark, SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    BindingIdent, Decl, Expr, Ident, ImportDecl, ImportDefaultSpecifier, ImportNamedSpecifier,
    ImportPhase, ImportSpecifier, ImportStarAsSpecifier, JSXElementName, JSXObject, Lit,
    MemberExpr, Module, ModuleDecl, ModuleItem, Pat, Prop, Stmt, VarDeclKind,
};
use swc_core::ecma::utils::{quote_str, ExprFactory};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::ast::utils::{is_esm, member_prop, module_export_name};
use crate::config::ProvideMap;
use crate::module::{ProvideUsage, ProvidedBinding};

/// Binds free references of provided identifiers by injecting one import
/// per identifier at the top of the module.
///
/// ES modules get an import declaration, other modules a `const` bound to
/// `require(...)`. A reference resolved to any local binding (declaration,
/// parameter, explicit import) is left alone and recorded as shadowed.
pub struct Provide<'a> {
    unresolved_mark: Mark,
    top_level_mark: Mark,
    providers: &'a ProvideMap,
    is_esm: bool,
    decls: IndexMap<String, ModuleItem>,
    pub usage: ProvideUsage,
}

impl<'a> Provide<'a> {
    pub fn new(providers: &'a ProvideMap, unresolved_mark: Mark, top_level_mark: Mark) -> Self {
        Self {
            unresolved_mark,
            top_level_mark,
            providers,
            is_esm: false,
            decls: Default::default(),
            usage: Default::default(),
        }
    }

    fn top_level_ctxt(&self) -> SyntaxContext {
        SyntaxContext::empty().apply_mark(self.top_level_mark)
    }

    fn check_reference(&mut self, ident: &Ident) {
        let Some(target) = self.providers.get(&ident.sym) else {
            return;
        };
        if ident.ctxt.outer() != self.unresolved_mark {
            self.usage.shadowed.insert(ident.sym.to_string());
            return;
        }
        if self.decls.contains_key(&*ident.sym) {
            return;
        }
        let binding = ProvidedBinding {
            identifier: ident.sym.to_string(),
            target: target.clone(),
            require: !self.is_esm,
        };
        let decl = self.injected_decl(&binding);
        self.decls.insert(binding.identifier.clone(), decl);
        self.usage.provided.push(binding);
    }

    fn injected_decl(&self, binding: &ProvidedBinding) -> ModuleItem {
        let local = Ident::new(
            binding.identifier.as_str().into(),
            DUMMY_SP,
            self.top_level_ctxt(),
        );
        let request = binding.target.request();
        if binding.require {
            // const process = require("process");
            // const Buffer = require("buffer").Buffer;
            let require = Ident::new(
                "require".into(),
                DUMMY_SP,
                SyntaxContext::empty().apply_mark(self.unresolved_mark),
            )
            .as_call(DUMMY_SP, vec![quote_str!(request).as_arg()]);
            let init = match binding.target.export() {
                None => require,
                Some(export) => Expr::Member(MemberExpr {
                    span: DUMMY_SP,
                    obj: Box::new(require),
                    prop: member_prop(export),
                }),
            };
            let decl = init.into_var_decl(
                VarDeclKind::Const,
                Pat::Ident(BindingIdent {
                    id: local,
                    type_ann: None,
                }),
            );
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(decl))))
        } else {
            // import * as utils from "./utils";
            // import Mod from "./esm";
            // import { foo as Foo } from "./foo";
            let specifier = match binding.target.export() {
                None => ImportSpecifier::Namespace(ImportStarAsSpecifier {
                    span: DUMMY_SP,
                    local,
                }),
                Some("default") => ImportSpecifier::Default(ImportDefaultSpecifier {
                    span: DUMMY_SP,
                    local,
                }),
                Some(export) => ImportSpecifier::Named(ImportNamedSpecifier {
                    span: DUMMY_SP,
                    imported: (export != binding.identifier).then(|| module_export_name(export)),
                    local,
                    is_type_only: false,
                }),
            };
            ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
                span: DUMMY_SP,
                specifiers: vec![specifier],
                src: Box::new(quote_str!(request)),
                type_only: false,
                with: None,
                phase: ImportPhase::Evaluation,
            }))
        }
    }
}

impl VisitMut for Provide<'_> {
    fn visit_mut_module(&mut self, module: &mut Module) {
        self.is_esm = is_esm(module);
        module.visit_mut_children_with(self);
        if self.decls.is_empty() {
            return;
        }
        let decls = std::mem::take(&mut self.decls);
        let names = decls.keys().cloned().collect::<HashSet<_>>();
        let prologue = module
            .body
            .iter()
            .take_while(|item| is_directive(item))
            .count();
        module.body.splice(prologue..prologue, decls.into_values());
        module.visit_mut_with(&mut ToTopLevelVars {
            unresolved_mark: self.unresolved_mark,
            top_level_ctxt: self.top_level_ctxt(),
            names,
        });
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if let Expr::Ident(ident) = expr {
            self.check_reference(ident);
        }
        expr.visit_mut_children_with(self);
    }

    // { Mod }
    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        if let Prop::Shorthand(ident) = prop {
            self.check_reference(ident);
        }
        prop.visit_mut_children_with(self);
    }

    // <Mod />, <Mod.Item />
    fn visit_mut_jsx_element_name(&mut self, name: &mut JSXElementName) {
        match name {
            JSXElementName::Ident(ident) if !is_intrinsic_element(ident) => {
                self.check_reference(ident);
            }
            JSXElementName::JSXMemberExpr(member) => {
                let mut obj = &member.obj;
                while let JSXObject::JSXMemberExpr(inner) = obj {
                    obj = &inner.obj;
                }
                if let JSXObject::Ident(ident) = obj {
                    self.check_reference(ident);
                }
            }
            _ => {}
        }
    }
}

// "use strict";
fn is_directive(item: &ModuleItem) -> bool {
    match item {
        ModuleItem::Stmt(Stmt::Expr(expr_stmt)) => {
            matches!(&*expr_stmt.expr, Expr::Lit(Lit::Str(_)))
        }
        _ => false,
    }
}

// lower case tags are host elements, not references
fn is_intrinsic_element(ident: &Ident) -> bool {
    ident.sym.starts_with(|c: char| c.is_ascii_lowercase())
}

// Re-binds the provided references to the injected top level declarations.
struct ToTopLevelVars {
    unresolved_mark: Mark,
    top_level_ctxt: SyntaxContext,
    names: HashSet<String>,
}

impl VisitMut for ToTopLevelVars {
    fn visit_mut_ident(&mut self, i: &mut Ident) {
        if i.ctxt.outer() == self.unresolved_mark && self.names.contains(&*i.sym) {
            i.ctxt = self.top_level_ctxt;
        }
    }
}
