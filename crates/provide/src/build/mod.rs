pub mod load;
pub mod task;
pub mod transform;

use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use colored::Colorize;
use rayon::ThreadPool;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::ast::js_ast::JsAst;
use crate::build::load::load;
use crate::build::task::{Task, TaskType};
use crate::build::transform::transform;
use crate::compiler::{Compiler, Context};
use crate::module::{Dependency, Module, ModuleId, ModuleInfo, ResolveType};
use crate::resolve::{resolve, ModuleNotFoundError, ResolutionError, ResolverResource};
use crate::utils::create_thread_pool;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{:}\n{:}", "Build failed.".to_string().red().to_string(), errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    BuildTasksError { errors: Vec<anyhow::Error> },
}

impl BuildError {
    pub fn errors(&self) -> &[anyhow::Error] {
        match self {
            BuildError::BuildTasksError { errors } => errors,
        }
    }
}

pub type ModuleDeps = Vec<(ResolverResource, Dependency)>;

type BuildResult = Result<Option<(Module, ModuleDeps, Task)>>;

impl Compiler {
    pub fn build(&self) -> Result<()> {
        debug!("build");
        let t_build = Instant::now();
        self.context.reset();
        let tasks = self
            .context
            .config
            .entry
            .values()
            .map(|entry| Task::new(TaskType::Entry(entry.to_string_lossy().to_string())))
            .collect::<Vec<_>>();
        let module_ids = self.build_tasks(tasks)?;
        info!(
            "{} modules transformed in {}ms.",
            module_ids.len(),
            t_build.elapsed().as_millis()
        );
        Ok(())
    }

    pub fn build_tasks(&self, tasks: Vec<Task>) -> Result<HashSet<ModuleId>> {
        debug!("build tasks: {:?}", tasks);
        if tasks.is_empty() {
            return Ok(HashSet::new());
        }

        let (pool, rs, rr) = create_thread_pool::<BuildResult>()?;
        let mut module_ids = HashSet::new();
        {
            // entries are known upfront so a cycle back to one never schedules it twice
            let mut module_graph = self.context.module_graph.write().unwrap();
            for task in &tasks {
                let module_id = ModuleId::new(task.path.clone());
                module_ids.insert(module_id.clone());
                module_graph.add_module(Module::new(module_id, task.is_entry, None));
            }
        }
        let mut count = 0;
        for task in tasks {
            count += 1;
            Self::build_with_pool(pool.clone(), self.context.clone(), task, rs.clone());
        }

        let mut errors = vec![];
        for r in rr {
            count -= 1;
            match r {
                Ok(Some((module, deps, _task))) => {
                    let context = &self.context;
                    let module_id = module.id.clone();
                    let mut module_graph = context.module_graph.write().unwrap();
                    if let Some(m) = module_graph.get_module_mut(&module_id) {
                        m.add_info(module.info);
                    }

                    for (resource, dep) in deps {
                        let resolved_path = resource.get_resolved_path();
                        let dep_module_id = ModuleId::new(resolved_path.clone());
                        if !module_graph.has_module(&dep_module_id) {
                            if !context.is_aborted() {
                                count += 1;
                                Self::build_with_pool(
                                    pool.clone(),
                                    context.clone(),
                                    Task::new(TaskType::Normal(resolved_path)),
                                    rs.clone(),
                                );
                            }
                            // added right away, waiting for its build would schedule it again
                            module_ids.insert(dep_module_id.clone());
                            module_graph.add_module(Module::new(
                                dep_module_id.clone(),
                                false,
                                None,
                            ));
                        }
                        module_graph.add_dependency(&module_id, &dep_module_id, dep);
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    self.context.abort();
                    errors.push(err);
                }
            }

            if count == 0 {
                break;
            }
        }

        debug!("Build tasks done");
        drop(rs);

        if !errors.is_empty() {
            return Err(anyhow!(BuildError::BuildTasksError { errors }));
        }

        Ok(module_ids)
    }

    pub fn build_with_pool(
        pool: Arc<ThreadPool>,
        context: Arc<Context>,
        task: Task,
        rs: Sender<BuildResult>,
    ) {
        pool.spawn(move || {
            let result = Self::build_module(&context, task);
            if let Err(e) = rs.send(result) {
                error!("send build result failed: {}", e);
            }
        });
    }

    pub fn build_module(context: &Arc<Context>, task: Task) -> BuildResult {
        if context.is_aborted() {
            debug!("build aborted, skip: {}", task.path);
            return Ok(None);
        }

        // load
        let file = load(&task, context)?;

        // parse
        let mut ast = JsAst::new(&file, context.clone())?;

        // explicit deps first, injected imports are not theirs
        let mut deps = ast.analyze_deps();

        // transform
        let provide_usage = transform(&mut ast, context);
        let is_esm = ast.is_esm();
        for binding in &provide_usage.provided {
            deps.push(Dependency {
                source: binding.target.request().to_string(),
                resolve_type: ResolveType::Provided(binding.clone()),
                order: deps.len() + 1,
                span: None,
            });
        }

        // resolve
        let from = ModuleId::new(task.path.clone()).relative_path(&context.root);
        let mut resolved_deps: ModuleDeps = vec![];
        for dep in &deps {
            let resource = resolve(&task.path, dep, &context.resolvers);
            match (resource, dep.provided_binding()) {
                (Ok(resource @ ResolverResource::Resolved(_)), _) => {
                    resolved_deps.push((resource, dep.clone()));
                }
                // left as written, like a browser field `false` leaves it
                (Ok(ResolverResource::Ignored(_)), None) => {
                    debug!("dep ignored: {} in {}", dep.source, from);
                }
                (_, Some(binding)) => {
                    return Err(anyhow!(ResolutionError {
                        identifier: binding.identifier.clone(),
                        request: dep.source.clone(),
                        from,
                    }));
                }
                (Err(_), None) => {
                    return Err(anyhow!(ModuleNotFoundError {
                        request: dep.source.clone(),
                        from,
                    }));
                }
            }
        }

        let info = ModuleInfo {
            raw: file.get_content_raw(),
            path: task.path.clone(),
            ast,
            deps,
            provide_usage,
            is_esm,
        };
        let module = Module::new(
            ModuleId::new(task.path.clone()),
            task.is_entry,
            Some(info),
        );
        Ok(Some((module, resolved_deps, task)))
    }
}
