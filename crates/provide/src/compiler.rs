use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use anyhow::{anyhow, Result};
use swc_core::common::sync::Lrc;
use swc_core::common::{Globals, SourceMap};
use tracing::{debug, info, warn};

use crate::config::{Config, ProvideMap};
use crate::features::provide::ShadowedProvideWarning;
use crate::generate::EmittedFile;
use crate::module::ProvideEdge;
use crate::module_graph::ModuleGraph;
use crate::resolve::{get_resolvers, Resolvers};
use crate::stats::Stats;

pub struct Context {
    pub module_graph: RwLock<ModuleGraph>,
    pub config: Config,
    pub provide: Arc<ProvideMap>,
    pub root: PathBuf,
    pub meta: Meta,
    pub resolvers: Resolvers,
    pub(crate) aborted: AtomicBool,
}

impl Context {
    /// Stops scheduling further modules after the first failure.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.aborted.store(false, Ordering::SeqCst);
        *self.module_graph.write().unwrap() = ModuleGraph::new();
    }
}

impl Default for Context {
    fn default() -> Self {
        let config: Config = Default::default();
        let resolvers = get_resolvers(&config);
        Self {
            module_graph: RwLock::new(ModuleGraph::new()),
            provide: Arc::new(config.provide_map()),
            config,
            root: PathBuf::from(""),
            meta: Meta::new(),
            resolvers,
            aborted: AtomicBool::new(false),
        }
    }
}

pub struct Meta {
    pub script: ScriptMeta,
}

impl Meta {
    pub fn new() -> Self {
        Self {
            script: ScriptMeta::new(),
        }
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ScriptMeta {
    pub cm: Lrc<SourceMap>,
    pub globals: Globals,
}

impl ScriptMeta {
    fn new() -> Self {
        Self {
            cm: Default::default(),
            globals: Globals::default(),
        }
    }
}

pub struct CompileOutput {
    pub files: Vec<EmittedFile>,
    pub stats: Stats,
    pub warnings: Vec<ShadowedProvideWarning>,
}

pub struct Compiler {
    pub context: Arc<Context>,
}

impl Compiler {
    pub fn new(config: Config, root: PathBuf) -> Result<Self> {
        if !root.is_absolute() {
            return Err(anyhow!("root path must be absolute: {}", root.display()));
        }
        // module ids come from the resolver with symlinks resolved
        let root = root.canonicalize().unwrap_or(root);
        let provide = config.provide_map();
        debug!("provide map: {:?}", provide);
        let resolvers = get_resolvers(&config);
        Ok(Self {
            context: Arc::new(Context {
                module_graph: RwLock::new(ModuleGraph::new()),
                provide: Arc::new(provide),
                config,
                root,
                meta: Meta::new(),
                resolvers,
                aborted: AtomicBool::new(false),
            }),
        })
    }

    pub fn compile(&self) -> Result<CompileOutput> {
        let t_compile = Instant::now();
        self.build()?;

        let warnings = self.check_provide_usage();
        for warning in &warnings {
            warn!("{}", warning);
        }

        let files = self.generate()?;
        let stats = self.create_stats(&warnings);
        if self.context.config.stats && !self.context.config.output.skip_write {
            self.write_stats(&stats)?;
        }

        info!(
            "{} files emitted in {}ms.",
            files.len(),
            t_compile.elapsed().as_millis()
        );
        Ok(CompileOutput {
            files,
            stats,
            warnings,
        })
    }

    pub fn provided_edges(&self) -> Vec<ProvideEdge> {
        self.context.module_graph.read().unwrap().provided_edges()
    }
}
