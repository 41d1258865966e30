use std::path::PathBuf;

use oxc_resolver::Resolution;

#[derive(Debug, Clone)]
pub struct ResolvedResource(pub Resolution);

#[derive(Debug, Clone)]
pub enum ResolverResource {
    Resolved(ResolvedResource),
    // mapped to `false` through the browser field
    Ignored(PathBuf),
}

impl ResolverResource {
    pub fn get_resolved_path(&self) -> String {
        match self {
            ResolverResource::Resolved(ResolvedResource(resolution)) => {
                resolution.full_path().to_string_lossy().to_string()
            }
            ResolverResource::Ignored(path) => path.to_string_lossy().to_string(),
        }
    }
}
