use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use thiserror::Error;
use tracing::debug;

use crate::ast::file::{Content, File};
use crate::build::task::Task;
use crate::compiler::Context;

const JS_EXTENSIONS: [&str; 4] = ["js", "jsx", "mjs", "cjs"];
const JSON_EXTENSIONS: [&str; 1] = ["json"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path:?}")]
    FileNotFound { path: String },
    #[error("unsupported ext name: {ext_name:?} in {path:?}")]
    UnsupportedExtName { ext_name: String, path: String },
    #[error("invalid json {path:?}: {message}")]
    InvalidJson { path: String, message: String },
    #[error("read file failed {path:?}: {message}")]
    ReadFailed { path: String, message: String },
}

pub fn load(task: &Task, context: &Context) -> Result<File> {
    debug!("load: {}", task.path);
    let path = &task.path;
    if !Path::new(path).exists() {
        return Err(anyhow!(LoadError::FileNotFound { path: path.clone() }));
    }

    let content = if task.is_match(&JS_EXTENSIONS) {
        Content::Js(read_content(path)?)
    } else if task.is_match(&JSON_EXTENSIONS) {
        let content = read_content(path)?;
        serde_json::from_str::<serde_json::Value>(&content).map_err(|e| {
            anyhow!(LoadError::InvalidJson {
                path: path.clone(),
                message: e.to_string(),
            })
        })?;
        Content::Json(content)
    } else {
        return Err(anyhow!(LoadError::UnsupportedExtName {
            ext_name: task.ext_name.clone().unwrap_or_default(),
            path: path.clone(),
        }));
    };

    let mut file = if task.is_entry {
        File::new_entry(path.clone(), context)
    } else {
        File::new(path.clone(), context)
    };
    file.set_content(content);
    Ok(file)
}

fn read_content<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(path.as_ref()).map_err(|e| {
        anyhow!(LoadError::ReadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::file::Content;
    use crate::build::task::TaskType;

    fn load_fixture(name: &str) -> Result<File> {
        let root = std::env::current_dir().unwrap().join("test/build/load");
        let context = Context {
            root: root.clone(),
            ..Default::default()
        };
        let task = Task::new(TaskType::Normal(
            root.join(name).to_string_lossy().to_string(),
        ));
        load(&task, &context)
    }

    #[test]
    fn test_load_js() {
        let file = load_fixture("index.js").unwrap();
        assert!(matches!(file.content, Some(Content::Js(_))));
        assert_eq!(file.relative_path.to_string_lossy(), "index.js");
    }

    #[test]
    fn test_load_json() {
        let file = load_fixture("data.json").unwrap();
        assert!(matches!(file.content, Some(Content::Json(_))));
        assert!(file.get_js_source().starts_with("export default {"));
    }

    #[test]
    fn test_load_errors() {
        let err = load_fixture("missing.js").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::FileNotFound { .. })
        ));
        let err = load_fixture("invalid.json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::InvalidJson { .. })
        ));
        let err = load_fixture("style.css").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtName { .. })
        ));
    }
}
