use std::path::PathBuf;

use pathdiff::diff_paths;

use crate::compiler::Context;

#[derive(Debug, Clone)]
pub enum Content {
    Js(String),
    // json is emitted as a default export of its value
    Json(String),
}

#[derive(Debug, Clone)]
pub struct File {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub extname: String,
    pub content: Option<Content>,
    pub is_entry: bool,
}

impl File {
    pub fn new(path: String, context: &Context) -> Self {
        let path = PathBuf::from(path);
        let extname = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        let relative_path = diff_paths(&path, &context.root).unwrap_or(path.clone());
        File {
            path,
            relative_path,
            extname,
            content: None,
            is_entry: false,
        }
    }

    pub fn with_content(path: String, content: Content, context: &Context) -> Self {
        let mut file = File::new(path, context);
        file.content = Some(content);
        file
    }

    pub fn new_entry(path: String, context: &Context) -> Self {
        let mut file = File::new(path, context);
        file.is_entry = true;
        file
    }

    pub fn set_content(&mut self, content: Content) {
        self.content = Some(content);
    }

    pub fn is_jsx(&self) -> bool {
        self.extname == "jsx"
    }

    pub fn get_content_raw(&self) -> String {
        match &self.content {
            Some(Content::Js(content)) | Some(Content::Json(content)) => content.clone(),
            None => "".to_string(),
        }
    }

    /// Source text handed to the parser.
    pub fn get_js_source(&self) -> String {
        match &self.content {
            Some(Content::Js(content)) => content.clone(),
            Some(Content::Json(content)) => format!("export default {};", content.trim()),
            None => "".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn context() -> Context {
        Context {
            root: PathBuf::from("/project"),
            ..Default::default()
        }
    }

    #[test]
    fn test_new() {
        let file = File::new("/project/src/a.jsx".to_string(), &context());
        assert_eq!(file.relative_path, PathBuf::from("src/a.jsx"));
        assert_eq!(file.extname, "jsx");
        assert!(file.is_jsx());
        assert!(!file.is_entry);
    }

    #[test]
    fn test_json_source() {
        let file = File::with_content(
            "/project/data.json".to_string(),
            Content::Json("{\"a\": 1}\n".to_string()),
            &context(),
        );
        assert_eq!(file.get_js_source(), "export default {\"a\": 1};");
        assert_eq!(file.get_content_raw(), "{\"a\": 1}\n");
    }
}
