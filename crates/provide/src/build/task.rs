use std::path::Path;

pub enum TaskType {
    Entry(String),
    Normal(String),
}

#[derive(Debug, Clone)]
pub struct Task {
    pub path: String,
    pub is_entry: bool,
    pub ext_name: Option<String>,
}

impl Task {
    pub fn new(task_type: TaskType) -> Self {
        let (path, is_entry) = match task_type {
            TaskType::Entry(path) => (path, true),
            TaskType::Normal(path) => (path, false),
        };
        let ext_name = Path::new(&path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_string());
        Self {
            path,
            is_entry,
            ext_name,
        }
    }

    pub fn is_match(&self, ext_names: &[&str]) -> bool {
        self.ext_name
            .as_deref()
            .is_some_and(|ext_name| ext_names.contains(&ext_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task() {
        let task = Task::new(TaskType::Entry("/a/index.mjs".to_string()));
        assert!(task.is_entry);
        assert!(task.is_match(&["js", "mjs"]));
        assert!(!Task::new(TaskType::Normal("/a/LICENSE".to_string())).is_match(&["js"]));
    }
}
