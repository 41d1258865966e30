pub mod logger;
#[cfg(test)]
pub(crate) mod test_helper;

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};
use regex::Regex;

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER_REGEXP: OnceLock<Regex> = OnceLock::new();

    IDENTIFIER_REGEXP.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap())
}

pub fn is_valid_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

pub fn create_thread_pool<T>() -> Result<(Arc<ThreadPool>, Sender<T>, Receiver<T>)> {
    let pool = Arc::new(
        ThreadPoolBuilder::new()
            .thread_name(|i| format!("provide build {}", i))
            .build()?,
    );
    let (rs, rr) = channel();
    Ok((pool, rs, rr))
}
