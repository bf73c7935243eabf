//! Resource fetching for templates and stylesheets.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use futures::future;
use futures::FutureExt;
use url::Url;

use crate::error::RenderError;
use crate::pending::LocalFuture;

pub trait Xhr {
    fn get(&self, url: &str) -> LocalFuture<String>;
}

fn load_failed(url: &str, reason: impl Into<String>) -> RenderError {
    RenderError::StyleLoad {
        url: url.to_string(),
        reason: reason.into(),
    }
}

/// Serves responses registered up front. Unknown urls fail.
#[derive(Default)]
pub struct InMemoryXhr {
    responses: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl InMemoryXhr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: &str, content: &str) {
        self.responses.insert(url.to_string(), content.to_string());
    }

    /// Every url requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Xhr for InMemoryXhr {
    fn get(&self, url: &str) -> LocalFuture<String> {
        self.requests.borrow_mut().push(url.to_string());
        let response = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| load_failed(url, "not found"));
        future::ready(response).boxed_local()
    }
}

/// Reads `file:` urls and relative paths below a root directory.
pub struct FileXhr {
    root_dir: PathBuf,
}

impl FileXhr {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        FileXhr {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, url: &str) -> Result<PathBuf, RenderError> {
        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "file" => parsed
                .to_file_path()
                .map_err(|_| load_failed(url, "invalid file url")),
            Ok(parsed) => Err(load_failed(url, format!("unsupported scheme {}", parsed.scheme()))),
            Err(_) => Ok(self.root_dir.join(url.trim_start_matches('/'))),
        }
    }
}

impl Xhr for FileXhr {
    fn get(&self, url: &str) -> LocalFuture<String> {
        let content = self.path(url).and_then(|path| {
            std::fs::read_to_string(&path).map_err(|e| load_failed(url, e.to_string()))
        });
        future::ready(content).boxed_local()
    }
}
