//! Test Utils
//!
//! Helpers shared by the integration tests: DOM shortcuts, fake loaders and
//! a dispatcher recording the events it receives.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use angular_render::compiler::{Compiler, DefaultStepFactory, TemplateLoader};
use angular_render::dom::parse_html;
use angular_render::events::EventDispatcher;
use angular_render::expression_parser::SourceExpressionParser;
use angular_render::pending::LocalFuture;
use angular_render::xhr::Xhr;
use angular_render::{Node, ProtoView, RenderError, Result, ShadowDomStrategy, SyncOrPending, Template};
use futures::channel::oneshot;
use futures::FutureExt;
use indexmap::IndexMap;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Routes library logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// First node of the parsed `html`.
pub fn el(html: &str) -> Node {
    parse_html(html)
        .expect("valid html")
        .first_child()
        .expect("html with a node")
}

/// Text of `node` with runs of whitespace collapsed.
pub fn normalized_text(node: &Node) -> String {
    node.text_content().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Loader answering synchronously: inline templates as given, urls from a
/// fixed table.
#[derive(Default)]
pub struct FakeTemplateLoader {
    urls: IndexMap<String, String>,
}

impl FakeTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: &str, html: &str) -> Self {
        self.urls.insert(url.to_string(), html.to_string());
        self
    }
}

impl TemplateLoader for FakeTemplateLoader {
    fn load(&self, template: &Template) -> Result<SyncOrPending<Node>> {
        if let Some(inline) = &template.inline {
            return Ok(SyncOrPending::Ready(Node::create_template(inline)?));
        }
        let url = template.abs_url.clone().unwrap_or_default();
        match self.urls.get(&url) {
            Some(html) => Ok(SyncOrPending::Ready(Node::create_template(html)?)),
            None => Err(RenderError::TemplateLoad {
                template_id: template.id.clone(),
                reason: format!("no template at {}", url),
            }),
        }
    }
}

/// Xhr whose responses stay pending until the test answers them.
#[derive(Default)]
pub struct PendingXhr {
    waiting: RefCell<Vec<(String, oneshot::Sender<Result<String>>)>>,
    requests: RefCell<Vec<String>>,
}

impl PendingXhr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn respond(&self, url: &str, content: &str) {
        self.answer(url, Ok(content.to_string()));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.answer(
            url,
            Err(RenderError::StyleLoad {
                url: url.to_string(),
                reason: reason.to_string(),
            }),
        );
    }

    fn answer(&self, url: &str, response: Result<String>) {
        let mut waiting = self.waiting.borrow_mut();
        let index = waiting
            .iter()
            .position(|(u, _)| u == url)
            .unwrap_or_else(|| panic!("no pending request for {}", url));
        let (_, sender) = waiting.remove(index);
        let _ = sender.send(response);
    }
}

impl Xhr for PendingXhr {
    fn get(&self, url: &str) -> LocalFuture<String> {
        let (sender, receiver) = oneshot::channel();
        self.requests.borrow_mut().push(url.to_string());
        self.waiting.borrow_mut().push((url.to_string(), sender));
        let url = url.to_string();
        async move {
            receiver.await.map_err(|_| RenderError::StyleLoad {
                url,
                reason: "request dropped".to_string(),
            })?
        }
        .boxed_local()
    }
}

pub fn compiler(strategy: Rc<dyn ShadowDomStrategy>, loader: FakeTemplateLoader) -> Compiler {
    let factory = DefaultStepFactory::new(Rc::new(SourceExpressionParser::new()), strategy);
    Compiler::new(Rc::new(loader), Rc::new(factory))
}

/// Compiles a template that has no asynchronous work.
pub fn compile_sync(compiler: &Compiler, template: &Template) -> Rc<ProtoView> {
    compiler
        .compile(template)
        .expect("template compiles")
        .ready()
        .expect("compile finished synchronously")
}

pub type LoggedEvent = (usize, String, IndexMap<String, Value>);

#[derive(Default)]
pub struct LoggingEventDispatcher {
    pub log: RefCell<Vec<LoggedEvent>>,
}

impl EventDispatcher for LoggingEventDispatcher {
    fn dispatch_event(&self, element_index: usize, event_name: &str, locals: &IndexMap<String, Value>) {
        self.log
            .borrow_mut()
            .push((element_index, event_name.to_string(), locals.clone()));
    }
}
