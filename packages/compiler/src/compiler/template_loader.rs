//! Template Loader
//!
//! Turns a [`Template`] into a `<template>` element, either from its inline
//! html or by fetching its url. Fetched templates are cached per url and
//! every caller gets its own copy.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use tracing::debug;

use crate::api::Template;
use crate::dom::Node;
use crate::error::{RenderError, Result};
use crate::pending::SyncOrPending;
use crate::xhr::Xhr;

pub trait TemplateLoader {
    fn load(&self, template: &Template) -> Result<SyncOrPending<Node>>;
}

type SharedTemplate = Shared<LocalBoxFuture<'static, Result<Node>>>;

pub struct DefaultTemplateLoader {
    xhr: Rc<dyn Xhr>,
    html_cache: RefCell<HashMap<String, SharedTemplate>>,
}

impl DefaultTemplateLoader {
    pub fn new(xhr: Rc<dyn Xhr>) -> Self {
        DefaultTemplateLoader {
            xhr,
            html_cache: RefCell::new(HashMap::new()),
        }
    }

    fn fetch(&self, url: &str) -> SharedTemplate {
        let mut cache = self.html_cache.borrow_mut();
        if let Some(cached) = cache.get(url) {
            return cached.clone();
        }
        debug!(url, "fetching template");
        let request = self.xhr.get(url);
        let shared = async move { Node::create_template(&request.await?) }
            .boxed_local()
            .shared();
        cache.insert(url.to_string(), shared.clone());
        shared
    }
}

impl TemplateLoader for DefaultTemplateLoader {
    fn load(&self, template: &Template) -> Result<SyncOrPending<Node>> {
        if let Some(inline) = &template.inline {
            return Ok(SyncOrPending::Ready(Node::create_template(inline)?));
        }
        let Some(url) = &template.abs_url else {
            return Err(RenderError::TemplateLoad {
                template_id: template.id.clone(),
                reason: "the template should have either the url or inline property set".to_string(),
            });
        };
        let fetched = self.fetch(url);
        // the compiler mutates what it gets, so the cached element stays untouched
        Ok(SyncOrPending::Pending(
            fetched
                .map(|result| result.map(|element| element.deep_clone()))
                .boxed_local(),
        ))
    }
}
