//! Shadow DOM Strategy Tests
//!
//! Style handling and view attachment of the three strategies, driven
//! through the compiler.

#[path = "../utils/mod.rs"]
mod utils;

use std::rc::Rc;

use angular_render::shadow_dom::{
    EmulatedScopedShadowDomStrategy, EmulatedUnscopedShadowDomStrategy, NativeShadowDomStrategy,
};
use angular_render::style_inliner::StyleInliner;
use angular_render::xhr::InMemoryXhr;
use angular_render::{Node, ShadowDomStrategy, Template, View};
use utils::{compile_sync, compiler, el, init_tracing, FakeTemplateLoader};

fn style_texts(style_host: &Node) -> Vec<String> {
    style_host
        .children()
        .iter()
        .filter(|node| node.is_element() && node.tag_name() == "style")
        .map(Node::text_content)
        .collect()
}

fn component_view(strategy: Rc<dyn ShadowDomStrategy>, id: &str, html: &str) -> View {
    let pv = compile_sync(&compiler(strategy, FakeTemplateLoader::new()), &Template::inline(id, html));
    let root = pv.element.template_aware_root();
    View::new(pv.clone(), root.children(), Vec::new(), Vec::new())
}

mod native {
    use super::*;

    #[test]
    fn should_keep_styles_in_the_template_with_resolved_urls() {
        let strategy = Rc::new(NativeShadowDomStrategy::new());
        let mut template = Template::inline("cmp", "<style>.a { background: url(a.png); }</style><div></div>");
        template.abs_url = Some("http://app/cmp/cmp.html".to_string());
        let pv = compile_sync(&compiler(strategy, FakeTemplateLoader::new()), &template);
        assert_eq!(
            pv.element.inner_html(),
            "<style>.a { background: url('http://app/cmp/a.png'); }</style><div></div>"
        );
    }

    #[test]
    fn should_attach_component_views_into_a_shadow_root() {
        let strategy: Rc<dyn ShadowDomStrategy> = Rc::new(NativeShadowDomStrategy::new());
        let host = el("<my-cmp>light</my-cmp>");
        strategy.attach_template(&host, &component_view(strategy.clone(), "cmp", "<b>shadow</b>"));
        assert_eq!(host.inner_html(), "light");
        assert_eq!(host.shadow_root().unwrap().inner_html(), "<b>shadow</b>");
    }
}

mod emulated_unscoped {
    use super::*;

    // Scenario C
    #[test]
    fn should_insert_identical_styles_once() {
        init_tracing();
        let style_host = Node::element("head");
        let strategy = Rc::new(EmulatedUnscopedShadowDomStrategy::new(style_host.clone()));
        let compiler = compiler(strategy, FakeTemplateLoader::new());
        let first = compile_sync(&compiler, &Template::inline("a", "<style>.x {}</style><div></div>"));
        compile_sync(&compiler, &Template::inline("b", "<style>.x {}</style><span></span>"));

        assert_eq!(style_texts(&style_host), vec![".x {}"]);
        assert_eq!(first.element.inner_html(), "<div></div>");
    }

    #[test]
    fn should_insert_styles_before_existing_content_in_order() {
        let style_host = el("<head><title>t</title></head>");
        let strategy = Rc::new(EmulatedUnscopedShadowDomStrategy::new(style_host.clone()));
        let compiler = compiler(strategy, FakeTemplateLoader::new());
        compile_sync(&compiler, &Template::inline("a", "<style>.a {}</style>"));
        compile_sync(&compiler, &Template::inline("b", "<style>.b {}</style>"));
        assert_eq!(
            style_host.inner_html(),
            "<style>.a {}</style><style>.b {}</style><title>t</title>"
        );
    }

    #[test]
    fn should_bind_content_tags_with_their_selector() {
        let strategy = Rc::new(EmulatedUnscopedShadowDomStrategy::new(Node::element("head")));
        let pv = compile_sync(
            &compiler(strategy, FakeTemplateLoader::new()),
            &Template::inline("cmp", "<div><content select=\".item\"></content></div>"),
        );
        assert_eq!(pv.element_binders[0].content_tag_selector.as_deref(), Some(".item"));
        assert!(!pv.element.inner_html().contains("<content"));
    }

    #[test]
    fn should_replace_the_light_dom_of_the_host() {
        let strategy: Rc<dyn ShadowDomStrategy> =
            Rc::new(EmulatedUnscopedShadowDomStrategy::new(Node::element("head")));
        let host = el("<my-cmp>light</my-cmp>");
        strategy.attach_template(&host, &component_view(strategy.clone(), "cmp", "<b>view</b>"));
        assert_eq!(host.inner_html(), "<b>view</b>");
        assert!(host.shadow_root().is_none());
    }

    #[test]
    fn reset_should_forget_shared_styles() {
        let style_host = Node::element("head");
        let strategy = Rc::new(EmulatedUnscopedShadowDomStrategy::new(style_host.clone()));
        let compiler = compiler(strategy.clone(), FakeTemplateLoader::new());
        compile_sync(&compiler, &Template::inline("a", "<style>.x {}</style>"));
        strategy.reset();
        compile_sync(&compiler, &Template::inline("a", "<style>.x {}</style>"));
        assert_eq!(style_texts(&style_host).len(), 2);
    }
}

mod emulated_scoped {
    use super::*;

    fn scoped(style_host: &Node) -> Rc<EmulatedScopedShadowDomStrategy> {
        Rc::new(EmulatedScopedShadowDomStrategy::new(
            StyleInliner::new(Rc::new(InMemoryXhr::new())),
            style_host.clone(),
        ))
    }

    // Scenario D
    #[test]
    fn should_scope_styles_per_component() {
        let style_host = Node::element("head");
        let compiler = compiler(scoped(&style_host), FakeTemplateLoader::new());
        let one = compile_sync(&compiler, &Template::inline("1", "<style>.foo {}</style><div></div>"));
        let two = compile_sync(&compiler, &Template::inline("2", "<style>.foo {}</style><div></div>"));
        compile_sync(&compiler, &Template::inline("1", "<style>.foo {}</style><div></div>"));

        let texts = style_texts(&style_host);
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], ".foo[_ngcontent-0] {\n\n}");
        assert_eq!(texts[1], ".foo[_ngcontent-1] {\n\n}");
        assert_eq!(texts[2], texts[0]);

        assert_eq!(one.element.inner_html(), "<div _ngcontent-0=\"\"></div>");
        assert_eq!(two.element.inner_html(), "<div _ngcontent-1=\"\"></div>");
    }

    #[test]
    fn should_shim_host_selectors() {
        let style_host = Node::element("head");
        let compiler = compiler(scoped(&style_host), FakeTemplateLoader::new());
        compile_sync(&compiler, &Template::inline("cmp", "<style>:host { display: block; }</style>"));
        assert_eq!(style_texts(&style_host), vec!["[_nghost-0] {\ndisplay: block;\n}"]);
    }

    #[test]
    fn should_mark_hosts_with_the_host_attribute() {
        let style_host = Node::element("head");
        let strategy = scoped(&style_host);
        let as_dyn: Rc<dyn ShadowDomStrategy> = strategy.clone();
        compile_sync(
            &compiler(as_dyn.clone(), FakeTemplateLoader::new()),
            &Template::inline("other", "<i></i>"),
        );
        let view = component_view(as_dyn.clone(), "cmp", "<b></b>");
        let host = el("<my-cmp></my-cmp>");
        as_dyn.attach_template(&host, &view);
        assert!(host.has_attribute("_nghost-1"));
        assert_eq!(host.inner_html(), "<b _ngcontent-1=\"\"></b>");
    }
}
