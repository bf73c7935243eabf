//! Compiler Tests
//!
//! Whole templates through the default steps: directive matching, binder
//! layout, asynchronous loads and style sub-tasks.

#[path = "../utils/mod.rs"]
mod utils;

use std::rc::Rc;

use angular_render::compiler::DefaultTemplateLoader;
use angular_render::shadow_dom::{EmulatedScopedShadowDomStrategy, NativeShadowDomStrategy};
use angular_render::style_inliner::StyleInliner;
use angular_render::{DirectiveMetadata, Node, RenderError, ShadowDomStrategy, Template};
use futures::executor::block_on;
use futures::FutureExt;
use utils::{compile_sync, compiler, init_tracing, FakeTemplateLoader, PendingXhr};

fn native() -> Rc<dyn ShadowDomStrategy> {
    Rc::new(NativeShadowDomStrategy::new())
}

fn compile(html: &str, directives: Vec<DirectiveMetadata>) -> Rc<angular_render::ProtoView> {
    let compiler = compiler(native(), FakeTemplateLoader::new());
    compile_sync(&compiler, &Template::inline("cmp", html).with_directives(directives))
}

mod directives {
    use super::*;

    #[test]
    fn should_bind_matching_directives_in_registration_order() {
        let pv = compile(
            "<div b a></div>",
            vec![
                DirectiveMetadata::new("dirA", "[a]"),
                DirectiveMetadata::new("other", "[c]"),
                DirectiveMetadata::new("dirB", "[b]"),
            ],
        );
        let indexes: Vec<usize> = pv.element_binders[0]
            .directives
            .iter()
            .map(|d| d.directive_index)
            .collect();
        assert_eq!(indexes, vec![0, 2]);
    }

    #[test]
    fn should_not_bind_elements_without_matches() {
        let pv = compile("<div></div>", vec![DirectiveMetadata::new("dir", "[a]")]);
        assert!(pv.element_binders.is_empty());
    }

    #[test]
    fn should_and_compile_children_of_all_matches() {
        let mut stop = DirectiveMetadata::new("stop", "[a]");
        stop.compile_children = false;
        let pv = compile(
            "<div a b><span [title]=\"x\"></span></div>",
            vec![stop, DirectiveMetadata::new("go", "[b]")],
        );
        assert_eq!(pv.element_binders.len(), 1);
        assert_eq!(pv.element_binders[0].directives.len(), 2);
    }

    // Scenario B
    #[test]
    fn should_record_the_directive_index_of_attribute_selectors() {
        let pv = compile(
            "<div foo></div>",
            vec![DirectiveMetadata::new("some", "[some]"), DirectiveMetadata::new("foo", "[foo]")],
        );
        let directives = &pv.element_binders[0].directives;
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].directive_index, 1);
    }

    #[test]
    fn should_bind_directive_properties_from_attribute_values() {
        let mut dir = DirectiveMetadata::new("dir", "[dir]");
        dir.bind.insert("dirProp".to_string(), "elProp | double".to_string());
        let pv = compile("<div dir el-prop=\"static\"></div>", vec![dir]);
        let binding = &pv.element_binders[0].directives[0].property_bindings["dirProp"];
        assert_eq!(binding.pipe_names(), vec!["double"]);
    }

    #[test]
    fn should_reject_two_components_on_one_element() {
        let compiler = compiler(native(), FakeTemplateLoader::new());
        let template = Template::inline("cmp", "<div a b></div>").with_directives(vec![
            DirectiveMetadata::component("compA", "[a]"),
            DirectiveMetadata::component("compB", "[b]"),
        ]);
        let err = compiler.compile(&template).map(|_| ()).unwrap_err();
        assert!(matches!(err, RenderError::Compile { .. }), "{}", err);
    }

    #[test]
    fn should_reject_unparsable_selectors() {
        let compiler = compiler(native(), FakeTemplateLoader::new());
        let template =
            Template::inline("cmp", "<div></div>").with_directives(vec![DirectiveMetadata::new("dir", "[a$]")]);
        let err = compiler.compile(&template).map(|_| ()).unwrap_err();
        assert!(matches!(err, RenderError::SelectorParse(_)));
    }

    #[test]
    fn should_reject_malformed_selectors_instead_of_matching_everything() {
        let compiler = compiler(native(), FakeTemplateLoader::new());
        for selector in ["[", ""] {
            let template = Template::inline("cmp", "<div></div><span></span>")
                .with_directives(vec![DirectiveMetadata::new("dir", selector)]);
            let err = compiler.compile(&template).map(|_| ()).unwrap_err();
            assert!(matches!(err, RenderError::SelectorParse(_)));
        }
    }

    #[test]
    fn should_bind_a_component_once_when_its_selector_list_matches_twice() {
        let pv = compile(
            "<my-cmp my-cmp></my-cmp>",
            vec![DirectiveMetadata::component("cmp", "my-cmp, [my-cmp]")],
        );
        assert_eq!(pv.element_binders[0].directives.len(), 1);
        assert_eq!(pv.element_binders[0].component_id.as_deref(), Some("cmp"));
    }
}

mod proto_views {
    use super::*;

    // Scenario A
    #[test]
    fn should_use_the_template_id_as_component_id() {
        let compiler = compiler(native(), FakeTemplateLoader::new());
        let pv = compile_sync(&compiler, &Template::inline("t1", "<div></div>"));
        assert_eq!(pv.component_id.as_deref(), Some("t1"));
        assert!(pv.element_binders.is_empty());
    }

    #[test]
    fn should_number_binders_depth_first_with_nearest_bound_parents() {
        let pv = compile(
            "<div [a]=\"x\"><p><span [b]=\"y\"></span></p></div><b [c]=\"z\"></b>",
            Vec::new(),
        );
        let binders = &pv.element_binders;
        assert_eq!(binders.len(), 3);
        for (i, binder) in binders.iter().enumerate() {
            assert_eq!(binder.index, i);
        }
        assert_eq!(binders[0].parent_index, None);
        assert_eq!(binders[1].parent_index, Some(0));
        assert_eq!(binders[1].distance_to_parent, 2);
        assert_eq!(binders[2].parent_index, None);
    }

    #[test]
    fn should_split_template_directives_into_nested_proto_views() {
        let pv = compile("<div *if=\"cond\"><span>{{a}}</span></div>", Vec::new());
        let anchor = &pv.element_binders[0];
        let nested = anchor.nested_proto_view.as_ref().expect("nested proto view");
        assert!(anchor.property_bindings.contains_key("if"));
        assert_eq!(nested.element_binders.len(), 1);
        assert_eq!(nested.element_binders[0].text_node_indices, vec![0]);
    }

    #[test]
    fn should_reject_two_template_directives() {
        let compiler = compiler(native(), FakeTemplateLoader::new());
        let template = Template::inline("cmp", "<div *if=\"a\" template=\"for: b\"></div>");
        assert!(matches!(compiler.compile(&template), Err(RenderError::Compile { .. })));
    }

    #[test]
    fn merge_should_not_mutate_the_receiver() {
        let child = compile("<span></span>", Vec::new());
        let other_child = compile("<b></b>", Vec::new());
        let parent = compile("<my-cmp></my-cmp>", vec![DirectiveMetadata::component("cmp", "my-cmp")]);
        let binder = &parent.element_binders[0];

        let first = binder.merge_child_component_proto_view(child.clone()).unwrap();
        let second = binder.merge_child_component_proto_view(other_child.clone()).unwrap();
        assert!(binder.nested_proto_view.is_none());
        assert!(Rc::ptr_eq(first.nested_proto_view.as_ref().unwrap(), &child));
        assert!(Rc::ptr_eq(second.nested_proto_view.as_ref().unwrap(), &other_child));
        assert_eq!(first.directives, binder.directives);
        assert_eq!(first.component_id, binder.component_id);
    }

    #[test]
    fn merge_should_fail_without_a_component() {
        let child = compile("<span></span>", Vec::new());
        let parent = compile("<div [a]=\"b\"></div>", Vec::new());
        let err = parent.element_binders[0]
            .merge_child_component_proto_view(child)
            .unwrap_err();
        assert!(matches!(err, RenderError::NotAComponent { index: 0 }));
    }
}

mod loading {
    use super::*;

    #[test]
    fn should_compile_templates_loaded_from_urls() {
        init_tracing();
        let xhr = Rc::new(PendingXhr::new());
        let loader = DefaultTemplateLoader::new(xhr.clone());
        let factory = angular_render::compiler::DefaultStepFactory::new(
            Rc::new(angular_render::expression_parser::SourceExpressionParser::new()),
            native(),
        );
        let compiler = angular_render::Compiler::new(Rc::new(loader), Rc::new(factory));

        let result = compiler
            .compile(&Template::from_url("cmp", "http://app/cmp.html"))
            .unwrap();
        assert!(result.is_pending());
        xhr.respond("http://app/cmp.html", "<b [title]=\"t\"></b>");
        let pv = block_on(result.into_future()).unwrap();
        assert_eq!(pv.element_binders.len(), 1);
    }

    #[test]
    fn should_report_missing_templates() {
        let compiler = compiler(native(), FakeTemplateLoader::new());
        let err = compiler
            .compile(&Template::from_url("cmp", "http://app/missing.html"))
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateLoad { ref template_id, .. } if template_id == "cmp"));
    }

    #[test]
    fn should_prefer_inline_content_over_urls() {
        let loader = FakeTemplateLoader::new().with_url("http://app/cmp.html", "<b></b>");
        let compiler = compiler(native(), loader);
        let mut template = Template::inline("cmp", "<i></i>");
        template.abs_url = Some("http://app/cmp.html".to_string());
        let pv = compile_sync(&compiler, &template);
        assert_eq!(pv.element.inner_html(), "<i></i>");
    }
}

mod sub_tasks {
    use super::*;

    fn scoped(xhr: Rc<PendingXhr>) -> Rc<dyn ShadowDomStrategy> {
        Rc::new(EmulatedScopedShadowDomStrategy::new(
            StyleInliner::new(xhr),
            Node::element("head"),
        ))
    }

    #[test]
    fn should_be_ready_without_sub_tasks() {
        let compiler = compiler(scoped(Rc::new(PendingXhr::new())), FakeTemplateLoader::new());
        let result = compiler
            .compile(&Template::inline("cmp", "<style>.a {}</style><div></div>"))
            .unwrap();
        assert!(!result.is_pending());
    }

    #[test]
    fn should_wait_for_every_sub_task() {
        let xhr = Rc::new(PendingXhr::new());
        let compiler = compiler(scoped(xhr.clone()), FakeTemplateLoader::new());
        let mut template = Template::inline(
            "cmp",
            "<style>@import 'a.css';</style><style>@import 'b.css';</style>",
        );
        template.abs_url = Some("http://app/cmp.html".to_string());

        let mut result = compiler.compile(&template).unwrap().into_future();
        assert!((&mut result).now_or_never().is_none());
        assert_eq!(xhr.requests(), vec!["http://app/a.css", "http://app/b.css"]);

        xhr.respond("http://app/a.css", ".a {}");
        assert!((&mut result).now_or_never().is_none());
        xhr.respond("http://app/b.css", ".b {}");
        let pv = block_on(result).unwrap();
        assert_eq!(pv.component_id.as_deref(), Some("cmp"));
    }

    #[test]
    fn should_reject_the_compile_when_an_import_fails() {
        let xhr = Rc::new(PendingXhr::new());
        let compiler = compiler(scoped(xhr.clone()), FakeTemplateLoader::new());
        let mut template = Template::inline("cmp", "<style>@import 'a.css';</style>");
        template.abs_url = Some("http://app/cmp.html".to_string());

        let mut result = compiler.compile(&template).unwrap().into_future();
        assert!((&mut result).now_or_never().is_none());
        xhr.fail("http://app/a.css", "offline");
        let err = block_on(result).unwrap_err();
        assert!(matches!(err, RenderError::StyleLoad { ref url, .. } if url == "http://app/a.css"));
    }
}
