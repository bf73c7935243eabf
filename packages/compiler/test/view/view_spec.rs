//! View Tests
//!
//! View instantiation, pooling, view containers and event forwarding on
//! compiled templates.

#[path = "../utils/mod.rs"]
mod utils;

use std::rc::Rc;

use angular_render::events::DomEventManager;
use angular_render::shadow_dom::EmulatedUnscopedShadowDomStrategy;
use angular_render::{DirectiveMetadata, Node, ProtoView, RenderError, ShadowDomStrategy, Template, ViewFactory};
use serde_json::json;
use utils::{compile_sync, compiler, normalized_text, FakeTemplateLoader, LoggingEventDispatcher};

fn strategy() -> Rc<dyn ShadowDomStrategy> {
    Rc::new(EmulatedUnscopedShadowDomStrategy::new(Node::element("head")))
}

fn compile(html: &str, directives: Vec<DirectiveMetadata>) -> Rc<ProtoView> {
    let compiler = compiler(strategy(), FakeTemplateLoader::new());
    compile_sync(&compiler, &Template::inline("cmp", html).with_directives(directives))
}

fn view_factory(capacity: usize) -> (ViewFactory, Rc<DomEventManager>) {
    let events = Rc::new(DomEventManager::new());
    (ViewFactory::new(capacity, events.clone(), strategy()), events)
}

mod pooling {
    use super::*;

    // Scenario E
    #[test]
    fn should_hand_out_destroyed_views_again() {
        let (factory, _) = view_factory(2);
        let proto_view = compile("<div></div>", Vec::new());
        let first = factory.get_view(&proto_view).unwrap();
        factory.return_view(&first).unwrap();
        let again = factory.get_view(&proto_view).unwrap();
        assert!(again.ptr_eq(&first));

        let other = factory.get_view(&proto_view).unwrap();
        assert!(!other.ptr_eq(&first));
    }

    #[test]
    fn should_keep_at_most_the_capacity() {
        let (factory, _) = view_factory(2);
        let proto_view = compile("<div></div>", Vec::new());
        let views: Vec<_> = (0..3).map(|_| factory.get_view(&proto_view).unwrap()).collect();
        for view in &views {
            factory.return_view(view).unwrap();
        }
        assert_eq!(factory.pooled_view_count(&proto_view), 2);
    }

    #[test]
    fn should_not_pool_with_zero_capacity() {
        let (factory, _) = view_factory(0);
        let proto_view = compile("<div></div>", Vec::new());
        let view = factory.get_view(&proto_view).unwrap();
        factory.return_view(&view).unwrap();
        assert!(!factory.get_view(&proto_view).unwrap().ptr_eq(&view));
    }
}

mod containers {
    use super::*;

    fn host_and_item() -> (ViewFactory, Rc<ProtoView>, Rc<ProtoView>) {
        let (factory, _) = view_factory(1);
        let host = compile("<div><template [ng-if]=\"c\"><i>{{a}}</i></template><b></b></div>", Vec::new());
        let item = host.element_binders[0].nested_proto_view.clone().unwrap();
        (factory, host, item)
    }

    #[test]
    fn should_insert_views_after_the_anchor_in_order() {
        let (factory, host, item) = host_and_item();
        let host_view = factory.get_view(&host).unwrap();
        let container = host_view.get_view_container(0).unwrap();

        let first = factory.get_view(&item).unwrap();
        let second = factory.get_view(&item).unwrap();
        first.set_text(0, "1").unwrap();
        second.set_text(0, "2").unwrap();
        container.insert(&second, None).unwrap();
        container.insert(&first, Some(0)).unwrap();

        let div = host_view.root_nodes()[0].clone();
        assert_eq!(normalized_text(&div), "12");
        assert_eq!(div.children().last().unwrap().tag_name(), "b");
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn should_return_the_same_container_for_an_element() {
        let (factory, host, _) = host_and_item();
        let host_view = factory.get_view(&host).unwrap();
        let a = host_view.get_view_container(0).unwrap();
        let b = host_view.get_view_container(0).unwrap();
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn should_detach_views_without_destroying_them() {
        let (factory, host, item) = host_and_item();
        let host_view = factory.get_view(&host).unwrap();
        let container = host_view.get_view_container(0).unwrap();
        let view = factory.get_view(&item).unwrap();
        container.insert(&view, None).unwrap();

        let detached = container.detach(0).unwrap();
        assert!(detached.ptr_eq(&view));
        assert!(container.is_empty());
        assert!(view.root_nodes()[0].parent().is_none());
        container.insert(&view, None).unwrap();
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn should_reject_views_inserted_twice_or_out_of_range() {
        let (factory, host, item) = host_and_item();
        let host_view = factory.get_view(&host).unwrap();
        let container = host_view.get_view_container(0).unwrap();
        let view = factory.get_view(&item).unwrap();
        assert!(container.insert(&view, Some(1)).is_err());
        container.insert(&view, None).unwrap();
        assert!(container.insert(&view, None).is_err());
        assert!(container.detach(3).is_err());
    }

    #[test]
    fn destroying_an_inserted_view_should_remove_it_from_its_container() {
        let (factory, host, item) = host_and_item();
        let host_view = factory.get_view(&host).unwrap();
        let container = host_view.get_view_container(0).unwrap();
        let view = factory.get_view(&item).unwrap();
        container.insert(&view, None).unwrap();

        factory.return_view(&view).unwrap();
        assert!(container.is_empty());
        assert!(view.host_container().is_none());
    }
}

mod components {
    use super::*;

    #[test]
    fn should_instantiate_static_component_views() {
        let (factory, _) = view_factory(1);
        let parent = compile("<my-cmp></my-cmp>", vec![DirectiveMetadata::component("cmp", "my-cmp")]);
        let child = compile("<span>{{greeting}}</span>", Vec::new());
        let merged = Rc::new(parent.merge_child_component_proto_views(&[Some(child)]).unwrap());

        let view = factory.get_view(&merged).unwrap();
        let component_view = view.component_child_view(0).unwrap();
        component_view.set_text(0, "hello").unwrap();
        assert_eq!(view.bound_elements()[0].inner_html(), "<span class=\"ng-binding\">hello</span>");
        assert_eq!(view.component_child_views().len(), 1);
    }

    #[test]
    fn should_merge_component_proto_views_by_binder_index() {
        let parent = compile(
            "<div [title]=\"a\"></div><my-cmp></my-cmp>",
            vec![DirectiveMetadata::component("cmp", "my-cmp")],
        );
        let child = compile("<span>{{greeting}}</span>", Vec::new());
        assert_eq!(parent.element_binders.len(), 2);

        let merged = parent
            .merge_child_component_proto_views(&[None, Some(child.clone())])
            .unwrap();
        assert!(merged.element_binders[0].nested_proto_view.is_none());
        assert!(Rc::ptr_eq(
            merged.element_binders[1].nested_proto_view.as_ref().unwrap(),
            &child
        ));
        assert!(parent.element_binders[1].nested_proto_view.is_none());

        let err = parent.merge_child_component_proto_views(&[Some(child)]).unwrap_err();
        assert!(matches!(err, RenderError::NotAComponent { index: 0 }));
    }
}

mod events {
    use super::*;

    #[test]
    fn should_forward_element_events_with_their_locals() {
        let (factory, _) = view_factory(1);
        let proto_view = compile("<div><input (change)=\"update($event.target.value)\"></div>", Vec::new());
        let view = factory.get_view(&proto_view).unwrap();
        let dispatcher = Rc::new(LoggingEventDispatcher::default());
        view.set_event_dispatcher(Some(dispatcher.clone()));

        view.bound_elements()[0].dispatch_event("change", &json!({"target": {"value": "new"}}));
        let log = dispatcher.log.borrow();
        assert_eq!(log.len(), 1);
        let (index, name, locals) = &log[0];
        assert_eq!(*index, 0);
        assert_eq!(name, "change");
        assert_eq!(locals["$event"], json!({"target": {"value": "new"}}));
        assert_eq!(locals["$event.target.value"], json!("new"));
    }

    #[test]
    fn should_forward_global_events() {
        let (factory, events) = view_factory(1);
        let proto_view = compile("<div (window:resize)=\"onResize()\"></div>", Vec::new());
        let view = factory.get_view(&proto_view).unwrap();
        let dispatcher = Rc::new(LoggingEventDispatcher::default());
        view.set_event_dispatcher(Some(dispatcher.clone()));

        events.global_target("window").unwrap().dispatch_event("resize", &json!({}));
        assert_eq!(dispatcher.log.borrow()[0].1, "window:resize");
    }

    #[test]
    fn should_drop_events_without_a_dispatcher() {
        let (factory, _) = view_factory(1);
        let proto_view = compile("<button (click)=\"go()\"></button>", Vec::new());
        let view = factory.get_view(&proto_view).unwrap();
        view.bound_elements()[0].dispatch_event("click", &json!({}));
        assert!(!view.has_event_dispatcher());
    }
}
