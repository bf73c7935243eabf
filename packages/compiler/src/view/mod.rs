//! Proto views, their builders and the runtime views created from them.

mod element_binder;
mod property_setter;
mod proto_view;
mod proto_view_builder;
#[allow(clippy::module_inception)]
mod view;
mod view_container;
mod view_factory;

pub use element_binder::{DirectiveBinder, ElementBinder, EventBinding};
pub use property_setter::{setter_factory, PropertySetter};
pub use proto_view::{ProtoView, NG_BINDING_CLASS};
pub use proto_view_builder::{
    DirectiveBuilder, ElementBinderBuilder, ElementBinderBuilderRef, ProtoViewBuilder, ProtoViewBuilderRef,
};
pub use view::View;
pub use view_container::{ViewContainer, WeakViewContainer};
pub use view_factory::ViewFactory;
