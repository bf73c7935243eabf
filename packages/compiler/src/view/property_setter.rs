//! DOM property setters
//!
//! Property names follow the binding prefixes of templates: `attr.name`,
//! `class.name`, `style.name[.unit]`; anything else is a DOM property.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::dom::Node;

#[derive(Clone)]
pub struct PropertySetter {
    property: String,
    apply: Rc<dyn Fn(&Node, &Value)>,
}

impl PropertySetter {
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn set(&self, element: &Node, value: &Value) {
        (self.apply)(element, value)
    }
}

impl fmt::Debug for PropertySetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertySetter({})", self.property)
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub fn setter_factory(property: &str) -> PropertySetter {
    let apply: Rc<dyn Fn(&Node, &Value)> = if let Some(attr) = property.strip_prefix("attr.") {
        let attr = attr.to_string();
        Rc::new(move |el, value| match stringify(value) {
            Some(v) => el.set_attribute(&attr, &v),
            None => el.remove_attribute(&attr),
        })
    } else if let Some(class) = property.strip_prefix("class.") {
        let class = class.to_string();
        Rc::new(move |el, value| {
            if is_truthy(value) {
                el.add_class(&class);
            } else {
                el.remove_class(&class);
            }
        })
    } else if let Some(style) = property.strip_prefix("style.") {
        let (name, unit) = match style.split_once('.') {
            Some((name, unit)) => (name.to_string(), unit.to_string()),
            None => (style.to_string(), String::new()),
        };
        Rc::new(move |el, value| match stringify(value) {
            Some(v) => el.set_style(&name, &format!("{}{}", v, unit)),
            None => el.remove_style(&name),
        })
    } else {
        let name = property.to_string();
        Rc::new(move |el, value| el.set_property(&name, value.clone()))
    };
    PropertySetter {
        property: property.to_string(),
        apply,
    }
}
