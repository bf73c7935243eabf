//! Directive Matching - CSS Selector Matching
//!
//! Parses directive selectors and matches them against the tag name, classes
//! and attributes of template elements.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

use crate::error::{RenderError, Result};

static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\:not\()|(([\.\#]?)[-\w]+|\*)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#).unwrap()
});

/// Match groups in the selector regex
#[derive(Debug, Clone, Copy)]
enum SelectorRegexp {
    Not = 1,
    Tag = 2,
    Prefix = 3,
    Attribute = 4,
    AttributeValueDouble = 5,
    AttributeValueSingle = 6,
    AttributeValueUnquoted = 7,
    NotEnd = 8,
    Separator = 9,
}

pub type AttrList = SmallVec<[(String, String); 4]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// `(name, lower cased value)` pairs; an empty value matches any value.
    pub attrs: AttrList,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated selector list.
    pub fn parse(selector: &str) -> Result<Vec<CssSelector>> {
        let mut results = Vec::new();
        let mut css_selector = CssSelector::new();
        let mut in_not = false;
        let mut last_end = 0;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if let Some(whole) = cap.get(0) {
                Self::check_gap(selector, last_end, whole.start())?;
                last_end = whole.end();
            }
            if cap.get(SelectorRegexp::Not as usize).is_some() {
                if in_not {
                    return Err(RenderError::SelectorParse(format!(
                        "Nesting :not is not allowed in a selector: {}",
                        selector
                    )));
                }
                in_not = true;
                css_selector.not_selectors.push(CssSelector::new());
            }

            let current = if in_not && !css_selector.not_selectors.is_empty() {
                let last = css_selector.not_selectors.len() - 1;
                &mut css_selector.not_selectors[last]
            } else {
                &mut css_selector
            };

            if let Some(tag_match) = cap.get(SelectorRegexp::Tag as usize) {
                let tag = tag_match.as_str();
                match cap.get(SelectorRegexp::Prefix as usize).map(|m| m.as_str()) {
                    Some("#") => current.add_attribute("id", &tag[1..]),
                    Some(".") => current.add_class_name(&tag[1..]),
                    _ => current.set_element(tag),
                }
            }

            if let Some(attr_match) = cap.get(SelectorRegexp::Attribute as usize) {
                let value = [
                    SelectorRegexp::AttributeValueDouble,
                    SelectorRegexp::AttributeValueSingle,
                    SelectorRegexp::AttributeValueUnquoted,
                ]
                .iter()
                .find_map(|group| cap.get(*group as usize))
                .map(|m| m.as_str())
                .unwrap_or("");
                current.add_attribute(&Self::unescape_attribute(attr_match.as_str())?, value);
            }

            if cap.get(SelectorRegexp::NotEnd as usize).is_some() {
                if !in_not {
                    return Err(RenderError::SelectorParse(format!("Unbalanced \")\" in selector: {}", selector)));
                }
                in_not = false;
            }

            if cap.get(SelectorRegexp::Separator as usize).is_some() {
                if in_not {
                    return Err(RenderError::SelectorParse(format!(
                        "Multiple selectors in :not are not supported: {}",
                        selector
                    )));
                }
                Self::add_result(selector, &mut results, std::mem::take(&mut css_selector))?;
            }
        }

        Self::check_gap(selector, last_end, selector.len())?;
        if in_not {
            return Err(RenderError::SelectorParse(format!("Unterminated :not in selector: {}", selector)));
        }
        Self::add_result(selector, &mut results, css_selector)?;
        Ok(results)
    }

    /// Text between two recognized selector parts may only be whitespace.
    fn check_gap(selector: &str, start: usize, end: usize) -> Result<()> {
        let gap = selector[start..end].trim();
        if gap.is_empty() {
            Ok(())
        } else {
            Err(RenderError::SelectorParse(format!(
                "Unexpected \"{}\" in selector: {}",
                gap, selector
            )))
        }
    }

    fn is_empty(&self) -> bool {
        self.element.is_none() && self.class_names.is_empty() && self.attrs.is_empty() && self.not_selectors.is_empty()
    }

    fn add_result(selector: &str, results: &mut Vec<CssSelector>, mut css_sel: CssSelector) -> Result<()> {
        if css_sel.is_empty() || css_sel.not_selectors.iter().any(CssSelector::is_empty) {
            return Err(RenderError::SelectorParse(format!("Empty selector in: \"{}\"", selector)));
        }
        if !css_sel.not_selectors.is_empty()
            && css_sel.element.is_none()
            && css_sel.class_names.is_empty()
            && css_sel.attrs.is_empty()
        {
            css_sel.element = Some("*".to_string());
        }
        results.push(css_sel);
        Ok(())
    }

    fn unescape_attribute(attr: &str) -> Result<String> {
        let mut result = String::new();
        let mut escaping = false;
        for ch in attr.chars() {
            if ch == '\\' {
                escaping = true;
                continue;
            }
            if ch == '$' && !escaping {
                return Err(RenderError::SelectorParse(format!(
                    "Error in attribute selector \"{}\". Unescaped \"$\" is not supported. Please escape with \"\\$\".",
                    attr
                )));
            }
            escaping = false;
            result.push(ch);
        }
        Ok(result)
    }

    pub fn set_element(&mut self, element: &str) {
        self.element = Some(element.to_lowercase());
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push((name.to_string(), value.to_lowercase()));
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `self`, describing a concrete element, satisfies `pattern`.
    pub fn satisfies(&self, pattern: &CssSelector) -> bool {
        if let (Some(tag), Some(pat_tag)) = (&self.element, &pattern.element) {
            if pat_tag != "*" && tag != pat_tag {
                return false;
            }
        } else if pattern.element.as_deref().is_some_and(|t| t != "*") {
            return false;
        }

        if !pattern
            .class_names
            .iter()
            .all(|c| self.class_names.contains(c))
        {
            return false;
        }

        let attrs_match = pattern.attrs.iter().all(|(pat_name, pat_value)| {
            self.attrs
                .iter()
                .any(|(name, value)| name == pat_name && (pat_value.is_empty() || value == pat_value))
        });
        if !attrs_match {
            return false;
        }

        !pattern
            .not_selectors
            .iter()
            .any(|not_selector| self.satisfies(not_selector))
    }
}

impl fmt::Display for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element.as_deref().unwrap_or(""))?;
        for class_name in &self.class_names {
            write!(f, ".{}", class_name)?;
        }
        for (name, value) in &self.attrs {
            let name = name.replace('$', "\\$");
            if value.is_empty() {
                write!(f, "[{}]", name)?;
            } else {
                write!(f, "[{}={}]", name, value)?;
            }
        }
        for not_selector in &self.not_selectors {
            write!(f, ":not({})", not_selector)?;
        }
        Ok(())
    }
}

struct SelectorContext<T> {
    selector: CssSelector,
    payload: T,
    /// Parts of one comma separated list share a list id.
    list_id: usize,
}

/// Registry of selectors, indexed by element name, class and attribute name.
pub struct SelectorMatcher<T> {
    selectables: Vec<SelectorContext<T>>,
    element_map: HashMap<String, Vec<usize>>,
    class_map: HashMap<String, Vec<usize>>,
    attr_map: HashMap<String, Vec<usize>>,
    /// Selectors without an element, class or attribute part (`*`, `:not(..)`).
    universal: Vec<usize>,
    list_count: usize,
}

impl<T> SelectorMatcher<T> {
    pub fn new() -> Self {
        SelectorMatcher {
            selectables: Vec::new(),
            element_map: HashMap::new(),
            class_map: HashMap::new(),
            attr_map: HashMap::new(),
            universal: Vec::new(),
            list_count: 0,
        }
    }

    /// Registers a single selector as its own list.
    pub fn add_selectable(&mut self, css_selector: CssSelector, payload: T) {
        let list_id = self.next_list_id();
        self.add_to_list(css_selector, payload, list_id);
    }

    /// Registers the parts of a comma separated list. A candidate satisfying
    /// several parts reports the payload once.
    pub fn add_selectables(&mut self, css_selectors: Vec<CssSelector>, payload: T)
    where
        T: Clone,
    {
        let list_id = self.next_list_id();
        for css_selector in css_selectors {
            self.add_to_list(css_selector, payload.clone(), list_id);
        }
    }

    fn next_list_id(&mut self) -> usize {
        self.list_count += 1;
        self.list_count - 1
    }

    fn add_to_list(&mut self, css_selector: CssSelector, payload: T, list_id: usize) {
        let id = self.selectables.len();
        match css_selector.element.as_deref() {
            Some(element) if element != "*" => self
                .element_map
                .entry(element.to_string())
                .or_default()
                .push(id),
            _ => {
                if css_selector.class_names.is_empty() && css_selector.attrs.is_empty() {
                    self.universal.push(id);
                }
            }
        }
        for class_name in &css_selector.class_names {
            self.class_map.entry(class_name.clone()).or_default().push(id);
        }
        for (name, _) in &css_selector.attrs {
            self.attr_map.entry(name.clone()).or_default().push(id);
        }
        self.selectables.push(SelectorContext {
            selector: css_selector,
            payload,
            list_id,
        });
    }

    /// Calls `callback` once for every registered selector list satisfied by
    /// `css_selector`, in registration order. Returns whether anything matched.
    pub fn match_selector<F>(&self, css_selector: &CssSelector, mut callback: F) -> bool
    where
        F: FnMut(&CssSelector, &T),
    {
        let mut candidates = BTreeSet::new();
        let mut add = |ids: Option<&Vec<usize>>| {
            for id in ids.into_iter().flatten() {
                candidates.insert(*id);
            }
        };
        if let Some(element) = &css_selector.element {
            add(self.element_map.get(element));
        }
        for class_name in &css_selector.class_names {
            add(self.class_map.get(class_name));
        }
        for (name, _) in &css_selector.attrs {
            add(self.attr_map.get(name));
        }
        add(Some(&self.universal));

        let mut matched_lists = HashSet::new();
        for id in &candidates {
            let context = &self.selectables[*id];
            if matched_lists.contains(&context.list_id) {
                continue;
            }
            if css_selector.satisfies(&context.selector) {
                matched_lists.insert(context.list_id);
                callback(&context.selector, &context.payload);
            }
        }
        !matched_lists.is_empty()
    }
}

impl<T> Default for SelectorMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}
