use angular_render::directive_matching::{CssSelector, SelectorMatcher};

#[cfg(test)]
mod tests {
    use super::*;

    // Selector describing a concrete element
    fn get_selector_for(tag: Option<&str>, attrs: Vec<(&str, &str)>, classes: Option<&str>) -> CssSelector {
        let mut selector = CssSelector::new();
        if let Some(t) = tag {
            selector.set_element(t);
        }
        for (name, value) in attrs {
            selector.add_attribute(name, value);
        }
        if let Some(c) = classes {
            for c_name in c.split_whitespace() {
                selector.add_class_name(c_name);
            }
        }
        selector
    }

    fn matcher_for(selectors: &[&str]) -> SelectorMatcher<usize> {
        let mut matcher = SelectorMatcher::new();
        for (index, selector) in selectors.iter().enumerate() {
            matcher.add_selectables(CssSelector::parse(selector).unwrap(), index);
        }
        matcher
    }

    fn matches(matcher: &SelectorMatcher<usize>, element: &CssSelector) -> Vec<usize> {
        let mut matched = Vec::new();
        matcher.match_selector(element, |_, payload| matched.push(*payload));
        matched
    }

    #[test]
    fn should_select_by_element_name_case_insensitive() {
        let matcher = matcher_for(&["someTag"]);
        assert!(matches(&matcher, &get_selector_for(Some("SOMEOTHERTAG"), vec![], None)).is_empty());
        assert_eq!(matches(&matcher, &get_selector_for(Some("SOMETAG"), vec![], None)), vec![0]);
    }

    #[test]
    fn should_select_by_class_name_case_insensitive() {
        let matcher = matcher_for(&[".someClass", ".someClass.class2"]);
        assert!(matches(&matcher, &get_selector_for(None, vec![], Some("SOMEOTHERCLASS"))).is_empty());
        assert_eq!(
            matches(&matcher, &get_selector_for(None, vec![], Some("SOMECLASS"))),
            vec![0]
        );
        assert_eq!(
            matches(&matcher, &get_selector_for(None, vec![], Some("someClass class2"))),
            vec![0, 1]
        );
    }

    #[test]
    fn should_select_by_attribute_name_case_sensitive_and_value_case_insensitive() {
        let matcher = matcher_for(&["[someAttr]", "[someAttr][someAttr2]", "[someAttr=someValue]"]);
        assert!(matches(&matcher, &get_selector_for(None, vec![("SOMEATTR", "")], None)).is_empty());
        assert_eq!(
            matches(&matcher, &get_selector_for(None, vec![("someAttr", "")], None)),
            vec![0]
        );
        assert_eq!(
            matches(
                &matcher,
                &get_selector_for(None, vec![("someAttr", "SOMEVALUE"), ("someAttr2", "")], None)
            ),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn should_select_by_element_name_class_and_attribute_together() {
        let matcher = matcher_for(&["someTag.someClass[someAttr=someValue]"]);
        assert!(matches(
            &matcher,
            &get_selector_for(Some("someTag"), vec![("someAttr", "someValue")], None)
        )
        .is_empty());
        assert_eq!(
            matches(
                &matcher,
                &get_selector_for(Some("someTag"), vec![("someAttr", "someValue")], Some("someClass"))
            ),
            vec![0]
        );
    }

    #[test]
    fn should_report_matches_in_registration_order() {
        let matcher = matcher_for(&["[b]", "div", ".c", "[a]"]);
        let element = get_selector_for(Some("div"), vec![("a", ""), ("b", "")], Some("c"));
        assert_eq!(matches(&matcher, &element), vec![0, 1, 2, 3]);
    }

    #[test]
    fn should_select_with_comma_separated_lists() {
        let matcher = matcher_for(&["input[type=text], textarea"]);
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("textarea"), vec![], None)),
            vec![0]
        );
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("input"), vec![("type", "text")], None)),
            vec![0]
        );
        assert!(matches(&matcher, &get_selector_for(Some("input"), vec![("type", "radio")], None)).is_empty());
    }

    #[test]
    fn should_report_a_list_once_when_several_parts_match() {
        let matcher = matcher_for(&["div, [foo]", "[foo]"]);
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("div"), vec![("foo", "")], None)),
            vec![0, 1]
        );
    }

    #[test]
    fn should_exclude_not_selectors() {
        let matcher = matcher_for(&["p:not(.hidden)", ":not([disabled])"]);
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("p"), vec![], Some("shown"))),
            vec![0, 1]
        );
        assert_eq!(
            matches(&matcher, &get_selector_for(Some("p"), vec![("disabled", "")], Some("hidden"))),
            Vec::<usize>::new()
        );
    }

    #[test]
    fn should_return_whether_anything_matched() {
        let matcher = matcher_for(&["div"]);
        assert!(matcher.match_selector(&get_selector_for(Some("div"), vec![], None), |_, _| {}));
        assert!(!matcher.match_selector(&get_selector_for(Some("span"), vec![], None), |_, _| {}));
    }

    mod parse {
        use super::*;

        #[test]
        fn should_parse_ids_as_attributes() {
            let selectors = CssSelector::parse("#main").unwrap();
            assert_eq!(selectors[0].get_attr("id"), Some("main"));
        }

        #[test]
        fn should_parse_quoted_attribute_values() {
            let selectors = CssSelector::parse(r#"[a="x y"][b='z']"#).unwrap();
            assert_eq!(selectors[0].get_attr("a"), Some("x y"));
            assert_eq!(selectors[0].get_attr("b"), Some("z"));
        }

        #[test]
        fn should_default_not_only_selectors_to_any_element() {
            let selectors = CssSelector::parse(":not(.a)").unwrap();
            assert_eq!(selectors[0].element.as_deref(), Some("*"));
            assert_eq!(selectors[0].to_string(), "*:not(.a)");
        }

        #[test]
        fn should_accept_escaped_dollar_signs() {
            let selectors = CssSelector::parse(r"[a\$]").unwrap();
            assert_eq!(selectors[0].get_attr("a$"), Some(""));
            assert_eq!(selectors[0].to_string(), r"[a\$]");
        }

        #[test]
        fn should_reject_unescaped_dollar_signs() {
            assert!(CssSelector::parse("[a$]").is_err());
        }

        #[test]
        fn should_reject_nested_not_selectors() {
            let err = CssSelector::parse("div:not(:not(p))").unwrap_err();
            assert!(err.to_string().contains("Nesting :not"));
        }

        #[test]
        fn should_reject_malformed_selectors() {
            for selector in ["[", "", " ", "a,", "div:hover", "[a=b"] {
                assert!(CssSelector::parse(selector).is_err(), "{:?} should not parse", selector);
            }
        }

        #[test]
        fn should_reject_lists_inside_not() {
            assert!(CssSelector::parse("div:not(a, b)").is_err());
        }
    }
}
