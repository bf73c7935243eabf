//! Shadow CSS Test Utils

use angular_render::shadow_css::ShadowCss;
use regex::Regex;

pub fn shim(css: &str, content_attr: &str, host_attr: &str) -> String {
    ShadowCss::new().shim_css_text(css, content_attr, host_attr)
}

/// Collapses whitespace so that formatting differences do not matter.
pub fn extract_css_content(css: &str) -> String {
    let re1 = Regex::new(r"\s+").unwrap();
    let re2 = Regex::new(r":\s").unwrap();
    let re3 = Regex::new(r" }").unwrap();
    let re4 = Regex::new(r"\{\s+").unwrap();
    let re5 = Regex::new(r"\s+\}").unwrap();

    let mut result = re1.replace_all(css, " ").to_string();
    result = re2.replace_all(&result, ":").to_string();
    result = re3.replace_all(&result, "}").to_string();
    result = re4.replace_all(&result, "{").to_string();
    result = re5.replace_all(&result, "}").to_string();
    result.trim().to_string()
}

pub fn assert_equal_css(actual: &str, expected: &str) {
    let actual_css = extract_css_content(actual);
    let expected_css = extract_css_content(expected);
    assert_eq!(
        actual_css, expected_css,
        "Expected '{}' to equal '{}'",
        actual_css, expected_css
    );
}

pub fn assert_contains(actual: &str, expected: &str) {
    assert!(
        actual.contains(expected),
        "Expected '{}' to contain '{}'",
        actual,
        expected
    );
}

pub fn assert_not_contains(actual: &str, expected: &str) {
    assert!(
        !actual.contains(expected),
        "Expected '{}' to not contain '{}'",
        actual,
        expected
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_css_content() {
        let css = "  \n  one {\n  color: red;\n}  \n  ";
        assert_eq!(extract_css_content(css), "one {color:red;}");
    }
}
