//! Shadow CSS Tests

mod utils;
use utils::{assert_contains, assert_equal_css, assert_not_contains, shim};

#[test]
fn should_handle_empty_string() {
    assert_eq!(shim("", "contenta", "a-host"), "");
}

#[test]
fn should_add_an_attribute_to_every_rule() {
    let css = "one {color: red;}two {color: red;}";
    let expected = "one[contenta] {color:red;} two[contenta] {color:red;}";
    assert_equal_css(&shim(css, "contenta", "a-host"), expected);
}

#[test]
fn should_emit_rules_on_separate_blocks() {
    assert_eq!(
        shim("one {color: red;} two {}", "contenta", "a-host"),
        "one[contenta] {\ncolor: red;\n}\n\ntwo[contenta] {\n\n}"
    );
}

#[test]
fn should_add_an_attribute_to_every_selector() {
    let css = "one, two {color: red;}";
    let expected = "one[contenta], two[contenta] {color:red;}";
    assert_equal_css(&shim(css, "contenta", "a-host"), expected);
}

#[test]
fn should_support_newlines_in_the_selector_and_content() {
    let css = "
      one,
      two {
        color: red;
      }
    ";
    let expected = "one[contenta], two[contenta] {color:red;}";
    assert_equal_css(&shim(css, "contenta", "a-host"), expected);
}

#[test]
fn should_handle_complex_selectors() {
    assert_equal_css(
        &shim("one .dir > two {}", "contenta", "a-host"),
        "one[contenta] .dir[contenta] > two[contenta] {}",
    );
    assert_equal_css(
        &shim("a+b~c {}", "contenta", "a-host"),
        "a[contenta] + b[contenta] ~ c[contenta] {}",
    );
}

#[test]
fn should_insert_the_attribute_before_pseudo_selectors() {
    assert_equal_css(
        &shim("a:not(.b) {}", "contenta", "a-host"),
        "a[contenta]:not(.b) {}",
    );
    assert_equal_css(
        &shim("[href^=\"http:\"] {}", "contenta", "a-host"),
        "[href^=\"http:\"][contenta] {}",
    );
}

#[test]
fn should_replace_host_selectors_with_the_host_attribute() {
    assert_equal_css(&shim(":host {}", "contenta", "a-host"), "[a-host] {}");
    assert_equal_css(&shim(":host(.x) {}", "contenta", "a-host"), "[a-host].x {}");
    assert_equal_css(
        &shim(":host .a {}", "contenta", "a-host"),
        "[a-host] .a[contenta] {}",
    );
}

#[test]
fn should_scope_rules_inside_media_queries() {
    let css = "@media screen { div {color: red;} }";
    let expected = "@media screen {div[contenta] {color:red;}}";
    assert_equal_css(&shim(css, "contenta", "a-host"), expected);
}

#[test]
fn should_scope_rules_inside_supports() {
    let css = "@supports (display: flex) { .a {display: flex;} }";
    let actual = shim(css, "contenta", "a-host");
    assert_contains(&actual, ".a[contenta]");
}

#[test]
fn should_keep_keyframes_verbatim() {
    let css = "@keyframes fade { from {opacity: 0;} to {opacity: 1;} }";
    let actual = shim(css, "contenta", "a-host");
    assert_contains(&actual, "from {opacity: 0;}");
    assert_not_contains(&actual, "from[contenta]");
}

#[test]
fn should_keep_at_rules_without_a_block() {
    assert_eq!(
        shim("@import url('x.css'); a {}", "contenta", "a-host"),
        "@import url('x.css');\n\na[contenta] {\n\n}"
    );
}

#[test]
fn should_drop_comments() {
    assert_eq!(
        shim("/* c */ a {} /* b */", "contenta", "a-host"),
        "a[contenta] {\n\n}"
    );
}

#[test]
fn should_produce_the_same_output_for_the_same_input() {
    let css = ".x .y {color: blue;} :host(.z) {}";
    assert_eq!(shim(css, "c1", "h1"), shim(css, "c1", "h1"));
    assert_ne!(shim(css, "c1", "h1"), shim(css, "c2", "h2"));
}
