/// Tests demonstrating the test harness functionality.
mod support;

use support::*;

#[test]
fn builds_workspace_from_inline_files() {
    let ws = TestWorkspace::builder()
        .with_file("hello.ts", "export function greet() { return 'hi'; }")
        .with_file("main.ts", "import { greet } from './hello';\ngreet();")
        .build()
        .unwrap();

    assert!(ws.root().join("hello.ts").exists());
    assert!(ws.root().join("main.ts").exists());

    let found = ws.store().find_by_alias("greet", 10, None).unwrap();
    assert!(found.iter().any(|m| m.symbol.name == "greet"));
}

#[test]
fn cli_find_reports_matching_symbols() {
    let ws = TestWorkspace::builder()
        .with_file("test.ts", "function foo() {}\nfunction bar() {}")
        .build()
        .unwrap();

    let output = ws.cli().find("foo").run().unwrap();

    output.assert_success().assert_stdout_contains("foo");
}

#[test]
fn cli_json_output_is_parseable() {
    let ws = TestWorkspace::builder()
        .with_file("test.ts", "export function myFunc() { return 1; }")
        .build()
        .unwrap();

    let output = ws.cli().find("myFunc").json().run().unwrap();
    output.assert_success();

    let json: serde_json::Value = output.json_value().unwrap();
    assert!(json.is_array());
    let arr = json.as_array().unwrap();
    assert!(arr.iter().any(|s| s["name"] == "myFunc"));
}

#[test]
fn workspace_write_and_reindex_picks_up_new_files() {
    let ws = TestWorkspace::builder()
        .with_file("initial.ts", "function first() {}")
        .build()
        .unwrap();

    assert!(ws
        .store()
        .find_by_alias("first", 10, None)
        .unwrap()
        .iter()
        .any(|m| m.symbol.name == "first"));

    ws.write_file("second.ts", "function second() {}").unwrap();
    ws.reindex().unwrap();

    assert!(ws
        .store()
        .find_by_alias("second", 10, None)
        .unwrap()
        .iter()
        .any(|m| m.symbol.name == "second"));
}

#[test]
fn without_auto_index_leaves_store_empty_until_manual_reindex() {
    let ws = TestWorkspace::builder()
        .with_file("test.ts", "function noIndex() {}")
        .without_auto_index()
        .build()
        .unwrap();

    assert_eq!(ws.store().symbol_count().unwrap(), 0);

    ws.reindex().unwrap();
    assert!(ws
        .store()
        .find_by_alias("noIndex", 10, None)
        .unwrap()
        .iter()
        .any(|m| m.symbol.name == "noIndex"));
}
