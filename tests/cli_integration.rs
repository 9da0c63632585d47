//! End-to-end CLI coverage for the operation-contract table (spec.md §6):
//! build, find, symbol-at, impact, dependencies, stats, overview,
//! batch-impact, dep-graph.

mod support;

use support::TestWorkspace;

const AUTH_PY: &str = r#"
class UserService:
    def authenticate_user(self, username, password):
        if validate_user(username):
            return check_password(password)
        return False

def validate_user(username):
    return username in get_users()

def check_password(password):
    return len(password) >= 8

def get_users():
    return ['admin']
"#;

#[test]
fn build_reports_counts_and_creates_store() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .without_auto_index()
        .build()
        .unwrap();

    let output = ws.cli().arg("build").run().unwrap();
    output.assert_success();
    assert!(ws.db_path().exists());
    assert!(ws.root().join(".gitignore").exists());
}

#[test]
fn find_locates_the_authenticate_user_method() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().find("authenticate_user").run().unwrap();
    output
        .assert_success()
        .assert_stdout_contains("authenticate_user");
}

#[test]
fn symbol_at_resolves_the_enclosing_method() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().symbol_at("auth.py:4").run().unwrap();
    output
        .assert_success()
        .assert_stdout_contains("authenticate_user");
}

#[test]
fn impact_on_get_users_reports_transitive_dependents() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().impact("get_users").max_depth(5).run().unwrap();
    output.assert_success();
    assert!(
        output.stdout().contains("validate_user") || output.stdout().contains("risk"),
        "expected impact reasoning or dependents, got: {}",
        output.stdout()
    );
}

#[test]
fn impact_on_unused_symbol_is_safe_to_modify() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws
        .cli()
        .impact("authenticate_user")
        .max_depth(5)
        .run()
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("Safe to modify");
}

#[test]
fn dependencies_lists_direct_calls() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().dependencies("authenticate_user").run().unwrap();
    output
        .assert_success()
        .assert_stdout_contains("validate_user");
}

#[test]
fn stats_reports_symbol_and_edge_counts() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().stats().run().unwrap();
    output.assert_success().assert_stdout_contains("symbols");
}

#[test]
fn stats_on_missing_index_reports_unavailable() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .without_auto_index()
        .build()
        .unwrap();
    std::fs::remove_file(ws.db_path()).ok();

    let output = ws.cli().stats().run().unwrap();
    output.assert_success().assert_stdout_contains("No index");
}

#[test]
fn overview_names_the_most_depended_upon_symbol() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().overview().run().unwrap();
    output.assert_success().assert_stdout_contains("get_users");
}

#[test]
fn batch_impact_covers_every_requested_name() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws
        .cli()
        .arg("batch-impact")
        .arg("get_users")
        .arg("validate_user")
        .run()
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("get_users")
        .assert_stdout_contains("validate_user");
}

#[test]
fn dep_graph_reports_instability_for_each_name() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws
        .cli()
        .arg("dep-graph")
        .arg("get_users")
        .run()
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("instability");
}

#[test]
fn find_with_no_match_exits_not_found() {
    let ws = TestWorkspace::builder()
        .with_file("auth.py", AUTH_PY)
        .build()
        .unwrap();

    let output = ws.cli().find("does_not_exist_anywhere").run().unwrap();
    assert_eq!(output.stdout(), "No symbols found.\n");
    assert_eq!(output.status.code(), Some(1));
}
