use super::*;

#[test]
fn compile_prints_params_as_json() {
    let home = TempDir::new().unwrap();
    let output = pbselect(&home)
        .args([
            "--format",
            "json",
            "compile",
            r#"{"key": "posts", "fields": ["title"], "sort": "-created",
                "expand": [{"key": "author", "fields": ["name"]}]}"#,
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let params = json_stdout(&output);
    assert_eq!(params["fields"], "title,expand.author.name");
    assert_eq!(params["expand"], "author");
    assert_eq!(params["sort"], "-created");
    assert!(params.get("filter").is_none());
}

#[test]
fn compile_wildcards_unprojected_subtree() {
    let home = TempDir::new().unwrap();
    let output = pbselect(&home)
        .args([
            "--format",
            "json",
            "compile",
            r#"{"key": "posts", "expand": [{"key": "author", "expand": [{"key": "avatarOwner"}]}]}"#,
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let params = json_stdout(&output);
    assert!(params.get("fields").is_none());
    assert_eq!(params["expand"], "author.avatarOwner");
}

#[test]
fn compile_reads_selection_file() {
    let dir = TempDir::new().unwrap();
    let selection = write_file(
        &dir,
        "selection.json",
        r#"{"key": "comments", "fields": ["text"], "expand": [{"key": "author"}]}"#,
    );
    let output = pbselect(&dir)
        .args(["--format", "json", "compile"])
        .arg(&selection)
        .output()
        .unwrap();
    assert!(output.status.success());

    let params = json_stdout(&output);
    assert_eq!(params["fields"], "text,expand.*");
    assert_eq!(params["expand"], "author");
}

#[test]
fn compile_reads_selection_from_stdin() {
    let home = TempDir::new().unwrap();
    let output = pbselect(&home)
        .args(["--format", "json", "compile", "-"])
        .write_stdin(r#"{"key": "posts", "fields": ["title", "created"]}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["fields"], "title,created");
}

#[test]
fn compile_human_prints_table() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args([
            "--format",
            "human",
            "compile",
            r#"{"key": "posts", "fields": ["title"], "filter": "title != ''"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("param"))
        .stdout(predicate::str::contains("fields"))
        .stdout(predicate::str::contains("title != ''"));
}

#[test]
fn compile_with_schema_includes_shape() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", BLOG_SCHEMA);
    let output = pbselect(&dir)
        .args([
            "--format",
            "json",
            "compile",
            r#"{"key": "posts", "fields": ["title"],
                "expand": [{"key": "post(postId)", "fields": ["text"]}]}"#,
            "--schema",
        ])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(output.status.success());

    let compiled = json_stdout(&output);
    assert_eq!(
        compiled["params"]["fields"],
        "title,expand.post(postId).text"
    );
    assert_eq!(compiled["shape"]["entity"], "posts");
    let expand = &compiled["shape"]["expand"][0];
    assert_eq!(expand["key"], "post(postId)");
    assert_eq!(expand["cardinality"], "many");
    assert_eq!(expand["shape"]["entity"], "comments");
}

#[test]
fn compile_with_schema_rejects_unknown_field() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", BLOG_SCHEMA);
    pbselect(&dir)
        .args(["compile", r#"{"key": "posts", "fields": ["subtitle"]}"#, "--schema"])
        .arg(&schema)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field 'subtitle' on 'posts'"));
}

#[test]
fn compile_with_schema_rejects_unresolvable_relation() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", BLOG_SCHEMA);
    pbselect(&dir)
        .args(["compile", r#"{"key": "posts", "expand": [{"key": "editor"}]}"#, "--schema"])
        .arg(&schema)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'posts' has no relation 'editor'"));
}

#[test]
fn compile_rejects_invalid_selection() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["compile", r#"{"fields": ["title"]}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid selection"));
}

#[test]
fn compile_missing_file_fails() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["compile", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

#[test]
fn verbose_logs_compiled_selection_to_stderr() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["--verbose", "--format", "json", "compile", r#"{"key": "posts", "fields": ["title"]}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("compiled selection"));
}

#[test]
fn log_level_env_enables_debug() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .env("PBSELECT_LOG_LEVEL", "debug")
        .args(["--format", "json", "compile", r#"{"key": "posts"}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("compiled selection"));
}

#[test]
fn default_log_level_is_quiet() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["--format", "json", "compile", r#"{"key": "posts"}"#])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn compile_human_shows_request_key() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args([
            "--format",
            "human",
            "compile",
            r#"{"key": "posts", "fields": ["title"], "requestKey": "feed"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("requestKey"))
        .stdout(predicate::str::contains("feed"));
}
