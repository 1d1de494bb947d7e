use super::*;

#[test]
fn shape_requires_schema() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["shape", r#"{"key": "posts"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--schema"));
}

#[test]
fn shape_human_prints_type_literal() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", BLOG_SCHEMA);
    pbselect(&dir)
        .args([
            "--format",
            "human",
            "shape",
            r#"{"key": "posts", "fields": ["title"],
                "expand": [{"key": "author", "fields": ["name"]},
                           {"key": "post(postId)", "fields": ["text"]}]}"#,
            "--schema",
        ])
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{ title: text; expand: { author: { name: text }; "post(postId)": Array<{ text: text }> } }"#,
        ));
}

#[test]
fn shape_json_lists_every_field_when_unprojected() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", BLOG_SCHEMA);
    let output = pbselect(&dir)
        .args(["--format", "json", "shape", r#"{"key": "users"}"#, "--schema"])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(output.status.success());

    let shape = json_stdout(&output);
    assert_eq!(shape["entity"], "users");
    assert_eq!(shape["projected"], false);
    let names: Vec<&str> = shape["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"name"));
    assert!(names.contains(&"email"));
    assert!(names.contains(&"avatar"));
}

#[test]
fn shape_rejects_unknown_entity() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", BLOG_SCHEMA);
    pbselect(&dir)
        .args(["shape", r#"{"key": "tags"}"#, "--schema"])
        .arg(&schema)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown entity 'tags'"));
}

#[test]
fn shape_rejects_broken_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", "{ not json");
    pbselect(&dir)
        .args(["shape", r#"{"key": "posts"}"#, "--schema"])
        .arg(&schema)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schema"));
}
