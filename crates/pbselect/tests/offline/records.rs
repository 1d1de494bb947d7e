use super::*;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn list_body(items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "page": 1,
        "perPage": 30,
        "totalItems": 2,
        "totalPages": 1,
        "items": items
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn list_sends_compiled_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/collections/posts/records"))
        .and(query_param("fields", "id,title,expand.author.name"))
        .and(query_param("expand", "author"))
        .and(query_param("page", "2"))
        .and(query_param("perPage", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(serde_json::json!([
            {"id": "p1", "title": "One", "expand": {"author": {"name": "Ada"}}},
            {"id": "p2", "title": "Two", "expand": {"author": {"name": "Grace"}}}
        ]))))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = pbselect(&home)
        .args(["--format", "json", "--url", &server.uri(), "list"])
        .arg(r#"{"key": "posts", "fields": ["id", "title"], "expand": [{"key": "author", "fields": ["name"]}]}"#)
        .args(["--page", "2", "--per-page", "5"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let list = json_stdout(&output);
    assert_eq!(list["totalItems"], 2);
    assert_eq!(list["items"][1]["expand"]["author"]["name"], "Grace");
}

#[tokio::test(flavor = "multi_thread")]
async fn list_human_prints_id_column() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(serde_json::json!([
            {"id": "p1", "title": "One"}
        ]))))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["--format", "human", "--url", &server.uri(), "list", r#"{"key": "posts"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("p1"))
        .stdout(predicate::str::contains("Page 1 of 1 (2 records)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_uses_url_from_env_and_token_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "flag-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(serde_json::json!([]))))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_file(&home, ".pocketbase_token", "file-token");
    pbselect(&home)
        .env("POCKETBASE_URL", server.uri())
        .args(["--format", "json", "--token", "flag-token", "list", r#"{"key": "posts"}"#])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn list_falls_back_to_token_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "file-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(serde_json::json!([]))))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_file(&home, ".pocketbase_token", "file-token\n");
    pbselect(&home)
        .args(["--format", "json", "--url", &server.uri(), "list", r#"{"key": "posts"}"#])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn list_all_fetches_until_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("perPage", "500"))
        .and(query_param("skipTotal", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "page": 1,
            "perPage": 500,
            "totalItems": -1,
            "totalPages": -1,
            "items": [{"id": "a"}, {"id": "b"}, {"id": "c"}]
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = pbselect(&home)
        .args(["--format", "json", "--url", &server.uri(), "list", "--all", r#"{"key": "posts"}"#])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output).as_array().unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn view_fetches_record_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/collections/posts/records/p1"))
        .and(query_param("expand", "post(postId)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "p1",
            "expand": {"post(postId)": [{"text": "first!"}]}
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = pbselect(&home)
        .args(["--format", "json", "--url", &server.uri(), "view"])
        .arg(r#"{"key": "posts", "expand": [{"key": "post(postId)", "fields": ["text"]}]}"#)
        .arg("p1")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        json_stdout(&output)["expand"]["post(postId)"][0]["text"],
        "first!"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn view_reports_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 404,
            "message": "The requested resource wasn't found.",
            "data": {}
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["--url", &server.uri(), "view", r#"{"key": "posts"}"#, "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("wasn't found"));
}

#[test]
fn list_rejects_invalid_url() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["--url", "not a url", "list", r#"{"key": "posts"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid base URL"));
}

#[test]
fn list_all_conflicts_with_page() {
    let home = TempDir::new().unwrap();
    pbselect(&home)
        .args(["list", "--all", "--page", "2", r#"{"key": "posts"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_env_token_falls_back_to_token_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "file-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(serde_json::json!([]))))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_file(&home, ".pocketbase_token", "file-token");
    pbselect(&home)
        .env("POCKETBASE_TOKEN", "")
        .args(["--format", "json", "--url", &server.uri(), "list", r#"{"key": "posts"}"#])
        .assert()
        .success();
}
