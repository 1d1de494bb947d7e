use super::*;
use pbselect_sdk::{Expansion, Record};
use serde::Deserialize;

#[derive(Debug, Deserialize, Record)]
#[record(collection = "users")]
struct Author {
    name: String,
}

#[derive(Debug, Deserialize, Record)]
#[record(collection = "comments")]
struct Comment {
    text: String,
}

#[derive(Debug, Deserialize, Expansion)]
struct PostExpand {
    author: Author,
    #[record(rename = "post(postId)")]
    #[serde(rename = "post(postId)", default)]
    comments: Vec<Comment>,
}

#[derive(Debug, Deserialize, Record)]
#[record(collection = "posts")]
struct Post {
    id: String,
    title: String,
    #[record(expand)]
    expand: PostExpand,
}

fn post_json() -> serde_json::Value {
    serde_json::json!({
        "id": "p1",
        "title": "Hello",
        "expand": {
            "author": { "name": "Ada" },
            "post(postId)": [{ "text": "nice" }, { "text": "thanks" }]
        }
    })
}

#[tokio::test]
async fn derived_record_compiles_its_own_selection() {
    let (server, client) = setup(serde_json::json!([post_json()])).await;
    let list = client.records::<Post>().send().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(extract_path(&requests), "/api/collections/posts/records");
    let query = extract_query(&requests);
    assert_eq!(
        query["fields"],
        "id,title,expand.author.name,expand.post(postId).text"
    );
    assert_eq!(query["expand"], "author,post(postId)");

    assert_eq!(list.items.len(), 1);
    let post = &list.items[0];
    assert_eq!(post.id, "p1");
    assert_eq!(post.title, "Hello");
    assert_eq!(post.expand.author.name, "Ada");
    assert_eq!(post.expand.comments.len(), 2);
    assert_eq!(post.expand.comments[1].text, "thanks");
}

#[tokio::test]
async fn derived_record_view_hits_record_path() {
    let (server, client) = setup_record(post_json()).await;
    let post = client.records::<Post>().view("p1").await.unwrap();
    assert_eq!(post.expand.author.name, "Ada");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(extract_path(&requests), "/api/collections/posts/records/p1");
    let query = extract_query(&requests);
    assert_eq!(query["expand"], "author,post(postId)");
    assert!(!query.contains_key("page"));
}

#[tokio::test]
async fn missing_expanded_relation_fails_to_deserialize() {
    let (_server, client) = setup(serde_json::json!([{ "id": "p2", "title": "Lonely" }])).await;
    let err = client.records::<Post>().send().await.unwrap_err();
    assert!(matches!(err, pbselect_sdk::PocketBaseError::Deserialize(_)));
}
