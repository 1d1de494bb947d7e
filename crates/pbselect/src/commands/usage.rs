/// Print a compact LLM-friendly command reference.
pub fn run() {
    let url_hint = match std::env::var("POCKETBASE_URL") {
        Ok(url) if !url.trim().is_empty() => format!(" (set: {})", url),
        _ => String::new(),
    };
    let env_hint = if std::env::var("POCKETBASE_TOKEN").is_ok() {
        " (set)"
    } else {
        ""
    };
    let file_hint = if std::env::var("HOME")
        .map(|h| std::path::Path::new(&h).join(".pocketbase_token").exists())
        .unwrap_or(false)
    {
        " (found)"
    } else {
        ""
    };

    print!(
        r#"pbselect — compile and run PocketBase selection trees

COMMANDS:
  pbselect compile <SELECTION> [--schema FILE]    Print fields/expand/sort/filter parameters
                                                  With --schema: validate and print the shape
  pbselect shape <SELECTION> --schema FILE        Print the response shape
  pbselect list <SELECTION>                       List matching records
    [--page N] [--per-page N]                     Page selection (default 1, 30)
    [--all]                                       Fetch every page
  pbselect view <SELECTION> <ID>                  Fetch one record by id
  pbselect usage                                  This reference

SELECTION (file path, - for stdin, or inline JSON):
  {{"key": "posts", "fields": ["title"], "sort": "-created",
   "expand": [{{"key": "author", "fields": ["name"]}},
              {{"key": "post(postId)"}}]}}
  No fields anywhere below a relation -> expand.* wildcard
  Back-relations: name(via), e.g. post(postId)

SCHEMA:
  {{"entities": {{"posts": {{"title": "text", "author": "relation"}}}},
   "relations": {{"author": {{"target": "users"}},
                 "post(postId)": {{"target": "comments", "many": true}}}}}}

GLOBAL OPTIONS:
  --url <URL>           Server URL (default {default_url})
  --token <TOKEN>       Override auth token
  --format human|json   Force output format (auto-detected by default)
  --verbose             Debug logging to stderr (or PBSELECT_LOG_LEVEL=debug)

SERVER:
  1. --url flag
  2. $POCKETBASE_URL env var{url_hint}

AUTH (in precedence order):
  1. --token flag
  2. $POCKETBASE_TOKEN env var{env_hint}
  3. ~/.pocketbase_token file{file_hint}
"#,
        default_url = pbselect_sdk::auth::DEFAULT_URL,
    );
}
