//! HTML views rendered with maud.

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use kanthor_playground_core::{MessageRecord, PrintoutRecord};

use crate::sdk::Application;

const STYLE: &str = r#"
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         color: #e0e0e0; background: #0d1117; line-height: 1.6; }
  .container { max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }
  h1 { font-size: 1.8rem; margin-bottom: 0.5rem; color: #f0f0f0; }
  h2 { font-size: 1.2rem; margin: 2rem 0 0.75rem; color: #c0c0c0; }
  p { margin-bottom: 1rem; color: #a0a0a0; }
  code { background: #161b22; padding: 0.15em 0.4em; border-radius: 4px; font-size: 0.9em; }
  pre { background: #161b22; padding: 1rem; border-radius: 8px; overflow-x: auto;
        margin-bottom: 1rem; border: 1px solid #30363d; }
  pre code { background: none; padding: 0; }
  dl { display: grid; grid-template-columns: max-content 1fr; gap: 0.25rem 1rem; margin-bottom: 1rem; }
  dt { color: #8b949e; }
  a { color: #58a6ff; text-decoration: none; }
  .item { border: 1px solid #30363d; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
  .item-meta { color: #8b949e; font-size: 0.85em; margin-bottom: 0.5rem; }
  .badge { display: inline-block; background: #1f6feb; color: #fff; border-radius: 4px;
           padding: 0 0.4em; font-size: 0.85em; }
  .error { border-color: #f85149; }
"#;

fn layout(title: &str, content: &Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - Kanthor Playground" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                div.container { (content) }
                script src="/assets/playground.js" defer {}
            }
        }
    }
    .into_string()
}

/// Pretty-print `raw` if it is JSON, otherwise return it unchanged.
fn pretty(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| raw.to_string())
}

fn pretty_headers<T: serde::Serialize>(headers: &T) -> String {
    serde_json::to_string_pretty(headers).unwrap_or_default()
}

pub fn error_page(status: StatusCode, message: &str, backtrace: Option<&str>) -> String {
    let heading = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let content = html! {
        h1 { (heading) }
        div.item.error {
            p.error-message { (message) }
        }
        @if let Some(trace) = backtrace {
            h2 { "Stack" }
            pre { code { (trace) } }
        }
        p { a href="/" { "Start a new playground" } }
    };
    layout(&heading, &content)
}

/// Data for the application page.
#[derive(Debug)]
pub struct AppView<'a> {
    pub app: &'a Application,
    pub sdk_endpoint: &'a str,
    pub authorization: &'a str,
    pub timestamp: &'a str,
    pub message_type: &'a str,
    pub idempotency_key: &'a str,
    pub messages: &'a [MessageRecord],
}

fn send_message_example(view: &AppView<'_>) -> String {
    let body = serde_json::json!({
        "app_id": view.app.id,
        "type": view.message_type,
        "body": { "hello": "world", "sent_at": view.timestamp },
        "headers": { "X-Client": "curl" },
    });
    format!(
        "curl -X POST '{endpoint}/message' \\\n  \
         -H 'Authorization: {auth}' \\\n  \
         -H 'Content-Type: application/json' \\\n  \
         -H 'Idempotency-Key: {key}' \\\n  \
         -d '{body}'",
        endpoint = view.sdk_endpoint,
        auth = view.authorization,
        key = view.idempotency_key,
    )
}

fn message_list(messages: &[MessageRecord]) -> Markup {
    html! {
        div.message-list {
            @if messages.is_empty() {
                p { "No messages yet. Deliveries show up here as they arrive." }
            }
            @for message in messages {
                div.item.message data-message-id=(message.id) data-message-timestamp=(message.timestamp) {
                    div.item-meta {
                        code { (message.id) } " received at "
                        time datetime=(message.timestamp) { (message.timestamp) }
                    }
                    h2 { "Headers" }
                    pre { code { (pretty_headers(&message.headers)) } }
                    h2 { "Body" }
                    pre { code { (pretty(&message.body)) } }
                }
            }
        }
    }
}

fn message_count(count: usize) -> Markup {
    html! {
        span.badge.message-count data-count=(count) { (count) " messages" }
    }
}

pub fn app_page(view: &AppView<'_>) -> String {
    let content = html! {
        h1 { (view.app.name) }
        dl {
            dt { "Application" } dd { code { (view.app.id) } }
            dt { "Workspace" } dd { code { (view.app.ws_id) } }
            dt { "API" } dd { code { (view.sdk_endpoint) } }
            dt { "Authorization" } dd { code { (view.authorization) } }
            dt { "Message type" } dd { code { (view.message_type) } }
            dt { "Rendered at" } dd { (view.timestamp) }
        }
        h2 { "Send a message" }
        pre { code { (send_message_example(view)) } }
        h2 {
            "Messages "
            span id="message-count" data-src=(format!("/app/{}/message/count", view.app.id)) {
                (message_count(view.messages.len()))
            }
        }
        div id="messages" data-src=(format!("/app/{}/message", view.app.id)) {
            (message_list(view.messages))
        }
    };
    layout(&view.app.name, &content)
}

/// Message list fragment for `/app/{id}/message`.
pub fn messages_fragment(messages: &[MessageRecord]) -> String {
    message_list(messages).into_string()
}

/// Counter fragment for `/app/{id}/message/count`.
pub fn message_count_fragment(count: usize) -> String {
    message_count(count).into_string()
}

pub fn printout_page(items: &[PrintoutRecord]) -> String {
    let content = html! {
        h1 { "Printout" }
        p {
            "Send any " code { "POST" } ", " code { "PUT" } " or " code { "PATCH" }
            " request to " code { "/printout" } " and it shows up here for an hour."
        }
        h2 { span.badge.item-count data-count=(items.len()) { (items.len()) " items" } }
        @for item in items {
            div.item.printout {
                div.item-meta {
                    span.badge.method { (item.method) } " "
                    time datetime=(item.timestamp) { (item.timestamp) }
                }
                h2 { "Headers" }
                pre { code { (pretty_headers(&item.headers)) } }
                h2 { "Body" }
                pre { code.body { (item.body) } }
            }
        }
    };
    layout("Printout", &content)
}
