use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Author {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
}

/// A post as the backend returns it. Only `_id` is guaranteed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "createdDate", default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Author,
}

impl Post {
    /// `M/D/YYYY`, or an empty string when the backend sent no date.
    pub fn formatted_date(&self) -> String {
        self.created_date
            .map(|d| d.format("%-m/%-d/%Y").to_string())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Debug)]
pub struct TokenRequest<'a> {
    pub token: &'a str,
}

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub struct SearchRequest<'a> {
    #[serde(rename = "searchTerm")]
    pub search_term: &'a str,
}

/// Body of `/create-post` and `/post/:id/edit`.
#[derive(Serialize, Debug)]
pub struct PostDraft<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub token: &'a str,
}

/// Human-readable text for a refusal. Validation failures come back as a
/// list of messages.
pub fn rejection_message(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Array(items) => {
            let messages: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if messages.is_empty() {
                "the backend refused the request".to_string()
            } else {
                messages.join(" ")
            }
        }
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => "the backend refused the request".to_string(),
    }
}

/// The backend answers several calls with either a payload or a bare
/// `false`, so responses are judged by JavaScript truthiness.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
