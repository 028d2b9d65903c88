use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::debug;

use super::{escape_like, QuestionStore};
use crate::models::question::{title_matches, Question};

/// Question store backed by a Supabase project's PostgREST endpoint.
pub struct SupabaseStore {
    rest_url: String,
    http_client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(project_url: &str, service_key: &str, table: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(service_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {service_key}"))?,
        );

        Ok(Self {
            rest_url: table_url(project_url, table),
            http_client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
        })
    }

    async fn select(&self, query: &[(&str, String)]) -> anyhow::Result<Vec<Question>> {
        let resp = self
            .http_client
            .get(&self.rest_url)
            .query(query)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Database search failed ({status}): {body}");
        }

        Ok(resp.json().await?)
    }
}

fn table_url(project_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{table}", project_url.trim_end_matches('/'))
}

/// PostgREST reads `*` as `%`, so a literal `*` goes out as the single-char
/// wildcard `_` and [`keep_literal_matches`] drops the extra rows.
fn ilike_filter(keyword: &str) -> String {
    format!("ilike.*{}*", escape_like(keyword).replace('*', "_"))
}

fn keep_literal_matches(keyword: &str, rows: Vec<Question>) -> Vec<Question> {
    if !keyword.contains('*') {
        return rows;
    }
    rows.into_iter()
        .filter(|q| title_matches(&q.title, keyword))
        .collect()
}

fn in_filter(ids: &[i64]) -> String {
    let list = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    format!("in.({list})")
}

#[async_trait]
impl QuestionStore for SupabaseStore {
    async fn insert_question(&self, question: &Question) -> anyhow::Result<()> {
        let resp = self
            .http_client
            .post(&self.rest_url)
            .header("Prefer", "return=minimal")
            .json(question)
            .send()
            .await?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or(body);
            anyhow::bail!("Supabase insert failed: {message}");
        }

        debug!("Inserted question {} into Supabase", question.id);
        Ok(())
    }

    async fn search_by_title(&self, keyword: &str, limit: usize) -> anyhow::Result<Vec<Question>> {
        let rows = self
            .select(&[
                ("select", "*".to_string()),
                ("title", ilike_filter(keyword)),
                ("limit", limit.to_string()),
            ])
            .await?;
        Ok(keep_literal_matches(keyword, rows))
    }

    async fn get_questions(&self, ids: &[i64]) -> anyhow::Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.select(&[("select", "*".to_string()), ("id", in_filter(ids))])
            .await
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        // Schema is managed in the Supabase project.
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        assert_eq!(
            table_url("https://abc.supabase.co/", "questions"),
            "https://abc.supabase.co/rest/v1/questions"
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(ilike_filter("二次函数"), "ilike.*二次函数*");
        assert_eq!(ilike_filter("50%"), "ilike.*50\\%*");
        assert_eq!(in_filter(&[3, 1, 2]), "in.(3,1,2)");
    }

    #[test]
    fn test_star_is_matched_literally() {
        assert_eq!(ilike_filter("a*b"), "ilike.*a_b*");

        let row = |id, title: &str| Question {
            id,
            title: title.to_string(),
            answer: String::new(),
            image_url: String::new(),
        };
        let rows = vec![row(1, "a*b = 3"), row(2, "axb = 3")];
        let kept = keep_literal_matches("a*b", rows.clone());
        assert_eq!(kept, vec![row(1, "a*b = 3")]);
        assert_eq!(keep_literal_matches("ab", rows.clone()), rows);
    }

    #[test]
    fn test_new_rejects_invalid_key() {
        assert!(SupabaseStore::new("https://abc.supabase.co", "bad\nkey", "questions").is_err());
    }
}
