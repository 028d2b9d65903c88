use serde::{Deserialize, Serialize};

/// Upper bound on any search result set.
pub const MAX_RESULTS: usize = 10;

/// A question row as stored in the question store and returned by searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub answer: String,
    #[serde(default)]
    pub image_url: String,
}

/// A new question before it has been assigned an id.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub answer: String,
    pub image_url: String,
}

impl NewQuestion {
    /// Attach the id allocated for this question.
    pub fn with_id(self, id: i64) -> Question {
        Question {
            id,
            title: self.title,
            answer: self.answer,
            image_url: self.image_url,
        }
    }
}

/// A vector index hit: question id plus similarity score (higher is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: i64,
    pub score: f32,
}

/// True when `title` contains `keyword`, ignoring case.
pub fn title_matches(title: &str, keyword: &str) -> bool {
    title.to_lowercase().contains(&keyword.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_question_with_id() {
        let q = NewQuestion {
            title: "二次函数求导".to_string(),
            answer: "2x".to_string(),
            image_url: "https://example.com/a.jpg".to_string(),
        }
        .with_id(42);
        assert_eq!(q.id, 42);
        assert_eq!(q.title, "二次函数求导");
        assert_eq!(q.image_url, "https://example.com/a.jpg");
    }

    #[test]
    fn test_question_serializes_with_row_field_names() {
        let q = Question {
            id: 1,
            title: "t".to_string(),
            answer: "a".to_string(),
            image_url: "u".to_string(),
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["image_url"], "u");
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_title_matches_is_case_insensitive() {
        assert!(title_matches("Quadratic Derivative", "quadratic"));
        assert!(title_matches("二次函数求导", "二次函数"));
        assert!(!title_matches("三角函数计算", "二次函数"));
    }
}
