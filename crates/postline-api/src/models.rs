// Wire types for the record collection endpoint.

use serde::{Deserialize, Serialize};

/// A single record as returned by the collection endpoint.
///
/// Endpoints in the wild name the owner field either `ownerId` or
/// `userId`; both decode into `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    #[serde(alias = "userId")]
    pub owner_id: i64,
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_owner_id() {
        let rec: RecordResponse =
            serde_json::from_str(r#"{"ownerId":7,"id":1,"title":"Alpha","body":"x"}"#).unwrap();
        assert_eq!(rec.owner_id, 7);
        assert_eq!(rec.title, "Alpha");
    }

    #[test]
    fn decodes_user_id_alias_and_missing_body() {
        let rec: RecordResponse =
            serde_json::from_str(r#"{"userId":3,"id":9,"title":"Beta"}"#).unwrap();
        assert_eq!(rec.owner_id, 3);
        assert_eq!(rec.id, 9);
        assert!(rec.body.is_empty());
    }
}
