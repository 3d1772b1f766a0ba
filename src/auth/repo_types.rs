use serde::Serialize;
use serde_json::{Map, Value};

/// Row of the `login` table.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub email: String,            // lookup key, matched exactly
    #[serde(skip_serializing)]
    pub password: Vec<u8>,        // bcrypt or argon2 hash, not exposed in JSON
    #[serde(flatten)]
    pub columns: Map<String, Value>, // remaining columns, passed through as stored
}

impl UserRecord {
    pub fn new(email: impl Into<String>, password_hash: impl Into<Vec<u8>>) -> Self {
        Self {
            email: email.into(),
            password: password_hash.into(),
            columns: Map::new(),
        }
    }

    pub fn with_column(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.columns.insert(name.to_owned(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_without_password_and_flattens_columns() {
        let user = UserRecord::new("u@x.com", b"$2b$04$hash".to_vec())
            .with_column("id", 7)
            .with_column("role", "editor");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value, json!({"email": "u@x.com", "id": 7, "role": "editor"}));
    }
}
