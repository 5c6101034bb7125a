use serde::{Deserialize, Deserializer};

// clients send "" for untouched inputs, treat it the same as a missing field
pub fn deserialize_non_blank_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::deserialize_non_blank_string;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "deserialize_non_blank_string")]
        topic: Option<String>,
    }

    fn topic(json: &str) -> Option<String> {
        serde_json::from_str::<Form>(json).unwrap().topic
    }

    #[test]
    fn blank_and_missing_values_become_none() {
        assert_eq!(topic("{}"), None);
        assert_eq!(topic(r#"{"topic":null}"#), None);
        assert_eq!(topic(r#"{"topic":"   "}"#), None);
        assert_eq!(topic(r#"{"topic":" Oceans "}"#), Some("Oceans".to_owned()));
    }

    #[test]
    fn non_string_values_are_errors() {
        assert!(serde_json::from_str::<Form>(r#"{"topic":5}"#).is_err());
    }
}
