use serde::Deserialize;
use serde_json::Value;

/// Clients send tags either as a list or as one comma-joined string.
///
/// List elements stay raw JSON so a stray number or boolean is coerced
/// instead of failing the whole request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<Value>),
    Joined(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_lists_deserialize() {
        let tags: TagsInput = serde_json::from_value(json!([1, "a", true, null])).unwrap();
        assert_eq!(tags, TagsInput::List(vec![json!(1), json!("a"), json!(true), Value::Null]));
    }

    #[test]
    fn strings_are_joined_form() {
        let tags: TagsInput = serde_json::from_value(json!("a, b")).unwrap();
        assert_eq!(tags, TagsInput::Joined("a, b".to_string()));
    }
}
