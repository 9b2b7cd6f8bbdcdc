use serde::Deserialize;

/// A request arriving at the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundRequest {
    /// Free text, e.g. "Add selected ingredients to cart (serves 4): ...".
    Text(String),
    /// Add known product ids directly, skipping extraction and matching.
    AddProducts {
        product_ids: Vec<String>,
        user_id: Option<String>,
    },
    /// Match ingredients without touching the cart.
    CheckIngredients { ingredients: Vec<String> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    AddProducts {
        product_ids: Vec<String>,
        #[serde(default)]
        user_id: Option<String>,
    },
    CheckIngredients {
        ingredients: Vec<String>,
    },
}

impl InboundRequest {
    /// Interpret `input` as a JSON envelope when it is one, otherwise as free text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with('{') {
            match serde_json::from_str::<Envelope>(trimmed) {
                Ok(Envelope::AddProducts {
                    product_ids,
                    user_id,
                }) => {
                    return InboundRequest::AddProducts {
                        product_ids,
                        user_id,
                    }
                }
                Ok(Envelope::CheckIngredients { ingredients }) => {
                    return InboundRequest::CheckIngredients { ingredients }
                }
                Err(e) => tracing::debug!(error = %e, "Not a JSON envelope, treating as text"),
            }
        }
        InboundRequest::Text(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_products() {
        let request = InboundRequest::parse(r#"{"product_ids": ["GARLIC001"], "user_id": "u1"}"#);
        assert_eq!(
            request,
            InboundRequest::AddProducts {
                product_ids: vec!["GARLIC001".to_string()],
                user_id: Some("u1".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_add_products_without_user() {
        let request = InboundRequest::parse(r#"{"product_ids": []}"#);
        assert_eq!(
            request,
            InboundRequest::AddProducts {
                product_ids: vec![],
                user_id: None,
            }
        );
    }

    #[test]
    fn test_parse_check_ingredients() {
        let request = InboundRequest::parse(r#"{"ingredients": ["garlic", "onion"]}"#);
        assert_eq!(
            request,
            InboundRequest::CheckIngredients {
                ingredients: vec!["garlic".to_string(), "onion".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_falls_back_to_text() {
        assert_eq!(
            InboundRequest::parse("garlic, onion"),
            InboundRequest::Text("garlic, onion".to_string())
        );
        assert_eq!(
            InboundRequest::parse("{not json"),
            InboundRequest::Text("{not json".to_string())
        );
    }
}
