use async_trait::async_trait;
use oh_core::address::{AddressId, AddressLevel, AddressOption};
use oh_core::api::ApiError;
use oh_core::ports::AddressLookupPort;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::client::{decode, BackendClient};

/// List endpoints may be paginated (`{"results": [...]}`) or plain arrays.
fn rows(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("results").is_some_and(Value::is_array) => {
            map.remove("results").unwrap_or(Value::Null)
        }
        Value::Null => Value::Array(Vec::new()),
        other => other,
    }
}

#[async_trait]
impl AddressLookupPort for BackendClient {
    async fn list(
        &self,
        level: AddressLevel,
        parent: Option<(AddressLevel, AddressId)>,
    ) -> Result<Vec<AddressOption>, ApiError> {
        let path = format!("/address/{}/", level.collection());
        let mut request = self.request(Method::GET, &path)?;
        if let Some((parent_level, id)) = parent {
            request = request.query(&[(parent_level.filter_param(), id)]);
        }

        let options: Vec<AddressOption> = decode(rows(self.execute(request).await?))?;
        debug!(level = ?level, count = options.len(), "address options loaded");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::test_support::client_for;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn divisions_are_listed_without_filter() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/address/divisions/")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "Dhaka"}, {"id": 2, "name": "Khulna"}]"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let options = client.list(AddressLevel::Division, None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].name, "Khulna");
    }

    #[tokio::test]
    async fn villages_are_filtered_by_union_and_nested_parents_ignored() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/address/villages/")
            .match_query(Matcher::UrlEncoded("union".into(), "17".into()))
            .with_status(200)
            .with_body(
                r#"{"count": 1, "results": [{"id": 301, "name": "Char Kukri",
                    "union": {"id": 17, "name": "Kukri Mukri"}}]}"#,
            )
            .create_async()
            .await;
        let client = client_for(&server);

        let options = client
            .list(AddressLevel::Village, Some((AddressLevel::Union, 17)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            options,
            vec![AddressOption {
                id: 301,
                name: "Char Kukri".into()
            }]
        );
    }

    #[tokio::test]
    async fn districts_use_zilla_collection_and_division_param() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/address/zillas/")
            .match_query(Matcher::UrlEncoded("division".into(), "3".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let client = client_for(&server);

        let options = client
            .list(AddressLevel::District, Some((AddressLevel::Division, 3)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(options.is_empty());
    }
}
