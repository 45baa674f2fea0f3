use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

/// Full CRUD pass against a running server backed by PostgreSQL.
///
/// Start the service first, then run with:
/// `TEST_API_BASE_URL=http://localhost:8080 cargo test --test live_server -- --ignored`
#[tokio::test]
#[ignore = "needs a running server and database"]
async fn test_todo_crud_against_live_server() {
    let base_url =
        std::env::var("TEST_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = TestClient::new(base_url);

    let mut retries = 0;
    let max_retries = 30;
    loop {
        match client.get("/healthz").await {
            Ok(resp) if resp.status().is_success() => break,
            _ => {
                if retries >= max_retries {
                    panic!("API server is not responding after {} attempts", max_retries);
                }
                sleep(Duration::from_secs(1)).await;
                retries += 1;
            }
        }
    }

    // Create
    let resp = client
        .post("/todos", json!({"title": "live", "description": "from the live test"}))
        .await
        .expect("Failed to create todo");
    assert!(resp.status().is_success(), "create failed: {}", resp.status());
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().expect("id should be an integer");

    // Get
    let fetched: Value = client
        .get(&format!("/todos/{}", id))
        .await
        .expect("Failed to fetch todo")
        .json()
        .await
        .unwrap();
    assert_eq!(
        fetched,
        json!({"id": id, "title": "live", "description": "from the live test"})
    );

    // Update
    let resp = client
        .put(
            &format!("/todos/{}", id),
            json!({"title": "live (edited)", "description": "updated"}),
        )
        .await
        .expect("Failed to update todo");
    assert!(resp.status().is_success());

    // List contains the updated row
    let listed: Value = client.get("/todos").await.unwrap().json().await.unwrap();
    let titles: Vec<&str> = listed["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .filter(|t| t["id"].as_i64() == Some(id))
        .filter_map(|t| t["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["live (edited)"]);

    // Delete
    let resp = client
        .delete(&format!("/todos/{}", id))
        .await
        .expect("Failed to delete todo");
    assert!(resp.status().is_success());

    let resp = client.get(&format!("/todos/{}", id)).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}
