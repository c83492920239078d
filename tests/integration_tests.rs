//! Integration tests for the ISF Playground backend.
//!
//! These tests require a running backend HTTP server seeded with the default
//! admin account. Set TEST_BASE_URL and TEST_ADMIN_PASSWORD to point at it.
//!
//! Example:
//! ```sh
//! export TEST_BASE_URL="http://127.0.0.1:8080"
//! export TEST_ADMIN_PASSWORD="admin123"
//! cargo test --test integration_tests -- --ignored
//! ```
//!
//! Note: These tests are marked with #[ignore] because they require
//! a running HTTP server. In CI, run them separately with a service container.

use std::env;

use reqwest::multipart;
use reqwest::Client;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    token: String,
    client: Client,
}

impl TestServer {
    fn new() -> Self {
        let base_url =
            env::var("TEST_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".into());
        Self {
            base_url,
            token: String::new(),
            client: Client::new(),
        }
    }

    async fn login_admin(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let password =
            env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
        let resp = self
            .client
            .post(format!("{}/api/v1/auth/login", self.base_url))
            .json(&json!({
                "email": "admin@localhost",
                "password": password,
            }))
            .send()
            .await?;

        let body: Value = resp.json().await?;
        self.token = body["data"]["token"]
            .as_str()
            .ok_or("No token in login response")?
            .to_string();
        Ok(())
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn create_role(
        &self,
        name: &str,
        permissions: Value,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}/api/roles", self.base_url))
            .header("Authorization", self.auth_header())
            .json(&json!({ "name": name, "permissions": permissions }))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status();
            let text = resp.text().await?;
            Err(format!("Failed to create role: {} - {}", status, text).into())
        }
    }

    async fn delete_role(&self, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.client
            .delete(format!("{}/api/roles/{}", self.base_url, id))
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        Ok(())
    }

    fn repair_form(issue_name: &str) -> multipart::Form {
        multipart::Form::new()
            .text("issue_name", issue_name.to_string())
            .text("description", "Swing chain snapped")
            .text("urgency", "high")
    }
}

fn unique(name: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let ts = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{}-{}", name, ts)
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_health_endpoints() {
    let server = TestServer::new();

    let resp = server
        .client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = server
        .client
        .get(format!("{}/ready", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_login_rejects_bad_credentials() {
    let server = TestServer::new();
    let resp = server
        .client
        .post(format!("{}/api/v1/auth/login", server.base_url))
        .json(&json!({
            "email": "admin@localhost",
            "password": "definitely-wrong",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_guarded_routes_require_token() {
    let server = TestServer::new();

    let resp = server
        .client
        .get(format!(
            "{}/api/v1/purchase-repair/repair-requests",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = server
        .client
        .get(format!("{}/api/roles", server.base_url))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_role_lifecycle_and_permission_merge() {
    let mut server = TestServer::new();
    server.login_admin().await.unwrap();

    let name = unique("volunteer");
    let body = server
        .create_role(
            &name,
            json!([{ "module": "Purchase and Repair", "actions": ["Read"] }]),
        )
        .await
        .unwrap();
    let role_id = body["data"]["id"].as_str().unwrap().to_string();

    // Duplicate name is rejected
    let dup = server
        .create_role(&name, json!([]))
        .await;
    assert!(dup.is_err());

    // Merge a patch: same module gets its actions replaced
    let resp = server
        .client
        .put(format!("{}/api/roles/{}", server.base_url, role_id))
        .header("Authorization", server.auth_header())
        .json(&json!({
            "permissions": [
                { "module": "Purchase and Repair", "actions": ["Read", "Create"] }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    let entries = body["data"]["permissions"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0]["actions"].as_array().unwrap().len(),
        2,
        "actions replaced, not appended"
    );

    server.delete_role(&role_id).await.unwrap();

    let resp = server
        .client
        .get(format!("{}/api/roles/{}", server.base_url, role_id))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_repair_request_lifecycle_with_attachment() {
    let mut server = TestServer::new();
    server.login_admin().await.unwrap();

    // Create with one attached file
    let form = TestServer::repair_form(&unique("Broken swing"))
        .part(
            "file",
            multipart::Part::bytes(b"fake image bytes".to_vec())
                .file_name("swing.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        );
    let resp = server
        .client
        .post(format!(
            "{}/api/v1/purchase-repair/repair-requests",
            server.base_url
        ))
        .header("Authorization", server.auth_header())
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert!(status.is_success(), "create failed: {}", body);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["urgency"], "high");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["attachments"].as_array().unwrap().len(), 1);
    assert!(body["data"]["completed_at"].is_null());

    // Detail resolves uploader names on attachments
    let resp = server
        .client
        .get(format!(
            "{}/api/v1/purchase-repair/repair-requests/{}",
            server.base_url, id
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let attachment = &body["data"]["attachments"][0];
    assert_eq!(attachment["file_name"], "swing.jpg");
    assert!(attachment["uploaded_by_name"].is_string());

    // Completing sets completed_at; an update without files leaves the
    // attachment list untouched
    let form = multipart::Form::new().text("status", "completed");
    let resp = server
        .client
        .put(format!(
            "{}/api/v1/purchase-repair/repair-requests/{}",
            server.base_url, id
        ))
        .header("Authorization", server.auth_header())
        .multipart(form)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completed_at"].is_string());
    assert_eq!(body["data"]["attachments"].as_array().unwrap().len(), 1);

    // Uploading a second file appends to the list, keeping the first
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(b"fake pdf bytes".to_vec())
            .file_name("report.pdf")
            .mime_str("application/pdf")
            .unwrap(),
    );
    let resp = server
        .client
        .put(format!(
            "{}/api/v1/purchase-repair/repair-requests/{}",
            server.base_url, id
        ))
        .header("Authorization", server.auth_header())
        .multipart(form)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let attachments = body["data"]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0]["file_name"], "swing.jpg");
    assert_eq!(attachments[1]["file_name"], "report.pdf");

    // Delete, then 404
    let resp = server
        .client
        .delete(format!(
            "{}/api/v1/purchase-repair/repair-requests/{}",
            server.base_url, id
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = server
        .client
        .get(format!(
            "{}/api/v1/purchase-repair/repair-requests/{}",
            server.base_url, id
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_repair_list_pagination_envelope() {
    let mut server = TestServer::new();
    server.login_admin().await.unwrap();

    let resp = server
        .client
        .get(format!(
            "{}/api/v1/purchase-repair/repair-requests?page=1&limit=5",
            server.base_url
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 5);
    assert!(body["pagination"]["total"].is_number());
    assert!(body["pagination"]["pages"].is_number());
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_purchase_order_validation_and_filtering() {
    let mut server = TestServer::new();
    server.login_admin().await.unwrap();

    // Missing vendor_details is rejected before anything is stored
    let form = multipart::Form::new().text("machine_details", "Water pump");
    let resp = server
        .client
        .post(format!(
            "{}/api/v1/purchase-repair/purchase-orders",
            server.base_url
        ))
        .header("Authorization", server.auth_header())
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Valid create, then filter by status
    let form = multipart::Form::new()
        .text("machine_details", unique("Water pump"))
        .text("vendor_details", "AquaTech Pvt Ltd")
        .text("cost_estimate", "12500.50");
    let resp = server
        .client
        .post(format!(
            "{}/api/v1/purchase-repair/purchase-orders",
            server.base_url
        ))
        .header("Authorization", server.auth_header())
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending");

    let resp = server
        .client
        .get(format!(
            "{}/api/v1/purchase-repair/purchase-orders?status=pending",
            server.base_url
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["status"] == "pending"));

    // Cleanup
    server
        .client
        .delete(format!(
            "{}/api/v1/purchase-repair/purchase-orders/{}",
            server.base_url, id
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires running HTTP server"]
async fn test_overview_shape() {
    let mut server = TestServer::new();
    server.login_admin().await.unwrap();

    let resp = server
        .client
        .get(format!(
            "{}/api/v1/purchase-repair/overview",
            server.base_url
        ))
        .header("Authorization", server.auth_header())
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];
    assert!(data["active_repairs"].is_number());
    assert!(data["pending_orders"].is_number());
    assert!(data["completed_this_week"].is_number());
    assert!(data["budget_used"].is_number());
    let recent = data["recent_activities"].as_array().unwrap();
    assert!(recent.len() <= 10);
    for activity in recent {
        assert!(activity["kind"] == "repair" || activity["kind"] == "purchase");
    }
}
