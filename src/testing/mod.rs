//! Test harness: the full router over in-memory stores, driven with `oneshot`.

pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::app::{build_router, AppState};
use crate::auth::PasswordHasher;
use crate::config::AppConfig;
use crate::database::Repositories;
use crate::storage::LocalDocumentStore;
use memory::{MemoryAccounts, MemoryInvestments, MemoryPolicies, MemorySessions, MemoryTenants};

pub const MULTIPART_BOUNDARY: &str = "fintrack-test-boundary";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub raw: Vec<u8>,
}

impl TestResponse {
    /// `name=value` part of the Set-Cookie header, ready to send back
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

pub struct TestContext {
    router: Router,
    pub sessions: Arc<MemorySessions>,
    uploads: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let uploads =
            std::env::temp_dir().join(format!("fintrack-uploads-{}", uuid::Uuid::new_v4().simple()));
        let sessions = Arc::new(MemorySessions::default());
        let repos = Repositories {
            tenants: Arc::new(MemoryTenants::default()),
            accounts: Arc::new(MemoryAccounts::default()),
            policies: Arc::new(MemoryPolicies::default()),
            investments: Arc::new(MemoryInvestments::default()),
            sessions: sessions.clone(),
        };

        let config = AppConfig::development();
        let state = AppState::new(
            repos,
            Arc::new(LocalDocumentStore::new(&uploads)),
            PasswordHasher::new(8, 1).unwrap(),
            &config.session,
            &config.password,
        );

        Self {
            router: build_router(state, &config),
            sessions,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let raw = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        TestResponse { status, headers, body, raw }
    }

    pub async fn call(&self, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(cookie), None).await
    }

    pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(cookie), Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(cookie), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> TestResponse {
        self.call(Method::DELETE, uri, Some(cookie), None).await
    }

    /// Register and return (session cookie, account id)
    pub async fn register(&self, email: &str, domain: &str) -> (String, String) {
        let response = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": "secret123", "domain": domain })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        let id = response.data()["id"].as_str().unwrap().to_string();
        (response.cookie().unwrap(), id)
    }

    pub async fn multipart(&self, method: Method, uri: &str, cookie: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads);
    }
}

/// Encode text fields plus an optional `(file name, content type, bytes)` document part
pub fn multipart_body(fields: &[(&str, &str)], document: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = document {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn policy_json(provider: &str) -> Value {
    json!({
        "provider": provider,
        "policyName": "Home cover",
        "policyType": "Property",
        "country": "Sweden",
        "startDate": "2024-01-01",
        "premium": "1200",
        "premiumCurrency": "SEK",
        "premiumFrequency": "yearly"
    })
}

pub fn investment_json(currency: &str, current_value: &str) -> Value {
    json!({
        "type": "Stocks",
        "platform": "Avanza",
        "country": "Sweden",
        "currency": currency,
        "initialAmount": "10",
        "currentValue": current_value
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn first_account_of_a_domain_is_admin() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let (bob, _) = ctx.register("bob@acme.com", "acme.com").await;

        let me = ctx.get("/api/auth/me", &alice).await;
        assert_eq!(me.data()["role"], "admin");
        assert_eq!(me.data()["domain"], "acme.com");
        let me = ctx.get("/api/auth/me", &bob).await;
        assert_eq!(me.data()["role"], "user");

        let members = ctx.get("/api/admin/users", &alice).await;
        assert_eq!(members.status, StatusCode::OK);
        assert_eq!(members.data().as_array().unwrap().len(), 2);

        let denied = ctx.get("/api/admin/users", &bob).await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
        assert_eq!(denied.body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let ctx = TestContext::new();
        ctx.register("alice@acme.com", "acme.com").await;
        let again = ctx
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": "ALICE@acme.com", "password": "secret123", "domain": "acme.com" })),
            )
            .await;
        assert_eq!(again.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn login_uses_one_message_for_every_failure() {
        let ctx = TestContext::new();
        ctx.register("alice@acme.com", "acme.com").await;

        let wrong = ctx
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "alice@acme.com", "password": "nope-nope" })),
            )
            .await;
        let unknown = ctx
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "nobody@acme.com", "password": "secret123" })),
            )
            .await;
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.body["error"], unknown.body["error"]);

        let ok = ctx
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "alice@acme.com", "password": "secret123" })),
            )
            .await;
        assert_eq!(ok.status, StatusCode::OK);
        assert!(ok.cookie().is_some());
    }

    #[tokio::test]
    async fn protected_routes_need_a_live_session() {
        let ctx = TestContext::new();
        let anonymous = ctx.call(Method::GET, "/api/policies", None, None).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
        assert_eq!(anonymous.body["success"], false);

        let forged = ctx.get("/api/policies", "fintrack_session=not-a-token").await;
        assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

        let admin = ctx.call(Method::GET, "/api/admin/users", None, None).await;
        assert_eq!(admin.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_kills_the_session() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;

        let first = ctx.post("/api/auth/logout", &alice, json!({})).await;
        assert_eq!(first.status, StatusCode::OK);
        let second = ctx.post("/api/auth/logout", &alice, json!({})).await;
        assert_eq!(second.status, StatusCode::OK);
        let anonymous = ctx.call(Method::POST, "/api/auth/logout", None, None).await;
        assert_eq!(anonymous.status, StatusCode::OK);

        assert_eq!(ctx.get("/api/auth/me", &alice).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(ctx.sessions.len(), 0);
    }

    #[tokio::test]
    async fn records_are_invisible_across_tenants() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let (carol, _) = ctx.register("carol@other.org", "other.org").await;

        let created = ctx.post("/api/policies", &alice, policy_json("If")).await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        let id = created.data()["id"].as_str().unwrap().to_string();

        let uri = format!("/api/policies/{id}");
        assert_eq!(ctx.get(&uri, &carol).await.status, StatusCode::NOT_FOUND);
        assert_eq!(
            ctx.put(&uri, &carol, json!({ "provider": "Stolen" })).await.status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(ctx.delete(&uri, &carol).await.status, StatusCode::NOT_FOUND);
        assert!(ctx.get("/api/policies", &carol).await.data().as_array().unwrap().is_empty());

        let own = ctx.get(&uri, &alice).await;
        assert_eq!(own.status, StatusCode::OK);
        assert_eq!(own.data()["provider"], "If");
        assert_eq!(own.data()["status"], "active");
    }

    #[tokio::test]
    async fn members_of_one_tenant_share_records() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let (bob, _) = ctx.register("bob@acme.com", "acme.com").await;

        let by_bob = ctx.post("/api/policies", &bob, policy_json("Folksam")).await;
        assert_eq!(by_bob.status, StatusCode::CREATED, "{}", by_bob.body);
        let seen = ctx.get("/api/policies", &alice).await;
        assert_eq!(seen.status, StatusCode::OK);
        let providers: Vec<&str> = seen
            .data()
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["provider"].as_str().unwrap())
            .collect();
        assert_eq!(providers, vec!["Folksam"]);

        let by_alice = ctx.post("/api/policies", &alice, policy_json("If")).await;
        assert_eq!(by_alice.status, StatusCode::CREATED, "{}", by_alice.body);
        let seen = ctx.get("/api/policies", &bob).await;
        let mut providers: Vec<&str> = seen
            .data()
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["provider"].as_str().unwrap())
            .collect();
        providers.sort_unstable();
        assert_eq!(providers, vec!["Folksam", "If"]);

        let id = by_alice.data()["id"].as_str().unwrap();
        let fetched = ctx.get(&format!("/api/policies/{id}"), &bob).await;
        assert_eq!(fetched.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn numeric_premiums_are_stored_exactly() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;

        let mut body = policy_json("If").to_string();
        body = body.replace(r#""premium":"1200""#, r#""premium":1234567.1234567891234"#);
        assert!(body.contains("1234567.1234567891234"));

        let created = ctx
            .send(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/policies")
                    .header(header::COOKIE, &alice)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        assert_eq!(
            dec(&created.data()["premium"]),
            "1234567.1234567891234".parse::<Decimal>().unwrap()
        );
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        assert_eq!(ctx.get("/api/policies/123", &alice).await.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.get("/api/investments/abc", &alice).await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validation_errors_name_the_field() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;

        let mut body = policy_json("If");
        body["provider"] = json!("   ");
        let rejected = ctx.post("/api/policies", &alice, body).await;
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert!(rejected.body["fieldErrors"]["provider"].is_string());

        let bad_json = ctx
            .send(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/investments")
                    .header(header::COOKIE, &alice)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await;
        assert_eq!(bad_json.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let created = ctx.post("/api/investments", &alice, investment_json("SEK", "100")).await;
        let id = created.data()["id"].as_str().unwrap().to_string();

        let updated = ctx
            .put(&format!("/api/investments/{id}"), &alice, json!({ "currentValue": "150.5" }))
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(dec(&updated.data()["currentValue"]), "150.5".parse::<Decimal>().unwrap());
        assert_eq!(updated.data()["platform"], "Avanza");
        assert_eq!(updated.data()["type"], "Stocks");
    }

    #[tokio::test]
    async fn stats_bucket_sek_and_inr_only() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        for (currency, value) in [("SEK", "100"), ("SEK", "25.50"), ("INR", "50"), ("USD", "70")] {
            let created = ctx.post("/api/investments", &alice, investment_json(currency, value)).await;
            assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        }
        ctx.post("/api/policies", &alice, policy_json("If")).await;

        let stats = ctx.get("/api/dashboard/stats", &alice).await;
        assert_eq!(stats.status, StatusCode::OK);
        let data = stats.data();
        assert_eq!(data["totalPolicies"], 1);
        assert_eq!(data["totalInvestments"], 4);
        assert_eq!(dec(&data["investmentsByCurrency"]["SEK"]), "125.50".parse::<Decimal>().unwrap());
        assert_eq!(dec(&data["investmentsByCurrency"]["INR"]), Decimal::from(50));
    }

    #[tokio::test]
    async fn yearly_premium_is_split_monthly() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        ctx.post("/api/policies", &alice, policy_json("If")).await;

        let analytics = ctx.get("/api/dashboard/analytics", &alice).await;
        assert_eq!(analytics.status, StatusCode::OK);
        let premium = &analytics.data()["premiumsByProvider"][0];
        assert_eq!(premium["provider"], "If");
        assert_eq!(dec(&premium["monthlyPremium"]), Decimal::from(100));
        assert_eq!(dec(&premium["yearlyPremium"]), Decimal::from(1200));
    }

    #[tokio::test]
    async fn admins_cannot_demote_or_remove_themselves() {
        let ctx = TestContext::new();
        let (alice, alice_id) = ctx.register("alice@acme.com", "acme.com").await;

        let demote = ctx
            .put(&format!("/api/admin/users/{alice_id}/role"), &alice, json!({ "role": "user" }))
            .await;
        assert_eq!(demote.status, StatusCode::FORBIDDEN);

        let remove = ctx.delete(&format!("/api/admin/users/{alice_id}"), &alice).await;
        assert_eq!(remove.status, StatusCode::FORBIDDEN);

        let bogus = ctx
            .put(&format!("/api/admin/users/{alice_id}/role"), &alice, json!({ "role": "owner" }))
            .await;
        assert_eq!(bogus.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn promotion_takes_effect_on_the_next_request() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let (bob, bob_id) = ctx.register("bob@acme.com", "acme.com").await;

        let promoted = ctx
            .put(&format!("/api/admin/users/{bob_id}/role"), &alice, json!({ "role": "admin" }))
            .await;
        assert_eq!(promoted.status, StatusCode::OK);
        assert_eq!(promoted.data()["role"], "admin");

        assert_eq!(ctx.get("/api/admin/users", &bob).await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn removed_members_lose_their_sessions() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let (bob, bob_id) = ctx.register("bob@acme.com", "acme.com").await;

        let removed = ctx.delete(&format!("/api/admin/users/{bob_id}"), &alice).await;
        assert_eq!(removed.status, StatusCode::OK);
        assert_eq!(ctx.get("/api/auth/me", &bob).await.status, StatusCode::UNAUTHORIZED);

        let members = ctx.get("/api/admin/users", &alice).await;
        assert_eq!(members.data().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn password_change_checks_the_current_password() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;

        let wrong = ctx
            .put(
                "/api/auth/password",
                &alice,
                json!({ "currentPassword": "wrong-one", "newPassword": "another123" }),
            )
            .await;
        assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
        assert!(wrong.body["fieldErrors"]["currentPassword"].is_string());

        let ok = ctx
            .put(
                "/api/auth/password",
                &alice,
                json!({ "currentPassword": "secret123", "newPassword": "another123" }),
            )
            .await;
        assert_eq!(ok.status, StatusCode::OK);

        let login = ctx
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "alice@acme.com", "password": "another123" })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn multipart_upload_round_trips_the_document() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;

        let body = multipart_body(
            &[
                ("provider", "Folksam"),
                ("policyName", "Car"),
                ("policyType", "Vehicle"),
                ("country", "Sweden"),
                ("startDate", "2024-03-01"),
                ("premium", "300"),
                ("premiumFrequency", "monthly"),
            ],
            Some(("terms.pdf", "application/pdf", b"%PDF-1.4 terms")),
        );
        let created = ctx.multipart(Method::POST, "/api/policies", &alice, body).await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        let id = created.data()["id"].as_str().unwrap().to_string();
        assert!(created.data()["document"].as_str().unwrap().ends_with("terms.pdf"));

        let download = ctx.get(&format!("/api/policies/{id}/document"), &alice).await;
        assert_eq!(download.status, StatusCode::OK);
        assert_eq!(download.raw, b"%PDF-1.4 terms");
        assert_eq!(download.headers[header::CONTENT_TYPE], "application/pdf");
        assert!(download.headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("terms.pdf"));

        // an empty file part leaves the attachment alone
        let body = multipart_body(&[("notes", "renewed")], Some(("", "application/octet-stream", b"")));
        let updated = ctx
            .multipart(Method::PUT, &format!("/api/policies/{id}"), &alice, body)
            .await;
        assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
        assert_eq!(updated.data()["notes"], "renewed");
        assert_eq!(updated.data()["document"], created.data()["document"]);
    }

    #[tokio::test]
    async fn policies_without_document_have_nothing_to_download() {
        let ctx = TestContext::new();
        let (alice, _) = ctx.register("alice@acme.com", "acme.com").await;
        let created = ctx.post("/api/policies", &alice, policy_json("If")).await;
        let id = created.data()["id"].as_str().unwrap().to_string();

        let download = ctx.get(&format!("/api/policies/{id}/document"), &alice).await;
        assert_eq!(download.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_banner_are_public() {
        let ctx = TestContext::new();
        let health = ctx.call(Method::GET, "/health", None, None).await;
        assert_eq!(health.status, StatusCode::OK);
        assert_eq!(health.data()["status"], "ok");

        let root = ctx.call(Method::GET, "/", None, None).await;
        assert_eq!(root.data()["name"], "fintrack-api");

        let missing = ctx.call(Method::GET, "/nowhere", None, None).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }
}
