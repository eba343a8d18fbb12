use std::sync::Arc;

use tracing::{debug, warn};

use opencrm_core::{ApiError, ErrorBody, Notifier, is_auth_failure, new_id};
use opencrm_state::SessionService;

use crate::config::ClientConfig;
use crate::endpoints;
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError,
};

/// Central API gateway.
///
/// Every request goes through one pipeline: join the endpoint onto the
/// base URL, attach the session bearer token, apply the fixed timeout,
/// then classify the outcome. Credential failures (expired/invalid
/// token, auth-tagged 500s) schedule a delayed session teardown;
/// 403s surface the server message and leave the session alone.
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionService>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
            notifier,
        }
    }

    /// Client speaking real HTTP.
    pub fn over_http(
        config: ClientConfig,
        session: Arc<SessionService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(config, Arc::new(ReqwestTransport::new()), session, notifier)
    }

    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, ApiError> {
        self.request(Method::Get, endpoint, query.to_vec(), None)
            .await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.request(Method::Post, endpoint, Vec::new(), Some(body))
            .await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.request(Method::Put, endpoint, Vec::new(), Some(body))
            .await
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.request(Method::Patch, endpoint, Vec::new(), Some(body))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<serde_json::Value, ApiError> {
        self.request(Method::Delete, endpoint, Vec::new(), None)
            .await
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: Vec<(String, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ApiError> {
        let url = endpoints::join(&self.config.base_url, endpoint);
        let request = HttpRequest {
            method,
            url: url.clone(),
            query,
            body,
            bearer: self.session.token(),
            timeout: self.config.timeout,
        };

        let request_id = new_id();
        debug!(request_id = %request_id, method = method.as_str(), url = %url, "api request");

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|err| match err {
                TransportError::Timeout => ApiError::Timeout,
                TransportError::Connect(msg) => ApiError::Network(msg),
            })?;

        if response.is_success() {
            debug!(request_id = %request_id, status = response.status, "api response");
            return Ok(response.body);
        }
        self.fail(&request_id, response)
    }

    fn fail(&self, request_id: &str, response: HttpResponse) -> Result<serde_json::Value, ApiError> {
        let body = ErrorBody::from_value(&response.body);
        warn!(
            request_id = %request_id,
            status = response.status,
            message = body.message.as_deref().unwrap_or(""),
            "api request failed"
        );

        if is_auth_failure(response.status, &body) {
            self.schedule_teardown();
        }
        let error = ApiError::from_status(response.status, body);
        if let ApiError::Forbidden { message } = &error {
            self.notifier.error(message);
        }
        Err(error)
    }

    /// Tear the session down shortly, not immediately, so responses
    /// already in flight resolve against a consistent session. The
    /// teardown itself is idempotent, so a burst of failures collapses
    /// into one.
    fn schedule_teardown(&self) {
        let session = self.session.clone();
        let delay = self.config.teardown_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if session.teardown() {
                debug!("session torn down after credential failure");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use opencrm_core::{CollectingNotifier, SessionUser, TenancyRole};
    use opencrm_state::{LOGIN_ROUTE, MemorySessionStorage, StateStore};

    use crate::transport::ScriptedTransport;

    fn test_user() -> SessionUser {
        SessionUser {
            id: 1,
            name: "Test".to_string(),
            email: None,
            status: None,
            avatar: None,
            role: TenancyRole::CompanyAdmin,
            roles: vec![],
            permissions: vec![],
            company_id: None,
        }
    }

    struct Rig {
        transport: Arc<ScriptedTransport>,
        notifier: Arc<CollectingNotifier>,
        session: Arc<SessionService>,
        client: ApiClient,
    }

    fn rig() -> Rig {
        let store = Arc::new(StateStore::new());
        let session = Arc::new(SessionService::new(
            store,
            Arc::new(MemorySessionStorage::new()),
        ));
        let transport = Arc::new(ScriptedTransport::new());
        let notifier = Arc::new(CollectingNotifier::new());
        let config = ClientConfig::default()
            .base_url("http://api.test/api")
            .teardown_delay(Duration::from_millis(5));
        let client = ApiClient::new(
            config,
            transport.clone(),
            session.clone(),
            notifier.clone(),
        );
        Rig {
            transport,
            notifier,
            session,
            client,
        }
    }

    fn logged_in_rig() -> Rig {
        let r = rig();
        r.session.login(test_user(), "tok-1");
        r
    }

    #[tokio::test]
    async fn get_joins_url_and_attaches_bearer() {
        let r = logged_in_rig();
        r.transport.push_response(200, json!({"data": []}));

        let out = r
            .client
            .get("leads", &[("page".to_string(), "2".to_string())])
            .await
            .unwrap();
        assert_eq!(out, json!({"data": []}));

        let seen = r.transport.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://api.test/api/leads");
        assert_eq!(seen[0].bearer.as_deref(), Some("tok-1"));
        assert_eq!(seen[0].query, vec![("page".to_string(), "2".to_string())]);
    }

    #[tokio::test]
    async fn no_bearer_when_logged_out() {
        let r = rig();
        r.transport.push_response(200, json!([]));

        r.client.get("roles", &[]).await.unwrap();
        assert_eq!(r.transport.requests()[0].bearer, None);
    }

    #[tokio::test]
    async fn forbidden_notifies_verbatim_and_keeps_session() {
        let r = logged_in_rig();
        r.transport
            .push_response(403, json!({"message": "IP address not allowed"}));

        let err = r.client.get("leads", &[]).await.unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(r.notifier.messages(), vec!["IP address not allowed"]);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(r.session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_token_tears_down_after_the_delay() {
        let r = logged_in_rig();
        let teardowns = Arc::new(AtomicU64::new(0));
        let teardowns_c = teardowns.clone();
        r.session.on_teardown(move || {
            teardowns_c.fetch_add(1, Ordering::Relaxed);
        });
        r.transport
            .push_response(401, json!({"message": "Token has expired"}));

        let err = r.client.get("leads", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        // Still intact inside the grace period.
        assert!(r.session.is_authenticated());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!r.session.is_authenticated());
        assert_eq!(r.session.route(), LOGIN_ROUTE);
        assert_eq!(teardowns.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_credential_failures_tear_down_once() {
        let r = logged_in_rig();
        let teardowns = Arc::new(AtomicU64::new(0));
        let teardowns_c = teardowns.clone();
        r.session.on_teardown(move || {
            teardowns_c.fetch_add(1, Ordering::Relaxed);
        });
        r.transport
            .push_response(401, json!({"message": "Token has expired"}));
        r.transport
            .push_response(401, json!({"message": "Invalid token"}));

        let _ = r.client.get("leads", &[]).await;
        let _ = r.client.get("users", &[]).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(teardowns.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn plain_401_does_not_tear_down() {
        let r = logged_in_rig();
        r.transport
            .push_response(401, json!({"message": "bad credentials"}));

        let err = r.client.get("leads", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(r.session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn auth_tagged_500_tears_down_but_plain_500_does_not() {
        let r = logged_in_rig();
        r.transport.push_response(
            500,
            json!({"message": "Server Error", "exception": "App\\Exceptions\\AuthenticationException"}),
        );
        let _ = r.client.get("leads", &[]).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!r.session.is_authenticated());

        let r = logged_in_rig();
        r.transport
            .push_response(500, json!({"message": "db connection lost"}));
        let err = r.client.get("leads", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(r.session.is_authenticated());
    }

    #[tokio::test]
    async fn transport_errors_map_to_typed_failures() {
        let r = rig();
        r.transport.push_error(TransportError::Timeout);
        r.transport
            .push_error(TransportError::Connect("refused".to_string()));

        let err = r.client.get("leads", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout));

        let err = r.client.get("leads", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn validation_failure_keeps_the_field_map() {
        let r = logged_in_rig();
        r.transport.push_response(
            422,
            json!({
                "message": "The given data was invalid.",
                "errors": {"email": ["The email field is required."]}
            }),
        );

        let err = r.client.post("users", json!({"name": "x"})).await.unwrap_err();
        match err {
            ApiError::Validation { errors, .. } => {
                assert_eq!(errors["email"], vec!["The email field is required."]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_sends_the_json_body() {
        let r = logged_in_rig();
        r.transport.push_response(201, json!({"id": 9}));

        r.client
            .post("leads", json!({"name": "New lead"}))
            .await
            .unwrap();

        let seen = r.transport.requests();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].body, Some(json!({"name": "New lead"})));
    }
}
