use crate::{client::PolarClient, error::Result, types::RequestParams, types::User};
use reqwest::StatusCode;
use tracing::info;

impl PolarClient {
    /// Profile of the acting user.
    pub async fn user(&self) -> Result<User> {
        let response = self
            .get(&format!("/v3/users/{}", self.user_id()), RequestParams::bearer())
            .await?;
        self.decode(response, None).await
    }

    /// Register the acting user with this client.
    ///
    /// A user who is already registered (409) counts as registered.
    pub async fn register_user(&self) -> Result<()> {
        let response = self
            .post(
                "/v3/users",
                RequestParams::bearer().value("member-id", self.user_id()),
            )
            .await?;
        if response.status == StatusCode::CONFLICT {
            info!("AccessLink user {} is already registered", self.user_id());
            return Ok(());
        }
        self.discard(response).await?;
        info!("Registered AccessLink user {}", self.user_id());
        Ok(())
    }

    /// Remove the acting user from this client.
    pub async fn unregister_user(&self) -> Result<()> {
        let response = self
            .delete(&format!("/v3/users/{}", self.user_id()), RequestParams::bearer())
            .await?;
        self.discard(response).await?;
        info!("Unregistered AccessLink user {}", self.user_id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::PolarClient;
    use crate::config::Config;
    use crate::error::Error;
    use crate::transport::mock::MockTransport;
    use crate::types::User;
    use reqwest::Method;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>, strict: bool) -> PolarClient {
        let mut client = PolarClient::with_transport(
            Config::new("id", "secret")
                .with_host("https://api.example.test")
                .with_strict_status(strict),
            transport,
        );
        client.set_bearer("tok");
        client.set_user_id(42);
        client
    }

    #[tokio::test]
    async fn fetches_profile_of_acting_user() {
        let transport = MockTransport::new();
        transport.reply(200, r#"{"polar-user-id":42,"first-name":"Ada"}"#);

        let user = client(transport.clone(), false).user().await.unwrap();

        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "Ada");
        let (method, url, _) = transport.last_request();
        assert_eq!(method, Method::GET);
        assert_eq!(url, "https://api.example.test/v3/users/42");
        assert_eq!(transport.released(), 1);
    }

    #[tokio::test]
    async fn not_found_yields_empty_profile() {
        let transport = MockTransport::new();
        transport.reply(404, "");

        let user = client(transport.clone(), false).user().await.unwrap();

        assert_eq!(user, User::default());
        assert_eq!(transport.released(), 1);
    }

    #[tokio::test]
    async fn register_posts_member_id_as_json() {
        let transport = MockTransport::new();
        transport.reply(200, r#"{"polar-user-id":42}"#);

        client(transport.clone(), false).register_user().await.unwrap();

        let (method, url, body) = transport.last_request();
        assert_eq!(method, Method::POST);
        assert_eq!(url, "https://api.example.test/v3/users");
        let body: Value = serde_json::from_slice(&body.unwrap()).unwrap();
        assert_eq!(body, json!({"member-id": 42}));
        assert_eq!(transport.released(), 1);
    }

    #[tokio::test]
    async fn already_registered_user_is_not_an_error() {
        let transport = MockTransport::new();
        transport.reply(409, "already registered");
        transport.reply(409, "already registered");

        client(transport.clone(), false).register_user().await.unwrap();
        client(transport.clone(), true).register_user().await.unwrap();

        assert_eq!(transport.released(), 2);
    }

    #[tokio::test]
    async fn register_rejection_is_an_error_only_when_strict() {
        let transport = MockTransport::new();
        transport.reply(400, "bad member id");
        transport.reply(400, "bad member id");

        client(transport.clone(), false).register_user().await.unwrap();
        let err = client(transport.clone(), true)
            .register_user()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnexpectedStatus { status: 400, .. }));
        assert_eq!(transport.released(), 2);
    }

    #[tokio::test]
    async fn unregister_deletes_without_body() {
        let transport = MockTransport::new();
        transport.reply(204, "");

        client(transport.clone(), true).unregister_user().await.unwrap();

        let (method, url, body) = transport.last_request();
        assert_eq!(method, Method::DELETE);
        assert_eq!(url, "https://api.example.test/v3/users/42");
        assert!(body.is_none());
        assert_eq!(transport.released(), 1);
    }

    #[tokio::test]
    async fn transport_failure_releases_nothing() {
        let transport = MockTransport::new();
        transport.fail("timed out");

        let err = client(transport.clone(), false).unregister_user().await;

        assert!(matches!(err, Err(Error::Transport(_))));
        assert_eq!(transport.opened(), 0);
        assert_eq!(transport.released(), 0);
    }
}
