//! Mock Telegram API Server for testing
//!
//! This module provides a mock HTTP server that simulates the Telegram Bot API
//! for testing purposes. It uses wiremock to create configurable mock responses.

use serde_json::{json, Value};
use teloxide::Bot;
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, ResponseTemplate,
};

/// Mock Telegram API server for testing
pub struct TelegramMockServer {
    pub server: MockServer,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockResponseConfig {
    pub status: u16,
    pub delay_ms: Option<u64>,
    pub body: Value,
}

impl MockResponseConfig {
    pub fn ok(result: Value) -> Self {
        Self {
            status: 200,
            delay_ms: None,
            body: json!({ "ok": true, "result": result }),
        }
    }

    pub fn error(status: u16, description: &str) -> Self {
        Self {
            status,
            delay_ms: None,
            body: json!({ "ok": false, "error_code": status, "description": description }),
        }
    }

    fn into_response(self) -> ResponseTemplate {
        let mut response = ResponseTemplate::new(self.status).set_body_json(self.body);
        if let Some(delay) = self.delay_ms {
            response = response.set_delay(std::time::Duration::from_millis(delay));
        }
        response
    }
}

impl TelegramMockServer {
    /// Create a new mock Telegram API server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// A bot talking to this server
    pub fn bot(&self) -> Bot {
        let url = url::Url::parse(&self.server.uri()).unwrap();
        Bot::new(test_bot_token()).set_api_url(url)
    }

    /// Mount a response for a Bot API method, matched case-insensitively.
    /// The token contains no regex metacharacters.
    pub async fn mock_method(&self, api_method: &str, config: MockResponseConfig) {
        let pattern = format!("(?i)^/bot{}/{}$", test_bot_token(), api_method);
        Mock::given(method("POST"))
            .and(path_regex(pattern))
            .respond_with(config.into_response())
            .mount(&self.server)
            .await;
    }

    /// Setup mock for sendMessage endpoint
    pub async fn mock_send_message(&self, config: MockResponseConfig) {
        self.mock_method("sendMessage", config).await;
    }

    /// A successful sendMessage answer addressed to `chat_id`
    pub fn sent_message(chat_id: i64) -> MockResponseConfig {
        MockResponseConfig::ok(json!({
            "message_id": 123,
            "from": {
                "id": 12345,
                "is_bot": true,
                "first_name": "Shamebot",
                "username": "shame_bot"
            },
            "chat": {
                "id": chat_id,
                "type": "private",
                "first_name": "Admin"
            },
            "date": 1700000000,
            "text": "Test message"
        }))
    }

    /// Setup mock for getChatAdministrators returning the chat owner only
    pub async fn mock_chat_owner(&self, owner_id: i64, owner_username: &str) {
        let config = MockResponseConfig::ok(json!([{
            "status": "creator",
            "user": {
                "id": owner_id,
                "is_bot": false,
                "first_name": "Owner",
                "username": owner_username
            },
            "is_anonymous": false
        }]));
        self.mock_method("getChatAdministrators", config).await;
    }

    /// Number of requests received for a Bot API method
    pub async fn calls_to(&self, api_method: &str) -> usize {
        let suffix = format!("/{}", api_method.to_lowercase());
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path().to_lowercase().ends_with(&suffix))
            .count()
    }
}

/// Helper function to create a test bot token
pub fn test_bot_token() -> String {
    "12345:test_token".to_string()
}
