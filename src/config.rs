use std::net::SocketAddr;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
}

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the comment API binds to.
    pub addr: SocketAddr,
    /// Name of this instance, used in feed ids and moderation mails.
    pub instance_name: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// Value of the `Access-Control-Allow-Origin` header on public responses.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Public base URL used in moderation links. When unset, the URL is
    /// derived from the forwarded scheme and host of the inbound request.
    pub service_url: Option<String>,
    pub notify: Option<NotifyConfig>,
}

/// Settings for the moderation-mail gateway.
#[derive(Deserialize, Clone)]
pub struct NotifyConfig {
    pub gateway_url: String,
    pub sender: String,
    pub recipient: String,
}

fn default_database() -> String {
    "sqlite://comments.db".to_string()
}

fn default_cors_origin() -> String {
    "*".to_string()
}
