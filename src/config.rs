use serde::Deserialize;

#[derive(Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Shared announcement channel, a numeric chat id or an @username.
    pub channel: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
}
