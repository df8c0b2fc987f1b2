use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    /// The single guild this bot manages
    pub guild_id: u64,
    pub welcome_channel_id: u64,
    pub chat_channel_id: u64,
    pub verify_channel_id: u64,
    pub verified_role_id: u64,
    pub unverified_role_id: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            database_url: required("DATABASE_URL")?,
            guild_id: required_id("GUILD_ID")?,
            welcome_channel_id: required_id("WELCOME_CHANNEL_ID")?,
            chat_channel_id: required_id("CHAT_CHANNEL_ID")?,
            verify_channel_id: required_id("VERIFY_CHANNEL_ID")?,
            verified_role_id: required_id("VERIFIED_ROLE_ID")?,
            unverified_role_id: required_id("UNVERIFIED_ROLE_ID")?,
        })
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{name} environment variable not set"))
}

fn required_id(name: &str) -> Result<u64, String> {
    required(name)?
        .parse::<u64>()
        .map_err(|_| format!("{name} must be a numeric Discord id"))
}
