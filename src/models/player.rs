use serde::{Deserialize, Serialize};

use super::PlayerId;

// Nickname of the shared automated opponent
pub const CPU_NICKNAME: &str = "cpu";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    // Login name of the linked account, none for the automated opponent
    pub user_name: Option<String>,
    pub automated: bool,
}

// Login credentials. Passwords are only ever stored as bcrypt hashes.
#[derive(Clone, Debug)]
pub struct Account {
    pub name: String,
    pub password_hash: String,
    pub admin: bool,
    pub active: bool,
}

// The struct used for receiving a sign up as json
#[derive(Deserialize, Serialize, Debug)]
pub struct SignUp {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

// The struct used to respond with an official json for the bearer token
#[derive(Deserialize, Serialize, Debug)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
