use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::StoreClientError;
use crate::model::User;

const USERS: &str = "usuarios";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    #[serde(rename = "senha")]
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    #[serde(rename = "nome")]
    name: &'a str,
    email: &'a str,
    #[serde(rename = "senha")]
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "usuario")]
    user: User,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreClientError> {
        let url = self.api.endpoint(&[USERS, "login"])?;
        let body = LoginRequest { email, password };
        let auth: AuthResponse = ApiClient::send(self.api.post(url).json(&body)).await?;
        info!(user_id = %auth.user.id, "logged in");
        Ok(auth.user)
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, StoreClientError> {
        let url = self.api.endpoint(&[USERS])?;
        let body = RegisterRequest {
            name,
            email,
            password,
        };
        let auth: AuthResponse = ApiClient::send(self.api.post(url).json(&body)).await?;
        info!(user_id = %auth.user.id, "registered");
        Ok(auth.user)
    }
}
