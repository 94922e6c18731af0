use serde::{Deserialize, Serialize};

/// Request body for user registration. Wire names follow the public API
/// contract, which is in Spanish.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    #[serde(rename = "usuario")]
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "mensaje")]
    pub message: &'static str,
    #[serde(rename = "usuario")]
    pub user_name: String,
}

/// Public projection of a user, as returned by the listing endpoint.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
}
