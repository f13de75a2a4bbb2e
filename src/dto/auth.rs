use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDto {
    pub access_token: String,
    pub token_type: String,
}

impl TokenDto {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Plain acknowledgement body, e.g. `{"detail": "User followed successfully"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDto {
    pub detail: String,
}

impl MessageDto {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteStatusDto {
    pub is_favorited: bool,
}
