//! Brother model and the request bodies that create or change one.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// One roster entry as stored in the `brothers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Primary key, case-sensitive
    pub nickname: String,
    pub name: String,
    /// Nickname of the big; `None` for a root of the tree
    pub big: Option<String>,
    pub year: i32,
}

/// Request body for creating a new brother.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberRequest {
    pub nickname: String,
    pub name: String,
    #[serde(default)]
    pub big: Option<String>,
    pub year: i32,
}

impl CreateMemberRequest {
    /// Validate required fields and produce the row to insert.
    pub fn validate(self) -> Result<Member, AppError> {
        let nickname = self.nickname.trim();
        if nickname.is_empty() {
            return Err(AppError::Validation("Nickname is required".to_string()));
        }
        let fields = MemberFields {
            name: self.name,
            big: self.big,
            year: self.year,
        };
        fields.into_member(nickname)
    }
}

/// Request body for updating a brother. Every field except the nickname is replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
    #[serde(default)]
    pub big: Option<String>,
    pub year: i32,
}

impl UpdateMemberRequest {
    pub fn validate(self, nickname: &str) -> Result<Member, AppError> {
        let fields = MemberFields {
            name: self.name,
            big: self.big,
            year: self.year,
        };
        fields.into_member(nickname)
    }
}

/// Request body for changing a brother's nickname.
#[derive(Debug, Clone, Deserialize)]
pub struct RekeyRequest {
    pub nickname: String,
}

impl RekeyRequest {
    pub fn validate(self) -> Result<String, AppError> {
        let nickname = self.nickname.trim();
        if nickname.is_empty() {
            return Err(AppError::Validation("New nickname is required".to_string()));
        }
        Ok(nickname.to_string())
    }
}

/// Request body for attaching an existing brother as a little.
#[derive(Debug, Clone, Deserialize)]
pub struct AddLittleRequest {
    pub little: String,
}

struct MemberFields {
    name: String,
    big: Option<String>,
    year: i32,
}

impl MemberFields {
    fn into_member(self, nickname: &str) -> Result<Member, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if self.year <= 0 {
            return Err(AppError::Validation(
                "Year must be a positive number".to_string(),
            ));
        }
        let big = normalize_big(self.big);
        if big.as_deref() == Some(nickname) {
            return Err(AppError::Validation(format!(
                "{} cannot be their own big",
                nickname
            )));
        }
        Ok(Member {
            nickname: nickname.to_string(),
            name: name.to_string(),
            big,
            year: self.year,
        })
    }
}

/// Blank bigs mean "no big".
pub fn normalize_big(big: Option<String>) -> Option<String> {
    big.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())
}
