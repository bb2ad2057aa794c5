//! CSV import/export records.

use serde::{Deserialize, Serialize};

use super::{CreateMemberRequest, Member};
use crate::errors::AppError;

/// One CSV row: `nickname,name,big,year`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRecord {
    pub nickname: String,
    pub name: String,
    #[serde(default)]
    pub big: Option<String>,
    pub year: i32,
}

impl CsvRecord {
    /// Apply the same validation as `POST /api/brothers`.
    pub fn validate(self) -> Result<Member, AppError> {
        CreateMemberRequest {
            nickname: self.nickname,
            name: self.name,
            big: self.big,
            year: self.year,
        }
        .validate()
    }
}

impl From<Member> for CsvRecord {
    fn from(member: Member) -> Self {
        Self {
            nickname: member.nickname,
            name: member.name,
            big: member.big,
            year: member.year,
        }
    }
}

/// Outcome of a batch import. Failed rows do not stop the batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<String>,
}
