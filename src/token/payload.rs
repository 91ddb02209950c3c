use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TokenError;

/// 토큰에 담기는 클레임
///
/// `id`는 토큰마다 새로 발급되며, refresh 토큰의 경우 세션의 기본키로 저장됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub id: Uuid,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    pub fn new(id: Uuid, user_id: Uuid, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            issued_at: now,
            expires_at: now + duration,
        }
    }

    /// 현재 시각이 `expires_at`을 지났으면 `TokenError::Expired`.
    pub fn valid(&self) -> Result<(), TokenError> {
        if Utc::now() > self.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}
