use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{Payload, TokenError};

pub const MIN_SECRET_KEY_SIZE: usize = 32;

/// 토큰 ID 생성기
///
/// 전역 난수 상태 대신 생성자에 주입합니다. 테스트에서는 고정된 ID를 돌려주는 구현을 씁니다.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Uuid;
}

/// UUIDv4 기반 기본 생성기
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// HS256 대칭키로 토큰을 서명 / 검증합니다.
#[derive(Clone)]
pub struct TokenMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ids: Arc<dyn IdGenerator>,
}

impl TokenMaker {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        Self::with_id_generator(secret, Arc::new(RandomIds))
    }

    /// 비밀키가 32바이트보다 짧으면 첫 사용 시점이 아니라 생성 시점에 실패합니다.
    pub fn with_id_generator(
        secret: &str,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::InvalidKeySize(secret.len()));
        }

        // 만료 판정은 Payload::valid()가 담당하므로 jsonwebtoken의 exp 검사는 끕니다.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ids,
        })
    }

    pub fn create_token(
        &self,
        user_id: Uuid,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(self.ids.new_id(), user_id, duration);
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(TokenError::Sign)?;
        Ok((token, payload))
    }

    pub fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let token_data = decode::<Payload>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Invalid)?;

        token_data.claims.valid()?;
        Ok(token_data.claims)
    }
}
