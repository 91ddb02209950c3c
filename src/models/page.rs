use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_ID: i64 = i32::MAX as i64;

/// `?page_id=&page_size=` 쿼리 (page_id는 1부터)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page_id: i64,
    pub page_size: i64,
}

impl PageQuery {
    pub fn into_params(self, user_id: Uuid) -> Result<PageParams, AppError> {
        if !(1..=MAX_PAGE_ID).contains(&self.page_id) {
            return Err(AppError::BadRequest(format!(
                "page_id must be between 1 and {}",
                MAX_PAGE_ID
            )));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(AppError::BadRequest(format!(
                "page_size must be between {} and {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        Ok(PageParams {
            user_id,
            limit: self.page_size,
            offset: (self.page_id - 1) * self.page_size,
        })
    }
}

/// 저장소 목록 쿼리에 넘기는 LIMIT / OFFSET
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub user_id: Uuid,
    pub limit: i64,
    pub offset: i64,
}
