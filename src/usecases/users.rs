use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::users::UserInfo;
use crate::repositories::users;

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<UserInfo> {
    match users::fetch_one(ctx, user_id).await {
        Ok(user) => Ok(UserInfo::from(user)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::UsersNotFound),
        Err(e) => unexpected(e),
    }
}
