use crate::{error::AppError, model::UserView, store::Store};
use actix_web::{HttpResponse, web};

/// Every registered user. Password hashes are left out of the payload.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserView>)
    ),
    tag = "User"
)]
pub async fn list_users(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserView> = store
        .list_users()
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}
