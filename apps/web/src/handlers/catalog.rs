//! Insert and remove products. Administrator only: [`AdminUser`] sends
//! everyone else to `/home` before the form body is read.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use tracing::info;

use stockroom_core::validation::{parse_product_id, ProductForm};

use super::{rerender, IdForm, PageResult};
use crate::auth::AdminUser;
use crate::pages;
use crate::AppState;

pub async fn insert_form(AdminUser(user): AdminUser) -> impl IntoResponse {
    pages::insert_page(&user, "")
}

pub async fn insert(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> PageResult {
    let render = |message: &str| pages::insert_page(&user, message);

    let product = match form.validate() {
        Ok(product) => product,
        Err(e) => return rerender(e, render),
    };

    if let Err(e) = state.db.products().insert(&product).await {
        return rerender(e, render);
    }

    info!(username = %user.username, product_id = %product.id, "Product inserted");
    Ok(Redirect::to("/home").into_response())
}

pub async fn remove_form(AdminUser(user): AdminUser) -> impl IntoResponse {
    pages::remove_page(&user, "")
}

pub async fn remove(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> PageResult {
    let id = match parse_product_id("id", &form.id) {
        Ok(id) => id,
        Err(e) => return rerender(e, |message| pages::remove_page(&user, message)),
    };

    let rows = state.db.products().remove(id).await?;
    info!(username = %user.username, product_id = %id, rows = rows, "Product removed");

    Ok(Redirect::to("/home").into_response())
}
