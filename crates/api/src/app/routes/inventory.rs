use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use shelfkeeper_auth::Permission;
use shelfkeeper_core::ItemId;
use shelfkeeper_inventory::{AdjustStock, NewItem, SourcePlatform};

use crate::app::routes::common::{CmdAuth, page_limit};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id/adjustments", get(item_history))
}

fn parse_item_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"))
}

/// `POST /adjust`
pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::AdjustRequest>,
) -> axum::response::Response {
    let item_id = match parse_item_id(&body.item_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let cmd = AdjustStock {
        item_id,
        delta: body.delta,
        reason: body.reason,
        note: body.note,
        actor_id: actor.actor_id(),
        source_platform: body.source_platform.unwrap_or(SourcePlatform::Api),
    };

    let cmd_auth = CmdAuth::new(cmd, Permission::INVENTORY_ADJUST);
    if let Err(e) = crate::authz::authorize_command(&actor, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.ledger.apply_adjustment(cmd_auth.inner).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(dto::AdjustResponse {
                item_id,
                entry_id: outcome.entry.id,
                new_quantity: outcome.new_quantity,
                stock_level: outcome.stock_level,
                threshold: outcome.threshold,
            }),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let input = NewItem {
        title: body.title,
        isbn: body.isbn,
        low_stock_threshold_override: body.low_stock_threshold_override,
    };

    let cmd_auth = CmdAuth::new(input, Permission::INVENTORY_ITEMS_CREATE);
    if let Err(e) = crate::authz::authorize_command(&actor, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.catalog.create_item(cmd_auth.inner, actor.actor_id()).await {
        Ok(item) => (
            StatusCode::CREATED,
            Json(dto::ItemView::from_item(
                &item,
                services.ledger.thresholds(),
                services.blobs.as_ref(),
            )),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&actor, Permission::INVENTORY_READ) {
        return resp;
    }

    match services.ledger.items().await {
        Ok(items) => {
            let views: Vec<_> = items
                .iter()
                .map(|i| dto::ItemView::from_item(i, services.ledger.thresholds(), services.blobs.as_ref()))
                .collect();
            Json(views).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&actor, Permission::INVENTORY_READ) {
        return resp;
    }
    let item_id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.ledger.item(item_id).await {
        Ok(item) => Json(dto::ItemView::from_item(
            &item,
            services.ledger.thresholds(),
            services.blobs.as_ref(),
        ))
        .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// Adjustment entries of one item, newest first.
pub async fn item_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Query(query): Query<dto::LimitQuery>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&actor, Permission::INVENTORY_READ) {
        return resp;
    }
    let item_id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services
        .ledger
        .history(item_id, page_limit(query.limit, 50, 500))
        .await
    {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
