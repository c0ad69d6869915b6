//! OpenAPI description served at `/openapi.json`.

use crate::handlers::{common, items};
use crate::model::{Item, ItemCreate, ItemUpdate};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "item-service",
        description = "CRUD operations for items with pagination and name search, plus health checks."
    ),
    paths(
        common::root,
        common::health,
        common::ready,
        common::version,
        items::create,
        items::list,
        items::read,
        items::update,
        items::delete,
        items::search,
    ),
    components(schemas(Item, ItemCreate, ItemUpdate)),
    tags(
        (name = "root", description = "Welcome message and service status"),
        (name = "items", description = "Item CRUD, pagination, and search"),
    )
)]
pub struct ApiDoc;
