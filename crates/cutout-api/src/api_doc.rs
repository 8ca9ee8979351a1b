//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cutout API",
        version = "0.1.0",
        description = "Batch background removal: upload images, download a zip of transparent-background PNGs."
    ),
    paths(handlers::process::process_images),
    components(schemas(ErrorResponse)),
    tags(
        (name = "process", description = "Batch background removal")
    )
)]
pub struct ApiDoc;
