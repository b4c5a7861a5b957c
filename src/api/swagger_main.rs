use crate::dto;
use utoipa::OpenApi;
use utoipa::openapi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Todo REST API",
    description = "Users and the todos they own, stored in PostgreSQL"
))]
struct TodoRestApi;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_documentation(api_prefix: &str) -> SwaggerUi {
    let mut api_docs = TodoRestApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(under_prefix(api_prefix, super::user::UsersApi::openapi()));
    api_docs.merge(under_prefix(api_prefix, super::todo::TodoApi::openapi()));
    api_docs.merge(super::health::HealthApi::openapi());

    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_docs)
}

/// Resource routes are nested under a configurable prefix, so their documented paths are too
fn under_prefix(api_prefix: &str, mut docs: openapi::OpenApi) -> openapi::OpenApi {
    docs.paths.paths = std::mem::take(&mut docs.paths.paths)
        .into_iter()
        .map(|(path, item)| (format!("{api_prefix}{path}"), item))
        .collect();

    docs
}
