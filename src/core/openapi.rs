use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::todos::{dtos as todos_dtos, handlers as todos_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::signup,
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Todos
        todos_handlers::list_todos,
        todos_handlers::create_todo,
        todos_handlers::get_todo,
        todos_handlers::update_todo,
        todos_handlers::delete_todo,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::delete_file,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::SignupRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            auth::dtos::MeResponseDto,
            auth::dtos::SignedOutDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            ApiResponse<auth::dtos::SignedOutDto>,
            // Todos
            todos_dtos::CreateTodoDto,
            todos_dtos::UpdateTodoDto,
            todos_dtos::TodoResponseDto,
            todos_dtos::DeleteTodoResponseDto,
            ApiResponse<Vec<todos_dtos::TodoResponseDto>>,
            ApiResponse<todos_dtos::TodoResponseDto>,
            ApiResponse<todos_dtos::DeleteTodoResponseDto>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "todos", description = "Personal todo items"),
        (name = "files", description = "File upload and management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Tasknest API",
        version = "0.1.0",
        description = "API documentation for Tasknest",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
