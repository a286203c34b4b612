use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

use armature_mapping::FilterExpr;
use armature_messages::{Message, MessagesService};
use armature_observability::LogLevel;
use armature_registry::RequestScope;

use crate::app::{dto, encode, errors};
use crate::app::encode::ResponseFormat;
use crate::context::{HandlerDeps, Principal};
use crate::problem::ValidatedJson;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_messages).post(create_message))
        .route("/:guid", get(get_message).delete(delete_message))
}

pub async fn list_messages(
    Extension(scope): Extension<Arc<RequestScope>>,
    Extension(deps): Extension<Arc<HandlerDeps>>,
    Extension(format): Extension<ResponseFormat>,
    Query(query): Query<dto::ListMessagesQuery>,
) -> Response {
    let service = match scope.resolve::<Arc<dyn MessagesService>>() {
        Ok(s) => s,
        Err(e) => return errors::registry_error_to_response(e),
    };

    // Query filters arrive in wire-shape field names; the expression-mapping
    // extension rewrites them into the domain shape.
    let filter = match query.recipient {
        Some(recipient) => {
            let wire = FilterExpr::eq("recipient", serde_json::Value::String(recipient));
            match deps.mapper().map_filter::<Message, dto::MessageDto>(&wire) {
                Ok(f) => Some(f),
                Err(e) => return errors::mapping_error_to_response(e),
            }
        }
        None => None,
    };

    let mut view = Vec::new();
    for message in service.list(filter.as_ref()) {
        match deps.mapper().map::<Message, dto::MessageDto>(&message) {
            Ok(mapped) => view.push(mapped),
            Err(e) => return errors::mapping_error_to_response(e),
        }
    }

    match format {
        ResponseFormat::Json => encode::respond(format, StatusCode::OK, "messages", &view),
        ResponseFormat::Xml => encode::respond(
            format,
            StatusCode::OK,
            "messages",
            &dto::MessageListDto { message: view },
        ),
    }
}

pub async fn get_message(
    Extension(scope): Extension<Arc<RequestScope>>,
    Extension(deps): Extension<Arc<HandlerDeps>>,
    Extension(format): Extension<ResponseFormat>,
    Path(guid): Path<String>,
) -> Response {
    let guid = match parse_guid(&guid) {
        Ok(g) => g,
        Err(res) => return res,
    };

    let service = match scope.resolve::<Arc<dyn MessagesService>>() {
        Ok(s) => s,
        Err(e) => return errors::registry_error_to_response(e),
    };

    match service.get(guid) {
        Ok(message) => match deps.mapper().map::<Message, dto::MessageDto>(&message) {
            Ok(mapped) => encode::respond(format, StatusCode::OK, "message", &mapped),
            Err(e) => errors::mapping_error_to_response(e),
        },
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_message(
    Extension(scope): Extension<Arc<RequestScope>>,
    Extension(deps): Extension<Arc<HandlerDeps>>,
    Extension(format): Extension<ResponseFormat>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<dto::CreateMessageRequest>,
) -> Response {
    let service = match scope.resolve::<Arc<dyn MessagesService>>() {
        Ok(s) => s,
        Err(e) => return errors::registry_error_to_response(e),
    };

    match service.create(principal.user_id(), body.into()) {
        Ok(message) => {
            let _ = deps.logger().log(
                LogLevel::Information,
                &format!("message {} created", message.audit.guid),
            );
            match deps.mapper().map::<Message, dto::MessageDto>(&message) {
                Ok(mapped) => encode::respond(format, StatusCode::CREATED, "message", &mapped),
                Err(e) => errors::mapping_error_to_response(e),
            }
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_message(
    Extension(scope): Extension<Arc<RequestScope>>,
    Extension(deps): Extension<Arc<HandlerDeps>>,
    Extension(principal): Extension<Principal>,
    Path(guid): Path<String>,
) -> Response {
    let guid = match parse_guid(&guid) {
        Ok(g) => g,
        Err(res) => return res,
    };

    let service = match scope.resolve::<Arc<dyn MessagesService>>() {
        Ok(s) => s,
        Err(e) => return errors::registry_error_to_response(e),
    };

    match service.remove(principal.user_id(), guid) {
        Ok(()) => {
            let _ = deps
                .logger()
                .log(LogLevel::Information, &format!("message {guid} removed"));
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn parse_guid(raw: &str) -> Result<Uuid, Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid message id")
    })
}
