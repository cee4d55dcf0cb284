//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8002/docs`
//! - OpenAPI JSON: `http://localhost:8002/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::types::{Envelope, Link, PaginationState};

/// HS256 bearer token issued by the user-management service
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    Http::builder()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Claims: sub, role (user | organizer), email, exp",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Composite Gateway API",
        version = "1.0.0",
        description = "Aggregates the user, event and ticketing services into HATEOAS responses."
    ),
    servers(
        (url = "http://localhost:8002", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::authenticate_user,
        crate::gateway::handlers::create_user,
        crate::gateway::handlers::get_user,
        crate::gateway::handlers::modify_user,
        crate::gateway::handlers::delete_user,
        crate::gateway::handlers::get_user_tickets,
        crate::gateway::handlers::list_events,
        crate::gateway::handlers::get_event,
        crate::gateway::handlers::create_event,
        crate::gateway::handlers::update_event,
        crate::gateway::handlers::delete_event,
        crate::gateway::handlers::get_event_tickets,
        crate::gateway::handlers::book_ticket,
        crate::gateway::handlers::get_ticket,
        crate::gateway::handlers::cancel_ticket,
        crate::gateway::handlers::get_current_organizer,
        crate::gateway::handlers::get_organizer,
        crate::gateway::handlers::create_organizer,
        crate::gateway::handlers::modify_organizer,
        crate::gateway::handlers::delete_organizer,
        crate::gateway::handlers::authenticate_organizer,
    ),
    components(schemas(Envelope, Link, PaginationState)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "User accounts and their tickets"),
        (name = "Events", description = "Event listing and management"),
        (name = "Tickets", description = "Booking and cancellation"),
        (name = "Organizer", description = "Organizer accounts (organizer role)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Composite Gateway API");
        assert!(spec.to_json().is_ok());
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths.paths;
        assert!(paths.contains_key("/composite/health"));
        assert!(paths.contains_key("/composite/users/{user_id}/tickets"));
        assert!(paths.contains_key("/composite/ticket"));
    }

    #[test]
    fn test_every_routed_operation_documented() {
        let paths = ApiDoc::openapi().paths.paths;
        let ops = |p: &str| {
            let item = paths.get(p).unwrap_or_else(|| panic!("{p} missing"));
            (
                item.get.is_some(),
                item.post.is_some(),
                item.put.is_some(),
                item.delete.is_some(),
            )
        };
        assert_eq!(ops("/composite/users/{user_id}"), (true, false, true, true));
        assert_eq!(ops("/composite/events/{event_id}"), (true, false, true, true));
        assert_eq!(ops("/composite/organizer"), (true, true, false, false));
        assert_eq!(
            ops("/composite/organizer/{organizer_id}"),
            (true, false, true, true)
        );
        assert_eq!(
            ops("/composite/organizer/authenticate"),
            (false, true, false, false)
        );
    }

    #[test]
    fn test_security_scheme_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}
