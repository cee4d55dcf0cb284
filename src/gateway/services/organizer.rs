//! Organizer composite operations.

use std::collections::HashMap;

use serde_json::Value;

use super::{CompositeService, ORGANIZER_ID_KEYS, resource_id};
use crate::auth::Claims;
use crate::gateway::error::GatewayError;
use crate::gateway::types::{Envelope, Operation, Resource, ResourceContext, build};

impl CompositeService {
    /// Profile of the organizer the token was issued to, resolved by email.
    pub async fn current_organizer(&self, claims: &Claims) -> Result<Envelope, GatewayError> {
        let email = claims
            .email
            .as_deref()
            .ok_or_else(|| GatewayError::BadRequest("Token carries no email claim".into()))?;
        let organizer = self.clients.users.get_organizer_by_email(email).await?;
        let ctx = ResourceContext::new(Resource::Organizer, Operation::Read)
            .with_id(resource_id(&organizer, ORGANIZER_ID_KEYS));
        Ok(build(Some(organizer), "Organizer retrieved successfully", &ctx))
    }

    pub async fn get_organizer(&self, organizer_id: &str) -> Result<Envelope, GatewayError> {
        let organizer = self.clients.users.get_organizer(organizer_id).await?;
        let ctx = ResourceContext::new(Resource::Organizer, Operation::Read)
            .with_id(Some(organizer_id.into()));
        Ok(build(Some(organizer), "Organizer retrieved successfully", &ctx))
    }

    pub async fn create_organizer(&self, organizer: Value) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] create_organizer");
        let created = self.clients.users.create_organizer(&organizer).await?;
        let ctx = ResourceContext::new(Resource::Organizer, Operation::Create)
            .with_id(resource_id(&created, ORGANIZER_ID_KEYS));
        Ok(build(Some(created), "Organizer created successfully", &ctx))
    }

    pub async fn modify_organizer(
        &self,
        organizer_id: &str,
        organizer: Value,
    ) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] modify_organizer {}", organizer_id);
        let updated = self
            .clients
            .users
            .modify_organizer(organizer_id, &organizer)
            .await?;
        let ctx = ResourceContext::new(Resource::Organizer, Operation::Update)
            .with_id(Some(organizer_id.into()));
        Ok(build(Some(updated), "Organizer updated successfully", &ctx))
    }

    pub async fn delete_organizer(&self, organizer_id: &str) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] delete_organizer {}", organizer_id);
        self.clients.users.delete_organizer(organizer_id).await?;
        let ctx = ResourceContext::new(Resource::Organizer, Operation::Delete)
            .with_id(Some(organizer_id.into()));
        Ok(build(None, "Organizer deleted successfully", &ctx))
    }

    pub async fn authenticate_organizer(
        &self,
        form: HashMap<String, String>,
    ) -> Result<Envelope, GatewayError> {
        let session = self.clients.users.authenticate_organizer(form).await?;
        let ctx = ResourceContext::new(Resource::Organizer, Operation::Read)
            .with_id(resource_id(&session, ORGANIZER_ID_KEYS));
        Ok(build(
            Some(session),
            "Organizer authenticated successfully",
            &ctx,
        ))
    }
}
