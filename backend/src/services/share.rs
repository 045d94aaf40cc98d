//! Schedule sharing service
//!
//! Only the owner of a schedule may grant, list or revoke access.

use crate::error::ApiError;
use crate::repositories::{AccountRepository, ShareRecord, ShareRepository};
use crate::services::schedule::{Caller, ScheduleService};
use crate::services::{mirror_account, write_failed};
use crate::telemetry;
use mile_planner_shared::types::{ShareResponse, ShareScheduleRequest};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

fn to_response(record: ShareRecord) -> Result<ShareResponse, ApiError> {
    let permission = record
        .permission_level
        .parse()
        .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?;
    Ok(ShareResponse {
        id: record.id,
        schedule_id: record.schedule_id,
        account_id: record.shared_with_account_id,
        email: record.email,
        permission,
        created_at: record.created_at,
    })
}

pub struct ShareService;

impl ShareService {
    async fn require_owner(pool: &PgPool, schedule_id: Uuid, account_id: Uuid) -> Result<(), ApiError> {
        let (_, permissions) = ScheduleService::permissions(pool, schedule_id, account_id).await?;
        if !permissions.can_view {
            return Err(ApiError::NotFound("Schedule not found".to_string()));
        }
        if !permissions.is_owner {
            return Err(ApiError::Forbidden(
                "Only the owner can manage sharing".to_string(),
            ));
        }
        Ok(())
    }

    /// Grant another account access by email, replacing any existing level
    pub async fn share(
        pool: &PgPool,
        schedule_id: Uuid,
        caller: Caller<'_>,
        request: ShareScheduleRequest,
    ) -> Result<ShareResponse, ApiError> {
        request.validate()?;
        Self::require_owner(pool, schedule_id, caller.account_id).await?;

        mirror_account(pool, caller.account_id, caller.email).await?;

        let target = AccountRepository::find_by_email(pool, request.email.trim())
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found with that email address".to_string()))?;

        if target.id == caller.account_id {
            return Err(ApiError::BadRequest(
                "Cannot share a schedule with yourself".to_string(),
            ));
        }

        let record = ShareRepository::upsert(
            pool,
            schedule_id,
            target.id,
            caller.account_id,
            request.permission.as_str(),
        )
        .await
        .map_err(write_failed("share", "Failed to share schedule; please retry"))?;

        telemetry::record_mutation("share");
        info!(%schedule_id, shared_with = %target.id, permission = %request.permission, "Schedule shared");
        to_response(record)
    }

    pub async fn list(
        pool: &PgPool,
        schedule_id: Uuid,
        account_id: Uuid,
    ) -> Result<Vec<ShareResponse>, ApiError> {
        Self::require_owner(pool, schedule_id, account_id).await?;

        ShareRepository::list_for_schedule(pool, schedule_id)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .map(to_response)
            .collect()
    }

    pub async fn unshare(
        pool: &PgPool,
        schedule_id: Uuid,
        share_id: Uuid,
        account_id: Uuid,
    ) -> Result<(), ApiError> {
        Self::require_owner(pool, schedule_id, account_id).await?;

        let deleted = ShareRepository::delete(pool, schedule_id, share_id)
            .await
            .map_err(write_failed("unshare", "Failed to remove share; please retry"))?;
        if !deleted {
            return Err(ApiError::NotFound("Share not found".to_string()));
        }

        telemetry::record_mutation("unshare");
        info!(%schedule_id, %share_id, "Share revoked");
        Ok(())
    }
}
