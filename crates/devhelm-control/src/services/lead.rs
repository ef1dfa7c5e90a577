// Lead capture: record a prospective signup and invite them

use devhelm_core::{ControlError, InviteCode, Lead, Result};
use devhelm_storage::{CreateInviteCodeRow, CreateLeadRow, StorageBackend};
use rand::Rng;
use uuid::Uuid;

/// Generate an invite code (32 hex characters)
fn generate_invite_code() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

pub struct LeadService {
    db: StorageBackend,
}

impl LeadService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Capture a lead and issue an invite code on behalf of `invited_by`.
    ///
    /// Fails with `EmailTaken` if a user already owns the email. A lead that was
    /// captured before is reused and receives a fresh invite code.
    pub async fn capture(
        &self,
        invited_by: Uuid,
        team_id: Option<Uuid>,
        name: String,
        email: String,
    ) -> Result<(Lead, InviteCode)> {
        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(ControlError::EmailTaken);
        }

        let lead = match self.db.get_lead_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                self.db
                    .create_lead(CreateLeadRow {
                        name,
                        email: email.clone(),
                    })
                    .await?
            }
        };

        let invite = self
            .db
            .create_invite_code(CreateInviteCodeRow {
                code: generate_invite_code(),
                email,
                invited_by,
                team_id,
            })
            .await?;

        tracing::info!(lead_id = %lead.id, invite_id = %invite.id, "Captured lead");
        Ok((Lead::from(lead), InviteCode::from(invite)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhelm_storage::{CreateTeamRow, CreateUserRow};

    async fn setup() -> (StorageBackend, LeadService, Uuid, Uuid) {
        let db = StorageBackend::in_memory();
        let team = db
            .create_team(CreateTeamRow {
                name: "Team".to_string(),
            })
            .await
            .unwrap();
        let user = db
            .create_user(CreateUserRow {
                email: "owner@example.com".to_string(),
                name: "Owner".to_string(),
                team_id: Some(team.id),
            })
            .await
            .unwrap();
        (db.clone(), LeadService::new(db), user.id, team.id)
    }

    #[tokio::test]
    async fn test_capture_creates_lead_and_invite() {
        let (_, service, user_id, team_id) = setup().await;
        let (lead, invite) = service
            .capture(
                user_id,
                Some(team_id),
                "Jane".to_string(),
                "jane@example.com".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(lead.name, "Jane");
        assert_eq!(lead.email, "jane@example.com");
        assert_eq!(invite.email, "jane@example.com");
        assert_eq!(invite.invited_by, user_id);
        assert_eq!(invite.team_id, Some(team_id));
        assert_eq!(invite.code.len(), 32);
        assert!(!invite.used);
        assert!(!invite.cancelled);
    }

    #[tokio::test]
    async fn test_capture_rejects_existing_user() {
        let (_, service, user_id, team_id) = setup().await;
        let err = service
            .capture(
                user_id,
                Some(team_id),
                "Owner".to_string(),
                "owner@example.com".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::EmailTaken));
    }

    #[tokio::test]
    async fn test_recapture_reuses_lead() {
        let (db, service, user_id, team_id) = setup().await;
        let (first, first_invite) = service
            .capture(user_id, Some(team_id), "Jane".to_string(), "jane@example.com".to_string())
            .await
            .unwrap();
        let (second, second_invite) = service
            .capture(user_id, Some(team_id), "Jane D".to_string(), "jane@example.com".to_string())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first_invite.code, second_invite.code);

        let invites = db
            .list_invite_codes_for_email("jane@example.com")
            .await
            .unwrap();
        assert_eq!(invites.len(), 2);
    }
}
