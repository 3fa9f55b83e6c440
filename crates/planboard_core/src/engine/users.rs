use super::{normalize_optional, normalize_required, require_user, MutationEngine};
use crate::audit;
use crate::error::{CoreError, CoreResult};
use crate::model::audit::{AuditAction, AuditRecord};
use crate::model::user::{NewUser, User, UserId, UserProfilePatch};

impl MutationEngine<'_> {
    /// Registers a user. The new user is recorded as the actor of its own
    /// creation.
    pub fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let display_name = normalize_required(&user.display_name, "display name")?;
        let email = normalize_email(&user.email)?;
        let avatar_url = normalize_optional(user.avatar_url);

        self.in_transaction("user_create", |uow| {
            if uow.users().email_taken(&email)? {
                return Err(CoreError::validation("email is already registered"));
            }
            let created = uow.users().insert(&NewUser {
                display_name,
                email,
                avatar_url,
            })?;
            audit::record(uow, AuditRecord::new(created.uuid, AuditAction::UserCreated))?;
            Ok(created)
        })
    }

    /// Changes profile fields. Identity (`email`) is immutable.
    pub fn update_user_profile(&self, user: UserId, patch: UserProfilePatch) -> CoreResult<User> {
        let display_name = patch
            .display_name
            .as_deref()
            .map(|value| normalize_required(value, "display name"))
            .transpose()?;

        self.in_transaction("user_update", |uow| {
            let current = require_user(uow, user)?;
            let display_name = display_name.unwrap_or(current.display_name);
            let avatar_url = match patch.avatar_url {
                Some(value) => normalize_optional(value),
                None => current.avatar_url,
            };
            uow.users()
                .update_profile(user, &display_name, avatar_url.as_deref())?;
            audit::record(uow, AuditRecord::new(user, AuditAction::UserUpdated))?;
            require_user(uow, user)
        })
    }
}

fn normalize_email(value: &str) -> CoreResult<String> {
    let email = value.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(CoreError::validation("email must look like local@domain")),
    }
}
