use std::rc::Rc;

use chrono_tz::Tz;
use taskio_gui_shared::{ProfilePatch, UserProfileDto};
use tracing::info;

use crate::api::ProfileApi;
use crate::auth::{parse_age, validate_email};
use crate::error::{AppError, ValidationError};
use crate::notify::{Notifier, Toast};
use crate::route::RouteName;

/// Display strings for the profile card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub age: String,
    pub member_since: String,
}

impl ProfileView {
    pub fn new(profile: &UserProfileDto, tz: Tz) -> Self {
        Self {
            full_name: format!("{} {}", profile.first_name.trim(), profile.last_name.trim())
                .trim()
                .to_string(),
            email: profile.email.clone(),
            age: profile
                .age
                .map(|age| age.to_string())
                .unwrap_or_else(|| "-".to_string()),
            member_since: profile
                .created_at
                .map(|at| at.with_timezone(&tz).format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub email: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfileDto) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            age: profile.age.map(|age| age.to_string()).unwrap_or_default(),
            email: profile.email.clone(),
        }
    }

    pub fn patch(&self) -> Result<ProfilePatch, AppError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(ValidationError::Required("first name"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(ValidationError::Required("last name"));
        }
        let age = parse_age(&self.age);
        if let Err(err) = age {
            errors.push(err);
        }
        if let Err(err) = validate_email(&self.email) {
            errors.push(err);
        }
        match age {
            Ok(age) if errors.is_empty() => Ok(ProfilePatch {
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                age,
                email: self.email.trim().to_string(),
            }),
            _ => Err(AppError::ValidationFailure(errors)),
        }
    }
}

pub struct ProfileFlows {
    api: Rc<dyn ProfileApi>,
    notifier: Rc<dyn Notifier>,
}

impl ProfileFlows {
    pub fn new(api: Rc<dyn ProfileApi>, notifier: Rc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    #[tracing::instrument(skip_all)]
    pub async fn load(&self) -> Result<UserProfileDto, AppError> {
        self.api.profile().await.map_err(|err| {
            let err = AppError::from(err);
            self.notifier.fail("Could not load the profile", &err);
            err
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn update(&self, form: &ProfileForm) -> Result<UserProfileDto, AppError> {
        let patch = form.patch()?;
        match self.api.update_profile(&patch).await {
            Ok(profile) => {
                self.notifier.notify(Toast::success("Profile updated"));
                Ok(profile)
            }
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.fail("Could not update the profile", &err);
                Err(err)
            }
        }
    }

    /// Deletes the account after re-authentication with `password`.
    #[tracing::instrument(skip_all)]
    pub async fn delete_account(&self, password: &str) -> Result<RouteName, AppError> {
        if password.is_empty() {
            return Err(ValidationError::Required("password").into());
        }
        if let Err(err) = self.api.delete_account(password).await {
            let err = AppError::from(err);
            self.notifier.fail("Could not delete the account", &err);
            return Err(err);
        }
        info!("account deleted");
        self.notifier.notify(Toast::success("Account deleted"));
        Ok(RouteName::Login)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile() -> UserProfileDto {
        UserProfileDto {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            age: Some(29),
            email: "ana@example.com".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).single(),
        }
    }

    #[test]
    fn view_formats_creation_date_in_zone() {
        let view = ProfileView::new(&profile(), chrono_tz::America::Bogota);
        assert_eq!(view.full_name, "Ana Ruiz");
        assert_eq!(view.age, "29");
        assert_eq!(view.member_since, "2024-12-31");
    }

    #[test]
    fn form_round_trips_into_patch() {
        let patch = ProfileForm::from_profile(&profile())
            .patch()
            .expect("valid profile");
        assert_eq!(patch.age, 29);
        assert_eq!(patch.email, "ana@example.com");
    }

    #[test]
    fn form_rejects_age_out_of_range() {
        let mut form = ProfileForm::from_profile(&profile());
        form.age = "121".into();
        assert_eq!(
            form.patch(),
            Err(AppError::ValidationFailure(vec![ValidationError::InvalidAge]))
        );
    }
}
