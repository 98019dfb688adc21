use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use taskio_gui_shared::{Credentials, SignupRequest};
use tracing::{error, info, warn};

use crate::api::AuthApi;
use crate::error::{AppError, ValidationError};
use crate::notify::{Notifier, Toast};
use crate::route::{Location, RouteName};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PASSWORD_CLASSES: [&str; 3] = [r"[a-z]", r"[A-Z]", r"[\W_]"];

struct Patterns {
    email: Regex,
    password_classes: Vec<Regex>,
}

fn compile_patterns() -> Result<Patterns, regex::Error> {
    Ok(Patterns {
        email: Regex::new(EMAIL_PATTERN)?,
        password_classes: PASSWORD_CLASSES
            .iter()
            .map(|class| Regex::new(class))
            .collect::<Result<_, _>>()?,
    })
}

/// Compiled once; a broken pattern fails validation loudly instead of
/// rejecting every input.
fn patterns() -> Result<&'static Patterns, ValidationError> {
    static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(compile_patterns)
        .as_ref()
        .map_err(|err| {
            error!(%err, "validation pattern does not compile");
            ValidationError::RulesUnavailable
        })
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !patterns()?.email.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// At least 8 characters with a lowercase letter, an uppercase letter and
/// a special character, matching the confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    let patterns = patterns()?;
    let strong = password.chars().count() >= 8
        && patterns
            .password_classes
            .iter()
            .all(|class| class.is_match(password));
    if !strong {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn credentials(&self) -> Result<Credentials, ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::Required("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn request(&self) -> Result<SignupRequest, AppError> {
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
        if let Err(err) = validate_new_password(&self.password, &self.confirm_password) {
            errors.push(err);
        }
        match age {
            Ok(age) if errors.is_empty() => Ok(SignupRequest {
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                age,
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            }),
            _ => Err(AppError::ValidationFailure(errors)),
        }
    }
}

pub(crate) fn parse_age(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(age) if (1..=120).contains(&age) => Ok(age),
        _ => Err(ValidationError::InvalidAge),
    }
}

/// Which half of the password-reset screen to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetFlow {
    RequestEmail,
    NewPassword { token: String },
}

impl ResetFlow {
    pub fn from_location(location: &Location) -> Self {
        match location.param("token").map(str::trim) {
            Some(token) if !token.is_empty() => ResetFlow::NewPassword {
                token: token.to_string(),
            },
            _ => ResetFlow::RequestEmail,
        }
    }
}

/// Login, signup, reset and logout; each returns the route to go to next.
pub struct AuthFlows {
    api: Rc<dyn AuthApi>,
    notifier: Rc<dyn Notifier>,
}

impl AuthFlows {
    pub fn new(api: Rc<dyn AuthApi>, notifier: Rc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    #[tracing::instrument(skip_all)]
    pub async fn login(&self, form: &LoginForm) -> Result<RouteName, AppError> {
        let credentials = form.credentials()?;
        self.api.login(&credentials).await?;
        info!("login succeeded");
        Ok(RouteName::Home)
    }

    #[tracing::instrument(skip_all)]
    pub async fn register(&self, form: &SignupForm) -> Result<RouteName, AppError> {
        let request = form.request()?;
        match self.api.signup(&request).await {
            Ok(()) => {
                self.notifier
                    .notify(Toast::success("Account created, you can log in now"));
                Ok(RouteName::Login)
            }
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn request_reset(&self, email: &str) -> Result<RouteName, AppError> {
        validate_email(email)?;
        if let Err(err) = self.api.forgot_password(email.trim()).await {
            let err = AppError::from(err);
            self.notifier.fail("Could not send the reset email", &err);
            return Err(err);
        }
        self.notifier
            .notify(Toast::success("Password reset email sent"));
        Ok(RouteName::Login)
    }

    #[tracing::instrument(skip_all)]
    pub async fn confirm_reset(
        &self,
        token: &str,
        password: &str,
        confirm: &str,
    ) -> Result<RouteName, AppError> {
        validate_new_password(password, confirm)?;
        if let Err(err) = self.api.reset_password(token, password).await {
            let err = AppError::from(err);
            self.notifier.fail("Could not change the password", &err);
            return Err(err);
        }
        self.notifier
            .notify(Toast::success("Password changed"));
        Ok(RouteName::Login)
    }

    /// Always ends on the login route, even if the server call fails.
    #[tracing::instrument(skip_all)]
    pub async fn logout(&self) -> RouteName {
        if let Err(error) = self.api.logout().await {
            warn!(%error, "logout request failed");
        }
        RouteName::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_patterns_compile() {
        assert!(compile_patterns().is_ok());
        assert!(patterns().is_ok());
        assert_eq!(validate_email(" ana@example.com "), Ok(()));
        assert_eq!(validate_email("ana@example"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_policy() {
        assert_eq!(validate_new_password("Abcdef!1", "Abcdef!1"), Ok(()));
        assert_eq!(validate_new_password("Abcdef_x", "Abcdef_x"), Ok(()));
        assert_eq!(
            validate_new_password("abcdef!1", "abcdef!1"),
            Err(ValidationError::WeakPassword)
        );
        assert_eq!(
            validate_new_password("Ab!1", "Ab!1"),
            Err(ValidationError::WeakPassword)
        );
        assert_eq!(
            validate_new_password("Abcdef!1", "Abcdef!2"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn reset_flow_follows_token_param() {
        let with_token = Location::parse("#/reset-password?token=t0k");
        assert_eq!(
            ResetFlow::from_location(&with_token),
            ResetFlow::NewPassword {
                token: "t0k".into()
            }
        );
        let without = Location::parse("#/reset-password?token=");
        assert_eq!(ResetFlow::from_location(&without), ResetFlow::RequestEmail);
    }

    #[test]
    fn signup_collects_every_problem() {
        let form = SignupForm {
            age: "0".into(),
            email: "nope".into(),
            password: "x".into(),
            confirm_password: "x".into(),
            ..SignupForm::default()
        };
        match form.request() {
            Err(AppError::ValidationFailure(errors)) => {
                assert!(errors.contains(&ValidationError::InvalidAge));
                assert!(errors.contains(&ValidationError::InvalidEmail));
                assert!(errors.contains(&ValidationError::WeakPassword));
                assert!(errors.contains(&ValidationError::Required("first name")));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
