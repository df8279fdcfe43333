use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::api::{ApiClient, ApiError, UploadFile};
use crate::models::{User, decode_item};
use crate::session::Session;

/// Field-keyed validation outcome for the login form. These never reach the
/// network; the form stays put and annotates the offending fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoginFieldErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl LoginFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Result of a successful login: the authenticated user (already written to
/// the session store) and the route their role lands on.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub user: User,
    pub landing: &'static str,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login form is invalid")]
    Validation(LoginFieldErrors),

    #[error("login response did not contain a token and user")]
    MalformedResponse,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to persist the session")]
    Storage(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

// Backends have shipped the token under different names over time.
#[derive(Deserialize)]
struct LoginPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    jwt: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// Validate the login form without touching the network.
pub fn validate_login(email: &str, password: &str) -> LoginFieldErrors {
    let mut errors = LoginFieldErrors::default();
    if email.is_empty() {
        errors.email = Some("Email is required");
    } else if !is_valid_email(email) {
        errors.email = Some("Enter a valid email");
    }
    if password.is_empty() {
        errors.password = Some("Password is required");
    }
    errors
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

impl ApiClient {
    /// Authenticate and persist the resulting session in both storage
    /// scopes. Client-side validation failures short-circuit before any
    /// request is made.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let errors = validate_login(email, password);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let body = self
            .post_json("/auth/login", &LoginRequest { email, password })
            .await?;
        let payload: LoginPayload =
            decode_item(body, None).map_err(|_| AuthError::MalformedResponse)?;

        let token = payload
            .token
            .or(payload.access_token)
            .or(payload.jwt)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedResponse)?;
        let user = payload.user.ok_or(AuthError::MalformedResponse)?;

        let session = Session { token, user };
        self.session().write(&session)?;
        info!(user = %session.user.name, "logged in");

        let landing = session
            .user
            .role()
            .map(|role| role.landing_route())
            .unwrap_or("/internships");
        Ok(LoginOutcome {
            user: session.user,
            landing,
        })
    }

    /// Drop the session from both scopes. Purely local; the backend keeps
    /// no server-side session to tear down.
    pub fn logout(&self) {
        self.session().clear();
        info!("logged out");
    }

    /// Register a student account. Multipart because the CV and profile
    /// image ride along with the text fields.
    pub async fn register_student(
        &self,
        registration: StudentRegistration,
    ) -> Result<(), AuthError> {
        registration.validate().map_err(AuthError::Validation)?;
        if let Some(cv) = &registration.cv {
            if cv.content_type != "application/pdf" {
                return Err(ApiError::InvalidUpload("CV must be a PDF".to_string()).into());
            }
            if cv.bytes.len() > 5 * 1024 * 1024 {
                return Err(ApiError::InvalidUpload("CV must be 5 MB or smaller".to_string()).into());
            }
        }
        let form = registration.into_form()?;
        self.post_multipart("/student/register", form).await?;
        Ok(())
    }

    /// Register an employer account, with an optional company logo.
    pub async fn register_employer(
        &self,
        registration: EmployerRegistration,
    ) -> Result<(), AuthError> {
        registration.validate().map_err(AuthError::Validation)?;
        if let Some(logo) = &registration.logo {
            if logo.bytes.len() > 2 * 1024 * 1024 {
                return Err(
                    ApiError::InvalidUpload("Logo must be 2 MB or smaller".to_string()).into(),
                );
            }
        }
        let form = registration.into_form()?;
        self.post_multipart("/employer/register", form).await?;
        Ok(())
    }

    pub(crate) async fn change_password(
        &self,
        path: &str,
        change: &PasswordChange,
    ) -> Result<(), PasswordError> {
        let problems = change.validate();
        if !problems.is_empty() {
            return Err(PasswordError::Invalid(problems));
        }
        self.put_json(path, change).await?;
        Ok(())
    }
}

/// Payload for the student and employer password endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// Client-side rules; an empty list means the form may be submitted.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.current_password.is_empty() {
            problems.push("Current password is required");
        }
        if self.new_password.len() < 8 {
            problems.push("At least 8 characters");
        }
        if !self.new_password.chars().any(|c| c.is_ascii_alphabetic()) {
            problems.push("Include a letter");
        }
        if !self.new_password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Include a number");
        }
        if !self.current_password.is_empty() && self.new_password == self.current_password {
            problems.push("Must differ from current");
        }
        if self.new_password != self.confirm_password {
            problems.push("Passwords do not match");
        }
        problems
    }
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password change form is invalid")]
    Invalid(Vec<&'static str>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Student sign-up form.
#[derive(Clone, Debug)]
pub struct StudentRegistration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub university: String,
    pub major: String,
    pub cv: Option<UploadFile>,
    pub profile_image: Option<UploadFile>,
}

impl StudentRegistration {
    fn validate(&self) -> Result<(), LoginFieldErrors> {
        // The registration form reuses the login field-error surface for
        // the two fields the two forms share; the rest are single-message.
        let mut errors = LoginFieldErrors::default();
        if self.full_name.trim().is_empty() || self.major.trim().is_empty() {
            errors.email = errors.email.or(Some("All fields are required"));
        }
        if self.email.trim().is_empty() {
            errors.email = Some("Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.email = Some("Enter a valid email");
        }
        if self.password.is_empty() {
            errors.password = Some("Password is required");
        } else if self.password.len() < 6 {
            errors.password = Some("Password must be at least 6 characters");
        } else if self.password != self.confirm_password {
            errors.password = Some("Passwords do not match");
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("full_name", self.full_name.trim().to_string())
            .text("email", self.email.trim().to_string())
            .text("password", self.password)
            .text("university", self.university)
            .text("major", self.major.trim().to_string());
        if let Some(cv) = self.cv {
            form = form.part("cv", cv.into_part()?);
        }
        if let Some(image) = self.profile_image {
            form = form.part("profile_image", image.into_part()?);
        }
        Ok(form)
    }
}

/// Employer sign-up form.
#[derive(Clone, Debug)]
pub struct EmployerRegistration {
    pub company_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub location: String,
    pub description: String,
    pub logo: Option<UploadFile>,
}

impl EmployerRegistration {
    fn validate(&self) -> Result<(), LoginFieldErrors> {
        let mut errors = LoginFieldErrors::default();
        if self.company_name.trim().len() < 2 {
            errors.email = Some("Company name is required");
        }
        if !is_valid_email(self.email.trim()) {
            errors.email = errors.email.or(Some("Enter a valid work email"));
        }
        if self.password.len() < 6 {
            errors.password = Some("Password must be at least 6 characters");
        } else if self.password != self.confirm_password {
            errors.password = Some("Passwords do not match");
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("company_name", self.company_name.clone())
            // Older backends expect full_name; sending both is harmless.
            .text("full_name", self.company_name)
            .text("email", self.email.trim().to_string())
            .text("password", self.password)
            .text("location", self.location)
            .text("description", self.description);
        if let Some(logo) = self.logo {
            form = form.part("logo", logo.into_part()?);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionStore;

    #[test]
    fn login_validation_annotates_fields() {
        let errors = validate_login("", "");
        assert_eq!(errors.email, Some("Email is required"));
        assert_eq!(errors.password, Some("Password is required"));

        let errors = validate_login("not-an-email", "hunter2");
        assert_eq!(errors.email, Some("Enter a valid email"));
        assert_eq!(errors.password, None);

        assert!(validate_login("sara@uni.ac.ae", "hunter2").is_empty());
    }

    #[test]
    fn email_check_mirrors_the_form_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.domain.ae"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b."));
    }

    #[test]
    fn password_rules_match_the_change_form() {
        let change = PasswordChange {
            current_password: "old-pass-1".to_string(),
            new_password: "abc12345".to_string(),
            confirm_password: "abc12345".to_string(),
        };
        assert!(change.validate().is_empty());

        let weak = PasswordChange {
            current_password: String::new(),
            new_password: "short".to_string(),
            confirm_password: "other".to_string(),
        };
        let problems = weak.validate();
        assert!(problems.contains(&"Current password is required"));
        assert!(problems.contains(&"At least 8 characters"));
        assert!(problems.contains(&"Include a number"));
        assert!(problems.contains(&"Passwords do not match"));

        let unchanged = PasswordChange {
            current_password: "same-pass-1".to_string(),
            new_password: "same-pass-1".to_string(),
            confirm_password: "same-pass-1".to_string(),
        };
        assert!(unchanged.validate().contains(&"Must differ from current"));
    }

    #[tokio::test]
    async fn login_round_trips_session_and_landing_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body(
                r#"{"token":"tok-1","user":{"id":4,"name":"Sara","email":"s@uni.ac.ae","role":"Student"}}"#,
            )
            .create_async()
            .await;

        let store = SessionStore::in_memory();
        let client = ApiClient::new(&ClientConfig::new(server.url()), store.clone());
        let outcome = client.login("s@uni.ac.ae", "hunter2").await.expect("login");

        assert_eq!(outcome.landing, "/profile/student");
        assert_eq!(outcome.user.id, 4);
        let session = store.read().expect("session stored");
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.user.name, "Sara");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new(
            &ClientConfig::new(server.url()),
            SessionStore::in_memory(),
        );
        let err = client.login("", "").await.expect_err("validation");
        assert!(matches!(err, AuthError::Validation(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn alternate_token_keys_are_accepted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(r#"{"access_token":"tok-2","user":{"id":1,"role":"employer"}}"#)
            .create_async()
            .await;

        let store = SessionStore::in_memory();
        let client = ApiClient::new(&ClientConfig::new(server.url()), store.clone());
        let outcome = client.login("e@co.ae", "hunter2").await.expect("login");
        assert_eq!(outcome.landing, "/profile/company");
        assert_eq!(store.read().expect("session").token, "tok-2");
    }

    #[tokio::test]
    async fn token_without_user_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(r#"{"token":"tok-3"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(
            &ClientConfig::new(server.url()),
            SessionStore::in_memory(),
        );
        let err = client.login("e@co.ae", "hunter2").await.expect_err("bad");
        assert!(matches!(err, AuthError::MalformedResponse));
    }

    #[tokio::test]
    async fn oversized_cv_is_refused_before_upload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/student/register")
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new(
            &ClientConfig::new(server.url()),
            SessionStore::in_memory(),
        );
        let registration = StudentRegistration {
            full_name: "Sara Khalid".to_string(),
            email: "sara@uni.ac.ae".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
            university: "UAEU".to_string(),
            major: "CS".to_string(),
            cv: Some(UploadFile::new(
                "cv.pdf",
                "application/pdf",
                vec![0; 5 * 1024 * 1024 + 1],
            )),
            profile_image: None,
        };
        let err = client
            .register_student(registration)
            .await
            .expect_err("too large");
        assert!(matches!(err, AuthError::Api(ApiError::InvalidUpload(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let store = SessionStore::in_memory();
        store
            .write(&Session {
                token: "tok".to_string(),
                user: User::default(),
            })
            .expect("write");
        let client = ApiClient::new(&ClientConfig::new("http://unused"), store.clone());
        client.logout();
        assert_eq!(store.read(), None);
    }
}
