use crate::api::auth::{PasswordChange, PasswordError};
use crate::api::{ApiClient, ApiError, UploadFile};
use crate::models::{Application, Internship, User, decode_item, decode_list};

/// Editable slice of an employer profile.
#[derive(Clone, Debug, Default)]
pub struct EmployerProfileUpdate {
    pub company_name: String,
    pub email: String,
    pub location: String,
    pub description: String,
    pub logo: Option<UploadFile>,
}

impl EmployerProfileUpdate {
    fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("company_name", self.company_name)
            .text("email", self.email)
            .text("location", self.location)
            .text("description", self.description);
        if let Some(logo) = self.logo {
            form = form.part("logo", logo.into_part()?);
        }
        Ok(form)
    }
}

impl ApiClient {
    /// Company record behind the employer dashboard.
    pub async fn employer_dashboard(&self) -> Result<User, ApiError> {
        let body = self.get_json("/employer/dashboard").await?;
        decode_item(body, Some("profile")).map_err(ApiError::Decode)
    }

    /// Postings owned by the signed-in employer, every status included.
    pub async fn employer_internships(&self) -> Result<Vec<Internship>, ApiError> {
        let body = self.get_json("/employer/internships").await?;
        decode_list(body, "internships").map_err(ApiError::Decode)
    }

    pub async fn update_employer_profile(
        &self,
        update: EmployerProfileUpdate,
    ) -> Result<(), ApiError> {
        let form = update.into_form()?;
        self.put_multipart("/employer/profile", form).await?;
        Ok(())
    }

    pub async fn change_employer_password(
        &self,
        change: &PasswordChange,
    ) -> Result<(), PasswordError> {
        self.change_password("/employer/password", change).await
    }

    /// Applications received for one of the employer's own postings. Rows
    /// feed the review queue built from
    /// [`ModerationTarget::employer_applications`](crate::moderation::ModerationTarget::employer_applications).
    pub async fn internship_applications(
        &self,
        internship_id: i64,
    ) -> Result<Vec<Application>, ApiError> {
        let body = self
            .get_json(&format!("/employer/internships/{internship_id}/applications"))
            .await?;
        decode_list(body, "applications").map_err(ApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::{ModerationStatus, User};
    use crate::session::{Session, SessionStore};

    fn signed_in_client(server: &mockito::ServerGuard) -> ApiClient {
        let store = SessionStore::in_memory();
        store
            .write(&Session {
                token: "tok-emp".to_string(),
                user: User {
                    id: 8,
                    role: "employer".to_string(),
                    ..User::default()
                },
            })
            .expect("write session");
        ApiClient::new(&ClientConfig::new(server.url()), store)
    }

    #[tokio::test]
    async fn own_internships_keep_pending_and_rejected_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/employer/internships")
            .match_header("authorization", "Bearer tok-emp")
            .with_status(200)
            .with_body(
                r#"{"internships":[
                     {"id":1,"title":"A","status":"pending"},
                     {"id":2,"title":"B","status":"rejected","rejection_reason":"Too vague"}]}"#,
            )
            .create_async()
            .await;

        let client = signed_in_client(&server);
        let internships = client.employer_internships().await.expect("list");
        assert_eq!(internships.len(), 2);
        assert_eq!(internships[0].status, Some(ModerationStatus::Pending));
        assert_eq!(internships[1].rejection_reason.as_deref(), Some("Too vague"));
    }

    #[tokio::test]
    async fn received_applications_accept_the_aliased_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/employer/internships/5/applications")
            .with_status(200)
            .with_body(r#"{"applications":[{"application_id":31,"status":"pending"}]}"#)
            .create_async()
            .await;

        let client = signed_in_client(&server);
        let applications = client.internship_applications(5).await.expect("list");
        assert_eq!(applications[0].id, 31);
    }
}
