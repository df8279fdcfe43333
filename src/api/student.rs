use serde::Serialize;
use serde_json::Value;

use crate::api::auth::{PasswordChange, PasswordError};
use crate::api::{ApiClient, ApiError, UploadFile};
use crate::models::{Application, User, decode_item, decode_list};

/// Editable slice of a student profile. Multipart because the CV and the
/// profile image travel with the text fields; omitted uploads leave the
/// stored files untouched.
#[derive(Clone, Debug, Default)]
pub struct StudentProfileUpdate {
    pub name: String,
    pub email: String,
    pub university: String,
    pub major: String,
    pub cv: Option<UploadFile>,
    pub profile_image: Option<UploadFile>,
}

impl StudentProfileUpdate {
    fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("name", self.name)
            .text("email", self.email)
            .text("university", self.university)
            .text("major", self.major);
        if let Some(cv) = self.cv {
            form = form.part("cv", cv.into_part()?);
        }
        if let Some(image) = self.profile_image {
            form = form.part("profile_image", image.into_part()?);
        }
        Ok(form)
    }
}

#[derive(Serialize)]
struct ApplyRequest {
    internship_id: i64,
}

impl ApiClient {
    /// Profile record behind the student dashboard.
    pub async fn student_dashboard(&self) -> Result<User, ApiError> {
        let body = self.get_json("/student/dashboard").await?;
        decode_item(body, Some("profile")).map_err(ApiError::Decode)
    }

    pub async fn update_student_profile(
        &self,
        update: StudentProfileUpdate,
    ) -> Result<(), ApiError> {
        let form = update.into_form()?;
        self.put_multipart("/student/dashboard", form).await?;
        Ok(())
    }

    /// Everything the signed-in student has applied to.
    pub async fn student_applications(&self) -> Result<Vec<Application>, ApiError> {
        let body = self.get_json("/student/applications").await?;
        decode_list(body, "applications").map_err(ApiError::Decode)
    }

    /// Apply to one internship. The backend rejects duplicates and closed
    /// postings; its message is surfaced as-is.
    pub async fn apply(&self, internship_id: i64) -> Result<Value, ApiError> {
        self.post_json("/student/apply", &ApplyRequest { internship_id })
            .await
    }

    pub async fn change_student_password(
        &self,
        change: &PasswordChange,
    ) -> Result<(), PasswordError> {
        self.change_password("/student/password", change).await
    }
}
