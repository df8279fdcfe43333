use serde::Serialize;

use crate::api::{ApiClient, ApiError};
use crate::models::{Internship, decode_item, decode_list};

/// Fields an employer submits when creating or editing a posting. The
/// backend re-moderates edited postings, so the client never sends a status.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InternshipDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub industry: String,
    pub work_mode: String,
    pub job_type: String,
    pub duration: String,
    pub salary: String,
    pub payment_type: String,
    pub start_date: String,
    pub positions_available: i64,
}

impl ApiClient {
    /// The public catalogue. Callers narrow it with
    /// [`filter::apply`](crate::filter::apply); the request itself is
    /// unfiltered.
    pub async fn all_internships(&self) -> Result<Vec<Internship>, ApiError> {
        let body = self.get_json("/internship/all").await?;
        decode_list(body, "internships").map_err(ApiError::Decode)
    }

    pub async fn internship(&self, id: i64) -> Result<Internship, ApiError> {
        let body = self.get_json(&format!("/internship/{id}")).await?;
        decode_item(body, Some("internship")).map_err(ApiError::Decode)
    }

    pub async fn create_internship(&self, draft: &InternshipDraft) -> Result<(), ApiError> {
        self.post_json("/internship/create", draft).await?;
        Ok(())
    }

    pub async fn update_internship(
        &self,
        id: i64,
        draft: &InternshipDraft,
    ) -> Result<(), ApiError> {
        self.put_json(&format!("/internship/{id}"), draft).await?;
        Ok(())
    }

    pub async fn delete_internship(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/internship/{id}")).await?;
        Ok(())
    }
}
