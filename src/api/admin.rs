use serde::Deserialize;

use crate::api::{ApiClient, ApiError};
use crate::models::{Application, Internship, User, decode_item, decode_list};

/// Headline counters on the admin overview.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct AdminSummary {
    #[serde(default)]
    pub students: i64,
    #[serde(default)]
    pub employers: i64,
    #[serde(default)]
    pub internships: i64,
    #[serde(default)]
    pub applications: i64,
}

/// Everything the admin landing screen shows, fetched in one round of
/// concurrent requests. Each panel fails independently so one broken
/// endpoint does not blank the whole screen.
#[derive(Debug)]
pub struct AdminDashboard {
    pub summary: Result<AdminSummary, ApiError>,
    pub pending_internships: Result<Vec<Internship>, ApiError>,
    pub pending_applications: Result<Vec<Application>, ApiError>,
    pub users: Result<Vec<User>, ApiError>,
}

impl ApiClient {
    pub async fn admin_summary(&self) -> Result<AdminSummary, ApiError> {
        let body = self.get_json("/admin/summary").await?;
        decode_item(body, Some("summary")).map_err(ApiError::Decode)
    }

    /// Postings awaiting an admin decision.
    pub async fn pending_internships(&self) -> Result<Vec<Internship>, ApiError> {
        let body = self.get_json("/admin/pending-internships").await?;
        decode_list(body, "internships").map_err(ApiError::Decode)
    }

    /// Applications awaiting an admin decision.
    pub async fn pending_applications(&self) -> Result<Vec<Application>, ApiError> {
        let body = self.get_json("/admin/pending-applications").await?;
        decode_list(body, "applications").map_err(ApiError::Decode)
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        let body = self.get_json("/admin/users").await?;
        decode_list(body, "users").map_err(ApiError::Decode)
    }

    pub async fn user(&self, id: i64) -> Result<User, ApiError> {
        let body = self.get_json(&format!("/admin/users/{id}")).await?;
        decode_item(body, Some("user")).map_err(ApiError::Decode)
    }

    /// Detail view for a posting under review, rejected rows included.
    pub async fn admin_internship(&self, id: i64) -> Result<Internship, ApiError> {
        let body = self.get_json(&format!("/admin/internships/{id}")).await?;
        decode_item(body, Some("internship")).map_err(ApiError::Decode)
    }

    pub async fn admin_application(&self, id: i64) -> Result<Application, ApiError> {
        let body = self.get_json(&format!("/admin/applications/{id}")).await?;
        decode_item(body, Some("application")).map_err(ApiError::Decode)
    }

    pub async fn admin_dashboard(&self) -> AdminDashboard {
        let (summary, pending_internships, pending_applications, users) = tokio::join!(
            self.admin_summary(),
            self.pending_internships(),
            self.pending_applications(),
            self.users(),
        );
        AdminDashboard {
            summary,
            pending_internships,
            pending_applications,
            users,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::User;
    use crate::session::{Session, SessionStore};

    fn admin_client(server: &mockito::ServerGuard) -> ApiClient {
        let store = SessionStore::in_memory();
        store
            .write(&Session {
                token: "tok-adm".to_string(),
                user: User {
                    id: 1,
                    role: "admin".to_string(),
                    ..User::default()
                },
            })
            .expect("write session");
        ApiClient::new(&ClientConfig::new(server.url()), store)
    }

    #[tokio::test]
    async fn summary_decodes_wrapped_counters() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/summary")
            .match_header("authorization", "Bearer tok-adm")
            .with_status(200)
            .with_body(r#"{"summary":{"students":40,"employers":12,"internships":25,"applications":90}}"#)
            .create_async()
            .await;

        let client = admin_client(&server);
        let summary = client.admin_summary().await.expect("summary");
        assert_eq!(summary.students, 40);
        assert_eq!(summary.applications, 90);
    }

    #[tokio::test]
    async fn dashboard_panels_fail_independently() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/summary")
            .with_status(500)
            .with_body(r#"{"message":"Summary unavailable"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/admin/pending-internships")
            .with_status(200)
            .with_body(r#"{"internships":[{"id":4,"title":"X","status":"pending"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/admin/pending-applications")
            .with_status(200)
            .with_body(r#"{"applications":[]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/admin/users")
            .with_status(200)
            .with_body(r#"{"users":[{"id":2,"name":"Omar","role":"student"}]}"#)
            .create_async()
            .await;

        let client = admin_client(&server);
        let dashboard = client.admin_dashboard().await;
        assert!(dashboard.summary.is_err());
        assert_eq!(dashboard.pending_internships.expect("internships").len(), 1);
        assert!(dashboard.pending_applications.expect("applications").is_empty());
        assert_eq!(dashboard.users.expect("users")[0].name, "Omar");
    }
}
