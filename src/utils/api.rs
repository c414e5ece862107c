use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use crate::error::ClientError;
use crate::models::{
    Course, ErrorBody, LoginRequest, LoginResponse, MessageBody, NewCourse, Schedule, ScheduleItem,
    ScheduledCourse, User,
};

/// Typed wrapper over the registration backend's REST endpoints.
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    // Non-OK responses carry `{"error": ...}`; fall back to the status text otherwise.
    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                });
            return Err(ClientError::Api { status: status.as_u16(), message });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        debug!("Fetch status: {}", response.status());
        Self::read(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        debug!("Fetch status: {}", response.status());
        Self::read(response).await
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("login", &request).await
    }

    pub async fn logout(&self) -> Result<MessageBody, ClientError> {
        self.post("logout", &serde_json::json!({})).await
    }

    pub async fn courses(&self) -> Result<Vec<Course>, ClientError> {
        self.get("courses").await
    }

    pub async fn schedule(&self) -> Result<Vec<ScheduleItem>, ClientError> {
        self.get("student/schedule").await
    }

    pub async fn add_to_schedule(&self, course_id: u32) -> Result<Schedule, ClientError> {
        self.post("student/add_to_schedule", &course_id).await
    }

    pub async fn drop_from_schedule(&self, course_id: u32) -> Result<Schedule, ClientError> {
        self.post("student/drop_from_schedule", &course_id).await
    }

    pub async fn update_schedule_entry(
        &self,
        entry: &ScheduledCourse,
    ) -> Result<ScheduledCourse, ClientError> {
        self.post("student/update_schedule_entry", entry).await
    }

    pub async fn add_course(&self, course: &NewCourse) -> Result<Course, ClientError> {
        self.post("admin/add_course", course).await
    }

    pub async fn update_course(&self, course: &Course) -> Result<Course, ClientError> {
        self.post("admin/update_course", course).await
    }

    pub async fn delete_course(&self, course_id: u32) -> Result<MessageBody, ClientError> {
        self.post("admin/delete_course", &course_id).await
    }

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.get("admin/get_users").await
    }

    pub async fn add_user(&self, user: &User) -> Result<MessageBody, ClientError> {
        self.post("admin/add_user", user).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<MessageBody, ClientError> {
        self.post("admin/delete_user", username).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::serve;
    use super::*;
    use crate::models::Role;

    #[tokio::test]
    async fn login_posts_credentials_and_reads_role() {
        let (base, server) = serve(vec![(200, r#"{"role":"student"}"#.to_string())]).await;
        let client = ApiClient::new(base).unwrap();

        let response = client.login("sam", "pw").await.unwrap();
        assert_eq!(response.role, Role::Student);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /api/login "));
        assert!(requests[0].ends_with(r#"{"username":"sam","password":"pw"}"#));
    }

    #[tokio::test]
    async fn course_ids_are_sent_as_raw_json_scalars() {
        let body = r#"{"courses":[{"course_id":3,"notes":"","slot":""}]}"#;
        let (base, server) = serve(vec![(200, body.to_string())]).await;
        let client = ApiClient::new(base).unwrap();

        let schedule = client.add_to_schedule(3).await.unwrap();
        assert_eq!(schedule.courses[0].course_id, 3);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /api/student/add_to_schedule "));
        assert!(requests[0].ends_with("\r\n\r\n3"));
    }

    #[tokio::test]
    async fn error_body_becomes_api_error() {
        let body = r#"{"error":"Only students can view schedule"}"#;
        let (base, _server) = serve(vec![(403, body.to_string())]).await;
        let client = ApiClient::new(base).unwrap();

        match client.schedule().await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "Only students can view schedule");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_without_body_uses_status_text() {
        let (base, _server) = serve(vec![(404, String::new())]).await;
        let client = ApiClient::new(base).unwrap();

        match client.courses().await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn endpoints_resolve_under_the_base_path() {
        let client = ApiClient::new(Url::parse("http://localhost:8080/api/").unwrap()).unwrap();
        assert_eq!(
            client.endpoint("admin/get_users").unwrap().as_str(),
            "http://localhost:8080/api/admin/get_users"
        );
    }
}
