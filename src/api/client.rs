use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use tracing::{debug, info};

use super::types::*;
use crate::config::Config;
use crate::schedule::{Employee, EmployeeGroup, Shift, ShiftDraft};

/// Message shown inline on the login form for rejected credentials
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct ScheduleClient {
    client: Client,
    base_url: String,
    auth_header: Option<String>,
}

impl ScheduleClient {
    /// Client without a session, only good for `login`
    pub fn anonymous(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: config.api_root(),
            auth_header: None,
        })
    }

    pub fn with_token(config: &Config, token: &str) -> Result<Self> {
        let mut client = Self::anonymous(config)?;
        client.auth_header = Some(format!("Bearer {}", token));
        Ok(client)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_header {
            Some(auth) => request.header(header::AUTHORIZATION, auth),
            None => request,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .authorize(request)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, body);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GET");
        self.send(self.client.get(&url)).await
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "POST");
        self.send(self.client.post(&url).json(body)).await
    }

    async fn put<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "PUT");
        self.send(self.client.put(&url).json(body)).await
    }

    /// Exchange credentials for a session token.
    /// Rejected credentials come back as `INVALID_CREDENTIALS`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await
            .context("Could not reach the server")?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                anyhow::bail!(INVALID_CREDENTIALS)
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Sign in failed: {} - {}", status, body)
            }
            _ => {}
        }

        let session = response
            .json::<LoginResponse>()
            .await
            .context("Unexpected login response")?;
        debug!(user = %session.user.email, "login accepted");
        Ok(session)
    }

    /// Shifts whose date falls in `from..=to`, validated
    pub async fn list_shifts(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Shift>> {
        let endpoint = format!(
            "/shifts?startDate={}&endDate={}",
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        let records: Vec<ShiftRecord> = self.get(&endpoint).await?;
        let fetched = records.len();
        let shifts = validate_shifts(records);
        debug!(fetched, valid = shifts.len(), "loaded shifts");
        Ok(shifts)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        let records: Vec<EmployeeRecord> = self.get("/employees").await?;
        Ok(records.into_iter().map(Employee::from).collect())
    }

    pub async fn list_employee_groups(&self) -> Result<Vec<EmployeeGroup>> {
        let records: Vec<EmployeeGroupRecord> = self.get("/employee-groups").await?;
        Ok(records.into_iter().map(EmployeeGroup::from).collect())
    }

    /// Create or update depending on whether the draft carries an id
    pub async fn save_shift(&self, draft: &ShiftDraft) -> Result<Shift> {
        let payload = ShiftPayload::from(draft);
        let record: ShiftRecord = match &draft.id {
            Some(id) => self.put(&format!("/shifts/{}", id), &payload).await?,
            None => self.post("/shifts", &payload).await?,
        };
        let shift = Shift::try_from(record).context("Server returned an invalid shift")?;
        info!(shift_id = %shift.id, edit = draft.is_edit(), "saved shift");
        Ok(shift)
    }
}
