use anyhow::{Context, Result};
use reqwest::Method;
use serde::Serialize;

use super::{ApiClient, Auth};
use crate::model::Validation;

const HUBL_VALIDATE_PATH: &str = "cos-rendering/v1/internal/validate";

#[derive(Serialize)]
struct ValidateRequest<'a> {
    template_source: &'a str,
}

/// Ask the rendering service to check `source` for HubL errors.
pub fn validate_hubl(
    client: &ApiClient,
    auth: &Auth,
    portal_id: u64,
    source: &str,
) -> Result<Validation> {
    let response = client
        .request(Method::POST, HUBL_VALIDATE_PATH, auth)
        .query(&[("portalId", portal_id)])
        .json(&ValidateRequest {
            template_source: source,
        })
        .send()
        .context("Failed to reach the HubL validation service")?
        .error_for_status()
        .context("HubL validation request failed")?;
    response
        .json::<Validation>()
        .context("Failed to parse the HubL validation response")
}
