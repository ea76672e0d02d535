//
//  athenahealth
//  api/risk_contracts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Risk contract resource operations.
//!
//! Risk contracts represent value-based payment arrangements. Two endpoint
//! families are covered here:
//!
//! - **Patient chart risk contracts**: the contracts applied to an
//!   individual patient's chart
//!   (`/chart/{patientid}/riskcontract`)
//! - **Risk contract references**: the practice-wide contract definitions
//!   patients are enrolled into
//!   (`/populationmanagement/riskcontract`)
//!
//! # Example
//!
//! ```rust,no_run
//! use athenahealth::AthenaClient;
//! use athenahealth::api::risk_contracts::CreateRiskContractOptions;
//!
//! # async fn example(client: &AthenaClient) -> Result<(), athenahealth::ApiError> {
//! let opts = CreateRiskContractOptions {
//!     risk_contract_id: 789,
//!     effective_date: "01/15/2024".to_string(),
//!     ..Default::default()
//! };
//! client.create_risk_contract("4772", &opts).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Notes
//!
//! - Dates are exchanged in the API's `MM/DD/YYYY` format
//! - Wire field names are all-lowercase, matching the remote exactly

use serde::{Deserialize, Serialize};

use crate::api::client::AthenaClient;
use crate::api::common::{ApiError, MessageResponse};

/// A risk contract applied to a patient's chart.
///
/// # Fields
///
/// * `contract_name` - Display name of the contract
/// * `effective_date` - Start of coverage, `MM/DD/YYYY`
/// * `expiration_date` - End of coverage, `MM/DD/YYYY` (may be empty)
/// * `risk_contract_id` - Identifier of the contract reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskContract {
    /// Display name of the contract.
    #[serde(default, rename = "contractname")]
    pub contract_name: String,

    /// Start of coverage, `MM/DD/YYYY`.
    #[serde(default, rename = "effectivedate")]
    pub effective_date: String,

    /// End of coverage, `MM/DD/YYYY`; empty for open-ended contracts.
    #[serde(default, rename = "expirationdate")]
    pub expiration_date: String,

    /// Identifier of the underlying contract reference.
    #[serde(default, rename = "riskcontractid")]
    pub risk_contract_id: i64,
}

/// Options for listing a patient's risk contracts.
///
/// All fields are optional; `Default::default()` lists every contract on
/// the patient's chart in the caller's department context.
#[derive(Debug, Clone, Default)]
pub struct ListRiskContractsOptions {
    /// Restrict results to one department.
    pub department_id: Option<String>,

    /// If true, retrieve the record indicating a risk contract is applied
    /// to all charts associated with the patient.
    pub all_charts: bool,
}

/// Options for creating or updating a patient's risk contract.
///
/// `risk_contract_id` and `effective_date` are required; everything else
/// defaults to absent.
#[derive(Debug, Clone, Default)]
pub struct CreateRiskContractOptions {
    /// Identifier of the contract reference to apply. Required.
    pub risk_contract_id: i64,

    /// Start of coverage, `MM/DD/YYYY`. Required.
    pub effective_date: String,

    /// End of coverage, `MM/DD/YYYY`.
    pub expiration_date: Option<String>,

    /// Department the contract applies in.
    pub department_id: Option<i64>,

    /// If true, apply this update to all charts associated with the
    /// patient.
    pub all_charts: bool,
}

/// Options for deleting a patient's risk contract.
#[derive(Debug, Clone, Default)]
pub struct DeleteRiskContractOptions {
    /// Department the delete applies in.
    pub department_id: Option<i64>,

    /// If true, apply this delete to all charts associated with the
    /// patient.
    pub all_charts: bool,
}

/// A practice-wide risk contract definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskContractReference {
    /// Identifier of the contract reference.
    #[serde(default, rename = "riskcontractid")]
    pub risk_contract_id: i64,

    /// Display name of the contract.
    #[serde(default)]
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Options for looking up a risk contract reference.
///
/// At least one of `risk_contract_id` or `name` must be set.
#[derive(Debug, Clone, Default)]
pub struct GetRiskContractReferenceOptions {
    /// Look up by identifier.
    pub risk_contract_id: Option<i64>,

    /// Look up by exact name.
    pub name: Option<String>,
}

/// Options for creating or updating a risk contract reference.
///
/// Omitting `risk_contract_id` creates a new reference; supplying it
/// updates the existing one.
#[derive(Debug, Clone, Default)]
pub struct UpdateRiskContractReferenceOptions {
    /// Identifier of an existing reference to update.
    pub risk_contract_id: Option<i64>,

    /// Display name. Required.
    pub name: String,

    /// Free-text description.
    pub description: Option<String>,
}

impl AthenaClient {
    /// Lists the risk contracts associated with a patient.
    ///
    /// `GET /v1/{practiceid}/chart/{patientid}/riskcontract`
    ///
    /// <https://docs.athenahealth.com/api/api-ref/patient-risk-contract>
    ///
    /// # Parameters
    ///
    /// * `patient_id` - The patient whose chart to read
    /// * `opts` - Optional filters; `None` uses the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    pub async fn list_risk_contracts(
        &self,
        patient_id: &str,
        opts: Option<&ListRiskContractsOptions>,
    ) -> Result<Vec<RiskContract>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();

        if let Some(opts) = opts {
            if let Some(department_id) = &opts.department_id {
                query.push(("departmentid", department_id.clone()));
            }

            if opts.all_charts {
                query.push(("allcharts", "true".to_string()));
            }
        }

        self.get(&format!("/chart/{}/riskcontract", patient_id), &query)
            .await
    }

    /// Creates a new risk contract on a patient's chart.
    ///
    /// `PUT /v1/{practiceid}/chart/{patientid}/riskcontract`
    ///
    /// <https://docs.athenahealth.com/api/api-ref/patient-risk-contract>
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] before any network activity
    /// when `risk_contract_id` or `effective_date` is unset; otherwise
    /// errors propagate from the underlying request.
    pub async fn create_risk_contract(
        &self,
        patient_id: &str,
        opts: &CreateRiskContractOptions,
    ) -> Result<(), ApiError> {
        if opts.risk_contract_id <= 0 {
            return Err(ApiError::InvalidArgument(
                "risk_contract_id is required".to_string(),
            ));
        }

        if opts.effective_date.is_empty() {
            return Err(ApiError::InvalidArgument(
                "effective_date is required".to_string(),
            ));
        }

        let mut form: Vec<(&str, String)> = vec![
            ("riskcontractid", opts.risk_contract_id.to_string()),
            ("effectivedate", opts.effective_date.clone()),
        ];

        if let Some(expiration_date) = &opts.expiration_date {
            form.push(("expirationdate", expiration_date.clone()));
        }

        if let Some(department_id) = opts.department_id {
            form.push(("departmentid", department_id.to_string()));
        }

        if opts.all_charts {
            form.push(("allcharts", "true".to_string()));
        }

        let _ack: MessageResponse = self
            .put_form(&format!("/chart/{}/riskcontract", patient_id), &form)
            .await?;

        Ok(())
    }

    /// Deletes a risk contract from a patient's chart.
    ///
    /// `DELETE /v1/{practiceid}/chart/{patientid}/riskcontract/{riskcontractid}`
    ///
    /// <https://docs.athenahealth.com/api/api-ref/patient-risk-contract>
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the
    /// delete.
    pub async fn delete_risk_contract(
        &self,
        patient_id: &str,
        risk_contract_id: i64,
        opts: Option<&DeleteRiskContractOptions>,
    ) -> Result<(), ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();

        if let Some(opts) = opts {
            if let Some(department_id) = opts.department_id {
                query.push(("departmentid", department_id.to_string()));
            }

            if opts.all_charts {
                query.push(("allcharts", "true".to_string()));
            }
        }

        let _ack: MessageResponse = self
            .delete(
                &format!("/chart/{}/riskcontract/{}", patient_id, risk_contract_id),
                &query,
            )
            .await?;

        Ok(())
    }

    /// Looks up a practice-wide risk contract reference.
    ///
    /// `GET /v1/{practiceid}/populationmanagement/riskcontract`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] when neither
    /// `risk_contract_id` nor `name` is set.
    pub async fn get_risk_contract_reference(
        &self,
        opts: &GetRiskContractReferenceOptions,
    ) -> Result<RiskContractReference, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();

        if let Some(risk_contract_id) = opts.risk_contract_id {
            query.push(("riskcontractid", risk_contract_id.to_string()));
        }

        if let Some(name) = &opts.name {
            query.push(("name", name.clone()));
        }

        if query.is_empty() {
            return Err(ApiError::InvalidArgument(
                "one of risk_contract_id or name is required".to_string(),
            ));
        }

        self.get("/populationmanagement/riskcontract", &query).await
    }

    /// Creates or updates a practice-wide risk contract reference.
    ///
    /// `PUT /v1/{practiceid}/populationmanagement/riskcontract`
    ///
    /// Supplying `risk_contract_id` updates an existing reference;
    /// omitting it creates a new one. The returned reference carries the
    /// assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] when `name` is empty.
    pub async fn update_risk_contract_reference(
        &self,
        opts: &UpdateRiskContractReferenceOptions,
    ) -> Result<RiskContractReference, ApiError> {
        if opts.name.is_empty() {
            return Err(ApiError::InvalidArgument("name is required".to_string()));
        }

        let mut form: Vec<(&str, String)> = Vec::new();

        if let Some(risk_contract_id) = opts.risk_contract_id {
            form.push(("riskcontractid", risk_contract_id.to_string()));
        }

        form.push(("name", opts.name.clone()));

        if let Some(description) = &opts.description {
            form.push(("description", description.clone()));
        }

        self.put_form("/populationmanagement/riskcontract", &form)
            .await
    }
}
