//! Registration exchange with the visitor API
//!
//! `POST /api/visitors` takes the visitor's details and answers with the
//! created pass record, pass id included.

use chrono::{DateTime, Utc};
use gatepass_util::lenient_timestamp;
use serde::Serialize;
use thiserror::Error;

use crate::VisitorType;

/// Body of a registration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub full_name: String,
    pub phone: String,
    pub visitor_type: VisitorType,
    pub purpose: String,
    pub host_name: String,
    #[serde(skip_serializing_if = "Option::is_none", with = "lenient_timestamp")]
    pub valid_until: Option<DateTime<Utc>>,
}

/// Why a registration cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Visitor name is required")]
    MissingName,

    #[error("Multi-day passes need a valid-until date")]
    MissingValidUntil,
}

impl RegistrationRequest {
    pub fn new(full_name: impl Into<String>, visitor_type: VisitorType) -> Self {
        Self {
            full_name: full_name.into(),
            phone: String::new(),
            visitor_type,
            purpose: String::new(),
            host_name: String::new(),
            valid_until: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_host(mut self, host_name: impl Into<String>, purpose: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self.purpose = purpose.into();
        self
    }

    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Check the request and put it in the shape the API expects.
    ///
    /// One-day passes never send a deadline; the API assigns it. Multi-day
    /// passes must carry one.
    pub fn prepare(mut self) -> Result<Self, RegistrationError> {
        self.full_name = self.full_name.trim().to_string();
        if self.full_name.is_empty() {
            return Err(RegistrationError::MissingName);
        }

        match self.visitor_type {
            VisitorType::OneDay => self.valid_until = None,
            VisitorType::MultiDay if self.valid_until.is_none() => {
                return Err(RegistrationError::MissingValidUntil)
            }
            VisitorType::MultiDay => {}
        }
        Ok(self)
    }
}
