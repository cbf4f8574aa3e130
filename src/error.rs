use std::{env::VarError, io::Error as IO_ERROR, num::ParseIntError};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Error as ANYHOW_ERROR;
use base64::DecodeError as BASE64_DECODE_ERROR;
use ece::Error as ECE_ERROR;
use jsonwebtoken::errors::Error as JWT_ERROR;
use reqwest::header::InvalidHeaderValue as INVALID_HEADER_VALUE;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use sqlx::error::Error as SQL_ERROR;
use thiserror::Error;
use tokio::task::JoinError as TOKIO_JOIN_ERROR;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    Base64DecodeError(#[from] BASE64_DECODE_ERROR),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Subscription already exists: {0}")]
    DuplicateSubscription(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    AnyHowError(#[from] ANYHOW_ERROR),

    #[error("{0}")]
    InvalidHeaderValue(#[from] INVALID_HEADER_VALUE),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("Ece error: {0}")]
    EceError(#[from] ECE_ERROR),

    #[error("{0}")]
    JWT(#[from] JWT_ERROR),

    #[error("{0}")]
    TokioJoinError(#[from] TOKIO_JOIN_ERROR),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - client sent invalid input
            Error::InvalidEndpoint(_)
            | Error::MissingField(_)
            | Error::URL(_) => StatusCode::BAD_REQUEST,

            // 409 Conflict - lost an insert race on the same (user, endpoint)
            Error::DuplicateSubscription(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway - upstream push service error
            Error::ReqwestError(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error - everything else
            Error::Io(_)
            | Error::INT(_)
            | Error::SQL(_)
            | Error::VAR(_)
            | Error::JsonError(_)
            | Error::Base64DecodeError(_)
            | Error::ConfigurationError(_)
            | Error::StoreError(_)
            | Error::SetGlobalDefaultError(_)
            | Error::AnyHowError(_)
            | Error::InvalidHeaderValue(_)
            | Error::EceError(_)
            | Error::JWT(_)
            | Error::TokioJoinError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "message": self.to_string(),
            "status": status.as_u16(),
        });
        HttpResponse::build(status).json(body)
    }
}
