//! Body and query extractors whose rejections render as `Error::Validation`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// `axum::Json` with malformed or mistyped bodies answered as 400 `{"error": ..}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ValidJson<T>(pub T);

/// `axum::extract::Query` with the same rejection contract.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ValidQuery<T>(pub T);
