#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod extract;
pub mod guard;
pub mod handler;
pub mod middleware;
pub mod service;
mod utility;

pub use crate::service::{Result, ServiceError, ServiceErrorKind};
