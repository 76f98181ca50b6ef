// Domain layer - Resource models and the error taxonomy
pub mod analysis;
pub mod arn;
pub mod credentials;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod permission;
pub mod status;
pub mod template;
