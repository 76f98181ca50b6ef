// Infrastructure layer - External dependencies and adapters
pub mod aws_quicksight;
pub mod config;
pub mod json_archive;
