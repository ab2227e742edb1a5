//! Storage module for avatar images
//!
//! Provides a MinIO/S3-compatible storage client for uploading and deleting
//! user avatar images.

mod minio_client;

pub use minio_client::MinIOClient;
