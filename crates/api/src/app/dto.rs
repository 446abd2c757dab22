//! Request DTOs.
//!
//! Partial updates deserialize straight into the stores' `*Update` types;
//! only creation and action bodies need their own shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    /// Defaults to a slug derived from the title.
    pub slug: Option<String>,
    pub summary: String,
    pub body: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLabRequest {
    pub name: String,
    pub acronym: Option<String>,
    pub city: String,
    pub country: String,
    pub director_name: Option<String>,
    pub website_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub full_name: String,
    pub position: String,
    pub photo_url: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub is_super_admin: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub project: String,
    pub key: String,
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRolePermissionsRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignMembershipRequest {
    pub project: String,
    pub role_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetMembershipActiveRequest {
    pub project: String,
    pub is_active: bool,
}
