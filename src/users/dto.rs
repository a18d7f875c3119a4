use serde::{Deserialize, Serialize};

use super::repo_types::{NewProfile, Role};

/// Request body for `POST /user`.
#[derive(Debug, Deserialize)]
pub struct UpsertUserRequest {
    pub email: String,
    pub name: Option<String>,
    #[serde(alias = "photo")]
    pub photo_url: Option<String>,
}

impl From<UpsertUserRequest> for NewProfile {
    fn from(r: UpsertUserRequest) -> Self {
        Self {
            email: r.email,
            name: r.name,
            photo_url: r.photo_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// Request body for `PATCH /user/role/update/:email`. Parsed into `Role` by the service.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}
