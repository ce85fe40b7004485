//! 能力开关 DTO

use serde::{Deserialize, Serialize};

use crate::services::CapabilityGrant;
use crate::services::hacks::{DEFAULT_AIM_SENSITIVITY, DEFAULT_SPEED_MULTIPLIER};

fn default_multiplier() -> f64 {
    DEFAULT_SPEED_MULTIPLIER
}

fn default_sensitivity() -> f64 {
    DEFAULT_AIM_SENSITIVITY
}

#[derive(Debug, Deserialize)]
pub struct UnlimitedResourcesRequest {
    pub pid: u32,
    pub resource_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeedBoostRequest {
    pub pid: u32,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

#[derive(Debug, Deserialize)]
pub struct AutoAimRequest {
    pub pid: u32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
}

/// 能力开关响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HackResponse {
    pub message: String,
    pub session_id: String,
}

impl From<CapabilityGrant> for HackResponse {
    fn from(grant: CapabilityGrant) -> Self {
        Self {
            message: grant.message,
            session_id: grant.session.id,
        }
    }
}
