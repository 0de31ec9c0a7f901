use serde::{Deserialize, Serialize};
use steam_id::{LegacySteamId, SteamId};
use url::Url;

/// A user profile in the shape sign-on consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Always `"steam"`.
    pub provider: String,

    /// The user's SteamID; serialized as a stringified `u64`.
    pub id: SteamId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<LegacySteamId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Small, medium and full avatar, in that order. Avatars Steam did not return are left out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Photo>>,

    /// The raw player object returned by the Steam Web API.
    #[serde(rename = "_json", default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub value: Url,
}

impl Profile {
    pub const PROVIDER: &'static str = "steam";

    /// A profile that carries nothing but the SteamID.
    pub fn minimal(id: SteamId) -> Self {
        Self {
            provider: Self::PROVIDER.to_owned(),
            id,
            sid: None,
            display_name: None,
            photos: None,
            json: None,
        }
    }
}
