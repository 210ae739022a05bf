//! Banner Model (home page hero slides)

use serde::{Deserialize, Serialize};

/// Banner entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Banner {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub button_text: String,
    pub button_link: String,
    pub text_color: String,
    /// 0-100
    pub overlay_opacity: i32,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create banner payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerCreate {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub text_color: Option<String>,
    pub overlay_opacity: Option<i32>,
    pub is_active: Option<bool>,
}

/// Update banner payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BannerUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    pub text_color: Option<String>,
    pub overlay_opacity: Option<i32>,
    pub is_active: Option<bool>,
}

/// Direction for reordering a banner relative to its neighbour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

pub const DEFAULT_BUTTON_TEXT: &str = "Shop Now";
pub const DEFAULT_BUTTON_LINK: &str = "/";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_OVERLAY_OPACITY: i32 = 40;
