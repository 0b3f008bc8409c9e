//! Presentation attributes passed through to renderers

use serde::Serialize;
use serde_yaml::Value;

use crate::parser::AppearanceDef;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Appearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
}

impl From<AppearanceDef> for Appearance {
    fn from(def: AppearanceDef) -> Self {
        let non_blank = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            color: non_blank(def.color.map(|c| c.into_string())),
            bgcolor: non_blank(def.bgcolor),
            bgcolor_title: non_blank(def.bgcolor_title),
            notes: def.notes,
            image: def.image,
        }
    }
}
