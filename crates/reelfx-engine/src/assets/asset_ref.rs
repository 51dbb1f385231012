//! Image references coming out of the editor.
//!
//! Generated images arrive as data URLs, sometimes with the
//! `data:<mime>;base64,` prefix applied more than once. They are cleaned up
//! here rather than rejected; an empty reference means "use the glyph".

use serde::{Deserialize, Serialize};

use crate::effects::{ParticleKind, ParticleVisual};

const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetRef {
    #[default]
    None,
    Url(String),
    DataUrl { mime: String, payload: String },
}

/// Split one `data:<mime>;base64,` prefix off `s`.
fn split_data_prefix(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("data:")?;
    let marker = rest.find(BASE64_MARKER)?;
    let mime = &rest[..marker];
    if mime.contains(',') {
        return None;
    }
    Some((mime, &rest[marker + BASE64_MARKER.len()..]))
}

/// Trim and collapse repeated data-URL prefixes. The innermost prefix wins.
pub fn normalize_asset_ref(raw: &str) -> AssetRef {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return AssetRef::None;
    }
    let Some((mut mime, mut payload)) = split_data_prefix(trimmed) else {
        return AssetRef::Url(trimmed.to_string());
    };
    let mut collapsed = 0;
    while let Some((inner_mime, inner_payload)) = split_data_prefix(payload.trim_start()) {
        mime = inner_mime;
        payload = inner_payload;
        collapsed += 1;
    }
    if collapsed > 0 {
        log::debug!("collapsed {collapsed} duplicate data-url prefix(es)");
    }
    let payload = payload.trim();
    if payload.is_empty() {
        return AssetRef::None;
    }
    AssetRef::DataUrl { mime: mime.to_string(), payload: payload.to_string() }
}

impl AssetRef {
    pub fn is_none(&self) -> bool {
        matches!(self, AssetRef::None)
    }

    /// The reference as the host should load it.
    pub fn to_url(&self) -> Option<String> {
        match self {
            AssetRef::None => None,
            AssetRef::Url(url) => Some(url.clone()),
            AssetRef::DataUrl { mime, payload } => Some(format!("data:{mime}{BASE64_MARKER}{payload}")),
        }
    }

    /// Texture if set, otherwise the kind's glyph.
    pub fn visual_for(&self, kind: ParticleKind) -> ParticleVisual {
        match self.to_url() {
            Some(url) => ParticleVisual::Texture(url),
            None => ParticleVisual::Glyph(kind.fallback_glyph()),
        }
    }
}

impl From<String> for AssetRef {
    fn from(raw: String) -> Self {
        normalize_asset_ref(&raw)
    }
}

impl From<AssetRef> for String {
    fn from(asset: AssetRef) -> Self {
        asset.to_url().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_none() {
        assert_eq!(normalize_asset_ref(""), AssetRef::None);
        assert_eq!(normalize_asset_ref("   \n"), AssetRef::None);
        assert_eq!(normalize_asset_ref("data:image/png;base64,"), AssetRef::None);
    }

    #[test]
    fn duplicate_prefixes_collapse() {
        let raw = " data:image/png;base64,data:image/png;base64,iVBORw0KGgo= ";
        assert_eq!(
            normalize_asset_ref(raw),
            AssetRef::DataUrl { mime: "image/png".into(), payload: "iVBORw0KGgo=".into() }
        );
        let triple = "data:image/jpeg;base64,data:image/webp;base64,data:image/webp;base64,UklGR";
        let asset = normalize_asset_ref(triple);
        assert_eq!(asset.to_url().as_deref(), Some("data:image/webp;base64,UklGR"));
    }

    #[test]
    fn plain_urls_pass_through() {
        assert_eq!(
            normalize_asset_ref(" assets/coin.png"),
            AssetRef::Url("assets/coin.png".into())
        );
        // not base64, left alone
        assert_eq!(
            normalize_asset_ref("data:text/plain,hello"),
            AssetRef::Url("data:text/plain,hello".into())
        );
    }

    #[test]
    fn visual_falls_back_to_glyph() {
        assert_eq!(AssetRef::None.visual_for(ParticleKind::Gem), ParticleVisual::Glyph('💎'));
        let tex = AssetRef::Url("coin.png".into()).visual_for(ParticleKind::Coin);
        assert_eq!(tex, ParticleVisual::Texture("coin.png".into()));
    }

    #[test]
    fn deserializes_through_normalization() {
        let asset: AssetRef = serde_json::from_str(r#""data:image/png;base64,data:image/png;base64,AA""#).unwrap();
        assert_eq!(asset.to_url().as_deref(), Some("data:image/png;base64,AA"));
        assert_eq!(serde_json::to_string(&AssetRef::None).unwrap(), r#""""#);
    }
}
