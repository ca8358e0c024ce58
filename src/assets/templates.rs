use crate::assets::reference::SourceAsset;
use crate::foundation::error::{MemeError, MemeResult};

/// A preset template shipped with the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Template {
    /// Catalog id.
    pub id: u32,
    /// Display name.
    pub name: &'static str,
    /// Remote image URL.
    pub url: &'static str,
}

const PRESETS: &[Template] = &[
    Template {
        id: 1,
        name: "One Does Not Simply",
        url: "https://i.imgflip.com/1bij.jpg",
    },
    Template {
        id: 2,
        name: "Distracted Boyfriend",
        url: "https://i.imgflip.com/1bgw.jpg",
    },
    Template {
        id: 3,
        name: "Drake Hotline Bling",
        url: "https://i.imgflip.com/30b1gx.jpg",
    },
    Template {
        id: 4,
        name: "Two Buttons",
        url: "https://i.imgflip.com/1g8my4.jpg",
    },
    Template {
        id: 5,
        name: "Change My Mind",
        url: "https://i.imgflip.com/24y43o.jpg",
    },
];

/// All preset templates in catalog order.
pub fn presets() -> &'static [Template] {
    PRESETS
}

/// Look up a preset by id.
pub fn find(id: u32) -> Option<Template> {
    PRESETS.iter().copied().find(|t| t.id == id)
}

impl Template {
    /// Selectable asset for this template.
    pub fn to_asset(self) -> MemeResult<SourceAsset> {
        SourceAsset::template(self.id, self.name, self.url)
    }
}

/// Selectable asset for preset `id`.
pub fn asset(id: u32) -> MemeResult<SourceAsset> {
    find(id)
        .ok_or_else(|| MemeError::validation(format!("unknown template id {id}")))?
        .to_asset()
}
