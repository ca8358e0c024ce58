/// Vertical anchor of a caption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Top-aligned, inset from the top edge.
    Top,
    /// Bottom-aligned, inset from the bottom edge.
    Bottom,
}

/// One caption. Empty text means the caption is omitted.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Caption {
    /// Caption text.
    pub text: String,
    /// Where the caption sits.
    pub anchor: Anchor,
}

impl Caption {
    /// `true` when nothing should be drawn.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The fixed top/bottom caption pair of a composition.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Captions {
    /// Top caption text.
    pub top: String,
    /// Bottom caption text.
    pub bottom: String,
}

impl Captions {
    /// Pair with both texts set.
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
        }
    }

    /// Text for `anchor`.
    pub fn get(&self, anchor: Anchor) -> &str {
        match anchor {
            Anchor::Top => &self.top,
            Anchor::Bottom => &self.bottom,
        }
    }

    /// Replace the text for `anchor`. Returns `true` if it changed.
    pub fn set(&mut self, anchor: Anchor, text: impl Into<String>) -> bool {
        let slot = match anchor {
            Anchor::Top => &mut self.top,
            Anchor::Bottom => &mut self.bottom,
        };
        let text = text.into();
        if *slot == text {
            return false;
        }
        *slot = text;
        true
    }

    /// Both captions in draw order (top, then bottom).
    pub fn captions(&self) -> [Caption; 2] {
        [
            Caption {
                text: self.top.clone(),
                anchor: Anchor::Top,
            },
            Caption {
                text: self.bottom.clone(),
                anchor: Anchor::Bottom,
            },
        ]
    }

    /// `true` when neither caption has text.
    pub fn is_blank(&self) -> bool {
        self.top.is_empty() && self.bottom.is_empty()
    }
}
