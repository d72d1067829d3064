/*! Fonts as the back end sees them: immutable specifications plus the
per-stream registry that assigns compact identifiers.*/

use crate::numerics::Dim;
use crate::utils::Ptr;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};

/// The already-resolved specification of a font: everything a DVI consumer
/// needs to locate and scale it. Metric data (per-glyph widths) never reaches
/// this crate; character nodes carry their resolved dimensions instead.
#[derive(Clone,Eq,PartialEq,Hash,Debug)]
pub struct FontDef {
    pub name: String,
    /// Directory part of the font specification, usually empty.
    pub area: String,
    pub checksum: u32,
    /// The size the font is loaded at ("at size").
    pub at_size: Dim,
    pub design_size: Dim,
}

/// Shared handle to a font specification. Equality is by value, so a font
/// re-created from the same specification registers identically.
pub type Font = Ptr<FontDef>;

impl FontDef {
    pub fn new<S: Into<String>>(name: S, checksum: u32, at_size: Dim, design_size: Dim) -> Font {
        Ptr::new(FontDef {
            name: name.into(),
            area: String::new(),
            checksum,
            at_size,
            design_size,
        })
    }
}
impl Display for FontDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.at_size == self.design_size {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} at {}", self.name, self.at_size)
        }
    }
}

/// Assigns compact per-stream identifiers to fonts in first-use order.
/// Append-only for the life of one output stream; the accumulated table is
/// serialized once into the postamble.
#[derive(Debug,Default)]
pub struct FontRegistry {
    ids: FxHashMap<Font, u32>,
    defs: Vec<Font>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns the font's identifier, allocating the next one on first use.
    /// The boolean is `true` iff this call created the entry, in which case
    /// the caller owes the stream a font-definition record.
    pub fn register(&mut self, font: &Font) -> (u32, bool) {
        if let Some(id) = self.ids.get(font) {
            return (*id, false);
        }
        let id = self.defs.len() as u32;
        log::debug!("font {} registered as #{}", font, id);
        self.ids.insert(font.clone(), id);
        self.defs.push(font.clone());
        (id, true)
    }
    pub fn len(&self) -> usize {
        self.defs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
    /// Registered fonts in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Font)> {
        self.defs.iter().enumerate().map(|(i, f)| (i as u32, f))
    }
}
