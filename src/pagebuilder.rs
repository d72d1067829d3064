/*! Pre-render pruning: turns a shipped-out vertical list into the minimal
renderable [`Page`], interpreting page-geometry directives on the way.

Everything that carries no ink (marks, penalties, insertions, zero-size glue
and kerns) is dropped; virtual characters are replaced by their expansions;
discretionaries lose their break branches. What survives is visually
equivalent to the input and is handed to the code generator as-is.
*/

use crate::color::Color;
use crate::nodes::{HNode, TexBox, VNode, Whatsit};
use crate::numerics::{Dim, ONE_INCH};

/// One fully resolved page, immutable after construction. Owned by the code
/// generator for the duration of its serialization.
#[derive(Clone,Debug)]
pub struct Page {
    /// The pruned vertical list of the page.
    pub content: TexBox,
    /// The ten page-number counters (`\count0` through `\count9`).
    pub counters: [i64; 10],
    pub media_width: Dim,
    pub media_height: Dim,
    pub h_offset: Dim,
    pub v_offset: Dim,
    pub background: Color,
}

/// Holds the page-geometry registers between pages and prunes shipped lists
/// into [`Page`]s. `papersize` and `landscape` specials encountered during
/// pruning update the registers; the change also applies to the page being
/// built.
#[derive(Clone,Debug)]
pub struct PageBuilder {
    pub media_width: Dim,
    pub media_height: Dim,
    /// The `\hoffset` register; the page origin sits one inch right of the
    /// media edge plus this.
    pub h_offset: Dim,
    /// The `\voffset` register.
    pub v_offset: Dim,
    pub background: Color,
}

impl PageBuilder {
    pub fn new(media_width: Dim, media_height: Dim) -> Self {
        Self {
            media_width,
            media_height,
            h_offset: Dim::ZERO,
            v_offset: Dim::ZERO,
            background: Color::default(),
        }
    }

    /// Prunes one shipped-out vertical box. Returns `None` if nothing
    /// ink-bearing survives; the caller must not emit a page for it.
    pub fn build(&mut self, content: TexBox, counters: [i64; 10]) -> Option<Page> {
        let Some(content) = self.prune_box(content) else {
            log::debug!("page pruned to nothing, skipping");
            return None;
        };
        Some(Page {
            content,
            counters,
            media_width: self.media_width,
            media_height: self.media_height,
            h_offset: ONE_INCH + self.h_offset,
            v_offset: ONE_INCH + self.v_offset,
            background: self.background.clone(),
        })
    }

    fn prune_vlist(&mut self, children: Vec<VNode>) -> Vec<VNode> {
        let mut ret = Vec::with_capacity(children.len());
        for c in children {
            match c {
                VNode::Penalty(_) | VNode::Mark { .. } | VNode::Insert { .. } => (),
                VNode::VSkip(s) if s.base.is_zero() => (),
                VNode::VKern { amount, .. } if amount.is_zero() => (),
                VNode::Leaders(l) if l.glue.base.is_zero() => (),
                VNode::Whatsit(w) => {
                    if let Some(w) = self.special(w) {
                        ret.push(VNode::Whatsit(w));
                    }
                }
                VNode::Box(b) => {
                    if let Some(b) = self.prune_box(b) {
                        ret.push(VNode::Box(b));
                    }
                }
                c => ret.push(c),
            }
        }
        ret
    }

    fn prune_hlist(&mut self, children: Vec<HNode>) -> Vec<HNode> {
        let mut ret = Vec::with_capacity(children.len());
        for c in children {
            match c {
                HNode::Penalty(_) | HNode::Mark { .. } | HNode::Insert { .. } => (),
                HNode::HSkip(s) | HNode::Space(s) if s.base.is_zero() => (),
                HNode::HKern { amount, .. } if amount.is_zero() => (),
                HNode::BeforeMath { surround, .. } | HNode::AfterMath { surround, .. }
                    if surround.is_zero() => (),
                HNode::Leaders(l) if l.glue.base.is_zero() => (),
                HNode::VirtualChar { expansion, .. } => {
                    // the ink of a virtual character is its expansion
                    ret.extend(self.prune_hlist(expansion.into_vec()));
                }
                HNode::Discretionary { no_break, .. } => {
                    // break branches are a line-breaking concept; the line is final
                    let no_break: Box<[HNode]> = self.prune_hlist(no_break.into_vec()).into();
                    if !no_break.is_empty() {
                        ret.push(HNode::Discretionary {
                            pre: Box::new([]),
                            post: Box::new([]),
                            no_break,
                        });
                    }
                }
                HNode::Whatsit(w) => {
                    if let Some(w) = self.special(w) {
                        ret.push(HNode::Whatsit(w));
                    }
                }
                HNode::Box(b) => {
                    if let Some(b) = self.prune_box(b) {
                        ret.push(HNode::Box(b));
                    }
                }
                c => ret.push(c),
            }
        }
        ret
    }

    fn prune_box(&mut self, b: TexBox) -> Option<TexBox> {
        let b = match b {
            TexBox::H { width, height, depth, shift, moved, children } => TexBox::H {
                width,
                height,
                depth,
                shift,
                moved,
                children: self.prune_hlist(children.into_vec()).into(),
            },
            TexBox::V { width, height, depth, shift, moved, children } => TexBox::V {
                width,
                height,
                depth,
                shift,
                moved,
                children: self.prune_vlist(children.into_vec()).into(),
            },
        };
        if b.is_empty() {
            None
        } else {
            Some(b)
        }
    }

    /// Interprets a special payload. Page-geometry directives are consumed
    /// and update the builder; anything else passes through unchanged as ink
    /// for the code generator.
    fn special(&mut self, w: Whatsit) -> Option<Whatsit> {
        let text = w.text().trim();
        if let Some(dims) = text.strip_prefix("papersize=") {
            if let Some((wd, ht)) = parse_papersize(dims) {
                log::debug!("papersize special: {} x {}", wd, ht);
                self.media_width = wd;
                self.media_height = ht;
                return None;
            }
            log::warn!("malformed papersize special: {}", text);
            return Some(w);
        }
        if text == "landscape" {
            std::mem::swap(&mut self.media_width, &mut self.media_height);
            return None;
        }
        Some(w)
    }
}

fn parse_papersize(s: &str) -> Option<(Dim, Dim)> {
    let (w, h) = s.split_once(',')?;
    Some((Dim::parse(w)?, Dim::parse(h)?))
}
