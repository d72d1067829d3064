/*! Code generation: walks [`Page`]s and drives the DVI instruction stream.

The walkers keep a logical cursor and report movement to the
[`DviWriter`](dvi::DviWriter) eagerly; the writer defers serialization until
ink forces it, so pure movement never reaches the stream. Nested boxes are
bracketed in `push`/`pop`, which also restores the cursor to the list's edge
after every child.

One [`Shipout`] value corresponds to one output stream and owns all
stream-scoped state: the writer, the font registry and the active color.
Fresh state for a new document means a fresh value, per-page state is reset in
[`ship_page`](Shipout::ship_page).
*/

use std::io::Write;

use crate::color::{Color, ColorConverter, ColorState, NoConversion};
use crate::fonts::{Font, FontRegistry};
use crate::nodes::horizontal::DEFAULT_RULE;
use crate::nodes::{HNode, LeaderKind, LeaderPattern, Leaders, NodeTrait, TexBox, VNode};
use crate::numerics::{Dim, ONE_INCH};
use crate::pagebuilder::Page;
use crate::utils::Res;

pub mod dvi;
use dvi::DviWriter;

/// Per-stream knobs, fixed at construction.
#[derive(Clone,Debug)]
pub struct ShipoutSettings {
    /// Emit color escapes. When off, ink colors are ignored entirely.
    pub use_colors: bool,
    /// File extension the output is conventionally stored under.
    pub extension: String,
    /// `\mag`: magnification in thousandths, recorded in pre- and postamble.
    pub magnification: i64,
}
impl Default for ShipoutSettings {
    fn default() -> Self {
        Self {
            use_colors: true,
            extension: "dvi".into(),
            magnification: 1000,
        }
    }
}

/// Horizontal-list context: everything a child needs from its enclosing box.
#[derive(Clone,Copy)]
struct HCtx {
    left_edge: Dim,
    height: Dim,
    depth: Dim,
}

/// Vertical-list context. The left edge needs no slot of its own: `h` is
/// restored to it after every child.
#[derive(Clone,Copy)]
struct VCtx {
    top_edge: Dim,
    width: Dim,
}

pub struct Shipout<W: Write> {
    writer: DviWriter<W>,
    fonts: FontRegistry,
    colors: ColorState,
    converter: Box<dyn ColorConverter>,
    settings: ShipoutSettings,
    /// Identifier of the font selected in the stream, reset at every `bop`.
    current_font: Option<u32>,
}

impl<W: Write> Shipout<W> {
    pub fn new(sink: W, settings: ShipoutSettings) -> Self {
        let comment = format!(
            " tex_dvi output {}",
            chrono::Local::now().format("%Y.%m.%d:%H%M")
        );
        Self {
            writer: DviWriter::new(sink, settings.magnification, comment),
            fonts: FontRegistry::new(),
            colors: ColorState::new(),
            converter: Box::new(NoConversion),
            settings,
            current_font: None,
        }
    }

    /// Replaces the color converter used for non-primitive color spaces.
    pub fn with_converter(mut self, converter: Box<dyn ColorConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }
    pub fn pages(&self) -> u32 {
        self.writer.pages()
    }
    pub fn settings(&self) -> &ShipoutSettings {
        &self.settings
    }

    /// Serializes one page. The cursor starts at the page origin, one inch in
    /// from either media edge, adjusted by the page's offset registers.
    pub fn ship_page(&mut self, page: &Page) -> Res<()> {
        log::debug!("shipping page [{}]", page.counters[0]);
        log::trace!("page content:{}", page.content.display());
        self.writer.begin_page(page.counters)?;
        self.colors.reset();
        self.current_font = None;
        if self.settings.use_colors {
            self.page_background(page)?;
        }
        self.writer.right(page.h_offset - ONE_INCH)?;
        self.writer.down(page.v_offset - ONE_INCH + page.content.height())?;
        // the cursor now sits on the reference point of the page box
        match &page.content {
            TexBox::H { children, height, depth, .. } => {
                let ctx = HCtx {
                    left_edge: self.writer.h(),
                    height: *height,
                    depth: *depth,
                };
                self.walk_h(children, ctx)?;
            }
            TexBox::V { children, height, width, .. } => {
                self.writer.down(-*height)?;
                let ctx = VCtx {
                    top_edge: self.writer.v(),
                    width: *width,
                };
                self.walk_v(children, ctx)?;
            }
        }
        self.writer.end_page()
    }

    /// Writes postamble and trailer and hands the sink back.
    pub fn finish(self) -> Res<W> {
        log::debug!(
            "finishing stream: {} pages, {} fonts",
            self.writer.pages(),
            self.fonts.len()
        );
        self.writer.finish(&self.fonts)
    }

    fn page_background(&mut self, page: &Page) -> Res<()> {
        if page.background == Color::default() {
            return Ok(());
        }
        let resolved = match &page.background {
            Color::Named(name) => self.converter.resolve(name),
            c => Some(c.clone()),
        };
        match resolved.and_then(|c| c.render()) {
            Some(sub) => self.writer.special(format!("background {}", sub).as_bytes()),
            None => {
                log::debug!("no conversion for background {:?}, skipping", page.background);
                Ok(())
            }
        }
    }

    fn walk_h(&mut self, children: &[HNode], ctx: HCtx) -> Res<()> {
        for c in children {
            match c {
                HNode::Char { char, font, width, color, .. }
                | HNode::Ligature { char, font, width, color, .. } => {
                    self.do_char(*char, font, *width, color)?
                }
                HNode::VirtualChar { expansion, .. } => self.walk_h(expansion, ctx)?,
                HNode::HSkip(s) | HNode::Space(s) => self.writer.right(s.base)?,
                HNode::HKern { amount, .. } => self.writer.right(*amount)?,
                HNode::BeforeMath { surround, .. } | HNode::AfterMath { surround, .. } => {
                    self.writer.right(*surround)?
                }
                HNode::VRule { width, height, depth } => {
                    let wd = width.unwrap_or(DEFAULT_RULE);
                    let ht = height.unwrap_or(ctx.height);
                    let dp = depth.unwrap_or(ctx.depth);
                    self.rule_h(wd, ht, dp)?;
                }
                HNode::Box(b) => self.hlist_box(b)?,
                HNode::Leaders(l) => self.hleaders(l, ctx)?,
                // only the unbreakable branch of a final line carries ink
                HNode::Discretionary { no_break, .. } => self.walk_h(no_break, ctx)?,
                HNode::Whatsit(w) => self.writer.special(w.text().as_bytes())?,
                HNode::Penalty(_) | HNode::Mark { .. } | HNode::Insert { .. } => (),
            }
        }
        Ok(())
    }

    fn walk_v(&mut self, children: &[VNode], ctx: VCtx) -> Res<()> {
        for c in children {
            match c {
                VNode::VSkip(s) => self.writer.down(s.base)?,
                VNode::VKern { amount, .. } => self.writer.down(*amount)?,
                VNode::HRule { width, height, depth } => {
                    let wd = width.unwrap_or(ctx.width);
                    let ht = height.unwrap_or(DEFAULT_RULE);
                    let dp = depth.unwrap_or(Dim::ZERO);
                    self.rule_v(wd, ht, dp)?;
                }
                VNode::Box(b) => self.vlist_box(b)?,
                VNode::Leaders(l) => self.vleaders(l, ctx)?,
                VNode::Whatsit(w) => self.writer.special(w.text().as_bytes())?,
                VNode::Penalty(_) | VNode::Mark { .. } | VNode::Insert { .. } => (),
            }
        }
        Ok(())
    }

    /// A child box inside a horizontal list: bracketed in `push`/`pop`, so
    /// the cursor lands back on the baseline, then advanced by the box width.
    fn hlist_box(&mut self, b: &TexBox) -> Res<()> {
        self.writer.push()?;
        self.writer.down(b.shift())?;
        self.writer.right(b.moved())?;
        match b {
            TexBox::H { children, height, depth, .. } => {
                let inner = HCtx {
                    left_edge: self.writer.h(),
                    height: *height,
                    depth: *depth,
                };
                self.walk_h(children, inner)?;
            }
            TexBox::V { children, height, width, .. } => {
                self.writer.down(-*height)?;
                let inner = VCtx {
                    top_edge: self.writer.v(),
                    width: *width,
                };
                self.walk_v(children, inner)?;
            }
        }
        self.writer.pop()?;
        self.writer.right(b.width())
    }

    /// A child box inside a vertical list; the vertical advance is the box's
    /// advertised height plus depth.
    fn vlist_box(&mut self, b: &TexBox) -> Res<()> {
        self.writer.down(b.height())?;
        self.writer.push()?;
        self.writer.right(b.shift())?;
        self.writer.down(b.moved())?;
        match b {
            TexBox::H { children, height, depth, .. } => {
                let inner = HCtx {
                    left_edge: self.writer.h(),
                    height: *height,
                    depth: *depth,
                };
                self.walk_h(children, inner)?;
            }
            TexBox::V { children, height, width, .. } => {
                self.writer.down(-*height)?;
                let inner = VCtx {
                    top_edge: self.writer.v(),
                    width: *width,
                };
                self.walk_v(children, inner)?;
            }
        }
        self.writer.pop()?;
        self.writer.down(b.depth())
    }

    /// A rule in a horizontal list: painted from the baseline, advancing by
    /// its width. Degenerate rules advance without ink.
    fn rule_h(&mut self, wd: Dim, ht: Dim, dp: Dim) -> Res<()> {
        if wd > Dim::ZERO && ht + dp > Dim::ZERO {
            self.writer.down(dp)?;
            self.writer.set_rule(ht + dp, wd)?;
            self.writer.down(-dp)
        } else {
            self.writer.right(wd)
        }
    }

    /// A rule in a vertical list: the cursor drops by the full thickness and
    /// the rule is painted upwards from there, without horizontal movement.
    fn rule_v(&mut self, wd: Dim, ht: Dim, dp: Dim) -> Res<()> {
        self.writer.down(ht + dp)?;
        if wd > Dim::ZERO && ht + dp > Dim::ZERO {
            self.writer.put_rule(ht + dp, wd)?;
        }
        Ok(())
    }

    /// Repeats the leader pattern across the glue. Rule patterns stretch to
    /// fill the glue in one piece instead of repeating.
    fn hleaders(&mut self, l: &Leaders, ctx: HCtx) -> Res<()> {
        let total = l.glue.base;
        if let LeaderPattern::Rule { height, depth, .. } = &l.pattern {
            let ht = height.unwrap_or(ctx.height);
            let dp = depth.unwrap_or(ctx.depth);
            return self.rule_h(total, ht, dp);
        }
        let LeaderPattern::Box(pattern) = &l.pattern else {
            return self.writer.right(total);
        };
        let unit = pattern.width();
        if unit <= Dim::ZERO || unit > total {
            return self.writer.right(total);
        }
        let edge = self.writer.h() + total;
        let mut gap = Dim::ZERO;
        match l.kind {
            LeaderKind::Aligned => {
                // snap to the repetition grid anchored at the box's left edge
                let off = (self.writer.h() - ctx.left_edge).0.rem_euclid(unit.0);
                if off != 0 {
                    self.writer.right(Dim(unit.0 - off))?;
                }
            }
            LeaderKind::Centered => {
                let count = total.0 / unit.0;
                self.writer.right(Dim((total.0 - count * unit.0) / 2))?;
            }
            LeaderKind::Expanded => {
                let count = total.0 / unit.0;
                let leftover = total.0 % unit.0;
                gap = Dim(leftover / (count + 1));
                self.writer.right(Dim((leftover - (count - 1) * gap.0) / 2))?;
            }
        }
        while self.writer.h() + unit <= edge {
            self.hlist_box(pattern)?;
            self.writer.right(gap)?;
        }
        self.writer.right(edge - self.writer.h())
    }

    fn vleaders(&mut self, l: &Leaders, ctx: VCtx) -> Res<()> {
        let total = l.glue.base;
        if let LeaderPattern::Rule { width, .. } = &l.pattern {
            let wd = width.unwrap_or(ctx.width);
            return self.rule_v(wd, total, Dim::ZERO);
        }
        let LeaderPattern::Box(pattern) = &l.pattern else {
            return self.writer.down(total);
        };
        let unit = pattern.height() + pattern.depth();
        if unit <= Dim::ZERO || unit > total {
            return self.writer.down(total);
        }
        let edge = self.writer.v() + total;
        let mut gap = Dim::ZERO;
        match l.kind {
            LeaderKind::Aligned => {
                let off = (self.writer.v() - ctx.top_edge).0.rem_euclid(unit.0);
                if off != 0 {
                    self.writer.down(Dim(unit.0 - off))?;
                }
            }
            LeaderKind::Centered => {
                let count = total.0 / unit.0;
                self.writer.down(Dim((total.0 - count * unit.0) / 2))?;
            }
            LeaderKind::Expanded => {
                let count = total.0 / unit.0;
                let leftover = total.0 % unit.0;
                gap = Dim(leftover / (count + 1));
                self.writer.down(Dim((leftover - (count - 1) * gap.0) / 2))?;
            }
        }
        while self.writer.v() + unit <= edge {
            self.vlist_box(pattern)?;
            self.writer.down(gap)?;
        }
        self.writer.down(edge - self.writer.v())
    }

    /// Font selection, color switch and the character itself. The cursor
    /// advances by the width resolved upstream; no metric lookup happens here.
    fn do_char(&mut self, char: u8, font: &Font, width: Dim, color: &Color) -> Res<()> {
        let (id, newly_defined) = self.fonts.register(font);
        if newly_defined {
            self.writer.font_def(id, font)?;
        }
        if self.current_font != Some(id) {
            self.writer.font(id)?;
            self.current_font = Some(id);
        }
        if self.settings.use_colors {
            if let Some(payload) = self.colors.switch_if_needed(color, &*self.converter) {
                self.writer.special(payload.as_bytes())?;
            }
        }
        self.writer.set_char(char, width)
    }
}
