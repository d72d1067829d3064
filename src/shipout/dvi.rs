/*! The DVI instruction stream itself.

[`DviWriter`] owns the byte sink and the device state: the six position
registers, the register stack, and two pending-movement accumulators. The
walkers in the parent module report every cursor movement here immediately;
the writer holds the deltas back and serializes a single `right`/`down` per
axis only when the next inked instruction forces the device to the logical
position. Consecutive movements thus fold, movements on different axes
commute, and zero net movement vanishes from the stream, without any
backward scan over emitted bytes.
*/

use std::io::Write;

use crate::fonts::{FontDef, FontRegistry};
use crate::numerics::Dim;
use crate::utils::{Res, ShipoutError};

/// `num`/`den` of the preamble: 10^7 / 2^26 scaled points per 10^-7 m.
const NUMERATOR: u32 = 25_400_000;
const DENOMINATOR: u32 = 473_628_672;
const FORMAT_ID: u8 = 2;

#[allow(dead_code)]
pub(crate) mod opcodes {
    pub const SET_CHAR_0: u8 = 0;
    pub const SET1: u8 = 128;
    pub const SET_RULE: u8 = 132;
    pub const PUT1: u8 = 133;
    pub const PUT_RULE: u8 = 137;
    pub const NOP: u8 = 138;
    pub const BOP: u8 = 139;
    pub const EOP: u8 = 140;
    pub const PUSH: u8 = 141;
    pub const POP: u8 = 142;
    pub const RIGHT1: u8 = 143;
    pub const W0: u8 = 147;
    pub const X0: u8 = 152;
    pub const DOWN1: u8 = 157;
    pub const Y0: u8 = 161;
    pub const Z0: u8 = 166;
    pub const FNT_NUM_0: u8 = 171;
    pub const FNT1: u8 = 235;
    pub const XXX1: u8 = 239;
    pub const XXX4: u8 = 242;
    pub const FNT_DEF1: u8 = 243;
    pub const PRE: u8 = 247;
    pub const POST: u8 = 248;
    pub const POST_POST: u8 = 249;
    pub const TRAILER: u8 = 223;
}
use opcodes::*;

/// The device registers. `w`/`x`/`y`/`z` take part in the stack discipline
/// for compatibility with consumers that inspect them, but this writer never
/// assigns them; all movement goes through `right`/`down`.
#[derive(Clone,Copy,Default,Debug,PartialEq,Eq)]
struct Registers {
    h: Dim,
    v: Dim,
    #[allow(dead_code)]
    w: Dim,
    #[allow(dead_code)]
    x: Dim,
    #[allow(dead_code)]
    y: Dim,
    #[allow(dead_code)]
    z: Dim,
}

pub struct DviWriter<W: Write> {
    sink: W,
    /// Bytes written so far; doubles as the offset of the next instruction.
    pos: u32,
    regs: Registers,
    stack: Vec<Registers>,
    pending_right: Dim,
    pending_down: Dim,
    /// Offset of the most recent `bop`, `-1` before the first page.
    last_bop: i32,
    pages: u32,
    max_stack: u16,
    max_h: Dim,
    max_v: Dim,
    magnification: i64,
    comment: String,
    started: bool,
    in_page: bool,
}

impl<W: Write> DviWriter<W> {
    pub fn new(sink: W, magnification: i64, comment: String) -> Self {
        Self {
            sink,
            pos: 0,
            regs: Registers::default(),
            stack: Vec::new(),
            pending_right: Dim::ZERO,
            pending_down: Dim::ZERO,
            last_bop: -1,
            pages: 0,
            max_stack: 0,
            max_h: Dim::ZERO,
            max_v: Dim::ZERO,
            magnification,
            comment,
            started: false,
            in_page: false,
        }
    }

    /// The logical horizontal position, pending movement included.
    pub fn h(&self) -> Dim {
        self.regs.h
    }
    /// The logical vertical position, pending movement included.
    pub fn v(&self) -> Dim {
        self.regs.v
    }
    pub fn pages(&self) -> u32 {
        self.pages
    }

    fn out(&mut self, bytes: &[u8]) -> Res<()> {
        self.sink.write_all(bytes)?;
        self.pos += bytes.len() as u32;
        Ok(())
    }
    fn u8(&mut self, b: u8) -> Res<()> {
        self.out(&[b])
    }
    fn u16(&mut self, n: u16) -> Res<()> {
        self.out(&n.to_be_bytes())
    }
    fn u32(&mut self, n: u32) -> Res<()> {
        self.out(&n.to_be_bytes())
    }
    fn i32(&mut self, n: i32) -> Res<()> {
        self.out(&n.to_be_bytes())
    }
    fn dim(&mut self, d: Dim) -> Res<()> {
        self.i32(d.to_i32_clamped())
    }

    /// Serializes the pending deltas, one instruction per axis at most.
    fn flush_movement(&mut self) -> Res<()> {
        let right = std::mem::replace(&mut self.pending_right, Dim::ZERO);
        let down = std::mem::replace(&mut self.pending_down, Dim::ZERO);
        if !right.is_zero() {
            self.movement(RIGHT1, right)?;
        }
        if !down.is_zero() {
            self.movement(DOWN1, down)?;
        }
        Ok(())
    }

    /// One `right`/`down` instruction in the shortest operand width that
    /// holds the delta.
    fn movement(&mut self, base: u8, delta: Dim) -> Res<()> {
        let n = delta.to_i32_clamped();
        if -0x80 <= n && n < 0x80 {
            self.u8(base)?;
            self.out(&(n as i8).to_be_bytes())
        } else if -0x8000 <= n && n < 0x8000 {
            self.u8(base + 1)?;
            self.out(&(n as i16).to_be_bytes())
        } else if -0x80_0000 <= n && n < 0x80_0000 {
            self.u8(base + 2)?;
            self.out(&(n as u32).to_be_bytes()[1..])
        } else {
            self.u8(base + 3)?;
            self.i32(n)
        }
    }

    fn note_extent(&mut self) {
        if self.regs.h > self.max_h {
            self.max_h = self.regs.h;
        }
        if self.regs.v > self.max_v {
            self.max_v = self.regs.v;
        }
    }

    fn preamble(&mut self) -> Res<()> {
        let mag = self.magnification.clamp(0, i32::MAX as i64) as u32;
        self.u8(PRE)?;
        self.u8(FORMAT_ID)?;
        self.u32(NUMERATOR)?;
        self.u32(DENOMINATOR)?;
        self.u32(mag)?;
        let comment = std::mem::take(&mut self.comment);
        let bytes = &comment.as_bytes()[..comment.len().min(255)];
        self.u8(bytes.len() as u8)?;
        self.out(bytes)?;
        self.started = true;
        Ok(())
    }

    /// Starts a page: writes the preamble if this is the first one, then a
    /// `bop` chained to its predecessor, and resets the device state.
    pub fn begin_page(&mut self, counters: [i64; 10]) -> Res<()> {
        if self.in_page {
            return Err(ShipoutError::StreamState("bop inside an open page"));
        }
        if !self.started {
            self.preamble()?;
        }
        let this = self.pos as i32;
        self.u8(BOP)?;
        for c in counters {
            self.i32(c.clamp(i32::MIN as i64, i32::MAX as i64) as i32)?;
        }
        self.i32(self.last_bop)?;
        self.last_bop = this;
        self.regs = Registers::default();
        self.pending_right = Dim::ZERO;
        self.pending_down = Dim::ZERO;
        self.stack.clear();
        self.in_page = true;
        self.pages += 1;
        Ok(())
    }

    /// Ends the page. Pending movement is discarded; nothing after the last
    /// ink can be seen.
    pub fn end_page(&mut self) -> Res<()> {
        if !self.in_page {
            return Err(ShipoutError::StreamState("eop outside a page"));
        }
        if !self.stack.is_empty() {
            return Err(ShipoutError::StreamState("eop with unbalanced push"));
        }
        self.pending_right = Dim::ZERO;
        self.pending_down = Dim::ZERO;
        self.u8(EOP)?;
        self.in_page = false;
        Ok(())
    }

    pub fn right(&mut self, delta: Dim) -> Res<()> {
        self.pending_right = self.pending_right + delta;
        self.regs.h = self.regs.h + delta;
        self.note_extent();
        Ok(())
    }

    pub fn down(&mut self, delta: Dim) -> Res<()> {
        self.pending_down = self.pending_down + delta;
        self.regs.v = self.regs.v + delta;
        self.note_extent();
        Ok(())
    }

    pub fn push(&mut self) -> Res<()> {
        self.flush_movement()?;
        self.u8(PUSH)?;
        self.stack.push(self.regs);
        if self.stack.len() as u16 > self.max_stack {
            self.max_stack = self.stack.len() as u16;
        }
        Ok(())
    }

    pub fn pop(&mut self) -> Res<()> {
        self.flush_movement()?;
        self.u8(POP)?;
        self.regs = self.stack.pop().ok_or(ShipoutError::StackUnderflow)?;
        Ok(())
    }

    /// Typesets a character and advances horizontally by its width.
    pub fn set_char(&mut self, char: u8, width: Dim) -> Res<()> {
        self.flush_movement()?;
        if char < 128 {
            self.u8(SET_CHAR_0 + char)?;
        } else {
            self.u8(SET1)?;
            self.u8(char)?;
        }
        self.regs.h = self.regs.h + width;
        self.note_extent();
        Ok(())
    }

    /// A rule extending up and right of the cursor, advancing by its width.
    pub fn set_rule(&mut self, height: Dim, width: Dim) -> Res<()> {
        self.flush_movement()?;
        self.u8(SET_RULE)?;
        self.dim(height)?;
        self.dim(width)?;
        self.regs.h = self.regs.h + width;
        self.note_extent();
        Ok(())
    }

    /// A rule extending up and right of the cursor, without moving.
    pub fn put_rule(&mut self, height: Dim, width: Dim) -> Res<()> {
        self.flush_movement()?;
        self.u8(PUT_RULE)?;
        self.dim(height)?;
        self.dim(width)
    }

    /// Selects a previously defined font.
    pub fn font(&mut self, id: u32) -> Res<()> {
        self.flush_movement()?;
        if id < 64 {
            self.u8(FNT_NUM_0 + id as u8)
        } else if id < 256 {
            self.u8(FNT1)?;
            self.u8(id as u8)
        } else {
            self.u8(FNT1 + 1)?;
            self.u16(id as u16)
        }
    }

    /// Defines font `id`. Emitted once in the page where the font is first
    /// used and repeated verbatim in the postamble.
    pub fn font_def(&mut self, id: u32, font: &FontDef) -> Res<()> {
        self.flush_movement()?;
        if id < 256 {
            self.u8(FNT_DEF1)?;
            self.u8(id as u8)?;
        } else {
            self.u8(FNT_DEF1 + 1)?;
            self.u16(id as u16)?;
        }
        self.u32(font.checksum)?;
        self.dim(font.at_size)?;
        self.dim(font.design_size)?;
        let area = font.area.as_bytes();
        let name = font.name.as_bytes();
        self.u8(area.len().min(255) as u8)?;
        self.u8(name.len().min(255) as u8)?;
        self.out(&area[..area.len().min(255)])?;
        self.out(&name[..name.len().min(255)])
    }

    /// An `xxx` instruction carrying an uninterpreted payload.
    pub fn special(&mut self, payload: &[u8]) -> Res<()> {
        self.flush_movement()?;
        if payload.len() < 256 {
            self.u8(XXX1)?;
            self.u8(payload.len() as u8)?;
        } else {
            self.u8(XXX4)?;
            self.u32(payload.len() as u32)?;
        }
        self.out(payload)
    }

    /// Writes postamble, font definitions and trailer, and returns the sink.
    pub fn finish(mut self, fonts: &FontRegistry) -> Res<W> {
        if self.in_page {
            return Err(ShipoutError::StreamState("postamble inside an open page"));
        }
        if !self.started {
            self.preamble()?;
        }
        let mag = self.magnification.clamp(0, i32::MAX as i64) as u32;
        let post = self.pos;
        self.u8(POST)?;
        self.i32(self.last_bop)?;
        self.u32(NUMERATOR)?;
        self.u32(DENOMINATOR)?;
        self.u32(mag)?;
        self.dim(self.max_v)?;
        self.dim(self.max_h)?;
        self.u16(self.max_stack)?;
        self.u16(self.pages.min(u16::MAX as u32) as u16)?;
        for (id, font) in fonts.iter() {
            self.font_def(id, font)?;
        }
        self.u8(POST_POST)?;
        self.u32(post)?;
        self.u8(FORMAT_ID)?;
        self.u8(TRAILER)?;
        self.u8(TRAILER)?;
        self.u8(TRAILER)?;
        self.u8(TRAILER)?;
        while self.pos % 4 != 0 {
            self.u8(TRAILER)?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}
