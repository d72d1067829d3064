/*! The closed set of layout node variants.

Nodes arrive here fully laid out: every bounding box (width/height/depth) has
already been resolved by the paragraph builder upstream, and consumers in this
crate trust those dimensions rather than re-measuring children. Dispatch is by
exhaustive pattern matching on the [`HNode`](horizontal::HNode) /
[`VNode`](vertical::VNode) enums, so an unhandled variant is a compile error.
*/

pub mod boxes;
pub mod horizontal;
pub mod vertical;

use crate::numerics::{Dim, Glue};
use std::fmt::Formatter;

pub use boxes::TexBox;
pub use horizontal::HNode;
pub use vertical::VNode;

/// The coarse classification of a node, mirroring the classic node taxonomy.
#[derive(Clone,Copy,Eq,PartialEq,Debug)]
pub enum NodeType {
    Char,
    Rule,
    Glue,
    Kern,
    Penalty,
    Mark,
    Insertion,
    Discretionary,
    Math,
    Whatsit,
    Leaders,
    Box,
}

pub trait NodeTrait {
    fn height(&self) -> Dim;
    fn width(&self) -> Dim;
    fn depth(&self) -> Dim;
    fn nodetype(&self) -> NodeType;
    fn display_fmt(&self, indent: usize, f: &mut Formatter<'_>) -> std::fmt::Result;
    /// Number of source characters this node represents (ligatures count the
    /// characters they replaced).
    fn char_count(&self) -> usize {
        0
    }
    /// Adapter for printing the subtree, mainly for trace logs.
    fn display(&self) -> DisplayNode<'_, Self>
    where
        Self: Sized,
    {
        DisplayNode(self)
    }
}

pub(crate) fn display_do_indent(indent: usize, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str("\n")?;
    for _ in 0..indent {
        f.write_str(" ")?;
    }
    Ok(())
}

pub struct DisplayNode<'a, N: NodeTrait>(pub &'a N);
impl<N: NodeTrait> std::fmt::Display for DisplayNode<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.display_fmt(0, f)
    }
}

/// Opaque engine-specific side-channel payloads. `Special` carries the raw
/// text of a `\special`; the page assembler interprets page-geometry
/// directives and passes everything else through to the output stream as a
/// vendor escape.
#[derive(Clone,Eq,PartialEq,Debug)]
pub enum Whatsit {
    Special(String),
}
impl Whatsit {
    pub fn text(&self) -> &str {
        match self {
            Whatsit::Special(s) => s,
        }
    }
}

#[derive(Clone,Copy,Eq,PartialEq,Debug)]
pub enum LeaderKind {
    /// `\leaders`: repetitions snap to a grid anchored at the enclosing box edge.
    Aligned,
    /// `\cleaders`: leftover space split equally at both ends.
    Centered,
    /// `\xleaders`: leftover space distributed between repetitions.
    Expanded,
}

/// What gets repeated across a leader's glue: a box or a rule.
#[derive(Clone,Debug)]
pub enum LeaderPattern {
    Box(TexBox),
    Rule {
        width: Option<Dim>,
        height: Option<Dim>,
        depth: Option<Dim>,
    },
}
impl LeaderPattern {
    pub fn width(&self) -> Dim {
        match self {
            LeaderPattern::Box(b) => b.width(),
            LeaderPattern::Rule { width, .. } => width.unwrap_or_default(),
        }
    }
    pub fn height(&self) -> Dim {
        match self {
            LeaderPattern::Box(b) => b.height(),
            LeaderPattern::Rule { height, .. } => height.unwrap_or_default(),
        }
    }
    pub fn depth(&self) -> Dim {
        match self {
            LeaderPattern::Box(b) => b.depth(),
            LeaderPattern::Rule { depth, .. } => depth.unwrap_or_default(),
        }
    }
}

/// Leader glue: elastic space filled by repeating `pattern`. The glue's
/// natural size is the space to fill, already resolved upstream.
#[derive(Clone,Debug)]
pub struct Leaders {
    pub glue: Glue,
    pub kind: LeaderKind,
    pub pattern: LeaderPattern,
}
impl Leaders {
    pub(crate) fn display_fmt(&self, indent: usize, f: &mut Formatter<'_>) -> std::fmt::Result {
        display_do_indent(indent, f)?;
        let kind = match self.kind {
            LeaderKind::Aligned => "leaders",
            LeaderKind::Centered => "cleaders",
            LeaderKind::Expanded => "xleaders",
        };
        write!(f, "<{}:{}>", kind, self.glue)
    }
}
