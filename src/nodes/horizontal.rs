use crate::color::Color;
use crate::fonts::Font;
use crate::nodes::boxes::TexBox;
use crate::nodes::vertical::VNode;
use crate::nodes::{display_do_indent, Leaders, NodeTrait, NodeType, Whatsit};
use crate::numerics::{Dim, Glue};

/// A node in a horizontal list.
#[derive(Clone,Debug)]
pub enum HNode {
    Penalty(i32),
    Mark { class: usize, payload: String },
    Whatsit(Whatsit),
    HSkip(Glue),
    /// Inter-word blank space; the same as [`HSkip`](HNode::HSkip) to this
    /// back end but kept distinct for structural queries.
    Space(Glue),
    HKern { amount: Dim, from_font: bool },
    Leaders(Leaders),
    Box(TexBox),
    VRule {
        width: Option<Dim>,
        height: Option<Dim>,
        depth: Option<Dim>,
    },
    Insert { class: usize, children: Box<[VNode]>, split_penalty: i32 },
    Discretionary {
        pre: Box<[HNode]>,
        post: Box<[HNode]>,
        no_break: Box<[HNode]>,
    },
    BeforeMath { surround: Dim, vsize: Dim },
    AfterMath { surround: Dim, vsize: Dim },
    Char {
        char: u8,
        font: Font,
        width: Dim,
        height: Dim,
        depth: Dim,
        color: Color,
    },
    /// A character that replaced one or more source characters.
    Ligature {
        char: u8,
        font: Font,
        originals: Box<[u8]>,
        width: Dim,
        height: Dim,
        depth: Dim,
        color: Color,
    },
    /// A composite glyph whose actual ink is its expansion list; the page
    /// assembler splices the expansion in place of the node.
    VirtualChar {
        char: u8,
        font: Font,
        expansion: Box<[HNode]>,
    },
}

/// Default thickness of a rule whose cross dimension is running: 0.4pt.
pub(crate) const DEFAULT_RULE: Dim = Dim(26214);

impl NodeTrait for HNode {
    fn display_fmt(&self, indent: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HNode::Penalty(p) => {
                display_do_indent(indent, f)?;
                write!(f, "<penalty:{}>", p)
            }
            HNode::Mark { class, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<mark:{}>", class)
            }
            HNode::Whatsit(w) => {
                display_do_indent(indent, f)?;
                write!(f, "<special:{}>", w.text())
            }
            HNode::HSkip(s) => write!(f, "<hskip:{}>", s),
            HNode::Space(_) => write!(f, "<space>"),
            HNode::HKern { amount, .. } => write!(f, "<hkern:{}>", amount),
            HNode::Leaders(l) => l.display_fmt(indent, f),
            HNode::Box(b) => b.display_fmt(indent, f),
            HNode::VRule { width, height, depth } => {
                write!(f, "<vrule")?;
                if let Some(w) = width {
                    write!(f, " width={}", w)?;
                }
                if let Some(h) = height {
                    write!(f, " height={}", h)?;
                }
                if let Some(d) = depth {
                    write!(f, " depth={}", d)?;
                }
                write!(f, ">")
            }
            HNode::Insert { class, children, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<insert {}>", class)?;
                for c in children.iter() {
                    c.display_fmt(indent + 2, f)?;
                }
                display_do_indent(indent, f)?;
                write!(f, "</insert>")
            }
            HNode::Discretionary { no_break, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<discretionary>")?;
                for c in no_break.iter() {
                    c.display_fmt(indent + 2, f)?;
                }
                display_do_indent(indent, f)?;
                write!(f, "</discretionary>")
            }
            HNode::BeforeMath { surround, .. } => write!(f, "<math-on:{}>", surround),
            HNode::AfterMath { surround, .. } => write!(f, "<math-off:{}>", surround),
            HNode::Char { char, .. } => write!(f, "{}", *char as char),
            HNode::Ligature { char, .. } => write!(f, "{}", *char as char),
            HNode::VirtualChar { expansion, .. } => {
                for c in expansion.iter() {
                    c.display_fmt(indent, f)?;
                }
                Ok(())
            }
        }
    }
    fn height(&self) -> Dim {
        match self {
            HNode::Box(b) => b.height(),
            HNode::VRule { height, .. } => height.unwrap_or_default(),
            HNode::Char { height, .. } | HNode::Ligature { height, .. } => *height,
            HNode::VirtualChar { expansion, .. } => {
                expansion.iter().map(|c| c.height()).max().unwrap_or_default()
            }
            HNode::Leaders(l) => l.pattern.height(),
            HNode::BeforeMath { vsize, .. } | HNode::AfterMath { vsize, .. } => *vsize,
            _ => Dim::default(),
        }
    }
    fn width(&self) -> Dim {
        match self {
            HNode::Box(b) => b.width(),
            HNode::VRule { width, .. } => width.unwrap_or(DEFAULT_RULE),
            HNode::Char { width, .. } | HNode::Ligature { width, .. } => *width,
            HNode::VirtualChar { expansion, .. } => expansion.iter().map(|c| c.width()).sum(),
            HNode::Leaders(l) => l.glue.base,
            HNode::HKern { amount, .. } => *amount,
            HNode::HSkip(s) | HNode::Space(s) => s.base,
            HNode::BeforeMath { surround, .. } | HNode::AfterMath { surround, .. } => *surround,
            HNode::Discretionary { no_break, .. } => no_break.iter().map(|c| c.width()).sum(),
            _ => Dim::default(),
        }
    }
    fn depth(&self) -> Dim {
        match self {
            HNode::Box(b) => b.depth(),
            HNode::VRule { depth, .. } => depth.unwrap_or_default(),
            HNode::Char { depth, .. } | HNode::Ligature { depth, .. } => *depth,
            HNode::VirtualChar { expansion, .. } => {
                expansion.iter().map(|c| c.depth()).max().unwrap_or_default()
            }
            HNode::Leaders(l) => l.pattern.depth(),
            _ => Dim::default(),
        }
    }
    fn nodetype(&self) -> NodeType {
        match self {
            HNode::Penalty(_) => NodeType::Penalty,
            HNode::Mark { .. } => NodeType::Mark,
            HNode::Whatsit(_) => NodeType::Whatsit,
            HNode::HSkip(_) | HNode::Space(_) => NodeType::Glue,
            HNode::HKern { .. } => NodeType::Kern,
            HNode::Leaders(_) => NodeType::Leaders,
            HNode::Box(_) => NodeType::Box,
            HNode::VRule { .. } => NodeType::Rule,
            HNode::Insert { .. } => NodeType::Insertion,
            HNode::Discretionary { .. } => NodeType::Discretionary,
            HNode::BeforeMath { .. } | HNode::AfterMath { .. } => NodeType::Math,
            HNode::Char { .. } | HNode::Ligature { .. } | HNode::VirtualChar { .. } => {
                NodeType::Char
            }
        }
    }
    fn char_count(&self) -> usize {
        match self {
            HNode::Char { .. } => 1,
            HNode::Ligature { originals, .. } => originals.len(),
            HNode::VirtualChar { expansion, .. } => {
                expansion.iter().map(|c| c.char_count()).sum()
            }
            HNode::Discretionary { no_break, .. } => {
                no_break.iter().map(|c| c.char_count()).sum()
            }
            HNode::Box(b) => b.char_count(),
            _ => 0,
        }
    }
}

impl HNode {
    /// Discardable nodes carry no ink of their own.
    pub fn discardable(&self) -> bool {
        matches!(
            self,
            HNode::Penalty(_) | HNode::HSkip(_) | HNode::Space(_) | HNode::HKern { .. }
        )
    }
}
