use crate::nodes::boxes::TexBox;
use crate::nodes::{display_do_indent, Leaders, NodeTrait, NodeType, Whatsit};
use crate::numerics::{Dim, Glue};

/// A node in a vertical list.
#[derive(Clone,Debug)]
pub enum VNode {
    Penalty(i32),
    Mark { class: usize, payload: String },
    Whatsit(Whatsit),
    VSkip(Glue),
    VKern { amount: Dim, from_font: bool },
    Leaders(Leaders),
    Box(TexBox),
    HRule {
        width: Option<Dim>,
        height: Option<Dim>,
        depth: Option<Dim>,
    },
    Insert { class: usize, children: Box<[VNode]>, split_penalty: i32 },
}

impl NodeTrait for VNode {
    fn display_fmt(&self, indent: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VNode::Penalty(p) => {
                display_do_indent(indent, f)?;
                write!(f, "<penalty:{}>", p)
            }
            VNode::Mark { class, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<mark:{}>", class)
            }
            VNode::Whatsit(w) => {
                display_do_indent(indent, f)?;
                write!(f, "<special:{}>", w.text())
            }
            VNode::VSkip(s) => write!(f, "<vskip:{}>", s),
            VNode::VKern { amount, .. } => write!(f, "<vkern:{}>", amount),
            VNode::Leaders(l) => l.display_fmt(indent, f),
            VNode::Box(b) => b.display_fmt(indent, f),
            VNode::HRule { width, height, depth } => {
                write!(f, "<hrule")?;
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
            VNode::Insert { class, children, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<insert {}>", class)?;
                for c in children.iter() {
                    c.display_fmt(indent + 2, f)?;
                }
                display_do_indent(indent, f)?;
                write!(f, "</insert>")
            }
        }
    }
    fn height(&self) -> Dim {
        match self {
            VNode::VKern { amount, .. } => *amount,
            VNode::VSkip(s) => s.base,
            VNode::Box(b) => b.height(),
            VNode::HRule { height, .. } => {
                height.unwrap_or(crate::nodes::horizontal::DEFAULT_RULE)
            }
            VNode::Leaders(l) => l.glue.base,
            _ => Dim::default(),
        }
    }
    fn width(&self) -> Dim {
        match self {
            VNode::Box(b) => b.width(),
            VNode::HRule { width, .. } => width.unwrap_or_default(),
            VNode::Leaders(l) => l.pattern.width(),
            _ => Dim::default(),
        }
    }
    fn depth(&self) -> Dim {
        match self {
            VNode::Box(b) => b.depth(),
            VNode::HRule { depth, .. } => depth.unwrap_or_default(),
            _ => Dim::default(),
        }
    }
    fn nodetype(&self) -> NodeType {
        match self {
            VNode::Penalty(_) => NodeType::Penalty,
            VNode::Mark { .. } => NodeType::Mark,
            VNode::Whatsit(_) => NodeType::Whatsit,
            VNode::VSkip(_) => NodeType::Glue,
            VNode::VKern { .. } => NodeType::Kern,
            VNode::Leaders(_) => NodeType::Leaders,
            VNode::Box(_) => NodeType::Box,
            VNode::HRule { .. } => NodeType::Rule,
            VNode::Insert { .. } => NodeType::Insertion,
        }
    }
    fn char_count(&self) -> usize {
        match self {
            VNode::Box(b) => b.char_count(),
            _ => 0,
        }
    }
}

impl VNode {
    pub fn discardable(&self) -> bool {
        matches!(self, VNode::Penalty(_) | VNode::VSkip(_) | VNode::VKern { .. })
    }
}
