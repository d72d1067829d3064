use crate::nodes::horizontal::HNode;
use crate::nodes::vertical::VNode;
use crate::nodes::{display_do_indent, NodeTrait, NodeType};
use crate::numerics::Dim;

/// The only recursive node: an ordered list of children along one axis,
/// carrying its already-resolved bounding box. `shift` displaces the box
/// perpendicular to the enclosing list's axis (downwards inside a horizontal
/// list, rightwards inside a vertical one), `moved` along it; both are
/// applied once at the box boundary. The advertised dimensions are trusted
/// verbatim: by contract with the layout engine they agree with the children,
/// and no consumer in this crate re-measures.
#[derive(Clone,Debug)]
pub enum TexBox {
    H {
        width: Dim,
        height: Dim,
        depth: Dim,
        shift: Dim,
        moved: Dim,
        children: Box<[HNode]>,
    },
    V {
        width: Dim,
        height: Dim,
        depth: Dim,
        shift: Dim,
        moved: Dim,
        children: Box<[VNode]>,
    },
}

impl TexBox {
    pub fn is_empty(&self) -> bool {
        match self {
            TexBox::H { children, .. } => children.is_empty(),
            TexBox::V { children, .. } => children.is_empty(),
        }
    }
    pub fn len(&self) -> usize {
        match self {
            TexBox::H { children, .. } => children.len(),
            TexBox::V { children, .. } => children.len(),
        }
    }
    pub fn shift(&self) -> Dim {
        match self {
            TexBox::H { shift, .. } | TexBox::V { shift, .. } => *shift,
        }
    }
    pub fn moved(&self) -> Dim {
        match self {
            TexBox::H { moved, .. } | TexBox::V { moved, .. } => *moved,
        }
    }
    /// A horizontal box of the given children, measured naturally. Intended
    /// for constructing test and leader material; laid-out input arrives with
    /// its dimensions already assigned.
    pub fn hbox(children: Vec<HNode>) -> Self {
        let width = children.iter().map(|c| c.width()).sum();
        let height = children.iter().map(|c| c.height()).max().unwrap_or_default();
        let depth = children.iter().map(|c| c.depth()).max().unwrap_or_default();
        TexBox::H {
            width,
            height,
            depth,
            shift: Dim::ZERO,
            moved: Dim::ZERO,
            children: children.into(),
        }
    }
    /// A vertical box of the given children with natural dimensions.
    pub fn vbox(children: Vec<VNode>) -> Self {
        let width = children.iter().map(|c| c.width()).max().unwrap_or_default();
        let height = children
            .iter()
            .map(|c| c.height() + c.depth())
            .sum::<Dim>()
            - children.last().map(|c| c.depth()).unwrap_or_default();
        let depth = children.last().map(|c| c.depth()).unwrap_or_default();
        TexBox::V {
            width,
            height,
            depth,
            shift: Dim::ZERO,
            moved: Dim::ZERO,
            children: children.into(),
        }
    }
}

impl NodeTrait for TexBox {
    fn display_fmt(&self, indent: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TexBox::H { width, height, depth, children, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<hbox width={} height={} depth={}>", width, height, depth)?;
                for c in children.iter() {
                    c.display_fmt(indent + 2, f)?;
                }
                display_do_indent(indent, f)?;
                write!(f, "</hbox>")
            }
            TexBox::V { width, height, depth, children, .. } => {
                display_do_indent(indent, f)?;
                write!(f, "<vbox width={} height={} depth={}>", width, height, depth)?;
                for c in children.iter() {
                    c.display_fmt(indent + 2, f)?;
                }
                display_do_indent(indent, f)?;
                write!(f, "</vbox>")
            }
        }
    }
    fn height(&self) -> Dim {
        match self {
            TexBox::H { height, .. } | TexBox::V { height, .. } => *height,
        }
    }
    fn width(&self) -> Dim {
        match self {
            TexBox::H { width, .. } | TexBox::V { width, .. } => *width,
        }
    }
    fn depth(&self) -> Dim {
        match self {
            TexBox::H { depth, .. } | TexBox::V { depth, .. } => *depth,
        }
    }
    fn nodetype(&self) -> NodeType {
        NodeType::Box
    }
    fn char_count(&self) -> usize {
        match self {
            TexBox::H { children, .. } => children.iter().map(|c| c.char_count()).sum(),
            TexBox::V { children, .. } => children.iter().map(|c| c.char_count()).sum(),
        }
    }
}
