/*! The rendering back end of a TeX-style typesetting engine: fully laid-out
node lists in, a device-independent (DVI) instruction stream out.

The pipeline has two halves. The [page assembler](pagebuilder) prunes a
shipped-out vertical list down to its ink and interprets page-geometry
directives; the [code generator](shipout) walks the pruned [`Page`](pagebuilder::Page)
and serializes DVI bytes, synchronizing the device cursor lazily so pure
movement never appears in the stream.

Everything arrives measured. Line breaking, glue setting and font metrics are
the layout engine's business; character and box nodes carry their resolved
dimensions and this crate trusts them.
*/
#![forbid(unsafe_code)]

pub mod color;
pub mod fonts;
pub mod nodes;
pub mod numerics;
pub mod pagebuilder;
pub mod shipout;
pub mod utils;

#[doc(hidden)]
pub mod tests;

pub mod prelude {
    pub use crate::color::{Color, ColorConverter};
    pub use crate::fonts::{Font, FontDef, FontRegistry};
    pub use crate::nodes::{HNode, NodeTrait, TexBox, VNode};
    pub use crate::numerics::{Dim, Glue, StretchShrink};
    pub use crate::pagebuilder::{Page, PageBuilder};
    pub use crate::shipout::{Shipout, ShipoutSettings};
}
