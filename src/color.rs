/*! Ink colors and the generator-local color state.

DVI has no native notion of color; changes travel as vendor escapes in the
`color <space> <components>` convention, with components normalized to [0,1].
*/

use std::fmt::{Display, Formatter};

/// A resolved ink color. The primitive spaces serialize directly; `Named`
/// colors (spot colors and other device-specific spaces) must be resolved
/// through a [`ColorConverter`] before they can be written out.
#[derive(Clone,PartialEq,Debug)]
pub enum Color {
    Rgb(f32, f32, f32),
    Cmyk(f32, f32, f32, f32),
    Gray(f32),
    Named(String),
}

impl Color {
    pub fn black() -> Self {
        Color::Gray(0.0)
    }
    pub fn white() -> Self {
        Color::Gray(1.0)
    }
    /// The ASCII sub-format used inside color escapes: `rgb r g b`,
    /// `cmyk c m y k` or `gray g`. `None` for spaces that still need
    /// conversion.
    pub fn render(&self) -> Option<String> {
        match self {
            Color::Rgb(r, g, b) => Some(format!(
                "rgb {} {} {}",
                clamp01(*r),
                clamp01(*g),
                clamp01(*b)
            )),
            Color::Cmyk(c, m, y, k) => Some(format!(
                "cmyk {} {} {} {}",
                clamp01(*c),
                clamp01(*m),
                clamp01(*y),
                clamp01(*k)
            )),
            Color::Gray(g) => Some(format!("gray {}", clamp01(*g))),
            Color::Named(_) => None,
        }
    }
}
impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.render() {
            Some(s) => f.write_str(&s),
            None => match self {
                Color::Named(n) => write!(f, "named {}", n),
                _ => unreachable!(),
            },
        }
    }
}

fn clamp01(f: f32) -> f32 {
    f.clamp(0.0, 1.0)
}

/// Injected capability that resolves non-primitive color spaces to an RGB or
/// CMYK equivalent. A converter that cannot resolve a name returns `None`,
/// and the escape for that ink is silently skipped.
pub trait ColorConverter {
    fn resolve(&self, name: &str) -> Option<Color>;
}

/// A converter that knows no names; every `Named` color is skipped.
#[derive(Clone,Copy,Debug,Default)]
pub struct NoConversion;
impl ColorConverter for NoConversion {
    fn resolve(&self, _name: &str) -> Option<Color> {
        None
    }
}

/// The currently active ink color of one generator instance, reset per page.
#[derive(Debug)]
pub struct ColorState {
    current: Color,
}

impl ColorState {
    pub fn new() -> Self {
        Self { current: Color::default() }
    }
    pub fn reset(&mut self) {
        self.current = Color::default();
    }
    pub fn current(&self) -> &Color {
        &self.current
    }
    /// Compares `new` against the active color by value and, if they differ,
    /// switches and returns the escape payload to emit. Unresolvable colors
    /// yield `None` and leave the active color untouched, so rendering
    /// continues in the previously active ink.
    pub fn switch_if_needed<C: ColorConverter + ?Sized>(
        &mut self,
        new: &Color,
        converter: &C,
    ) -> Option<String> {
        if *new == self.current {
            return None;
        }
        let resolved = match new {
            Color::Named(name) => match converter.resolve(name) {
                Some(c @ (Color::Rgb(..) | Color::Cmyk(..) | Color::Gray(..))) => c,
                _ => {
                    log::debug!("no conversion for color {:?}, keeping current ink", new);
                    return None;
                }
            },
            c => c.clone(),
        };
        let payload = resolved.render().map(|s| format!("color {}", s));
        self.current = new.clone();
        payload
    }
}
impl Default for ColorState {
    fn default() -> Self {
        Self::new()
    }
}
