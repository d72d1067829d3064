/*! Numerical values: [dimensions](Dim) in scaled points and [elastic glue](Glue).*/

use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

/// A TeX dimension in *scaled points (sp)*, where 65536sp = 1pt. Held as 64 bits
/// so that arithmetic on already-resolved layout values cannot overflow; the
/// serialized DVI forms are 32 bits wide and clamp on write.
#[derive(Clone,Copy,Eq,PartialEq,Ord,PartialOrd,Debug,Default,Hash)]
pub struct Dim(pub i64);

/// 1in = 72.27pt.
pub const ONE_INCH: Dim = Dim(4736287);

impl Dim {
    pub const ZERO: Dim = Dim(0);
    pub fn from_sp(sp: i64) -> Self {
        Self(sp)
    }
    pub fn from_pt(pt: f64) -> Self {
        Self((pt * 65536.0).round() as i64)
    }
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
    /// The serialized form; out-of-range values clamp rather than fail.
    pub fn to_i32_clamped(self) -> i32 {
        self.0.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
    fn from_float(float: f64, unit: &str) -> Option<Self> {
        Some(match unit {
            "sp" => Self(float.round() as i64),
            "pt" => Self((float * 65536.0).round() as i64),
            "pc" => Self((float * 65536.0 * 12.0).round() as i64),
            "in" => Self((float * 65536.0 * 72.27).round() as i64),
            "bp" => Self((float * 65536.0 * 72.27 / 72.0).round() as i64),
            "cm" => Self((float * 65536.0 * 72.27 / 2.54).round() as i64),
            "mm" => Self((float * 65536.0 * 72.27 / 25.4).round() as i64),
            "dd" => Self((float * 65536.0 * 1238.0 / 1157.0).round() as i64),
            "cc" => Self((float * 65536.0 * 14856.0 / 1157.0).round() as i64),
            _ => return None,
        })
    }
    /// Parses `<float><unit>`, e.g. `597.50787pt` or `210mm`, as used by the
    /// `papersize` special. A bare number is read as scaled points.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.find(|c: char| c.is_ascii_alphabetic()) {
            Some(i) => {
                let (num, unit) = s.split_at(i);
                let float: f64 = num.trim().parse().ok()?;
                Self::from_float(float, unit.trim())
            }
            None => s.parse::<f64>().ok().map(|f| Self(f.round() as i64)),
        }
    }
    fn display_num(num: i64, unit: &str, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut val = num;
        if val < 0 {
            write!(f, "-")?;
            val = -val;
        }
        write!(f, "{}.", val / 65536)?;
        val = 10 * (val % 65536) + 5;
        let mut delta = 10;
        if val < delta {
            return write!(f, "0{}", unit);
        }
        while val > delta {
            if delta > 65536 {
                val = val + 32768 - 50000;
            }
            write!(f, "{}", val / 65536)?;
            val = 10 * (val % 65536);
            delta *= 10;
        }
        write!(f, "{}", unit)
    }
}
impl Add for Dim {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Dim(self.0 + rhs.0)
    }
}
impl Sub for Dim {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Dim(self.0 - rhs.0)
    }
}
impl Neg for Dim {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Dim(-self.0)
    }
}
impl Mul<i64> for Dim {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self::Output {
        Dim(self.0 * rhs)
    }
}
impl std::iter::Sum for Dim {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |a, b| a + b)
    }
}
impl Display for Dim {
    // B-Book §103
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Self::display_num(self.0, "pt", f)
    }
}

/// A stretch or shrink component: finite, or one of three degrees of infinity.
#[derive(Clone,Copy,Eq,PartialEq,Debug)]
pub enum StretchShrink {
    Dim(Dim),
    Fil(i32),
    Fill(i32),
    Filll(i32),
}
impl StretchShrink {
    /// 0 for finite components, 1..3 for fil/fill/filll.
    pub fn order(&self) -> u8 {
        match self {
            StretchShrink::Dim(_) => 0,
            StretchShrink::Fil(_) => 1,
            StretchShrink::Fill(_) => 2,
            StretchShrink::Filll(_) => 3,
        }
    }
}

/// Elastic spacing: a natural size plus independent stretch/shrink capacity.
/// Only the natural size matters to the back end; stretch and shrink are
/// bookkeeping carried over from line breaking.
#[derive(Clone,Copy,Eq,PartialEq,Debug,Default)]
pub struct Glue {
    pub base: Dim,
    pub stretch: Option<StretchShrink>,
    pub shrink: Option<StretchShrink>,
}
impl Glue {
    pub fn new(base: Dim, stretch: Option<StretchShrink>, shrink: Option<StretchShrink>) -> Self {
        Self {
            base,
            stretch: match stretch {
                Some(StretchShrink::Dim(d)) if d == Dim::default() => None,
                Some(StretchShrink::Fil(0) | StretchShrink::Fill(0) | StretchShrink::Filll(0)) => {
                    None
                }
                _ => stretch,
            },
            shrink: match shrink {
                Some(StretchShrink::Dim(d)) if d == Dim::default() => None,
                Some(StretchShrink::Fil(0) | StretchShrink::Fill(0) | StretchShrink::Filll(0)) => {
                    None
                }
                _ => shrink,
            },
        }
    }
    pub fn fixed(base: Dim) -> Self {
        Self::new(base, None, None)
    }
}
impl Add<Dim> for Glue {
    type Output = Self;
    fn add(self, rhs: Dim) -> Self::Output {
        Self {
            base: self.base + rhs,
            stretch: self.stretch,
            shrink: self.shrink,
        }
    }
}
impl Neg for Glue {
    type Output = Self;
    fn neg(self) -> Self::Output {
        let flip = |s: StretchShrink| match s {
            StretchShrink::Dim(d) => StretchShrink::Dim(-d),
            StretchShrink::Fil(i) => StretchShrink::Fil(-i),
            StretchShrink::Fill(i) => StretchShrink::Fill(-i),
            StretchShrink::Filll(i) => StretchShrink::Filll(-i),
        };
        Self {
            base: -self.base,
            stretch: self.stretch.map(flip),
            shrink: self.shrink.map(flip),
        }
    }
}
impl Display for Glue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(stretch) = &self.stretch {
            write!(f, " plus ")?;
            match stretch {
                StretchShrink::Dim(d) => write!(f, "{}", d)?,
                StretchShrink::Fil(i) => Dim::display_num(*i as i64, "fil", f)?,
                StretchShrink::Fill(i) => Dim::display_num(*i as i64, "fill", f)?,
                StretchShrink::Filll(i) => Dim::display_num(*i as i64, "filll", f)?,
            }
        }
        if let Some(shrink) = &self.shrink {
            write!(f, " minus ")?;
            match shrink {
                StretchShrink::Dim(d) => write!(f, "{}", d)?,
                StretchShrink::Fil(i) => Dim::display_num(*i as i64, "fil", f)?,
                StretchShrink::Fill(i) => Dim::display_num(*i as i64, "fill", f)?,
                StretchShrink::Filll(i) => Dim::display_num(*i as i64, "filll", f)?,
            }
        }
        Ok(())
    }
}
