#[doc(hidden)]
#[cfg(any(test, doctest))]
#[allow(dead_code)]
pub mod test_utils {
    #[allow(unused_must_use)]
    pub fn trace() {
        env_logger::builder().filter_level(log::LevelFilter::Trace).try_init();
    }
    #[allow(unused_must_use)]
    pub fn debug() {
        env_logger::builder().filter_level(log::LevelFilter::Debug).try_init();
    }
    #[allow(unused_must_use)]
    pub fn info() {
        env_logger::builder().filter_level(log::LevelFilter::Info).try_init();
    }
    #[allow(unused_must_use)]
    pub fn warn() {
        env_logger::builder().filter_level(log::LevelFilter::Warn).try_init();
    }
}

#[cfg(test)]
mod tests {
    use crate::color::{Color, ColorConverter};
    use crate::nodes::{LeaderKind, LeaderPattern, Leaders, Whatsit};
    use crate::numerics::ONE_INCH;
    use crate::prelude::*;
    use crate::shipout::dvi::DviWriter;
    use crate::tests::test_utils::*;
    use crate::utils::ShipoutError;

    /// A decoded instruction; just enough structure for assertions.
    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Pre { mag: u32 },
        Bop { counters: [i32; 10], prev: i32, at: usize },
        Eop,
        Push,
        Pop,
        Right(i32),
        Down(i32),
        SetChar(u8),
        SetRule { height: i32, width: i32 },
        PutRule { height: i32, width: i32 },
        Fnt(u32),
        FntDef { id: u32, checksum: u32, at_size: i32, design_size: i32, name: String },
        Xxx(String),
        Post { prev: i32, max_v: i32, max_h: i32, max_stack: u16, pages: u16, at: usize },
        PostPost { post: u32 },
    }

    fn decode(bytes: &[u8]) -> Vec<Op> {
        let mut ops = Vec::new();
        let mut i = 0;
        let u32_at = |i: usize| u32::from_be_bytes(bytes[i..i + 4].try_into().unwrap());
        let i32_at = |i: usize| i32::from_be_bytes(bytes[i..i + 4].try_into().unwrap());
        let u16_at = |i: usize| u16::from_be_bytes(bytes[i..i + 2].try_into().unwrap());
        while i < bytes.len() {
            let op = bytes[i];
            i += 1;
            match op {
                c @ 0..=127 => ops.push(Op::SetChar(c)),
                128 => {
                    ops.push(Op::SetChar(bytes[i]));
                    i += 1;
                }
                132 | 137 => {
                    let height = i32_at(i);
                    let width = i32_at(i + 4);
                    i += 8;
                    ops.push(if op == 132 {
                        Op::SetRule { height, width }
                    } else {
                        Op::PutRule { height, width }
                    });
                }
                138 => (),
                139 => {
                    let at = i - 1;
                    let mut counters = [0i32; 10];
                    for c in &mut counters {
                        *c = i32_at(i);
                        i += 4;
                    }
                    let prev = i32_at(i);
                    i += 4;
                    ops.push(Op::Bop { counters, prev, at });
                }
                140 => ops.push(Op::Eop),
                141 => ops.push(Op::Push),
                142 => ops.push(Op::Pop),
                143..=146 | 157..=160 => {
                    let n = (if op < 157 { op - 142 } else { op - 156 }) as usize;
                    let mut val = bytes[i] as i8 as i64;
                    for k in 1..n {
                        val = (val << 8) | bytes[i + k] as i64;
                    }
                    i += n;
                    let val = val as i32;
                    ops.push(if op < 157 { Op::Right(val) } else { Op::Down(val) });
                }
                171..=234 => ops.push(Op::Fnt((op - 171) as u32)),
                235 => {
                    ops.push(Op::Fnt(bytes[i] as u32));
                    i += 1;
                }
                236 => {
                    ops.push(Op::Fnt(u16_at(i) as u32));
                    i += 2;
                }
                239 => {
                    let len = bytes[i] as usize;
                    ops.push(Op::Xxx(
                        String::from_utf8(bytes[i + 1..i + 1 + len].to_vec()).unwrap(),
                    ));
                    i += 1 + len;
                }
                242 => {
                    let len = u32_at(i) as usize;
                    ops.push(Op::Xxx(
                        String::from_utf8(bytes[i + 4..i + 4 + len].to_vec()).unwrap(),
                    ));
                    i += 4 + len;
                }
                243 | 244 => {
                    let id = if op == 243 {
                        let id = bytes[i] as u32;
                        i += 1;
                        id
                    } else {
                        let id = u16_at(i) as u32;
                        i += 2;
                        id
                    };
                    let checksum = u32_at(i);
                    let at_size = i32_at(i + 4);
                    let design_size = i32_at(i + 8);
                    let a = bytes[i + 12] as usize;
                    let l = bytes[i + 13] as usize;
                    i += 14;
                    let name =
                        String::from_utf8(bytes[i..i + a + l].to_vec()).unwrap();
                    i += a + l;
                    ops.push(Op::FntDef { id, checksum, at_size, design_size, name });
                }
                247 => {
                    assert_eq!(bytes[i], 2);
                    let mag = u32_at(i + 9);
                    let k = bytes[i + 13] as usize;
                    i += 14 + k;
                    ops.push(Op::Pre { mag });
                }
                248 => {
                    let at = i - 1;
                    let prev = i32_at(i);
                    let max_v = i32_at(i + 16);
                    let max_h = i32_at(i + 20);
                    let max_stack = u16_at(i + 24);
                    let pages = u16_at(i + 26);
                    i += 28;
                    ops.push(Op::Post { prev, max_v, max_h, max_stack, pages, at });
                }
                249 => {
                    let post = u32_at(i);
                    assert_eq!(bytes[i + 4], 2);
                    i += 5;
                    ops.push(Op::PostPost { post });
                    while i < bytes.len() {
                        assert_eq!(bytes[i], 223);
                        i += 1;
                    }
                }
                other => panic!("unexpected opcode {} at {}", other, i - 1),
            }
        }
        ops
    }

    fn font(name: &str) -> Font {
        FontDef::new(name, 0x4BF16079, Dim::from_pt(10.0), Dim::from_pt(10.0))
    }

    fn chr(c: u8, f: &Font, width: i64) -> HNode {
        HNode::Char {
            char: c,
            font: f.clone(),
            width: Dim(width),
            height: Dim::ZERO,
            depth: Dim::ZERO,
            color: Color::default(),
        }
    }

    fn colored(c: u8, f: &Font, width: i64, color: Color) -> HNode {
        HNode::Char {
            char: c,
            font: f.clone(),
            width: Dim(width),
            height: Dim::ZERO,
            depth: Dim::ZERO,
            color,
        }
    }

    fn a4() -> PageBuilder {
        PageBuilder::new(Dim::parse("210mm").unwrap(), Dim::parse("297mm").unwrap())
    }

    fn ship_with(content: Vec<TexBox>, settings: ShipoutSettings) -> Vec<u8> {
        let mut builder = a4();
        let mut out = Shipout::new(Vec::new(), settings);
        for (n, b) in content.into_iter().enumerate() {
            let mut counters = [0i64; 10];
            counters[0] = n as i64 + 1;
            if let Some(page) = builder.build(b, counters) {
                out.ship_page(&page).unwrap();
            }
        }
        out.finish().unwrap()
    }

    fn ship(content: Vec<TexBox>) -> Vec<u8> {
        ship_with(content, ShipoutSettings::default())
    }

    /// The instructions of the `n`-th page, `bop` and `eop` excluded.
    fn page_ops(ops: &[Op], n: usize) -> &[Op] {
        let start = ops
            .iter()
            .enumerate()
            .filter(|(_, o)| matches!(o, Op::Bop { .. }))
            .nth(n)
            .unwrap()
            .0;
        let end = start
            + ops[start..]
                .iter()
                .position(|o| *o == Op::Eop)
                .unwrap();
        &ops[start + 1..end]
    }

    fn post(ops: &[Op]) -> &Op {
        ops.iter().find(|o| matches!(o, Op::Post { .. })).unwrap()
    }

    #[test]
    fn dimensions() {
        assert_eq!(Dim::parse("10pt"), Some(Dim(655360)));
        assert_eq!(Dim::parse("1in"), Some(ONE_INCH));
        assert_eq!(Dim::parse(" 42 "), Some(Dim(42)));
        assert_eq!(Dim::parse("12pc"), Some(Dim::parse("144pt").unwrap()));
        assert_eq!(Dim::parse("nonsense"), None);
        assert_eq!(Dim::parse("2,5pt"), None);
        assert_eq!(Dim(655360).to_string(), "10.0pt");
        assert_eq!(Dim::from_pt(2.5).to_string(), "2.5pt");
        assert_eq!(Dim(-655360).to_string(), "-10.0pt");
        assert_eq!(Dim(i64::MAX).to_i32_clamped(), i32::MAX);
        assert_eq!(Dim(i64::MIN + 5).to_i32_clamped(), i32::MIN);
        assert_eq!(Dim(17).to_i32_clamped(), 17);
    }

    #[test]
    fn glue() {
        let g = Glue::new(
            Dim(5),
            Some(StretchShrink::Dim(Dim::ZERO)),
            Some(StretchShrink::Fil(0)),
        );
        assert_eq!(g.stretch, None);
        assert_eq!(g.shrink, None);
        let g = Glue::new(Dim(65536), Some(StretchShrink::Fil(65536)), None);
        assert_eq!(g.to_string(), "1.0pt plus 1.0fil");
        assert_eq!(StretchShrink::Filll(1).order(), 3);
        assert_eq!((-g).base, Dim(-65536));
    }

    #[test]
    fn natural_measure() {
        let f = font("cmr10");
        let row = TexBox::hbox(vec![
            chr(b'a', &f, 10),
            HNode::HKern { amount: Dim(5), from_font: true },
            chr(b'b', &f, 10),
        ]);
        assert_eq!(row.width(), Dim(25));
        let lig = HNode::Ligature {
            char: 27,
            font: f.clone(),
            originals: Box::new([b'f', b'f', b'i']),
            width: Dim(30),
            height: Dim::ZERO,
            depth: Dim::ZERO,
            color: Color::default(),
        };
        let col = TexBox::vbox(vec![
            VNode::Box(row),
            VNode::Box(TexBox::hbox(vec![lig])),
        ]);
        assert_eq!(col.width(), Dim(30));
        // two characters plus the three the ligature replaced
        assert_eq!(col.char_count(), 5);
    }

    #[test]
    fn inkless_pages_are_skipped() {
        debug();
        let mut builder = a4();
        let b = TexBox::vbox(vec![
            VNode::Penalty(10000),
            VNode::Mark { class: 0, payload: "mark".into() },
            VNode::VSkip(Glue::fixed(Dim::ZERO)),
            VNode::VKern { amount: Dim::ZERO, from_font: false },
            VNode::Box(TexBox::hbox(vec![HNode::Discretionary {
                pre: Box::new([]),
                post: Box::new([]),
                no_break: Box::new([]),
            }])),
        ]);
        assert!(builder.build(b, [0; 10]).is_none());

        // a single character is ink enough
        let f = font("cmr10");
        let b = TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)]))]);
        assert!(builder.build(b, [0; 10]).is_some());
    }

    #[test]
    fn pruning_splices_and_unbreaks() {
        let f = font("cmr10");
        let b = TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::VirtualChar {
                char: 200,
                font: f.clone(),
                expansion: Box::new([chr(b'a', &f, 10), chr(b'e', &f, 10)]),
            },
            HNode::Discretionary {
                pre: Box::new([chr(b'-', &f, 4)]),
                post: Box::new([]),
                no_break: Box::new([chr(b'c', &f, 10)]),
            },
        ]))]);
        let page = a4().build(b, [0; 10]).unwrap();
        let TexBox::V { children, .. } = &page.content else {
            panic!("expected a vertical page box")
        };
        let VNode::Box(TexBox::H { children, .. }) = &children[0] else {
            panic!("expected the row to survive")
        };
        // the virtual character is gone, its expansion spliced in place
        assert!(matches!(children[0], HNode::Char { char: b'a', .. }));
        assert!(matches!(children[1], HNode::Char { char: b'e', .. }));
        let HNode::Discretionary { pre, post, no_break } = &children[2] else {
            panic!("expected the discretionary to survive")
        };
        assert!(pre.is_empty() && post.is_empty());
        assert_eq!(no_break.len(), 1);
    }

    #[test]
    fn papersize_specials() {
        let mut builder = a4();
        let f = font("cmr10");
        let page = builder
            .build(
                TexBox::vbox(vec![
                    VNode::Whatsit(Whatsit::Special(
                        "papersize=597.50787pt,845.04684pt".into(),
                    )),
                    VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)])),
                ]),
                [0; 10],
            )
            .unwrap();
        assert_eq!(page.media_width, Dim::parse("597.50787pt").unwrap());
        assert_eq!(page.media_height, Dim::parse("845.04684pt").unwrap());
        // consumed, not forwarded
        let bytes = ship(vec![TexBox::vbox(vec![
            VNode::Whatsit(Whatsit::Special("papersize=100pt,200pt".into())),
            VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)])),
        ])]);
        assert!(!decode(&bytes).iter().any(|o| matches!(o, Op::Xxx(_))));

        // an unparsable payload is not a geometry directive and survives
        let before = (builder.media_width, builder.media_height);
        let page = builder
            .build(
                TexBox::vbox(vec![
                    VNode::Whatsit(Whatsit::Special("papersize=wide".into())),
                    VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)])),
                ]),
                [0; 10],
            )
            .unwrap();
        assert_eq!((page.media_width, page.media_height), before);
        let bytes = ship(vec![TexBox::vbox(vec![
            VNode::Whatsit(Whatsit::Special("papersize=wide".into())),
            VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)])),
        ])]);
        assert!(decode(&bytes)
            .iter()
            .any(|o| matches!(o, Op::Xxx(s) if s == "papersize=wide")));

        let w = builder.media_width;
        let h = builder.media_height;
        let page = builder
            .build(
                TexBox::vbox(vec![
                    VNode::Whatsit(Whatsit::Special("landscape".into())),
                    VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)])),
                ]),
                [0; 10],
            )
            .unwrap();
        assert_eq!(page.media_width, h);
        assert_eq!(page.media_height, w);
    }

    #[test]
    fn specials_pass_through() {
        let f = font("cmr10");
        let bytes = ship(vec![TexBox::vbox(vec![
            VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)])),
            VNode::Whatsit(Whatsit::Special("pdf:dest (sec.1)".into())),
        ])]);
        let ops = decode(&bytes);
        assert!(ops
            .iter()
            .any(|o| matches!(o, Op::Xxx(s) if s == "pdf:dest (sec.1)")));
    }

    #[test]
    fn kerned_word() {
        debug();
        let f = font("cmr10");
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            chr(b'a', &f, 10),
            HNode::HKern { amount: Dim(5), from_font: true },
            chr(b'b', &f, 10),
        ]))])]);
        let ops = decode(&bytes);
        assert_eq!(
            page_ops(&ops, 0),
            &[
                Op::Push,
                Op::FntDef {
                    id: 0,
                    checksum: 0x4BF16079,
                    at_size: 655360,
                    design_size: 655360,
                    name: "cmr10".into()
                },
                Op::Fnt(0),
                Op::SetChar(b'a'),
                Op::Right(5),
                Op::SetChar(b'b'),
                Op::Pop,
            ]
        );
        let Op::Post { max_h, max_stack, pages, .. } = post(&ops) else {
            unreachable!()
        };
        assert_eq!(*max_h, 25);
        assert_eq!(*max_stack, 1);
        assert_eq!(*pages, 1);
    }

    #[test]
    fn movement_folds() {
        let f = font("cmr10");
        // consecutive kerns fold into a single right
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::HKern { amount: Dim(3), from_font: false },
            HNode::HSkip(Glue::fixed(Dim(4))),
            chr(b'a', &f, 10),
        ]))])]);
        let rights: Vec<_> = decode(&bytes)
            .iter()
            .filter(|o| matches!(o, Op::Right(_)))
            .cloned()
            .collect();
        assert_eq!(rights, vec![Op::Right(7)]);

        // zero net movement vanishes entirely
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::HKern { amount: Dim(5), from_font: false },
            HNode::HKern { amount: Dim(-5), from_font: false },
            chr(b'a', &f, 10),
        ]))])]);
        assert!(!decode(&bytes)
            .iter()
            .any(|o| matches!(o, Op::Right(_) | Op::Down(_))));

        // movements on different axes commute past each other
        let bytes = ship(vec![TexBox::vbox(vec![
            VNode::VKern { amount: Dim(7), from_font: false },
            VNode::Box(TexBox::hbox(vec![chr(b'a', &f, 10)])),
        ])]);
        let ops = decode(&bytes);
        let body = page_ops(&ops, 0);
        assert_eq!(body[0], Op::Down(7));
        assert_eq!(body[1], Op::Push);
    }

    #[test]
    fn nested_boxes_balance_the_stack() {
        let f = font("cmr10");
        let inner = TexBox::hbox(vec![chr(b'i', &f, 10)]);
        let outer = TexBox::hbox(vec![HNode::Box(inner), chr(b'o', &f, 10)]);
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(outer)])]);
        let ops = decode(&bytes);
        let body = page_ops(&ops, 0);
        let pushes = body.iter().filter(|o| **o == Op::Push).count();
        let pops = body.iter().filter(|o| **o == Op::Pop).count();
        assert_eq!(pushes, 2);
        assert_eq!(pops, 2);
        let Op::Post { max_stack, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*max_stack, 2);
        // the outer character sits after the inner box's width
        let Op::Post { max_h, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*max_h, 20);
    }

    #[test]
    fn shifted_boxes_displace_and_restore() {
        let f = font("cmr10");
        // an hlist child dropped by its shift and nudged right by its move;
        // the pop lands back on the row baseline before the advertised
        // width is consumed
        let inner = TexBox::H {
            width: Dim(13),
            height: Dim(5),
            depth: Dim::ZERO,
            shift: Dim(2),
            moved: Dim(3),
            children: Box::new([chr(b'i', &f, 10)]),
        };
        let row = TexBox::hbox(vec![HNode::Box(inner), chr(b'o', &f, 10)]);
        // a vlist child shifted rightwards and moved further down
        let column = TexBox::V {
            width: Dim(10),
            height: Dim(4),
            depth: Dim(1),
            shift: Dim(2),
            moved: Dim(3),
            children: Box::new([VNode::HRule {
                width: Some(Dim(8)),
                height: Some(Dim(4)),
                depth: Some(Dim(0)),
            }]),
        };
        let bytes = ship(vec![
            TexBox::vbox(vec![VNode::Box(row)]),
            TexBox::vbox(vec![VNode::Box(column)]),
        ]);
        let ops = decode(&bytes);
        assert_eq!(
            page_ops(&ops, 0),
            &[
                Op::Down(5),
                Op::Push,
                Op::Push,
                Op::Right(3),
                Op::Down(2),
                Op::FntDef {
                    id: 0,
                    checksum: 0x4BF16079,
                    at_size: 655360,
                    design_size: 655360,
                    name: "cmr10".into()
                },
                Op::Fnt(0),
                Op::SetChar(b'i'),
                Op::Pop,
                Op::Right(13),
                Op::SetChar(b'o'),
                Op::Pop,
            ]
        );
        assert_eq!(
            page_ops(&ops, 1),
            &[
                Op::Down(4),
                Op::Push,
                Op::Right(2),
                Op::Down(3),
                Op::PutRule { height: 4, width: 8 },
                Op::Pop,
            ]
        );
        let Op::Post { max_h, max_v, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*max_h, 23);
        assert_eq!(*max_v, 7);
    }

    #[test]
    fn rules() {
        // in a horizontal list the rule hangs from the baseline and advances
        let f = font("cmr10");
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::VRule {
                width: Some(Dim(20)),
                height: Some(Dim(30)),
                depth: Some(Dim(10)),
            },
            chr(b'a', &f, 10),
        ]))])]);
        let ops = decode(&bytes);
        let body = page_ops(&ops, 0);
        assert!(body
            .windows(2)
            .any(|w| w[0] == Op::Down(10) && w[1] == Op::SetRule { height: 40, width: 20 }));
        // back on the baseline before the character
        let Op::Post { max_h, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*max_h, 30);

        // in a vertical list a running width resolves to the box width
        let page = TexBox::V {
            width: Dim(100),
            height: Dim(40),
            depth: Dim::ZERO,
            shift: Dim::ZERO,
            moved: Dim::ZERO,
            children: Box::new([VNode::HRule {
                width: None,
                height: Some(Dim(30)),
                depth: Some(Dim(10)),
            }]),
        };
        let ops = decode(&ship(vec![page]));
        let body = page_ops(&ops, 0);
        assert!(body.contains(&Op::PutRule { height: 40, width: 100 }));
    }

    #[test]
    fn leaders() {
        let f = font("cmr10");
        // aligned box leaders starting on the grid: three repetitions
        let pattern = TexBox::hbox(vec![chr(b'.', &f, 10)]);
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::Leaders(Leaders {
                glue: Glue::fixed(Dim(30)),
                kind: LeaderKind::Aligned,
                pattern: LeaderPattern::Box(pattern.clone()),
            }),
            chr(b'a', &f, 10),
        ]))])]);
        let dots = decode(&bytes)
            .iter()
            .filter(|o| **o == Op::SetChar(b'.'))
            .count();
        assert_eq!(dots, 3);

        // centered leaders split the leftover at both ends
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::Leaders(Leaders {
                glue: Glue::fixed(Dim(35)),
                kind: LeaderKind::Centered,
                pattern: LeaderPattern::Box(pattern),
            }),
            chr(b'a', &f, 10),
        ]))])]);
        let ops = decode(&bytes);
        let body = page_ops(&ops, 0);
        let dots = body.iter().filter(|o| **o == Op::SetChar(b'.')).count();
        assert_eq!(dots, 3);
        // outer row's push, then the 2sp initial offset ahead of the first copy
        assert_eq!(body[0], Op::Push);
        assert_eq!(body[1], Op::Right(2));
        assert_eq!(body[2], Op::Push);
        // trailing character lands at the glue's full width
        let Op::Post { max_h, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*max_h, 45);

        // rule leaders stretch across the glue in one piece
        let page = TexBox::V {
            width: Dim(100),
            height: Dim(50),
            depth: Dim::ZERO,
            shift: Dim::ZERO,
            moved: Dim::ZERO,
            children: Box::new([VNode::Leaders(Leaders {
                glue: Glue::fixed(Dim(50)),
                kind: LeaderKind::Aligned,
                pattern: LeaderPattern::Rule { width: None, height: None, depth: None },
            })]),
        };
        let ops = decode(&ship(vec![page]));
        let body = page_ops(&ops, 0);
        assert!(body.contains(&Op::PutRule { height: 50, width: 100 }));
    }

    #[test]
    fn expanded_leaders_spread_the_leftover() {
        let f = font("cmr10");
        // 35sp of glue, 10sp pattern: three copies, 1sp before the first,
        // 1sp between copies, 1sp left before the glue edge
        let pattern = TexBox::hbox(vec![chr(b'.', &f, 10)]);
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            HNode::Leaders(Leaders {
                glue: Glue::fixed(Dim(35)),
                kind: LeaderKind::Expanded,
                pattern: LeaderPattern::Box(pattern),
            }),
            chr(b'a', &f, 10),
        ]))])]);
        let ops = decode(&bytes);
        let body = page_ops(&ops, 0);
        let dots = body.iter().filter(|o| **o == Op::SetChar(b'.')).count();
        assert_eq!(dots, 3);
        assert_eq!(body[0], Op::Push);
        assert_eq!(body[1], Op::Right(1));
        assert_eq!(body[2], Op::Push);
        // gap plus closing move fold into the advance before the trailing
        // character, which starts exactly at the glue edge
        assert!(body
            .windows(3)
            .any(|w| w[0] == Op::Pop
                && w[1] == Op::Right(12)
                && w[2] == Op::SetChar(b'a')));
        let Op::Post { max_h, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*max_h, 45);
    }

    struct Spots;
    impl ColorConverter for Spots {
        fn resolve(&self, name: &str) -> Option<Color> {
            (name == "spot").then(|| Color::Rgb(0.0, 1.0, 0.0))
        }
    }

    #[test]
    fn color_switches() {
        let f = font("cmr10");
        let row = TexBox::hbox(vec![
            colored(b'a', &f, 10, Color::Rgb(1.0, 0.0, 0.0)),
            colored(b'b', &f, 10, Color::Rgb(1.0, 0.0, 0.0)),
            colored(b'c', &f, 10, Color::Rgb(0.0, 0.0, 1.0)),
        ]);
        let bytes = ship(vec![TexBox::vbox(vec![VNode::Box(row.clone())])]);
        let escapes: Vec<_> = decode(&bytes)
            .iter()
            .filter_map(|o| match o {
                Op::Xxx(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        // one escape per change, none for the repeat
        assert_eq!(escapes, vec!["color rgb 1 0 0", "color rgb 0 0 1"]);

        // colors can be turned off wholesale
        let bytes = ship_with(
            vec![TexBox::vbox(vec![VNode::Box(row)])],
            ShipoutSettings { use_colors: false, ..Default::default() },
        );
        assert!(!decode(&bytes).iter().any(|o| matches!(o, Op::Xxx(_))));
    }

    #[test]
    fn named_colors() {
        debug();
        let f = font("cmr10");
        let row = TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![colored(
            b'a',
            &f,
            10,
            Color::Named("spot".into()),
        )]))]);
        // without a converter the escape is skipped, the character stays
        let page = a4().build(row, [0; 10]).unwrap();
        let mut out = Shipout::new(Vec::new(), ShipoutSettings::default());
        out.ship_page(&page).unwrap();
        let ops = decode(&out.finish().unwrap());
        assert!(!ops.iter().any(|o| matches!(o, Op::Xxx(_))));
        assert!(ops.contains(&Op::SetChar(b'a')));

        let mut out =
            Shipout::new(Vec::new(), ShipoutSettings::default()).with_converter(Box::new(Spots));
        out.ship_page(&page).unwrap();
        let ops = decode(&out.finish().unwrap());
        assert!(ops
            .iter()
            .any(|o| matches!(o, Op::Xxx(s) if s == "color rgb 0 1 0")));
    }

    #[test]
    fn page_background() {
        let f = font("cmr10");
        let mut builder = a4();
        builder.background = Color::Rgb(1.0, 1.0, 0.0);
        let page = builder
            .build(
                TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)]))]),
                [0; 10],
            )
            .unwrap();
        let mut out = Shipout::new(Vec::new(), ShipoutSettings::default());
        out.ship_page(&page).unwrap();
        let ops = decode(&out.finish().unwrap());
        let body = page_ops(&ops, 0);
        assert_eq!(body[0], Op::Xxx("background rgb 1 1 0".into()));
    }

    #[test]
    fn font_identifiers_are_stable() {
        let f1 = font("cmr10");
        let f2 = font("cmr10"); // same specification, distinct handle
        let f3 = font("cmbx10");
        let page = |f: &Font| TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![chr(b'x', f, 10)]))]);
        let row = TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![
            chr(b'x', &f1, 10),
            chr(b'y', &f2, 10),
            chr(b'z', &f3, 10),
        ]))]);
        let bytes = ship(vec![row, page(&f1)]);
        let ops = decode(&bytes);
        let defs_in = |ops: &[Op]| {
            ops.iter()
                .filter(|o| matches!(o, Op::FntDef { .. }))
                .count()
        };
        // page 1 defines both fonts, f2 resolving to f1's identifier
        assert_eq!(defs_in(page_ops(&ops, 0)), 2);
        let fnts: Vec<_> = page_ops(&ops, 0)
            .iter()
            .filter_map(|o| match o {
                Op::Fnt(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(fnts, vec![0, 1]);
        // page 2 reuses the definition but selects the font afresh
        assert_eq!(defs_in(page_ops(&ops, 1)), 0);
        assert!(page_ops(&ops, 1).contains(&Op::Fnt(0)));
        // both definitions repeat in the postamble
        let post_at = ops.iter().position(|o| matches!(o, Op::Post { .. })).unwrap();
        assert_eq!(defs_in(&ops[post_at..]), 2);
    }

    #[test]
    fn document_structure() {
        info();
        let f = font("cmr10");
        let page = |c: u8| TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![chr(c, &f, 10)]))]);
        let bytes = ship(vec![page(b'a'), page(b'b')]);
        assert_eq!(bytes.len() % 4, 0);
        assert!(bytes[bytes.len() - 4..].iter().all(|b| *b == 223));
        let ops = decode(&bytes);
        let bops: Vec<_> = ops
            .iter()
            .filter_map(|o| match o {
                Op::Bop { counters, prev, at } => Some((counters[0], *prev, *at)),
                _ => None,
            })
            .collect();
        assert_eq!(bops.len(), 2);
        assert_eq!(bops[0].0, 1);
        assert_eq!(bops[0].1, -1);
        assert_eq!(bops[1].0, 2);
        assert_eq!(bops[1].1, bops[0].2 as i32);
        let Op::Post { prev, pages, at: post_at, .. } = post(&ops) else {
            unreachable!()
        };
        assert_eq!(*prev, bops[1].2 as i32);
        assert_eq!(*pages, 2);
        let Some(Op::PostPost { post }) = ops.last() else {
            panic!("expected post_post last")
        };
        assert_eq!(*post as usize, *post_at);
    }

    #[test]
    fn counters_clamp() {
        let f = font("cmr10");
        let mut builder = a4();
        let mut counters = [0i64; 10];
        counters[0] = 1;
        counters[1] = i64::MAX;
        counters[2] = i64::MIN;
        let page = builder
            .build(
                TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)]))]),
                counters,
            )
            .unwrap();
        let mut out = Shipout::new(Vec::new(), ShipoutSettings::default());
        out.ship_page(&page).unwrap();
        let ops = decode(&out.finish().unwrap());
        let Some(Op::Bop { counters, .. }) =
            ops.iter().find(|o| matches!(o, Op::Bop { .. }))
        else {
            unreachable!()
        };
        assert_eq!(counters[1], i32::MAX);
        assert_eq!(counters[2], i32::MIN);
    }

    #[test]
    fn magnification_clamps() {
        let f = font("cmr10");
        let bytes = ship_with(
            vec![TexBox::vbox(vec![VNode::Box(TexBox::hbox(vec![chr(b'x', &f, 10)]))])],
            ShipoutSettings { magnification: i64::MAX, ..Default::default() },
        );
        let ops = decode(&bytes);
        assert_eq!(ops[0], Op::Pre { mag: i32::MAX as u32 });
    }

    #[test]
    fn unbalanced_pop_is_an_error() {
        let mut w = DviWriter::new(Vec::new(), 1000, String::new());
        w.begin_page([0; 10]).unwrap();
        w.push().unwrap();
        w.pop().unwrap();
        assert!(matches!(w.pop(), Err(ShipoutError::StackUnderflow)));
    }

    #[test]
    fn empty_document() {
        let out = Shipout::new(Vec::new(), ShipoutSettings::default());
        let bytes = out.finish().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        let ops = decode(&bytes);
        let Op::Post { prev, pages, .. } = post(&ops) else { unreachable!() };
        assert_eq!(*prev, -1);
        assert_eq!(*pages, 0);
    }
}
