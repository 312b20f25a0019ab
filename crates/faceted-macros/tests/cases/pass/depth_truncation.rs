// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! A depth limit truncates a deep non-cyclic chain to `None` past the
//! configured level.

use faceted_macros::facets;

facets! {
    pub struct Chain {
        pub level: u32,
        pub next: Option<Box<Chain>>,
    }

    #[facet(source = "Chain", max_depth = 2)]
    pub struct ChainView;
}

fn link(level: u32, next: Option<Box<Chain>>) -> Chain {
    Chain { level, next }
}

fn main() {
    let chain = link(
        0,
        Some(Box::new(link(
            1,
            Some(Box::new(link(2, Some(Box::new(link(3, None)))))),
        ))),
    );

    let view = ChainView::from_source(&chain);
    assert_eq!(view.level, 0);

    let level1 = view.next.as_ref().expect("level 1 within limit");
    assert_eq!(level1.level, 1);

    let level2 = level1.next.as_ref().expect("level 2 within limit");
    assert_eq!(level2.level, 2);

    // Level 3 sits past max_depth = 2 and is truncated, not an error.
    assert!(level2.next.is_none());
}
