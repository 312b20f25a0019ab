// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Reference cycles terminate: the member closing the cycle becomes
//! `None`, with and without a configured depth limit.

use std::cell::RefCell;
use std::rc::Rc;

use faceted_macros::facets;

facets! {
    pub struct Node {
        pub label: String,
        pub next: Option<Rc<RefCell<Node>>>,
    }

    #[facet(source = "Node")]
    pub struct NodeView;

    #[facet(source = "Node", max_depth = 0)]
    pub struct UnboundedView;
}

fn main() {
    let a = Rc::new(RefCell::new(Node {
        label: "a".to_string(),
        next: None,
    }));
    let b = Rc::new(RefCell::new(Node {
        label: "b".to_string(),
        next: Some(Rc::clone(&a)),
    }));
    a.borrow_mut().next = Some(Rc::clone(&b));

    // a -> b -> a: the transform must terminate and cut the second level.
    let root = a.borrow();
    let view = NodeView::from_source(&root);
    assert_eq!(view.label, "a");
    let second = view.next.as_ref().expect("first level is populated");
    assert_eq!(second.label, "b");
    assert!(second.next.is_none(), "cycle edge becomes None");

    // max_depth = 0 means "unlimited"; the identity guard still breaks
    // the cycle long before the absolute ceiling matters.
    let unbounded = UnboundedView::from_source(&root);
    assert_eq!(unbounded.label, "a");
    assert!(unbounded.next.is_some());

    // Diamond sharing without a cycle is expanded at every occurrence.
    let shared = Rc::new(RefCell::new(Node {
        label: "tail".to_string(),
        next: None,
    }));
    let head = Node {
        label: "head".to_string(),
        next: Some(Rc::clone(&shared)),
    };
    let head_view = NodeView::from_source(&head);
    assert_eq!(head_view.next.unwrap().label, "tail");
}
