// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Exclusion, simple rename, and the projection surface.

use faceted_macros::facets;

facets! {
    pub struct Person {
        pub first_name: String,
        pub last_name: String,
        pub age: u32,
        pub email: Option<String>,
    }

    #[facet(source = "Person", exclude(last_name))]
    #[rename(name, from = "first_name")]
    pub struct PersonView;
}

fn main() {
    let person = Person {
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        age: 33,
        email: None,
    };

    let view = PersonView::from_source(&person);
    assert_eq!(view.name, "Ann");
    assert_eq!(view.age, 33);
    assert_eq!(view.email, None);
    // Record output kind: value semantics.
    assert_eq!(view.clone(), view);

    let plan = PersonView::projection();
    assert_eq!(plan.facet, "PersonView");
    assert_eq!(plan.source, "Person");
    let members: Vec<&str> = plan.bindings.iter().map(|b| b.member.as_str()).collect();
    assert_eq!(members, ["name", "age", "email"]);
}
