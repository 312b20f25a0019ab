// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[extends(..)]` chains materialize base members, base-first, and the
//! extractor sees them like declared members.

use faceted_macros::facets;

facets! {
    pub struct Entity {
        pub id: u64,
        pub created: String,
    }

    #[extends(Entity)]
    pub struct User {
        pub name: String,
        pub age: u32,
    }

    #[facet(source = "User", exclude(created))]
    pub struct UserView;
}

fn main() {
    // The emitted User struct carries the base members physically.
    let user = User {
        id: 7,
        created: "2026-08-06".to_string(),
        name: "Ann".to_string(),
        age: 30,
    };

    let view = UserView::from_source(&user);
    assert_eq!(view.id, 7);
    assert_eq!(view.name, "Ann");
    assert_eq!(view.age, 30);

    // Base members come first in declaration order.
    let plan = UserView::projection();
    let members: Vec<&str> = plan.bindings.iter().map(|b| b.member.as_str()).collect();
    assert_eq!(members, ["id", "name", "age"]);
}
