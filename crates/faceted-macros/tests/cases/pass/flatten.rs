// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Deep flattening: prefix naming, null-guarded branches, and leaf-only
//! collision suffixes.

use chrono::{DateTime, Utc};
use faceted_macros::facets;
use uuid::Uuid;

facets! {
    pub struct Address {
        pub street: String,
        pub city: String,
    }

    pub struct Person {
        pub id: Uuid,
        pub first_name: String,
        pub created_at: DateTime<Utc>,
        pub address: Option<Address>,
    }

    #[flatten(source = "Person", max_depth = 3)]
    pub struct PersonFlat;

    pub struct Home {
        pub name: String,
        pub size: u32,
    }

    pub struct Work {
        pub name: String,
        pub size: u32,
    }

    pub struct Employee {
        pub home: Home,
        pub work: Work,
    }

    #[flatten(source = "Employee", naming = "leaf_only")]
    pub struct EmployeeLeaf;
}

fn main() {
    let person = Person {
        id: Uuid::nil(),
        first_name: "Ann".to_string(),
        created_at: Utc::now(),
        address: Some(Address {
            street: "Elm".to_string(),
            city: "X".to_string(),
        }),
    };

    let flat = PersonFlat::from_source(&person);
    assert_eq!(flat.first_name, "Ann");
    assert_eq!(flat.id, Uuid::nil());
    assert_eq!(flat.address_street, Some("Elm".to_string()));
    assert_eq!(flat.address_city, Some("X".to_string()));

    // A null branch yields None leaves, not a fault.
    let homeless = Person {
        address: None,
        ..person
    };
    let flat = PersonFlat::from_source(&homeless);
    assert_eq!(flat.first_name, "Ann");
    assert_eq!(flat.address_street, None);
    assert_eq!(flat.address_city, None);

    // Two sibling branches with identical leaf names get numeric
    // suffixes in traversal order, deterministically.
    let employee = Employee {
        home: Home {
            name: "h".to_string(),
            size: 80,
        },
        work: Work {
            name: "w".to_string(),
            size: 300,
        },
    };
    let leaf = EmployeeLeaf::from_source(&employee);
    assert_eq!(leaf.name, "h");
    assert_eq!(leaf.size, 80);
    assert_eq!(leaf.name2, "w");
    assert_eq!(leaf.size2, 300);

    // The expression form exposes the same flattened members.
    let plan = PersonFlat::projection();
    let members: Vec<&str> = plan.bindings.iter().map(|b| b.member.as_str()).collect();
    assert_eq!(
        members,
        ["id", "first_name", "created_at", "address_street", "address_city"]
    );
}
