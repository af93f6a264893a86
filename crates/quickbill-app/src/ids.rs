// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }

            pub const fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(LineItemId);

#[cfg(test)]
mod tests {
    use super::LineItemId;

    #[test]
    fn next_advances_by_one() {
        let id = LineItemId::new(1);
        assert_eq!(id.next(), LineItemId::new(2));
        assert_eq!(id.next().get(), 2);
    }

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(LineItemId::from(42).to_string(), "42");
    }
}
