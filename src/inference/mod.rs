//! Table inference module
//!
//! Routes an import file to its destination table by looking at which
//! fields its first record carries.
//!
//! # Rules
//!
//! Evaluated in priority order, first match wins:
//!
//! | Fields present                        | Table           |
//! |---------------------------------------|-----------------|
//! | `displayName`, `category`             | `professionals` |
//! | `professionalId`, `rating`            | `reviews`       |
//! | `elements`, `backgroundColor`         | `stories`       |
//! | `openId`, `userType`                  | `users`         |
//! | `name`, `icon`, `displayOrder`        | `categories`    |

mod rules;

pub use rules::{infer_table, TableRule, TABLE_RULES};
