//! # Backlog Validator
//!
//! Runs the rule battery over a [`CacheSnapshot`](backlog_indexer::CacheSnapshot)
//! and returns severity-tagged findings.
//!
//! ## Rules
//!
//! | scope      | rule                             | severity |
//! |------------|----------------------------------|----------|
//! | item       | `required-properties`            | error    |
//! | item       | `id-format`                      | warning  |
//! | item       | `valid-agent`                    | error    |
//! | item       | `effort-format`                  | warning  |
//! | item       | `valid-depends`                  | error    |
//! | item       | `valid-blocks`                   | warning  |
//! | item       | `test-plan`                      | warning  |
//! | item       | `component-ref`                  | info     |
//! | checkpoint | `checkpoint-required-properties` | warning  |
//! | checkpoint | `checkpoint-id-format`           | warning  |
//! | checkpoint | `checkpoint-depth`               | warning  |
//! | checkpoint | `checkpoint-parent`              | info     |
//! | category   | `category-required-properties`   | warning  |
//! | category   | `category-id-format`             | warning  |
//! | category   | `category-depends`               | error    |
//! | index      | `unique-id`                      | error    |
//! | index      | `dependency-cycle`               | error    |
//! | document   | `parse`                          | info     |
//!
//! Severities are independent: a report with only warnings and info is
//! still `valid`.

mod cycles;
mod engine;
pub mod rules;

pub use engine::Validator;
