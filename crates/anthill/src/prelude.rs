//! Anthill Prelude: everything needed to build and run a colony.
//!
//! ```rust
//! use anthill::prelude::*;
//! ```

pub use anthill_runtime::prelude::*;
