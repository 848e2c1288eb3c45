pub mod classify;
pub mod grammar;
pub mod ll1;
pub mod lr_dfa;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;

pub use classify::Classification;
pub use grammar::Grammar;

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
