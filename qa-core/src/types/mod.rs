mod feature;

pub use feature::{Feature, Scenario, Step};
