pub mod interval;
pub mod math;

pub use interval::bounded_by;
