mod task;

pub use task::{Section, Statistics, Task};
