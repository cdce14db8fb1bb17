use std::cell::Cell;

pub const INPUT_ID_PREFIX: &str = "input";

/// Source of unique input ids.
pub trait IdGenerator {
    fn next_id(&self, prefix: &str) -> String;
}

/// Monotonic `prefix1`, `prefix2`, ... counter. Ids stay unique for as long
/// as every caller draws from the same generator.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: Cell<u64>,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> u64 {
        self.counter.get()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        format!("{prefix}{next}")
    }
}
