/// Source of randomness for ghost decisions.
///
/// The engine only ever needs "pick one of `len` options", so that is the whole
/// contract. Tests plug in [`ScriptedRng`] to make every choice predictable.
pub trait RandomSource {
    /// Returns an index in `0..len`. For `len <= 1` this is always 0.
    fn pick_index(&mut self, len: usize) -> usize;
}

#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        min + (self.next_f32() * span).floor() as i32
    }

    pub fn bool(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

impl RandomSource for Rng {
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }
}

/// Replays a fixed list of picks, cycling when exhausted. Out-of-range picks are
/// wrapped into the requested range.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }

    /// Always picks the first option.
    pub fn first() -> Self {
        Self::new(vec![0])
    }
}

impl RandomSource for ScriptedRng {
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 || self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor = self.cursor.wrapping_add(1);
        pick % len
    }
}
