use std::collections::HashSet;

/// Номера из `[1, max_sequence)`, которых нет в `received`, по возрастанию.
///
/// Максимум считается верхней границей фида: сам он заведомо получен,
/// а всё, что выше, не проверяется.
pub fn find_missing(received: &HashSet<i32>, max_sequence: i32) -> Vec<i32> {
    missing_in(received, max_sequence).collect()
}

/// Ленивая версия [`find_missing`]: номера выдаются по одному, без промежуточного вектора.
pub fn missing_in(received: &HashSet<i32>, max_sequence: i32) -> impl Iterator<Item = i32> + '_ {
    (1..max_sequence.max(1)).filter(move |seq| !received.contains(seq))
}

/// Накопленные номера и текущий максимум.
#[derive(Debug, Default, Clone)]
pub struct SequenceTracker {
    seen: HashSet<i32>,
    max_sequence: i32,
}

impl SequenceTracker {
    /// Пустой трекер
    pub fn new() -> Self {
        Self::default()
    }

    /// Учесть полученный номер
    pub fn observe(&mut self, sequence: i32) {
        self.seen.insert(sequence);
        self.max_sequence = self.max_sequence.max(sequence);
    }

    /// 0, пока ничего не получено
    pub fn max_sequence(&self) -> i32 {
        self.max_sequence
    }

    /// Пропуски ниже текущего максимума, по возрастанию и лениво
    pub fn missing_iter(&self) -> impl Iterator<Item = i32> + '_ {
        missing_in(&self.seen, self.max_sequence)
    }
}
