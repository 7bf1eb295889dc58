// src/common/clock.rs

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Relógio do livro-razão: cada leitura é estritamente maior que a anterior,
/// mesmo que o relógio de parede não tenha avançado (ou tenha voltado).
#[derive(Debug, Default)]
pub struct LedgerClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl LedgerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.next_after(Utc::now())
    }

    fn next_after(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        // Mutex envenenado só acontece se outro thread entrou em pânico aqui dentro;
        // o valor guardado continua válido.
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = match *last {
            Some(prev) if wall <= prev => prev + Duration::microseconds(1),
            _ => wall,
        };
        *last = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn repeated_wall_time_still_advances() {
        let clock = LedgerClock::new();
        let wall = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let a = clock.next_after(wall);
        let b = clock.next_after(wall);
        let c = clock.next_after(wall - Duration::seconds(5));

        assert_eq!(a, wall);
        assert!(b > a);
        assert!(c > b);
    }

    #[test]
    fn follows_wall_clock_when_it_moves_forward() {
        let clock = LedgerClock::new();
        let wall = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        clock.next_after(wall);
        let later = wall + Duration::seconds(3);
        assert_eq!(clock.next_after(later), later);
    }
}
