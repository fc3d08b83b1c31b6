// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket number generation.

use rand::Rng;

use deskline_config::model::TicketsConfig;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate ticket numbers.
///
/// Uniqueness is not the generator's job: the store rejects duplicates and
/// the manager asks for another candidate.
pub trait TicketNumberGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `<prefix>` followed by `length` characters drawn uniformly from `[A-Z0-9]`.
#[derive(Debug, Clone)]
pub struct RandomTicketNumbers {
    prefix: String,
    length: usize,
}

impl RandomTicketNumbers {
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
        }
    }

    pub fn from_config(config: &TicketsConfig) -> Self {
        Self::new(config.number_prefix.clone(), config.number_length)
    }
}

impl Default for RandomTicketNumbers {
    fn default() -> Self {
        Self::from_config(&TicketsConfig::default())
    }
}

impl TicketNumberGenerator for RandomTicketNumbers {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut number = String::with_capacity(self.prefix.len() + self.length);
        number.push_str(&self.prefix);
        for _ in 0..self.length {
            number.push(char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]));
        }
        number
    }
}
