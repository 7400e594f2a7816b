use chrono::{DateTime, Utc};
use rand::distributions::Distribution;
use rand::Rng;
use scorekeeper_core::TournamentId;

const SUFFIX_LEN: usize = 7;

/// Lowercase base36 digits.
struct Base36;

impl Distribution<char> for Base36 {
    fn sample<R>(&self, rng: &mut R) -> char
    where
        R: Rng + ?Sized,
    {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        char::from(DIGITS[rng.gen_range(0..DIGITS.len())])
    }
}

/// Generates a new [`TournamentId`] for a tournament stored at `now`.
pub fn tournament_id<R>(now: DateTime<Utc>, rng: &mut R) -> TournamentId
where
    R: Rng + ?Sized,
{
    let suffix: String = rng.sample_iter(Base36).take(SUFFIX_LEN).collect();
    TournamentId::new(now.timestamp_millis(), &suffix)
}
