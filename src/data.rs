/// Team color assignment.
pub mod palette;
/// Cumulative per-year ranking.
pub mod ranking;
/// Championship table loading.
pub mod table;
