pub mod crossover;
pub mod mutation;
pub mod selection;

pub use crossover::{intra_intersection_crossover, per_intersection_crossover, Crossover};
pub use mutation::Mutation;
pub use selection::{
    RankSelection, RouletteSelection, Selection, SelectionStrategy, TournamentSelection,
};
