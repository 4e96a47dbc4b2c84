pub use ladder::{
    current_level_for, entries, progress_to_next, rank_for, Rank, RankEntry, RankProgress,
    POINTS_PER_LEVEL,
};

mod ladder;
