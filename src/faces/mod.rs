pub mod comparer;
pub mod scanner;

pub use comparer::{FaceComparer, ThumbnailComparer, Verification};
pub use scanner::{Candidate, FaceMatchScanner, LivePhoto, MatchOutcome, MatchPolicy};
