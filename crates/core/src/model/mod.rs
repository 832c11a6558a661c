mod hint;
mod ids;
mod page;
mod problem;
mod stats;

pub use ids::{ParseProblemIdError, ProblemId};

pub use hint::{HintError, HintLevel, MAX_HINT_LEVEL};
pub use page::{LEETCODE, LOADING_TEXT, PageLocation, ProblemSite, ScrapedProblem};
pub use problem::{ProblemRecord, RecordError};
pub use stats::{AggregateStats, StatsDelta};
