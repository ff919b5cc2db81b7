pub mod activity;
pub mod attempt;
pub mod notification;
pub mod progress;
pub mod puzzle;

pub use activity::{
    ActivityCalendar, AttemptOutcome, CalendarDay, DailyActivityBucket, PuzzleHistoryEntry,
};
pub use attempt::{AttemptedPuzzle, RecordAttemptRequest, RecordAttemptResponse};
pub use notification::{Notification, NotificationKind};
pub use progress::{ProgressSnapshot, UpdatedProgress, UserProgress};
pub use puzzle::{FetchedPuzzle, Puzzle, PuzzleOrigin, PuzzlePayload, PuzzleRequest};
