pub mod counterparty;
pub mod intent;
pub mod locale;
pub mod meeting;

pub use counterparty::{CounterpartyKind, CounterpartyRecord, CreationRecommendation, ResolutionOutcome};
pub use intent::{Field, MeetingDraft, MeetingIntent, DEFAULT_DURATION_MINUTES};
pub use locale::Locale;
pub use meeting::{CommitResult, CommitStage, MeetingOutcome, PartialCommit};
