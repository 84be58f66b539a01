pub mod domain;
pub mod ports;

pub use domain::{
    progress_percent, skill_set_diff, Badge, Certificate, CourseraCertificate, CourseraStats,
    HackerRankStats, LeetCodeStats, PlatformConnection, PlatformKind, PlatformStats,
    PlaylistVideo, Profile, Quiz, QuizAggregate, QuizQuestion, Skill, UdemyCourse, UdemyStats,
    User, UserCredentials, VideoProgressUpdate, VideoTotals, VideoWithProgress, YouTubeStats,
};
pub use ports::{
    CoachService, CourseraService, DatabaseService, HackerRankService, LeetCodeService, PortError,
    PortResult, UdemyService, YouTubeService,
};
